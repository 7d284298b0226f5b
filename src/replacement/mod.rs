//! Whole-month roster replacement.
//!
//! This module provides the [`DutyRepository`] persistence port, an
//! in-memory implementation, and the [`ReplacementWorkflow`] state machine
//! that validates a new roster before swapping it in for a stored month.

mod memory;
mod ports;
mod workflow;

pub use memory::InMemoryDutyRepository;
pub use ports::{DutyRepository, RepositoryResult};
pub use workflow::{ReplacementReceipt, ReplacementRequest, ReplacementState, ReplacementWorkflow};
