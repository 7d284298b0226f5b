//! Core data models for the crew pay engine.
//!
//! This module contains all the domain models used throughout the engine.

mod audit;
mod crew;
mod duty;
mod layover;
mod payroll;
mod roster_row;

pub use audit::{AuditStep, Diagnostic, DiagnosticKind, Severity};
pub use crew::Position;
pub use duty::{
    BucketMonth, BucketSource, DataSource, DutyRecord, DutyType, PayPolicy, Sector,
    is_airport_code,
};
pub use layover::{LayoverPair, UnpairedLayover, UnpairedReason};
pub use payroll::{DutyTypeAllocation, MonthlyPayrollTotals};
pub use roster_row::RawRosterRow;
