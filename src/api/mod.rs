//! HTTP API module for the crew pay engine.
//!
//! This module provides the REST endpoints for processing rosters,
//! breaking down a month's pay, and replacing or reading stored months.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{BreakdownRequest, PayrollQuery, ReplaceRosterRequest, RosterRequest};
pub use response::{
    ApiError, ApiErrorResponse, BreakdownResponse, PayrollResponse, RosterResponse,
};
pub use state::AppState;
