//! Request types for the crew pay API.
//!
//! This module defines the JSON request bodies and query strings accepted
//! by the roster, breakdown, replacement and payroll endpoints.

use serde::{Deserialize, Serialize};

use crate::calculation::RosterContext;
use crate::models::{BucketMonth, DataSource, Position, RawRosterRow};

/// Request body for `POST /roster/process`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterRequest {
    /// Owning crew member.
    pub user_id: String,
    /// Position the crew member is paid at.
    pub position: Position,
    /// Payroll month to assign every row to, instead of each row's date.
    #[serde(default)]
    pub bucket_override: Option<BucketMonth>,
    /// The roster rows in upload order.
    pub rows: Vec<RawRosterRow>,
}

impl RosterRequest {
    /// The pipeline context for this request.
    pub fn context(&self) -> RosterContext {
        let ctx = RosterContext::new(self.user_id.clone(), self.position)
            .with_data_source(DataSource::Imported);
        match self.bucket_override {
            Some(bucket) => ctx.with_bucket_override(bucket),
            None => ctx,
        }
    }
}

/// Request body for `POST /payroll/breakdown`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakdownRequest {
    /// Owning crew member.
    pub user_id: String,
    /// Position the crew member is paid at.
    pub position: Position,
    /// Payroll month, 1 through 12.
    pub month: u32,
    /// Payroll year.
    pub year: i32,
    /// The roster rows; every row is assigned to the requested month.
    pub rows: Vec<RawRosterRow>,
}

/// Request body for `PUT /users/:user_id/rosters/:year/:month`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceRosterRequest {
    /// Position the crew member is paid at.
    pub position: Position,
    /// The new roster for the month.
    pub rows: Vec<RawRosterRow>,
}

/// Query string for `GET /users/:user_id/payroll/:year/:month`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollQuery {
    /// Position the crew member is paid at.
    pub position: Position,
}
