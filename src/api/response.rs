//! Response types for the crew pay API.
//!
//! This module defines the success bodies, the error response structure,
//! and the mapping from engine errors to HTTP status codes.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::calculation::RosterOutcome;
use crate::error::{EngineError, RepositoryError, ReplacementError};
use crate::models::{
    Diagnostic, DutyRecord, DutyTypeAllocation, LayoverPair, MonthlyPayrollTotals,
    UnpairedLayover,
};

/// Response body for `POST /roster/process`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterResponse {
    /// Duties, pairs, rejected rows and diagnostics.
    pub outcome: RosterOutcome,
    /// Totals for every bucket that has at least one duty.
    pub totals: Vec<MonthlyPayrollTotals>,
}

/// Response body for `POST /payroll/breakdown`.
///
/// The allocation is a display-only view next to the authoritative totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakdownResponse {
    /// Authoritative monthly totals.
    pub totals: MonthlyPayrollTotals,
    /// Fixed pay spread across paid duty types by hours.
    pub allocation: Vec<DutyTypeAllocation>,
    /// Problems found in the roster.
    pub diagnostics: Vec<Diagnostic>,
}

/// Response body for `GET /users/:user_id/payroll/:year/:month`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollResponse {
    /// Totals recomputed from stored duties.
    pub totals: MonthlyPayrollTotals,
    /// Stored duties of the month.
    pub duties: Vec<DutyRecord>,
    /// Pairs counted in the month.
    pub pairs: Vec<LayoverPair>,
    /// Legs of the month left without a partner.
    pub unpaired: Vec<UnpairedLayover>,
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates an invalid payroll month error response.
    pub fn invalid_month(month: u32, year: i32) -> Self {
        Self::with_details(
            "INVALID_MONTH",
            format!("Invalid payroll month {}/{}", month, year),
            "Month must be between 1 and 12",
        )
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Creates an error response.
    pub fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::ConfigNotFound { path } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            ),
            EngineError::ConfigParseError { path, message } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            ),
            EngineError::InvalidConfig { message } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Invalid configuration", message),
            ),
            EngineError::RateNotFound { position, date } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "RATE_NOT_FOUND",
                    format!("Rate not found for position '{}' on date {}", position, date),
                    "No rate table version covers the requested position and date",
                ),
            ),
        }
    }
}

impl From<RepositoryError> for ApiErrorResponse {
    fn from(error: RepositoryError) -> Self {
        ApiErrorResponse::new(
            StatusCode::SERVICE_UNAVAILABLE,
            ApiError::with_details("REPOSITORY_ERROR", "Duty storage unavailable", error.to_string()),
        )
    }
}

impl From<ReplacementError> for ApiErrorResponse {
    fn from(error: ReplacementError) -> Self {
        let message = error.to_string();
        match error {
            ReplacementError::Validation { problems, .. } => ApiErrorResponse::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::with_details("REPLACEMENT_INVALID", message, problems.join("; ")),
            ),
            ReplacementError::DeleteFailed { .. } => ApiErrorResponse::new(
                StatusCode::SERVICE_UNAVAILABLE,
                ApiError::with_details(
                    "REPLACEMENT_DELETE_FAILED",
                    message,
                    "Existing duties are unchanged and nothing new was saved",
                ),
            ),
            ReplacementError::Critical { deleted, .. } => {
                let ids: Vec<String> = deleted.iter().map(|d| d.id.to_string()).collect();
                ApiErrorResponse::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::with_details(
                        "REPLACEMENT_CRITICAL",
                        message,
                        format!("Removed duty ids: [{}]", ids.join(", ")),
                    ),
                )
            }
        }
    }
}
