//! Error types for the crew pay engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate.
//! Each class of failure gets its own enum so callers can tell a bad roster
//! row apart from a missing rate, a rejected layover pairing, or a failed
//! month replacement without inspecting message strings.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{DutyRecord, Position};

/// Configuration and lookup errors.
///
/// # Example
///
/// ```
/// use crew_pay_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/airline.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/airline.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but is internally inconsistent.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// A description of the inconsistency.
        message: String,
    },

    /// No rate table entry covers the position on the given date.
    #[error("Rate not found for position '{position}' on date {date}")]
    RateNotFound {
        /// The crew position.
        position: Position,
        /// The date for which the rate was requested.
        date: NaiveDate,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

/// A roster row that could not be turned into a duty record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    /// The duty text matches no duty code and carries no flight.
    #[error("Unrecognized duty '{text}'")]
    UnrecognizedDuty {
        /// The raw duty text.
        text: String,
    },

    /// Flight numbers were found but the row has no route.
    #[error("Flight duty '{text}' has no sector")]
    MissingSector {
        /// The raw duty text.
        text: String,
    },

    /// A route was given but the duty text has no flight number.
    #[error("Sector '{sector}' has no flight number in duty '{text}'")]
    MissingFlightNumber {
        /// The raw duty text.
        text: String,
        /// The raw sector text.
        sector: String,
    },

    /// The route could not be reduced to airport pairs.
    #[error("Malformed sector '{text}': {reason}")]
    MalformedSector {
        /// The raw sector text.
        text: String,
        /// What was wrong with it.
        reason: String,
    },
}

impl RowError {
    /// Stable machine-readable code for diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            RowError::UnrecognizedDuty { .. } => "UNRECOGNIZED_DUTY",
            RowError::MissingSector { .. } => "MISSING_SECTOR",
            RowError::MissingFlightNumber { .. } => "MISSING_FLIGHT_NUMBER",
            RowError::MalformedSector { .. } => "MALFORMED_SECTOR",
        }
    }
}

/// A classified duty whose hours or pay could not be computed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalculationError {
    /// A time value could not be parsed.
    #[error("Malformed {field} time '{value}'")]
    MalformedTime {
        /// Which time field ("report" or "debrief").
        field: &'static str,
        /// The raw value.
        value: String,
    },

    /// A time value is required for this duty type but was not supplied.
    #[error("Missing {field} time")]
    MissingTime {
        /// Which time field ("report" or "debrief").
        field: &'static str,
    },

    /// Report and debrief describe an empty span.
    #[error("Duty span {report} to {debrief} is not positive")]
    NonPositiveDuration {
        /// Report time.
        report: NaiveTime,
        /// Debrief time.
        debrief: NaiveTime,
    },

    /// No rate table entry covers the duty.
    #[error("Rate not found for position '{position}' on date {date}")]
    RateNotFound {
        /// The crew position.
        position: Position,
        /// The duty date.
        date: NaiveDate,
    },
}

impl CalculationError {
    /// Stable machine-readable code for diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            CalculationError::MalformedTime { .. } => "MALFORMED_TIME",
            CalculationError::MissingTime { .. } => "MISSING_TIME",
            CalculationError::NonPositiveDuration { .. } => "NON_POSITIVE_DURATION",
            CalculationError::RateNotFound { .. } => "RATE_NOT_FOUND",
        }
    }
}

/// Any per-row failure: the row stays visible but is excluded from totals.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DutyError {
    /// The row could not be classified.
    #[error(transparent)]
    Row(#[from] RowError),
    /// The row was classified but could not be calculated.
    #[error(transparent)]
    Calculation(#[from] CalculationError),
}

impl DutyError {
    /// Stable machine-readable code for diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            DutyError::Row(e) => e.code(),
            DutyError::Calculation(e) => e.code(),
        }
    }
}

/// A layover pairing candidate that had to be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairingError {
    /// Inbound report is not after outbound debrief.
    #[error(
        "Rest between outbound {outbound_id} and inbound {inbound_id} is {rest_hours} hours; must be positive"
    )]
    NonPositiveRest {
        /// The outbound duty.
        outbound_id: Uuid,
        /// The nearest matching inbound duty.
        inbound_id: Uuid,
        /// The computed (non-positive) rest.
        rest_hours: Decimal,
    },
}

/// Failure reported by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Repository {operation} failed: {message}")]
pub struct RepositoryError {
    /// The operation that failed ("list", "delete", "save").
    pub operation: &'static str,
    /// What the store reported.
    pub message: String,
}

impl RepositoryError {
    /// Creates a repository error for the given operation.
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// Outcome of a month replacement that did not commit.
///
/// `Validation` and `DeleteFailed` leave the stored month untouched.
/// `Critical` means the old duties are gone and the new ones were not
/// saved; it carries the deleted snapshot for manual repair.
#[derive(Debug, Error)]
pub enum ReplacementError {
    /// The new roster failed the dry run. Nothing was touched.
    #[error("Roster for {month:02}/{year} failed validation with {} problem(s)", .problems.len())]
    Validation {
        /// Target month.
        month: u32,
        /// Target year.
        year: i32,
        /// Human-readable problems keyed to rows.
        problems: Vec<String>,
    },

    /// Deleting the old month failed. Old data is intact, nothing new saved.
    #[error("Could not remove existing duties for {month:02}/{year}: {source}")]
    DeleteFailed {
        /// Target month.
        month: u32,
        /// Target year.
        year: i32,
        /// The repository failure.
        source: RepositoryError,
    },

    /// Old data removed but replacement not saved.
    #[error(
        "CRITICAL: {} duties for user '{user_id}' in {month:02}/{year} were removed but the replacement was not saved: {source}",
        .deleted.len()
    )]
    Critical {
        /// Owner of the month.
        user_id: String,
        /// Target month.
        month: u32,
        /// Target year.
        year: i32,
        /// Snapshot of the duties that were deleted.
        deleted: Vec<DutyRecord>,
        /// The save failure.
        source: RepositoryError,
    },
}

impl ReplacementError {
    /// Returns true for the data-loss state that needs manual recovery.
    pub fn is_critical(&self) -> bool {
        matches!(self, ReplacementError::Critical { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/airline.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/airline.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_rate_not_found_displays_position_and_date() {
        let error = EngineError::RateNotFound {
            position: Position::Ccm,
            date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        };
        assert_eq!(
            error.to_string(),
            "Rate not found for position 'CCM' on date 2020-01-01"
        );
    }

    #[test]
    fn test_duty_error_codes_follow_inner_error() {
        let row: DutyError = RowError::UnrecognizedDuty {
            text: "???".to_string(),
        }
        .into();
        assert_eq!(row.code(), "UNRECOGNIZED_DUTY");
        assert_eq!(row.to_string(), "Unrecognized duty '???'");

        let calc: DutyError = CalculationError::MissingTime { field: "report" }.into();
        assert_eq!(calc.code(), "MISSING_TIME");
    }

    #[test]
    fn test_validation_and_critical_are_distinguishable() {
        let validation = ReplacementError::Validation {
            month: 3,
            year: 2024,
            problems: vec!["row 2: Unrecognized duty 'ZZZ'".to_string()],
        };
        assert!(!validation.is_critical());
        assert_eq!(
            validation.to_string(),
            "Roster for 03/2024 failed validation with 1 problem(s)"
        );

        let critical = ReplacementError::Critical {
            user_id: "crew_001".to_string(),
            month: 3,
            year: 2024,
            deleted: vec![],
            source: RepositoryError::new("save", "connection reset"),
        };
        assert!(critical.is_critical());
        assert!(critical.to_string().starts_with("CRITICAL:"));
        assert!(critical.to_string().contains("connection reset"));
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
        assert_error::<RowError>();
        assert_error::<CalculationError>();
        assert_error::<PairingError>();
        assert_error::<ReplacementError>();
        assert_error::<RepositoryError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_config_not_found() -> EngineResult<()> {
            Err(EngineError::ConfigNotFound {
                path: "/test".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_config_not_found()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
