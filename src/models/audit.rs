//! Audit and diagnostic models.
//!
//! [`AuditStep`] records why an amount was produced. [`Diagnostic`] is the
//! flat, human-readable list of problems handed back to the caller, keyed
//! to the roster row (or duty) that caused it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single step in the audit trail recording a calculation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// The error class a diagnostic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The row could not be classified.
    RowError,
    /// The row was classified but could not be calculated.
    CalculationError,
    /// A layover leg has no partner.
    PairingWarning,
    /// A layover pairing candidate was rejected.
    PairingError,
}

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Visible, but the roster is still usable as-is.
    Warning,
    /// Something was excluded from totals.
    Error,
}

/// A problem found while processing a roster.
///
/// # Example
///
/// ```
/// use crew_pay_engine::models::{Diagnostic, DiagnosticKind, Severity};
///
/// let diagnostic = Diagnostic {
///     row_index: Some(3),
///     duty_id: None,
///     kind: DiagnosticKind::RowError,
///     code: "UNRECOGNIZED_DUTY".to_string(),
///     severity: Severity::Error,
///     message: "Unrecognized duty 'XYZ'".to_string(),
/// };
/// assert_eq!(diagnostic.to_string(), "row 3: Unrecognized duty 'XYZ'");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Zero-based index of the roster row, when the problem has one.
    pub row_index: Option<usize>,
    /// The duty record involved, when one was created.
    pub duty_id: Option<Uuid>,
    /// The error class.
    pub kind: DiagnosticKind,
    /// A code identifying the problem.
    pub code: String,
    /// How serious it is.
    pub severity: Severity,
    /// A human-readable description.
    pub message: String,
}

impl Diagnostic {
    /// Returns true if the diagnostic excluded something from totals.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.row_index, self.duty_id) {
            (Some(row), _) => write!(f, "row {}: {}", row, self.message),
            (None, Some(id)) => write!(f, "duty {}: {}", id, self.message),
            (None, None) => write!(f, "{}", self.message),
        }
    }
}
