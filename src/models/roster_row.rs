//! Raw roster row model.
//!
//! A [`RawRosterRow`] is what the upload or manual-entry layer hands to the
//! engine: one line of the roster, already tokenized into columns but not
//! yet interpreted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One uninterpreted roster line.
///
/// Times are kept as the original strings so that a malformed value can be
/// reported back verbatim for correction.
///
/// # Example
///
/// ```
/// use crew_pay_engine::models::RawRosterRow;
///
/// let row: RawRosterRow = serde_json::from_str(r#"{
///     "date": "2024-03-04",
///     "duty_text": "EK0201/EK0202",
///     "sector_text": "DXB-JFK",
///     "report_time": "02:15",
///     "debrief_time": "16:40"
/// }"#).unwrap();
/// assert_eq!(row.report_time.as_deref(), Some("02:15"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRosterRow {
    /// Calendar date of report.
    pub date: NaiveDate,
    /// Duty column: flight numbers or a duty code such as "OFF" or "ASBY".
    pub duty_text: String,
    /// Route column in any of the supported separator conventions.
    #[serde(default)]
    pub sector_text: String,
    /// Report time as written on the roster.
    #[serde(default)]
    pub report_time: Option<String>,
    /// Debrief time as written on the roster.
    #[serde(default)]
    pub debrief_time: Option<String>,
}

impl RawRosterRow {
    /// Builds a row with no times.
    pub fn new(date: NaiveDate, duty_text: impl Into<String>, sector_text: impl Into<String>) -> Self {
        Self {
            date,
            duty_text: duty_text.into(),
            sector_text: sector_text.into(),
            report_time: None,
            debrief_time: None,
        }
    }

    /// Sets the report and debrief times.
    pub fn with_times(mut self, report: impl Into<String>, debrief: impl Into<String>) -> Self {
        self.report_time = Some(report.into());
        self.debrief_time = Some(debrief.into());
        self
    }
}
