//! Duty hour measurement.
//!
//! Roster times are local wall-clock times without a date. A debrief that
//! is earlier than the report is taken to fall on the next day, so a span
//! never exceeds 24 hours.

use chrono::{NaiveTime, Timelike};
use rust_decimal::Decimal;

use crate::error::CalculationError;
use crate::models::DutyType;

use super::rounding::hours_from_seconds;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Measured report/debrief span of a duty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutySpan {
    /// Parsed report time, if given.
    pub report_time: Option<NaiveTime>,
    /// Parsed debrief time, if given.
    pub debrief_time: Option<NaiveTime>,
    /// True when debrief falls on the next day.
    pub is_cross_day: bool,
    /// Duty length in decimal hours.
    pub duty_hours: Decimal,
}

impl DutySpan {
    fn untimed() -> Self {
        Self {
            report_time: None,
            debrief_time: None,
            is_cross_day: false,
            duty_hours: Decimal::ZERO,
        }
    }
}

/// Parses a roster time in `HH:MM`, `H:MM`, `HH:MM:SS` or `HHMM` form.
///
/// # Example
///
/// ```
/// use crew_pay_engine::calculation::parse_roster_time;
/// use chrono::NaiveTime;
///
/// let expected = NaiveTime::from_hms_opt(5, 45, 0).unwrap();
/// assert_eq!(parse_roster_time("debrief", "05:45").unwrap(), expected);
/// assert_eq!(parse_roster_time("debrief", "5:45").unwrap(), expected);
/// assert_eq!(parse_roster_time("debrief", "0545").unwrap(), expected);
/// assert!(parse_roster_time("debrief", "25:00").is_err());
/// ```
pub fn parse_roster_time(field: &'static str, value: &str) -> Result<NaiveTime, CalculationError> {
    let trimmed = value.trim();
    let format = match trimmed.matches(':').count() {
        0 if trimmed.len() == 4 && trimmed.chars().all(|c| c.is_ascii_digit()) => "%H%M",
        1 => "%H:%M",
        2 => "%H:%M:%S",
        _ => {
            return Err(CalculationError::MalformedTime {
                field,
                value: value.to_string(),
            });
        }
    };

    NaiveTime::parse_from_str(trimmed, format).map_err(|_| CalculationError::MalformedTime {
        field,
        value: value.to_string(),
    })
}

/// Computes the hours between report and debrief.
///
/// Returns the hours and whether the debrief is on the following day.
///
/// # Errors
///
/// Returns [`CalculationError::NonPositiveDuration`] when report and
/// debrief are the same instant.
///
/// # Example
///
/// ```
/// use crew_pay_engine::calculation::duty_hours_between;
/// use chrono::NaiveTime;
/// use rust_decimal::Decimal;
///
/// let report = NaiveTime::from_hms_opt(22, 30, 0).unwrap();
/// let debrief = NaiveTime::from_hms_opt(5, 45, 0).unwrap();
/// let (hours, cross_day) = duty_hours_between(report, debrief).unwrap();
/// assert_eq!(hours, Decimal::new(725, 2));
/// assert!(cross_day);
/// ```
pub fn duty_hours_between(
    report: NaiveTime,
    debrief: NaiveTime,
) -> Result<(Decimal, bool), CalculationError> {
    let report_secs = i64::from(report.num_seconds_from_midnight());
    let debrief_secs = i64::from(debrief.num_seconds_from_midnight());

    let (seconds, cross_day) = if debrief_secs > report_secs {
        (debrief_secs - report_secs, false)
    } else if debrief_secs < report_secs {
        (SECONDS_PER_DAY - report_secs + debrief_secs, true)
    } else {
        return Err(CalculationError::NonPositiveDuration { report, debrief });
    };

    Ok((hours_from_seconds(seconds), cross_day))
}

/// Parses and measures the span of a duty.
///
/// Flight, training and promotion duties need both times. Other duties may
/// omit them and then measure zero hours; if both are given they are
/// measured with the same rules.
pub fn measure_duty(
    duty_type: DutyType,
    report: Option<&str>,
    debrief: Option<&str>,
) -> Result<DutySpan, CalculationError> {
    let report = report.map(str::trim).filter(|s| !s.is_empty());
    let debrief = debrief.map(str::trim).filter(|s| !s.is_empty());

    let (report, debrief) = match (report, debrief) {
        (Some(r), Some(d)) => (r, d),
        (None, _) if duty_type.requires_times() => {
            return Err(CalculationError::MissingTime { field: "report" });
        }
        (_, None) if duty_type.requires_times() => {
            return Err(CalculationError::MissingTime { field: "debrief" });
        }
        _ => return Ok(DutySpan::untimed()),
    };

    let report_time = parse_roster_time("report", report)?;
    let debrief_time = parse_roster_time("debrief", debrief)?;
    let (duty_hours, is_cross_day) = duty_hours_between(report_time, debrief_time)?;

    Ok(DutySpan {
        report_time: Some(report_time),
        debrief_time: Some(debrief_time),
        is_cross_day,
        duty_hours,
    })
}
