//! Rate lookup functionality.
//!
//! This module resolves the rate table entry that applies to a crew
//! position on a duty date and records the lookup in the audit trail.

use chrono::NaiveDate;

use crate::config::{RateEntry, RateTable};
use crate::error::CalculationError;
use crate::models::{AuditStep, Position};

/// The result of a rate lookup, including the entry and audit step.
#[derive(Debug, Clone)]
pub struct RateLookupResult {
    /// The applicable rate entry.
    pub entry: RateEntry,
    /// The first date of the version the entry came from.
    pub effective_from: NaiveDate,
    /// The audit step recording this lookup.
    pub audit_step: AuditStep,
}

/// Finds the rate entry for `position` on `date`.
///
/// # Errors
///
/// Returns [`CalculationError::RateNotFound`] if no version on or before
/// `date` has an entry for the position.
///
/// # Example
///
/// ```no_run
/// use crew_pay_engine::calculation::lookup_rate;
/// use crew_pay_engine::config::ConfigLoader;
/// use crew_pay_engine::models::Position;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/crew").unwrap();
/// let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
/// let result = lookup_rate(Position::Ccm, date, loader.config().rates(), 1).unwrap();
/// println!("Hourly rate: {}", result.entry.hourly_flight_rate);
/// ```
pub fn lookup_rate(
    position: Position,
    date: NaiveDate,
    rates: &RateTable,
    step_number: u32,
) -> Result<RateLookupResult, CalculationError> {
    let (effective_from, entry) = rates
        .lookup_version(position, date)
        .map_err(|_| CalculationError::RateNotFound { position, date })?;

    let audit_step = AuditStep {
        step_number,
        rule_id: "rate_lookup".to_string(),
        rule_name: "Rate Lookup".to_string(),
        input: serde_json::json!({
            "position": position,
            "date": date.to_string()
        }),
        output: serde_json::json!({
            "effective_from": effective_from.to_string(),
            "hourly_flight_rate": entry.hourly_flight_rate.to_string(),
            "per_diem_rate_per_hour": entry.per_diem_rate_per_hour.to_string(),
            "asby_paid_hours": entry.asby_paid_hours.to_string()
        }),
        reasoning: format!(
            "{} rates effective from {} apply on {}",
            position, effective_from, date
        ),
    };

    Ok(RateLookupResult {
        entry: entry.clone(),
        effective_from,
        audit_step,
    })
}
