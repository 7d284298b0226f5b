//! Monthly payroll models.
//!
//! [`MonthlyPayrollTotals`] is the authoritative monthly figure.
//! [`DutyTypeAllocation`] is a display-only breakdown of the same month and
//! deliberately shares no conversion with the totals type.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{DutyType, Position};

/// Payroll totals for one (user, month, year).
///
/// Always recomputed from the current duty records and layover pairs, so
/// `total_salary == fixed_total + variable_total` holds by construction.
///
/// # Example
///
/// ```
/// use crew_pay_engine::models::{MonthlyPayrollTotals, Position};
/// use rust_decimal::Decimal;
/// use std::collections::BTreeMap;
/// use std::str::FromStr;
///
/// let totals = MonthlyPayrollTotals {
///     user_id: "crew_001".to_string(),
///     month: 3,
///     year: 2024,
///     position: Position::Ccm,
///     basic_salary: Decimal::from_str("3275.00").unwrap(),
///     housing_allowance: Decimal::from_str("4000.00").unwrap(),
///     transport_allowance: Decimal::from_str("1000.00").unwrap(),
///     fixed_total: Decimal::from_str("8275.00").unwrap(),
///     flight_pay: Decimal::from_str("362.50").unwrap(),
///     asby_pay: Decimal::ZERO,
///     per_diem_pay: Decimal::from_str("207.27").unwrap(),
///     variable_total: Decimal::from_str("569.77").unwrap(),
///     total_salary: Decimal::from_str("8844.77").unwrap(),
///     total_duty_hours: Decimal::from_str("7.25").unwrap(),
///     total_rest_hours: Decimal::from_str("23.5").unwrap(),
///     duty_counts: BTreeMap::new(),
///     layover_pair_count: 1,
/// };
/// assert_eq!(totals.total_salary, totals.fixed_total + totals.variable_total);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyPayrollTotals {
    /// Crew member.
    pub user_id: String,
    /// Payroll month, 1 through 12.
    pub month: u32,
    /// Payroll year.
    pub year: i32,
    /// Position the month was paid at.
    pub position: Position,
    /// Basic salary for the month.
    pub basic_salary: Decimal,
    /// Housing allowance for the month.
    pub housing_allowance: Decimal,
    /// Transport allowance for the month.
    pub transport_allowance: Decimal,
    /// Sum of the three fixed components.
    pub fixed_total: Decimal,
    /// Flight pay of every non-ASBY duty.
    pub flight_pay: Decimal,
    /// Pay of ASBY duties.
    pub asby_pay: Decimal,
    /// Per diem of every valid layover pair.
    pub per_diem_pay: Decimal,
    /// `flight_pay + asby_pay + per_diem_pay`.
    pub variable_total: Decimal,
    /// `fixed_total + variable_total`.
    pub total_salary: Decimal,
    /// Sum of duty hours of every counted duty.
    pub total_duty_hours: Decimal,
    /// Sum of rest hours of every valid layover pair.
    pub total_rest_hours: Decimal,
    /// Number of duties per type; a layover pair counts once.
    pub duty_counts: BTreeMap<DutyType, u32>,
    /// Number of valid layover pairs.
    pub layover_pair_count: u32,
}

/// How much one paid duty type effectively contributed to a month.
///
/// Analytics only: the fixed salary is spread across paid duty types by
/// their share of duty hours. Never persist this as the monthly total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutyTypeAllocation {
    /// The paid duty type.
    pub duty_type: DutyType,
    /// Number of duties (layover pairs count once).
    pub duty_count: u32,
    /// Duty hours of this type.
    pub duty_hours: Decimal,
    /// Share of paid duty hours, as a percentage rounded to 2 places.
    pub hours_share: Decimal,
    /// Variable pay earned by this type (flight pay, plus per diem for
    /// layovers).
    pub variable_pay: Decimal,
    /// Portion of the fixed salary attributed to this type.
    pub allocated_fixed: Decimal,
    /// `variable_pay + allocated_fixed`.
    pub effective_contribution: Decimal,
}
