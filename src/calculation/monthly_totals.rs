//! Monthly aggregation.
//!
//! Totals are recomputed from the supplied duty records and layover pairs
//! on every call. Nothing here reads a clock or generates ids, so the same
//! inputs always give the same totals.

use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::config::{CrewConfig, RateTable};
use crate::error::EngineResult;
use crate::models::{
    BucketMonth, Diagnostic, DutyRecord, DutyType, LayoverPair, MonthlyPayrollTotals, Position,
    UnpairedLayover,
};

use super::layover_pairing::pair_layovers;

/// The duties and pairs of one user that count toward one bucket.
pub(crate) struct MonthSlice<'a> {
    pub(crate) duties: Vec<&'a DutyRecord>,
    pub(crate) pairs: Vec<&'a LayoverPair>,
    /// Every valid pair of this user, in any bucket.
    user_pairs: Vec<&'a LayoverPair>,
}

impl<'a> MonthSlice<'a> {
    pub(crate) fn select(
        user_id: &str,
        bucket: BucketMonth,
        duties: &'a [DutyRecord],
        pairs: &'a [LayoverPair],
    ) -> Self {
        let user_ids: HashSet<Uuid> = duties
            .iter()
            .filter(|d| d.user_id == user_id)
            .map(|d| d.id)
            .collect();

        let user_pairs: Vec<&LayoverPair> = pairs
            .iter()
            .filter(|p| p.is_valid() && user_ids.contains(&p.outbound_id))
            .collect();

        Self {
            duties: duties
                .iter()
                .filter(|d| d.user_id == user_id && d.bucket == bucket)
                .collect(),
            pairs: user_pairs
                .iter()
                .copied()
                .filter(|p| p.bucket == bucket)
                .collect(),
            user_pairs,
        }
    }

    /// Duty count per type. A pair counts as one layover in its own
    /// bucket; a leg outside any pair counts as one layover.
    pub(crate) fn duty_counts(&self) -> BTreeMap<DutyType, u32> {
        let mut counts = BTreeMap::new();
        for duty in &self.duties {
            if duty.is_layover() && self.user_pairs.iter().any(|p| p.involves(duty.id)) {
                continue;
            }
            *counts.entry(duty.duty_type).or_insert(0) += 1;
        }
        if !self.pairs.is_empty() {
            *counts.entry(DutyType::Layover).or_insert(0) += self.pairs.len() as u32;
        }
        counts
    }
}

/// Calculates the payroll totals of one user for one bucket.
///
/// - Fixed pay comes from the rate entry effective on the first day of the
///   bucket month.
/// - Flight pay sums every non-ASBY duty in the bucket; ASBY pay is kept
///   separate.
/// - Per diem and rest hours sum every valid pair whose outbound leg is in
///   the bucket.
///
/// # Errors
///
/// Returns [`crate::error::EngineError::RateNotFound`] if no rate covers
/// the first day of the month.
///
/// # Example
///
/// ```no_run
/// use crew_pay_engine::calculation::{calculate_monthly_totals, process_roster, RosterContext};
/// use crew_pay_engine::config::ConfigLoader;
/// use crew_pay_engine::models::{BucketMonth, Position, RawRosterRow};
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/crew").unwrap();
/// let rows = vec![RawRosterRow::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), "OFF", "")];
/// let ctx = RosterContext::new("crew_001", Position::Ccm);
/// let outcome = process_roster(&rows, &ctx, loader.config());
///
/// let totals = calculate_monthly_totals(
///     "crew_001",
///     Position::Ccm,
///     BucketMonth::new(3, 2024).unwrap(),
///     &outcome.duties,
///     &outcome.pairs,
///     loader.config().rates(),
/// ).unwrap();
/// assert_eq!(totals.total_salary, totals.fixed_total);
/// ```
pub fn calculate_monthly_totals(
    user_id: &str,
    position: Position,
    bucket: BucketMonth,
    duties: &[DutyRecord],
    pairs: &[LayoverPair],
    rates: &RateTable,
) -> EngineResult<MonthlyPayrollTotals> {
    let fixed = rates.lookup(position, bucket.first_day())?;
    let slice = MonthSlice::select(user_id, bucket, duties, pairs);

    let flight_pay: Decimal = slice
        .duties
        .iter()
        .filter(|d| !d.is_asby())
        .map(|d| d.flight_pay)
        .sum();
    let asby_pay: Decimal = slice
        .duties
        .iter()
        .filter(|d| d.is_asby())
        .map(|d| d.flight_pay)
        .sum();
    let total_duty_hours: Decimal = slice.duties.iter().map(|d| d.duty_hours).sum();

    let per_diem_pay: Decimal = slice.pairs.iter().map(|p| p.per_diem_pay).sum();
    let total_rest_hours: Decimal = slice.pairs.iter().map(|p| p.rest_hours).sum();

    let fixed_total = fixed.fixed_total();
    let variable_total = flight_pay + asby_pay + per_diem_pay;

    Ok(MonthlyPayrollTotals {
        user_id: user_id.to_string(),
        month: bucket.month(),
        year: bucket.year(),
        position,
        basic_salary: fixed.basic_salary,
        housing_allowance: fixed.housing_allowance,
        transport_allowance: fixed.transport_allowance,
        fixed_total,
        flight_pay,
        asby_pay,
        per_diem_pay,
        variable_total,
        total_salary: fixed_total + variable_total,
        total_duty_hours,
        total_rest_hours,
        duty_counts: slice.duty_counts(),
        layover_pair_count: slice.pairs.len() as u32,
    })
}

/// A payroll month recomputed from a set of stored duties.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthPayroll {
    /// Authoritative totals of the month.
    pub totals: MonthlyPayrollTotals,
    /// Duties assigned to the month.
    pub duties: Vec<DutyRecord>,
    /// Pairs whose outbound leg is in the month.
    pub pairs: Vec<LayoverPair>,
    /// Legs of the month left without a partner.
    pub unpaired: Vec<UnpairedLayover>,
    /// Pairing diagnostics for duties of the month.
    pub diagnostics: Vec<Diagnostic>,
}

/// Pairs and totals one month from `duties`.
///
/// `duties` should hold the month and both neighbouring months, so a
/// layover whose legs straddle a month boundary still pairs.
///
/// # Errors
///
/// Returns [`crate::error::EngineError::RateNotFound`] if no rate covers
/// the first day of the month.
pub fn recompute_month(
    user_id: &str,
    position: Position,
    bucket: BucketMonth,
    duties: &[DutyRecord],
    config: &CrewConfig,
) -> EngineResult<MonthPayroll> {
    let pairing = pair_layovers(duties, position, config, 1);
    let totals = calculate_monthly_totals(
        user_id,
        position,
        bucket,
        duties,
        &pairing.pairs,
        config.rates(),
    )?;

    let month_duties: Vec<DutyRecord> = duties
        .iter()
        .filter(|d| d.user_id == user_id && d.bucket == bucket)
        .cloned()
        .collect();
    let month_ids: HashSet<Uuid> = month_duties.iter().map(|d| d.id).collect();

    Ok(MonthPayroll {
        totals,
        pairs: pairing
            .pairs
            .into_iter()
            .filter(|p| p.bucket == bucket && month_ids.contains(&p.outbound_id))
            .collect(),
        unpaired: pairing
            .unpaired
            .into_iter()
            .filter(|u| month_ids.contains(&u.duty_id))
            .collect(),
        diagnostics: pairing
            .diagnostics
            .into_iter()
            .filter(|d| d.duty_id.is_some_and(|id| month_ids.contains(&id)))
            .collect(),
        duties: month_duties,
    })
}
