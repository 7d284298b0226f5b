//! Roster processing pipeline.
//!
//! Turns raw roster rows into calculated duty records and layover pairs.
//! A bad row never aborts the roster: it is reported in
//! [`RosterOutcome::rejected`] with a diagnostic and left out of every
//! total, while the remaining rows are processed normally.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::CrewConfig;
use crate::error::{DutyError, EngineResult};
use crate::models::{
    AuditStep, BucketMonth, BucketSource, DataSource, Diagnostic, DiagnosticKind, DutyRecord,
    DutyType, LayoverPair, MonthlyPayrollTotals, Position, RawRosterRow, Severity,
    UnpairedLayover,
};

use super::classifier::classify_row;
use super::duty_hours::measure_duty;
use super::duty_pay::{DutyPayInput, calculate_duty_pay};
use super::layover_pairing::pair_layovers;
use super::monthly_totals::calculate_monthly_totals;

/// Who a roster belongs to and how it is being imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterContext {
    /// Owning crew member.
    pub user_id: String,
    /// Position the crew member is paid at.
    pub position: Position,
    /// Payroll month chosen at import; applies to every row when set.
    #[serde(default)]
    pub bucket_override: Option<BucketMonth>,
    /// Provenance stamped on created records.
    pub data_source: DataSource,
}

impl RosterContext {
    /// Context for an imported roster with derived buckets.
    pub fn new(user_id: impl Into<String>, position: Position) -> Self {
        Self {
            user_id: user_id.into(),
            position,
            bucket_override: None,
            data_source: DataSource::Imported,
        }
    }

    /// Assigns every row to `bucket` regardless of its date.
    pub fn with_bucket_override(mut self, bucket: BucketMonth) -> Self {
        self.bucket_override = Some(bucket);
        self
    }

    /// Sets the provenance stamped on records.
    pub fn with_data_source(mut self, data_source: DataSource) -> Self {
        self.data_source = data_source;
        self
    }
}

/// A roster row that could not be classified or calculated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedRow {
    /// Zero-based position in the submitted roster.
    pub row_index: usize,
    /// The row as submitted.
    pub row: RawRosterRow,
    /// The duty type, when classification got that far.
    pub duty_type: Option<DutyType>,
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error.
    pub message: String,
}

/// A calculated duty together with the audit steps that produced it.
#[derive(Debug, Clone)]
pub struct CalculatedDuty {
    /// The duty record.
    pub record: DutyRecord,
    /// Rate lookup and pay steps for this duty.
    pub audit_steps: Vec<AuditStep>,
}

/// Everything produced from one roster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterOutcome {
    /// Successfully calculated duties, in roster order.
    pub duties: Vec<DutyRecord>,
    /// Layover pairs formed among `duties`.
    pub pairs: Vec<LayoverPair>,
    /// Layover legs left without a partner.
    pub unpaired: Vec<UnpairedLayover>,
    /// Rows excluded from every total.
    pub rejected: Vec<RejectedRow>,
    /// Every problem found, keyed to its row where possible.
    pub diagnostics: Vec<Diagnostic>,
    /// How each amount was produced.
    pub audit_steps: Vec<AuditStep>,
}

impl RosterOutcome {
    /// Returns true if any diagnostic excluded something from totals.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Diagnostics that are errors.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    /// Diagnostics that are only warnings.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }

    /// Payroll buckets that have at least one duty.
    pub fn buckets(&self) -> BTreeSet<BucketMonth> {
        self.duties.iter().map(|d| d.bucket).collect()
    }

    /// Totals for one bucket of this roster.
    pub fn totals_for(
        &self,
        ctx: &RosterContext,
        bucket: BucketMonth,
        config: &CrewConfig,
    ) -> EngineResult<MonthlyPayrollTotals> {
        calculate_monthly_totals(
            &ctx.user_id,
            ctx.position,
            bucket,
            &self.duties,
            &self.pairs,
            config.rates(),
        )
    }
}

/// Classifies and calculates one row.
///
/// `step_number` is the number given to the first audit step produced.
pub fn calculate_row(
    row: &RawRosterRow,
    ctx: &RosterContext,
    config: &CrewConfig,
    step_number: u32,
) -> Result<CalculatedDuty, DutyError> {
    let classification = classify_row(row, config)?;
    let span = measure_duty(
        classification.duty_type,
        row.report_time.as_deref(),
        row.debrief_time.as_deref(),
    )?;

    let pay = calculate_duty_pay(
        &DutyPayInput {
            date: row.date,
            position: ctx.position,
            duty_type: classification.duty_type,
            pay_policy: classification.pay_policy,
            duty_hours: span.duty_hours,
        },
        config.rates(),
        step_number,
    )?;

    let (bucket, bucket_source) = match ctx.bucket_override {
        Some(bucket) => (bucket, BucketSource::Overridden),
        None => (BucketMonth::from_date(row.date), BucketSource::Derived),
    };

    Ok(CalculatedDuty {
        record: DutyRecord {
            id: Uuid::new_v4(),
            user_id: ctx.user_id.clone(),
            date: row.date,
            bucket,
            bucket_source,
            duty_type: classification.duty_type,
            duty_code: classification.duty_code,
            pay_policy: classification.pay_policy,
            flight_numbers: classification.flight_numbers,
            sectors: classification.sectors,
            report_time: span.report_time,
            debrief_time: span.debrief_time,
            is_cross_day: span.is_cross_day,
            duty_hours: span.duty_hours,
            flight_pay: pay.flight_pay,
            data_source: ctx.data_source,
        },
        audit_steps: pay.audit_steps,
    })
}

fn duty_type_of(row: &RawRosterRow, config: &CrewConfig, error: &DutyError) -> Option<DutyType> {
    match error {
        DutyError::Row(_) => None,
        DutyError::Calculation(_) => classify_row(row, config).ok().map(|c| c.duty_type),
    }
}

/// Processes a whole roster: classify, calculate, then pair layovers.
///
/// # Example
///
/// ```no_run
/// use crew_pay_engine::calculation::{process_roster, RosterContext};
/// use crew_pay_engine::config::ConfigLoader;
/// use crew_pay_engine::models::{Position, RawRosterRow};
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/crew").unwrap();
/// let date = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
/// let rows = vec![
///     RawRosterRow::new(date, "EK0855/EK0856", "DXB-KWI-DXB").with_times("06:00", "14:30"),
///     RawRosterRow::new(date.succ_opt().unwrap(), "MYSTERY", ""),
/// ];
///
/// let outcome = process_roster(&rows, &RosterContext::new("crew_001", Position::Ccm), loader.config());
/// assert_eq!(outcome.duties.len(), 1);
/// assert_eq!(outcome.rejected.len(), 1);
/// ```
pub fn process_roster(
    rows: &[RawRosterRow],
    ctx: &RosterContext,
    config: &CrewConfig,
) -> RosterOutcome {
    let mut outcome = RosterOutcome::default();
    let mut row_of: HashMap<Uuid, usize> = HashMap::new();

    for (row_index, row) in rows.iter().enumerate() {
        let step_number = outcome.audit_steps.len() as u32 + 1;
        match calculate_row(row, ctx, config, step_number) {
            Ok(calculated) => {
                debug!(
                    row_index,
                    date = %calculated.record.date,
                    duty_type = %calculated.record.duty_type,
                    duty_hours = %calculated.record.duty_hours,
                    flight_pay = %calculated.record.flight_pay,
                    "Calculated duty"
                );
                row_of.insert(calculated.record.id, row_index);
                outcome.audit_steps.extend(calculated.audit_steps);
                outcome.duties.push(calculated.record);
            }
            Err(error) => {
                let kind = match error {
                    DutyError::Row(_) => DiagnosticKind::RowError,
                    DutyError::Calculation(_) => DiagnosticKind::CalculationError,
                };
                warn!(
                    row_index,
                    date = %row.date,
                    duty_text = %row.duty_text,
                    code = error.code(),
                    error = %error,
                    "Rejected roster row"
                );
                outcome.diagnostics.push(Diagnostic {
                    row_index: Some(row_index),
                    duty_id: None,
                    kind,
                    code: error.code().to_string(),
                    severity: Severity::Error,
                    message: error.to_string(),
                });
                outcome.rejected.push(RejectedRow {
                    row_index,
                    row: row.clone(),
                    duty_type: duty_type_of(row, config, &error),
                    code: error.code().to_string(),
                    message: error.to_string(),
                });
            }
        }
    }

    let step_number = outcome.audit_steps.len() as u32 + 1;
    let pairing = pair_layovers(&outcome.duties, ctx.position, config, step_number);

    outcome.pairs = pairing.pairs;
    outcome.unpaired = pairing.unpaired;
    outcome.audit_steps.extend(pairing.audit_steps);
    outcome
        .diagnostics
        .extend(pairing.diagnostics.into_iter().map(|mut diagnostic| {
            diagnostic.row_index = diagnostic.duty_id.and_then(|id| row_of.get(&id).copied());
            diagnostic
        }));

    outcome
}

/// Calculates a single hand-entered duty.
///
/// The record is stamped [`DataSource::Manual`]. Pairing is left to the
/// caller, who re-runs [`pair_layovers`] over the month.
pub fn process_manual_entry(
    row: &RawRosterRow,
    ctx: &RosterContext,
    config: &CrewConfig,
) -> Result<DutyRecord, DutyError> {
    let ctx = ctx.clone().with_data_source(DataSource::Manual);
    calculate_row(row, &ctx, config, 1).map(|calculated| calculated.record)
}

/// Re-classifies and recalculates an edited duty.
///
/// The record keeps its id. An overridden bucket is kept; a derived one
/// follows the (possibly changed) date. The record is stamped
/// [`DataSource::Edited`].
pub fn recalculate_edited(
    existing: &DutyRecord,
    row: &RawRosterRow,
    ctx: &RosterContext,
    config: &CrewConfig,
) -> Result<DutyRecord, DutyError> {
    let mut ctx = ctx.clone().with_data_source(DataSource::Edited);
    if existing.bucket_source == BucketSource::Overridden {
        ctx.bucket_override = Some(existing.bucket);
    }

    let mut record = calculate_row(row, &ctx, config, 1)?.record;
    record.id = existing.id;
    Ok(record)
}
