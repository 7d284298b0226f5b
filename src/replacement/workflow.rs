//! Month replacement workflow.
//!
//! Swaps a month's stored duties for a freshly uploaded roster. The new
//! roster is processed completely (classify, calculate, pair, total) before
//! anything stored is touched. Delete and save are awaited strictly in
//! that order and never retried. Once saved, the month is read back with
//! its neighbours and recomputed for the receipt.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::calculation::{
    MonthPayroll, RosterContext, RosterOutcome, process_roster, recompute_month,
};
use crate::config::CrewConfig;
use crate::error::{RepositoryError, ReplacementError};
use crate::models::{
    BucketMonth, DataSource, Diagnostic, LayoverPair, MonthlyPayrollTotals, Position,
    RawRosterRow,
};

use super::ports::DutyRepository;

/// States of a month replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementState {
    /// Nothing in progress.
    Idle,
    /// Dry-running the new roster.
    Validating,
    /// The dry run failed; nothing was touched.
    Invalid,
    /// The dry run succeeded.
    Valid,
    /// Removing the stored month.
    DeletingOld,
    /// Removal failed; stored month intact.
    DeleteFailed,
    /// Stored month removed.
    Deleted,
    /// Storing the new duties.
    SavingNew,
    /// Storing failed after removal.
    SaveFailed,
    /// The month has no duties stored; needs manual repair.
    CorruptedState,
    /// New duties stored.
    Saved,
    /// Replacement complete.
    Committed,
}

impl std::fmt::Display for ReplacementState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ReplacementState::Idle => "idle",
            ReplacementState::Validating => "validating",
            ReplacementState::Invalid => "invalid",
            ReplacementState::Valid => "valid",
            ReplacementState::DeletingOld => "deleting_old",
            ReplacementState::DeleteFailed => "delete_failed",
            ReplacementState::Deleted => "deleted",
            ReplacementState::SavingNew => "saving_new",
            ReplacementState::SaveFailed => "save_failed",
            ReplacementState::CorruptedState => "corrupted_state",
            ReplacementState::Saved => "saved",
            ReplacementState::Committed => "committed",
        };
        write!(f, "{}", label)
    }
}

/// A request to replace one user's month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementRequest {
    /// Owner of the month.
    pub user_id: String,
    /// Position the month is paid at.
    pub position: Position,
    /// Target payroll month; every new row is assigned to it.
    pub bucket: BucketMonth,
    /// The new roster.
    pub rows: Vec<RawRosterRow>,
}

/// The completion signal of a committed replacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplacementReceipt {
    /// Owner of the month.
    pub user_id: String,
    /// Payroll month.
    pub month: u32,
    /// Payroll year.
    pub year: i32,
    /// Duties removed.
    pub deleted_count: usize,
    /// Duties stored.
    pub saved_count: usize,
    /// Totals of the committed month, recomputed from storage with the
    /// neighbouring months so boundary layovers pair.
    pub totals: MonthlyPayrollTotals,
    /// Layover pairs whose outbound leg is in the committed month.
    pub pairs: Vec<LayoverPair>,
    /// Every state passed through, starting at `Idle`.
    pub transitions: Vec<ReplacementState>,
    /// Non-blocking diagnostics, such as unpaired layover legs.
    pub warnings: Vec<Diagnostic>,
}

/// Drives one month replacement against a repository.
///
/// # Example
///
/// ```no_run
/// use crew_pay_engine::config::ConfigLoader;
/// use crew_pay_engine::models::{BucketMonth, Position, RawRosterRow};
/// use crew_pay_engine::replacement::{
///     InMemoryDutyRepository, ReplacementRequest, ReplacementWorkflow,
/// };
/// use chrono::NaiveDate;
///
/// # #[tokio::main]
/// # async fn main() {
/// let loader = ConfigLoader::load("./config/crew").unwrap();
/// let repository = InMemoryDutyRepository::new();
///
/// let request = ReplacementRequest {
///     user_id: "crew_001".to_string(),
///     position: Position::Ccm,
///     bucket: BucketMonth::new(3, 2024).unwrap(),
///     rows: vec![RawRosterRow::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), "OFF", "")],
/// };
///
/// let mut workflow = ReplacementWorkflow::new(&repository, loader.config());
/// let receipt = workflow.replace_month(request).await.unwrap();
/// assert_eq!(receipt.saved_count, 1);
/// # }
/// ```
pub struct ReplacementWorkflow<'a> {
    repository: &'a dyn DutyRepository,
    config: &'a CrewConfig,
    transitions: Vec<ReplacementState>,
}

impl<'a> ReplacementWorkflow<'a> {
    /// Creates a workflow in the `Idle` state.
    pub fn new(repository: &'a dyn DutyRepository, config: &'a CrewConfig) -> Self {
        Self {
            repository,
            config,
            transitions: vec![ReplacementState::Idle],
        }
    }

    /// Current state.
    pub fn state(&self) -> ReplacementState {
        self.transitions
            .last()
            .copied()
            .unwrap_or(ReplacementState::Idle)
    }

    /// Every state passed through so far.
    pub fn transitions(&self) -> &[ReplacementState] {
        &self.transitions
    }

    fn transition(&mut self, state: ReplacementState) {
        let from = self.state();
        self.transitions.push(state);
        info!(from = %from, to = %state, "Replacement state transition");
    }

    /// Replaces the stored month with the request's roster.
    ///
    /// # Errors
    ///
    /// - [`ReplacementError::Validation`] when the dry run finds a rejected
    ///   row, a pairing error, a missing rate, or an empty roster. Nothing
    ///   stored is touched.
    /// - [`ReplacementError::DeleteFailed`] when the stored month could not
    ///   be read or removed. Nothing stored is changed.
    /// - [`ReplacementError::Critical`] when the stored month was removed
    ///   but the new duties could not be saved. Carries the removed duties.
    pub async fn replace_month(
        &mut self,
        request: ReplacementRequest,
    ) -> Result<ReplacementReceipt, ReplacementError> {
        let repository = self.repository;
        let bucket = request.bucket;
        let (month, year) = (bucket.month(), bucket.year());

        self.transition(ReplacementState::Validating);
        let ctx = RosterContext::new(request.user_id.clone(), request.position)
            .with_bucket_override(bucket)
            .with_data_source(DataSource::Imported);
        let outcome = process_roster(&request.rows, &ctx, self.config);

        let mut problems: Vec<String> = outcome.errors().map(|d| d.to_string()).collect();
        if outcome.duties.is_empty() && outcome.rejected.is_empty() {
            problems.push("roster contains no duties".to_string());
        }
        let totals = match outcome.totals_for(&ctx, bucket, self.config) {
            Ok(totals) => Some(totals),
            Err(e) => {
                problems.push(e.to_string());
                None
            }
        };

        let totals = match totals {
            Some(totals) if problems.is_empty() => totals,
            _ => {
                self.transition(ReplacementState::Invalid);
                warn!(
                    user_id = %request.user_id,
                    bucket = %bucket,
                    problems = problems.len(),
                    "Replacement roster failed validation"
                );
                self.transition(ReplacementState::Idle);
                return Err(ReplacementError::Validation {
                    month,
                    year,
                    problems,
                });
            }
        };
        self.transition(ReplacementState::Valid);

        self.transition(ReplacementState::DeletingOld);
        let snapshot = match repository.list_month(&request.user_id, bucket).await {
            Ok(snapshot) => snapshot,
            Err(source) => return Err(self.delete_failed(month, year, source)),
        };
        let deleted_count = match repository.delete_month(&request.user_id, bucket).await {
            Ok(count) => count,
            Err(source) => return Err(self.delete_failed(month, year, source)),
        };
        self.transition(ReplacementState::Deleted);

        self.transition(ReplacementState::SavingNew);
        let RosterOutcome {
            duties,
            pairs,
            diagnostics,
            ..
        } = outcome;
        // A valid roster has no rejected rows, so duty i came from row i.
        let row_of: HashMap<Uuid, usize> =
            duties.iter().enumerate().map(|(i, d)| (d.id, i)).collect();
        let saved_count = match repository.save_duties(duties).await {
            Ok(count) => count,
            Err(source) => {
                self.transition(ReplacementState::SaveFailed);
                self.transition(ReplacementState::CorruptedState);
                error!(
                    user_id = %request.user_id,
                    bucket = %bucket,
                    deleted = snapshot.len(),
                    error = %source,
                    "CRITICAL: month deleted but replacement not saved"
                );
                return Err(ReplacementError::Critical {
                    user_id: request.user_id,
                    month,
                    year,
                    deleted: snapshot,
                    source,
                });
            }
        };
        self.transition(ReplacementState::Saved);

        let keyed_warnings = |diagnostics: Vec<Diagnostic>| -> Vec<Diagnostic> {
            diagnostics
                .into_iter()
                .filter(|d| !d.is_error())
                .map(|mut d| {
                    d.row_index = d.duty_id.and_then(|id| row_of.get(&id).copied());
                    d
                })
                .collect()
        };
        let (totals, pairs, warnings) = match self
            .recompute_stored(&request.user_id, request.position, bucket)
            .await
        {
            Some(month) => (month.totals, month.pairs, keyed_warnings(month.diagnostics)),
            None => (totals, pairs, keyed_warnings(diagnostics)),
        };
        self.transition(ReplacementState::Committed);

        info!(
            user_id = %request.user_id,
            bucket = %bucket,
            deleted_count,
            saved_count,
            total_salary = %totals.total_salary,
            "Replaced payroll month"
        );

        Ok(ReplacementReceipt {
            user_id: request.user_id,
            month,
            year,
            deleted_count,
            saved_count,
            totals,
            pairs,
            transitions: self.transitions.clone(),
            warnings,
        })
    }

    /// Pairs and totals the committed month against its stored neighbours.
    ///
    /// Returns `None` when storage cannot be read back; the caller then
    /// reports the dry run of the uploaded roster instead.
    async fn recompute_stored(
        &self,
        user_id: &str,
        position: Position,
        bucket: BucketMonth,
    ) -> Option<MonthPayroll> {
        let stored = match self.repository.list_window(user_id, bucket).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    bucket = %bucket,
                    error = %e,
                    "Could not read back stored months; receipt reflects the uploaded roster only"
                );
                return None;
            }
        };
        match recompute_month(user_id, position, bucket, &stored, self.config) {
            Ok(month) => Some(month),
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    bucket = %bucket,
                    error = %e,
                    "Could not recompute stored month; receipt reflects the uploaded roster only"
                );
                None
            }
        }
    }

    fn delete_failed(
        &mut self,
        month: u32,
        year: i32,
        source: RepositoryError,
    ) -> ReplacementError {
        self.transition(ReplacementState::DeleteFailed);
        warn!(month, year, error = %source, "Could not remove stored month; left intact");
        self.transition(ReplacementState::Idle);
        ReplacementError::DeleteFailed {
            month,
            year,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use crate::replacement::InMemoryDutyRepository;
    use chrono::NaiveDate;

    fn make_date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn config() -> CrewConfig {
        ConfigLoader::load("./config/crew")
            .expect("Failed to load config")
            .config()
            .clone()
    }

    fn request(rows: Vec<RawRosterRow>) -> ReplacementRequest {
        ReplacementRequest {
            user_id: "crew_001".to_string(),
            position: Position::Ccm,
            bucket: BucketMonth::new(3, 2024).unwrap(),
            rows,
        }
    }

    #[tokio::test]
    async fn test_successful_replacement_walks_happy_path() {
        let config = config();
        let repository = InMemoryDutyRepository::new();
        let mut workflow = ReplacementWorkflow::new(&repository, &config);

        let receipt = workflow
            .replace_month(request(vec![
                RawRosterRow::new(make_date("2024-03-01"), "OFF", ""),
                RawRosterRow::new(make_date("2024-03-02"), "EK0855/EK0856", "DXB-KWI-DXB")
                    .with_times("06:00", "14:30"),
            ]))
            .await
            .unwrap();

        assert_eq!(receipt.saved_count, 2);
        assert_eq!(receipt.deleted_count, 0);
        assert_eq!(
            receipt.transitions,
            vec![
                ReplacementState::Idle,
                ReplacementState::Validating,
                ReplacementState::Valid,
                ReplacementState::DeletingOld,
                ReplacementState::Deleted,
                ReplacementState::SavingNew,
                ReplacementState::Saved,
                ReplacementState::Committed,
            ]
        );
        assert_eq!(workflow.state(), ReplacementState::Committed);
        assert_eq!(repository.len().await, 2);
    }

    #[tokio::test]
    async fn test_invalid_roster_touches_nothing() {
        let config = config();
        let repository = InMemoryDutyRepository::new();
        let mut workflow = ReplacementWorkflow::new(&repository, &config);

        let result = workflow
            .replace_month(request(vec![
                RawRosterRow::new(make_date("2024-03-01"), "OFF", ""),
                RawRosterRow::new(make_date("2024-03-02"), "GIBBERISH", ""),
            ]))
            .await;

        match result {
            Err(ReplacementError::Validation { month, problems, .. }) => {
                assert_eq!(month, 3);
                assert_eq!(problems.len(), 1);
                assert!(problems[0].starts_with("row 1:"));
            }
            other => panic!("Expected Validation error, got {:?}", other),
        }
        assert_eq!(
            workflow.transitions(),
            &[
                ReplacementState::Idle,
                ReplacementState::Validating,
                ReplacementState::Invalid,
                ReplacementState::Idle,
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_roster_is_invalid() {
        let config = config();
        let repository = InMemoryDutyRepository::new();
        let mut workflow = ReplacementWorkflow::new(&repository, &config);

        let result = workflow.replace_month(request(Vec::new())).await;
        assert!(matches!(result, Err(ReplacementError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_receipt_pairs_with_stored_following_month() {
        let config = config();
        let repository = InMemoryDutyRepository::new();
        let april = BucketMonth::new(4, 2024).unwrap();

        let mut workflow = ReplacementWorkflow::new(&repository, &config);
        let april_receipt = workflow
            .replace_month(ReplacementRequest {
                bucket: april,
                ..request(vec![
                    RawRosterRow::new(make_date("2024-04-01"), "EK0202", "JFK-DXB")
                        .with_times("11:00", "23:30"),
                ])
            })
            .await
            .unwrap();
        assert_eq!(april_receipt.warnings.len(), 1);
        assert_eq!(april_receipt.warnings[0].row_index, Some(0));

        let mut workflow = ReplacementWorkflow::new(&repository, &config);
        let receipt = workflow
            .replace_month(request(vec![
                RawRosterRow::new(make_date("2024-03-31"), "EK0201", "DXB-JFK")
                    .with_times("02:15", "10:40"),
            ]))
            .await
            .unwrap();

        let stored = repository
            .list_window("crew_001", BucketMonth::new(3, 2024).unwrap())
            .await
            .unwrap();
        let month = recompute_month(
            "crew_001",
            Position::Ccm,
            BucketMonth::new(3, 2024).unwrap(),
            &stored,
            &config,
        )
        .unwrap();

        assert_eq!(receipt.totals, month.totals);
        assert_eq!(receipt.pairs, month.pairs);
        assert_eq!(receipt.pairs.len(), 1);
        assert_eq!(receipt.totals.per_diem_pay.to_string(), "214.62");
        assert!(receipt.warnings.is_empty());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ReplacementState::CorruptedState.to_string(), "corrupted_state");
        assert_eq!(ReplacementState::DeletingOld.to_string(), "deleting_old");
    }
}
