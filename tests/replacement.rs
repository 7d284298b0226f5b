//! Failure handling of month replacement.
//!
//! A wrapper repository injects delete and save failures so that the
//! workflow's guarantees can be checked against real stored data.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use serde_json::{Value, json};
use tower::ServiceExt;

use crew_pay_engine::api::{AppState, create_router};
use crew_pay_engine::config::{ConfigLoader, CrewConfig};
use crew_pay_engine::error::{RepositoryError, ReplacementError};
use crew_pay_engine::models::{BucketMonth, DutyRecord, Position, RawRosterRow};
use crew_pay_engine::replacement::{
    DutyRepository, InMemoryDutyRepository, ReplacementRequest, ReplacementState,
    ReplacementWorkflow, RepositoryResult,
};

// =============================================================================
// Test Helpers
// =============================================================================

/// Delegates to an in-memory store unless a failure is switched on.
#[derive(Default)]
struct FlakyRepository {
    inner: InMemoryDutyRepository,
    fail_delete: AtomicBool,
    fail_save: AtomicBool,
}

#[async_trait]
impl DutyRepository for FlakyRepository {
    async fn list_month(
        &self,
        user_id: &str,
        bucket: BucketMonth,
    ) -> RepositoryResult<Vec<DutyRecord>> {
        self.inner.list_month(user_id, bucket).await
    }

    async fn delete_month(&self, user_id: &str, bucket: BucketMonth) -> RepositoryResult<usize> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(RepositoryError::new("delete", "connection refused"));
        }
        self.inner.delete_month(user_id, bucket).await
    }

    async fn save_duties(&self, duties: Vec<DutyRecord>) -> RepositoryResult<usize> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(RepositoryError::new("save", "disk full"));
        }
        self.inner.save_duties(duties).await
    }
}

fn make_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn config() -> CrewConfig {
    ConfigLoader::load("./config/crew")
        .expect("Failed to load config")
        .config()
        .clone()
}

fn march() -> BucketMonth {
    BucketMonth::new(3, 2024).unwrap()
}

fn march_rows() -> Vec<RawRosterRow> {
    vec![
        RawRosterRow::new(make_date("2024-03-02"), "EK0855/EK0856", "DXB-KWI-DXB")
            .with_times("06:00", "14:30"),
        RawRosterRow::new(make_date("2024-03-06"), "OFF", ""),
        RawRosterRow::new(make_date("2024-03-07"), "ASBY", "").with_times("05:00", "11:00"),
    ]
}

fn request(rows: Vec<RawRosterRow>) -> ReplacementRequest {
    ReplacementRequest {
        user_id: "crew_001".to_string(),
        position: Position::Ccm,
        bucket: march(),
        rows,
    }
}

async fn seeded_repository(config: &CrewConfig) -> FlakyRepository {
    let repository = FlakyRepository::default();
    let mut workflow = ReplacementWorkflow::new(&repository, config);
    workflow
        .replace_month(request(march_rows()))
        .await
        .expect("Seeding should succeed");
    repository
}

// =============================================================================
// Workflow
// =============================================================================

#[tokio::test]
async fn test_delete_failure_leaves_month_intact() {
    let config = config();
    let repository = seeded_repository(&config).await;
    let before = repository.list_month("crew_001", march()).await.unwrap();
    repository.fail_delete.store(true, Ordering::SeqCst);

    let replacement = vec![RawRosterRow::new(make_date("2024-03-01"), "OFF", "")];
    let mut workflow = ReplacementWorkflow::new(&repository, &config);
    let result = workflow.replace_month(request(replacement)).await;

    match result {
        Err(ReplacementError::DeleteFailed { month, year, .. }) => {
            assert_eq!((month, year), (3, 2024));
        }
        other => panic!("Expected DeleteFailed, got {:?}", other),
    }
    assert_eq!(workflow.state(), ReplacementState::Idle);
    assert!(workflow.transitions().contains(&ReplacementState::DeleteFailed));
    assert!(!workflow.transitions().contains(&ReplacementState::SavingNew));

    let stored = repository.list_month("crew_001", march()).await.unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(stored, before);
}

#[tokio::test]
async fn test_save_failure_is_critical_and_carries_snapshot() {
    let config = config();
    let repository = seeded_repository(&config).await;
    let before = repository.list_month("crew_001", march()).await.unwrap();
    repository.fail_save.store(true, Ordering::SeqCst);

    let replacement = vec![RawRosterRow::new(make_date("2024-03-01"), "OFF", "")];
    let mut workflow = ReplacementWorkflow::new(&repository, &config);
    let result = workflow.replace_month(request(replacement)).await;

    match result {
        Err(ReplacementError::Critical {
            user_id, deleted, ..
        }) => {
            assert_eq!(user_id, "crew_001");
            let mut deleted_ids: Vec<_> = deleted.iter().map(|d| d.id).collect();
            let mut before_ids: Vec<_> = before.iter().map(|d| d.id).collect();
            deleted_ids.sort();
            before_ids.sort();
            assert_eq!(deleted_ids, before_ids);
        }
        other => panic!("Expected Critical, got {:?}", other),
    }
    assert_eq!(workflow.state(), ReplacementState::CorruptedState);
    assert_eq!(
        &workflow.transitions()[workflow.transitions().len() - 2..],
        &[ReplacementState::SaveFailed, ReplacementState::CorruptedState]
    );

    assert!(repository.list_month("crew_001", march()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_roster_never_reaches_repository() {
    let config = config();
    let repository = seeded_repository(&config).await;
    let before = repository.list_month("crew_001", march()).await.unwrap();
    repository.fail_delete.store(true, Ordering::SeqCst);
    repository.fail_save.store(true, Ordering::SeqCst);

    let broken = vec![
        RawRosterRow::new(make_date("2024-03-01"), "OFF", ""),
        RawRosterRow::new(make_date("2024-03-02"), "EK0129", "DXB-ZAG").with_times("6am", "14:00"),
    ];
    let mut workflow = ReplacementWorkflow::new(&repository, &config);
    let result = workflow.replace_month(request(broken)).await;

    match result {
        Err(ReplacementError::Validation { problems, .. }) => {
            assert_eq!(problems.len(), 1);
            assert!(problems[0].starts_with("row 1:"));
            assert!(problems[0].contains("'6am'"));
        }
        other => panic!("Expected Validation, got {:?}", other),
    }
    assert_eq!(
        workflow.transitions(),
        &[
            ReplacementState::Idle,
            ReplacementState::Validating,
            ReplacementState::Invalid,
            ReplacementState::Idle
        ]
    );
    let after = repository.list_month("crew_001", march()).await.unwrap();
    assert_eq!(after.len(), 3);
    assert_eq!(after, before);
}

// =============================================================================
// HTTP mapping
// =============================================================================

async fn put_march(repository: Arc<FlakyRepository>) -> (StatusCode, Value) {
    let loader = ConfigLoader::load("./config/crew").expect("Failed to load config");
    let router = create_router(AppState::new(loader, repository));
    let body = json!({
        "position": "ccm",
        "rows": [{"date": "2024-03-01", "duty_text": "OFF"}]
    });

    let response = router
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/users/crew_001/rosters/2024/3")
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body_bytes).unwrap())
}

#[tokio::test]
async fn test_delete_failure_maps_to_503() {
    let repository = Arc::new(FlakyRepository::default());
    repository.fail_delete.store(true, Ordering::SeqCst);

    let (status, json) = put_march(repository).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "REPLACEMENT_DELETE_FAILED");
}

#[tokio::test]
async fn test_save_failure_maps_to_500() {
    let repository = Arc::new(FlakyRepository::default());
    repository.fail_save.store(true, Ordering::SeqCst);

    let (status, json) = put_march(repository).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "REPLACEMENT_CRITICAL");
}
