//! Port interface for duty persistence.
//!
//! The replacement workflow talks to storage only through this trait, so
//! the engine stays free of any database and tests can inject failures.

use async_trait::async_trait;

use crate::error::RepositoryError;
use crate::models::{BucketMonth, DutyRecord};

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Trait for duty record persistence and retrieval.
#[async_trait]
pub trait DutyRepository: Send + Sync {
    /// All duties of `user_id` assigned to `bucket`.
    async fn list_month(
        &self,
        user_id: &str,
        bucket: BucketMonth,
    ) -> RepositoryResult<Vec<DutyRecord>>;

    /// Removes every duty of `user_id` assigned to `bucket`, returning how
    /// many were removed.
    async fn delete_month(&self, user_id: &str, bucket: BucketMonth) -> RepositoryResult<usize>;

    /// Stores the duties, returning how many were saved.
    async fn save_duties(&self, duties: Vec<DutyRecord>) -> RepositoryResult<usize>;

    /// Duties of `bucket` together with the months either side of it.
    async fn list_window(
        &self,
        user_id: &str,
        bucket: BucketMonth,
    ) -> RepositoryResult<Vec<DutyRecord>> {
        let mut duties = Vec::new();
        for month in [bucket.previous(), bucket, bucket.next()] {
            duties.extend(self.list_month(user_id, month).await?);
        }
        Ok(duties)
    }
}
