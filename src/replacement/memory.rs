//! In-memory duty repository.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::{BucketMonth, DutyRecord};

use super::ports::{DutyRepository, RepositoryResult};

/// Duty storage held in process memory, keyed by user.
///
/// Used by the server binary and tests. Contents are lost on restart.
///
/// # Example
///
/// ```
/// use crew_pay_engine::models::BucketMonth;
/// use crew_pay_engine::replacement::{DutyRepository, InMemoryDutyRepository};
///
/// # #[tokio::main]
/// # async fn main() {
/// let repository = InMemoryDutyRepository::new();
/// let march = BucketMonth::new(3, 2024).unwrap();
/// assert!(repository.list_month("crew_001", march).await.unwrap().is_empty());
/// # }
/// ```
#[derive(Debug, Default)]
pub struct InMemoryDutyRepository {
    duties: RwLock<HashMap<String, Vec<DutyRecord>>>,
}

impl InMemoryDutyRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored duties across all users.
    pub async fn len(&self) -> usize {
        self.duties.read().await.values().map(Vec::len).sum()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl DutyRepository for InMemoryDutyRepository {
    async fn list_month(
        &self,
        user_id: &str,
        bucket: BucketMonth,
    ) -> RepositoryResult<Vec<DutyRecord>> {
        let duties = self.duties.read().await;
        Ok(duties
            .get(user_id)
            .map(|records| {
                records
                    .iter()
                    .filter(|d| d.bucket == bucket)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn delete_month(&self, user_id: &str, bucket: BucketMonth) -> RepositoryResult<usize> {
        let mut duties = self.duties.write().await;
        let Some(records) = duties.get_mut(user_id) else {
            return Ok(0);
        };
        let before = records.len();
        records.retain(|d| d.bucket != bucket);
        Ok(before - records.len())
    }

    async fn save_duties(&self, records: Vec<DutyRecord>) -> RepositoryResult<usize> {
        let count = records.len();
        let mut duties = self.duties.write().await;
        for record in records {
            duties.entry(record.user_id.clone()).or_default().push(record);
        }
        Ok(count)
    }
}
