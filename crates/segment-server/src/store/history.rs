//! Read-only history repo (C7 support) — fetches a month's rows for
//! snapshotting, ordered by `(user_id, operation_timestamp)` per §4.7.

use async_trait::async_trait;
use segment_core::{HistoryEvent, MonthKey, Operation};
use sqlx::PgPool;

use crate::error::StoreError;

#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn get_month(&self, key: MonthKey) -> Result<Vec<HistoryEvent>, StoreError>;
}

pub struct PgHistoryStore {
    pool: PgPool,
}

impl PgHistoryStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryStore for PgHistoryStore {
    async fn get_month(&self, key: MonthKey) -> Result<Vec<HistoryEvent>, StoreError> {
        let rows: Vec<(i64, i64, String, String, chrono::DateTime<chrono::Utc>)> = sqlx::query_as(
            "SELECT history_id, user_id, segment_name, operation, operation_timestamp
             FROM segment_history
             WHERE extract(year from operation_timestamp) = $1
               AND extract(month from operation_timestamp) = $2
             ORDER BY user_id, operation_timestamp",
        )
        .bind(i64::from(key.year))
        .bind(i64::from(key.month))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Internal(e.into()))?;

        rows.into_iter()
            .map(|(history_id, user_id, segment_name, operation, operation_timestamp)| {
                let operation = match operation.as_str() {
                    "added" => Operation::Added,
                    "deleted" => Operation::Deleted,
                    other => {
                        return Err(StoreError::Internal(anyhow::anyhow!(
                            "unknown operation in segment_history: {other}"
                        )))
                    }
                };
                Ok(HistoryEvent {
                    history_id,
                    user_id,
                    segment_name,
                    operation,
                    operation_timestamp,
                })
            })
            .collect()
    }
}
