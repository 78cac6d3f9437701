//! Plain segment CRUD (C5 support) — no transaction needed, single
//! statements per call.

use async_trait::async_trait;
use segment_core::SegmentInfo;
use sqlx::PgPool;

use crate::error::StoreError;

#[async_trait]
pub trait SegmentStore: Send + Sync {
    async fn create(&self, name: &str, automatic_percentage: i32) -> Result<i64, StoreError>;
    async fn get(&self, name: &str) -> Result<SegmentInfo, StoreError>;
    async fn get_all(&self) -> Result<Vec<SegmentInfo>, StoreError>;
}

pub struct PgSegmentStore {
    pool: PgPool,
}

impl PgSegmentStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SegmentStore for PgSegmentStore {
    async fn create(&self, name: &str, automatic_percentage: i32) -> Result<i64, StoreError> {
        sqlx::query_scalar(
            "INSERT INTO segments (segment_name, automatic_percentage) VALUES ($1, $2)
             RETURNING segment_id",
        )
        .bind(name)
        .bind(automatic_percentage)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if let sqlx::Error::Database(ref db_err) = err {
                if db_err.code().as_deref() == Some(crate::error::PG_UNIQUE_VIOLATION) {
                    return StoreError::SegmentAlreadyExists;
                }
            }
            StoreError::Internal(err.into())
        })
    }

    async fn get(&self, name: &str) -> Result<SegmentInfo, StoreError> {
        let row: Option<(i64, String)> =
            sqlx::query_as("SELECT segment_id, segment_name FROM segments WHERE segment_name = $1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::Internal(e.into()))?;

        row.map(|(id, name)| SegmentInfo { id, name })
            .ok_or(StoreError::SegmentNotFound)
    }

    async fn get_all(&self) -> Result<Vec<SegmentInfo>, StoreError> {
        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT segment_id, segment_name FROM segments")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| StoreError::Internal(e.into()))?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| SegmentInfo { id, name })
            .collect())
    }
}
