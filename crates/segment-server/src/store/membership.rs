//! Transactional persistence of memberships and history (C4) — the heart of
//! the core. Every composite operation runs inside one `sqlx::Transaction`;
//! any domain or internal error rolls it back.

use std::sync::Arc;

use async_trait::async_trait;
use segment_core::{Clock, HistoryEvent, MembershipInfo, Operation, User, FAR_FUTURE};
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::{classify_create_user_error, classify_insert_error, StoreError};

/// A single `(segment_name, optional_expiry)` addition requested by a
/// caller of [`MembershipStore::update_user_memberships`].
#[derive(Debug, Clone)]
pub struct SegmentAdd {
    pub segment_name: String,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// The five composite operations of §4.4, each atomic.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    async fn update_user_memberships(
        &self,
        user_id: i64,
        to_add: &[SegmentAdd],
        to_delete: &[String],
    ) -> Result<(), StoreError>;

    async fn delete_segment(&self, name: &str) -> Result<(), StoreError>;

    async fn get_user_memberships(&self, user_id: i64) -> Result<Vec<MembershipInfo>, StoreError>;

    async fn create_user(&self, user: User, hit_percentage: i32) -> Result<i64, StoreError>;

    async fn delete_expired(&self) -> Result<(), StoreError>;
}

/// Postgres-backed [`MembershipStore`].
pub struct PgMembershipStore {
    pool: PgPool,
    clock: Arc<dyn Clock>,
}

impl PgMembershipStore {
    #[must_use]
    pub fn new(pool: PgPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    async fn resolve_segment_ids(
        tx: &mut Transaction<'_, Postgres>,
        names: &[String],
    ) -> Result<Vec<(i64, String)>, StoreError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<(i64, String)> = sqlx::query_as(
            "SELECT segment_id, segment_name FROM segments WHERE segment_name = ANY($1)",
        )
        .bind(names)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| StoreError::Internal(e.into()))?;

        if rows.len() != names.len() {
            return Err(StoreError::SegmentNotFound);
        }
        Ok(rows)
    }
}

#[async_trait]
impl MembershipStore for PgMembershipStore {
    async fn update_user_memberships(
        &self,
        user_id: i64,
        to_add: &[SegmentAdd],
        to_delete: &[String],
    ) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Internal(e.into()))?;

        if !to_add.is_empty() {
            let names: Vec<String> = to_add.iter().map(|a| a.segment_name.clone()).collect();
            let resolved = Self::resolve_segment_ids(&mut tx, &names).await?;
            let id_by_name: std::collections::HashMap<_, _> =
                resolved.into_iter().map(|(id, name)| (name, id)).collect();

            let mut user_ids = Vec::with_capacity(to_add.len());
            let mut segment_ids = Vec::with_capacity(to_add.len());
            let mut expirations = Vec::with_capacity(to_add.len());
            for add in to_add {
                let Some(&segment_id) = id_by_name.get(&add.segment_name) else {
                    return Err(StoreError::SegmentNotFound);
                };
                user_ids.push(user_id);
                segment_ids.push(segment_id);
                expirations.push(add.expires_at.unwrap_or(*FAR_FUTURE));
            }

            let affected = sqlx::query(
                "INSERT INTO user_segments (user_id, segment_id, expired_at)
                 SELECT * FROM UNNEST($1::bigint[], $2::bigint[], $3::timestamptz[])",
            )
            .bind(&user_ids)
            .bind(&segment_ids)
            .bind(&expirations)
            .execute(&mut *tx)
            .await
            .map_err(classify_insert_error)?
            .rows_affected();

            if affected != to_add.len() as u64 {
                return Err(StoreError::Internal(anyhow::anyhow!(
                    "insert affected {affected} rows, wanted {}",
                    to_add.len()
                )));
            }
        }

        if !to_delete.is_empty() {
            let resolved = Self::resolve_segment_ids(&mut tx, to_delete).await?;
            let segment_ids: Vec<i64> = resolved.into_iter().map(|(id, _)| id).collect();

            let affected = sqlx::query(
                "DELETE FROM user_segments WHERE user_id = $1 AND segment_id = ANY($2)",
            )
            .bind(user_id)
            .bind(&segment_ids)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Internal(e.into()))?
            .rows_affected();

            if affected != to_delete.len() as u64 {
                return Err(StoreError::SegmentNotAssigned);
            }
        }

        let now = self.clock.now();
        let total = to_add.len() + to_delete.len();
        if total > 0 {
            let mut user_ids = Vec::with_capacity(total);
            let mut names = Vec::with_capacity(total);
            let mut ops = Vec::with_capacity(total);
            let mut timestamps = Vec::with_capacity(total);

            for add in to_add {
                user_ids.push(user_id);
                names.push(add.segment_name.clone());
                ops.push(Operation::Added.as_str());
                timestamps.push(now);
            }
            for name in to_delete {
                user_ids.push(user_id);
                names.push(name.clone());
                ops.push(Operation::Deleted.as_str());
                timestamps.push(now);
            }

            let affected = sqlx::query(
                "INSERT INTO segment_history (user_id, segment_name, operation, operation_timestamp)
                 SELECT * FROM UNNEST($1::bigint[], $2::text[], $3::text[], $4::timestamptz[])",
            )
            .bind(&user_ids)
            .bind(&names)
            .bind(&ops)
            .bind(&timestamps)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Internal(e.into()))?
            .rows_affected();

            if affected != total as u64 {
                return Err(StoreError::Internal(anyhow::anyhow!(
                    "history insert affected {affected} rows, wanted {total}"
                )));
            }
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Internal(e.into()))?;
        Ok(())
    }

    async fn delete_segment(&self, name: &str) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Internal(e.into()))?;

        let segment_id: Option<i64> =
            sqlx::query_scalar("SELECT segment_id FROM segments WHERE segment_name = $1")
                .bind(name)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| StoreError::Internal(e.into()))?;
        let Some(segment_id) = segment_id else {
            return Err(StoreError::SegmentNotFound);
        };

        let user_ids: Vec<i64> =
            sqlx::query_scalar("SELECT user_id FROM user_segments WHERE segment_id = $1")
                .bind(segment_id)
                .fetch_all(&mut *tx)
                .await
                .map_err(|e| StoreError::Internal(e.into()))?;

        if !user_ids.is_empty() {
            sqlx::query("DELETE FROM user_segments WHERE segment_id = $1")
                .bind(segment_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| StoreError::Internal(e.into()))?;

            let now = self.clock.now();
            let names = vec![name.to_string(); user_ids.len()];
            let ops = vec![Operation::Deleted.as_str(); user_ids.len()];
            let timestamps = vec![now; user_ids.len()];

            sqlx::query(
                "INSERT INTO segment_history (user_id, segment_name, operation, operation_timestamp)
                 SELECT * FROM UNNEST($1::bigint[], $2::text[], $3::text[], $4::timestamptz[])",
            )
            .bind(&user_ids)
            .bind(&names)
            .bind(&ops)
            .bind(&timestamps)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Internal(e.into()))?;
        }

        let affected = sqlx::query("DELETE FROM segments WHERE segment_id = $1")
            .bind(segment_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Internal(e.into()))?
            .rows_affected();
        if affected == 0 {
            return Err(StoreError::SegmentNotFound);
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Internal(e.into()))?;
        Ok(())
    }

    async fn get_user_memberships(&self, user_id: i64) -> Result<Vec<MembershipInfo>, StoreError> {
        let now = self.clock.now();
        let rows: Vec<(i64, String, chrono::DateTime<chrono::Utc>)> = sqlx::query_as(
            "SELECT us.user_id, s.segment_name, us.expired_at
             FROM user_segments us JOIN segments s USING (segment_id)
             WHERE us.user_id = $1 AND us.expired_at > $2",
        )
        .bind(user_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Internal(e.into()))?;

        Ok(rows
            .into_iter()
            .map(|(user_id, segment_name, expired_at)| MembershipInfo {
                user_id,
                segment_name,
                expired_at,
            })
            .collect())
    }

    async fn create_user(&self, user: User, hit_percentage: i32) -> Result<i64, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Internal(e.into()))?;

        let user_id: i64 = sqlx::query_scalar(
            "INSERT INTO users (first_name, last_name, email) VALUES ($1, $2, $3)
             RETURNING user_id",
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .fetch_one(&mut *tx)
        .await
        .map_err(classify_create_user_error)?;

        let auto_segments: Vec<(i64, String)> = sqlx::query_as(
            "SELECT segment_id, segment_name FROM segments WHERE automatic_percentage < $1",
        )
        .bind(hit_percentage)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| StoreError::Internal(e.into()))?;

        if !auto_segments.is_empty() {
            let user_ids = vec![user_id; auto_segments.len()];
            let segment_ids: Vec<i64> = auto_segments.iter().map(|(id, _)| *id).collect();
            let expirations = vec![*FAR_FUTURE; auto_segments.len()];

            sqlx::query(
                "INSERT INTO user_segments (user_id, segment_id, expired_at)
                 SELECT * FROM UNNEST($1::bigint[], $2::bigint[], $3::timestamptz[])",
            )
            .bind(&user_ids)
            .bind(&segment_ids)
            .bind(&expirations)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Internal(e.into()))?;

            let now = self.clock.now();
            let names: Vec<String> = auto_segments.into_iter().map(|(_, name)| name).collect();
            let ops = vec![Operation::Added.as_str(); names.len()];
            let timestamps = vec![now; names.len()];

            sqlx::query(
                "INSERT INTO segment_history (user_id, segment_name, operation, operation_timestamp)
                 SELECT * FROM UNNEST($1::bigint[], $2::text[], $3::text[], $4::timestamptz[])",
            )
            .bind(&user_ids)
            .bind(&names)
            .bind(&ops)
            .bind(&timestamps)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Internal(e.into()))?;
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Internal(e.into()))?;
        Ok(user_id)
    }

    async fn delete_expired(&self) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Internal(e.into()))?;

        let now = self.clock.now();
        let expired: Vec<(i64, String, chrono::DateTime<chrono::Utc>)> = sqlx::query_as(
            "SELECT us.user_id, s.segment_name, us.expired_at
             FROM user_segments us JOIN segments s USING (segment_id)
             WHERE us.expired_at < $1",
        )
        .bind(now)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| StoreError::Internal(e.into()))?;

        if !expired.is_empty() {
            let user_ids: Vec<i64> = expired.iter().map(|(id, _, _)| *id).collect();
            let names: Vec<String> = expired.iter().map(|(_, name, _)| name.clone()).collect();
            let ops = vec![Operation::Deleted.as_str(); expired.len()];
            let timestamps: Vec<_> = expired.iter().map(|(_, _, at)| *at).collect();

            sqlx::query(
                "INSERT INTO segment_history (user_id, segment_name, operation, operation_timestamp)
                 SELECT * FROM UNNEST($1::bigint[], $2::text[], $3::text[], $4::timestamptz[])",
            )
            .bind(&user_ids)
            .bind(&names)
            .bind(&ops)
            .bind(&timestamps)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Internal(e.into()))?;

            sqlx::query("DELETE FROM user_segments WHERE expired_at < $1")
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(|e| StoreError::Internal(e.into()))?;
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Internal(e.into()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_add_carries_optional_expiry() {
        let add = SegmentAdd {
            segment_name: "promo_a".to_string(),
            expires_at: None,
        };
        assert_eq!(add.segment_name, "promo_a");
        assert!(add.expires_at.is_none());
    }
}
