//! User creation and membership mutation (C6). Validates composite-update
//! payloads and caches per-user reads with a short, coherence-trading TTL.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;
use segment_core::{Clock, MembershipInfo, ShiftEmitter, TtlCache, User};
use tracing::{debug, error};

use crate::error::ServiceError;
use crate::store::{MembershipStore, SegmentAdd};

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.+@[^.].*\.[a-z]{2,}$").unwrap());

/// One requested addition from an HTTP-layer payload: a segment name and an
/// optional TTL in seconds (`0`/absent means "no expiry").
#[derive(Debug, Clone)]
pub struct AddRequest {
    pub segment_name: String,
    pub ttl_seconds: Option<i64>,
}

pub struct MembershipService {
    store: Arc<dyn MembershipStore>,
    cache: Arc<TtlCache<i64, Vec<MembershipInfo>>>,
    cache_ttl: Duration,
    clock: Arc<dyn Clock>,
    shift: tokio::sync::Mutex<ShiftEmitter>,
}

impl MembershipService {
    #[must_use]
    pub fn new(
        store: Arc<dyn MembershipStore>,
        cache: Arc<TtlCache<i64, Vec<MembershipInfo>>>,
        cache_ttl: Duration,
        clock: Arc<dyn Clock>,
        shift: ShiftEmitter,
    ) -> Self {
        Self {
            store,
            cache,
            cache_ttl,
            clock,
            shift: tokio::sync::Mutex::new(shift),
        }
    }

    /// Validates the email, draws a hit percentage from the shift generator,
    /// and delegates to the store.
    pub async fn create_user(&self, user: User) -> Result<i64, ServiceError> {
        debug!(email = %user.email, "try to create user");
        if !EMAIL_PATTERN.is_match(&user.email) {
            return Err(ServiceError::InvalidEmail);
        }

        let hit_percentage = i32::try_from(self.shift.lock().await.next().await).unwrap_or(0);
        let id = self.store.create_user(user, hit_percentage).await?;
        Ok(id)
    }

    /// Cache hit returns the cached list; on miss, reads the store and
    /// caches the result (including an empty list) under `cache_ttl`.
    pub async fn get_user_memberships(
        &self,
        user_id: i64,
    ) -> Result<Vec<MembershipInfo>, ServiceError> {
        debug!(user_id, "try to get user segments");
        if let Some(cached) = self.cache.get(&user_id) {
            return Ok(cached);
        }

        let info = self.store.get_user_memberships(user_id).await.map_err(|e| {
            error!(user_id, error = %e, "error in getting membership info");
            e
        })?;
        self.cache.set(user_id, info.clone(), self.cache_ttl);
        Ok(info)
    }

    /// Rejects an all-empty payload and any name appearing in both the add
    /// and delete sets, then delegates to the store (§4.6).
    pub async fn update_user_memberships(
        &self,
        user_id: i64,
        adds: Vec<AddRequest>,
        deletes: Vec<String>,
    ) -> Result<(), ServiceError> {
        debug!(user_id, adds = adds.len(), deletes = deletes.len(), "try to update user memberships");
        if adds.is_empty() && deletes.is_empty() {
            return Err(ServiceError::EmptyData);
        }

        let add_names: HashSet<&str> = adds.iter().map(|a| a.segment_name.as_str()).collect();
        if deletes.iter().any(|d| add_names.contains(d.as_str())) {
            return Err(ServiceError::IncorrectData);
        }

        let to_add: Vec<SegmentAdd> = adds
            .into_iter()
            .map(|a| SegmentAdd {
                segment_name: a.segment_name,
                expires_at: a
                    .ttl_seconds
                    .filter(|s| *s > 0)
                    .map(|s| self.clock.now() + chrono::Duration::seconds(s)),
            })
            .collect();

        self.store
            .update_user_memberships(user_id, &to_add, &deletes)
            .await?;
        Ok(())
    }

    pub async fn delete_membership(&self, segment_name: &str) -> Result<(), ServiceError> {
        debug!(segment = segment_name, "try to delete segment");
        self.store.delete_segment(segment_name).await?;
        Ok(())
    }
}
