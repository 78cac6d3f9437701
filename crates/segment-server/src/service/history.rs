//! Monthly history snapshot/render pipeline (C7). A month must be
//! `prepare`d (snapshotted into the cache) before it can be `get` or
//! rendered; an unprepared or evicted month reports [`ServiceError::ExpiredData`]
//! rather than falling back to the store, matching the original's
//! download-link semantics.

use std::sync::Arc;
use std::time::Duration;

use segment_core::{render, Clock, HistoryEvent, MonthKey};
use tracing::debug;

use crate::error::ServiceError;
use crate::store::HistoryStore;

pub struct HistoryService {
    store: Arc<dyn HistoryStore>,
    cache: Arc<segment_core::TtlCache<i32, Vec<HistoryEvent>>>,
    cache_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl HistoryService {
    #[must_use]
    pub fn new(
        store: Arc<dyn HistoryStore>,
        cache: Arc<segment_core::TtlCache<i32, Vec<HistoryEvent>>>,
        cache_ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            cache,
            cache_ttl,
            clock,
        }
    }

    /// Validates `(year, month)`. If the snapshot cache already holds an
    /// entry for this month, returns immediately; otherwise reads the
    /// month's rows from the store and caches the snapshot under
    /// `cache_ttl`. Calling `prepare` twice in succession within the cache
    /// TTL performs exactly one store read.
    pub async fn prepare(&self, year: i32, month: u32) -> Result<(), ServiceError> {
        let key = MonthKey::new(year, month, self.clock.now())?;
        if self.cache.get(&key.cache_key()).is_some() {
            debug!(year, month, "history snapshot already prepared");
            return Ok(());
        }
        debug!(year, month, "preparing history snapshot");
        let events = self.store.get_month(key).await?;
        self.cache.set(key.cache_key(), events, self.cache_ttl);
        Ok(())
    }

    /// Returns the prepared snapshot for `(year, month)`, or
    /// [`ServiceError::ExpiredData`] if it was never prepared or has since
    /// expired from the cache.
    pub async fn get(&self, year: i32, month: u32) -> Result<Vec<HistoryEvent>, ServiceError> {
        let key = MonthKey::new(year, month, self.clock.now())?;
        self.cache.get(&key.cache_key()).ok_or(ServiceError::ExpiredData)
    }

    /// Renders the prepared snapshot for `(year, month)` as CSV bytes.
    pub async fn render_csv(&self, year: i32, month: u32) -> Result<Vec<u8>, ServiceError> {
        let events = self.get(year, month).await?;
        render(&events).map_err(|e| ServiceError::Store(crate::error::StoreError::Internal(e.into())))
    }
}
