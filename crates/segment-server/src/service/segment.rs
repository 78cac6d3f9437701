//! Thin wrapper around [`SegmentStore`] (C5). Enforces the uniqueness
//! policy's fast path; the true guard is the store's unique constraint.

use std::sync::Arc;

use segment_core::SegmentInfo;
use tracing::debug;

use crate::error::{ServiceError, StoreError};
use crate::store::SegmentStore;

pub struct SegmentService {
    store: Arc<dyn SegmentStore>,
}

impl SegmentService {
    #[must_use]
    pub fn new(store: Arc<dyn SegmentStore>) -> Self {
        Self { store }
    }

    /// Creates a segment with the given hit percentage (§4.5): looks the
    /// name up first to give a precise `SegmentAlreadyExists` error, then
    /// stores the complement `100 - hit_percentage` as the automatic
    /// percentage. The lookup is a fast path, not a lock — the store's
    /// unique constraint on `segment_name` is the real guard.
    pub async fn create_segment(
        &self,
        name: &str,
        hit_percentage: i32,
    ) -> Result<i64, ServiceError> {
        debug!(segment = name, "try to create segment");
        match self.store.get(name).await {
            Ok(_) => return Err(ServiceError::Store(StoreError::SegmentAlreadyExists)),
            Err(StoreError::SegmentNotFound) => {}
            Err(other) => return Err(other.into()),
        }
        self.store
            .create(name, 100 - hit_percentage)
            .await
            .map_err(Into::into)
    }

    pub async fn get_all_segments(&self) -> Result<Vec<SegmentInfo>, ServiceError> {
        self.store.get_all().await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeSegmentStore {
        existing: Mutex<Vec<SegmentInfo>>,
    }

    #[async_trait]
    impl SegmentStore for FakeSegmentStore {
        async fn create(&self, name: &str, automatic_percentage: i32) -> Result<i64, StoreError> {
            let mut existing = self.existing.lock().unwrap();
            if existing.iter().any(|s| s.name == name) {
                return Err(StoreError::SegmentAlreadyExists);
            }
            let id = existing.len() as i64 + 1;
            existing.push(SegmentInfo {
                id,
                name: name.to_string(),
            });
            let _ = automatic_percentage;
            Ok(id)
        }

        async fn get(&self, name: &str) -> Result<SegmentInfo, StoreError> {
            self.existing
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.name == name)
                .cloned()
                .ok_or(StoreError::SegmentNotFound)
        }

        async fn get_all(&self) -> Result<Vec<SegmentInfo>, StoreError> {
            Ok(self.existing.lock().unwrap().clone())
        }
    }

    #[tokio::test]
    async fn create_segment_stores_complement_of_hit_percentage() {
        let store = Arc::new(FakeSegmentStore::default());
        let service = SegmentService::new(store.clone());
        let id = service.create_segment("promo_a", 10).await.unwrap();
        assert_eq!(id, 1);
        assert!(store.get("promo_a").await.is_ok());
    }

    #[tokio::test]
    async fn create_segment_twice_is_already_exists() {
        let store = Arc::new(FakeSegmentStore::default());
        let service = SegmentService::new(store);
        service.create_segment("promo_a", 10).await.unwrap();
        let err = service.create_segment("promo_a", 10).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Store(StoreError::SegmentAlreadyExists)
        ));
    }
}
