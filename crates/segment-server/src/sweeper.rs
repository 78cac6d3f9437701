//! Background expiry sweeper (C8). Mirrors the cache purger's shape: a
//! single spawned loop on a [`tokio::time::interval`], cancellable via a
//! shared [`CancellationToken`], that logs and continues on failure instead
//! of dying. Each tick bounds its sweep with a child deadline equal to the
//! tick interval (§4.8 step 2, §5); a sweep that overruns it is logged and
//! the next tick simply retries.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::store::MembershipStore;

/// Periodically calls [`MembershipStore::delete_expired`]. Holds only the
/// cancellation handle; the spawned task owns everything else.
pub struct ExpirySweeper {
    token: CancellationToken,
}

impl ExpirySweeper {
    /// Spawns the sweeper loop at `interval`. The returned handle's `stop`
    /// cancels it; dropping the handle does not.
    #[must_use]
    pub fn spawn(store: Arc<dyn MembershipStore>, interval: Duration) -> Self {
        let token = CancellationToken::new();
        let loop_token = token.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    () = loop_token.cancelled() => break,
                    _ = ticker.tick() => {
                        match tokio::time::timeout(interval, store.delete_expired()).await {
                            Ok(Err(err)) => error!(error = %err, "expiry sweep failed"),
                            Err(_) => error!(?interval, "expiry sweep timed out"),
                            Ok(Ok(())) => {}
                        }
                    }
                }
            }
        });
        Self { token }
    }

    /// Stops the sweeper loop. Idempotent.
    pub fn stop(&self) {
        self.token.cancel();
    }
}

impl Drop for ExpirySweeper {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use async_trait::async_trait;
    use segment_core::{MembershipInfo, User};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingStore {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MembershipStore for CountingStore {
        async fn update_user_memberships(
            &self,
            _user_id: i64,
            _to_add: &[crate::store::SegmentAdd],
            _to_delete: &[String],
        ) -> Result<(), StoreError> {
            Ok(())
        }

        async fn delete_segment(&self, _name: &str) -> Result<(), StoreError> {
            Ok(())
        }

        async fn get_user_memberships(
            &self,
            _user_id: i64,
        ) -> Result<Vec<MembershipInfo>, StoreError> {
            Ok(Vec::new())
        }

        async fn create_user(&self, _user: User, _hit_percentage: i32) -> Result<i64, StoreError> {
            Ok(1)
        }

        async fn delete_expired(&self) -> Result<(), StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn sweeps_on_every_tick_until_stopped() {
        let store = Arc::new(CountingStore::default());
        let sweeper = ExpirySweeper::spawn(store.clone(), Duration::from_secs(10));

        tokio::time::advance(Duration::from_secs(35)).await;
        tokio::task::yield_now().await;
        assert!(store.calls.load(Ordering::SeqCst) >= 3);

        sweeper.stop();
    }

    #[derive(Default)]
    struct SlowStore {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MembershipStore for SlowStore {
        async fn update_user_memberships(
            &self,
            _user_id: i64,
            _to_add: &[crate::store::SegmentAdd],
            _to_delete: &[String],
        ) -> Result<(), StoreError> {
            Ok(())
        }

        async fn delete_segment(&self, _name: &str) -> Result<(), StoreError> {
            Ok(())
        }

        async fn get_user_memberships(
            &self,
            _user_id: i64,
        ) -> Result<Vec<MembershipInfo>, StoreError> {
            Ok(Vec::new())
        }

        async fn create_user(&self, _user: User, _hit_percentage: i32) -> Result<i64, StoreError> {
            Ok(1)
        }

        async fn delete_expired(&self) -> Result<(), StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            // Longer than the configured tick interval, so every sweep times out.
            tokio::time::sleep(Duration::from_secs(20)).await;
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn an_overrunning_sweep_is_bounded_by_the_tick_interval() {
        let store = Arc::new(SlowStore::default());
        let sweeper = ExpirySweeper::spawn(store.clone(), Duration::from_secs(10));

        // Each sweep takes 20s against a 10s interval: the timeout fires and
        // the loop keeps ticking instead of stalling on the first call.
        tokio::time::advance(Duration::from_secs(35)).await;
        tokio::task::yield_now().await;
        assert!(store.calls.load(Ordering::SeqCst) >= 3);

        sweeper.stop();
    }
}
