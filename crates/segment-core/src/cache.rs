//! Concurrent key-value store with per-entry absolute expiry and a single
//! background purger.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;

use crate::clock::Clock;

struct Entry<V> {
    value: V,
    /// Absolute expiry in epoch nanoseconds. `0` means "no expiry".
    expire_at_nanos: i64,
}

/// Concurrent mapping from `K` to `V`, each entry stamped with an absolute
/// expiry. A present-but-expired entry reports a miss on `get` without being
/// removed; the purger is responsible for eviction.
pub struct TtlCache<K, V> {
    values: DashMap<K, Entry<V>>,
    clock: Arc<dyn Clock>,
    purge_token: CancellationToken,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates a cache and starts its background purger, which sweeps every
    /// `purge_interval` removing entries whose expiry has passed. A
    /// non-positive interval disables the purger (entries still report as
    /// expired on `get`, they just aren't proactively evicted).
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, purge_interval: StdDuration) -> Arc<Self> {
        let cache = Arc::new(Self {
            values: DashMap::new(),
            clock,
            purge_token: CancellationToken::new(),
        });

        if !purge_interval.is_zero() {
            let weak = Arc::downgrade(&cache);
            let token = cache.purge_token.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(purge_interval);
                loop {
                    tokio::select! {
                        () = token.cancelled() => break,
                        _ = ticker.tick() => {
                            match weak.upgrade() {
                                Some(cache) => cache.purge(),
                                None => break,
                            }
                        }
                    }
                }
            });
        }

        cache
    }

    /// Stores `value` under `key`. `ttl <= 0` (or the zero duration) means
    /// "never expires". Overwrites any existing entry.
    pub fn set(&self, key: K, value: V, ttl: StdDuration) {
        let expire_at_nanos = if ttl.is_zero() {
            0
        } else {
            let nanos = i64::try_from(ttl.as_nanos()).unwrap_or(i64::MAX);
            self.now_nanos().saturating_add(nanos)
        };
        self.values.insert(
            key,
            Entry {
                value,
                expire_at_nanos,
            },
        );
    }

    /// Returns the cached value iff an entry exists and has not expired.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        let entry = self.values.get(key)?;
        if entry.expire_at_nanos != 0 && entry.expire_at_nanos < self.now_nanos() {
            return None;
        }
        Some(entry.value.clone())
    }

    /// Removes `key` unconditionally.
    pub fn delete(&self, key: &K) {
        self.values.remove(key);
    }

    /// Stops the background purger. Further `get`/`set`/`delete` calls
    /// remain valid; only eviction stops.
    pub fn close(&self) {
        self.purge_token.cancel();
    }

    fn now_nanos(&self) -> i64 {
        self.clock
            .now()
            .timestamp_nanos_opt()
            .unwrap_or(i64::MAX)
    }

    fn purge(&self) {
        let now = self.now_nanos();
        self.values
            .retain(|_, entry| entry.expire_at_nanos == 0 || entry.expire_at_nanos >= now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{DateTime, Duration as ChronoDuration, Utc};

    fn start() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[tokio::test]
    async fn get_after_set_with_ttl_returns_value() {
        let clock = Arc::new(FixedClock::new(start()));
        let cache: Arc<TtlCache<&str, i32>> = TtlCache::new(clock, StdDuration::ZERO);
        cache.set("k", 1, StdDuration::from_secs(5));
        assert_eq!(cache.get(&"k"), Some(1));
    }

    #[tokio::test]
    async fn get_reports_miss_once_clock_passes_expiry() {
        let clock = Arc::new(FixedClock::new(start()));
        let cache: Arc<TtlCache<&str, i32>> = TtlCache::new(clock.clone(), StdDuration::ZERO);
        cache.set("k", 1, StdDuration::from_secs(5));
        clock.advance(ChronoDuration::seconds(6));
        assert_eq!(cache.get(&"k"), None);
    }

    #[tokio::test]
    async fn zero_ttl_never_expires() {
        let clock = Arc::new(FixedClock::new(start()));
        let cache: Arc<TtlCache<&str, i32>> = TtlCache::new(clock.clone(), StdDuration::ZERO);
        cache.set("k", 1, StdDuration::ZERO);
        clock.advance(ChronoDuration::days(3650));
        assert_eq!(cache.get(&"k"), Some(1));
    }

    #[tokio::test]
    async fn delete_removes_entry() {
        let clock = Arc::new(FixedClock::new(start()));
        let cache: Arc<TtlCache<&str, i32>> = TtlCache::new(clock, StdDuration::ZERO);
        cache.set("k", 1, StdDuration::ZERO);
        cache.delete(&"k");
        assert_eq!(cache.get(&"k"), None);
    }
}
