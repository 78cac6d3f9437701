//! Clock abstraction — the sole source of "now" inside the core.
//!
//! Every timestamp the store, the services, or the sweeper persist or
//! compare must come from an injected `Arc<dyn Clock>`. Direct
//! `Utc::now()` reads outside [`SystemClock`] and test doubles are
//! disallowed so that tests and the sweeper can be driven deterministically.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

/// Source of "now" for the core. Implementations must be cheap to call
/// repeatedly within a single composite operation.
pub trait Clock: Send + Sync {
    /// Current wall-clock time.
    fn now(&self) -> DateTime<Utc>;

    /// Time elapsed since `t`. Negative if `t` is in the future.
    fn since(&self, t: DateTime<Utc>) -> Duration {
        self.now() - t
    }

    /// Time remaining until `t`. Negative if `t` is in the past.
    fn until(&self, t: DateTime<Utc>) -> Duration {
        t - self.now()
    }
}

/// Production clock backed by the OS wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock for tests. Starts at an arbitrary fixed instant and
/// only advances when [`FixedClock::advance`] is called.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Creates a clock pinned at `start`.
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.lock();
        *now += delta;
    }

    /// Sets the clock to an absolute instant.
    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock() = at;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_advances_on_demand() {
        let start = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let clock = FixedClock::new(start);
        assert_eq!(clock.now(), start);
        clock.advance(Duration::seconds(60));
        assert_eq!(clock.now(), start + Duration::seconds(60));
    }

    #[test]
    fn since_and_until_are_consistent() {
        let start = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let clock = FixedClock::new(start);
        let future = start + Duration::seconds(30);
        assert_eq!(clock.until(future), Duration::seconds(30));
        clock.advance(Duration::seconds(30));
        assert_eq!(clock.since(start), Duration::seconds(30));
    }
}
