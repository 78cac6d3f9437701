//! Domain model (§3): users, segments, memberships, history events, and the
//! month-key used both as a history partition key and a snapshot cache key.

mod history;
mod month;
mod segment;
mod user;

pub use history::{HistoryEvent, Operation};
pub use month::{MonthKey, MonthKeyError, EARLIEST_YEAR};
pub use segment::{Segment, SegmentInfo};
pub use user::User;

use chrono::{DateTime, TimeZone, Utc};

/// The fixed UTC instant representing "does not expire". The sweeper's
/// predicate `expired_at < now()` excludes it naturally since no real clock
/// value reaches the year 9999.
pub fn far_future() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap()
}

/// Lazily-evaluated constant form of [`far_future`], for call sites that
/// want a `const`-like value without re-deriving it.
pub static FAR_FUTURE: std::sync::LazyLock<DateTime<Utc>> = std::sync::LazyLock::new(far_future);

/// Projection over an active membership joined with its segment. Returned
/// to clients and used as the per-user cache value.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MembershipInfo {
    pub user_id: i64,
    pub segment_name: String,
    pub expired_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn far_future_is_stable() {
        assert_eq!(far_future(), *FAR_FUTURE);
        assert_eq!(far_future().to_rfc3339(), "9999-12-31T23:59:59+00:00");
    }
}
