//! `segment-core` — dependency-light leaf types shared by the membership engine.
//!
//! Holds the pieces that need no database or network I/O: the [`Clock`]
//! abstraction, the [`ShiftGenerator`] auto-enrollment draw, the [`TtlCache`],
//! the [`BufferPool`], the CSV row contract, and the domain model.

pub mod buffer_pool;
pub mod cache;
pub mod clock;
pub mod csv;
pub mod model;
pub mod shift;

pub use buffer_pool::BufferPool;
pub use cache::TtlCache;
pub use clock::{Clock, FixedClock, SystemClock};
pub use csv::{render, CsvError, CsvRow};
pub use model::{
    HistoryEvent, MembershipInfo, MonthKey, MonthKeyError, Operation, Segment, SegmentInfo, User,
    FAR_FUTURE,
};
pub use shift::{ShiftEmitter, ShiftGenerator};

#[cfg(test)]
mod tests {
    #[test]
    fn crate_loads() {}
}
