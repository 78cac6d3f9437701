//! Transactional persistence layer (C4, plus C5/C7 support repos).

pub mod history;
pub mod membership;
pub mod pool;
pub mod segment;

pub use history::{HistoryStore, PgHistoryStore};
pub use membership::{MembershipStore, PgMembershipStore, SegmentAdd};
pub use segment::{PgSegmentStore, SegmentStore};
