//! `segment-server` — Postgres-backed storage, services, and background
//! tasks for the user-segment membership engine. Owns everything the core
//! leaf types in `segment-core` need a database or a clock-driven task to
//! implement; deliberately stops short of an HTTP surface (out of scope).

pub mod config;
pub mod error;
pub mod service;
pub mod store;
pub mod sweeper;
pub mod telemetry;

pub use config::Config;
pub use error::{ServiceError, StoreError};
pub use service::{AddRequest, HistoryService, MembershipService, SegmentService};
pub use store::{
    HistoryStore, MembershipStore, PgHistoryStore, PgMembershipStore, PgSegmentStore, SegmentAdd,
    SegmentStore,
};
pub use sweeper::ExpirySweeper;

#[cfg(test)]
mod tests {
    #[test]
    fn crate_loads() {}
}
