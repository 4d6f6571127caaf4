//! Append-only, partitioned publish/subscribe channel for saga events.
//!
//! Topics are named by event type. Delivery is at-least-once; ordering is
//! preserved only among records sharing a partition key (the order id).
//! Every consumer group runs incoming records through a bounded
//! [`IdempotencyGuard`] before its handler sees them, and handlers are still
//! required to be idempotent themselves — the guard is in-memory and
//! per-process, so it only dedups within one instance's recent history.

pub mod dedup;
pub mod log;
pub mod memory;
pub mod record;

pub use dedup::IdempotencyGuard;
pub use log::{EventHandler, EventLog, EventLogError, Result};
pub use memory::InMemoryEventLog;
pub use record::{EventId, EventRecord, EventRecordBuilder};
