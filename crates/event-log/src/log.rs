use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::record::EventRecord;

/// Errors that can occur when interacting with the event log.
#[derive(Debug, Error)]
pub enum EventLogError {
    /// The log rejected or failed to acknowledge a publish.
    ///
    /// When this happens after a local write has committed, the caller logs
    /// it and moves on — the local state is authoritative and downstream
    /// reconciles via replays.
    #[error("publish to '{topic}' failed: {reason}")]
    Publish { topic: String, reason: String },

    /// A subscription could not be registered.
    #[error("subscribe failed: {0}")]
    Subscribe(String),

    /// A handler failed while applying a delivered record. The record stays
    /// in the log for redelivery.
    #[error("handler error: {0}")]
    Handler(String),

    /// A serialization/deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for event log operations.
pub type Result<T> = std::result::Result<T, EventLogError>;

/// A consumer-side handler invoked once per delivered record.
///
/// Delivery is at-least-once, so handlers must produce the same end state no
/// matter how many times they see the same record — re-check entity state
/// before transitioning.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, record: &EventRecord) -> Result<()>;
}

/// Append-only, partitioned publish/subscribe channel.
///
/// Constructed at startup and passed by reference to each service; never a
/// module-level singleton.
#[async_trait]
pub trait EventLog: Send + Sync {
    /// Appends a record durably, returning once it is acknowledged.
    async fn publish(&self, record: EventRecord) -> Result<()>;

    /// Registers one consumer per group over the given topics.
    ///
    /// Each record on a subscribed topic is delivered to the group exactly
    /// one consumer at a time, at-least-once, ordered only among records
    /// sharing a partition key.
    async fn subscribe(
        &self,
        topics: Vec<String>,
        group_id: &str,
        handler: Arc<dyn EventHandler>,
    ) -> Result<()>;
}
