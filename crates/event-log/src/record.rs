use chrono::{DateTime, Utc};
use common::CorrelationId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a published event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random event ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an event ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A record on the event log.
///
/// Immutable once published. The payload is stored as JSON so the log stays
/// agnostic of the event types the two services exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Unique identifier, used by consumers for deduplication.
    pub event_id: EventId,

    /// The topic this record was published to (e.g. `payment.completed`).
    pub topic: String,

    /// Records sharing a partition key are delivered in emission order.
    pub partition_key: String,

    /// Ties all events of one saga run together.
    pub correlation_id: CorrelationId,

    /// When the record was published.
    pub timestamp: DateTime<Utc>,

    /// The event payload as JSON.
    pub payload: serde_json::Value,
}

impl EventRecord {
    /// Creates a new event record builder.
    pub fn builder() -> EventRecordBuilder {
        EventRecordBuilder::default()
    }

    /// Deserializes the payload into a typed event.
    pub fn payload_as<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

/// Builder for constructing event records.
#[derive(Debug, Default)]
pub struct EventRecordBuilder {
    event_id: Option<EventId>,
    topic: Option<String>,
    partition_key: Option<String>,
    correlation_id: Option<CorrelationId>,
    timestamp: Option<DateTime<Utc>>,
    payload: Option<serde_json::Value>,
}

impl EventRecordBuilder {
    /// Sets the event ID. If not set, a new ID is generated.
    pub fn event_id(mut self, id: EventId) -> Self {
        self.event_id = Some(id);
        self
    }

    /// Sets the topic.
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Sets the partition key.
    pub fn partition_key(mut self, key: impl Into<String>) -> Self {
        self.partition_key = Some(key.into());
        self
    }

    /// Sets the correlation ID.
    pub fn correlation_id(mut self, id: CorrelationId) -> Self {
        self.correlation_id = Some(id);
        self
    }

    /// Sets the timestamp. If not set, the current time is used.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Sets the payload from a serializable value.
    pub fn payload<T: Serialize>(mut self, payload: &T) -> Result<Self, serde_json::Error> {
        self.payload = Some(serde_json::to_value(payload)?);
        Ok(self)
    }

    /// Sets the payload from a raw JSON value.
    pub fn payload_raw(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Builds the record, returning None if a required field is missing.
    pub fn try_build(self) -> Option<EventRecord> {
        Some(EventRecord {
            event_id: self.event_id.unwrap_or_default(),
            topic: self.topic?,
            partition_key: self.partition_key?,
            correlation_id: self.correlation_id?,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            payload: self.payload?,
        })
    }

    /// Builds the record.
    ///
    /// # Panics
    ///
    /// Panics if topic, partition key, correlation ID, or payload are not set.
    pub fn build(self) -> EventRecord {
        EventRecord {
            event_id: self.event_id.unwrap_or_default(),
            topic: self.topic.expect("topic is required"),
            partition_key: self.partition_key.expect("partition_key is required"),
            correlation_id: self.correlation_id.expect("correlation_id is required"),
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            payload: self.payload.expect("payload is required"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_id_new_creates_unique_ids() {
        assert_ne!(EventId::new(), EventId::new());
    }

    #[test]
    fn builder_fills_defaults() {
        let correlation_id = CorrelationId::new();
        let record = EventRecord::builder()
            .topic("payment.initiated")
            .partition_key("order-1")
            .correlation_id(correlation_id)
            .payload_raw(serde_json::json!({"amount": 5998}))
            .build();

        assert_eq!(record.topic, "payment.initiated");
        assert_eq!(record.partition_key, "order-1");
        assert_eq!(record.correlation_id, correlation_id);
        assert_eq!(record.payload["amount"], 5998);
    }

    #[test]
    fn try_build_returns_none_on_missing_fields() {
        assert!(EventRecord::builder().try_build().is_none());
    }

    #[test]
    fn typed_payload_roundtrip() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Sample {
            value: i64,
        }

        let record = EventRecord::builder()
            .topic("t")
            .partition_key("k")
            .correlation_id(CorrelationId::new())
            .payload(&Sample { value: 7 })
            .unwrap()
            .build();

        let back: Sample = record.payload_as().unwrap();
        assert_eq!(back, Sample { value: 7 });
    }
}
