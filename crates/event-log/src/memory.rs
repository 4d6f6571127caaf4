use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::dedup::IdempotencyGuard;
use crate::log::{EventHandler, EventLog, EventLogError, Result};
use crate::record::{EventId, EventRecord};

struct GroupSubscription {
    group_id: String,
    topics: HashSet<String>,
    handler: Arc<dyn EventHandler>,
    guard: Arc<IdempotencyGuard>,
}

/// In-memory event log for tests and single-process deployments.
///
/// Publishes are dispatched to each subscribed group inline, so per-partition
/// ordering follows from publishes for one partition key being serialized.
/// The full record history is retained for assertions and replay.
#[derive(Clone, Default)]
pub struct InMemoryEventLog {
    records: Arc<RwLock<Vec<EventRecord>>>,
    groups: Arc<RwLock<Vec<GroupSubscription>>>,
    fail_publish: Arc<AtomicBool>,
}

impl InMemoryEventLog {
    /// Creates a new empty in-memory event log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the log to reject the next publish calls.
    pub fn set_fail_on_publish(&self, fail: bool) {
        self.fail_publish.store(fail, Ordering::SeqCst);
    }

    /// Returns all published records in publication order.
    pub async fn records(&self) -> Vec<EventRecord> {
        self.records.read().await.clone()
    }

    /// Returns all published records for one topic.
    pub async fn records_for_topic(&self, topic: &str) -> Vec<EventRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.topic == topic)
            .cloned()
            .collect()
    }

    /// Returns the total number of published records.
    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Re-delivers an already-published record to every subscribed group,
    /// simulating the at-least-once channel. Returns false if the event ID
    /// is unknown.
    ///
    /// Groups that have already seen the ID skip it via their guard.
    pub async fn redeliver(&self, event_id: EventId) -> bool {
        let record = {
            let records = self.records.read().await;
            records.iter().find(|r| r.event_id == event_id).cloned()
        };

        match record {
            Some(record) => {
                self.dispatch(&record).await;
                true
            }
            None => false,
        }
    }

    async fn dispatch(&self, record: &EventRecord) {
        let deliveries: Vec<(String, Arc<dyn EventHandler>, Arc<IdempotencyGuard>)> = {
            let groups = self.groups.read().await;
            groups
                .iter()
                .filter(|g| g.topics.contains(&record.topic))
                .map(|g| (g.group_id.clone(), g.handler.clone(), g.guard.clone()))
                .collect()
        };

        for (group_id, handler, guard) in deliveries {
            if !guard.first_sighting(record.event_id) {
                metrics::counter!("event_log_duplicates_skipped").increment(1);
                tracing::debug!(
                    event_id = %record.event_id,
                    topic = %record.topic,
                    group = %group_id,
                    "duplicate delivery skipped"
                );
                continue;
            }

            if let Err(e) = handler.handle(record).await {
                // At-least-once channel: a handler error leaves the record in
                // the log for replay, it is never bubbled to the publisher.
                // The guard releases the ID so a redelivery reaches the
                // handler instead of being skipped as a duplicate.
                guard.forget(record.event_id);
                metrics::counter!("event_log_handler_errors").increment(1);
                tracing::warn!(
                    event_id = %record.event_id,
                    topic = %record.topic,
                    group = %group_id,
                    error = %e,
                    "event handler failed"
                );
            }
        }
    }
}

#[async_trait]
impl EventLog for InMemoryEventLog {
    async fn publish(&self, record: EventRecord) -> Result<()> {
        if self.fail_publish.load(Ordering::SeqCst) {
            return Err(EventLogError::Publish {
                topic: record.topic.clone(),
                reason: "event log unavailable".to_string(),
            });
        }

        self.records.write().await.push(record.clone());
        metrics::counter!("event_log_records_published").increment(1);

        self.dispatch(&record).await;
        Ok(())
    }

    async fn subscribe(
        &self,
        topics: Vec<String>,
        group_id: &str,
        handler: Arc<dyn EventHandler>,
    ) -> Result<()> {
        let mut groups = self.groups.write().await;

        if groups.iter().any(|g| g.group_id == group_id) {
            return Err(EventLogError::Subscribe(format!(
                "group '{group_id}' already has a consumer"
            )));
        }

        groups.push(GroupSubscription {
            group_id: group_id.to_string(),
            topics: topics.into_iter().collect(),
            handler,
            guard: Arc::new(IdempotencyGuard::new()),
        });
        Ok(())
    }
}
