//! Best-effort event publication after a committed order write.

use common::{CorrelationId, OrderId};
use event_log::{EventLog, EventRecord};
use serde::Serialize;

/// Publishes an order event, logging and counting a failure instead of
/// surfacing it. The order document is authoritative; a lost announcement
/// never rolls the write back.
pub(crate) async fn best_effort<T: Serialize>(
    event_log: &dyn EventLog,
    topic: &str,
    order_id: OrderId,
    correlation_id: CorrelationId,
    payload: &T,
) {
    let builder = match EventRecord::builder()
        .topic(topic)
        .partition_key(order_id.to_string())
        .correlation_id(correlation_id)
        .payload(payload)
    {
        Ok(builder) => builder,
        Err(e) => {
            tracing::error!(topic, error = %e, "event payload failed to serialize");
            return;
        }
    };

    if let Err(e) = event_log.publish(builder.build()).await {
        metrics::counter!("event_publish_failures", "topic" => topic.to_string()).increment(1);
        tracing::warn!(topic, order_id = %order_id, error = %e, "event publish failed after local commit");
    }
}
