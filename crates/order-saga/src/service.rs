//! Direct order status transitions.

use std::sync::Arc;

use chrono::Utc;
use common::{CorrelationId, OrderId};
use domain::events::{self, topics};
use domain::order::META_CORRELATION_ID;
use domain::{Order, OrderStatus, OrderStore};
use event_log::EventLog;
use uuid::Uuid;

use crate::announce;
use crate::error::{OrderSagaError, Result};

/// Operator-facing order reads and direct status transitions.
pub struct OrderStatusService {
    orders: Arc<dyn OrderStore>,
    event_log: Arc<dyn EventLog>,
}

impl OrderStatusService {
    /// Creates a new service.
    pub fn new(orders: Arc<dyn OrderStore>, event_log: Arc<dyn EventLog>) -> Self {
        Self { orders, event_log }
    }

    /// Returns the order with the given id.
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order> {
        self.orders
            .get(order_id)
            .await?
            .ok_or(OrderSagaError::OrderNotFound(order_id))
    }

    /// Moves an order along a validated edge, applying the coupled payment
    /// status in the same document write, and announces `order.updated`.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(&self, order_id: OrderId, next: OrderStatus) -> Result<Order> {
        let mut order = self.get_order(order_id).await?;
        order.apply_status_update(next)?;
        self.orders.save(order.clone()).await?;

        metrics::counter!("order_status_updates").increment(1);
        tracing::info!(order_id = %order.id, status = %order.status, "order status updated");

        let correlation_id = correlation_of(&order);
        let updated = events::OrderUpdated {
            order_id: order.id,
            status: order.status,
            payment_status: order.payment_status,
            correlation_id,
            timestamp: Utc::now(),
        };
        announce::best_effort(
            self.event_log.as_ref(),
            topics::ORDER_UPDATED,
            order.id,
            correlation_id,
            &updated,
        )
        .await;
        Ok(order)
    }
}

/// Reads the saga correlation id back out of the order's metadata, minting
/// a fresh one for orders that predate it.
pub(crate) fn correlation_of(order: &Order) -> CorrelationId {
    order
        .metadata_value(META_CORRELATION_ID)
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .map(CorrelationId::from_uuid)
        .unwrap_or_default()
}
