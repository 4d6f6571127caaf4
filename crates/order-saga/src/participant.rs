//! Event-driven order participant.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use domain::events::{self, topics};
use domain::order::{META_CORRELATION_ID, META_PAYMENT_ID, META_TRANSACTION_ID};
use domain::{Order, OrderPaymentStatus, OrderStatus, OrderStore};
use event_log::{EventHandler, EventLog, EventLogError, EventRecord};

use crate::announce;
use crate::error::Result;

/// Consumer group the order service reads `payment.*` topics in.
pub const CONSUMER_GROUP: &str = "order-service";

/// Applies payment events to order documents.
///
/// Every handler is idempotent: deliveries are at-least-once and the
/// idempotency guard only filters recent duplicates, so each handler
/// re-checks the order's state before transitioning.
pub struct OrderParticipant {
    orders: Arc<dyn OrderStore>,
    event_log: Arc<dyn EventLog>,
}

impl OrderParticipant {
    /// Creates a new participant.
    pub fn new(orders: Arc<dyn OrderStore>, event_log: Arc<dyn EventLog>) -> Self {
        Self { orders, event_log }
    }

    /// Subscribes the participant to the payment topics on its event log.
    pub async fn subscribe(self: Arc<Self>) -> event_log::Result<()> {
        let log = self.event_log.clone();
        log.subscribe(
            topics::PAYMENT_TOPICS.iter().map(|t| t.to_string()).collect(),
            CONSUMER_GROUP,
            self,
        )
        .await
    }

    async fn on_payment_initiated(&self, event: events::PaymentInitiated) -> Result<()> {
        if self.orders.get(event.order_id).await?.is_some() {
            tracing::debug!(order_id = %event.order_id, "order already materialized");
            return Ok(());
        }

        let mut order = Order::new(
            event.order_id,
            event.user_id,
            event.items,
            event.amount,
            event.currency,
            event.shipping_address,
        );
        order.insert_metadata(META_CORRELATION_ID, event.correlation_id.to_string());
        order.insert_metadata(META_PAYMENT_ID, event.payment_id.to_string());
        self.orders.insert(order.clone()).await?;

        metrics::counter!("orders_created").increment(1);
        tracing::info!(
            order_id = %order.id,
            correlation_id = %event.correlation_id,
            "order created from payment initiation"
        );

        let created = events::OrderCreated {
            order_id: order.id,
            user_id: order.user_id,
            payment_id: event.payment_id,
            amount: order.amount,
            correlation_id: event.correlation_id,
            timestamp: Utc::now(),
        };
        announce::best_effort(
            self.event_log.as_ref(),
            topics::ORDER_CREATED,
            order.id,
            event.correlation_id,
            &created,
        )
        .await;
        Ok(())
    }

    async fn on_payment_completed(&self, event: events::PaymentCompleted) -> Result<()> {
        let Some(mut order) = self.orders.get(event.order_id).await? else {
            tracing::warn!(order_id = %event.order_id, "payment completed for unknown order");
            return Ok(());
        };

        if order.payment_status == OrderPaymentStatus::Paid {
            return Ok(());
        }
        if !order.status.can_transition_to(OrderStatus::Processing) {
            tracing::warn!(
                order_id = %order.id,
                status = %order.status,
                "payment completed for order that cannot start processing, ignoring"
            );
            return Ok(());
        }

        order.transition(OrderStatus::Processing)?;
        order.set_payment_status(OrderPaymentStatus::Paid);
        order.insert_metadata(META_TRANSACTION_ID, &event.transaction_id);
        self.orders.save(order.clone()).await?;

        metrics::counter!("orders_confirmed").increment(1);
        tracing::info!(order_id = %order.id, "order confirmed");

        let confirmed = events::OrderConfirmed {
            order_id: order.id,
            transaction_id: event.transaction_id,
            correlation_id: event.correlation_id,
            timestamp: Utc::now(),
        };
        announce::best_effort(
            self.event_log.as_ref(),
            topics::ORDER_CONFIRMED,
            order.id,
            event.correlation_id,
            &confirmed,
        )
        .await;
        Ok(())
    }

    async fn on_payment_failed(&self, event: events::PaymentFailed) -> Result<()> {
        let Some(order) = self.orders.get(event.order_id).await? else {
            tracing::warn!(order_id = %event.order_id, "payment failed for unknown order");
            return Ok(());
        };

        self.cancel_order(order, OrderPaymentStatus::Failed, Some(event.reason), event.correlation_id)
            .await
    }

    async fn on_payment_cancelled(&self, event: events::PaymentCancelled) -> Result<()> {
        let Some(order) = self.orders.get(event.order_id).await? else {
            tracing::warn!(order_id = %event.order_id, "payment cancelled for unknown order");
            return Ok(());
        };

        self.cancel_order(
            order,
            OrderPaymentStatus::Refunded,
            Some("payment cancelled".to_string()),
            event.correlation_id,
        )
        .await
    }

    /// Cancels the order in reaction to a payment outcome. Terminal orders
    /// stay untouched: a refund landing after delivery is an operator
    /// problem, not a rollback.
    async fn cancel_order(
        &self,
        mut order: Order,
        payment_status: OrderPaymentStatus,
        reason: Option<String>,
        correlation_id: common::CorrelationId,
    ) -> Result<()> {
        if order.status.is_terminal() {
            tracing::debug!(
                order_id = %order.id,
                status = %order.status,
                "payment outcome for terminal order, leaving untouched"
            );
            return Ok(());
        }

        order.transition(OrderStatus::Cancelled)?;
        order.cancelled_at = Some(Utc::now());
        order.set_payment_status(payment_status);
        self.orders.save(order.clone()).await?;

        metrics::counter!("orders_cancelled").increment(1);
        tracing::info!(order_id = %order.id, ?reason, "order cancelled by payment outcome");

        let cancelled = events::OrderCancelled {
            order_id: order.id,
            items: order.items.clone(),
            reason,
            correlation_id,
            timestamp: Utc::now(),
        };
        announce::best_effort(
            self.event_log.as_ref(),
            topics::ORDER_CANCELLED,
            order.id,
            correlation_id,
            &cancelled,
        )
        .await;
        Ok(())
    }
}

#[async_trait]
impl EventHandler for OrderParticipant {
    async fn handle(&self, record: &EventRecord) -> event_log::Result<()> {
        let result = match record.topic.as_str() {
            topics::PAYMENT_INITIATED => self.on_payment_initiated(record.payload_as()?).await,
            topics::PAYMENT_COMPLETED => self.on_payment_completed(record.payload_as()?).await,
            topics::PAYMENT_FAILED => self.on_payment_failed(record.payload_as()?).await,
            topics::PAYMENT_CANCELLED => self.on_payment_cancelled(record.payload_as()?).await,
            other => {
                tracing::debug!(topic = other, "ignoring record on unhandled topic");
                Ok(())
            }
        };

        result.map_err(|e| EventLogError::Handler(e.to_string()))
    }
}
