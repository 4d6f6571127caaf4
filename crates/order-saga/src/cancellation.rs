//! Customer- and operator-initiated cancellation saga.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{OrderId, PaymentId, UserId};
use domain::events::{self, topics};
use domain::order::META_PAYMENT_ID;
use domain::{OrderStatus, OrderStore};
use event_log::EventLog;
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::announce;
use crate::error::{OrderSagaError, Result};
use crate::service::correlation_of;

/// The authenticated principal behind a request.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: UserId,
    pub roles: Vec<String>,
}

impl Actor {
    /// An actor with no roles, acting on their own orders.
    pub fn user(user_id: UserId) -> Self {
        Self {
            user_id,
            roles: Vec::new(),
        }
    }

    /// An actor holding the admin role.
    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            roles: vec!["admin".to_string()],
        }
    }

    /// Returns true if the actor holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == "admin")
    }
}

/// Boundary through which the cancellation saga asks the payment side for a
/// compensating refund.
#[async_trait]
pub trait RefundRequester: Send + Sync {
    async fn request_refund(&self, payment_id: PaymentId) -> Result<()>;
}

/// In-memory refund requester for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRefundRequester {
    state: Arc<std::sync::RwLock<RefundRequesterState>>,
}

#[derive(Debug, Default)]
struct RefundRequesterState {
    requested: Vec<PaymentId>,
    fail_on_request: bool,
}

impl InMemoryRefundRequester {
    /// Creates a new requester.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the requester to fail on the next request.
    pub fn set_fail_on_request(&self, fail: bool) {
        self.state.write().unwrap().fail_on_request = fail;
    }

    /// Returns the payment ids refunds were requested for.
    pub fn requested(&self) -> Vec<PaymentId> {
        self.state.read().unwrap().requested.clone()
    }
}

#[async_trait]
impl RefundRequester for InMemoryRefundRequester {
    async fn request_refund(&self, payment_id: PaymentId) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_request {
            return Err(OrderSagaError::RefundFailed("refund unavailable".to_string()));
        }
        state.requested.push(payment_id);
        Ok(())
    }
}

/// Result of a cancellation, also replayed for duplicate requests.
#[derive(Debug, Clone, Serialize)]
pub struct CancellationOutcome {
    pub order_id: OrderId,

    /// True when this request replayed an earlier completed cancellation.
    pub duplicate: bool,

    /// True when a compensating refund was handed to the payment side.
    pub refund_initiated: bool,
}

/// Cancels an order and compensates its payment.
///
/// The saga's steps run in a fixed order: cancel the order document first
/// (the local transaction), then request the refund, then announce. Only
/// the first step can fail the saga; refund and announcement failures are
/// logged and reported through the outcome.
pub struct CancellationSaga {
    orders: Arc<dyn OrderStore>,
    refunds: Arc<dyn RefundRequester>,
    event_log: Arc<dyn EventLog>,
    completed: RwLock<HashMap<OrderId, CancellationOutcome>>,
}

impl CancellationSaga {
    /// Creates a new cancellation saga.
    pub fn new(
        orders: Arc<dyn OrderStore>,
        refunds: Arc<dyn RefundRequester>,
        event_log: Arc<dyn EventLog>,
    ) -> Self {
        Self {
            orders,
            refunds,
            event_log,
            completed: RwLock::new(HashMap::new()),
        }
    }

    /// Cancels the order on behalf of `actor`.
    ///
    /// Repeating a completed cancellation returns the stored outcome with
    /// `duplicate: true` and no further side effects.
    #[tracing::instrument(skip(self, actor, reason), fields(user_id = %actor.user_id))]
    pub async fn cancel(
        &self,
        order_id: OrderId,
        actor: &Actor,
        reason: Option<String>,
    ) -> Result<CancellationOutcome> {
        let Some(mut order) = self.orders.get(order_id).await? else {
            return Err(OrderSagaError::OrderNotFound(order_id));
        };

        if !actor.is_admin() && actor.user_id != order.user_id {
            return Err(OrderSagaError::Forbidden);
        }

        if let Some(previous) = self.completed.read().await.get(&order_id) {
            tracing::info!(order_id = %order_id, "replaying completed cancellation");
            let mut outcome = previous.clone();
            outcome.duplicate = true;
            return Ok(outcome);
        }

        if order.status == OrderStatus::Cancelled {
            // Cancelled by a payment failure or another instance, not by
            // this saga.
            return Err(OrderSagaError::AlreadyCancelled(order_id));
        }

        // Step 1: the order write is the local transaction. Delivered
        // orders fail here with an invalid transition.
        order.apply_status_update(OrderStatus::Cancelled)?;
        self.orders.save(order.clone()).await?;

        metrics::counter!("cancellations_started").increment(1);
        tracing::info!(order_id = %order_id, ?reason, "order cancelled");

        // Step 2: compensating refund for the linked payment. Best-effort;
        // the cancellation stands even if the refund could not start.
        let refund_initiated = match linked_payment(&order) {
            Some(payment_id) => match self.refunds.request_refund(payment_id).await {
                Ok(()) => true,
                Err(e) => {
                    metrics::counter!("cancellation_refund_failures").increment(1);
                    tracing::warn!(
                        order_id = %order_id,
                        payment_id = %payment_id,
                        error = %e,
                        "compensating refund could not be initiated"
                    );
                    false
                }
            },
            None => false,
        };

        // Step 3: announce with the line items so stock can be restored.
        let correlation_id = correlation_of(&order);
        let cancelled = events::OrderCancelled {
            order_id,
            items: order.items.clone(),
            reason,
            correlation_id,
            timestamp: Utc::now(),
        };
        announce::best_effort(
            self.event_log.as_ref(),
            topics::ORDER_CANCELLED,
            order_id,
            correlation_id,
            &cancelled,
        )
        .await;

        let outcome = CancellationOutcome {
            order_id,
            duplicate: false,
            refund_initiated,
        };
        self.completed.write().await.insert(order_id, outcome.clone());
        Ok(outcome)
    }
}

fn linked_payment(order: &domain::Order) -> Option<PaymentId> {
    order
        .metadata_value(META_PAYMENT_ID)
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .map(PaymentId::from_uuid)
}
