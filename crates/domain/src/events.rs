//! The event contract between the payment and order services.
//!
//! Topic names and payload shapes are the only coupling between the two
//! sides. Every payload carries the saga's correlation id and an emission
//! timestamp; records are partitioned by order id so one order's events stay
//! ordered.

use chrono::{DateTime, Utc};
use common::{CorrelationId, OrderId, PaymentId, UserId};
use serde::{Deserialize, Serialize};

use crate::order::status::{OrderPaymentStatus, OrderStatus};
use crate::value_objects::{Money, OrderItem, ShippingAddress};

/// Topic names, one per event type.
pub mod topics {
    pub const PAYMENT_INITIATED: &str = "payment.initiated";
    pub const PAYMENT_COMPLETED: &str = "payment.completed";
    pub const PAYMENT_FAILED: &str = "payment.failed";
    pub const PAYMENT_CANCELLED: &str = "payment.cancelled";
    pub const ORDER_CREATED: &str = "order.created";
    pub const ORDER_CONFIRMED: &str = "order.confirmed";
    pub const ORDER_CANCELLED: &str = "order.cancelled";
    pub const ORDER_UPDATED: &str = "order.updated";

    /// The payment-side topics the order service consumes.
    pub const PAYMENT_TOPICS: [&str; 4] = [
        PAYMENT_INITIATED,
        PAYMENT_COMPLETED,
        PAYMENT_FAILED,
        PAYMENT_CANCELLED,
    ];
}

/// A checkout session was created and a pending payment persisted.
///
/// Carries everything the order service needs to materialize the order
/// without calling back into the payment service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInitiated {
    pub payment_id: PaymentId,
    pub order_id: OrderId,
    pub user_id: UserId,
    pub amount: Money,
    pub currency: String,
    pub items: Vec<OrderItem>,
    pub shipping_address: Option<ShippingAddress>,
    pub correlation_id: CorrelationId,
    pub timestamp: DateTime<Utc>,
}

/// Funds were captured for the payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCompleted {
    pub payment_id: PaymentId,
    pub order_id: OrderId,
    pub transaction_id: String,
    pub amount: Money,
    pub correlation_id: CorrelationId,
    pub timestamp: DateTime<Utc>,
}

/// The processor declined or errored the payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentFailed {
    pub payment_id: PaymentId,
    pub order_id: OrderId,
    pub reason: String,
    pub correlation_id: CorrelationId,
    pub timestamp: DateTime<Utc>,
}

/// A completed payment was refunded, compensating the saga.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCancelled {
    pub payment_id: PaymentId,
    pub order_id: OrderId,
    pub refund_id: Option<String>,
    pub amount: Money,
    pub correlation_id: CorrelationId,
    pub timestamp: DateTime<Utc>,
}

/// The order document was materialized from a payment initiation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreated {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub payment_id: PaymentId,
    pub amount: Money,
    pub correlation_id: CorrelationId,
    pub timestamp: DateTime<Utc>,
}

/// The order moved to Processing after payment confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfirmed {
    pub order_id: OrderId,
    pub transaction_id: String,
    pub correlation_id: CorrelationId,
    pub timestamp: DateTime<Utc>,
}

/// The order was cancelled.
///
/// Carries the line items so the inventory collaborator can restore stock
/// without a lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCancelled {
    pub order_id: OrderId,
    pub items: Vec<OrderItem>,
    pub reason: Option<String>,
    pub correlation_id: CorrelationId,
    pub timestamp: DateTime<Utc>,
}

/// An operator moved the order through a direct status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderUpdated {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub payment_status: OrderPaymentStatus,
    pub correlation_id: CorrelationId,
    pub timestamp: DateTime<Utc>,
}
