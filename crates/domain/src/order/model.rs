//! The order document.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::{OrderId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};
use crate::order::status::{OrderPaymentStatus, OrderStatus};
use crate::value_objects::{Money, OrderItem, ShippingAddress};

/// Metadata key under which the saga correlation id is stored.
pub const META_CORRELATION_ID: &str = "correlation_id";

/// Metadata key under which the linked payment id is stored.
pub const META_PAYMENT_ID: &str = "payment_id";

/// Metadata key under which the processor transaction reference is stored.
pub const META_TRANSACTION_ID: &str = "transaction_id";

/// An order owned by the order service.
///
/// Saving the document is the local transaction; every multi-field update
/// (status plus payment status plus timestamps) happens on one in-memory
/// value before a single save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub amount: Money,
    pub currency: String,
    pub status: OrderStatus,
    pub payment_status: OrderPaymentStatus,
    pub shipping_address: Option<ShippingAddress>,

    /// Correlation id and payment references, stored as opaque strings.
    pub metadata: HashMap<String, String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Creates a new pending order.
    pub fn new(
        id: OrderId,
        user_id: UserId,
        items: Vec<OrderItem>,
        amount: Money,
        currency: impl Into<String>,
        shipping_address: Option<ShippingAddress>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            items,
            amount,
            currency: currency.into(),
            status: OrderStatus::Pending,
            payment_status: OrderPaymentStatus::Pending,
            shipping_address,
            metadata: HashMap::new(),
            created_at: now,
            updated_at: now,
            cancelled_at: None,
        }
    }

    /// Moves the order to `next`, enforcing the state machine.
    pub fn transition(&mut self, next: OrderStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                entity: "order",
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Moves the order to `next` and applies the coupled payment-status
    /// effects: Cancelled forces the payment status to Refunded and stamps
    /// the cancellation time, Delivered forces it to Paid.
    pub fn apply_status_update(&mut self, next: OrderStatus) -> Result<()> {
        self.transition(next)?;
        match next {
            OrderStatus::Cancelled => {
                self.payment_status = OrderPaymentStatus::Refunded;
                self.cancelled_at = Some(Utc::now());
            }
            OrderStatus::Delivered => {
                self.payment_status = OrderPaymentStatus::Paid;
            }
            _ => {}
        }
        Ok(())
    }

    /// Sets the payment outcome as reported by a payment event.
    pub fn set_payment_status(&mut self, status: OrderPaymentStatus) {
        self.payment_status = status;
        self.updated_at = Utc::now();
    }

    /// Stores an opaque metadata value (correlation id, payment references).
    pub fn insert_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Returns a metadata value if present.
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}
