//! The payment document.

use chrono::{DateTime, Utc};
use common::{CorrelationId, OrderId, PaymentId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};
use crate::payment::status::PaymentStatus;
use crate::value_objects::Money;

/// Record of a completed refund against a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refund {
    /// Processor-issued refund reference.
    pub refund_id: String,
    pub amount: Money,
    pub refunded_at: DateTime<Utc>,
}

/// A payment owned by the payment service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub user_id: UserId,

    /// Gross amount charged to the customer.
    pub amount: Money,
    pub currency: String,

    /// Processor fee withheld from the gross amount.
    pub processing_fee: Money,

    /// Amount settled to the merchant after fees.
    pub net_amount: Money,

    pub status: PaymentStatus,
    pub method: String,

    /// Processor checkout session reference.
    pub session_id: Option<String>,

    /// Processor transaction reference, set when the charge lands.
    pub transaction_id: Option<String>,

    /// Processor charge reference used for refunds.
    pub charge_id: Option<String>,

    pub refund: Option<Refund>,
    pub failure_reason: Option<String>,

    pub correlation_id: CorrelationId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a new pending payment with the fee split already computed.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: PaymentId,
        order_id: OrderId,
        user_id: UserId,
        amount: Money,
        currency: impl Into<String>,
        processing_fee: Money,
        net_amount: Money,
        correlation_id: CorrelationId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            order_id,
            user_id,
            amount,
            currency: currency.into(),
            processing_fee,
            net_amount,
            status: PaymentStatus::Pending,
            method: "card".to_string(),
            session_id: None,
            transaction_id: None,
            charge_id: None,
            refund: None,
            failure_reason: None,
            correlation_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves the payment to `next`, enforcing the state machine.
    pub fn transition(&mut self, next: PaymentStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                entity: "payment",
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Fails the payment, recording the processor's reason.
    pub fn mark_failed(&mut self, reason: impl Into<String>) -> Result<()> {
        self.transition(PaymentStatus::Failed)?;
        self.failure_reason = Some(reason.into());
        Ok(())
    }

    /// Records a refund and moves to Refunded. Only a Completed payment can
    /// be refunded.
    pub fn record_refund(&mut self, refund: Refund) -> Result<()> {
        self.transition(PaymentStatus::Refunded)?;
        self.refund = Some(refund);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment() -> Payment {
        Payment::new(
            PaymentId::new(),
            OrderId::new(),
            UserId::new(),
            Money::from_cents(5998),
            "usd",
            Money::from_cents(204),
            Money::from_cents(5794),
            CorrelationId::new(),
        )
    }

    #[test]
    fn new_payment_is_pending() {
        let payment = payment();
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.amount - payment.processing_fee, payment.net_amount);
    }

    #[test]
    fn mark_failed_records_the_reason() {
        let mut payment = payment();
        payment.mark_failed("card_declined").unwrap();
        assert_eq!(payment.status, PaymentStatus::Failed);
        assert_eq!(payment.failure_reason.as_deref(), Some("card_declined"));
    }

    #[test]
    fn failed_payment_cannot_fail_again() {
        let mut payment = payment();
        payment.mark_failed("card_declined").unwrap();
        assert!(payment.mark_failed("again").is_err());
    }

    #[test]
    fn refund_requires_completed() {
        let mut payment = payment();
        let refund = Refund {
            refund_id: "re_1".to_string(),
            amount: payment.amount,
            refunded_at: Utc::now(),
        };

        let err = payment.record_refund(refund.clone()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { entity: "payment", .. }));

        payment.transition(PaymentStatus::Completed).unwrap();
        payment.record_refund(refund).unwrap();
        assert_eq!(payment.status, PaymentStatus::Refunded);
        assert!(payment.refund.is_some());
    }
}
