//! Payment processor trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::OrderId;
use domain::Money;

use crate::error::PaymentSagaError;

/// A checkout session opened at the processor.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    /// Processor-issued session reference.
    pub session_id: String,

    /// URL the customer is redirected to for payment entry.
    pub redirect_url: String,
}

/// A refund issued by the processor.
#[derive(Debug, Clone)]
pub struct ProcessorRefund {
    /// Processor-issued refund reference.
    pub refund_id: String,
}

/// The external payment processor boundary.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Opens a hosted checkout session for the given amount.
    async fn create_checkout_session(
        &self,
        order_id: OrderId,
        amount: Money,
        currency: &str,
        customer_email: &str,
    ) -> Result<CheckoutSession, PaymentSagaError>;

    /// Refunds a captured charge in full.
    async fn refund_charge(
        &self,
        charge_id: &str,
        amount: Money,
    ) -> Result<ProcessorRefund, PaymentSagaError>;
}

#[derive(Debug, Default)]
struct InMemoryProcessorState {
    sessions: HashMap<String, (OrderId, Money)>,
    refunds: Vec<(String, Money)>,
    next_id: u32,
    fail_on_create: bool,
    fail_on_refund: bool,
}

/// In-memory payment processor for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProcessor {
    state: Arc<RwLock<InMemoryProcessorState>>,
}

impl InMemoryProcessor {
    /// Creates a new in-memory processor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the processor to fail on the next session creation.
    pub fn set_fail_on_create(&self, fail: bool) {
        self.state.write().unwrap().fail_on_create = fail;
    }

    /// Configures the processor to fail on the next refund call.
    pub fn set_fail_on_refund(&self, fail: bool) {
        self.state.write().unwrap().fail_on_refund = fail;
    }

    /// Returns the number of sessions opened.
    pub fn session_count(&self) -> usize {
        self.state.read().unwrap().sessions.len()
    }

    /// Returns the number of refunds issued.
    pub fn refund_count(&self) -> usize {
        self.state.read().unwrap().refunds.len()
    }
}

#[async_trait]
impl PaymentProcessor for InMemoryProcessor {
    async fn create_checkout_session(
        &self,
        order_id: OrderId,
        amount: Money,
        _currency: &str,
        _customer_email: &str,
    ) -> Result<CheckoutSession, PaymentSagaError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_create {
            return Err(PaymentSagaError::ExternalProcessor(
                "session creation failed".to_string(),
            ));
        }

        state.next_id += 1;
        let session_id = format!("cs_{:04}", state.next_id);
        state.sessions.insert(session_id.clone(), (order_id, amount));

        Ok(CheckoutSession {
            redirect_url: format!("https://checkout.example.com/pay/{session_id}"),
            session_id,
        })
    }

    async fn refund_charge(
        &self,
        charge_id: &str,
        amount: Money,
    ) -> Result<ProcessorRefund, PaymentSagaError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_refund {
            return Err(PaymentSagaError::ExternalProcessor(
                "refund failed".to_string(),
            ));
        }

        state.next_id += 1;
        let refund_id = format!("re_{:04}", state.next_id);
        state.refunds.push((charge_id.to_string(), amount));

        Ok(ProcessorRefund { refund_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sessions_get_sequential_references() {
        let processor = InMemoryProcessor::new();
        let order_id = OrderId::new();
        let amount = Money::from_cents(5998);

        let s1 = processor
            .create_checkout_session(order_id, amount, "usd", "a@example.com")
            .await
            .unwrap();
        let s2 = processor
            .create_checkout_session(order_id, amount, "usd", "a@example.com")
            .await
            .unwrap();

        assert_eq!(s1.session_id, "cs_0001");
        assert_eq!(s2.session_id, "cs_0002");
        assert!(s1.redirect_url.ends_with("cs_0001"));
        assert_eq!(processor.session_count(), 2);
    }

    #[tokio::test]
    async fn create_failure_toggle() {
        let processor = InMemoryProcessor::new();
        processor.set_fail_on_create(true);

        let result = processor
            .create_checkout_session(OrderId::new(), Money::from_cents(100), "usd", "a@example.com")
            .await;

        assert!(matches!(result, Err(PaymentSagaError::ExternalProcessor(_))));
        assert_eq!(processor.session_count(), 0);
    }

    #[tokio::test]
    async fn refund_records_the_charge() {
        let processor = InMemoryProcessor::new();
        let refund = processor
            .refund_charge("ch_0001", Money::from_cents(5998))
            .await
            .unwrap();

        assert!(refund.refund_id.starts_with("re_"));
        assert_eq!(processor.refund_count(), 1);
    }
}
