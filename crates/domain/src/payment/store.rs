//! Payment document store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::PaymentId;
use tokio::sync::RwLock;

use crate::error::{DomainError, Result};
use crate::payment::model::Payment;

/// Storage for payment documents, owned by the payment service.
///
/// Webhook handlers look payments up by the processor references embedded in
/// the callback, so the store indexes by session, transaction and charge id
/// in addition to the payment id.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Inserts a new payment, failing if the id already exists.
    async fn insert(&self, payment: Payment) -> Result<()>;

    /// Returns the payment with the given id, if any.
    async fn get(&self, id: PaymentId) -> Result<Option<Payment>>;

    /// Returns the payment holding this checkout session reference.
    async fn find_by_session_id(&self, session_id: &str) -> Result<Option<Payment>>;

    /// Returns the payment holding this transaction reference.
    async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Option<Payment>>;

    /// Returns the payment holding this charge reference.
    async fn find_by_charge_id(&self, charge_id: &str) -> Result<Option<Payment>>;

    /// Returns all payments. Used by the reconciliation sweep.
    async fn list(&self) -> Result<Vec<Payment>>;

    /// Writes the full document back. This is the local transaction.
    async fn save(&self, payment: Payment) -> Result<()>;
}

/// In-memory payment store for tests and single-process deployments.
#[derive(Clone, Default)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<HashMap<PaymentId, Payment>>>,
}

impl InMemoryPaymentStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored payments.
    pub async fn count(&self) -> usize {
        self.payments.read().await.len()
    }

    async fn find_by<F>(&self, pred: F) -> Result<Option<Payment>>
    where
        F: Fn(&Payment) -> bool,
    {
        Ok(self.payments.read().await.values().find(|p| pred(p)).cloned())
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn insert(&self, payment: Payment) -> Result<()> {
        let mut payments = self.payments.write().await;
        if payments.contains_key(&payment.id) {
            return Err(DomainError::Validation(format!(
                "payment {} already exists",
                payment.id
            )));
        }
        payments.insert(payment.id, payment);
        Ok(())
    }

    async fn get(&self, id: PaymentId) -> Result<Option<Payment>> {
        Ok(self.payments.read().await.get(&id).cloned())
    }

    async fn find_by_session_id(&self, session_id: &str) -> Result<Option<Payment>> {
        self.find_by(|p| p.session_id.as_deref() == Some(session_id))
            .await
    }

    async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Option<Payment>> {
        self.find_by(|p| p.transaction_id.as_deref() == Some(transaction_id))
            .await
    }

    async fn find_by_charge_id(&self, charge_id: &str) -> Result<Option<Payment>> {
        self.find_by(|p| p.charge_id.as_deref() == Some(charge_id))
            .await
    }

    async fn list(&self) -> Result<Vec<Payment>> {
        Ok(self.payments.read().await.values().cloned().collect())
    }

    async fn save(&self, payment: Payment) -> Result<()> {
        self.payments.write().await.insert(payment.id, payment);
        Ok(())
    }
}
