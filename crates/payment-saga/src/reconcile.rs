//! Stuck-payment reconciliation sweep.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use common::PaymentId;
use domain::{PaymentStatus, PaymentStore};

use crate::error::Result;

/// Periodic sweep over payments stuck in Processing.
///
/// A payment sits in Processing between the session callback and the charge
/// callback; if the second webhook never arrives the payment would wait
/// forever. The sweep surfaces those payments through logs and a counter so
/// an operator can query the processor and resolve them. It never changes
/// state on its own.
pub struct ReconciliationSweep {
    store: Arc<dyn PaymentStore>,
    stuck_after: Duration,
}

impl ReconciliationSweep {
    /// Creates a sweep flagging payments in Processing for longer than
    /// `stuck_after`.
    pub fn new(store: Arc<dyn PaymentStore>, stuck_after: Duration) -> Self {
        Self { store, stuck_after }
    }

    /// Runs one pass, returning the ids of the payments flagged as stuck.
    #[tracing::instrument(skip(self))]
    pub async fn run_once(&self) -> Result<Vec<PaymentId>> {
        let cutoff =
            Utc::now() - chrono::Duration::from_std(self.stuck_after).unwrap_or(chrono::TimeDelta::MAX);

        let mut stuck = Vec::new();
        for payment in self.store.list().await? {
            if payment.status == PaymentStatus::Processing && payment.updated_at < cutoff {
                metrics::counter!("payments_stuck_processing").increment(1);
                tracing::warn!(
                    payment_id = %payment.id,
                    order_id = %payment.order_id,
                    updated_at = %payment.updated_at,
                    "payment stuck in Processing past the timeout"
                );
                stuck.push(payment.id);
            }
        }

        if !stuck.is_empty() {
            tracing::warn!(count = stuck.len(), "reconciliation sweep flagged stuck payments");
        }
        Ok(stuck)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{CorrelationId, OrderId, UserId};
    use domain::{InMemoryPaymentStore, Money, Payment};

    fn payment(status: PaymentStatus) -> Payment {
        let mut payment = Payment::new(
            PaymentId::new(),
            OrderId::new(),
            UserId::new(),
            Money::from_cents(5998),
            "usd",
            Money::from_cents(204),
            Money::from_cents(5794),
            CorrelationId::new(),
        );
        payment.status = status;
        payment
    }

    #[tokio::test]
    async fn flags_only_old_processing_payments() {
        let store = InMemoryPaymentStore::new();

        let mut old = payment(PaymentStatus::Processing);
        old.updated_at = Utc::now() - chrono::Duration::minutes(30);
        let old_id = old.id;
        store.insert(old).await.unwrap();

        store.insert(payment(PaymentStatus::Processing)).await.unwrap();

        let mut completed = payment(PaymentStatus::Completed);
        completed.updated_at = Utc::now() - chrono::Duration::minutes(30);
        store.insert(completed).await.unwrap();

        let sweep =
            ReconciliationSweep::new(Arc::new(store.clone()), Duration::from_secs(15 * 60));
        let stuck = sweep.run_once().await.unwrap();

        assert_eq!(stuck, vec![old_id]);
    }

    #[tokio::test]
    async fn sweep_never_mutates_payments() {
        let store = InMemoryPaymentStore::new();
        let mut stuck = payment(PaymentStatus::Processing);
        stuck.updated_at = Utc::now() - chrono::Duration::hours(1);
        let id = stuck.id;
        store.insert(stuck).await.unwrap();

        let sweep = ReconciliationSweep::new(Arc::new(store.clone()), Duration::from_secs(60));
        sweep.run_once().await.unwrap();
        sweep.run_once().await.unwrap();

        let after = store.get(id).await.unwrap().unwrap();
        assert_eq!(after.status, PaymentStatus::Processing);
    }
}
