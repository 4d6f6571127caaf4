//! Checkout, webhook and refund orchestration.

use std::sync::Arc;

use chrono::Utc;
use common::{CorrelationId, OrderId, PaymentId, UserId};
use domain::events::{self, topics};
use domain::{
    DomainError, Money, OrderItem, Payment, PaymentStatus, PaymentStore, Refund, ShippingAddress,
};
use event_log::{EventLog, EventRecord};
use serde::{Deserialize, Serialize};

use crate::error::{PaymentSagaError, Result};
use crate::fees;
use crate::processor::PaymentProcessor;
use crate::webhook::{self, ProcessorEvent};

/// Command to start a checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartCheckout {
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub amount: Money,
    pub currency: String,
    pub customer_email: String,
    pub shipping_address: Option<ShippingAddress>,
}

/// Outcome of a started checkout, returned to the caller immediately; the
/// order side materializes asynchronously from `payment.initiated`.
#[derive(Debug, Clone)]
pub struct CheckoutStarted {
    pub payment: Payment,
    pub redirect_url: String,
    pub correlation_id: CorrelationId,
}

/// Drives the payment half of the order-payment saga.
///
/// Collaborators are injected at construction; the orchestrator holds no
/// global state.
pub struct PaymentOrchestrator {
    store: Arc<dyn PaymentStore>,
    processor: Arc<dyn PaymentProcessor>,
    event_log: Arc<dyn EventLog>,
    webhook_secret: String,
}

impl PaymentOrchestrator {
    /// Creates a new orchestrator.
    pub fn new(
        store: Arc<dyn PaymentStore>,
        processor: Arc<dyn PaymentProcessor>,
        event_log: Arc<dyn EventLog>,
        webhook_secret: impl Into<String>,
    ) -> Self {
        Self {
            store,
            processor,
            event_log,
            webhook_secret: webhook_secret.into(),
        }
    }

    /// Starts the saga: opens a processor session, persists the pending
    /// payment and announces `payment.initiated`.
    ///
    /// A processor failure surfaces before any local state is written.
    #[tracing::instrument(skip(self, cmd), fields(user_id = %cmd.user_id))]
    pub async fn start_checkout(&self, cmd: StartCheckout) -> Result<CheckoutStarted> {
        validate_checkout(&cmd)?;

        let order_id = OrderId::new();
        let correlation_id = CorrelationId::new();
        let processing_fee = fees::processing_fee(cmd.amount);
        let net = fees::net_amount(cmd.amount);

        let session = self
            .processor
            .create_checkout_session(order_id, cmd.amount, &cmd.currency, &cmd.customer_email)
            .await?;

        let mut payment = Payment::new(
            PaymentId::new(),
            order_id,
            cmd.user_id,
            cmd.amount,
            cmd.currency.clone(),
            processing_fee,
            net,
            correlation_id,
        );
        payment.session_id = Some(session.session_id.clone());
        self.store.insert(payment.clone()).await?;

        metrics::counter!("payments_initiated").increment(1);
        tracing::info!(
            payment_id = %payment.id,
            order_id = %order_id,
            correlation_id = %correlation_id,
            session_id = %session.session_id,
            "checkout session started"
        );

        let event = events::PaymentInitiated {
            payment_id: payment.id,
            order_id,
            user_id: cmd.user_id,
            amount: cmd.amount,
            currency: cmd.currency,
            items: cmd.items,
            shipping_address: cmd.shipping_address,
            correlation_id,
            timestamp: Utc::now(),
        };
        self.publish(topics::PAYMENT_INITIATED, order_id, correlation_id, &event)
            .await;

        Ok(CheckoutStarted {
            payment,
            redirect_url: session.redirect_url,
            correlation_id,
        })
    }

    /// Verifies and applies a processor webhook.
    ///
    /// Verification fails closed; the body is only parsed afterwards.
    /// Webhooks for unknown payments are logged and acknowledged so the
    /// processor stops retrying them.
    #[tracing::instrument(skip_all)]
    pub async fn handle_webhook(&self, body: &[u8], signature: &str) -> Result<()> {
        webhook::verify(&self.webhook_secret, body, signature)?;
        let event: ProcessorEvent = serde_json::from_slice(body)?;
        metrics::counter!("processor_webhooks_received").increment(1);

        match event {
            ProcessorEvent::CheckoutSessionCompleted {
                session_id,
                payment_status,
                transaction_id,
            } => {
                self.on_session_completed(&session_id, &payment_status, transaction_id)
                    .await
            }
            ProcessorEvent::ChargeSucceeded {
                transaction_id,
                charge_id,
            } => self.on_charge_succeeded(&transaction_id, &charge_id).await,
            ProcessorEvent::PaymentFailed { session_id, reason } => {
                self.on_payment_failed(&session_id, &reason).await
            }
            ProcessorEvent::ChargeRefunded {
                charge_id,
                refund_id,
                amount_cents,
            } => {
                self.on_charge_refunded(&charge_id, &refund_id, Money::from_cents(amount_cents))
                    .await
            }
        }
    }

    async fn on_session_completed(
        &self,
        session_id: &str,
        payment_status: &str,
        transaction_id: Option<String>,
    ) -> Result<()> {
        let Some(mut payment) = self.store.find_by_session_id(session_id).await? else {
            tracing::warn!(session_id, "session-completed webhook for unknown payment");
            return Ok(());
        };

        // Late or repeated callback once the payment settled one way or
        // the other.
        if payment.status == PaymentStatus::Completed || payment.status.is_terminal() {
            return Ok(());
        }

        if let Some(transaction_id) = transaction_id {
            payment.transaction_id = Some(transaction_id);
        }

        if payment_status == "paid" {
            payment.transition(PaymentStatus::Completed)?;
            self.store.save(payment.clone()).await?;
            metrics::counter!("payments_completed").increment(1);
            tracing::info!(payment_id = %payment.id, "payment completed at session close");
            self.announce_completed(&payment).await;
        } else {
            if payment.status == PaymentStatus::Pending {
                payment.transition(PaymentStatus::Processing)?;
            }
            self.store.save(payment).await?;
        }
        Ok(())
    }

    async fn on_charge_succeeded(&self, transaction_id: &str, charge_id: &str) -> Result<()> {
        let payment = match self.store.find_by_transaction_id(transaction_id).await? {
            Some(payment) => Some(payment),
            None => self.store.find_by_charge_id(charge_id).await?,
        };
        let Some(mut payment) = payment else {
            tracing::warn!(transaction_id, charge_id, "charge webhook for unknown payment");
            return Ok(());
        };

        if payment.status == PaymentStatus::Completed || payment.status.is_terminal() {
            return Ok(());
        }

        payment.transaction_id = Some(transaction_id.to_string());
        payment.charge_id = Some(charge_id.to_string());
        payment.transition(PaymentStatus::Completed)?;
        self.store.save(payment.clone()).await?;

        metrics::counter!("payments_completed").increment(1);
        tracing::info!(payment_id = %payment.id, transaction_id, "charge captured");
        self.announce_completed(&payment).await;
        Ok(())
    }

    async fn on_payment_failed(&self, session_id: &str, reason: &str) -> Result<()> {
        let Some(mut payment) = self.store.find_by_session_id(session_id).await? else {
            tracing::warn!(session_id, "failure webhook for unknown payment");
            return Ok(());
        };

        if !payment.status.can_transition_to(PaymentStatus::Failed) {
            tracing::warn!(
                payment_id = %payment.id,
                status = %payment.status,
                "failure webhook for payment that cannot fail, ignoring"
            );
            return Ok(());
        }

        payment.mark_failed(reason)?;
        self.store.save(payment.clone()).await?;

        metrics::counter!("payments_failed").increment(1);
        tracing::info!(payment_id = %payment.id, reason, "payment failed");

        let event = events::PaymentFailed {
            payment_id: payment.id,
            order_id: payment.order_id,
            reason: reason.to_string(),
            correlation_id: payment.correlation_id,
            timestamp: Utc::now(),
        };
        self.publish(
            topics::PAYMENT_FAILED,
            payment.order_id,
            payment.correlation_id,
            &event,
        )
        .await;
        Ok(())
    }

    async fn on_charge_refunded(
        &self,
        charge_id: &str,
        refund_id: &str,
        amount: Money,
    ) -> Result<()> {
        let Some(mut payment) = self.store.find_by_charge_id(charge_id).await? else {
            tracing::warn!(charge_id, "refund webhook for unknown payment");
            return Ok(());
        };

        if payment.status == PaymentStatus::Refunded {
            return Ok(());
        }
        if !payment.status.can_transition_to(PaymentStatus::Refunded) {
            tracing::warn!(
                payment_id = %payment.id,
                status = %payment.status,
                "refund webhook for uncaptured payment, ignoring"
            );
            return Ok(());
        }

        payment.record_refund(Refund {
            refund_id: refund_id.to_string(),
            amount,
            refunded_at: Utc::now(),
        })?;
        self.store.save(payment.clone()).await?;

        metrics::counter!("payments_refunded").increment(1);
        tracing::info!(payment_id = %payment.id, refund_id, "charge refunded at processor");
        self.announce_cancelled(&payment, Some(refund_id.to_string()))
            .await;
        Ok(())
    }

    /// Compensating transaction: refunds a completed payment through the
    /// processor and announces `payment.cancelled`.
    #[tracing::instrument(skip(self))]
    pub async fn refund(&self, payment_id: PaymentId) -> Result<Payment> {
        let Some(mut payment) = self.store.get(payment_id).await? else {
            return Err(DomainError::NotFound {
                entity: "payment",
                id: payment_id.to_string(),
            }
            .into());
        };

        if !payment.status.can_transition_to(PaymentStatus::Refunded) {
            return Err(DomainError::InvalidTransition {
                entity: "payment",
                from: payment.status.to_string(),
                to: PaymentStatus::Refunded.to_string(),
            }
            .into());
        }

        let reference = payment
            .charge_id
            .clone()
            .or_else(|| payment.transaction_id.clone())
            .ok_or_else(|| {
                DomainError::Validation(format!("payment {} has no charge reference", payment.id))
            })?;

        let refund = self.processor.refund_charge(&reference, payment.amount).await?;
        payment.record_refund(Refund {
            refund_id: refund.refund_id.clone(),
            amount: payment.amount,
            refunded_at: Utc::now(),
        })?;
        self.store.save(payment.clone()).await?;

        metrics::counter!("payments_refunded").increment(1);
        tracing::info!(
            payment_id = %payment.id,
            refund_id = %refund.refund_id,
            "payment refunded"
        );
        self.announce_cancelled(&payment, Some(refund.refund_id)).await;
        Ok(payment)
    }

    async fn announce_completed(&self, payment: &Payment) {
        let event = events::PaymentCompleted {
            payment_id: payment.id,
            order_id: payment.order_id,
            transaction_id: payment
                .transaction_id
                .clone()
                .or_else(|| payment.session_id.clone())
                .unwrap_or_default(),
            amount: payment.amount,
            correlation_id: payment.correlation_id,
            timestamp: Utc::now(),
        };
        self.publish(
            topics::PAYMENT_COMPLETED,
            payment.order_id,
            payment.correlation_id,
            &event,
        )
        .await;
    }

    async fn announce_cancelled(&self, payment: &Payment, refund_id: Option<String>) {
        let event = events::PaymentCancelled {
            payment_id: payment.id,
            order_id: payment.order_id,
            refund_id,
            amount: payment.amount,
            correlation_id: payment.correlation_id,
            timestamp: Utc::now(),
        };
        self.publish(
            topics::PAYMENT_CANCELLED,
            payment.order_id,
            payment.correlation_id,
            &event,
        )
        .await;
    }

    /// Best-effort publish after a committed local write. The document is
    /// authoritative; a lost announcement is logged and counted, never
    /// rolled back.
    async fn publish<T: Serialize>(
        &self,
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

        if let Err(e) = self.event_log.publish(builder.build()).await {
            metrics::counter!("event_publish_failures", "topic" => topic.to_string()).increment(1);
            tracing::warn!(topic, error = %e, "event publish failed after local commit");
        }
    }
}

fn validate_checkout(cmd: &StartCheckout) -> Result<()> {
    if cmd.items.is_empty() {
        return Err(DomainError::Validation("items must not be empty".to_string()).into());
    }
    if !cmd.amount.is_positive() {
        return Err(DomainError::Validation("amount must be positive".to_string()).into());
    }
    if cmd.currency.trim().is_empty() {
        return Err(DomainError::Validation("currency is required".to_string()).into());
    }
    let email_ok = matches!(
        cmd.customer_email.split_once('@'),
        Some((local, domain))
            if !local.is_empty() && !domain.is_empty() && !cmd.customer_email.contains(char::is_whitespace)
    );
    if !email_ok {
        return Err(DomainError::Validation(format!(
            "invalid customer email '{}'",
            cmd.customer_email
        ))
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::InMemoryProcessor;
    use domain::InMemoryPaymentStore;
    use event_log::InMemoryEventLog;

    const SECRET: &str = "whsec_test";

    struct Fixture {
        orchestrator: PaymentOrchestrator,
        store: InMemoryPaymentStore,
        processor: InMemoryProcessor,
        log: InMemoryEventLog,
    }

    fn fixture() -> Fixture {
        let store = InMemoryPaymentStore::new();
        let processor = InMemoryProcessor::new();
        let log = InMemoryEventLog::new();
        let orchestrator = PaymentOrchestrator::new(
            Arc::new(store.clone()),
            Arc::new(processor.clone()),
            Arc::new(log.clone()),
            SECRET,
        );
        Fixture {
            orchestrator,
            store,
            processor,
            log,
        }
    }

    fn checkout_cmd() -> StartCheckout {
        StartCheckout {
            user_id: UserId::new(),
            items: vec![OrderItem::new("sku-1", "Widget", 2, Money::from_cents(2999))],
            amount: Money::from_cents(5998),
            currency: "usd".to_string(),
            customer_email: "ada@example.com".to_string(),
            shipping_address: None,
        }
    }

    fn signed(event: serde_json::Value) -> (Vec<u8>, String) {
        let body = serde_json::to_vec(&event).unwrap();
        let signature = webhook::sign(SECRET, &body);
        (body, signature)
    }

    async fn deliver(fx: &Fixture, event: serde_json::Value) {
        let (body, signature) = signed(event);
        fx.orchestrator.handle_webhook(&body, &signature).await.unwrap();
    }

    #[tokio::test]
    async fn start_checkout_persists_pending_payment_and_announces() {
        let fx = fixture();

        let started = fx.orchestrator.start_checkout(checkout_cmd()).await.unwrap();

        assert_eq!(started.payment.status, PaymentStatus::Pending);
        assert_eq!(started.payment.processing_fee, Money::from_cents(204));
        assert_eq!(started.payment.net_amount, Money::from_cents(5794));
        assert_eq!(started.payment.session_id.as_deref(), Some("cs_0001"));
        assert_eq!(fx.store.count().await, 1);

        let records = fx
            .log
            .records_for_topic(topics::PAYMENT_INITIATED)
            .await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].correlation_id, started.correlation_id);
        assert_eq!(records[0].partition_key, started.payment.order_id.to_string());

        let payload: events::PaymentInitiated = records[0].payload_as().unwrap();
        assert_eq!(payload.payment_id, started.payment.id);
        assert_eq!(payload.items.len(), 1);
    }

    #[tokio::test]
    async fn checkout_validation_rejects_bad_input() {
        let fx = fixture();

        let mut cmd = checkout_cmd();
        cmd.items.clear();
        assert!(matches!(
            fx.orchestrator.start_checkout(cmd).await,
            Err(PaymentSagaError::Domain(DomainError::Validation(_)))
        ));

        let mut cmd = checkout_cmd();
        cmd.amount = Money::zero();
        assert!(fx.orchestrator.start_checkout(cmd).await.is_err());

        let mut cmd = checkout_cmd();
        cmd.customer_email = "not-an-email".to_string();
        assert!(fx.orchestrator.start_checkout(cmd).await.is_err());

        assert_eq!(fx.store.count().await, 0);
        assert_eq!(fx.processor.session_count(), 0);
    }

    #[tokio::test]
    async fn processor_failure_leaves_no_local_state() {
        let fx = fixture();
        fx.processor.set_fail_on_create(true);

        let result = fx.orchestrator.start_checkout(checkout_cmd()).await;

        assert!(matches!(result, Err(PaymentSagaError::ExternalProcessor(_))));
        assert_eq!(fx.store.count().await, 0);
        assert_eq!(fx.log.record_count().await, 0);
    }

    #[tokio::test]
    async fn webhook_with_bad_signature_is_rejected_before_parsing() {
        let fx = fixture();

        let body = serde_json::to_vec(&serde_json::json!({"type": "garbage"})).unwrap();
        let signature = webhook::sign("whsec_other", &body);

        assert!(matches!(
            fx.orchestrator.handle_webhook(&body, &signature).await,
            Err(PaymentSagaError::InvalidSignature)
        ));
    }

    #[tokio::test]
    async fn session_completed_paid_goes_straight_to_completed() {
        let fx = fixture();
        let started = fx.orchestrator.start_checkout(checkout_cmd()).await.unwrap();

        deliver(
            &fx,
            serde_json::json!({
                "type": "checkout.session.completed",
                "data": {
                    "session_id": "cs_0001",
                    "payment_status": "paid",
                    "transaction_id": "txn_1"
                }
            }),
        )
        .await;

        let payment = fx.store.get(started.payment.id).await.unwrap().unwrap();
        assert_eq!(payment.status, PaymentStatus::Completed);
        assert_eq!(payment.transaction_id.as_deref(), Some("txn_1"));

        let records = fx.log.records_for_topic(topics::PAYMENT_COMPLETED).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].correlation_id, started.correlation_id);
    }

    #[tokio::test]
    async fn unpaid_session_waits_for_the_charge() {
        let fx = fixture();
        let started = fx.orchestrator.start_checkout(checkout_cmd()).await.unwrap();

        deliver(
            &fx,
            serde_json::json!({
                "type": "checkout.session.completed",
                "data": {
                    "session_id": "cs_0001",
                    "payment_status": "unpaid",
                    "transaction_id": "txn_1"
                }
            }),
        )
        .await;

        let payment = fx.store.get(started.payment.id).await.unwrap().unwrap();
        assert_eq!(payment.status, PaymentStatus::Processing);
        assert!(fx.log.records_for_topic(topics::PAYMENT_COMPLETED).await.is_empty());

        deliver(
            &fx,
            serde_json::json!({
                "type": "charge.succeeded",
                "data": {"transaction_id": "txn_1", "charge_id": "ch_1"}
            }),
        )
        .await;

        let payment = fx.store.get(started.payment.id).await.unwrap().unwrap();
        assert_eq!(payment.status, PaymentStatus::Completed);
        assert_eq!(payment.charge_id.as_deref(), Some("ch_1"));
        assert_eq!(fx.log.records_for_topic(topics::PAYMENT_COMPLETED).await.len(), 1);
    }

    #[tokio::test]
    async fn repeated_charge_webhook_is_a_no_op() {
        let fx = fixture();
        fx.orchestrator.start_checkout(checkout_cmd()).await.unwrap();

        let charge = serde_json::json!({
            "type": "charge.succeeded",
            "data": {"transaction_id": "txn_1", "charge_id": "ch_1"}
        });

        // The charge can land before the session callback; lookup falls
        // back to the charge id on redelivery.
        deliver(&fx, charge.clone()).await;
        let unknown = fx.log.records_for_topic(topics::PAYMENT_COMPLETED).await;
        assert!(unknown.is_empty());

        deliver(
            &fx,
            serde_json::json!({
                "type": "checkout.session.completed",
                "data": {"session_id": "cs_0001", "payment_status": "unpaid", "transaction_id": "txn_1"}
            }),
        )
        .await;
        deliver(&fx, charge.clone()).await;
        deliver(&fx, charge).await;

        assert_eq!(fx.log.records_for_topic(topics::PAYMENT_COMPLETED).await.len(), 1);
    }

    #[tokio::test]
    async fn declined_payment_fails_with_reason() {
        let fx = fixture();
        let started = fx.orchestrator.start_checkout(checkout_cmd()).await.unwrap();

        deliver(
            &fx,
            serde_json::json!({
                "type": "payment.failed",
                "data": {"session_id": "cs_0001", "reason": "card_declined"}
            }),
        )
        .await;

        let payment = fx.store.get(started.payment.id).await.unwrap().unwrap();
        assert_eq!(payment.status, PaymentStatus::Failed);
        assert_eq!(payment.failure_reason.as_deref(), Some("card_declined"));

        let records = fx.log.records_for_topic(topics::PAYMENT_FAILED).await;
        assert_eq!(records.len(), 1);
        let payload: events::PaymentFailed = records[0].payload_as().unwrap();
        assert_eq!(payload.reason, "card_declined");
    }

    #[tokio::test]
    async fn webhook_for_unknown_payment_is_acknowledged() {
        let fx = fixture();

        deliver(
            &fx,
            serde_json::json!({
                "type": "payment.failed",
                "data": {"session_id": "cs_9999", "reason": "card_declined"}
            }),
        )
        .await;

        assert_eq!(fx.log.record_count().await, 0);
    }

    #[tokio::test]
    async fn refund_compensates_a_completed_payment() {
        let fx = fixture();
        let started = fx.orchestrator.start_checkout(checkout_cmd()).await.unwrap();
        deliver(
            &fx,
            serde_json::json!({
                "type": "checkout.session.completed",
                "data": {"session_id": "cs_0001", "payment_status": "paid", "transaction_id": "txn_1"}
            }),
        )
        .await;

        let refunded = fx.orchestrator.refund(started.payment.id).await.unwrap();

        assert_eq!(refunded.status, PaymentStatus::Refunded);
        assert!(refunded.refund.is_some());
        assert_eq!(fx.processor.refund_count(), 1);

        let records = fx.log.records_for_topic(topics::PAYMENT_CANCELLED).await;
        assert_eq!(records.len(), 1);
        let payload: events::PaymentCancelled = records[0].payload_as().unwrap();
        assert!(payload.refund_id.is_some());
    }

    #[tokio::test]
    async fn refund_of_a_pending_payment_is_rejected() {
        let fx = fixture();
        let started = fx.orchestrator.start_checkout(checkout_cmd()).await.unwrap();

        let result = fx.orchestrator.refund(started.payment.id).await;
        assert!(matches!(
            result,
            Err(PaymentSagaError::Domain(DomainError::InvalidTransition { .. }))
        ));

        let result = fx.orchestrator.refund(PaymentId::new()).await;
        assert!(matches!(
            result,
            Err(PaymentSagaError::Domain(DomainError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn refund_webhook_records_external_refund() {
        let fx = fixture();
        let started = fx.orchestrator.start_checkout(checkout_cmd()).await.unwrap();
        deliver(
            &fx,
            serde_json::json!({
                "type": "checkout.session.completed",
                "data": {"session_id": "cs_0001", "payment_status": "unpaid", "transaction_id": "txn_1"}
            }),
        )
        .await;
        deliver(
            &fx,
            serde_json::json!({
                "type": "charge.succeeded",
                "data": {"transaction_id": "txn_1", "charge_id": "ch_1"}
            }),
        )
        .await;
        deliver(
            &fx,
            serde_json::json!({
                "type": "charge.refunded",
                "data": {"charge_id": "ch_1", "refund_id": "re_ext", "amount_cents": 5998}
            }),
        )
        .await;

        let payment = fx.store.get(started.payment.id).await.unwrap().unwrap();
        assert_eq!(payment.status, PaymentStatus::Refunded);
        assert_eq!(payment.refund.as_ref().unwrap().refund_id, "re_ext");
        assert_eq!(fx.log.records_for_topic(topics::PAYMENT_CANCELLED).await.len(), 1);
    }

    #[tokio::test]
    async fn lost_publish_does_not_fail_the_checkout() {
        let fx = fixture();
        fx.log.set_fail_on_publish(true);

        let started = fx.orchestrator.start_checkout(checkout_cmd()).await.unwrap();

        assert_eq!(started.payment.status, PaymentStatus::Pending);
        assert_eq!(fx.store.count().await, 1);
        assert_eq!(fx.log.record_count().await, 0);
    }
}
