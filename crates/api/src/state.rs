//! Shared application state and cross-service wiring.

use std::sync::Arc;

use async_trait::async_trait;
use common::PaymentId;
use order_saga::{CancellationSaga, OrderSagaError, OrderStatusService, RefundRequester};
use payment_saga::PaymentOrchestrator;

use crate::auth::Authenticator;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub orchestrator: Arc<PaymentOrchestrator>,
    pub orders: OrderStatusService,
    pub cancellation: CancellationSaga,
    pub authenticator: Arc<dyn Authenticator>,
}

/// Lets the cancellation saga request compensating refunds through the
/// payment orchestrator without the order crate depending on it.
pub struct OrchestratorRefunds(pub Arc<PaymentOrchestrator>);

#[async_trait]
impl RefundRequester for OrchestratorRefunds {
    async fn request_refund(&self, payment_id: PaymentId) -> order_saga::Result<()> {
        self.0
            .refund(payment_id)
            .await
            .map(|_| ())
            .map_err(|e| OrderSagaError::RefundFailed(e.to_string()))
    }
}
