//! HTTP API for the order-payment saga coordination core.
//!
//! Exposes the checkout, webhook, cancellation, status-transition and
//! refund endpoints with structured logging (tracing) and Prometheus
//! metrics. All collaborators are wired at startup and shared through
//! [`state::AppState`]; nothing lives in module-level globals.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post};
use common::UserId;
use domain::{InMemoryOrderStore, InMemoryPaymentStore, OrderStore, PaymentStore};
use event_log::InMemoryEventLog;
use metrics_exporter_prometheus::PrometheusHandle;
use order_saga::{Actor, CancellationSaga, OrderParticipant, OrderStatusService};
use payment_saga::{InMemoryProcessor, PaymentOrchestrator, ReconciliationSweep};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::StaticTokenAuthenticator;
use crate::config::Config;
use crate::state::{AppState, OrchestratorRefunds};

/// Bearer token resolving to a plain user, for local development.
pub const DEV_USER_TOKEN: &str = "dev-user-token";

/// Bearer token resolving to an admin, for local development.
pub const DEV_ADMIN_TOKEN: &str = "dev-admin-token";

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/checkout-session", post(routes::checkout::create))
        .route("/webhook", post(routes::webhook::receive))
        .route("/orders/{id}", get(routes::orders::get))
        .route("/orders/{id}/cancel", patch(routes::orders::cancel))
        .route("/orders/{id}/status", patch(routes::orders::update_status))
        .route("/payment/{id}/refund", post(routes::payments::refund))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wires the in-memory deployment: one event log, both services, the order
/// participant subscribed in its group, and dev tokens for authentication.
///
/// Returns the shared state plus the reconciliation sweep for the caller
/// to schedule.
pub async fn create_default_state(config: &Config) -> (Arc<AppState>, ReconciliationSweep) {
    let event_log = Arc::new(InMemoryEventLog::new());
    let payment_store: Arc<dyn PaymentStore> = Arc::new(InMemoryPaymentStore::new());
    let order_store: Arc<dyn OrderStore> = Arc::new(InMemoryOrderStore::new());
    let processor = Arc::new(InMemoryProcessor::new());

    let orchestrator = Arc::new(PaymentOrchestrator::new(
        payment_store.clone(),
        processor,
        event_log.clone(),
        config.webhook_secret.clone(),
    ));

    let participant = Arc::new(OrderParticipant::new(
        order_store.clone(),
        event_log.clone(),
    ));
    participant
        .subscribe()
        .await
        .expect("order participant subscription");

    let orders = OrderStatusService::new(order_store.clone(), event_log.clone());
    let cancellation = CancellationSaga::new(
        order_store,
        Arc::new(OrchestratorRefunds(orchestrator.clone())),
        event_log,
    );

    let mut tokens = HashMap::new();
    tokens.insert(DEV_USER_TOKEN.to_string(), Actor::user(UserId::new()));
    tokens.insert(DEV_ADMIN_TOKEN.to_string(), Actor::admin(UserId::new()));
    let authenticator = Arc::new(StaticTokenAuthenticator::new(tokens));

    let sweep = ReconciliationSweep::new(payment_store, config.stuck_payment_timeout);

    let state = Arc::new(AppState {
        orchestrator,
        orders,
        cancellation,
        authenticator,
    });
    (state, sweep)
}
