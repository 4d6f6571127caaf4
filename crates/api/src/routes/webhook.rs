//! Processor webhook intake.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use payment_saga::SIGNATURE_HEADER;
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct WebhookResponse {
    pub received: bool,
}

/// POST /webhook — verifies and applies a processor callback.
///
/// The body stays raw bytes until the signature is verified.
#[tracing::instrument(skip_all)]
pub async fn receive(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("missing signature header".to_string()))?;

    state.orchestrator.handle_webhook(&body, signature).await?;
    Ok(Json(WebhookResponse { received: true }))
}
