//! Admin refund endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use common::PaymentId;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::{require_actor, require_admin};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct RefundResponse {
    pub payment_id: String,
    pub order_id: String,
    pub status: String,
    pub refund_id: Option<String>,
    pub amount_cents: i64,
}

/// POST /payment/{id}/refund — admin-only compensating refund.
#[tracing::instrument(skip(state, headers))]
pub async fn refund(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<RefundResponse>, ApiError> {
    let actor = require_actor(state.authenticator.as_ref(), &headers).await?;
    require_admin(&actor)?;

    let payment_id = Uuid::parse_str(&id)
        .map(PaymentId::from_uuid)
        .map_err(|_| ApiError::BadRequest(format!("invalid payment id '{id}'")))?;

    let payment = state.orchestrator.refund(payment_id).await?;
    Ok(Json(RefundResponse {
        payment_id: payment.id.to_string(),
        order_id: payment.order_id.to_string(),
        status: payment.status.to_string(),
        refund_id: payment.refund.map(|r| r.refund_id),
        amount_cents: payment.amount.cents(),
    }))
}
