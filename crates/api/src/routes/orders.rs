//! Order read, cancellation and status-transition endpoints.

use std::str::FromStr;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use common::OrderId;
use domain::{Order, OrderStatus};
use order_saga::CancellationOutcome;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{require_actor, require_admin};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CancelRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub user_id: String,
    pub status: String,
    pub payment_status: String,
    pub amount_cents: i64,
    pub currency: String,
    pub items: Vec<OrderItemResponse>,
    pub created_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.to_string(),
            user_id: order.user_id.to_string(),
            status: order.status.to_string(),
            payment_status: order.payment_status.to_string(),
            amount_cents: order.amount.cents(),
            currency: order.currency,
            items: order
                .items
                .into_iter()
                .map(|item| OrderItemResponse {
                    product_id: item.product_id.to_string(),
                    product_name: item.product_name,
                    quantity: item.quantity,
                    unit_price_cents: item.unit_price.cents(),
                })
                .collect(),
            created_at: order.created_at,
            cancelled_at: order.cancelled_at,
        }
    }
}

fn parse_order_id(raw: &str) -> Result<OrderId, ApiError> {
    Uuid::parse_str(raw)
        .map(OrderId::from_uuid)
        .map_err(|_| ApiError::BadRequest(format!("invalid order id '{raw}'")))
}

/// GET /orders/{id} — returns the order to its owner or an admin.
#[tracing::instrument(skip(state, headers))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<OrderResponse>, ApiError> {
    let actor = require_actor(state.authenticator.as_ref(), &headers).await?;
    let order_id = parse_order_id(&id)?;

    let order = state.orders.get_order(order_id).await?;
    if !actor.is_admin() && actor.user_id != order.user_id {
        return Err(ApiError::Forbidden);
    }
    Ok(Json(order.into()))
}

/// PATCH /orders/{id}/cancel — runs the cancellation saga.
#[tracing::instrument(skip(state, headers, req))]
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<CancelRequest>,
) -> Result<Json<CancellationOutcome>, ApiError> {
    let actor = require_actor(state.authenticator.as_ref(), &headers).await?;
    let order_id = parse_order_id(&id)?;

    let outcome = state.cancellation.cancel(order_id, &actor, req.reason).await?;
    Ok(Json(outcome))
}

/// PATCH /orders/{id}/status — admin-only direct transition.
///
/// The status arrives as a string and goes through the validated mapping
/// before it touches the state machine.
#[tracing::instrument(skip(state, headers, req))]
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let actor = require_actor(state.authenticator.as_ref(), &headers).await?;
    require_admin(&actor)?;
    let order_id = parse_order_id(&id)?;

    let next = OrderStatus::from_str(&req.status)?;
    let order = state.orders.update_status(order_id, next).await?;
    Ok(Json(order.into()))
}
