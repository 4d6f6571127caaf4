//! Checkout endpoint starting the payment saga.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use domain::{Money, OrderItem, ShippingAddress};
use payment_saga::StartCheckout;
use serde::{Deserialize, Serialize};

use crate::auth::require_actor;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<OrderItemRequest>,
    pub amount_cents: i64,
    pub currency: String,
    pub customer_email: String,
    pub shipping_address: Option<ShippingAddress>,
}

#[derive(Deserialize)]
pub struct OrderItemRequest {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub payment_id: String,
    pub order_id: String,
    pub correlation_id: String,
    pub redirect_url: String,
    pub status: String,
    pub amount_cents: i64,
    pub processing_fee_cents: i64,
    pub net_amount_cents: i64,
}

/// POST /checkout-session — starts the payment saga for the caller.
#[tracing::instrument(skip_all)]
pub async fn create(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>), ApiError> {
    let actor = require_actor(state.authenticator.as_ref(), &headers).await?;

    let items = req
        .items
        .into_iter()
        .map(|item| {
            OrderItem::new(
                item.product_id,
                item.product_name,
                item.quantity,
                Money::from_cents(item.unit_price_cents),
            )
        })
        .collect();

    let started = state
        .orchestrator
        .start_checkout(StartCheckout {
            user_id: actor.user_id,
            items,
            amount: Money::from_cents(req.amount_cents),
            currency: req.currency,
            customer_email: req.customer_email,
            shipping_address: req.shipping_address,
        })
        .await?;

    let payment = started.payment;
    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            payment_id: payment.id.to_string(),
            order_id: payment.order_id.to_string(),
            correlation_id: started.correlation_id.to_string(),
            redirect_url: started.redirect_url,
            status: payment.status.to_string(),
            amount_cents: payment.amount.cents(),
            processing_fee_cents: payment.processing_fee.cents(),
            net_amount_cents: payment.net_amount.cents(),
        }),
    ))
}
