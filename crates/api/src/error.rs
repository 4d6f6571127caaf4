//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::DomainError;
use order_saga::OrderSagaError;
use payment_saga::PaymentSagaError;
use thiserror::Error;

/// API-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing/invalid credentials or a bad webhook signature.
    #[error("{0}")]
    Unauthorized(String),
    /// Authenticated, but not allowed to act on this resource.
    #[error("forbidden")]
    Forbidden,
    /// Resource not found.
    #[error("{0}")]
    NotFound(String),
    /// Bad request from the client.
    #[error("{0}")]
    BadRequest(String),
    /// The request lost a race or hit a state machine guard.
    #[error("{0}")]
    Conflict(String),
    /// Internal server error.
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => {
                tracing::error!(error = %self, "internal server error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match &err {
            DomainError::Validation(_) | DomainError::UnknownStatus { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            DomainError::InvalidTransition { .. } => ApiError::Conflict(err.to_string()),
            DomainError::NotFound { .. } => ApiError::NotFound(err.to_string()),
        }
    }
}

impl From<PaymentSagaError> for ApiError {
    fn from(err: PaymentSagaError) -> Self {
        match err {
            PaymentSagaError::InvalidSignature => ApiError::Unauthorized(err.to_string()),
            PaymentSagaError::MalformedEvent(_) => ApiError::BadRequest(err.to_string()),
            PaymentSagaError::ExternalProcessor(_) => ApiError::Internal(err.to_string()),
            PaymentSagaError::Domain(domain_err) => domain_err.into(),
            PaymentSagaError::EventLog(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<OrderSagaError> for ApiError {
    fn from(err: OrderSagaError) -> Self {
        match err {
            OrderSagaError::Forbidden => ApiError::Forbidden,
            OrderSagaError::AlreadyCancelled(_) => ApiError::Conflict(err.to_string()),
            OrderSagaError::OrderNotFound(_) => ApiError::NotFound(err.to_string()),
            OrderSagaError::RefundFailed(_) => ApiError::Internal(err.to_string()),
            OrderSagaError::Domain(domain_err) => domain_err.into(),
            OrderSagaError::EventLog(_) => ApiError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::OrderId;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn taxonomy_maps_to_http_statuses() {
        assert_eq!(
            status_of(DomainError::Validation("bad".to_string()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(PaymentSagaError::InvalidSignature.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_of(OrderSagaError::Forbidden.into()), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(OrderSagaError::OrderNotFound(OrderId::new()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(
                DomainError::InvalidTransition {
                    entity: "order",
                    from: "Delivered".to_string(),
                    to: "Cancelled".to_string(),
                }
                .into()
            ),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(OrderSagaError::AlreadyCancelled(OrderId::new()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(PaymentSagaError::ExternalProcessor("down".to_string()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn messages_render_through_display() {
        assert_eq!(
            ApiError::BadRequest("invalid order id".to_string()).to_string(),
            "invalid order id"
        );
        assert_eq!(ApiError::Forbidden.to_string(), "forbidden");
    }
}
