//! Order saga error types.

use common::OrderId;
use domain::DomainError;
use event_log::EventLogError;
use thiserror::Error;

/// Errors that can occur on the order side of the saga.
#[derive(Debug, Error)]
pub enum OrderSagaError {
    /// The actor neither owns the order nor holds the admin role.
    #[error("actor is not allowed to act on this order")]
    Forbidden,

    /// The order was already cancelled outside the cancellation saga.
    #[error("order {0} is already cancelled")]
    AlreadyCancelled(OrderId),

    /// The referenced order does not exist.
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// The compensating refund could not be initiated.
    #[error("refund request failed: {0}")]
    RefundFailed(String),

    /// A domain rule rejected the operation.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The event log failed outside the best-effort publish path.
    #[error(transparent)]
    EventLog(#[from] EventLogError),
}

/// Result type for order saga operations.
pub type Result<T> = std::result::Result<T, OrderSagaError>;
