//! Payment saga error types.

use domain::DomainError;
use event_log::EventLogError;
use thiserror::Error;

/// Errors that can occur while orchestrating the payment saga.
#[derive(Debug, Error)]
pub enum PaymentSagaError {
    /// The webhook signature did not match the shared secret.
    #[error("invalid webhook signature")]
    InvalidSignature,

    /// The webhook body was not a well-formed processor event.
    #[error("malformed processor event: {0}")]
    MalformedEvent(#[from] serde_json::Error),

    /// The payment processor rejected or failed a call.
    #[error("payment processor error: {0}")]
    ExternalProcessor(String),

    /// A domain rule rejected the operation.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The event log failed outside the best-effort publish path.
    #[error(transparent)]
    EventLog(#[from] EventLogError),
}

/// Result type for payment saga operations.
pub type Result<T> = std::result::Result<T, PaymentSagaError>;
