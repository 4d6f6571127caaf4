//! Domain error types.

use thiserror::Error;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Input failed validation before any state was touched.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A state machine rejected the requested edge.
    #[error("invalid {entity} transition from {from} to {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    /// A status string did not map to any known variant.
    #[error("unknown {entity} status '{value}'")]
    UnknownStatus {
        entity: &'static str,
        value: String,
    },

    /// The referenced document does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
}

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;
