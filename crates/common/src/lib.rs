//! Shared identifier types used by both the Payment and Order services.

pub mod types;

pub use types::{CorrelationId, OrderId, PaymentId, UserId};
