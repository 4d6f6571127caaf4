//! Order saga participant.
//!
//! The order service never receives direct calls from the payment side: it
//! materializes and advances orders by consuming `payment.*` events in the
//! `order-service` group. On top of the participant sit the direct
//! status-transition service used by operators and the cancellation saga
//! that rolls an order back and compensates its payment.

mod announce;

pub mod cancellation;
pub mod error;
pub mod participant;
pub mod service;

pub use cancellation::{
    Actor, CancellationOutcome, CancellationSaga, InMemoryRefundRequester, RefundRequester,
};
pub use error::{OrderSagaError, Result};
pub use participant::{CONSUMER_GROUP, OrderParticipant};
pub use service::OrderStatusService;
