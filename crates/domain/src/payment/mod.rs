//! Payment entity, state machine and document store.

pub mod model;
pub mod status;
pub mod store;

pub use model::{Payment, Refund};
pub use status::PaymentStatus;
pub use store::{InMemoryPaymentStore, PaymentStore};
