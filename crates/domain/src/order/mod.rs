//! Order entity, state machine and document store.

pub mod model;
pub mod status;
pub mod store;

pub use model::{META_CORRELATION_ID, META_PAYMENT_ID, META_TRANSACTION_ID, Order};
pub use status::{OrderPaymentStatus, OrderStatus};
pub use store::{InMemoryOrderStore, OrderStore};
