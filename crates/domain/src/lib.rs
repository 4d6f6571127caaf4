//! Domain model shared by the payment and order services.
//!
//! Each service owns its documents: the payment service writes [`Payment`]
//! documents, the order service writes [`Order`] documents, and they only
//! learn about each other's state through the event topics in [`events`].
//! Status enums are closed sets with validated string mappings, so raw
//! strings from the outside world never reach a state machine unchecked.

pub mod error;
pub mod events;
pub mod order;
pub mod payment;
pub mod value_objects;

pub use error::{DomainError, Result};
pub use order::{
    InMemoryOrderStore, Order, OrderPaymentStatus, OrderStatus, OrderStore,
};
pub use payment::{
    InMemoryPaymentStore, Payment, PaymentStatus, PaymentStore, Refund,
};
pub use value_objects::{Money, OrderItem, ProductId, ShippingAddress};
