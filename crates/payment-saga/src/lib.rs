//! Payment saga orchestrator.
//!
//! The payment service starts the saga: it validates the checkout request,
//! opens a processor session, persists a pending [`domain::Payment`] and
//! announces `payment.initiated`. From there the processor drives it through
//! signed webhooks, and an admin refund path provides the compensating
//! transaction. A reconciliation sweep surfaces payments stuck waiting on a
//! webhook that never came.

pub mod error;
pub mod fees;
pub mod orchestrator;
pub mod processor;
pub mod reconcile;
pub mod webhook;

pub use error::{PaymentSagaError, Result};
pub use fees::{net_amount, processing_fee};
pub use orchestrator::{CheckoutStarted, PaymentOrchestrator, StartCheckout};
pub use processor::{CheckoutSession, InMemoryProcessor, PaymentProcessor, ProcessorRefund};
pub use reconcile::ReconciliationSweep;
pub use webhook::{ProcessorEvent, SIGNATURE_HEADER, sign, verify};
