//! Processor webhook events and signature verification.
//!
//! Webhooks arrive as raw JSON bodies signed with HMAC-SHA256 over the
//! exact bytes, hex-encoded in the signature header. Verification fails
//! closed; the body is only parsed after the signature checks out.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::PaymentSagaError;

/// Header the processor puts the hex-encoded HMAC signature in.
pub const SIGNATURE_HEADER: &str = "x-processor-signature";

type HmacSha256 = Hmac<Sha256>;

fn mac_for(secret: &str, body: &[u8]) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    mac
}

/// Computes the hex-encoded signature for a body. Used by tests and by the
/// in-memory processor to produce deliverable webhooks.
pub fn sign(secret: &str, body: &[u8]) -> String {
    hex::encode(mac_for(secret, body).finalize().into_bytes())
}

/// Verifies a hex-encoded signature against the raw body, in constant time.
pub fn verify(secret: &str, body: &[u8], signature: &str) -> Result<(), PaymentSagaError> {
    let claimed = hex::decode(signature).map_err(|_| PaymentSagaError::InvalidSignature)?;
    mac_for(secret, body)
        .verify_slice(&claimed)
        .map_err(|_| PaymentSagaError::InvalidSignature)
}

/// A webhook event from the payment processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ProcessorEvent {
    /// The hosted checkout session finished. `payment_status` is `paid`
    /// when funds were captured inline, otherwise a separate charge
    /// callback follows.
    #[serde(rename = "checkout.session.completed")]
    CheckoutSessionCompleted {
        session_id: String,
        payment_status: String,
        transaction_id: Option<String>,
    },

    /// Funds were captured for a charge.
    #[serde(rename = "charge.succeeded")]
    ChargeSucceeded {
        transaction_id: String,
        charge_id: String,
    },

    /// The payment was declined or errored.
    #[serde(rename = "payment.failed")]
    PaymentFailed { session_id: String, reason: String },

    /// A captured charge was refunded at the processor.
    #[serde(rename = "charge.refunded")]
    ChargeRefunded {
        charge_id: String,
        refund_id: String,
        amount_cents: i64,
    },
}
