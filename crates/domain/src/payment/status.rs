//! Payment state machine.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// The state of a payment in its lifecycle.
///
/// State transitions:
/// ```text
/// Pending ──► Processing ──► Completed ──► Refunded
///    │   │        │              ▲
///    │   └────────┼──────────────┘
///    └────────────┴──► Failed
/// ```
///
/// The direct `Pending → Completed` edge exists because the processor's
/// session-completed callback can arrive already marked paid, skipping the
/// charge callback. Failed and Refunded are terminal; only Completed can be
/// refunded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    /// Checkout session created, no processor callback yet.
    #[default]
    Pending,

    /// Session completed, awaiting charge confirmation.
    Processing,

    /// Funds captured (refundable).
    Completed,

    /// Payment declined or errored (terminal state).
    Failed,

    /// Captured funds returned (terminal state).
    Refunded,
}

impl PaymentStatus {
    /// Returns true if the machine allows moving from this status to `next`.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Pending, Completed)
                | (Pending, Failed)
                | (Processing, Completed)
                | (Processing, Failed)
                | (Completed, Refunded)
        )
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Failed | PaymentStatus::Refunded)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Processing => "Processing",
            PaymentStatus::Completed => "Completed",
            PaymentStatus::Failed => "Failed",
            PaymentStatus::Refunded => "Refunded",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(PaymentStatus::Pending),
            "processing" => Ok(PaymentStatus::Processing),
            "completed" => Ok(PaymentStatus::Completed),
            "failed" => Ok(PaymentStatus::Failed),
            "refunded" => Ok(PaymentStatus::Refunded),
            _ => Err(DomainError::UnknownStatus {
                entity: "payment",
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_edges() {
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Processing));
        assert!(PaymentStatus::Processing.can_transition_to(PaymentStatus::Completed));
        assert!(PaymentStatus::Completed.can_transition_to(PaymentStatus::Refunded));
    }

    #[test]
    fn out_of_order_completion_is_allowed_from_pending() {
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Completed));
    }

    #[test]
    fn failure_edges() {
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Failed));
        assert!(PaymentStatus::Processing.can_transition_to(PaymentStatus::Failed));
        assert!(!PaymentStatus::Completed.can_transition_to(PaymentStatus::Failed));
    }

    #[test]
    fn only_completed_can_be_refunded() {
        assert!(!PaymentStatus::Pending.can_transition_to(PaymentStatus::Refunded));
        assert!(!PaymentStatus::Processing.can_transition_to(PaymentStatus::Refunded));
        assert!(!PaymentStatus::Failed.can_transition_to(PaymentStatus::Refunded));
    }

    #[test]
    fn terminal_states_reject_everything() {
        for next in [
            PaymentStatus::Pending,
            PaymentStatus::Processing,
            PaymentStatus::Completed,
            PaymentStatus::Failed,
            PaymentStatus::Refunded,
        ] {
            assert!(!PaymentStatus::Failed.can_transition_to(next));
            assert!(!PaymentStatus::Refunded.can_transition_to(next));
        }
    }

    #[test]
    fn status_string_mapping() {
        assert_eq!("completed".parse::<PaymentStatus>().unwrap(), PaymentStatus::Completed);
        assert!("settled".parse::<PaymentStatus>().is_err());
    }
}
