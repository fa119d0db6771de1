//! Checkout pipeline error taxonomy.

use thiserror::Error;

use crate::domain::inventory::InventoryError;
use crate::domain::order::{CounterError, OrderNumberError};

/// Fatal errors of the checkout completion pipeline.
///
/// Every variant here aborts the operation *before* an order is persisted,
/// so the webhook layer must not acknowledge the event and the provider is
/// free to redeliver. Failures after persistence never surface as errors;
/// they are recorded as caveats on the successful outcome.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The session cannot become an order (no line items, nothing usable
    /// after filtering, missing user or email).
    #[error("invalid checkout session {session_id}: {reason}")]
    InvalidSession { session_id: String, reason: String },

    /// Counter allocation or order-number derivation failed.
    #[error(transparent)]
    OrderNumber(#[from] OrderNumberError),

    #[error(transparent)]
    Counter(#[from] CounterError),

    /// The payment provider could not be reached or returned garbage.
    #[error("payment provider error: {0}")]
    Provider(String),

    /// The datastore failed while the order was being checked or written.
    #[error("datastore error: {0}")]
    Store(String),
}

impl CheckoutError {
    pub fn invalid_session(session_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSession {
            session_id: session_id.into(),
            reason: reason.into(),
        }
    }
}

/// A post-persistence step that failed without failing the pipeline.
///
/// The order is already durable when these occur; each is logged with full
/// context and reported on the outcome so the caller can acknowledge the
/// event while operations follow up.
#[derive(Debug, Clone)]
pub enum StepCaveat {
    /// Stock could not be decremented; order and inventory now disagree.
    StockNotDecremented { detail: String },

    /// The cart or the session size record could not be removed.
    CartNotCleared { detail: String },

    /// The customer notification did not go out.
    NotificationFailed { detail: String },
}

impl StepCaveat {
    pub fn stock(err: &InventoryError) -> Self {
        Self::StockNotDecremented {
            detail: err.to_string(),
        }
    }
}
