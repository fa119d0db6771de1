//! Checkout event handlers.

mod complete_checkout;
mod expire_checkout;

pub use complete_checkout::{CheckoutCompletionHandler, CheckoutCompletionOutcome};
pub use expire_checkout::ExpiredSessionHandler;
