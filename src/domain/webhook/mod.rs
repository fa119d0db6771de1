//! Webhook domain: Stripe event model and signature verification.

mod errors;
mod stripe_event;
mod verifier;

pub use errors::WebhookError;
pub use stripe_event::{CheckoutSessionEvent, EventKind, StripeEvent, StripeEventData};
pub use verifier::{sign_payload, WebhookVerifier};
