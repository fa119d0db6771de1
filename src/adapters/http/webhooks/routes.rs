//! Axum router for webhook endpoints.
//!
//! Webhook routes carry no user authentication; deliveries are
//! authenticated by their signature inside the handler.

use axum::routing::post;
use axum::Router;

use super::handlers::{handle_stripe_webhook, WebhookAppState};

/// Create the webhook router.
///
/// # Routes
/// - `POST /stripe` - Handle Stripe webhooks
pub fn webhook_routes() -> Router<WebhookAppState> {
    Router::new().route("/stripe", post(handle_stripe_webhook))
}
