//! HTTP adapter: axum routers and handlers.

pub mod webhooks;

use axum::routing::get;
use axum::{Json, Router};

pub use webhooks::{handle_stripe_webhook, webhook_routes, WebhookAppState};

/// Build the application router.
///
/// # Routes
/// - `GET /health` - liveness probe
/// - `POST /api/webhooks/stripe` - Stripe webhook deliveries
pub fn app_router(state: WebhookAppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/webhooks", webhook_routes())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
