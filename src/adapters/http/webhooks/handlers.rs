//! HTTP handler for Stripe webhook deliveries.
//!
//! Acknowledgment is decoupled from processing success: once the signature
//! verifies and the event parses, the delivery is acknowledged with 200 in
//! every case except a failure *before* the order is persisted — those get
//! a 5xx so the provider redelivers and the idempotent pipeline can retry.
//! Post-persistence problems are visible only through logs.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::{error, info, warn};

use crate::application::handlers::checkout::{
    CheckoutCompletionHandler, CheckoutCompletionOutcome, ExpiredSessionHandler,
};
use crate::domain::webhook::{EventKind, WebhookError, WebhookVerifier};

/// Shared state for the webhook endpoint.
#[derive(Clone)]
pub struct WebhookAppState {
    pub verifier: Arc<WebhookVerifier>,
    pub completion: Arc<CheckoutCompletionHandler>,
    pub expiration: Arc<ExpiredSessionHandler>,
}

/// POST /api/webhooks/stripe - receive a Stripe event.
pub async fn handle_stripe_webhook(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(signature) = headers
        .get("Stripe-Signature")
        .and_then(|value| value.to_str().ok())
    else {
        warn!("webhook delivery without Stripe-Signature header");
        return WebhookError::MissingSignature.status_code().into_response();
    };

    let event = match state.verifier.verify_and_parse(&body, signature) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "webhook verification failed");
            return e.status_code().into_response();
        }
    };

    match event.kind() {
        EventKind::CheckoutSessionCompleted => {
            let session = match event.checkout_session() {
                Ok(session) => session,
                Err(e) => {
                    warn!(event_id = %event.id, error = %e, "malformed checkout session payload");
                    return e.status_code().into_response();
                }
            };

            match state.completion.handle(&session).await {
                Ok(CheckoutCompletionOutcome::Completed {
                    order_id,
                    order_number,
                    caveats,
                }) => {
                    info!(
                        event_id = %event.id,
                        session_id = %session.id,
                        order_id = %order_id,
                        order_number = %order_number,
                        processed = caveats.is_empty(),
                        caveats = ?caveats,
                        "checkout completion acknowledged"
                    );
                    StatusCode::OK.into_response()
                }
                Ok(CheckoutCompletionOutcome::AlreadyProcessed { order_id }) => {
                    info!(
                        event_id = %event.id,
                        session_id = %session.id,
                        order_id = %order_id,
                        processed = true,
                        "duplicate delivery acknowledged"
                    );
                    StatusCode::OK.into_response()
                }
                Err(e) => {
                    // No order was persisted; refusing acknowledgment makes
                    // the provider redeliver.
                    error!(
                        event_id = %event.id,
                        session_id = %session.id,
                        error = %e,
                        "checkout completion failed before persistence"
                    );
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            }
        }

        EventKind::CheckoutSessionExpired => {
            let session = match event.checkout_session() {
                Ok(session) => session,
                Err(e) => {
                    warn!(event_id = %event.id, error = %e, "malformed expired session payload");
                    return e.status_code().into_response();
                }
            };

            state.expiration.handle(&session).await;
            StatusCode::OK.into_response()
        }

        EventKind::Unhandled => {
            info!(event_id = %event.id, event_type = %event.event_type, "unhandled event type");
            StatusCode::OK.into_response()
        }
    }
}
