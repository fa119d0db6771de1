//! Stripe webhook event model.
//!
//! Only the fields this service reads are captured; the rest of Stripe's
//! event schema is ignored. The event's `data.object` stays untyped until
//! the event type is known, then deserializes into the matching payload.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::errors::WebhookError;

/// Stripe webhook event envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEvent {
    /// Event id (`evt_...`).
    pub id: String,

    /// Event type string (e.g. "checkout.session.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Unix timestamp of event creation.
    pub created: i64,

    /// Event-specific data.
    pub data: StripeEventData,

    /// Live mode vs test mode.
    #[serde(default)]
    pub livemode: bool,
}

/// Container for the event's object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

impl StripeEvent {
    /// Classify the event type.
    pub fn kind(&self) -> EventKind {
        EventKind::from_type(&self.event_type)
    }

    /// Deserialize the event object as a checkout session payload.
    pub fn checkout_session(&self) -> Result<CheckoutSessionEvent, WebhookError> {
        serde_json::from_value(self.data.object.clone())
            .map_err(|e| WebhookError::ParseError(format!("checkout session payload: {e}")))
    }
}

/// Event types this service acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Customer completed payment; an order must be created.
    CheckoutSessionCompleted,
    /// Session expired without payment; the purchase was abandoned.
    CheckoutSessionExpired,
    /// Anything else: acknowledged and ignored.
    Unhandled,
}

impl EventKind {
    pub fn from_type(event_type: &str) -> Self {
        match event_type {
            "checkout.session.completed" => Self::CheckoutSessionCompleted,
            "checkout.session.expired" => Self::CheckoutSessionExpired,
            _ => Self::Unhandled,
        }
    }
}

/// The checkout session object carried on `checkout.session.*` events.
///
/// This is the *event* rendering of the session — line items are not
/// included here and must be fetched through the provider port.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckoutSessionEvent {
    /// Session id (`cs_...`).
    pub id: String,

    /// Payment intent id, present once payment was attempted.
    #[serde(default)]
    pub payment_intent: Option<String>,

    /// Email captured on the session.
    #[serde(default)]
    pub customer_email: Option<String>,

    /// Collected amount in minor units.
    #[serde(default)]
    pub amount_total: Option<i64>,

    /// Currency code, lowercase.
    #[serde(default)]
    pub currency: Option<String>,

    /// Metadata set by the storefront at session creation.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutSessionEvent {
    /// The storefront user who started this checkout, when recorded.
    pub fn user_id(&self) -> Option<&str> {
        self.metadata.get("userId").map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event_json(event_type: &str, object: serde_json::Value) -> String {
        json!({
            "id": "evt_1",
            "type": event_type,
            "created": 1704067200,
            "data": { "object": object },
            "livemode": false,
        })
        .to_string()
    }

    #[test]
    fn deserializes_envelope() {
        let event: StripeEvent =
            serde_json::from_str(&event_json("checkout.session.completed", json!({}))).unwrap();

        assert_eq!(event.id, "evt_1");
        assert_eq!(event.kind(), EventKind::CheckoutSessionCompleted);
        assert!(!event.livemode);
    }

    #[test]
    fn classifies_expired_sessions() {
        assert_eq!(
            EventKind::from_type("checkout.session.expired"),
            EventKind::CheckoutSessionExpired
        );
    }

    #[test]
    fn unknown_types_are_unhandled() {
        assert_eq!(
            EventKind::from_type("invoice.payment_succeeded"),
            EventKind::Unhandled
        );
    }

    #[test]
    fn extracts_checkout_session_payload() {
        let object = json!({
            "id": "cs_test_1",
            "payment_intent": "pi_1",
            "customer_email": "jane@example.com",
            "amount_total": 14580,
            "currency": "eur",
            "metadata": { "userId": "user-7" },
        });
        let event: StripeEvent =
            serde_json::from_str(&event_json("checkout.session.completed", object)).unwrap();

        let session = event.checkout_session().unwrap();
        assert_eq!(session.id, "cs_test_1");
        assert_eq!(session.user_id(), Some("user-7"));
        assert_eq!(session.amount_total, Some(14580));
    }

    #[test]
    fn payload_tolerates_sparse_sessions() {
        let event: StripeEvent = serde_json::from_str(&event_json(
            "checkout.session.expired",
            json!({ "id": "cs_sparse" }),
        ))
        .unwrap();

        let session = event.checkout_session().unwrap();
        assert_eq!(session.id, "cs_sparse");
        assert!(session.customer_email.is_none());
        assert!(session.user_id().is_none());
    }

    #[test]
    fn payload_without_id_fails_to_parse() {
        let event: StripeEvent = serde_json::from_str(&event_json(
            "checkout.session.completed",
            json!({ "customer_email": "x@example.com" }),
        ))
        .unwrap();

        assert!(matches!(
            event.checkout_session(),
            Err(WebhookError::ParseError(_))
        ));
    }
}
