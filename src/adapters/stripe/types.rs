//! Stripe wire types for the checkout session API.
//!
//! Only the fields the pipeline consumes are modeled. Expandable references
//! deserialize as either a bare id string or the expanded object, matching
//! how the Stripe API renders them depending on the `expand` parameters.

use serde::Deserialize;
use std::collections::HashMap;

/// A Stripe reference that may or may not have been expanded.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Expandable<T> {
    Id(String),
    Object(T),
}

impl<T> Expandable<T> {
    /// The expanded object, when present.
    pub fn into_object(self) -> Option<T> {
        match self {
            Expandable::Object(object) => Some(object),
            Expandable::Id(_) => None,
        }
    }
}

impl Expandable<PaymentIntentRef> {
    /// The payment intent id, expanded or not.
    pub fn into_id(self) -> String {
        match self {
            Expandable::Id(id) => id,
            Expandable::Object(intent) => intent.id,
        }
    }
}

/// Payment intent, reduced to its id.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntentRef {
    pub id: String,
}

/// `GET /v1/checkout/sessions/{id}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeSession {
    pub id: String,
    #[serde(default)]
    pub payment_intent: Option<Expandable<PaymentIntentRef>>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub customer_details: Option<StripeCustomerDetails>,
    #[serde(default)]
    pub line_items: Option<StripeList<StripeLineItem>>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Stripe list envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeList<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeLineItem {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub price: Option<StripePrice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripePrice {
    #[serde(default)]
    pub unit_amount: Option<i64>,
    pub currency: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub product: Option<Expandable<StripeProduct>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeProduct {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeCustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<StripeAddress>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeAddress {
    #[serde(default)]
    pub line1: Option<String>,
    #[serde(default)]
    pub line2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expandable_deserializes_bare_id() {
        let value: Expandable<StripeProduct> = serde_json::from_str("\"prod_123\"").unwrap();
        assert!(value.into_object().is_none());
    }

    #[test]
    fn expandable_deserializes_object() {
        let value: Expandable<StripeProduct> =
            serde_json::from_value(serde_json::json!({"id": "prod_123", "name": "Shirt"}))
                .unwrap();
        let product = value.into_object().unwrap();
        assert_eq!(product.id, "prod_123");
    }

    #[test]
    fn payment_intent_id_survives_both_renderings() {
        let bare: Expandable<PaymentIntentRef> = serde_json::from_str("\"pi_1\"").unwrap();
        assert_eq!(bare.into_id(), "pi_1");

        let expanded: Expandable<PaymentIntentRef> =
            serde_json::from_value(serde_json::json!({"id": "pi_1", "amount": 100})).unwrap();
        assert_eq!(expanded.into_id(), "pi_1");
    }

    #[test]
    fn session_deserializes_with_sparse_fields() {
        let session: StripeSession =
            serde_json::from_value(serde_json::json!({"id": "cs_1"})).unwrap();
        assert_eq!(session.id, "cs_1");
        assert!(session.line_items.is_none());
        assert!(session.metadata.is_empty());
    }
}
