//! Order aggregate and its value objects.
//!
//! Orders are persisted as JSON documents with camelCase keys, so every type
//! here derives serde with `rename_all = "camelCase"`. Optional fields that
//! may be absent use `skip_serializing_if`: the document store rejects
//! explicit absence markers, so a missing value must be missing from the
//! serialized record entirely, never `null`. The one exception is `discount`,
//! which is stored as an explicit `null` when no discount applies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Monetary amount with its ISO 4217 currency code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Money {
    pub amount: f64,
    pub currency: String,
}

/// Percentage discount in the range 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    pub rate: f64,
}

/// A single purchased product within an order.
///
/// `tax_rate` is a *multiplier string*: `"1.20"` means 20% tax, not a
/// percentage. The raw string from the provider's price metadata is stored
/// verbatim; parsing happens in the pricing engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub title: String,
    pub brand: String,
    pub price: Money,
    pub discount: Option<Discount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    pub quantity: u32,
    pub image: String,
    pub tax_rate: String,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

/// Order-level monetary totals.
///
/// Normally the rounded sum of the item-level figures; `total` may instead
/// carry the provider-reported collected amount when reconciliation found a
/// discrepancy beyond tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub currency: String,
}

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    /// Payment confirmed, order being prepared. Every order the checkout
    /// pipeline creates starts here.
    Processing,
    Completed,
    Failed,
    Refunded,
    Cancelled,
}

/// Shipping address cached from the checkout session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

impl Address {
    /// Assemble an address from individually optional parts.
    ///
    /// Returns `None` unless line1, city, postal code and country are all
    /// present and non-empty: a partial address is dropped entirely rather
    /// than stored incomplete.
    pub fn from_parts(
        line1: Option<String>,
        line2: Option<String>,
        city: Option<String>,
        postal_code: Option<String>,
        country: Option<String>,
    ) -> Option<Self> {
        let line1 = non_empty(line1)?;
        let city = non_empty(city)?;
        let postal_code = non_empty(postal_code)?;
        let country = non_empty(country)?;

        Some(Self {
            line1,
            line2: line2.filter(|s| !s.is_empty()),
            city,
            postal_code,
            country,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Customer contact details cached from the checkout session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

/// Aggregate root for a customer order.
///
/// Exactly one order may exist per `stripe_session_id`; the checkout
/// pipeline enforces this through the order store's session lookup and
/// create-time uniqueness outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub order_number: String,
    pub stripe_session_id: String,
    pub stripe_payment_intent_id: String,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub totals: OrderTotals,
    pub customer_info: CustomerInfo,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_completed_at: Option<DateTime<Utc>>,
}
