//! Payment provider port for the checkout session API.
//!
//! The checkout pipeline needs one thing from the payment provider: the full
//! line-item detail of a completed session. The port mirrors the provider's
//! expanded-session shape closely — amounts stay in minor units (cents) and
//! metadata stays as string maps — and the domain converts and types these
//! at its own boundary. Webhook signature verification is not part of this
//! port; it happens before any event reaches the application layer.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// Port for retrieving checkout session detail from the payment provider.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Fetch a checkout session with line items and product detail expanded.
    async fn retrieve_expanded_session(
        &self,
        session_id: &str,
    ) -> Result<ExpandedSession, PaymentProviderError>;
}

/// A checkout session with line items expanded.
#[derive(Debug, Clone, Default)]
pub struct ExpandedSession {
    /// Provider session id (`cs_...`).
    pub id: String,

    /// Payment intent id, if a payment was created.
    pub payment_intent: Option<String>,

    /// Email captured on the session itself.
    pub customer_email: Option<String>,

    /// Total amount the provider collected, in minor units.
    pub amount_total: Option<i64>,

    /// ISO 4217 currency code, lowercase on the wire.
    pub currency: Option<String>,

    /// Customer details captured during checkout.
    pub customer_details: Option<CustomerDetails>,

    /// Expanded line items.
    pub line_items: Vec<SessionLineItem>,

    /// Session metadata set at checkout creation (e.g. `userId`).
    pub metadata: HashMap<String, String>,
}

/// One line item of a session.
#[derive(Debug, Clone, Default)]
pub struct SessionLineItem {
    pub id: String,
    pub description: Option<String>,
    pub quantity: Option<u32>,
    pub price: Option<SessionPrice>,
}

/// Price attached to a line item, with its product expanded.
#[derive(Debug, Clone, Default)]
pub struct SessionPrice {
    /// Unit amount in minor units.
    pub unit_amount: Option<i64>,
    pub currency: String,
    /// Price metadata (carries the `taxRate` multiplier string).
    pub metadata: HashMap<String, String>,
    pub product: Option<SessionProduct>,
}

/// Product expanded onto a price.
#[derive(Debug, Clone, Default)]
pub struct SessionProduct {
    /// Provider-side product id (`prod_...`), distinct from the catalog id
    /// carried in metadata.
    pub id: String,
    pub name: String,
    pub images: Vec<String>,
    /// Product metadata (carries `productId`, `brand`, `discountRate`).
    pub metadata: HashMap<String, String>,
}

/// Customer details captured by the provider during checkout.
#[derive(Debug, Clone, Default)]
pub struct CustomerDetails {
    pub email: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<ProviderAddress>,
}

/// Address as reported by the provider; every part is optional.
#[derive(Debug, Clone, Default)]
pub struct ProviderAddress {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

/// Errors from the payment provider API.
#[derive(Debug, Error)]
pub enum PaymentProviderError {
    #[error("checkout session {0} not found")]
    SessionNotFound(String),

    #[error("provider request failed: {0}")]
    Request(String),

    #[error("provider response could not be decoded: {0}")]
    Decode(String),
}
