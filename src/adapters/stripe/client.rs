//! Stripe payment provider adapter.
//!
//! Implements [`PaymentProvider`] against the Stripe REST API. The only
//! operation the pipeline needs is retrieving a checkout session with line
//! items and their products expanded in one request.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::ports::{
    CustomerDetails, ExpandedSession, PaymentProvider, PaymentProviderError, ProviderAddress,
    SessionLineItem, SessionPrice, SessionProduct,
};

use super::types::{StripeCustomerDetails, StripeLineItem, StripeSession};

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret API key (`sk_test_...` or `sk_live_...`).
    api_key: SecretString,

    /// Base URL for the Stripe API.
    api_base_url: String,
}

impl StripeConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: "https://api.stripe.com".to_string(),
        }
    }

    /// Point the client at a different base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Reqwest-backed Stripe client.
pub struct StripeClient {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripeClient {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn retrieve_expanded_session(
        &self,
        session_id: &str,
    ) -> Result<ExpandedSession, PaymentProviderError> {
        let url = format!(
            "{}/v1/checkout/sessions/{}",
            self.config.api_base_url, session_id
        );

        let response = self
            .http_client
            .get(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .query(&[("expand[]", "line_items.data.price.product")])
            .send()
            .await
            .map_err(|e| PaymentProviderError::Request(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(PaymentProviderError::SessionNotFound(
                session_id.to_string(),
            ));
        }

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PaymentProviderError::Request(format!(
                "Stripe API error: {error_text}"
            )));
        }

        let session: StripeSession = response
            .json()
            .await
            .map_err(|e| PaymentProviderError::Decode(e.to_string()))?;

        Ok(into_expanded_session(session))
    }
}

fn into_expanded_session(session: StripeSession) -> ExpandedSession {
    ExpandedSession {
        id: session.id,
        payment_intent: session.payment_intent.map(|pi| pi.into_id()),
        customer_email: session.customer_email,
        amount_total: session.amount_total,
        currency: session.currency,
        customer_details: session.customer_details.map(into_customer_details),
        line_items: session
            .line_items
            .map(|list| list.data.into_iter().map(into_line_item).collect())
            .unwrap_or_default(),
        metadata: session.metadata,
    }
}

fn into_customer_details(details: StripeCustomerDetails) -> CustomerDetails {
    CustomerDetails {
        email: details.email,
        name: details.name,
        phone: details.phone,
        address: details.address.map(|a| ProviderAddress {
            line1: a.line1,
            line2: a.line2,
            city: a.city,
            postal_code: a.postal_code,
            country: a.country,
        }),
    }
}

fn into_line_item(line: StripeLineItem) -> SessionLineItem {
    SessionLineItem {
        id: line.id,
        description: line.description,
        quantity: line.quantity,
        price: line.price.map(|price| SessionPrice {
            unit_amount: price.unit_amount,
            currency: price.currency,
            metadata: price.metadata,
            product: price
                .product
                .and_then(|p| p.into_object())
                .map(|product| SessionProduct {
                    id: product.id,
                    name: product.name,
                    images: product.images,
                    metadata: product.metadata,
                }),
        }),
    }
}
