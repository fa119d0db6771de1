//! End-to-end tests for the checkout webhook pipeline.
//!
//! These drive the real webhook handler with signed deliveries over the
//! in-memory adapters and verify the durable outcomes: exactly one order
//! per session, exact monetary figures, all-or-nothing stock movement, and
//! acknowledgment semantics that match the provider's retry model.

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use boutique_api::adapters::http::{handle_stripe_webhook, WebhookAppState};
use boutique_api::adapters::memory::{
    InMemoryCartStore, InMemoryDocumentStore, InMemoryOrderRepository,
};
use boutique_api::application::handlers::checkout::{
    CheckoutCompletionHandler, ExpiredSessionHandler,
};
use boutique_api::application::NotificationService;
use boutique_api::domain::inventory::StockAdjuster;
use boutique_api::domain::order::{OrderCounter, OrderStatus};
use boutique_api::domain::webhook::{sign_payload, WebhookVerifier};
use boutique_api::ports::{
    CustomerDetails, DocumentKey, DocumentStore, EmailDispatchResult, EmailMessage, EmailNotifier,
    ExpandedSession, OrderRepository, PaymentProvider, PaymentProviderError, ProviderAddress,
    SessionLineItem, SessionPrice, SessionProduct,
};

const SECRET: &str = "whsec_pipeline_test";

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Provider serving one canned expanded session.
struct CannedProvider {
    session: ExpandedSession,
}

#[async_trait]
impl PaymentProvider for CannedProvider {
    async fn retrieve_expanded_session(
        &self,
        session_id: &str,
    ) -> Result<ExpandedSession, PaymentProviderError> {
        if session_id == self.session.id {
            Ok(self.session.clone())
        } else {
            Err(PaymentProviderError::SessionNotFound(session_id.to_string()))
        }
    }
}

/// Notifier that records every message.
struct RecordingNotifier {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingNotifier {
    fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
        }
    }

    fn subjects(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.subject.clone())
            .collect()
    }
}

#[async_trait]
impl EmailNotifier for RecordingNotifier {
    async fn send(&self, message: EmailMessage) -> EmailDispatchResult {
        self.sent.lock().unwrap().push(message);
        EmailDispatchResult::sent(Some("msg_test".to_string()))
    }
}

struct Pipeline {
    state: WebhookAppState,
    orders: Arc<InMemoryOrderRepository>,
    carts: Arc<InMemoryCartStore>,
    documents: Arc<InMemoryDocumentStore>,
    notifier: Arc<RecordingNotifier>,
}

async fn pipeline(session: ExpandedSession) -> Pipeline {
    let documents = Arc::new(InMemoryDocumentStore::new());
    let orders = Arc::new(InMemoryOrderRepository::new());
    let carts = Arc::new(InMemoryCartStore::new());
    let notifier = Arc::new(RecordingNotifier::new());

    let notifications = Arc::new(NotificationService::new(notifier.clone()));
    let completion = Arc::new(CheckoutCompletionHandler::new(
        Arc::new(CannedProvider { session }),
        orders.clone(),
        carts.clone(),
        OrderCounter::new(documents.clone()),
        StockAdjuster::new(documents.clone()),
        notifications.clone(),
    ));
    let expiration = Arc::new(ExpiredSessionHandler::new(notifications));

    Pipeline {
        state: WebhookAppState {
            verifier: Arc::new(WebhookVerifier::new(SECRET)),
            completion,
            expiration,
        },
        orders,
        carts,
        documents,
        notifier,
    }
}

impl Pipeline {
    async fn seed_product(&self, product_id: &str, stock: u32) {
        self.documents
            .set(
                &DocumentKey::new("products", product_id),
                serde_json::json!({ "stock": stock }),
            )
            .await
            .unwrap();
    }

    async fn stock(&self, product_id: &str) -> u64 {
        self.documents
            .get(&DocumentKey::new("products", product_id))
            .await
            .unwrap()
            .and_then(|doc| doc["stock"].as_u64())
            .unwrap_or(0)
    }

    async fn deliver(&self, body: &[u8]) -> StatusCode {
        let mut headers = HeaderMap::new();
        let signature = sign_payload(SECRET, chrono::Utc::now().timestamp(), body);
        headers.insert("Stripe-Signature", signature.parse().unwrap());

        handle_stripe_webhook(
            State(self.state.clone()),
            headers,
            Bytes::from(body.to_vec()),
        )
        .await
        .status()
    }
}

fn metadata(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// The reference order: 50.00 x 3 at 10% discount and 8% tax.
/// Expected figures: subtotal 135.00, tax 10.80, total 145.80.
fn reference_session() -> ExpandedSession {
    ExpandedSession {
        id: "cs_ref".to_string(),
        payment_intent: Some("pi_ref".to_string()),
        customer_email: None,
        amount_total: Some(14580),
        currency: Some("eur".to_string()),
        customer_details: Some(CustomerDetails {
            email: Some("jane@example.com".to_string()),
            name: Some("Jane Doe".to_string()),
            phone: None,
            address: Some(ProviderAddress {
                line1: Some("12 Rue de Rivoli".to_string()),
                line2: None,
                city: Some("Paris".to_string()),
                postal_code: Some("75001".to_string()),
                country: Some("FR".to_string()),
            }),
        }),
        line_items: vec![SessionLineItem {
            id: "li_ref".to_string(),
            description: None,
            quantity: Some(3),
            price: Some(SessionPrice {
                unit_amount: Some(5000),
                currency: "eur".to_string(),
                metadata: metadata(&[("taxRate", "1.08")]),
                product: Some(SessionProduct {
                    id: "prod_ref".to_string(),
                    name: "Linen Shirt".to_string(),
                    images: vec!["https://img.example/shirt.jpg".to_string()],
                    metadata: metadata(&[
                        ("productId", "shirt-42"),
                        ("brand", "Maison"),
                        ("discountRate", "10"),
                    ]),
                }),
            }),
        }],
        metadata: HashMap::new(),
    }
}

fn completed_event_body(session_id: &str) -> Vec<u8> {
    serde_json::json!({
        "id": format!("evt_{session_id}"),
        "type": "checkout.session.completed",
        "created": 1704067200,
        "data": {
            "object": {
                "id": session_id,
                "payment_intent": "pi_ref",
                "metadata": { "userId": "user-7" }
            }
        },
        "livemode": false,
    })
    .to_string()
    .into_bytes()
}

// =============================================================================
// Pipeline Outcomes
// =============================================================================

#[tokio::test]
async fn completed_checkout_produces_order_with_exact_figures() {
    let p = pipeline(reference_session()).await;
    p.seed_product("shirt-42", 10).await;
    p.carts.put_cart("user-7", serde_json::json!({})).await;
    p.carts
        .put_session_sizes("cs_ref", metadata(&[("shirt-42", "M")]))
        .await;

    let status = p.deliver(&completed_event_body("cs_ref")).await;
    assert_eq!(status, StatusCode::OK);

    let order = p.orders.get_by_session_id("cs_ref").await.unwrap().unwrap();

    assert_eq!(order.user_id, "user-7");
    assert_eq!(order.status, OrderStatus::Processing);
    assert_eq!(order.stripe_payment_intent_id, "pi_ref");
    assert!(order.order_number.starts_with("ORD-000001-"));

    // Monetary figures come out to the cent.
    assert_eq!(order.totals.subtotal, 135.0);
    assert_eq!(order.totals.tax, 10.80);
    assert_eq!(order.totals.total, 145.80);
    assert_eq!(order.totals.currency, "EUR");

    let item = &order.items[0];
    assert_eq!(item.product_id, "shirt-42");
    assert_eq!(item.brand, "Maison");
    assert_eq!(item.tax_rate, "1.08");
    assert_eq!(item.size.as_deref(), Some("M"));
    assert_eq!(item.discount.map(|d| d.rate), Some(10.0));

    // Side effects: stock moved, cart gone, confirmation out.
    assert_eq!(p.stock("shirt-42").await, 7);
    assert!(!p.carts.has_cart("user-7").await);
    assert!(!p.carts.has_session_sizes("cs_ref").await);
    assert_eq!(p.notifier.subjects().len(), 1);
    assert!(p.notifier.subjects()[0].contains(&order.order_number));
}

#[tokio::test]
async fn redelivered_webhook_creates_exactly_one_order() {
    let p = pipeline(reference_session()).await;
    p.seed_product("shirt-42", 10).await;
    let body = completed_event_body("cs_ref");

    assert_eq!(p.deliver(&body).await, StatusCode::OK);
    assert_eq!(p.deliver(&body).await, StatusCode::OK);
    assert_eq!(p.deliver(&body).await, StatusCode::OK);

    assert_eq!(p.orders.len().await, 1);
    // Stock decremented once, one confirmation only.
    assert_eq!(p.stock("shirt-42").await, 7);
    assert_eq!(p.notifier.subjects().len(), 1);
}

#[tokio::test]
async fn insufficient_stock_keeps_the_order_and_acknowledges() {
    let p = pipeline(reference_session()).await;
    p.seed_product("shirt-42", 2).await; // needs 3

    let status = p.deliver(&completed_event_body("cs_ref")).await;

    // Acknowledged: the order is durable, the gap is operational.
    assert_eq!(status, StatusCode::OK);
    assert_eq!(p.orders.len().await, 1);
    assert_eq!(p.stock("shirt-42").await, 2);

    let subjects = p.notifier.subjects();
    assert_eq!(subjects.len(), 1);
    assert!(subjects[0].contains("Processing Issue"));
}

#[tokio::test]
async fn provider_amount_overrides_computed_total() {
    let mut session = reference_session();
    session.amount_total = Some(15000); // collected 150.00, computed 145.80
    let p = pipeline(session).await;
    p.seed_product("shirt-42", 10).await;

    assert_eq!(
        p.deliver(&completed_event_body("cs_ref")).await,
        StatusCode::OK
    );

    let order = p.orders.get_by_session_id("cs_ref").await.unwrap().unwrap();
    assert_eq!(order.totals.total, 150.0);
    assert_eq!(order.totals.subtotal, 135.0);
    assert_eq!(order.totals.tax, 10.80);
}

#[tokio::test]
async fn partial_address_is_not_persisted() {
    let mut session = reference_session();
    if let Some(details) = session.customer_details.as_mut() {
        if let Some(address) = details.address.as_mut() {
            address.postal_code = None;
        }
    }
    let p = pipeline(session).await;
    p.seed_product("shirt-42", 10).await;

    assert_eq!(
        p.deliver(&completed_event_body("cs_ref")).await,
        StatusCode::OK
    );

    let order = p.orders.get_by_session_id("cs_ref").await.unwrap().unwrap();
    assert!(order.customer_info.address.is_none());

    // And the serialized record omits the key entirely.
    let json = serde_json::to_value(&order.customer_info).unwrap();
    assert!(json.get("address").is_none());
}

#[tokio::test]
async fn unknown_session_is_retried_not_acknowledged() {
    let p = pipeline(reference_session()).await;

    let status = p.deliver(&completed_event_body("cs_other")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(p.orders.is_empty().await);
}

// =============================================================================
// Expired Sessions
// =============================================================================

#[tokio::test]
async fn expired_session_notifies_without_writing_anything() {
    let p = pipeline(reference_session()).await;
    let body = serde_json::json!({
        "id": "evt_expired",
        "type": "checkout.session.expired",
        "created": 1704067200,
        "data": {
            "object": {
                "id": "cs_gone",
                "customer_email": "jane@example.com",
                "amount_total": 14580,
                "currency": "eur",
                "metadata": { "userId": "user-7" }
            }
        },
        "livemode": false,
    })
    .to_string()
    .into_bytes();

    let status = p.deliver(&body).await;

    assert_eq!(status, StatusCode::OK);
    assert!(p.orders.is_empty().await);
    let subjects = p.notifier.subjects();
    assert_eq!(subjects.len(), 1);
    assert!(subjects[0].contains("Cart is Waiting"));
}

#[tokio::test]
async fn expired_session_without_email_stays_silent() {
    let p = pipeline(reference_session()).await;
    let body = serde_json::json!({
        "id": "evt_expired_quiet",
        "type": "checkout.session.expired",
        "created": 1704067200,
        "data": { "object": { "id": "cs_gone" } },
        "livemode": false,
    })
    .to_string()
    .into_bytes();

    assert_eq!(p.deliver(&body).await, StatusCode::OK);
    assert!(p.notifier.subjects().is_empty());
}
