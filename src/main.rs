//! Boutique API server entry point.

use std::sync::Arc;
use std::time::Duration;

use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use boutique_api::adapters::email::ResendClient;
use boutique_api::adapters::http::{app_router, WebhookAppState};
use boutique_api::adapters::memory::{
    InMemoryCartStore, InMemoryDocumentStore, InMemoryOrderRepository,
};
use boutique_api::adapters::stripe::{StripeClient, StripeConfig};
use boutique_api::application::handlers::checkout::{
    CheckoutCompletionHandler, ExpiredSessionHandler,
};
use boutique_api::application::NotificationService;
use boutique_api::config::AppConfig;
use boutique_api::domain::inventory::StockAdjuster;
use boutique_api::domain::order::OrderCounter;
use boutique_api::domain::webhook::WebhookVerifier;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone())),
        )
        .init();

    info!(
        environment = ?config.server.environment,
        stripe_test_mode = config.payment.is_test_mode(),
        email_enabled = config.email.resend_api_key.is_some(),
        "starting boutique-api"
    );

    // External collaborators.
    let provider = Arc::new(StripeClient::new(StripeConfig::new(
        config.payment.stripe_api_key.clone(),
    )));
    let notifier = Arc::new(ResendClient::from_config(&config.email));

    // Process-local stores; the deployment's document database adapter
    // replaces these behind the same ports.
    let documents = Arc::new(InMemoryDocumentStore::new());
    let orders = Arc::new(InMemoryOrderRepository::new());
    let carts = Arc::new(InMemoryCartStore::new());

    let notifications = Arc::new(NotificationService::new(notifier));
    let completion = Arc::new(CheckoutCompletionHandler::new(
        provider,
        orders,
        carts,
        OrderCounter::new(documents.clone()),
        StockAdjuster::new(documents),
        notifications.clone(),
    ));
    let expiration = Arc::new(ExpiredSessionHandler::new(notifications));

    let state = WebhookAppState {
        verifier: Arc::new(WebhookVerifier::new(
            config.payment.stripe_webhook_secret.clone(),
        )),
        completion,
        expiration,
    };

    let app = app_router(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            ))),
    );

    let addr = config.server.socket_addr()?;
    info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
