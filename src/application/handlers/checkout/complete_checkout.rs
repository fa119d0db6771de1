//! Checkout completion pipeline.
//!
//! Turns a paid checkout session into a durable order, adjusted stock, a
//! cleared cart, and a confirmation email, in that order. The pipeline is
//! idempotent per session: redelivered events find the existing order and
//! do nothing.
//!
//! ## Failure policy
//!
//! Everything up to and including order persistence is fatal: the error
//! propagates and the webhook layer must not acknowledge the event, so the
//! provider redelivers and the pipeline retries from scratch. Once the
//! order document exists it is never rolled back; each remaining step
//! failure is logged with session and order context and collected as a
//! caveat on the successful outcome.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::application::notifications::NotificationService;
use crate::domain::checkout::{
    resolve_line_item, CheckoutError, ItemResolution, StepCaveat,
};
use crate::domain::inventory::{StockAdjuster, StockDecrement};
use crate::domain::order::{
    generate_order_id, generate_order_number, Address, CustomerInfo, Order, OrderCounter,
    OrderItem, OrderStatus,
};
use crate::domain::pricing;
use crate::domain::webhook::CheckoutSessionEvent;
use crate::ports::{CartStore, CreateOutcome, ExpandedSession, OrderRepository, PaymentProvider};

/// Divergence between computed and collected totals tolerated before the
/// provider's figure overrides ours.
const RECONCILIATION_TOLERANCE: f64 = 0.01;

/// Result of running the pipeline for one delivery.
#[derive(Debug, Clone)]
pub enum CheckoutCompletionOutcome {
    /// An order was created. `caveats` lists post-persistence steps that
    /// failed and need operational follow-up.
    Completed {
        order_id: String,
        order_number: String,
        caveats: Vec<StepCaveat>,
    },

    /// An order for this session already existed; nothing was done.
    AlreadyProcessed { order_id: String },
}

/// Orchestrates checkout completion.
pub struct CheckoutCompletionHandler {
    provider: Arc<dyn PaymentProvider>,
    orders: Arc<dyn OrderRepository>,
    carts: Arc<dyn CartStore>,
    counter: OrderCounter,
    stock: StockAdjuster,
    notifications: Arc<NotificationService>,
}

impl CheckoutCompletionHandler {
    pub fn new(
        provider: Arc<dyn PaymentProvider>,
        orders: Arc<dyn OrderRepository>,
        carts: Arc<dyn CartStore>,
        counter: OrderCounter,
        stock: StockAdjuster,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            provider,
            orders,
            carts,
            counter,
            stock,
            notifications,
        }
    }

    /// Run the pipeline for a `checkout.session.completed` event.
    pub async fn handle(
        &self,
        event: &CheckoutSessionEvent,
    ) -> Result<CheckoutCompletionOutcome, CheckoutError> {
        let session_id = event.id.as_str();

        // 1. Idempotency: a redelivered event finds the order and stops.
        if let Some(existing) = self
            .orders
            .get_by_session_id(session_id)
            .await
            .map_err(|e| CheckoutError::Store(e.to_string()))?
        {
            info!(
                session_id,
                order_id = %existing.id,
                "order already exists for this session"
            );
            return Ok(CheckoutCompletionOutcome::AlreadyProcessed {
                order_id: existing.id,
            });
        }

        // 2. Expand the session to get line items and product detail.
        let session = self
            .provider
            .retrieve_expanded_session(session_id)
            .await
            .map_err(|e| CheckoutError::Provider(e.to_string()))?;

        if session.line_items.is_empty() {
            return Err(CheckoutError::invalid_session(
                session_id,
                "no line items found in checkout session",
            ));
        }

        let user_id = event
            .user_id()
            .or_else(|| session.metadata.get("userId").map(String::as_str))
            .ok_or_else(|| {
                CheckoutError::invalid_session(session_id, "missing userId metadata")
            })?
            .to_string();

        // 3. Build order items; unusable line items are skipped with a
        //    warning, but an order needs at least one survivor.
        let items = self.build_items(session_id, &session).await;
        if items.is_empty() {
            return Err(CheckoutError::invalid_session(
                session_id,
                "no valid order items could be created from line items",
            ));
        }

        // 4. Totals, single-currency-per-order: currency of the first item.
        let currency = items[0].price.currency.clone();
        let mut totals = pricing::order_totals(&items, currency);

        // 5. Reconcile against what the provider actually collected.
        if let Some(amount_total) = session.amount_total {
            let paid = amount_total as f64 / 100.0;
            let difference = paid - totals.total;
            if difference.abs() > RECONCILIATION_TOLERANCE {
                warn!(
                    session_id,
                    paid_amount = paid,
                    calculated_total = totals.total,
                    difference,
                    "payment amount mismatch, trusting collected amount"
                );
                totals.total = paid;
            }
        }

        // 6. Customer info; a partial address is dropped entirely.
        let customer_info = build_customer_info(event, &session)
            .ok_or_else(|| CheckoutError::invalid_session(session_id, "customer email missing"))?;

        // 7. Allocate identity.
        let counter = self.counter.next().await?;
        let order_number = generate_order_number(counter)?;
        let order_id = generate_order_id();

        let payment_intent = event
            .payment_intent
            .clone()
            .or_else(|| session.payment_intent.clone())
            .unwrap_or_default();

        let now = Utc::now();
        let order = Order {
            id: order_id,
            user_id,
            order_number,
            stripe_session_id: session_id.to_string(),
            stripe_payment_intent_id: payment_intent,
            status: OrderStatus::Processing,
            items,
            totals,
            customer_info,
            created_at: now,
            updated_at: now,
            payment_completed_at: Some(now),
        };

        // 8. Persist. A duplicate-session outcome means a concurrent
        //    delivery won the race; this one becomes a no-op.
        match self
            .orders
            .create(&order)
            .await
            .map_err(|e| CheckoutError::Store(e.to_string()))?
        {
            CreateOutcome::Created => {}
            CreateOutcome::DuplicateSession { existing_order_id } => {
                info!(
                    session_id,
                    order_id = %existing_order_id,
                    "concurrent delivery already created the order"
                );
                return Ok(CheckoutCompletionOutcome::AlreadyProcessed {
                    order_id: existing_order_id,
                });
            }
        }

        info!(
            session_id,
            order_id = %order.id,
            order_number = %order.order_number,
            user_id = %order.user_id,
            total = order.totals.total,
            currency = %order.totals.currency,
            item_count = order.items.len(),
            "order created"
        );

        // The order is durable from here on; remaining steps are isolated.
        let caveats = self.finish_best_effort(&order).await;

        Ok(CheckoutCompletionOutcome::Completed {
            order_id: order.id,
            order_number: order.order_number,
            caveats,
        })
    }

    /// Step 3: resolve line items against the session size record.
    async fn build_items(&self, session_id: &str, session: &ExpandedSession) -> Vec<OrderItem> {
        let sizes = match self.carts.session_sizes(session_id).await {
            Ok(sizes) => sizes,
            Err(e) => {
                warn!(session_id, error = %e, "size record unavailable, defaulting sizes");
                None
            }
        };

        let mut items = Vec::with_capacity(session.line_items.len());
        for line in &session.line_items {
            match resolve_line_item(line, sizes.as_ref()) {
                ItemResolution::Resolved(item) => items.push(item),
                ItemResolution::MissingPriceOrProduct { line_item_id } => {
                    warn!(
                        session_id,
                        line_item_id = %line_item_id,
                        "skipping line item without product or price"
                    );
                }
                ItemResolution::MissingProductId {
                    provider_product_id,
                } => {
                    warn!(
                        session_id,
                        stripe_product_id = %provider_product_id,
                        "product missing productId in metadata"
                    );
                }
            }
        }
        items
    }

    /// Steps 9-11: stock, cart, notification. Never fails; every problem
    /// becomes a caveat on the outcome.
    async fn finish_best_effort(&self, order: &Order) -> Vec<StepCaveat> {
        let mut caveats = Vec::new();
        let session_id = order.stripe_session_id.as_str();

        let decrements: Vec<StockDecrement> = order
            .items
            .iter()
            .map(|item| StockDecrement {
                product_id: item.product_id.clone(),
                quantity: item.quantity,
            })
            .collect();

        let stock_failed = match self.stock.decrement(&decrements).await {
            Ok(()) => false,
            Err(e) => {
                error!(
                    session_id,
                    order_id = %order.id,
                    error = %e,
                    "stock decrement failed after order creation"
                );
                caveats.push(StepCaveat::stock(&e));
                true
            }
        };

        if let Err(e) = self.carts.delete_cart(&order.user_id).await {
            warn!(
                session_id,
                order_id = %order.id,
                user_id = %order.user_id,
                error = %e,
                "failed to clear cart"
            );
            caveats.push(StepCaveat::CartNotCleared {
                detail: e.to_string(),
            });
        }
        if let Err(e) = self.carts.delete_session_sizes(session_id).await {
            warn!(
                session_id,
                order_id = %order.id,
                error = %e,
                "failed to remove session size record"
            );
            caveats.push(StepCaveat::CartNotCleared {
                detail: e.to_string(),
            });
        }

        if stock_failed {
            // A paid order we could not fully process: tell the customer we
            // are on it instead of confirming. This notice is best-effort.
            self.notifications
                .send_processing_failure(order, "inventory update pending")
                .await;
        } else {
            let result = self.notifications.send_order_confirmation(order).await;
            if !result.success {
                caveats.push(StepCaveat::NotificationFailed {
                    detail: result.error.unwrap_or_else(|| "unknown".to_string()),
                });
            }
        }

        caveats
    }
}

/// Assemble customer info from the event and the expanded session.
///
/// Email is required; every other field is included only when present and
/// non-empty, and the address only when all its required parts survive.
fn build_customer_info(
    event: &CheckoutSessionEvent,
    session: &ExpandedSession,
) -> Option<CustomerInfo> {
    let details = session.customer_details.as_ref();

    let email = event
        .customer_email
        .clone()
        .filter(|e| !e.is_empty())
        .or_else(|| {
            session
                .customer_email
                .clone()
                .filter(|e| !e.is_empty())
        })
        .or_else(|| details.and_then(|d| d.email.clone()).filter(|e| !e.is_empty()))?;

    let address = details.and_then(|d| d.address.as_ref()).and_then(|a| {
        Address::from_parts(
            a.line1.clone(),
            a.line2.clone(),
            a.city.clone(),
            a.postal_code.clone(),
            a.country.clone(),
        )
    });

    Some(CustomerInfo {
        email,
        name: details.and_then(|d| d.name.clone()).filter(|s| !s.is_empty()),
        phone: details
            .and_then(|d| d.phone.clone())
            .filter(|s| !s.is_empty()),
        address,
    })
}
