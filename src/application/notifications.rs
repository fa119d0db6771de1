//! Transactional notification dispatch.
//!
//! Builds the three customer-facing messages of the checkout flow and hands
//! them to the notifier port. Dispatch failure is data, never an error: the
//! result says whether the message went out, callers log a caveat and move
//! on. Full HTML templating belongs to the storefront's email service; the
//! bodies here carry the facts and nothing more.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::order::Order;
use crate::ports::{EmailDispatchResult, EmailMessage, EmailNotifier};

/// Builds and dispatches transactional email.
pub struct NotificationService {
    notifier: Arc<dyn EmailNotifier>,
}

impl NotificationService {
    pub fn new(notifier: Arc<dyn EmailNotifier>) -> Self {
        Self { notifier }
    }

    /// Order confirmation, sent after a completed checkout.
    ///
    /// Non-fatal by contract: the order stands regardless of the outcome.
    pub async fn send_order_confirmation(&self, order: &Order) -> EmailDispatchResult {
        let message = EmailMessage {
            to: order.customer_info.email.clone(),
            subject: format!("Order Confirmation - Order #{}", order.order_number),
            html: confirmation_html(order),
        };
        self.dispatch("order_confirmation", message).await
    }

    /// Notice that an order was paid but could not be fully processed.
    ///
    /// Non-fatal by contract, including when this notice itself fails.
    pub async fn send_processing_failure(&self, order: &Order, reason: &str) -> EmailDispatchResult {
        let message = EmailMessage {
            to: order.customer_info.email.clone(),
            subject: "Order Processing Issue - Boutique".to_string(),
            html: processing_failure_html(order, reason),
        };
        self.dispatch("processing_failure", message).await
    }

    /// Abandoned-cart nudge for an expired checkout session.
    pub async fn send_abandoned_cart(&self, email: &str) -> EmailDispatchResult {
        let message = EmailMessage {
            to: email.to_string(),
            subject: "Complete Your Purchase - Your Cart is Waiting".to_string(),
            html: abandoned_cart_html(),
        };
        self.dispatch("abandoned_cart", message).await
    }

    async fn dispatch(&self, kind: &'static str, message: EmailMessage) -> EmailDispatchResult {
        let to = message.to.clone();
        let result = self.notifier.send(message).await;
        if result.success {
            info!(kind, to = %to, message_id = ?result.message_id, "notification sent");
        } else {
            warn!(kind, to = %to, error = ?result.error, "notification failed");
        }
        result
    }
}

fn confirmation_html(order: &Order) -> String {
    let rows: String = order
        .items
        .iter()
        .map(|item| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.2} {}</td></tr>",
                item.title,
                item.size.as_deref().unwrap_or(""),
                item.quantity,
                item.total,
                order.totals.currency,
            )
        })
        .collect();

    format!(
        "<h1>Thank you for your order</h1>\
         <p>Order <strong>#{}</strong> is confirmed and being prepared.</p>\
         <table><tr><th>Item</th><th>Size</th><th>Qty</th><th>Total</th></tr>{}</table>\
         <p>Total charged: <strong>{:.2} {}</strong></p>",
        order.order_number, rows, order.totals.total, order.totals.currency,
    )
}

fn processing_failure_html(order: &Order, reason: &str) -> String {
    format!(
        "<h1>We hit a snag with your order</h1>\
         <p>Your payment for order <strong>#{}</strong> went through, but part of the \
         processing did not complete ({}). Our team is on it and will follow up \
         shortly; no action is needed from you.</p>",
        order.order_number, reason,
    )
}

fn abandoned_cart_html() -> String {
    "<h1>Your cart is waiting</h1>\
     <p>You left some items behind. They are still reserved in your cart - \
     come back any time to finish checking out.</p>"
        .to_string()
}
