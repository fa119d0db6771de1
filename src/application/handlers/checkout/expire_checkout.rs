//! Expired checkout sessions.
//!
//! An expired session means the customer walked away before paying. No
//! order exists and nothing durable is written; the handler records the
//! abandonment and, when an email is known, nudges the customer about the
//! waiting cart. Nothing here can fail the webhook delivery.

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::notifications::NotificationService;
use crate::domain::webhook::CheckoutSessionEvent;

/// Handles `checkout.session.expired` events.
pub struct ExpiredSessionHandler {
    notifications: Arc<NotificationService>,
}

impl ExpiredSessionHandler {
    pub fn new(notifications: Arc<NotificationService>) -> Self {
        Self { notifications }
    }

    /// Log the abandonment and attempt an abandoned-cart notification.
    ///
    /// Infallible: notification failure is logged and dropped, matching the
    /// weight of the event — losing an abandonment nudge costs nothing
    /// durable.
    pub async fn handle(&self, event: &CheckoutSessionEvent) {
        info!(
            session_id = %event.id,
            user_id = ?event.user_id(),
            customer_email = ?event.customer_email,
            amount_total = ?event.amount_total.map(|cents| cents as f64 / 100.0),
            currency = ?event.currency,
            "checkout session expired, customer did not complete payment"
        );

        let Some(email) = event.customer_email.as_deref().filter(|e| !e.is_empty()) else {
            return;
        };

        let result = self.notifications.send_abandoned_cart(email).await;
        if !result.success {
            warn!(
                session_id = %event.id,
                error = ?result.error,
                "abandoned cart notification failed"
            );
        }
    }
}
