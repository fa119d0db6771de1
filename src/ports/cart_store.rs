//! CartStore port - the cart side-channel.
//!
//! The storefront records two things the webhook pipeline needs: the user's
//! cart document (deleted once the order exists) and a per-session record of
//! size/variant selections, keyed by checkout session id, because the
//! provider's line items do not carry them. Both records are discarded after
//! a successful order.

use async_trait::async_trait;
use std::collections::HashMap;

use super::document_store::StoreError;

/// Port for cart and checkout side-channel records.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Size/variant selections recorded when the checkout session was
    /// created, keyed by catalog product id. `None` when no record exists
    /// (callers fall back to the "one size" sentinel).
    async fn session_sizes(
        &self,
        session_id: &str,
    ) -> Result<Option<HashMap<String, String>>, StoreError>;

    /// Remove the size record for a session. Removing an absent record
    /// succeeds.
    async fn delete_session_sizes(&self, session_id: &str) -> Result<(), StoreError>;

    /// Delete the user's cart after order creation. Deleting an absent cart
    /// succeeds.
    async fn delete_cart(&self, user_id: &str) -> Result<(), StoreError>;
}
