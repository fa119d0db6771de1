//! OrderRepository port - persistence for order records.
//!
//! The session-id lookup is the idempotency primitive of the checkout
//! pipeline. `create` additionally reports a duplicate-session outcome so a
//! backing store with a uniqueness constraint can close the race window
//! between the idempotency check and the write: when two deliveries of the
//! same session race, the loser learns it lost instead of writing a second
//! order.

use async_trait::async_trait;

use crate::domain::order::{Order, OrderStatus};

use super::document_store::StoreError;

/// Result of attempting to create an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The order was persisted.
    Created,
    /// An order for the same checkout session already exists; nothing was
    /// written. Carries the existing order's id.
    DuplicateSession { existing_order_id: String },
}

/// Port for storing and retrieving orders.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a new order.
    ///
    /// Implementations backed by a store with a unique index on the session
    /// id must report [`CreateOutcome::DuplicateSession`] instead of writing
    /// a second order for the same session.
    async fn create(&self, order: &Order) -> Result<CreateOutcome, StoreError>;

    /// Fetch an order by its document id.
    async fn get_by_id(&self, order_id: &str) -> Result<Option<Order>, StoreError>;

    /// Fetch the order created for a checkout session, if any.
    ///
    /// This is the idempotency lookup: a hit means the session has already
    /// been turned into an order and redelivery must be a no-op.
    async fn get_by_session_id(&self, session_id: &str) -> Result<Option<Order>, StoreError>;

    /// All orders of a user, newest first.
    async fn get_by_user(&self, user_id: &str) -> Result<Vec<Order>, StoreError>;

    /// Update an order's status, touching `updated_at`.
    async fn update_status(&self, order_id: &str, status: OrderStatus) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn OrderRepository) {}
    }

    #[test]
    fn duplicate_outcome_carries_existing_id() {
        let outcome = CreateOutcome::DuplicateSession {
            existing_order_id: "order_abc".to_string(),
        };
        assert_ne!(outcome, CreateOutcome::Created);
    }
}
