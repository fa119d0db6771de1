//! In-memory order repository.
//!
//! Keeps a unique index from session id to order id, which is what lets
//! `create` report the duplicate-session outcome instead of writing a
//! second order when two deliveries of the same session race.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::order::{Order, OrderStatus};
use crate::ports::{CreateOutcome, DocumentKey, OrderRepository, StoreError};

#[derive(Default)]
struct Inner {
    orders: HashMap<String, Order>,
    by_session: HashMap<String, String>,
}

/// Process-local [`OrderRepository`] implementation.
#[derive(Default)]
pub struct InMemoryOrderRepository {
    inner: RwLock<Inner>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored orders (test helper).
    pub async fn len(&self) -> usize {
        self.inner.read().await.orders.len()
    }

    /// True when no order is stored (test helper).
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: &Order) -> Result<CreateOutcome, StoreError> {
        let mut inner = self.inner.write().await;

        if let Some(existing_order_id) = inner.by_session.get(&order.stripe_session_id) {
            return Ok(CreateOutcome::DuplicateSession {
                existing_order_id: existing_order_id.clone(),
            });
        }

        inner
            .by_session
            .insert(order.stripe_session_id.clone(), order.id.clone());
        inner.orders.insert(order.id.clone(), order.clone());
        Ok(CreateOutcome::Created)
    }

    async fn get_by_id(&self, order_id: &str) -> Result<Option<Order>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.orders.get(order_id).cloned())
    }

    async fn get_by_session_id(&self, session_id: &str) -> Result<Option<Order>, StoreError> {
        let inner = self.inner.read().await;
        let order = inner
            .by_session
            .get(session_id)
            .and_then(|order_id| inner.orders.get(order_id))
            .cloned();
        Ok(order)
    }

    async fn get_by_user(&self, user_id: &str) -> Result<Vec<Order>, StoreError> {
        let inner = self.inner.read().await;
        let mut orders: Vec<Order> = inner
            .orders
            .values()
            .filter(|order| order.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn update_status(&self, order_id: &str, status: OrderStatus) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let order = inner
            .orders
            .get_mut(order_id)
            .ok_or_else(|| StoreError::NotFound(DocumentKey::new("orders", order_id)))?;
        order.status = status;
        order.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{CustomerInfo, OrderTotals};
    use chrono::Duration;

    fn order(id: &str, session_id: &str, user_id: &str) -> Order {
        Order {
            id: id.to_string(),
            user_id: user_id.to_string(),
            order_number: format!("ORD-000001-{}", id.to_uppercase()),
            stripe_session_id: session_id.to_string(),
            stripe_payment_intent_id: "pi_1".to_string(),
            status: OrderStatus::Processing,
            items: vec![],
            totals: OrderTotals {
                subtotal: 10.0,
                tax: 2.0,
                total: 12.0,
                currency: "EUR".to_string(),
            },
            customer_info: CustomerInfo {
                email: "jane@example.com".to_string(),
                name: None,
                phone: None,
                address: None,
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
            payment_completed_at: None,
        }
    }

    #[tokio::test]
    async fn create_then_fetch_by_id_and_session() {
        let repo = InMemoryOrderRepository::new();
        let outcome = repo.create(&order("order_1", "cs_1", "u1")).await.unwrap();
        assert_eq!(outcome, CreateOutcome::Created);

        assert!(repo.get_by_id("order_1").await.unwrap().is_some());
        let by_session = repo.get_by_session_id("cs_1").await.unwrap().unwrap();
        assert_eq!(by_session.id, "order_1");
    }

    #[tokio::test]
    async fn second_order_for_same_session_is_rejected() {
        let repo = InMemoryOrderRepository::new();
        repo.create(&order("order_1", "cs_1", "u1")).await.unwrap();

        let outcome = repo.create(&order("order_2", "cs_1", "u1")).await.unwrap();
        assert_eq!(
            outcome,
            CreateOutcome::DuplicateSession {
                existing_order_id: "order_1".to_string()
            }
        );
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn user_orders_come_newest_first() {
        let repo = InMemoryOrderRepository::new();
        let mut older = order("order_1", "cs_1", "u1");
        older.created_at = Utc::now() - Duration::hours(2);
        let newer = order("order_2", "cs_2", "u1");
        let other_user = order("order_3", "cs_3", "u2");

        repo.create(&older).await.unwrap();
        repo.create(&newer).await.unwrap();
        repo.create(&other_user).await.unwrap();

        let orders = repo.get_by_user("u1").await.unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, "order_2");
        assert_eq!(orders[1].id, "order_1");
    }

    #[tokio::test]
    async fn update_status_touches_updated_at() {
        let repo = InMemoryOrderRepository::new();
        let created = order("order_1", "cs_1", "u1");
        let before = created.updated_at;
        repo.create(&created).await.unwrap();

        repo.update_status("order_1", OrderStatus::Completed)
            .await
            .unwrap();

        let updated = repo.get_by_id("order_1").await.unwrap().unwrap();
        assert_eq!(updated.status, OrderStatus::Completed);
        assert!(updated.updated_at >= before);
    }

    #[tokio::test]
    async fn update_status_of_missing_order_fails() {
        let repo = InMemoryOrderRepository::new();
        let result = repo.update_status("ghost", OrderStatus::Failed).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }
}
