//! In-memory cart store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::ports::{CartStore, StoreError};

/// Process-local [`CartStore`] implementation.
#[derive(Default)]
pub struct InMemoryCartStore {
    carts: RwLock<HashMap<String, serde_json::Value>>,
    session_sizes: RwLock<HashMap<String, HashMap<String, String>>>,
}

impl InMemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a cart document for a user (test helper).
    pub async fn put_cart(&self, user_id: &str, cart: serde_json::Value) {
        self.carts.write().await.insert(user_id.to_string(), cart);
    }

    /// Seed size selections for a session (test helper).
    pub async fn put_session_sizes(&self, session_id: &str, sizes: HashMap<String, String>) {
        self.session_sizes
            .write()
            .await
            .insert(session_id.to_string(), sizes);
    }

    /// Whether a cart exists for the user (test helper).
    pub async fn has_cart(&self, user_id: &str) -> bool {
        self.carts.read().await.contains_key(user_id)
    }

    /// Whether a size record exists for the session (test helper).
    pub async fn has_session_sizes(&self, session_id: &str) -> bool {
        self.session_sizes.read().await.contains_key(session_id)
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn session_sizes(
        &self,
        session_id: &str,
    ) -> Result<Option<HashMap<String, String>>, StoreError> {
        Ok(self.session_sizes.read().await.get(session_id).cloned())
    }

    async fn delete_session_sizes(&self, session_id: &str) -> Result<(), StoreError> {
        self.session_sizes.write().await.remove(session_id);
        Ok(())
    }

    async fn delete_cart(&self, user_id: &str) -> Result<(), StoreError> {
        self.carts.write().await.remove(user_id);
        Ok(())
    }
}
