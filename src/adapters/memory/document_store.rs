//! In-memory document store.
//!
//! Backs tests and the default wiring. Transactions take the store lock for
//! their whole lifetime, which gives all-or-nothing commits and guarantees
//! the snapshot handed to the operation cannot go stale before its writes
//! land.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::ports::{
    Document, DocumentKey, DocumentStore, DocumentWrite, StoreError, TransactionError,
    TransactionOp,
};

/// Process-local [`DocumentStore`] implementation.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    documents: Mutex<HashMap<DocumentKey, Document>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, key: &DocumentKey) -> Result<Option<Document>, StoreError> {
        let documents = self.documents.lock().await;
        Ok(documents.get(key).cloned())
    }

    async fn set(&self, key: &DocumentKey, doc: Document) -> Result<(), StoreError> {
        let mut documents = self.documents.lock().await;
        documents.insert(key.clone(), doc);
        Ok(())
    }

    async fn delete(&self, key: &DocumentKey) -> Result<(), StoreError> {
        let mut documents = self.documents.lock().await;
        documents.remove(key);
        Ok(())
    }

    async fn transact(
        &self,
        keys: &[DocumentKey],
        op: TransactionOp,
    ) -> Result<Document, TransactionError> {
        let mut documents = self.documents.lock().await;

        let snapshot: Vec<Option<Document>> =
            keys.iter().map(|key| documents.get(key).cloned()).collect();

        let plan = op(&snapshot).map_err(TransactionError::Aborted)?;

        for write in plan.writes {
            match write {
                DocumentWrite::Set { key, doc } => {
                    documents.insert(key, doc);
                }
                DocumentWrite::Delete { key } => {
                    documents.remove(&key);
                }
            }
        }

        Ok(plan.output)
    }
}
