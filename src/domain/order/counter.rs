//! Durable order counter.
//!
//! A single document (`counters/orders`) holds the last allocated value.
//! Allocation is a transactional read-modify-write: the counter is re-read
//! inside the transaction so two concurrent completions can never be handed
//! the same value. The first allocation yields 1.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ports::{
    AbortError, DocumentKey, DocumentStore, DocumentWrite, TransactionError, TransactionOp,
    TransactionPlan,
};

const COUNTER_COLLECTION: &str = "counters";
const ORDER_COUNTER_DOC: &str = "orders";

/// Persisted shape of the counter document.
#[derive(Debug, Serialize, Deserialize)]
struct CounterDocument {
    value: u64,
    #[serde(rename = "updatedAt")]
    updated_at: DateTime<Utc>,
}

/// Errors from counter allocation.
#[derive(Debug, Error)]
pub enum CounterError {
    #[error("failed to allocate order counter: {0}")]
    Store(String),

    #[error("order counter document is corrupt: {0}")]
    Corrupt(String),
}

/// Allocator for monotonically increasing order counter values.
pub struct OrderCounter {
    store: Arc<dyn DocumentStore>,
}

impl OrderCounter {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Atomically increment the counter and return the new value.
    pub async fn next(&self) -> Result<u64, CounterError> {
        let key = DocumentKey::new(COUNTER_COLLECTION, ORDER_COUNTER_DOC);
        let write_key = key.clone();
        let now = Utc::now();

        let op: TransactionOp = Box::new(move |docs| {
            let current = match docs.first().and_then(|d| d.as_ref()) {
                Some(doc) => {
                    serde_json::from_value::<CounterDocument>(doc.clone())
                        .map_err(|e| Box::new(e) as AbortError)?
                        .value
                }
                None => 0,
            };

            let next = current + 1;
            let doc = serde_json::to_value(CounterDocument {
                value: next,
                updated_at: now,
            })
            .map_err(|e| Box::new(e) as AbortError)?;

            Ok(TransactionPlan::new(vec![DocumentWrite::Set {
                key: write_key,
                doc,
            }])
            .with_output(serde_json::json!(next)))
        });

        let output = self
            .store
            .transact(std::slice::from_ref(&key), op)
            .await
            .map_err(|e| match e {
                TransactionError::Aborted(abort) => CounterError::Corrupt(abort.to_string()),
                TransactionError::Store(store) => CounterError::Store(store.to_string()),
            })?;

        output
            .as_u64()
            .ok_or_else(|| CounterError::Corrupt("allocation produced a non-integer value".into()))
    }
}
