//! Inventory adjustment.
//!
//! Stock for all products of an order is decremented in one datastore
//! transaction: every product is validated (exists, enough stock) against
//! the transaction's own snapshot before any decrement is written, so a
//! failing item leaves every other product untouched.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use crate::ports::{
    AbortError, Document, DocumentKey, DocumentStore, DocumentWrite, TransactionError,
    TransactionOp, TransactionPlan,
};

const PRODUCTS_COLLECTION: &str = "products";

/// One product's share of an order, for stock accounting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockDecrement {
    pub product_id: String,
    pub quantity: u32,
}

/// Errors from stock adjustment. The first failing product aborts the whole
/// transaction; no partial decrement is ever visible.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    #[error("product {product_id} not found")]
    ProductNotFound { product_id: String },

    #[error(
        "insufficient stock for product {product_id}: available {available}, requested {requested}"
    )]
    InsufficientStock {
        product_id: String,
        available: u32,
        requested: u32,
    },

    #[error("inventory datastore error: {0}")]
    Store(String),
}

/// Adjusts product stock through the document store's transaction primitive.
pub struct StockAdjuster {
    store: Arc<dyn DocumentStore>,
}

impl StockAdjuster {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Decrement stock for every product, all-or-nothing.
    ///
    /// Requests naming the same product more than once are aggregated before
    /// the transaction so each product document is read and written once.
    pub async fn decrement(&self, items: &[StockDecrement]) -> Result<(), InventoryError> {
        let aggregated = aggregate(items);
        if aggregated.is_empty() {
            return Ok(());
        }

        let keys: Vec<DocumentKey> = aggregated
            .iter()
            .map(|(product_id, _)| DocumentKey::new(PRODUCTS_COLLECTION, product_id.clone()))
            .collect();

        let op_items = aggregated.clone();
        let op_keys = keys.clone();
        let now = Utc::now();

        let op: TransactionOp = Box::new(move |docs| {
            // Validate every product before planning a single write.
            let mut validated: Vec<(usize, Document, u32)> = Vec::with_capacity(op_items.len());
            for (index, (product_id, requested)) in op_items.iter().enumerate() {
                let doc = docs
                    .get(index)
                    .and_then(|d| d.as_ref())
                    .ok_or_else(|| abort(InventoryError::ProductNotFound {
                        product_id: product_id.clone(),
                    }))?;

                let available = stock_of(doc);
                if available < *requested {
                    return Err(abort(InventoryError::InsufficientStock {
                        product_id: product_id.clone(),
                        available,
                        requested: *requested,
                    }));
                }
                validated.push((index, doc.clone(), available - requested));
            }

            let writes = validated
                .into_iter()
                .map(|(index, mut doc, remaining)| {
                    if let Some(object) = doc.as_object_mut() {
                        object.insert("stock".to_string(), serde_json::json!(remaining));
                        object.insert(
                            "updatedAt".to_string(),
                            serde_json::json!(now.to_rfc3339()),
                        );
                    }
                    DocumentWrite::Set {
                        key: op_keys[index].clone(),
                        doc,
                    }
                })
                .collect();

            Ok(TransactionPlan::new(writes))
        });

        match self.store.transact(&keys, op).await {
            Ok(_) => Ok(()),
            Err(TransactionError::Aborted(aborted)) => Err(recover(aborted)),
            Err(TransactionError::Store(store)) => Err(InventoryError::Store(store.to_string())),
        }
    }
}

/// Merge duplicate product ids, preserving first-seen order.
fn aggregate(items: &[StockDecrement]) -> Vec<(String, u32)> {
    let mut order: Vec<String> = Vec::new();
    let mut quantities: HashMap<String, u32> = HashMap::new();
    for item in items {
        if !quantities.contains_key(&item.product_id) {
            order.push(item.product_id.clone());
        }
        *quantities.entry(item.product_id.clone()).or_insert(0) += item.quantity;
    }
    order
        .into_iter()
        .map(|id| {
            let qty = quantities[&id];
            (id, qty)
        })
        .collect()
}

fn stock_of(doc: &Document) -> u32 {
    doc.get("stock")
        .and_then(|v| v.as_u64())
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0)
}

fn abort(err: InventoryError) -> AbortError {
    Box::new(err)
}

fn recover(aborted: AbortError) -> InventoryError {
    match aborted.downcast::<InventoryError>() {
        Ok(inventory) => *inventory,
        Err(other) => InventoryError::Store(other.to_string()),
    }
}
