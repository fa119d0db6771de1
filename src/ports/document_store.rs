//! DocumentStore port - Interface for the document datastore.
//!
//! The backing store is a document database exposing keyed get/set/delete and
//! a transaction primitive. Transactions are expressed as a pure function of
//! the read snapshot: the store reads the named keys, applies the function,
//! and commits the returned writes atomically. If the function aborts, no
//! write is applied.
//!
//! ## Why transactions are closures over a snapshot
//!
//! The two mutations that need atomicity (stock decrement across products,
//! order-counter increment) are read-modify-write cycles. Re-reading the keys
//! inside the transaction is what protects them from stale-read races, so the
//! port forces callers to derive the writes from the transaction's own
//! snapshot rather than from values read earlier.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Stored document payload. Components decode this into typed structs with
/// serde at the boundary; raw values do not travel further into the domain.
pub type Document = serde_json::Value;

/// Boxed abort error raised by a transaction operation.
///
/// Domain components put their own typed error in the box and recover it via
/// downcast after `transact` returns.
pub type AbortError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Pure operation executed inside a transaction.
///
/// Receives the documents for the requested keys, in request order (`None`
/// for keys with no document), and returns the writes to commit plus an
/// optional output value surfaced to the caller.
pub type TransactionOp =
    Box<dyn FnOnce(&[Option<Document>]) -> Result<TransactionPlan, AbortError> + Send>;

/// Address of a document: a collection name plus a document id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentKey {
    pub collection: String,
    pub id: String,
}

impl DocumentKey {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// A single write produced by a transaction operation.
#[derive(Debug, Clone)]
pub enum DocumentWrite {
    /// Replace the document at `key` with `doc`.
    Set { key: DocumentKey, doc: Document },
    /// Remove the document at `key` (absent documents are a no-op).
    Delete { key: DocumentKey },
}

/// The writes to commit and the value to return from a transaction.
#[derive(Debug, Clone)]
pub struct TransactionPlan {
    pub writes: Vec<DocumentWrite>,
    pub output: Document,
}

impl TransactionPlan {
    /// Plan with writes and no output value.
    pub fn new(writes: Vec<DocumentWrite>) -> Self {
        Self {
            writes,
            output: Document::Null,
        }
    }

    /// Attach an output value surfaced to the `transact` caller.
    pub fn with_output(mut self, output: Document) -> Self {
        self.output = output;
        self
    }
}

/// Errors from plain document operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(DocumentKey),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("datastore unavailable: {0}")]
    Unavailable(String),
}

/// Errors from `transact`.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// The operation aborted; no write was applied. The box carries the
    /// operation's own typed error.
    #[error("transaction aborted: {0}")]
    Aborted(#[source] AbortError),

    /// The store itself failed before or during commit.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Port for the document datastore.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document, `None` if absent.
    async fn get(&self, key: &DocumentKey) -> Result<Option<Document>, StoreError>;

    /// Create or replace a document.
    async fn set(&self, key: &DocumentKey, doc: Document) -> Result<(), StoreError>;

    /// Delete a document. Deleting an absent document succeeds.
    async fn delete(&self, key: &DocumentKey) -> Result<(), StoreError>;

    /// Read `keys`, run `op` on the snapshot, and atomically commit the plan
    /// it returns. An abort from `op` rolls the transaction back completely
    /// and is surfaced as [`TransactionError::Aborted`].
    ///
    /// Implementations must guarantee that the snapshot handed to `op`
    /// cannot go stale before commit (all-or-nothing, read-your-writes).
    async fn transact(
        &self,
        keys: &[DocumentKey],
        op: TransactionOp,
    ) -> Result<Document, TransactionError>;
}
