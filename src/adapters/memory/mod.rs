//! In-memory adapters.
//!
//! Back the test suite and the default wiring; a server-grade document
//! database adapter is a deployment concern outside this repository.

mod cart_store;
mod document_store;
mod order_repository;

pub use cart_store::InMemoryCartStore;
pub use document_store::InMemoryDocumentStore;
pub use order_repository::InMemoryOrderRepository;
