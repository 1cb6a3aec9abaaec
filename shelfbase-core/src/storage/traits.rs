// src/storage/traits.rs
//! Storage abstraction for ShelfBase
//!
//! ```text
//! Storage trait (unified interface)
//!   ├── FileStorage   (JSON snapshot on disk, used by the CLI)
//!   └── MemoryStorage (HashMap + Vec, used by tests)
//! ```
//!
//! Collections keep documents in insertion order; `scan_documents` returns
//! them in that order.

use crate::document::{Document, DocumentId};
use crate::error::Result;
use crate::storage::CollectionMeta;

/// Core storage abstraction
///
/// Every method works on whole documents. Id generation and filter matching
/// live one layer up, in `CollectionCore`.
pub trait Storage: Send + Sync {
    // ========================================================================
    // DOCUMENT OPERATIONS
    // ========================================================================

    /// Append a document to a collection.
    ///
    /// Fails with `DuplicateKey` if the id is already present and with
    /// `CollectionNotFound` if the collection does not exist.
    fn write_document(&mut self, collection: &str, doc: Document) -> Result<()>;

    /// Read a document by its id
    fn read_document(&self, collection: &str, id: &DocumentId) -> Result<Option<Document>>;

    /// All live documents of a collection, in insertion order.
    /// A missing collection scans as empty.
    fn scan_documents(&self, collection: &str) -> Result<Vec<Document>>;

    /// Remove the given ids; returns how many were actually present
    fn delete_documents(&mut self, collection: &str, ids: &[DocumentId]) -> Result<u64>;

    // ========================================================================
    // COLLECTION MANAGEMENT
    // ========================================================================

    fn create_collection(&mut self, name: &str) -> Result<()>;

    fn drop_collection(&mut self, name: &str) -> Result<()>;

    /// Collection names, sorted
    fn list_collections(&self) -> Vec<String>;

    // ========================================================================
    // METADATA ACCESS
    // ========================================================================

    /// Name of the database (namespace) this storage holds
    fn database_name(&self) -> &str;

    fn get_collection_meta(&self, name: &str) -> Option<&CollectionMeta>;

    // ========================================================================
    // PERSISTENCE & FLUSHING
    // ========================================================================

    /// Persist pending writes. No-op for `MemoryStorage`.
    fn flush(&mut self) -> Result<()>;
}
