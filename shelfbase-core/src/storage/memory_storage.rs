// storage/memory_storage.rs
//! Pure in-memory storage backend
//!
//! ```text
//! MemoryStorage (Storage trait implementation)
//!      ↓
//! HashMap<String, Vec<Document>> (collection -> documents, insertion order)
//! ```
//!
//! Also the in-memory state behind `FileStorage`, which snapshots it to disk.

use std::collections::HashMap;

use crate::document::{Document, DocumentId};
use crate::error::{Result, ShelfBaseError};
use crate::storage::{CollectionMeta, Storage};

/// In-memory storage backend
///
/// Nothing is persisted; data is lost when dropped.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    database: String,

    /// Collection name -> documents
    collections: HashMap<String, Vec<Document>>,

    /// Collection name -> metadata
    metadata: HashMap<String, CollectionMeta>,
}

impl MemoryStorage {
    /// Empty storage for the named database
    pub fn new(database: &str) -> Self {
        MemoryStorage {
            database: database.to_string(),
            collections: HashMap::new(),
            metadata: HashMap::new(),
        }
    }

    /// Rebuild from previously snapshotted collections
    pub(crate) fn from_parts(
        database: &str,
        parts: Vec<(CollectionMeta, Vec<Document>)>,
    ) -> Self {
        let mut storage = MemoryStorage::new(database);
        for (mut meta, docs) in parts {
            meta.document_count = docs.len() as u64;
            storage.collections.insert(meta.name.clone(), docs);
            storage.metadata.insert(meta.name.clone(), meta);
        }
        storage
    }

    /// Collections with their documents, sorted by name
    pub(crate) fn iter_collections(&self) -> Vec<(&CollectionMeta, &[Document])> {
        let mut names: Vec<&String> = self.metadata.keys().collect();
        names.sort();
        names
            .into_iter()
            .filter_map(|name| {
                let meta = self.metadata.get(name)?;
                let docs = self.collections.get(name)?;
                Some((meta, docs.as_slice()))
            })
            .collect()
    }
}

impl Storage for MemoryStorage {
    // ========================================================================
    // DOCUMENT OPERATIONS
    // ========================================================================

    fn write_document(&mut self, collection: &str, doc: Document) -> Result<()> {
        let docs = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| ShelfBaseError::CollectionNotFound(collection.to_string()))?;

        if docs.iter().any(|existing| existing.id == doc.id) {
            return Err(ShelfBaseError::DuplicateKey {
                collection: collection.to_string(),
                id: doc.id.to_string(),
            });
        }

        docs.push(doc);

        if let Some(meta) = self.metadata.get_mut(collection) {
            meta.document_count += 1;
            meta.touch();
        }

        Ok(())
    }

    fn read_document(&self, collection: &str, id: &DocumentId) -> Result<Option<Document>> {
        Ok(self
            .collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| &doc.id == id))
            .cloned())
    }

    fn scan_documents(&self, collection: &str) -> Result<Vec<Document>> {
        Ok(self.collections.get(collection).cloned().unwrap_or_default())
    }

    fn delete_documents(&mut self, collection: &str, ids: &[DocumentId]) -> Result<u64> {
        let docs = match self.collections.get_mut(collection) {
            Some(docs) => docs,
            None => return Ok(0),
        };

        let before = docs.len();
        docs.retain(|doc| !ids.contains(&doc.id));
        let removed = (before - docs.len()) as u64;

        if removed > 0 {
            if let Some(meta) = self.metadata.get_mut(collection) {
                meta.document_count = docs.len() as u64;
                meta.touch();
            }
        }

        Ok(removed)
    }

    // ========================================================================
    // COLLECTION MANAGEMENT
    // ========================================================================

    fn create_collection(&mut self, name: &str) -> Result<()> {
        if self.collections.contains_key(name) {
            return Err(ShelfBaseError::CollectionExists(name.to_string()));
        }

        self.collections.insert(name.to_string(), Vec::new());
        self.metadata
            .insert(name.to_string(), CollectionMeta::new(name));

        Ok(())
    }

    fn drop_collection(&mut self, name: &str) -> Result<()> {
        if self.collections.remove(name).is_none() {
            return Err(ShelfBaseError::CollectionNotFound(name.to_string()));
        }
        self.metadata.remove(name);
        Ok(())
    }

    fn list_collections(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.keys().cloned().collect();
        names.sort();
        names
    }

    // ========================================================================
    // METADATA ACCESS
    // ========================================================================

    fn database_name(&self) -> &str {
        &self.database
    }

    fn get_collection_meta(&self, name: &str) -> Option<&CollectionMeta> {
        self.metadata.get(name)
    }

    // ========================================================================
    // PERSISTENCE & FLUSHING
    // ========================================================================

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
