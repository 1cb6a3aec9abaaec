// shelfbase-core/src/collection_core.rs
// Collection-level CRUD over a shared Storage backend
//
// ├── Constructor
// ├── Insert: insert_one, insert_many
// ├── Query:  find, find_one, count_documents
// └── Delete: delete_many

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, trace};

use crate::document::{Document, DocumentId};
use crate::error::{Result, ShelfBaseError};
use crate::query::Query;
use crate::storage::Storage;

/// Result of insert_many
///
/// `inserted_ids[i]` is the id of `documents[i]`.
#[derive(Debug, Clone)]
pub struct InsertManyResult {
    pub inserted_ids: Vec<DocumentId>,
    pub inserted_count: usize,
}

/// Handle on one collection
///
/// Generic over the storage backend:
/// - `CollectionCore<FileStorage>` - snapshot file on disk
/// - `CollectionCore<MemoryStorage>` - in-memory, for tests
///
/// Cheap to create; handles for the same collection share the storage.
pub struct CollectionCore<S: Storage> {
    pub name: String,
    pub storage: Arc<RwLock<S>>,
}

impl<S: Storage> CollectionCore<S> {
    // ========== CONSTRUCTOR ==========

    /// Get the collection, creating it if it does not exist yet
    pub fn new(name: String, storage: Arc<RwLock<S>>) -> Result<Self> {
        {
            let mut guard = storage.write();
            if guard.get_collection_meta(&name).is_none() {
                guard.create_collection(&name)?;
                debug!(collection = %name, "created collection");
            }
        }

        Ok(CollectionCore { name, storage })
    }

    // ========== INSERT OPERATIONS ==========

    /// Insert one document and return its id.
    ///
    /// An `_id` in `fields` is used as-is; otherwise a fresh ObjectId is
    /// generated.
    pub fn insert_one(&self, fields: HashMap<String, Value>) -> Result<DocumentId> {
        let doc = Self::prepare_document(fields)?;
        let doc_id = doc.id.clone();

        let mut storage = self.storage.write();
        storage.write_document(&self.name, doc)?;

        trace!(collection = %self.name, id = %doc_id, "inserted document");
        Ok(doc_id)
    }

    /// Insert many documents in one call.
    ///
    /// Ids are returned in input order. Every document is prepared before the
    /// first write, so a malformed `_id` rejects the whole batch; a storage
    /// failure midway leaves the earlier documents in place.
    pub fn insert_many(&self, documents: Vec<HashMap<String, Value>>) -> Result<InsertManyResult> {
        if documents.is_empty() {
            return Ok(InsertManyResult {
                inserted_ids: Vec::new(),
                inserted_count: 0,
            });
        }

        let prepared = documents
            .into_iter()
            .map(Self::prepare_document)
            .collect::<Result<Vec<_>>>()?;

        let mut inserted_ids = Vec::with_capacity(prepared.len());
        let mut storage = self.storage.write();
        for doc in prepared {
            let doc_id = doc.id.clone();
            storage.write_document(&self.name, doc)?;
            inserted_ids.push(doc_id);
        }

        debug!(
            collection = %self.name,
            count = inserted_ids.len(),
            "insert_many completed"
        );

        Ok(InsertManyResult {
            inserted_count: inserted_ids.len(),
            inserted_ids,
        })
    }

    // ========== QUERY OPERATIONS ==========

    /// Documents matching the filter, in insertion order
    pub fn find(&self, query_json: &Value) -> Result<Vec<Document>> {
        let query = Query::from_json(query_json)?;
        let docs = self.storage.read().scan_documents(&self.name)?;

        if query.matches_all() {
            return Ok(docs);
        }
        Ok(docs.into_iter().filter(|doc| query.matches(doc)).collect())
    }

    /// First matching document in insertion order
    pub fn find_one(&self, query_json: &Value) -> Result<Option<Document>> {
        let query = Query::from_json(query_json)?;

        // _id equality goes straight to the storage lookup
        if let Some(doc_id) = Self::extract_id_query(query_json) {
            return self.storage.read().read_document(&self.name, &doc_id);
        }

        let docs = self.storage.read().scan_documents(&self.name)?;
        Ok(docs.into_iter().find(|doc| query.matches(doc)))
    }

    pub fn count_documents(&self, query_json: &Value) -> Result<u64> {
        let query = Query::from_json(query_json)?;

        if query.matches_all() {
            let storage = self.storage.read();
            return Ok(storage
                .get_collection_meta(&self.name)
                .map(|meta| meta.document_count)
                .unwrap_or(0));
        }

        Ok(self.find(query_json)?.len() as u64)
    }

    // ========== DELETE OPERATIONS ==========

    /// Delete every matching document; `{}` clears the collection
    pub fn delete_many(&self, query_json: &Value) -> Result<u64> {
        let query = Query::from_json(query_json)?;

        let mut storage = self.storage.write();
        let ids: Vec<DocumentId> = storage
            .scan_documents(&self.name)?
            .into_iter()
            .filter(|doc| query.matches(doc))
            .map(|doc| doc.id)
            .collect();

        if ids.is_empty() {
            return Ok(0);
        }

        let deleted = storage.delete_documents(&self.name, &ids)?;
        debug!(collection = %self.name, deleted, "delete_many completed");
        Ok(deleted)
    }

    // ========== PRIVATE HELPERS ==========

    fn prepare_document(mut fields: HashMap<String, Value>) -> Result<Document> {
        let doc_id = match fields.remove("_id") {
            Some(raw) => serde_json::from_value::<DocumentId>(raw).map_err(|e| {
                ShelfBaseError::Serialization(format!("Invalid _id format: {}", e))
            })?,
            None => DocumentId::generate(),
        };
        Ok(Document::new(doc_id, fields))
    }

    /// `{"_id": <id>}` and nothing else
    fn extract_id_query(query_json: &Value) -> Option<DocumentId> {
        let map = query_json.as_object()?;
        if map.len() != 1 {
            return None;
        }
        let id_value = map.get("_id")?;
        if id_value
            .as_object()
            .map(|o| o.keys().any(|k| k != "$oid"))
            .unwrap_or(false)
        {
            // operator expression such as {"$in": [..]}
            return None;
        }
        DocumentId::from_value(id_value)
    }
}

impl<S: Storage> Clone for CollectionCore<S> {
    fn clone(&self) -> Self {
        CollectionCore {
            name: self.name.clone(),
            storage: Arc::clone(&self.storage),
        }
    }
}
