// shelfbase-core/src/database.rs
// Named database: owns the storage and hands out collection handles

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::collection_core::CollectionCore;
use crate::error::Result;
use crate::storage::{FileStorage, MemoryStorage, Storage};

/// Database handle
///
/// Generic over the storage backend:
/// - `DatabaseCore<FileStorage>` - snapshot file, see [`DatabaseCore::open`]
/// - `DatabaseCore<MemoryStorage>` - ephemeral, see [`DatabaseCore::in_memory`]
///
/// Dropping the handle flushes pending writes. Use [`DatabaseCore::close`]
/// to see a flush error instead of having it logged.
pub struct DatabaseCore<S: Storage> {
    storage: Arc<RwLock<S>>,
}

impl DatabaseCore<FileStorage> {
    /// Open or create a file-backed database
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let storage = FileStorage::open(path)?;
        debug!(
            path = %storage.path().display(),
            database = storage.database_name(),
            "opened database"
        );
        Ok(Self::with_storage(storage))
    }
}

impl DatabaseCore<MemoryStorage> {
    pub fn in_memory(name: &str) -> Self {
        Self::with_storage(MemoryStorage::new(name))
    }
}

impl<S: Storage> DatabaseCore<S> {
    pub fn with_storage(storage: S) -> Self {
        DatabaseCore {
            storage: Arc::new(RwLock::new(storage)),
        }
    }

    pub fn name(&self) -> String {
        self.storage.read().database_name().to_string()
    }

    /// Collection handle, created on first use
    pub fn collection(&self, name: &str) -> Result<CollectionCore<S>> {
        CollectionCore::new(name.to_string(), Arc::clone(&self.storage))
    }

    pub fn list_collections(&self) -> Vec<String> {
        self.storage.read().list_collections()
    }

    pub fn drop_collection(&self, name: &str) -> Result<()> {
        self.storage.write().drop_collection(name)
    }

    /// Per-collection document counts
    pub fn stats(&self) -> Value {
        let storage = self.storage.read();
        let collections: serde_json::Map<String, Value> = storage
            .list_collections()
            .into_iter()
            .filter_map(|name| {
                let meta = storage.get_collection_meta(&name)?;
                Some((
                    name,
                    json!({
                        "document_count": meta.document_count,
                        "updated_at": meta.updated_at.to_rfc3339(),
                    }),
                ))
            })
            .collect();

        json!({
            "database": storage.database_name(),
            "collections": collections,
        })
    }

    pub fn flush(&self) -> Result<()> {
        self.storage.write().flush()
    }

    /// Flush and release the handle, reporting a flush failure
    pub fn close(self) -> Result<()> {
        self.flush()
        // Drop runs next and finds nothing dirty
    }
}

impl<S: Storage> Drop for DatabaseCore<S> {
    fn drop(&mut self) {
        if let Err(e) = self.storage.write().flush() {
            warn!(error = %e, "flush on drop failed");
        }
    }
}
