// storage/file_storage.rs
//! File-backed storage: a `MemoryStorage` persisted as one JSON snapshot
//!
//! ```text
//! FileStorage (Storage trait implementation)
//!      ↓
//! MemoryStorage (all reads and writes)
//!      ↓ flush() when dirty
//! <path>  {"magic": "SHELFBSE", "version": 1, "database": .., "collections": [..]}
//! ```
//!
//! A flush writes `<path>.tmp` and renames it over `<path>`, so a crash
//! mid-write leaves the previous snapshot intact.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::document::{Document, DocumentId};
use crate::error::{Result, ShelfBaseError};
use crate::storage::{CollectionMeta, MemoryStorage, Storage};

const MAGIC: &str = "SHELFBSE";
const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    magic: &'a str,
    version: u32,
    database: &'a str,
    saved_at: DateTime<Utc>,
    collections: Vec<CollectionRef<'a>>,
}

#[derive(Serialize)]
struct CollectionRef<'a> {
    meta: &'a CollectionMeta,
    documents: &'a [Document],
}

#[derive(Deserialize)]
struct Snapshot {
    magic: String,
    version: u32,
    database: String,
    collections: Vec<CollectionSnapshot>,
}

#[derive(Deserialize)]
struct CollectionSnapshot {
    meta: CollectionMeta,
    documents: Vec<Document>,
}

/// File-based storage backend
pub struct FileStorage {
    path: PathBuf,
    inner: MemoryStorage,
    dirty: bool,
}

impl FileStorage {
    /// Open an existing snapshot, or start an empty database named after the
    /// file stem (`library.shelf` -> `library`) if the file does not exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let inner = if path.exists() {
            let bytes = fs::read(&path)?;
            let snapshot: Snapshot = serde_json::from_slice(&bytes).map_err(|e| {
                ShelfBaseError::Corruption(format!("{}: {}", path.display(), e))
            })?;

            if snapshot.magic != MAGIC {
                return Err(ShelfBaseError::Corruption(format!(
                    "{}: invalid magic '{}'",
                    path.display(),
                    snapshot.magic
                )));
            }
            if snapshot.version != FORMAT_VERSION {
                return Err(ShelfBaseError::Corruption(format!(
                    "{}: unsupported format version {}",
                    path.display(),
                    snapshot.version
                )));
            }

            debug!(
                path = %path.display(),
                database = %snapshot.database,
                collections = snapshot.collections.len(),
                "loaded snapshot"
            );

            MemoryStorage::from_parts(
                &snapshot.database,
                snapshot
                    .collections
                    .into_iter()
                    .map(|c| (c.meta, c.documents))
                    .collect(),
            )
        } else {
            let database = path
                .file_stem()
                .and_then(|s| s.to_str())
                .filter(|s| !s.is_empty())
                .unwrap_or("library");
            debug!(path = %path.display(), database, "creating new database");
            MemoryStorage::new(database)
        };

        Ok(FileStorage {
            path,
            inner,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unflushed changes pending
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn write_snapshot(&self) -> Result<()> {
        let snapshot = SnapshotRef {
            magic: MAGIC,
            version: FORMAT_VERSION,
            database: self.inner.database_name(),
            saved_at: Utc::now(),
            collections: self
                .inner
                .iter_collections()
                .into_iter()
                .map(|(meta, documents)| CollectionRef { meta, documents })
                .collect(),
        };
        let bytes = serde_json::to_vec_pretty(&snapshot)?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        if let Err(e) = fs::write(&tmp, bytes).and_then(|_| fs::rename(&tmp, &self.path)) {
            if tmp.exists() {
                if let Err(cleanup) = fs::remove_file(&tmp) {
                    warn!(path = %tmp.display(), error = %cleanup, "failed to remove temp snapshot");
                }
            }
            return Err(e.into());
        }
        Ok(())
    }
}

impl Storage for FileStorage {
    fn write_document(&mut self, collection: &str, doc: Document) -> Result<()> {
        self.inner.write_document(collection, doc)?;
        self.dirty = true;
        Ok(())
    }

    fn read_document(&self, collection: &str, id: &DocumentId) -> Result<Option<Document>> {
        self.inner.read_document(collection, id)
    }

    fn scan_documents(&self, collection: &str) -> Result<Vec<Document>> {
        self.inner.scan_documents(collection)
    }

    fn delete_documents(&mut self, collection: &str, ids: &[DocumentId]) -> Result<u64> {
        let removed = self.inner.delete_documents(collection, ids)?;
        if removed > 0 {
            self.dirty = true;
        }
        Ok(removed)
    }

    fn create_collection(&mut self, name: &str) -> Result<()> {
        self.inner.create_collection(name)?;
        self.dirty = true;
        Ok(())
    }

    fn drop_collection(&mut self, name: &str) -> Result<()> {
        self.inner.drop_collection(name)?;
        self.dirty = true;
        Ok(())
    }

    fn list_collections(&self) -> Vec<String> {
        self.inner.list_collections()
    }

    fn database_name(&self) -> &str {
        self.inner.database_name()
    }

    fn get_collection_meta(&self, name: &str) -> Option<&CollectionMeta> {
        self.inner.get_collection_meta(name)
    }

    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        self.write_snapshot()?;
        self.dirty = false;
        debug!(path = %self.path.display(), "snapshot flushed");
        Ok(())
    }
}
