// src/storage/mod.rs
// Storage backends and per-collection metadata

mod file_storage;
mod memory_storage;
mod traits;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;
pub use traits::Storage;

/// Collection metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionMeta {
    pub name: String,
    /// Live documents
    pub document_count: u64,
    pub created_at: DateTime<Utc>,
    /// Last insert or delete
    pub updated_at: DateTime<Utc>,
}

impl CollectionMeta {
    pub fn new(name: &str) -> Self {
        let now = Utc::now();
        CollectionMeta {
            name: name.to_string(),
            document_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
