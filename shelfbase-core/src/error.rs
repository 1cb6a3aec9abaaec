// shelfbase-core/src/error.rs
// Error types for the document store and the seeding procedure

use thiserror::Error;

/// Every failure the store or the seeder can report.
///
/// Seeding does not classify these: any variant aborts the procedure.
#[derive(Error, Debug)]
pub enum ShelfBaseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Collection already exists: {0}")]
    CollectionExists(String),

    #[error("Duplicate _id {id} in collection '{collection}'")]
    DuplicateKey { collection: String, id: String },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Corrupted database file: {0}")]
    Corruption(String),

    /// A linking step asked for an identifier that was never captured
    #[error("No identifier captured for {kind} '{key}'")]
    MissingReference { kind: &'static str, key: String },
}

impl From<serde_json::Error> for ShelfBaseError {
    fn from(err: serde_json::Error) -> Self {
        ShelfBaseError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ShelfBaseError>;
