// shelfbase-core/src/lib.rs
// Embedded document store plus the library catalog seeding procedure

pub mod collection_core;
pub mod database;
pub mod document;
pub mod error;
pub mod logging;
pub mod query;
pub mod seed;
pub mod storage;

// Public exports
pub use collection_core::{CollectionCore, InsertManyResult};
pub use database::DatabaseCore;
pub use document::{Document, DocumentId, ObjectId};
pub use error::{Result, ShelfBaseError};
pub use logging::LogLevel;
pub use query::Query;
pub use seed::{BookLinking, LibrarySeeder, ResetSummary, SeedOptions, SeedReport};
pub use storage::{FileStorage, MemoryStorage, Storage};
