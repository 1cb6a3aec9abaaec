// src/seed/mod.rs
//! Library catalog seeding
//!
//! Four strictly ordered stages against the `library` database:
//!
//! ```text
//! reset         delete_many({}) on authors, books, reviews
//! load_authors  insert 4 authors        -> AuthorIds
//! load_books    insert 5 books          -> BookIds     (needs AuthorIds)
//! load_reviews  insert_many 5 reviews                  (needs BookIds)
//! ```
//!
//! Any store error aborts the run where it happened; nothing is rolled back.
//! Re-running is safe because `reset` clears what a failed run left behind.

pub mod fixtures;
pub mod ids;
pub mod model;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

use crate::collection_core::CollectionCore;
use crate::database::DatabaseCore;
use crate::document::DocumentId;
use crate::error::Result;
use crate::storage::Storage;

pub use ids::{AuthorIds, AuthorKey, BookIds, BookKey, IdMap, SeedKey};
pub use model::{Author, Book, Record, Review};

/// Database the catalog lives in
pub const DATABASE_NAME: &str = "library";

/// How review targets get their book ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BookLinking {
    /// Use the ids captured while inserting books
    #[default]
    Carried,
    /// Re-read every book and match the reviewed titles. When a title occurs
    /// more than once the last one in scan order wins; that only happens when
    /// reset was skipped.
    ResolveByTitle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedOptions {
    /// Clear the three collections first
    pub reset: bool,
    pub linking: BookLinking,
}

impl Default for SeedOptions {
    fn default() -> Self {
        SeedOptions {
            reset: true,
            linking: BookLinking::Carried,
        }
    }
}

/// Documents removed by the reset stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResetSummary {
    pub authors: u64,
    pub books: u64,
    pub reviews: u64,
}

impl ResetSummary {
    pub fn total(&self) -> u64 {
        self.authors + self.books + self.reviews
    }
}

/// Outcome of a full run
#[derive(Debug, Clone, Serialize)]
pub struct SeedReport {
    pub database: String,
    pub linking: BookLinking,
    /// `None` when reset was skipped
    pub reset: Option<ResetSummary>,
    pub authors: AuthorIds,
    pub books: BookIds,
    /// Book ids the reviews were linked against
    pub review_targets: BookIds,
    pub reviews: Vec<DocumentId>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Runs the seeding stages against one database
///
/// Borrows the database for its whole lifetime; the caller owns opening and
/// closing it.
pub struct LibrarySeeder<'db, S: Storage> {
    db: &'db DatabaseCore<S>,
    options: SeedOptions,
}

impl<'db, S: Storage> LibrarySeeder<'db, S> {
    pub fn new(db: &'db DatabaseCore<S>) -> Self {
        Self::with_options(db, SeedOptions::default())
    }

    pub fn with_options(db: &'db DatabaseCore<S>, options: SeedOptions) -> Self {
        LibrarySeeder { db, options }
    }

    /// All four stages in order
    pub fn run(&self) -> Result<SeedReport> {
        let started_at = Utc::now();
        let database = self.db.name();
        info!(database = %database, linking = ?self.options.linking, "seeding library catalog");

        let reset = if self.options.reset {
            Some(self.reset()?)
        } else {
            info!("reset skipped, appending to existing records");
            None
        };

        let authors = self.load_authors()?;
        let books = self.load_books(&authors)?;

        let review_targets = match self.options.linking {
            BookLinking::Carried => books.clone(),
            BookLinking::ResolveByTitle => self.resolve_books_by_title()?,
        };

        let reviews = self.load_reviews(&review_targets)?;

        let finished_at = Utc::now();
        info!(
            authors = authors.len(),
            books = books.len(),
            reviews = reviews.len(),
            elapsed_ms = (finished_at - started_at).num_milliseconds(),
            "seeding finished"
        );

        Ok(SeedReport {
            database,
            linking: self.options.linking,
            reset,
            authors,
            books,
            review_targets,
            reviews,
            started_at,
            finished_at,
        })
    }

    // ========== STAGES ==========

    /// Delete every document in authors, books and reviews
    pub fn reset(&self) -> Result<ResetSummary> {
        let everything = json!({});
        let summary = ResetSummary {
            authors: self.collection::<Author>()?.delete_many(&everything)?,
            books: self.collection::<Book>()?.delete_many(&everything)?,
            reviews: self.collection::<Review>()?.delete_many(&everything)?,
        };

        info!(
            authors = summary.authors,
            books = summary.books,
            reviews = summary.reviews,
            "reset complete"
        );
        Ok(summary)
    }

    /// Insert the authors one by one, keeping each generated id
    pub fn load_authors(&self) -> Result<AuthorIds> {
        let authors = self.collection::<Author>()?;
        let mut ids = AuthorIds::new();

        for (key, author) in fixtures::authors() {
            let id = authors.insert_one(author.to_fields()?)?;
            debug!(key = %key, id = %id, name = %author.name, "author inserted");
            ids.insert(key, id);
        }

        info!(count = ids.len(), "authors loaded");
        Ok(ids)
    }

    /// Insert the books one by one, each linked to its author's id
    pub fn load_books(&self, authors: &AuthorIds) -> Result<BookIds> {
        let books = self.collection::<Book>()?;
        let mut ids = BookIds::new();

        for (key, book) in fixtures::books(authors)? {
            let id = books.insert_one(book.to_fields()?)?;
            debug!(key = %key, id = %id, title = %book.title, "book inserted");
            ids.insert(key, id);
        }

        info!(count = ids.len(), "books loaded");
        Ok(ids)
    }

    /// Ids of the reviewed books found by scanning the whole `books`
    /// collection for their titles. Other titles are ignored; for a repeated
    /// title the last match wins.
    pub fn resolve_books_by_title(&self) -> Result<BookIds> {
        let mut ids = BookIds::new();

        for doc in self.collection::<Book>()?.find(&json!({}))? {
            let key = match doc.get_str("title").and_then(BookKey::reviewed_by_title) {
                Some(key) => key,
                None => continue,
            };
            if let Some(previous) = ids.insert(key, doc.id.clone()) {
                debug!(key = %key, previous = %previous, id = %doc.id, "title seen again, keeping later id");
            }
        }

        debug!(resolved = ids.len(), "book titles resolved");
        Ok(ids)
    }

    /// Bulk-insert the reviews against the given book ids
    pub fn load_reviews(&self, books: &BookIds) -> Result<Vec<DocumentId>> {
        for (key, title) in BookKey::REVIEWED {
            let id = books.get(key)?;
            debug!(key = %key, title, id = %id, "review target");
        }

        let reviews = fixtures::reviews(books)?
            .iter()
            .map(|review| review.to_fields())
            .collect::<Result<Vec<_>>>()?;

        let result = self.collection::<Review>()?.insert_many(reviews)?;

        info!(count = result.inserted_count, "reviews loaded");
        Ok(result.inserted_ids)
    }

    fn collection<R: Record>(&self) -> Result<CollectionCore<S>> {
        self.db.collection(R::COLLECTION)
    }
}
