//! End-to-end tests for the library seeding procedure
//!
//! Each test seeds a fresh database and checks the catalog through the
//! collection API only.

use std::collections::HashSet;

use serde_json::json;
use shelfbase_core::seed::{Book, BookKey, Record, Review, DATABASE_NAME};
use shelfbase_core::{
    BookLinking, DatabaseCore, DocumentId, LibrarySeeder, MemoryStorage, SeedOptions, Storage,
};
use tempfile::TempDir;

fn seeded() -> DatabaseCore<MemoryStorage> {
    let db = DatabaseCore::in_memory(DATABASE_NAME);
    LibrarySeeder::new(&db).run().unwrap();
    db
}

fn count<S: Storage>(db: &DatabaseCore<S>, collection: &str) -> u64 {
    db.collection(collection)
        .unwrap()
        .count_documents(&json!({}))
        .unwrap()
}

fn book_id<S: Storage>(db: &DatabaseCore<S>, title: &str) -> DocumentId {
    let books = db.collection("books").unwrap();
    books.find_one(&json!({"title": title})).unwrap().unwrap().id
}

fn reviews_for<S: Storage>(db: &DatabaseCore<S>, title: &str) -> Vec<Review> {
    let id = book_id(db, title);
    db.collection("reviews")
        .unwrap()
        .find(&json!({"bookId": id.to_value()}))
        .unwrap()
        .iter()
        .map(|doc| Review::from_document(doc).unwrap())
        .collect()
}

// ========== COUNTS ==========

#[test]
fn test_full_run_counts() {
    let db = seeded();

    assert_eq!(count(&db, "authors"), 4);
    assert_eq!(count(&db, "books"), 5);
    assert_eq!(count(&db, "reviews"), 5);
}

#[test]
fn test_second_run_keeps_counts_and_changes_ids() {
    let db = DatabaseCore::in_memory(DATABASE_NAME);
    let seeder = LibrarySeeder::new(&db);

    let first = seeder.run().unwrap();
    let second = seeder.run().unwrap();

    assert_eq!(count(&db, "authors"), 4);
    assert_eq!(count(&db, "books"), 5);
    assert_eq!(count(&db, "reviews"), 5);

    let reset = second.reset.unwrap();
    assert_eq!((reset.authors, reset.books, reset.reviews), (4, 5, 5));

    let first_ids: HashSet<_> = first.authors.values().cloned().collect();
    assert!(second.authors.values().all(|id| !first_ids.contains(id)));
}

// ========== REFERENTIAL INTEGRITY ==========

#[test]
fn test_every_book_references_a_captured_author() {
    let db = DatabaseCore::in_memory(DATABASE_NAME);
    let report = LibrarySeeder::new(&db).run().unwrap();
    let author_ids: HashSet<_> = report.authors.values().cloned().collect();

    let books = db.collection("books").unwrap().find(&json!({})).unwrap();
    assert_eq!(books.len(), 5);
    for doc in &books {
        let book = Book::from_document(doc).unwrap();
        assert!(author_ids.contains(&book.author_id), "{} has a dangling author", book.title);
    }
}

#[test]
fn test_every_review_references_a_reviewed_book() {
    let db = seeded();
    let allowed: HashSet<DocumentId> = ["Война и мир", "1984", "Преступление и наказание"]
        .iter()
        .map(|title| book_id(&db, title))
        .collect();

    let reviews = db.collection("reviews").unwrap().find(&json!({})).unwrap();
    assert_eq!(reviews.len(), 5);
    for doc in &reviews {
        let review = Review::from_document(doc).unwrap();
        assert!(allowed.contains(&review.book_id));
    }
}

#[test]
fn test_report_matches_store() {
    let db = DatabaseCore::in_memory(DATABASE_NAME);
    let report = LibrarySeeder::new(&db).run().unwrap();

    for key in BookKey::ALL {
        let id = report.books.get(key).unwrap();
        let found = db
            .collection("books")
            .unwrap()
            .find_one(&json!({"_id": id.to_value()}))
            .unwrap();
        assert!(found.is_some(), "book {} missing", key);
    }
    assert_eq!(report.reviews.len(), 5);
}

// ========== CONCRETE SCENARIOS ==========

#[test]
fn test_book_1984() {
    let db = seeded();
    let books = db
        .collection("books")
        .unwrap()
        .find(&json!({"title": "1984"}))
        .unwrap();

    assert_eq!(books.len(), 1);
    let book = Book::from_document(&books[0]).unwrap();
    assert_eq!(book.pages, 328);
    assert_eq!(book.published_year, 1949);
    assert_eq!(book.genre, "антиутопия");
}

#[test]
fn test_crime_and_punishment_has_one_five_star_review() {
    let db = seeded();
    let reviews = reviews_for(&db, "Преступление и наказание");

    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].rating, 5);
    assert_eq!(reviews[0].reviewer_name, "Елена");
}

#[test]
fn test_solitude_and_anna_have_no_reviews() {
    let db = seeded();
    assert!(reviews_for(&db, "Сто лет одиночества").is_empty());
    assert!(reviews_for(&db, "Анна Каренина").is_empty());
}

#[test]
fn test_war_and_1984_have_two_reviews_each() {
    let db = seeded();

    let war: Vec<u8> = reviews_for(&db, "Война и мир").iter().map(|r| r.rating).collect();
    assert_eq!(war, vec![5, 4]);

    let orwell: Vec<u8> = reviews_for(&db, "1984").iter().map(|r| r.rating).collect();
    assert_eq!(orwell, vec![5, 3]);
}

#[test]
fn test_tolstoy_wrote_two_books() {
    let db = seeded();
    let tolstoy = db
        .collection("authors")
        .unwrap()
        .find_one(&json!({"name": "Лев Толстой"}))
        .unwrap()
        .unwrap();

    let books = db
        .collection("books")
        .unwrap()
        .find(&json!({"authorId": tolstoy.get_id_value()}))
        .unwrap();
    let titles: Vec<&str> = books.iter().filter_map(|b| b.get_str("title")).collect();
    assert_eq!(titles, vec!["Война и мир", "Анна Каренина"]);
}

// ========== LINKING STRATEGIES ==========

#[test]
fn test_resolve_by_title_gives_same_links_on_fresh_store() {
    let db = DatabaseCore::in_memory(DATABASE_NAME);
    let options = SeedOptions {
        reset: true,
        linking: BookLinking::ResolveByTitle,
    };
    let report = LibrarySeeder::with_options(&db, options).run().unwrap();

    assert_eq!(report.books.len(), 5);
    assert_eq!(report.review_targets.len(), 3);
    for (key, _) in BookKey::REVIEWED {
        assert_eq!(report.review_targets.get(key).unwrap(), report.books.get(key).unwrap());
    }
    assert_eq!(reviews_for(&db, "1984").len(), 2);
    assert_eq!(reviews_for(&db, "Преступление и наказание").len(), 1);
    assert!(reviews_for(&db, "Сто лет одиночества").is_empty());
}

#[test]
fn test_without_reset_records_accumulate() {
    let db = seeded();
    let options = SeedOptions {
        reset: false,
        linking: BookLinking::Carried,
    };
    let report = LibrarySeeder::with_options(&db, options).run().unwrap();

    assert!(report.reset.is_none());
    assert_eq!(count(&db, "authors"), 8);
    assert_eq!(count(&db, "books"), 10);
    assert_eq!(count(&db, "reviews"), 10);
}

#[test]
fn test_resolve_by_title_without_reset_takes_last_duplicate() {
    let db = seeded();
    let options = SeedOptions {
        reset: false,
        linking: BookLinking::ResolveByTitle,
    };
    let report = LibrarySeeder::with_options(&db, options).run().unwrap();

    let copies = db
        .collection("books")
        .unwrap()
        .find(&json!({"title": "1984"}))
        .unwrap();
    assert_eq!(copies.len(), 2);

    let latest = &copies[1].id;
    assert_eq!(report.books.get(BookKey::Orwell).unwrap(), latest);
    assert_eq!(report.review_targets.get(BookKey::Orwell).unwrap(), latest);

    // first run linked the older copy, this run the newer one
    let reviews = db.collection("reviews").unwrap();
    for copy in &copies {
        let linked = reviews
            .count_documents(&json!({"bookId": copy.id.to_value()}))
            .unwrap();
        assert_eq!(linked, 2);
    }
}

// ========== FILE STORE ==========

#[test]
fn test_seeded_file_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("library.shelf");

    let report = {
        let db = DatabaseCore::open(&path).unwrap();
        let report = LibrarySeeder::new(&db).run().unwrap();
        db.close().unwrap();
        report
    };

    let db = DatabaseCore::open(&path).unwrap();
    assert_eq!(db.name(), "library");
    assert_eq!(count(&db, "authors"), 4);
    assert_eq!(count(&db, "books"), 5);
    assert_eq!(count(&db, "reviews"), 5);

    let orwell = report.authors.get(shelfbase_core::seed::AuthorKey::Orwell).unwrap();
    let book = db
        .collection("books")
        .unwrap()
        .find_one(&json!({"authorId": orwell.to_value()}))
        .unwrap()
        .unwrap();
    assert_eq!(book.get_str("title"), Some("1984"));
    assert!(matches!(book.get_ref("authorId"), Some(DocumentId::ObjectId(_))));

    assert_eq!(reviews_for(&db, "Преступление и наказание").len(), 1);
}

#[test]
fn test_reseeding_file_store_keeps_counts() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("library.shelf");

    for _ in 0..2 {
        let db = DatabaseCore::open(&path).unwrap();
        LibrarySeeder::new(&db).run().unwrap();
    }

    let db = DatabaseCore::open(&path).unwrap();
    assert_eq!(count(&db, "authors"), 4);
    assert_eq!(count(&db, "books"), 5);
    assert_eq!(count(&db, "reviews"), 5);
}
