// src/seed/ids.rs
//! Logical record keys and the identifiers the store generated for them

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::document::DocumentId;
use crate::error::{Result, ShelfBaseError};

/// Something an `IdMap` can be keyed by
pub trait SeedKey: Copy + Ord + fmt::Display {
    /// Entity kind, for error messages
    const KIND: &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AuthorKey {
    Tolstoy,
    Dostoevsky,
    Orwell,
    Garcia,
}

impl AuthorKey {
    pub const ALL: [AuthorKey; 4] = [
        AuthorKey::Tolstoy,
        AuthorKey::Dostoevsky,
        AuthorKey::Orwell,
        AuthorKey::Garcia,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorKey::Tolstoy => "tolstoy",
            AuthorKey::Dostoevsky => "dostoevsky",
            AuthorKey::Orwell => "orwell",
            AuthorKey::Garcia => "garcia",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BookKey {
    War,
    Anna,
    Crime,
    Orwell,
    Solitude,
}

impl BookKey {
    pub const ALL: [BookKey; 5] = [
        BookKey::War,
        BookKey::Anna,
        BookKey::Crime,
        BookKey::Orwell,
        BookKey::Solitude,
    ];

    /// Books that receive reviews, with the title used to find them
    pub const REVIEWED: [(BookKey, &'static str); 3] = [
        (BookKey::War, "Война и мир"),
        (BookKey::Orwell, "1984"),
        (BookKey::Crime, "Преступление и наказание"),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookKey::War => "war",
            BookKey::Anna => "anna",
            BookKey::Crime => "crime",
            BookKey::Orwell => "orwell",
            BookKey::Solitude => "solitude",
        }
    }

    /// Key of a reviewed book by its exact title
    pub fn reviewed_by_title(title: &str) -> Option<BookKey> {
        Self::REVIEWED
            .iter()
            .find(|(_, t)| *t == title)
            .map(|(key, _)| *key)
    }
}

impl fmt::Display for AuthorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for BookKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SeedKey for AuthorKey {
    const KIND: &'static str = "author";
}

impl SeedKey for BookKey {
    const KIND: &'static str = "book";
}

/// Logical key -> generated id
///
/// Later inserts for the same key overwrite earlier ones.
#[derive(Debug, Clone, PartialEq)]
pub struct IdMap<K: SeedKey> {
    ids: BTreeMap<K, DocumentId>,
}

pub type AuthorIds = IdMap<AuthorKey>;
pub type BookIds = IdMap<BookKey>;

impl<K: SeedKey> IdMap<K> {
    pub fn new() -> Self {
        IdMap {
            ids: BTreeMap::new(),
        }
    }

    /// Record an id, returning the one it replaced
    pub fn insert(&mut self, key: K, id: DocumentId) -> Option<DocumentId> {
        self.ids.insert(key, id)
    }

    /// Id captured for `key`; an error if none was
    pub fn get(&self, key: K) -> Result<&DocumentId> {
        self.ids
            .get(&key)
            .ok_or_else(|| ShelfBaseError::MissingReference {
                kind: K::KIND,
                key: key.to_string(),
            })
    }

    pub fn contains(&self, key: K) -> bool {
        self.ids.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &DocumentId> {
        self.ids.values()
    }
}

impl<K: SeedKey> Default for IdMap<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializes as `{"<key>": <id>, ...}`
impl<K: SeedKey> Serialize for IdMap<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.ids.iter().map(|(k, v)| (k.to_string(), v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_an_error() {
        let ids = BookIds::new();
        let err = ids.get(BookKey::Crime).unwrap_err();
        assert!(matches!(
            err,
            ShelfBaseError::MissingReference { kind: "book", .. }
        ));
    }

    #[test]
    fn test_insert_overwrites() {
        let mut ids = AuthorIds::new();
        let first = DocumentId::generate();
        let second = DocumentId::generate();

        assert!(ids.insert(AuthorKey::Orwell, first.clone()).is_none());
        assert_eq!(ids.insert(AuthorKey::Orwell, second.clone()), Some(first));
        assert_eq!(ids.get(AuthorKey::Orwell).unwrap(), &second);
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn test_reviewed_by_title() {
        assert_eq!(BookKey::reviewed_by_title("1984"), Some(BookKey::Orwell));
        assert_eq!(
            BookKey::reviewed_by_title("Война и мир"),
            Some(BookKey::War)
        );
        assert_eq!(BookKey::reviewed_by_title("Анна Каренина"), None);
        assert_eq!(BookKey::reviewed_by_title("Сто лет одиночества"), None);
    }

    #[test]
    fn test_serialize_by_key_name() {
        let mut ids = AuthorIds::new();
        ids.insert(AuthorKey::Garcia, DocumentId::Int(4));
        let value = serde_json::to_value(&ids).unwrap();
        assert_eq!(value, serde_json::json!({"garcia": 4}));
    }
}
