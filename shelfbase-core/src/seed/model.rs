// src/seed/model.rs
//! Catalog entities as stored in the `authors`, `books`, `reviews` collections

use std::collections::HashMap;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::document::{Document, DocumentId};
use crate::error::{Result, ShelfBaseError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub name: String,
    pub birth_year: i32,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub title: String,
    pub author_id: DocumentId,
    pub pages: u32,
    pub published_year: i32,
    pub genre: String,
}

/// `rating` is 1-5 in the sample data; nothing enforces it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub book_id: DocumentId,
    pub rating: u8,
    pub comment: String,
    pub reviewer_name: String,
}

/// Conversion between typed records and document fields
pub trait Record: Serialize + DeserializeOwned {
    const COLLECTION: &'static str;

    fn to_fields(&self) -> Result<HashMap<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(ShelfBaseError::Serialization(format!(
                "{} record serialized to non-object {}",
                Self::COLLECTION,
                other
            ))),
        }
    }

    fn from_document(doc: &Document) -> Result<Self> {
        let map: serde_json::Map<String, Value> = doc
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(serde_json::from_value(Value::Object(map))?)
    }
}

impl Record for Author {
    const COLLECTION: &'static str = "authors";
}

impl Record for Book {
    const COLLECTION: &'static str = "books";
}

impl Record for Review {
    const COLLECTION: &'static str = "reviews";
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_names_are_camel_case() {
        let author_id = DocumentId::generate();
        let fields = Book {
            title: "1984".to_string(),
            author_id: author_id.clone(),
            pages: 328,
            published_year: 1949,
            genre: "антиутопия".to_string(),
        }
        .to_fields()
        .unwrap();

        assert_eq!(fields["authorId"], author_id.to_value());
        assert_eq!(fields["publishedYear"], json!(1949));
        assert!(!fields.contains_key("author_id"));
    }

    #[test]
    fn test_review_from_document() {
        let book_id = DocumentId::generate();
        let doc = Document::from_value(&json!({
            "_id": {"$oid": "r1"},
            "bookId": book_id.to_value(),
            "rating": 5,
            "comment": "Потрясающая глубина персонажей.",
            "reviewerName": "Елена"
        }))
        .unwrap();

        let review = Review::from_document(&doc).unwrap();
        assert_eq!(review.book_id, book_id);
        assert_eq!(review.rating, 5);
        assert_eq!(review.reviewer_name, "Елена");
    }

    #[test]
    fn test_from_document_rejects_wrong_shape() {
        let doc = Document::from_value(&json!({"_id": 1, "name": "x"})).unwrap();
        assert!(Author::from_document(&doc).is_err());
    }
}
