// src/document.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// MongoDB-like document
///
/// `_id` lives in `id` only; `fields` never contains it. Serialized form is
/// a flat JSON object `{"_id": ..., <fields>...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: DocumentId,

    #[serde(flatten)]
    pub fields: HashMap<String, Value>,
}

/// Store-generated identifier, serialized as `{"$oid": "<uuid>"}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectId {
    #[serde(rename = "$oid")]
    oid: String,
}

impl ObjectId {
    pub fn new() -> Self {
        ObjectId {
            oid: Uuid::new_v4().simple().to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.oid
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

/// Document ID types
///
/// Untagged so ids appear as plain values inside documents. `ObjectId`
/// carries its own `$oid` wrapper, which keeps it distinguishable from a
/// `String` id after a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentId {
    Int(i64),
    ObjectId(ObjectId),
    String(String),
}

impl DocumentId {
    /// Fresh store-generated id
    pub fn generate() -> Self {
        DocumentId::ObjectId(ObjectId::new())
    }

    /// JSON form used when the id is stored as a reference in another document
    pub fn to_value(&self) -> Value {
        match self {
            DocumentId::Int(i) => Value::from(*i),
            DocumentId::String(s) => Value::String(s.clone()),
            DocumentId::ObjectId(oid) => {
                let mut map = serde_json::Map::new();
                map.insert("$oid".to_string(), Value::String(oid.oid.clone()));
                Value::Object(map)
            }
        }
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentId::Int(i) => write!(f, "{}", i),
            DocumentId::String(s) => write!(f, "\"{}\"", s),
            DocumentId::ObjectId(oid) => write!(f, "ObjectId(\"{}\")", oid.oid),
        }
    }
}

impl Document {
    pub fn new(id: DocumentId, fields: HashMap<String, Value>) -> Self {
        Document { id, fields }
    }

    /// Build a document from a JSON object, taking `_id` out of the fields
    pub fn from_value(value: &Value) -> serde_json::Result<Self> {
        serde_json::from_value(value.clone())
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Flat JSON object including `_id`
    pub fn to_value(&self) -> Value {
        let mut map = serde_json::Map::with_capacity(self.fields.len() + 1);
        map.insert("_id".to_string(), self.id.to_value());
        for (key, value) in &self.fields {
            map.insert(key.clone(), value.clone());
        }
        Value::Object(map)
    }

    /// Field lookup with dot notation (`"address.city"`, `"tags.0"`).
    ///
    /// `_id` is not in `fields`; match against it with [`Document::get_id_value`].
    pub fn get(&self, field: &str) -> Option<&Value> {
        let mut parts = field.split('.');
        let first = parts.next().filter(|p| !p.is_empty())?;
        let mut value = self.fields.get(first)?;
        for part in parts {
            value = match value {
                Value::Object(map) => map.get(part)?,
                Value::Array(arr) => arr.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(value)
    }

    pub fn get_id_value(&self) -> Value {
        self.id.to_value()
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(Value::as_i64)
    }

    /// Read a reference field back as a `DocumentId`
    pub fn get_ref(&self, field: &str) -> Option<DocumentId> {
        self.get(field).and_then(DocumentId::from_value)
    }

    pub fn set(&mut self, field: String, value: Value) {
        self.fields.insert(field, value);
    }
}
