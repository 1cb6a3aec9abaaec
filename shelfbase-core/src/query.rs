// src/query.rs
//! MongoDB-like filter matching
//!
//! Supported filter shapes:
//!
//! ```text
//! {}                                   matches everything
//! {"title": "1984"}                    equality (dot paths allowed)
//! {"_id": {"$oid": "..."}}             equality against an id / reference
//! {"pages": {"$gte": 300, "$lt": 900}} comparison operators
//! {"bookId": {"$in": [..]}}            membership
//! {"$and": [..]} / {"$or": [..]}       logical combinators
//! ```
//!
//! An object value is an operator expression only when every key is a known
//! operator. `{"$oid": ..}` is a literal: it is how references are stored.

use std::cmp::Ordering;

use serde_json::Value;

use crate::document::Document;
use crate::error::{Result, ShelfBaseError};

const FIELD_OPERATORS: &[&str] = &[
    "$eq", "$ne", "$gt", "$gte", "$lt", "$lte", "$in", "$nin", "$exists",
];
const LOGICAL_OPERATORS: &[&str] = &["$and", "$or"];

/// Parsed filter, validated once and matched many times
#[derive(Debug, Clone)]
pub struct Query {
    json: Value,
}

impl Query {
    /// Validate and wrap a JSON filter
    pub fn from_json(json: &Value) -> Result<Self> {
        validate_filter(json)?;
        Ok(Query { json: json.clone() })
    }

    pub fn matches(&self, document: &Document) -> bool {
        matches_filter(document, &self.json)
    }

    /// True for `{}`: callers can skip matching entirely
    pub fn matches_all(&self) -> bool {
        self.json.as_object().map(|m| m.is_empty()).unwrap_or(false)
    }
}

fn validate_filter(filter: &Value) -> Result<()> {
    let map = filter
        .as_object()
        .ok_or_else(|| ShelfBaseError::InvalidQuery("filter must be an object".to_string()))?;

    for (key, condition) in map {
        if LOGICAL_OPERATORS.contains(&key.as_str()) {
            let clauses = condition.as_array().ok_or_else(|| {
                ShelfBaseError::InvalidQuery(format!("{} expects an array of filters", key))
            })?;
            for clause in clauses {
                validate_filter(clause)?;
            }
        } else if key.starts_with('$') {
            return Err(ShelfBaseError::InvalidQuery(format!(
                "unknown top-level operator {}",
                key
            )));
        } else if let Value::Object(ops) = condition {
            validate_condition(key, ops)?;
        }
    }
    Ok(())
}

fn validate_condition(field: &str, ops: &serde_json::Map<String, Value>) -> Result<()> {
    if !is_operator_expression(ops) {
        // Literal object, but reject operator typos such as {"$gtt": 1}
        if let Some(bad) = ops
            .keys()
            .find(|k| k.starts_with('$') && k.as_str() != "$oid")
        {
            return Err(ShelfBaseError::InvalidQuery(format!(
                "unknown operator {} on field '{}'",
                bad, field
            )));
        }
        return Ok(());
    }

    for (op, operand) in ops {
        if matches!(op.as_str(), "$in" | "$nin") && !operand.is_array() {
            return Err(ShelfBaseError::InvalidQuery(format!(
                "{} on field '{}' expects an array",
                op, field
            )));
        }
    }
    Ok(())
}

fn is_operator_expression(ops: &serde_json::Map<String, Value>) -> bool {
    !ops.is_empty() && ops.keys().all(|k| FIELD_OPERATORS.contains(&k.as_str()))
}

/// Match a document against a JSON filter.
///
/// Invalid filters never match; use [`Query::from_json`] to surface the error.
pub fn matches_filter(document: &Document, filter: &Value) -> bool {
    let map = match filter.as_object() {
        Some(map) => map,
        None => return false,
    };

    map.iter().all(|(key, condition)| match key.as_str() {
        "$and" => condition
            .as_array()
            .map(|clauses| clauses.iter().all(|c| matches_filter(document, c)))
            .unwrap_or(false),
        "$or" => condition
            .as_array()
            .map(|clauses| clauses.iter().any(|c| matches_filter(document, c)))
            .unwrap_or(false),
        "_id" => {
            let id = document.get_id_value();
            matches_condition(Some(&id), condition)
        }
        field => matches_condition(document.get(field), condition),
    })
}

fn matches_condition(actual: Option<&Value>, condition: &Value) -> bool {
    match condition {
        Value::Object(ops) if is_operator_expression(ops) => ops
            .iter()
            .all(|(op, operand)| apply_operator(op, actual, operand)),
        literal => actual.map(|v| values_equal(v, literal)).unwrap_or(false),
    }
}

fn apply_operator(op: &str, actual: Option<&Value>, operand: &Value) -> bool {
    match op {
        "$eq" => actual.map(|v| values_equal(v, operand)).unwrap_or(false),
        "$ne" => !actual.map(|v| values_equal(v, operand)).unwrap_or(false),
        "$gt" => compare(actual, operand) == Some(Ordering::Greater),
        "$gte" => matches!(
            compare(actual, operand),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        "$lt" => compare(actual, operand) == Some(Ordering::Less),
        "$lte" => matches!(
            compare(actual, operand),
            Some(Ordering::Less | Ordering::Equal)
        ),
        "$in" => match (actual, operand.as_array()) {
            (Some(v), Some(candidates)) => candidates.iter().any(|c| values_equal(v, c)),
            _ => false,
        },
        "$nin" => match (actual, operand.as_array()) {
            (Some(v), Some(candidates)) => !candidates.iter().any(|c| values_equal(v, c)),
            (None, Some(_)) => true,
            _ => false,
        },
        "$exists" => actual.is_some() == operand.as_bool().unwrap_or(true),
        _ => false,
    }
}

fn compare(actual: Option<&Value>, operand: &Value) -> Option<Ordering> {
    compare_values(actual?, operand)
}

/// Ordering between JSON scalars of the same kind; numbers compare by value
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(n1), Value::Number(n2)) => n1.as_f64()?.partial_cmp(&n2.as_f64()?),
        (Value::String(s1), Value::String(s2)) => Some(s1.cmp(s2)),
        (Value::Bool(b1), Value::Bool(b2)) => Some(b1.cmp(b2)),
        _ => None,
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => compare_values(a, b) == Some(Ordering::Equal),
        _ => a == b,
    }
}
