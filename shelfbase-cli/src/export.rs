// Export: dump collections to a JSON file
// Format: { "collection_name": [documents...], ... }

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::{json, Map, Value};
use shelfbase_core::{DatabaseCore, Storage};

/// Every collection (or just `collection_filter`) as arrays of flat documents
pub fn collect_collections<S: Storage>(
    db: &DatabaseCore<S>,
    collection_filter: Option<&str>,
) -> Result<Map<String, Value>> {
    let mut output = Map::new();

    for coll_name in db.list_collections() {
        if let Some(filter) = collection_filter {
            if coll_name != filter {
                continue;
            }
        }

        let coll = db
            .collection(&coll_name)
            .with_context(|| format!("Failed to get collection: {}", coll_name))?;

        let docs = coll
            .find(&json!({}))
            .with_context(|| format!("Failed to query collection: {}", coll_name))?;

        println!("Exporting {} documents from '{}'", docs.len(), coll_name);
        output.insert(
            coll_name,
            Value::Array(docs.iter().map(|doc| doc.to_value()).collect()),
        );
    }

    Ok(output)
}

/// Export an existing database file; returns the number of documents written
pub fn export_data(file: &Path, db_path: &Path, collection_filter: Option<&str>) -> Result<usize> {
    // opening a missing path would silently create an empty database
    if !db_path.exists() {
        bail!("Database file not found: {}", db_path.display());
    }

    let db = DatabaseCore::open(db_path)
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;

    let output = collect_collections(&db, collection_filter)?;
    let total_docs = output
        .values()
        .filter_map(Value::as_array)
        .map(Vec::len)
        .sum();

    let json =
        serde_json::to_string_pretty(&output).with_context(|| "Failed to serialize to JSON")?;

    fs::write(file, json)
        .with_context(|| format!("Failed to write to file: {}", file.display()))?;

    Ok(total_docs)
}
