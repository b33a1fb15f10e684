//! Entity schema and seed item loading.
//!
//! Schemas are JSON documents deserialized straight into [`EntitySchema`];
//! seed files are JSON arrays of flat objects.

use std::path::Path;

use dynodm::{EntitySchema, Value, ValueMap};

use super::error::{DynamodbError, Result};

/// Reads and validates an entity schema file.
pub fn load_schema(path: &Path) -> Result<EntitySchema> {
    let contents = std::fs::read_to_string(path)?;
    parse_schema(&contents).map_err(|message| DynamodbError::InvalidFile {
        path: path.to_path_buf(),
        message,
    })
}

/// Reads a seed file.
pub fn load_items(path: &Path) -> Result<Vec<ValueMap>> {
    let contents = std::fs::read_to_string(path)?;
    parse_items(&contents).map_err(|message| DynamodbError::InvalidFile {
        path: path.to_path_buf(),
        message,
    })
}

fn parse_schema(contents: &str) -> std::result::Result<EntitySchema, String> {
    serde_json::from_str(contents).map_err(|e| e.to_string())
}

/// Parses a JSON array of objects into value maps. Nested arrays and objects
/// have no scalar representation and are rejected.
fn parse_items(contents: &str) -> std::result::Result<Vec<ValueMap>, String> {
    let objects: Vec<serde_json::Map<String, serde_json::Value>> =
        serde_json::from_str(contents).map_err(|e| e.to_string())?;

    objects
        .into_iter()
        .enumerate()
        .map(|(position, object)| {
            object
                .into_iter()
                .map(|(name, json)| match Value::from_json(json) {
                    Some(value) => Ok((name, value)),
                    None => Err(format!(
                        "item {position}: field `{name}` holds a nested value"
                    )),
                })
                .collect()
        })
        .collect()
}
