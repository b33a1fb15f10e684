use crate::schema::EntitySchema;

use super::attribute::is_omitted;
use super::{marshal, CodecError, Item, Result, ValueMap};

/// Extracts and marshals the identifier fields of an entity.
///
/// The hash key comes first, then the range key if the schema has one. Fails
/// on the first identifier that is absent, or that a marshalled item would
/// leave out (null, or empty for non-number keys).
pub fn resolve_keys(values: &ValueMap, schema: &EntitySchema) -> Result<Item> {
    let mut key = Item::new();

    for field in schema.identifiers() {
        let value = values
            .get(field.name())
            .filter(|v| !is_omitted(v, field.semantic_type()))
            .ok_or_else(|| CodecError::MissingIdentifier {
                field: field.name().to_string(),
            })?;

        key.insert(
            field.name().to_string(),
            marshal(value, field.semantic_type())?,
        );
    }

    Ok(key)
}
