//! DynamoDB type conversion functions.
//!
//! Pure functions converting between `dynodm_core` wire and schema types and
//! their `aws-sdk-dynamodb` counterparts. These are testable in isolation
//! without DynamoDB access.

use std::collections::{BTreeMap, HashMap};

use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types::{self as sdk, AttributeValue};
use dynodm_core::codec::{Item, WireValue};
use dynodm_core::schema::{
    KeySchemaElement, KeyType, ProjectionType, ProvisionedThroughput, ScalarAttributeType,
    TableSchemaDescriptor,
};
use dynodm_core::store::{Result, StoreError, TableStatus};

// ============================================================================
// Attribute values
// ============================================================================

pub fn wire_to_attribute(value: &WireValue) -> AttributeValue {
    match value {
        WireValue::Str(s) => AttributeValue::S(s.clone()),
        WireValue::Num(n) => AttributeValue::N(n.clone()),
        WireValue::Bool(b) => AttributeValue::Bool(*b),
        WireValue::Null => AttributeValue::Null(true),
        WireValue::Binary(b) => AttributeValue::B(Blob::new(b.clone())),
    }
}

/// Only scalar attributes have a wire form; sets, lists and maps are rejected.
pub fn attribute_to_wire(name: &str, value: &AttributeValue) -> Result<WireValue> {
    match value {
        AttributeValue::S(s) => Ok(WireValue::Str(s.clone())),
        AttributeValue::N(n) => Ok(WireValue::Num(n.clone())),
        AttributeValue::Bool(b) => Ok(WireValue::Bool(*b)),
        AttributeValue::Null(_) => Ok(WireValue::Null),
        AttributeValue::B(b) => Ok(WireValue::Binary(b.as_ref().to_vec())),
        other => Err(StoreError::Validation(format!(
            "Unsupported attribute type for {name}: {other:?}"
        ))),
    }
}

pub fn item_to_attributes(item: &Item) -> HashMap<String, AttributeValue> {
    item.iter()
        .map(|(name, value)| (name.clone(), wire_to_attribute(value)))
        .collect()
}

pub fn attributes_to_item(attributes: &HashMap<String, AttributeValue>) -> Result<Item> {
    attributes
        .iter()
        .map(|(name, value)| Ok((name.clone(), attribute_to_wire(name, value)?)))
        .collect()
}

/// Expression attribute values. The store rejects an empty map, so that is `None`.
pub fn expression_values(
    values: &BTreeMap<String, WireValue>,
) -> Option<HashMap<String, AttributeValue>> {
    (!values.is_empty()).then(|| item_to_attributes(values))
}

/// Expression attribute names. The store rejects an empty map, so that is `None`.
pub fn expression_names(names: &BTreeMap<String, String>) -> Option<HashMap<String, String>> {
    (!names.is_empty()).then(|| {
        names
            .iter()
            .map(|(alias, name)| (alias.clone(), name.clone()))
            .collect()
    })
}

// ============================================================================
// Table schema
// ============================================================================

fn build_error(e: impl std::fmt::Display) -> StoreError {
    StoreError::Validation(e.to_string())
}

fn scalar_type(attribute_type: ScalarAttributeType) -> sdk::ScalarAttributeType {
    match attribute_type {
        ScalarAttributeType::S => sdk::ScalarAttributeType::S,
        ScalarAttributeType::N => sdk::ScalarAttributeType::N,
        ScalarAttributeType::B => sdk::ScalarAttributeType::B,
    }
}

fn key_type(key_type: KeyType) -> sdk::KeyType {
    match key_type {
        KeyType::Hash => sdk::KeyType::Hash,
        KeyType::Range => sdk::KeyType::Range,
    }
}

fn projection_type(projection: ProjectionType) -> sdk::ProjectionType {
    match projection {
        ProjectionType::All => sdk::ProjectionType::All,
    }
}

pub fn attribute_definitions(
    schema: &TableSchemaDescriptor,
) -> Result<Vec<sdk::AttributeDefinition>> {
    schema
        .attribute_definitions
        .iter()
        .map(|definition| {
            sdk::AttributeDefinition::builder()
                .attribute_name(&definition.attribute_name)
                .attribute_type(scalar_type(definition.attribute_type))
                .build()
                .map_err(build_error)
        })
        .collect()
}

pub fn key_schema(elements: &[KeySchemaElement]) -> Result<Vec<sdk::KeySchemaElement>> {
    elements
        .iter()
        .map(|element| {
            sdk::KeySchemaElement::builder()
                .attribute_name(&element.attribute_name)
                .key_type(key_type(element.key_type))
                .build()
                .map_err(build_error)
        })
        .collect()
}

pub fn provisioned_throughput(
    throughput: &ProvisionedThroughput,
) -> Result<sdk::ProvisionedThroughput> {
    sdk::ProvisionedThroughput::builder()
        .read_capacity_units(throughput.read_capacity_units)
        .write_capacity_units(throughput.write_capacity_units)
        .build()
        .map_err(build_error)
}

pub fn global_secondary_indexes(
    schema: &TableSchemaDescriptor,
) -> Result<Option<Vec<sdk::GlobalSecondaryIndex>>> {
    if schema.global_secondary_indexes.is_empty() {
        return Ok(None);
    }

    schema
        .global_secondary_indexes
        .iter()
        .map(|index| {
            sdk::GlobalSecondaryIndex::builder()
                .index_name(&index.index_name)
                .set_key_schema(Some(key_schema(&index.key_schema)?))
                .projection(
                    sdk::Projection::builder()
                        .projection_type(projection_type(index.projection))
                        .build(),
                )
                .provisioned_throughput(provisioned_throughput(&index.provisioned_throughput)?)
                .build()
                .map_err(build_error)
        })
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

pub fn table_status(status: Option<&sdk::TableStatus>, fallback: TableStatus) -> TableStatus {
    status
        .map(|status| TableStatus::parse(status.as_str()))
        .unwrap_or(fallback)
}
