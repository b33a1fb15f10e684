//! Table definition derivation (Functional Core - pure data).
//!
//! Turns an [`EntitySchema`] into the attribute definitions, primary key
//! schema and global secondary indexes a table-creation request needs.

use serde::Serialize;

use super::{EntitySchema, FieldDescriptor, IndexKey, KeyType, Result, SchemaError, SemanticType};

/// Read capacity units applied to every table and index.
pub const DEFAULT_READ_CAPACITY_UNITS: i64 = 1;

/// Write capacity units applied to every table and index.
pub const DEFAULT_WRITE_CAPACITY_UNITS: i64 = 1;

/// Attribute types the store accepts for key attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScalarAttributeType {
    S,
    N,
    B,
}

impl ScalarAttributeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S => "S",
            Self::N => "N",
            Self::B => "B",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeDefinition {
    pub attribute_name: String,
    pub attribute_type: ScalarAttributeType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeySchemaElement {
    pub attribute_name: String,
    pub key_type: KeyType,
}

/// GSI projection type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProjectionType {
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProvisionedThroughput {
    pub read_capacity_units: i64,
    pub write_capacity_units: i64,
}

impl Default for ProvisionedThroughput {
    fn default() -> Self {
        Self {
            read_capacity_units: DEFAULT_READ_CAPACITY_UNITS,
            write_capacity_units: DEFAULT_WRITE_CAPACITY_UNITS,
        }
    }
}

/// Global Secondary Index definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GlobalIndexDescriptor {
    pub index_name: String,
    pub key_schema: Vec<KeySchemaElement>,
    pub projection: ProjectionType,
    pub provisioned_throughput: ProvisionedThroughput,
}

/// Everything needed to create the table backing an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TableSchemaDescriptor {
    pub attribute_definitions: Vec<AttributeDefinition>,
    pub key_schema: Vec<KeySchemaElement>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub global_secondary_indexes: Vec<GlobalIndexDescriptor>,
    pub provisioned_throughput: ProvisionedThroughput,
}

impl TableSchemaDescriptor {
    /// Returns the defined type of a key attribute.
    pub fn attribute_type(&self, name: &str) -> Option<ScalarAttributeType> {
        self.attribute_definitions
            .iter()
            .find(|a| a.attribute_name == name)
            .map(|a| a.attribute_type)
    }
}

/// Key-compatible type mapping. Differs from the general codec mapping:
/// only string, number and binary values may appear in a key position.
pub fn key_attribute_type(field: &FieldDescriptor) -> Result<ScalarAttributeType> {
    match field.semantic_type() {
        SemanticType::String | SemanticType::Other(_) => Ok(ScalarAttributeType::S),
        SemanticType::Number => Ok(ScalarAttributeType::N),
        SemanticType::Binary => Ok(ScalarAttributeType::B),
        SemanticType::Boolean | SemanticType::Null => Err(SchemaError::IncompatibleKeyType {
            field: field.name().to_string(),
            semantic_type: field.semantic_type().clone(),
        }),
    }
}

/// Derives the table definition for an entity.
///
/// Indexes whose key fields and roles reproduce the primary key exactly are
/// skipped: the store rejects such duplicates. Attribute definitions appear
/// once per field even when shared between the primary key and indexes.
pub fn build_table_schema(schema: &EntitySchema) -> Result<TableSchemaDescriptor> {
    let primary_key = schema.primary_key();
    let mut attribute_definitions = Vec::new();

    let key_schema = key_schema_for(schema, &primary_key, &mut attribute_definitions)?;

    let mut global_secondary_indexes = Vec::new();
    for index in schema.indexes() {
        if index.key_fields() == primary_key.as_slice() {
            continue;
        }

        global_secondary_indexes.push(GlobalIndexDescriptor {
            index_name: index.name().to_string(),
            key_schema: key_schema_for(schema, index.key_fields(), &mut attribute_definitions)?,
            projection: ProjectionType::All,
            provisioned_throughput: ProvisionedThroughput::default(),
        });
    }

    Ok(TableSchemaDescriptor {
        attribute_definitions,
        key_schema,
        global_secondary_indexes,
        provisioned_throughput: ProvisionedThroughput::default(),
    })
}

fn key_schema_for(
    schema: &EntitySchema,
    keys: &[IndexKey],
    attribute_definitions: &mut Vec<AttributeDefinition>,
) -> Result<Vec<KeySchemaElement>> {
    let mut key_schema = Vec::with_capacity(keys.len());

    for key in keys {
        let field = schema
            .field(&key.field)
            .ok_or_else(|| SchemaError::UnknownIndexField {
                index: schema.table().to_string(),
                field: key.field.clone(),
            })?;
        let attribute_type = key_attribute_type(field)?;

        if !attribute_definitions
            .iter()
            .any(|a| a.attribute_name == key.field)
        {
            attribute_definitions.push(AttributeDefinition {
                attribute_name: key.field.clone(),
                attribute_type,
            });
        }

        key_schema.push(KeySchemaElement {
            attribute_name: key.field.clone(),
            key_type: key.key_type,
        });
    }

    Ok(key_schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SecondaryIndexSpec;

    fn user_builder() -> crate::schema::EntitySchemaBuilder {
        EntitySchema::builder("oauth_users")
            .hash_key("username", SemanticType::String)
            .field("email", SemanticType::String)
            .field("email_verified", SemanticType::Boolean)
            .field("age", SemanticType::Number)
    }

    #[test]
    fn test_index_duplicating_primary_key_is_dropped() {
        let schema = user_builder()
            .index(SecondaryIndexSpec::new("username_index").hash("username"))
            .build()
            .unwrap();

        let descriptor = build_table_schema(&schema).unwrap();

        assert!(descriptor.global_secondary_indexes.is_empty());
        assert_eq!(
            descriptor.key_schema,
            vec![KeySchemaElement {
                attribute_name: "username".to_string(),
                key_type: KeyType::Hash,
            }]
        );
        assert_eq!(
            descriptor.attribute_definitions,
            vec![AttributeDefinition {
                attribute_name: "username".to_string(),
                attribute_type: ScalarAttributeType::S,
            }]
        );
    }

    #[test]
    fn test_secondary_index_emitted() {
        let schema = EntitySchema::builder("scope")
            .hash_key("scope_name", SemanticType::String)
            .field("is_default", SemanticType::String)
            .index(
                SecondaryIndexSpec::new("is_default_index")
                    .hash("is_default"),
            )
            .build()
            .unwrap();

        let descriptor = build_table_schema(&schema).unwrap();

        assert_eq!(descriptor.global_secondary_indexes.len(), 1);
        let gsi = &descriptor.global_secondary_indexes[0];
        assert_eq!(gsi.index_name, "is_default_index");
        assert_eq!(gsi.projection, ProjectionType::All);
        assert_eq!(gsi.provisioned_throughput, ProvisionedThroughput::default());
        assert_eq!(gsi.key_schema[0].attribute_name, "is_default");
        assert_eq!(descriptor.attribute_definitions.len(), 2);
    }

    #[test]
    fn test_shared_attribute_defined_once() {
        let schema = user_builder()
            .index(
                SecondaryIndexSpec::new("username_age_index")
                    .hash("username")
                    .range("age"),
            )
            .build()
            .unwrap();

        let descriptor = build_table_schema(&schema).unwrap();

        let names: Vec<&str> = descriptor
            .attribute_definitions
            .iter()
            .map(|a| a.attribute_name.as_str())
            .collect();
        assert_eq!(names, vec!["username", "age"]);
        assert_eq!(
            descriptor.attribute_type("age"),
            Some(ScalarAttributeType::N)
        );
        assert_eq!(
            descriptor.global_secondary_indexes[0].key_schema[1].key_type,
            KeyType::Range
        );
    }

    #[test]
    fn test_boolean_index_key_is_incompatible() {
        let schema = user_builder()
            .index(
                SecondaryIndexSpec::new("username_email-verified_index")
                    .hash("username")
                    .range("email_verified"),
            )
            .build()
            .unwrap();

        assert_eq!(
            build_table_schema(&schema).unwrap_err(),
            SchemaError::IncompatibleKeyType {
                field: "email_verified".to_string(),
                semantic_type: SemanticType::Boolean,
            }
        );
    }

    #[test]
    fn test_range_key_in_primary_schema() {
        let schema = EntitySchema::builder("events")
            .hash_key("id", SemanticType::String)
            .range_key("ts", SemanticType::Number)
            .build()
            .unwrap();

        let descriptor = build_table_schema(&schema).unwrap();

        assert_eq!(descriptor.key_schema.len(), 2);
        assert_eq!(descriptor.key_schema[1].key_type, KeyType::Range);
        assert_eq!(
            descriptor.attribute_type("ts"),
            Some(ScalarAttributeType::N)
        );
    }

    #[test]
    fn test_key_attribute_type_mapping() {
        let binary = FieldDescriptor::new("blob", SemanticType::Binary);
        assert_eq!(key_attribute_type(&binary).unwrap(), ScalarAttributeType::B);

        let custom = FieldDescriptor::new("created_at", SemanticType::from_name("datetime"));
        assert_eq!(key_attribute_type(&custom).unwrap(), ScalarAttributeType::S);

        let null = FieldDescriptor::new("nothing", SemanticType::Null);
        assert!(key_attribute_type(&null).is_err());
    }

    #[test]
    fn test_descriptor_serializes_with_store_field_names() {
        let schema = user_builder().build().unwrap();
        let descriptor = build_table_schema(&schema).unwrap();
        let json = serde_json::to_value(&descriptor).unwrap();

        assert_eq!(json["KeySchema"][0]["AttributeName"], "username");
        assert_eq!(json["KeySchema"][0]["KeyType"], "HASH");
        assert_eq!(json["ProvisionedThroughput"]["ReadCapacityUnits"], 1);
        assert!(json.get("GlobalSecondaryIndexes").is_none());
    }
}
