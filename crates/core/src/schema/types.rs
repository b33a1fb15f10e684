use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Result, SchemaError};

/// Domain-level type of a field, independent of its wire encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SemanticType {
    String,
    Boolean,
    Number,
    Binary,
    Null,
    /// A type name this crate does not know about (dates, custom kinds).
    /// Encoded on the wire as a string.
    Other(String),
}

impl SemanticType {
    /// Parses a declared type name. Unknown names become [`SemanticType::Other`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "string" | "str" => Self::String,
            "boolean" | "bool" => Self::Boolean,
            "number" | "integer" | "int" | "float" | "decimal" => Self::Number,
            "binary" | "bytes" => Self::Binary,
            "null" => Self::Null,
            _ => Self::Other(name.to_string()),
        }
    }

    /// Returns the canonical type name.
    pub fn name(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::Binary => "binary",
            Self::Null => "null",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for SemanticType {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<SemanticType> for String {
    fn from(semantic_type: SemanticType) -> Self {
        semantic_type.name().to_string()
    }
}

/// Position of a key attribute inside a key schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyType {
    Hash,
    Range,
}

impl KeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hash => "HASH",
            Self::Range => "RANGE",
        }
    }
}

/// Role a field plays in the entity's primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldRole {
    #[default]
    Plain,
    Hash,
    Range,
}

impl FieldRole {
    /// Returns the key type for identifier roles, `None` for plain fields.
    pub fn key_type(&self) -> Option<KeyType> {
        match self {
            Self::Plain => None,
            Self::Hash => Some(KeyType::Hash),
            Self::Range => Some(KeyType::Range),
        }
    }
}

/// A declared field of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    name: String,
    #[serde(rename = "type")]
    semantic_type: SemanticType,
    #[serde(default)]
    role: FieldRole,
}

impl FieldDescriptor {
    /// Creates a plain (non-key) field.
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            semantic_type,
            role: FieldRole::Plain,
        }
    }

    pub fn with_role(mut self, role: FieldRole) -> Self {
        self.role = role;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn semantic_type(&self) -> &SemanticType {
        &self.semantic_type
    }

    pub fn role(&self) -> FieldRole {
        self.role
    }

    pub fn is_identifier(&self) -> bool {
        self.role != FieldRole::Plain
    }
}

/// One key attribute of a secondary index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexKey {
    pub field: String,
    pub key_type: KeyType,
}

/// A secondary index declared on an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryIndexSpec {
    name: String,
    #[serde(rename = "keys")]
    key_fields: Vec<IndexKey>,
}

impl SecondaryIndexSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key_fields: Vec::new(),
        }
    }

    /// Adds the hash key of the index.
    pub fn hash(self, field: impl Into<String>) -> Self {
        self.key(field, KeyType::Hash)
    }

    /// Adds the range key of the index.
    pub fn range(self, field: impl Into<String>) -> Self {
        self.key(field, KeyType::Range)
    }

    fn key(mut self, field: impl Into<String>, key_type: KeyType) -> Self {
        self.key_fields.push(IndexKey {
            field: field.into(),
            key_type,
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_fields(&self) -> &[IndexKey] {
        &self.key_fields
    }
}

/// Raw shape of an entity schema as supplied by a metadata source.
#[derive(Debug, Deserialize)]
struct EntitySchemaDef {
    table: String,
    fields: Vec<FieldDescriptor>,
    #[serde(default)]
    indexes: Vec<SecondaryIndexSpec>,
}

impl TryFrom<EntitySchemaDef> for EntitySchema {
    type Error = SchemaError;

    fn try_from(def: EntitySchemaDef) -> Result<Self> {
        EntitySchema::new(def.table, def.fields, def.indexes)
    }
}

/// Metadata describing one persisted entity: its logical table, fields and
/// secondary indexes.
///
/// Constructed once (through [`EntitySchema::builder`] or deserialization)
/// and read-only afterwards. Construction validates that field names are
/// unique, that exactly one hash key and at most one range key are declared,
/// and that every index references declared fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EntitySchemaDef")]
pub struct EntitySchema {
    table: String,
    fields: Vec<FieldDescriptor>,
    indexes: Vec<SecondaryIndexSpec>,
    #[serde(skip_serializing)]
    hash_position: usize,
}

impl EntitySchema {
    /// Validates and creates a schema.
    pub fn new(
        table: impl Into<String>,
        fields: Vec<FieldDescriptor>,
        indexes: Vec<SecondaryIndexSpec>,
    ) -> Result<Self> {
        let table = table.into();

        for (position, field) in fields.iter().enumerate() {
            if fields[..position].iter().any(|f| f.name == field.name) {
                return Err(SchemaError::DuplicateField {
                    field: field.name.clone(),
                });
            }
        }

        let mut hashes = fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.role == FieldRole::Hash)
            .map(|(position, _)| position);
        let hash_position = match (hashes.next(), hashes.next()) {
            (Some(position), None) => position,
            (None, _) => return Err(SchemaError::MissingHashKey { table }),
            (Some(_), Some(_)) => return Err(SchemaError::MultipleHashKeys { table }),
        };
        if fields.iter().filter(|f| f.role == FieldRole::Range).count() > 1 {
            return Err(SchemaError::MultipleRangeKeys { table });
        }

        for index in &indexes {
            validate_index(index, &fields)?;
        }

        Ok(Self {
            table,
            fields,
            indexes,
            hash_position,
        })
    }

    /// Starts building a schema for the given logical table name.
    pub fn builder(table: impl Into<String>) -> EntitySchemaBuilder {
        EntitySchemaBuilder {
            table: table.into(),
            fields: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Logical table name (without the driver's prefix).
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn indexes(&self) -> &[SecondaryIndexSpec] {
        &self.indexes
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn hash_key(&self) -> &FieldDescriptor {
        &self.fields[self.hash_position]
    }

    pub fn range_key(&self) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.role == FieldRole::Range)
    }

    /// Identifier fields in resolution order: hash first, then range.
    pub fn identifiers(&self) -> impl Iterator<Item = &FieldDescriptor> {
        std::iter::once(self.hash_key()).chain(self.range_key())
    }

    pub fn is_identifier(&self, name: &str) -> bool {
        self.field(name).is_some_and(FieldDescriptor::is_identifier)
    }

    /// The primary key as ordered (field, key type) pairs.
    pub fn primary_key(&self) -> Vec<IndexKey> {
        self.identifiers()
            .map(|field| IndexKey {
                field: field.name.clone(),
                key_type: field.role.key_type().unwrap_or(KeyType::Hash),
            })
            .collect()
    }
}

fn validate_index(index: &SecondaryIndexSpec, fields: &[FieldDescriptor]) -> Result<()> {
    for key in &index.key_fields {
        if !fields.iter().any(|f| f.name == key.field) {
            return Err(SchemaError::UnknownIndexField {
                index: index.name.clone(),
                field: key.field.clone(),
            });
        }
    }

    let hashes = index
        .key_fields
        .iter()
        .filter(|k| k.key_type == KeyType::Hash)
        .count();
    let ranges = index.key_fields.len() - hashes;
    if hashes != 1 || ranges > 1 {
        return Err(SchemaError::InvalidIndexKeys {
            index: index.name.clone(),
        });
    }

    Ok(())
}

/// Builder for [`EntitySchema`].
#[derive(Debug, Clone)]
pub struct EntitySchemaBuilder {
    table: String,
    fields: Vec<FieldDescriptor>,
    indexes: Vec<SecondaryIndexSpec>,
}

impl EntitySchemaBuilder {
    pub fn field(mut self, name: impl Into<String>, semantic_type: SemanticType) -> Self {
        self.fields.push(FieldDescriptor::new(name, semantic_type));
        self
    }

    pub fn hash_key(mut self, name: impl Into<String>, semantic_type: SemanticType) -> Self {
        let field = FieldDescriptor::new(name, semantic_type);
        self.fields.push(field.with_role(FieldRole::Hash));
        self
    }

    pub fn range_key(mut self, name: impl Into<String>, semantic_type: SemanticType) -> Self {
        let field = FieldDescriptor::new(name, semantic_type);
        self.fields.push(field.with_role(FieldRole::Range));
        self
    }

    pub fn index(mut self, index: SecondaryIndexSpec) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn build(self) -> Result<EntitySchema> {
        EntitySchema::new(self.table, self.fields, self.indexes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_schema() -> EntitySchema {
        EntitySchema::builder("oauth_users")
            .hash_key("username", SemanticType::String)
            .field("created_at", SemanticType::from_name("datetime"))
            .field("email", SemanticType::String)
            .field("email_verified", SemanticType::Boolean)
            .field("age", SemanticType::Number)
            .index(SecondaryIndexSpec::new("username_index").hash("username"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_semantic_type_from_name() {
        assert_eq!(SemanticType::from_name("string"), SemanticType::String);
        assert_eq!(SemanticType::from_name("Boolean"), SemanticType::Boolean);
        assert_eq!(SemanticType::from_name("integer"), SemanticType::Number);
        assert_eq!(SemanticType::from_name("float"), SemanticType::Number);
        assert_eq!(
            SemanticType::from_name("datetime"),
            SemanticType::Other("datetime".to_string())
        );
    }

    #[test]
    fn test_identifiers_hash_then_range() {
        let schema = EntitySchema::builder("events")
            .range_key("ts", SemanticType::Number)
            .field("payload", SemanticType::String)
            .hash_key("id", SemanticType::String)
            .build()
            .unwrap();

        let names: Vec<&str> = schema.identifiers().map(FieldDescriptor::name).collect();
        assert_eq!(names, vec!["id", "ts"]);
        assert_eq!(
            schema.primary_key(),
            vec![
                IndexKey {
                    field: "id".to_string(),
                    key_type: KeyType::Hash
                },
                IndexKey {
                    field: "ts".to_string(),
                    key_type: KeyType::Range
                },
            ]
        );
    }

    #[test]
    fn test_lookup_helpers() {
        let schema = user_schema();
        assert_eq!(schema.table(), "oauth_users");
        assert_eq!(schema.hash_key().name(), "username");
        assert!(schema.range_key().is_none());
        assert!(schema.is_identifier("username"));
        assert!(!schema.is_identifier("email"));
        assert!(!schema.is_identifier("missing"));
        assert_eq!(
            schema.field("age").unwrap().semantic_type(),
            &SemanticType::Number
        );
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let result = EntitySchema::builder("users")
            .hash_key("username", SemanticType::String)
            .field("username", SemanticType::String)
            .build();
        assert_eq!(
            result.unwrap_err(),
            SchemaError::DuplicateField {
                field: "username".to_string()
            }
        );
    }

    #[test]
    fn test_hash_key_required() {
        let result = EntitySchema::builder("users")
            .field("username", SemanticType::String)
            .build();
        assert!(matches!(result, Err(SchemaError::MissingHashKey { .. })));

        let result = EntitySchema::builder("users")
            .hash_key("a", SemanticType::String)
            .hash_key("b", SemanticType::String)
            .build();
        assert!(matches!(result, Err(SchemaError::MultipleHashKeys { .. })));
    }

    #[test]
    fn test_index_must_reference_declared_fields() {
        let result = EntitySchema::builder("scope")
            .hash_key("scope_name", SemanticType::String)
            .index(
                SecondaryIndexSpec::new("is_default_index")
                    .hash("is_default"),
            )
            .build();
        assert_eq!(
            result.unwrap_err(),
            SchemaError::UnknownIndexField {
                index: "is_default_index".to_string(),
                field: "is_default".to_string(),
            }
        );
    }

    #[test]
    fn test_index_needs_single_hash_key() {
        let result = EntitySchema::builder("scope")
            .hash_key("scope_name", SemanticType::String)
            .field("is_default", SemanticType::String)
            .index(SecondaryIndexSpec::new("range_only").range("is_default"))
            .build();
        assert!(matches!(result, Err(SchemaError::InvalidIndexKeys { .. })));
    }

    #[test]
    fn test_deserialize_from_json() {
        let json = r#"{
            "table": "scope",
            "fields": [
                {"name": "scope_name", "type": "string", "role": "hash"},
                {"name": "is_default", "type": "string"}
            ],
            "indexes": [
                {"name": "is_default_index", "keys": [{"field": "is_default", "keyType": "HASH"}]}
            ]
        }"#;

        let schema: EntitySchema = serde_json::from_str(json).unwrap();
        assert_eq!(schema.table(), "scope");
        assert_eq!(schema.hash_key().name(), "scope_name");
        assert_eq!(schema.field("is_default").unwrap().role(), FieldRole::Plain);
        assert_eq!(schema.indexes()[0].key_fields()[0].key_type, KeyType::Hash);
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"{"table": "scope", "fields": [{"name": "scope_name", "type": "string"}]}"#;
        assert!(serde_json::from_str::<EntitySchema>(json).is_err());
    }
}
