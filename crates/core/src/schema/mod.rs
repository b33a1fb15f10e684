mod error;
mod table;
mod types;

pub use error::{Result, SchemaError};
pub use table::{
    build_table_schema, key_attribute_type, AttributeDefinition, GlobalIndexDescriptor,
    KeySchemaElement, ProjectionType, ProvisionedThroughput, ScalarAttributeType,
    TableSchemaDescriptor, DEFAULT_READ_CAPACITY_UNITS, DEFAULT_WRITE_CAPACITY_UNITS,
};
pub use types::{
    EntitySchema, EntitySchemaBuilder, FieldDescriptor, FieldRole, IndexKey, KeyType,
    SecondaryIndexSpec, SemanticType,
};
