use thiserror::Error;

use super::SemanticType;

/// Errors raised while registering an entity schema or deriving a table
/// definition from it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Field '{field}' is declared more than once")]
    DuplicateField { field: String },
    #[error("Entity '{table}' does not declare a hash key")]
    MissingHashKey { table: String },
    #[error("Entity '{table}' declares more than one hash key")]
    MultipleHashKeys { table: String },
    #[error("Entity '{table}' declares more than one range key")]
    MultipleRangeKeys { table: String },
    #[error("Index '{index}' references undeclared field '{field}'")]
    UnknownIndexField { index: String, field: String },
    #[error("Index '{index}' must have exactly one hash key and at most one range key")]
    InvalidIndexKeys { index: String },
    #[error("Field '{field}' of type {semantic_type} cannot be used as a key attribute")]
    IncompatibleKeyType {
        field: String,
        semantic_type: SemanticType,
    },
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incompatible_key_type_display() {
        let error = SchemaError::IncompatibleKeyType {
            field: "email_verified".to_string(),
            semantic_type: SemanticType::Boolean,
        };
        assert_eq!(
            error.to_string(),
            "Field 'email_verified' of type boolean cannot be used as a key attribute"
        );
    }

    #[test]
    fn test_unknown_index_field_display() {
        let error = SchemaError::UnknownIndexField {
            index: "email_index".to_string(),
            field: "email".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Index 'email_index' references undeclared field 'email'"
        );
    }

    #[test]
    fn test_missing_hash_key_display() {
        let error = SchemaError::MissingHashKey {
            table: "scope".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Entity 'scope' does not declare a hash key"
        );
    }
}
