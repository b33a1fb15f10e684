use thiserror::Error;

/// Errors that can occur while marshalling values or resolving keys.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("The field `{field}` is mandatory")]
    MissingIdentifier { field: String },
    #[error("Invalid number: {value}")]
    InvalidNumber { value: String },
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_identifier_display() {
        let error = CodecError::MissingIdentifier {
            field: "ts".to_string(),
        };
        assert_eq!(error.to_string(), "The field `ts` is mandatory");
    }

    #[test]
    fn test_invalid_number_display() {
        let error = CodecError::InvalidNumber {
            value: "abc".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid number: abc");
    }
}
