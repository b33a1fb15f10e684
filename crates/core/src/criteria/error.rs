use thiserror::Error;

use crate::codec::CodecError;

/// Errors that can occur while compiling a predicate tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CriteriaError {
    #[error("Unsupported operator: {op}")]
    UnsupportedOperator { op: String },
    #[error("Composite expression has no children")]
    EmptyPredicate,
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Result type for criteria operations.
pub type Result<T> = std::result::Result<T, CriteriaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_operator_display() {
        let error = CriteriaError::UnsupportedOperator {
            op: "LIKE".to_string(),
        };
        assert_eq!(error.to_string(), "Unsupported operator: LIKE");
    }

    #[test]
    fn test_codec_error_is_transparent() {
        let error = CriteriaError::from(CodecError::InvalidNumber {
            value: "x".to_string(),
        });
        assert_eq!(error.to_string(), "Invalid number: x");
    }
}
