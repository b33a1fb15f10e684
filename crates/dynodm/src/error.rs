use dynodm_core::codec::CodecError;
use dynodm_core::criteria::CriteriaError;
use dynodm_core::schema::SchemaError;
use dynodm_core::store::StoreError;
use thiserror::Error;

/// Errors returned by the driver and the lifecycle helpers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Criteria(#[from] CriteriaError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Table '{table}' did not become {expected} after {attempts} attempts")]
    LifecycleTimeout {
        table: String,
        expected: &'static str,
        attempts: u32,
    },
}

impl DriverError {
    /// The missing identifier field, if that is what went wrong.
    pub fn missing_identifier(&self) -> Option<&str> {
        match self {
            Self::Codec(CodecError::MissingIdentifier { field })
            | Self::Criteria(CriteriaError::Codec(CodecError::MissingIdentifier { field })) => {
                Some(field)
            }
            _ => None,
        }
    }
}

/// Result type for driver operations.
pub type Result<T> = std::result::Result<T, DriverError>;
