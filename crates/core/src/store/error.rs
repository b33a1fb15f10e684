use thiserror::Error;

/// Errors reported by a store client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),
    #[error("Resource in use: {0}")]
    ResourceInUse(String),
    #[error("Conditional check failed: {0}")]
    ConditionalCheckFailed(String),
    #[error("Provisioned throughput exceeded: {0}")]
    ThroughputExceeded(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Request failed: {0}")]
    RequestFailed(String),
}

impl StoreError {
    pub fn is_resource_not_found(&self) -> bool {
        matches!(self, Self::ResourceNotFound(_))
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
