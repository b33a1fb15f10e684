//! Error types for DynamoDB operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for dynamodb module.
pub type Result<T> = std::result::Result<T, DynamodbError>;

/// Errors that can occur during DynamoDB operations.
#[derive(Error, Debug)]
pub enum DynamodbError {
    #[error(transparent)]
    Driver(#[from] dynodm::DriverError),

    #[error("Invalid file {path}: {message}")]
    InvalidFile { path: PathBuf, message: String },

    #[error("Table '{table_name}' not found")]
    TableNotFound { table_name: String },

    #[error("Table '{table_name}' could not be created")]
    TableCreationFailed { table_name: String },

    #[error("Table '{table_name}' could not be deleted")]
    TableDeletionFailed { table_name: String },

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("Operation cancelled by user")]
    UserCancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
