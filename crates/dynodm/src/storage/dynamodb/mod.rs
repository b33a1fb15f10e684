//! DynamoDB store backend.
//!
//! This module provides a DynamoDB-based implementation of [`StoreClient`]
//! using `aws-sdk-dynamodb`.
//!
//! [`StoreClient`]: dynodm_core::store::StoreClient

mod client;
mod conversions;
mod error;
mod store;

pub use client::{create_client, AwsConfig};
pub use store::DynamoDbStore;
