//! Store client implementations.
//!
//! Concrete implementations of the `StoreClient` trait defined in
//! `dynodm_core::store`, selected at compile time via feature flags.
//!
//! # Examples
//!
//! Build with the in-memory store only (default):
//! ```bash
//! cargo build -p dynodm
//! ```
//!
//! Build with DynamoDB:
//! ```bash
//! cargo build -p dynodm --features dynamodb
//! ```

#[cfg(feature = "inmemory")]
pub mod inmemory;

#[cfg(feature = "dynamodb")]
pub mod dynamodb;

#[cfg(feature = "inmemory")]
pub use inmemory::InMemoryStore;

#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoDbStore;
