//! In-memory store backend for testing.
//!
//! This module provides an in-process implementation of [`StoreClient`]
//! that keeps every table in a HashMap wrapped in `Arc<RwLock<_>>`. It
//! evaluates the filter and update expressions the driver emits, and can
//! simulate table status transitions for lifecycle tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use dynodm::storage::inmemory::InMemoryStore;
//! use dynodm::{DocumentStoreDriver, DriverConfig};
//!
//! let driver = DocumentStoreDriver::new(InMemoryStore::new(), DriverConfig::default());
//! ```
//!
//! [`StoreClient`]: dynodm_core::store::StoreClient

mod expression;
mod store;

pub use store::InMemoryStore;
