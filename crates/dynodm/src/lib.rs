//! Document store adapter.
//!
//! Maps entity persistence (add, get, update, delete, scan, filter) onto a
//! schema-on-write wide-column store through a [`StoreClient`]. The pure
//! parts live in `dynodm_core`; this crate holds the driver and the store
//! backends, selected at compile time via feature flags.
//!
//! # Feature Flags
//!
//! - `inmemory` (default): in-process store, used by the test suite
//! - `dynamodb`: AWS DynamoDB store using `aws-sdk-dynamodb`

pub mod config;
pub mod diagnostics;
pub mod driver;
pub mod error;
pub mod lifecycle;
pub mod storage;

pub use config::DriverConfig;
pub use diagnostics::{DiagnosticSink, RecordingSink, TracingSink};
pub use driver::DocumentStoreDriver;
pub use error::{DriverError, Result};
pub use lifecycle::{wait_for_table_absent, wait_for_table_active, RetryPolicy};

pub use dynodm_core::codec::{Number, Value, ValueMap};
pub use dynodm_core::criteria::Predicate;
pub use dynodm_core::schema::{EntitySchema, SecondaryIndexSpec, SemanticType};
pub use dynodm_core::store::{StoreClient, TableStatus};
