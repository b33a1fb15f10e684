//! Store client boundary.
//!
//! Request and result types, plus the trait every backend implements.

mod error;
mod traits;
mod types;

pub use error::{Result, StoreError};
pub use traits::StoreClient;
pub use types::{
    CreateTableRequest, DeleteItemRequest, DeleteTableRequest, DescribeTableRequest, GetItemOutput,
    GetItemRequest, PutItemRequest, ScanOutput, ScanRequest, StoreRequest, TableDescription,
    TableStatus, UpdateItemRequest,
};
