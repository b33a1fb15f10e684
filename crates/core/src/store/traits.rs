use async_trait::async_trait;

use super::{
    CreateTableRequest, DeleteItemRequest, DeleteTableRequest, DescribeTableRequest, GetItemOutput,
    GetItemRequest, PutItemRequest, Result, ScanOutput, ScanRequest, TableDescription,
    UpdateItemRequest,
};

/// Network client for a wide-column key-value store.
///
/// Implementations issue exactly one store request per call and map their
/// native failures onto [`StoreError`](super::StoreError).
#[async_trait]
pub trait StoreClient: Send + Sync {
    async fn put_item(&self, request: &PutItemRequest) -> Result<()>;

    /// Returns `item: None` when no item has the key.
    async fn get_item(&self, request: &GetItemRequest) -> Result<GetItemOutput>;

    /// Returns a single page of matching items.
    async fn scan(&self, request: &ScanRequest) -> Result<ScanOutput>;

    async fn update_item(&self, request: &UpdateItemRequest) -> Result<()>;

    async fn delete_item(&self, request: &DeleteItemRequest) -> Result<()>;

    async fn create_table(&self, request: &CreateTableRequest) -> Result<TableDescription>;

    async fn delete_table(&self, request: &DeleteTableRequest) -> Result<TableDescription>;

    async fn describe_table(&self, request: &DescribeTableRequest) -> Result<TableDescription>;
}
