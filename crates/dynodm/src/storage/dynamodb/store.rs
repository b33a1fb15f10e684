//! DynamoDB store client.
//!
//! Implements `StoreClient` from `dynodm_core::store` on top of
//! `aws-sdk-dynamodb`. Every call is a single request; nothing is retried.

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;

use dynodm_core::store::{
    CreateTableRequest, DeleteItemRequest, DeleteTableRequest, DescribeTableRequest, GetItemOutput,
    GetItemRequest, PutItemRequest, Result, ScanOutput, ScanRequest, StoreClient, StoreError,
    TableDescription, TableStatus, UpdateItemRequest,
};

use super::client::{create_client, AwsConfig};
use super::conversions::{
    attribute_definitions, attributes_to_item, expression_names, expression_values,
    global_secondary_indexes, item_to_attributes, key_schema, provisioned_throughput, table_status,
};
use super::error::{
    map_create_table_error, map_delete_item_error, map_delete_table_error, map_describe_table_error,
    map_get_item_error, map_put_item_error, map_scan_error, map_update_item_error,
};

/// DynamoDB-backed store client.
#[derive(Debug, Clone)]
pub struct DynamoDbStore {
    client: Client,
}

impl DynamoDbStore {
    /// Creates a new store with the given DynamoDB client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a new store for the given endpoint and region.
    pub async fn from_config(config: &AwsConfig) -> Self {
        Self::new(create_client(config).await)
    }

    /// Creates a new store from environment configuration.
    ///
    /// Uses the AWS SDK default credential chain, `AWS_ENDPOINT_URL` and
    /// `AWS_REGION`.
    pub async fn from_env() -> Self {
        Self::from_config(&AwsConfig::from_env()).await
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl StoreClient for DynamoDbStore {
    async fn put_item(&self, request: &PutItemRequest) -> Result<()> {
        self.client
            .put_item()
            .table_name(&request.table_name)
            .set_item(Some(item_to_attributes(&request.item)))
            .send()
            .await
            .map_err(|e| map_put_item_error(e, &request.table_name))?;

        Ok(())
    }

    async fn get_item(&self, request: &GetItemRequest) -> Result<GetItemOutput> {
        let result = self
            .client
            .get_item()
            .table_name(&request.table_name)
            .set_key(Some(item_to_attributes(&request.key)))
            .send()
            .await
            .map_err(|e| map_get_item_error(e, &request.table_name))?;

        let item = result.item.as_ref().map(attributes_to_item).transpose()?;
        Ok(GetItemOutput { item })
    }

    async fn scan(&self, request: &ScanRequest) -> Result<ScanOutput> {
        let limit = request
            .limit
            .map(|limit| i32::try_from(limit).unwrap_or(i32::MAX));

        let result = self
            .client
            .scan()
            .table_name(&request.table_name)
            .set_filter_expression(request.filter_expression.clone())
            .set_expression_attribute_values(expression_values(
                &request.expression_attribute_values,
            ))
            .set_limit(limit)
            .send()
            .await
            .map_err(|e| map_scan_error(e, &request.table_name))?;

        let items = result
            .items
            .unwrap_or_default()
            .iter()
            .map(attributes_to_item)
            .collect::<Result<Vec<_>>>()?;

        Ok(ScanOutput { items })
    }

    async fn update_item(&self, request: &UpdateItemRequest) -> Result<()> {
        self.client
            .update_item()
            .table_name(&request.table_name)
            .set_key(Some(item_to_attributes(&request.key)))
            .update_expression(&request.update_expression)
            .set_expression_attribute_names(expression_names(&request.expression_attribute_names))
            .set_expression_attribute_values(expression_values(
                &request.expression_attribute_values,
            ))
            .send()
            .await
            .map_err(|e| map_update_item_error(e, &request.table_name))?;

        Ok(())
    }

    async fn delete_item(&self, request: &DeleteItemRequest) -> Result<()> {
        self.client
            .delete_item()
            .table_name(&request.table_name)
            .set_key(Some(item_to_attributes(&request.key)))
            .send()
            .await
            .map_err(|e| map_delete_item_error(e, &request.table_name))?;

        Ok(())
    }

    async fn create_table(&self, request: &CreateTableRequest) -> Result<TableDescription> {
        let schema = &request.schema;

        let result = self
            .client
            .create_table()
            .table_name(&request.table_name)
            .set_attribute_definitions(Some(attribute_definitions(schema)?))
            .set_key_schema(Some(key_schema(&schema.key_schema)?))
            .set_global_secondary_indexes(global_secondary_indexes(schema)?)
            .provisioned_throughput(provisioned_throughput(&schema.provisioned_throughput)?)
            .send()
            .await
            .map_err(|e| map_create_table_error(e, &request.table_name))?;

        let status = result
            .table_description()
            .and_then(|description| description.table_status());

        Ok(TableDescription {
            table_name: request.table_name.clone(),
            table_status: table_status(status, TableStatus::Creating),
        })
    }

    async fn delete_table(&self, request: &DeleteTableRequest) -> Result<TableDescription> {
        let result = self
            .client
            .delete_table()
            .table_name(&request.table_name)
            .send()
            .await
            .map_err(|e| map_delete_table_error(e, &request.table_name))?;

        let status = result
            .table_description()
            .and_then(|description| description.table_status());

        Ok(TableDescription {
            table_name: request.table_name.clone(),
            table_status: table_status(status, TableStatus::Deleting),
        })
    }

    async fn describe_table(&self, request: &DescribeTableRequest) -> Result<TableDescription> {
        let result = self
            .client
            .describe_table()
            .table_name(&request.table_name)
            .send()
            .await
            .map_err(|e| map_describe_table_error(e, &request.table_name))?;

        let table = result
            .table()
            .ok_or_else(|| StoreError::ResourceNotFound(request.table_name.clone()))?;

        Ok(TableDescription {
            table_name: request.table_name.clone(),
            table_status: table_status(table.table_status(), TableStatus::Active),
        })
    }
}
