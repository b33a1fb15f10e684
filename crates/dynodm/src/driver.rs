//! Document store driver (Imperative Shell).
//!
//! Orchestrates key resolution, marshalling and criteria compilation from
//! `dynodm_core`, then issues exactly one store request per operation.

use std::sync::Arc;

use dynodm_core::codec::{marshal_item, resolve_keys, unmarshal_item, Item, ValueMap};
use dynodm_core::criteria::{build_update_expression, compile, Predicate};
use dynodm_core::schema::{build_table_schema, EntitySchema};
use dynodm_core::store::{
    CreateTableRequest, DeleteItemRequest, DeleteTableRequest, DescribeTableRequest, GetItemRequest,
    PutItemRequest, ScanRequest, StoreClient, StoreError, StoreRequest, TableStatus,
    UpdateItemRequest,
};

use crate::config::DriverConfig;
use crate::diagnostics::DiagnosticSink;
use crate::error::Result;

/// Entity persistence on top of a [`StoreClient`].
///
/// The driver holds no mutable state: the schema is passed to every call and
/// the configuration is fixed at construction.
pub struct DocumentStoreDriver<C> {
    client: C,
    config: DriverConfig,
    sink: Option<Arc<dyn DiagnosticSink>>,
}

impl<C: StoreClient> DocumentStoreDriver<C> {
    pub fn new(client: C, config: DriverConfig) -> Self {
        Self {
            client,
            config,
            sink: None,
        }
    }

    /// Attaches a sink that sees every request before it is sent.
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Physical table name backing `schema`.
    pub fn table_name(&self, schema: &EntitySchema) -> String {
        self.config.table_name(schema.table())
    }

    /// Writes an entity. Returns the values the store accepted.
    pub async fn add(&self, values: &ValueMap, schema: &EntitySchema) -> Result<ValueMap> {
        resolve_keys(values, schema)?;
        let item = marshal_item(values, schema)?;

        let request = PutItemRequest {
            table_name: self.table_name(schema),
            item,
        };
        self.observe(StoreRequest::PutItem(&request));
        self.client.put_item(&request).await?;

        Ok(unmarshal_item(&request.item)?)
    }

    /// Point lookup. A missing item, or a missing table, yields `None`.
    pub async fn get(&self, values: &ValueMap, schema: &EntitySchema) -> Result<Option<ValueMap>> {
        let request = GetItemRequest {
            table_name: self.table_name(schema),
            key: resolve_keys(values, schema)?,
        };
        self.observe(StoreRequest::GetItem(&request));

        let output = match self.client.get_item(&request).await {
            Ok(output) => output,
            Err(StoreError::ResourceNotFound(table)) => {
                tracing::debug!(%table, "Get against missing table");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        match output.item {
            Some(item) => Ok(Some(unmarshal_item(&item)?)),
            None => Ok(None),
        }
    }

    /// Unfiltered scan.
    pub async fn find_all(&self, schema: &EntitySchema) -> Result<Vec<ValueMap>> {
        let request = ScanRequest::new(self.table_name(schema));
        self.scan(&request).await
    }

    /// Filtered scan.
    pub async fn find_by(
        &self,
        predicate: &Predicate,
        schema: &EntitySchema,
    ) -> Result<Vec<ValueMap>> {
        self.find_by_with_limit(predicate, None, schema).await
    }

    /// Filtered scan reading at most `limit` items.
    ///
    /// The limit applies to items read, before the filter, as the store does.
    pub async fn find_by_with_limit(
        &self,
        predicate: &Predicate,
        limit: Option<u32>,
        schema: &EntitySchema,
    ) -> Result<Vec<ValueMap>> {
        let compiled = compile(predicate, schema)?;

        let mut request = ScanRequest::new(self.table_name(schema));
        request.filter_expression = Some(compiled.expression);
        request.expression_attribute_values = compiled.values;
        request.limit = limit;

        self.scan(&request).await
    }

    /// Sets every present non-key field of `changes` on the item identified
    /// by `key`.
    ///
    /// Returns the changed values, or `None` when the store rejected the
    /// update. Nothing is sent when there is nothing to change.
    pub async fn update(
        &self,
        key: &ValueMap,
        changes: &ValueMap,
        schema: &EntitySchema,
    ) -> Result<Option<ValueMap>> {
        let key = resolve_keys(key, schema)?;
        let changes: Item = marshal_item(changes, schema)?
            .into_iter()
            .filter(|(field, _)| !schema.is_identifier(field))
            .collect();

        let update = build_update_expression(&changes);
        if update.is_empty() {
            tracing::debug!(table = schema.table(), "Update has no changes");
            return Ok(Some(ValueMap::new()));
        }

        let request = UpdateItemRequest {
            table_name: self.table_name(schema),
            key,
            update_expression: update.expression,
            expression_attribute_names: update.names,
            expression_attribute_values: update.values,
        };
        self.observe(StoreRequest::UpdateItem(&request));

        match self.client.update_item(&request).await {
            Ok(()) => Ok(Some(unmarshal_item(&changes)?)),
            Err(e) => {
                tracing::warn!(table = %request.table_name, error = %e, "Update failed");
                Ok(None)
            }
        }
    }

    /// Deletes the identified item. Returns whether the store accepted it.
    pub async fn delete_item(&self, values: &ValueMap, schema: &EntitySchema) -> Result<bool> {
        let request = DeleteItemRequest {
            table_name: self.table_name(schema),
            key: resolve_keys(values, schema)?,
        };
        self.observe(StoreRequest::DeleteItem(&request));

        match self.client.delete_item(&request).await {
            Ok(()) => Ok(true),
            Err(e) => {
                tracing::warn!(table = %request.table_name, error = %e, "Delete failed");
                Ok(false)
            }
        }
    }

    /// Creates the table backing `schema`. Does not wait for it to be active.
    pub async fn create_table(&self, schema: &EntitySchema) -> Result<bool> {
        let request = CreateTableRequest {
            table_name: self.table_name(schema),
            schema: build_table_schema(schema)?,
        };
        self.observe(StoreRequest::CreateTable(&request));

        match self.client.create_table(&request).await {
            Ok(description) => {
                tracing::info!(
                    table = %description.table_name,
                    status = %description.table_status,
                    "Table created"
                );
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(table = %request.table_name, error = %e, "Create table failed");
                Ok(false)
            }
        }
    }

    /// Deletes the table backing `schema`. Does not wait for it to be gone.
    pub async fn delete_table(&self, schema: &EntitySchema) -> bool {
        let request = DeleteTableRequest {
            table_name: self.table_name(schema),
        };
        self.observe(StoreRequest::DeleteTable(&request));

        match self.client.delete_table(&request).await {
            Ok(description) => {
                tracing::info!(
                    table = %description.table_name,
                    status = %description.table_status,
                    "Table deleted"
                );
                true
            }
            Err(e) => {
                tracing::warn!(table = %request.table_name, error = %e, "Delete table failed");
                false
            }
        }
    }

    /// Single-shot status check. Any describe failure reads as not present.
    pub async fn table_status(&self, schema: &EntitySchema) -> TableStatus {
        let request = DescribeTableRequest {
            table_name: self.table_name(schema),
        };
        self.observe(StoreRequest::DescribeTable(&request));

        match self.client.describe_table(&request).await {
            Ok(description) => description.table_status,
            Err(e) => {
                if !e.is_resource_not_found() {
                    tracing::warn!(
                        table = %request.table_name,
                        error = %e,
                        "Describe table failed"
                    );
                }
                TableStatus::NotPresent
            }
        }
    }

    /// Whether the table exists and is not being deleted.
    pub async fn is_table(&self, schema: &EntitySchema) -> bool {
        self.table_status(schema).await.is_usable()
    }

    async fn scan(&self, request: &ScanRequest) -> Result<Vec<ValueMap>> {
        self.observe(StoreRequest::Scan(request));
        let output = self.client.scan(request).await?;

        output
            .items
            .iter()
            .map(|item| unmarshal_item(item).map_err(Into::into))
            .collect()
    }

    fn observe(&self, request: StoreRequest<'_>) {
        tracing::debug!(
            operation = request.operation(),
            table = request.table_name(),
            "Sending store request"
        );
        if let Some(sink) = &self.sink {
            sink.record(&request);
        }
    }
}
