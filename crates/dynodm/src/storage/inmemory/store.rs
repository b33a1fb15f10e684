//! In-memory store client.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use dynodm_core::codec::{Item, Number, WireValue};
use dynodm_core::schema::{ScalarAttributeType, TableSchemaDescriptor};
use dynodm_core::store::{
    CreateTableRequest, DeleteItemRequest, DeleteTableRequest, DescribeTableRequest, GetItemOutput,
    GetItemRequest, PutItemRequest, Result, ScanOutput, ScanRequest, StoreClient, StoreError,
    TableDescription, TableStatus, UpdateItemRequest,
};

use super::expression::{evaluate, parse_condition, parse_update, Bindings};

/// Key attribute values in key-schema order.
type ItemKey = Vec<WireValue>;

#[derive(Debug)]
struct Table {
    schema: TableSchemaDescriptor,
    status: TableStatus,
    /// Describe calls left before a creating or deleting table settles.
    polls_remaining: u32,
    items: BTreeMap<ItemKey, Item>,
}

impl Table {
    fn key_of(&self, attributes: &Item, exact: bool) -> Result<ItemKey> {
        if exact && attributes.len() != self.schema.key_schema.len() {
            return Err(StoreError::Validation(
                "The provided key element does not match the schema".to_string(),
            ));
        }

        self.schema
            .key_schema
            .iter()
            .map(|element| {
                let name = &element.attribute_name;
                let value = attributes.get(name).ok_or_else(|| {
                    StoreError::Validation(format!("Missing the key {name} in the item"))
                })?;
                key_value(name, value, self.schema.attribute_type(name))
            })
            .collect()
    }

    fn is_key_attribute(&self, name: &str) -> bool {
        self.schema
            .key_schema
            .iter()
            .any(|element| element.attribute_name == name)
    }

    fn ensure_writable(&self, table_name: &str) -> Result<()> {
        match self.status {
            TableStatus::Deleting => Err(StoreError::ResourceNotFound(table_name.to_string())),
            _ => Ok(()),
        }
    }
}

/// Checks a key value against its declared type. Numbers are normalised so
/// `1` and `1.0` address the same item.
fn key_value(
    name: &str,
    value: &WireValue,
    attribute_type: Option<ScalarAttributeType>,
) -> Result<WireValue> {
    let mismatch = || {
        StoreError::Validation(format!(
            "One or more parameter values were invalid: Type mismatch for key {name}"
        ))
    };

    match (attribute_type, value) {
        (Some(ScalarAttributeType::S), WireValue::Str(_))
        | (Some(ScalarAttributeType::B), WireValue::Binary(_)) => Ok(value.clone()),
        (Some(ScalarAttributeType::N), WireValue::Num(n)) => Number::parse(n)
            .map(|n| WireValue::Num(n.to_string()))
            .ok_or_else(mismatch),
        _ => Err(mismatch()),
    }
}

/// In-memory store backend for testing.
///
/// Tables live in a `HashMap` wrapped in `Arc<RwLock<_>>`. Data is not
/// persisted and is lost when the last clone is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<HashMap<String, Table>>>,
    transition_polls: u32,
}

impl InMemoryStore {
    /// Creates an empty store whose tables settle immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps new tables `CREATING`, and deleted ones `DELETING`, for `polls`
    /// describe calls before they settle.
    pub fn with_transition_polls(mut self, polls: u32) -> Self {
        self.transition_polls = polls;
        self
    }

    /// Names of all existing tables, sorted.
    pub async fn table_names(&self) -> Vec<String> {
        let tables = self.tables.read().await;
        let mut names: Vec<String> = tables.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of items in a table, if it exists.
    pub async fn item_count(&self, table_name: &str) -> Option<usize> {
        let tables = self.tables.read().await;
        tables.get(table_name).map(|table| table.items.len())
    }
}

fn not_found(table_name: &str) -> StoreError {
    StoreError::ResourceNotFound(table_name.to_string())
}

#[async_trait]
impl StoreClient for InMemoryStore {
    async fn put_item(&self, request: &PutItemRequest) -> Result<()> {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(&request.table_name)
            .ok_or_else(|| not_found(&request.table_name))?;
        table.ensure_writable(&request.table_name)?;

        let key = table.key_of(&request.item, false)?;
        table.items.insert(key, request.item.clone());
        Ok(())
    }

    async fn get_item(&self, request: &GetItemRequest) -> Result<GetItemOutput> {
        let tables = self.tables.read().await;
        let table = tables
            .get(&request.table_name)
            .ok_or_else(|| not_found(&request.table_name))?;

        let key = table.key_of(&request.key, true)?;
        Ok(GetItemOutput {
            item: table.items.get(&key).cloned(),
        })
    }

    async fn scan(&self, request: &ScanRequest) -> Result<ScanOutput> {
        let tables = self.tables.read().await;
        let table = tables
            .get(&request.table_name)
            .ok_or_else(|| not_found(&request.table_name))?;

        let condition = request
            .filter_expression
            .as_deref()
            .map(parse_condition)
            .transpose()?;
        let names = BTreeMap::new();
        let bindings = Bindings {
            names: &names,
            values: &request.expression_attribute_values,
        };

        let limit = request.limit.map_or(usize::MAX, |l| l as usize);
        let mut items = Vec::new();
        for item in table.items.values().take(limit) {
            let keep = match &condition {
                Some(condition) => evaluate(condition, item, &bindings)?,
                None => true,
            };
            if keep {
                items.push(item.clone());
            }
        }

        Ok(ScanOutput { items })
    }

    async fn update_item(&self, request: &UpdateItemRequest) -> Result<()> {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(&request.table_name)
            .ok_or_else(|| not_found(&request.table_name))?;
        table.ensure_writable(&request.table_name)?;

        let key = table.key_of(&request.key, true)?;
        let bindings = Bindings {
            names: &request.expression_attribute_names,
            values: &request.expression_attribute_values,
        };

        // Resolve everything before touching the item so a bad clause writes nothing.
        let mut changes = Vec::new();
        for assignment in parse_update(&request.update_expression)? {
            let name = bindings.attribute_name(&assignment.path)?;
            if table.is_key_attribute(name) {
                return Err(StoreError::Validation(format!(
                    "Cannot update attribute {name}. This attribute is part of the key"
                )));
            }
            let value = bindings.value(&assignment.value)?.clone();
            changes.push((name.to_string(), value));
        }

        let item = table
            .items
            .entry(key)
            .or_insert_with(|| request.key.clone());
        item.extend(changes);
        Ok(())
    }

    async fn delete_item(&self, request: &DeleteItemRequest) -> Result<()> {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(&request.table_name)
            .ok_or_else(|| not_found(&request.table_name))?;
        table.ensure_writable(&request.table_name)?;

        let key = table.key_of(&request.key, true)?;
        table.items.remove(&key);
        Ok(())
    }

    async fn create_table(&self, request: &CreateTableRequest) -> Result<TableDescription> {
        let mut tables = self.tables.write().await;
        if tables.contains_key(&request.table_name) {
            return Err(StoreError::ResourceInUse(format!(
                "Table already exists: {}",
                request.table_name
            )));
        }

        let schema = &request.schema;
        if schema.key_schema.is_empty() {
            return Err(StoreError::Validation(
                "No key schema was provided".to_string(),
            ));
        }
        let index_keys = schema
            .global_secondary_indexes
            .iter()
            .flat_map(|index| index.key_schema.iter());
        for element in schema.key_schema.iter().chain(index_keys) {
            if schema.attribute_type(&element.attribute_name).is_none() {
                return Err(StoreError::Validation(format!(
                    "No attribute definition for key attribute {}",
                    element.attribute_name
                )));
            }
        }

        let status = if self.transition_polls == 0 {
            TableStatus::Active
        } else {
            TableStatus::Creating
        };
        tables.insert(
            request.table_name.clone(),
            Table {
                schema: schema.clone(),
                status: status.clone(),
                polls_remaining: self.transition_polls,
                items: BTreeMap::new(),
            },
        );

        Ok(TableDescription {
            table_name: request.table_name.clone(),
            table_status: status,
        })
    }

    async fn delete_table(&self, request: &DeleteTableRequest) -> Result<TableDescription> {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(&request.table_name)
            .ok_or_else(|| not_found(&request.table_name))?;

        if table.status == TableStatus::Deleting {
            return Err(StoreError::ResourceInUse(format!(
                "Table is being deleted: {}",
                request.table_name
            )));
        }

        if self.transition_polls == 0 {
            tables.remove(&request.table_name);
        } else {
            table.status = TableStatus::Deleting;
            table.polls_remaining = self.transition_polls;
        }

        Ok(TableDescription {
            table_name: request.table_name.clone(),
            table_status: TableStatus::Deleting,
        })
    }

    async fn describe_table(&self, request: &DescribeTableRequest) -> Result<TableDescription> {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(&request.table_name)
            .ok_or_else(|| not_found(&request.table_name))?;

        if matches!(table.status, TableStatus::Creating | TableStatus::Deleting) {
            table.polls_remaining = table.polls_remaining.saturating_sub(1);
            if table.polls_remaining == 0 {
                if table.status == TableStatus::Deleting {
                    tables.remove(&request.table_name);
                    return Err(not_found(&request.table_name));
                }
                table.status = TableStatus::Active;
            }
        }

        Ok(TableDescription {
            table_name: request.table_name.clone(),
            table_status: table.status.clone(),
        })
    }
}
