use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::codec::{Item, WireValue};
use crate::schema::TableSchemaDescriptor;

/// Writes a whole item, replacing any item with the same key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutItemRequest {
    pub table_name: String,
    pub item: Item,
}

/// Point lookup by primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetItemRequest {
    pub table_name: String,
    pub key: Item,
}

/// Full-table scan with an optional filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScanRequest {
    pub table_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_expression: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub expression_attribute_values: BTreeMap<String, WireValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl ScanRequest {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            filter_expression: None,
            expression_attribute_values: BTreeMap::new(),
            limit: None,
        }
    }
}

/// Partial update of an existing item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateItemRequest {
    pub table_name: String,
    pub key: Item,
    pub update_expression: String,
    pub expression_attribute_names: BTreeMap<String, String>,
    pub expression_attribute_values: BTreeMap<String, WireValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteItemRequest {
    pub table_name: String,
    pub key: Item,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateTableRequest {
    pub table_name: String,
    #[serde(flatten)]
    pub schema: TableSchemaDescriptor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteTableRequest {
    pub table_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeTableRequest {
    pub table_name: String,
}

/// Any request, borrowed, as handed to a diagnostic sink.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum StoreRequest<'a> {
    PutItem(&'a PutItemRequest),
    GetItem(&'a GetItemRequest),
    Scan(&'a ScanRequest),
    UpdateItem(&'a UpdateItemRequest),
    DeleteItem(&'a DeleteItemRequest),
    CreateTable(&'a CreateTableRequest),
    DeleteTable(&'a DeleteTableRequest),
    DescribeTable(&'a DescribeTableRequest),
}

impl StoreRequest<'_> {
    /// Operation name as the store API spells it.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::PutItem(_) => "putItem",
            Self::GetItem(_) => "getItem",
            Self::Scan(_) => "scan",
            Self::UpdateItem(_) => "updateItem",
            Self::DeleteItem(_) => "deleteItem",
            Self::CreateTable(_) => "createTable",
            Self::DeleteTable(_) => "deleteTable",
            Self::DescribeTable(_) => "describeTable",
        }
    }

    pub fn table_name(&self) -> &str {
        match self {
            Self::PutItem(r) => &r.table_name,
            Self::GetItem(r) => &r.table_name,
            Self::Scan(r) => &r.table_name,
            Self::UpdateItem(r) => &r.table_name,
            Self::DeleteItem(r) => &r.table_name,
            Self::CreateTable(r) => &r.table_name,
            Self::DeleteTable(r) => &r.table_name,
            Self::DescribeTable(r) => &r.table_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GetItemOutput {
    pub item: Option<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanOutput {
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescription {
    pub table_name: String,
    pub table_status: TableStatus,
}

/// Lifecycle status of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    Creating,
    Updating,
    Deleting,
    Active,
    /// A status this crate does not model, kept verbatim.
    Other(String),
    /// The table does not exist, or could not be described.
    NotPresent,
}

impl TableStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "CREATING" => Self::Creating,
            "UPDATING" => Self::Updating,
            "DELETING" => Self::Deleting,
            "ACTIVE" => Self::Active,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Creating => "CREATING",
            Self::Updating => "UPDATING",
            Self::Deleting => "DELETING",
            Self::Active => "ACTIVE",
            Self::Other(status) => status,
            Self::NotPresent => "NOT_PRESENT",
        }
    }

    /// A table can take requests in any status but deleting or absent.
    pub fn is_usable(&self) -> bool {
        !matches!(self, Self::Deleting | Self::NotPresent)
    }
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_status_parse() {
        assert_eq!(TableStatus::parse("ACTIVE"), TableStatus::Active);
        assert_eq!(TableStatus::parse("CREATING"), TableStatus::Creating);
        assert_eq!(
            TableStatus::parse("ARCHIVED"),
            TableStatus::Other("ARCHIVED".to_string())
        );
        assert_eq!(TableStatus::parse("ARCHIVED").as_str(), "ARCHIVED");
    }

    #[test]
    fn test_table_status_usable() {
        assert!(TableStatus::Active.is_usable());
        assert!(TableStatus::Creating.is_usable());
        assert!(TableStatus::Updating.is_usable());
        assert!(!TableStatus::Deleting.is_usable());
        assert!(!TableStatus::NotPresent.is_usable());
    }

    #[test]
    fn test_scan_request_payload() {
        let mut request = ScanRequest::new("default_oauth_users");
        request.filter_expression = Some("age = :v0".to_string());
        request
            .expression_attribute_values
            .insert(":v0".to_string(), WireValue::Num("22".to_string()));

        let json = serde_json::to_value(StoreRequest::Scan(&request)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "TableName": "default_oauth_users",
                "FilterExpression": "age = :v0",
                "ExpressionAttributeValues": {":v0": {"N": "22"}},
            })
        );
    }

    #[test]
    fn test_request_metadata() {
        let request = DeleteTableRequest {
            table_name: "default_scope".to_string(),
        };
        let request = StoreRequest::DeleteTable(&request);

        assert_eq!(request.operation(), "deleteTable");
        assert_eq!(request.table_name(), "default_scope");
    }
}
