//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `StoreError` from `dynodm_core::store`.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::operation::create_table::CreateTableError;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::delete_table::DeleteTableError;
use aws_sdk_dynamodb::operation::describe_table::DescribeTableError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::scan::ScanError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use dynodm_core::store::StoreError;

fn throughput_exceeded() -> StoreError {
    StoreError::ThroughputExceeded("Throughput exceeded, please retry".to_string())
}

fn request_limit_exceeded() -> StoreError {
    StoreError::ThroughputExceeded("Request limit exceeded, please retry".to_string())
}

fn internal_server_error() -> StoreError {
    StoreError::RequestFailed("DynamoDB internal server error".to_string())
}

/// Transport-level failures never reach the service, so they carry no error code.
fn connection_failure<E, R>(err: &SdkError<E, R>) -> Option<StoreError>
where
    E: std::error::Error + 'static,
    R: Debug,
{
    match err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
            Some(StoreError::ConnectionFailed(err.to_string()))
        }
        _ => None,
    }
}

/// Catch-all for service errors without a dedicated variant.
fn unhandled<E: ProvideErrorMetadata + Debug>(operation: &str, err: E) -> StoreError {
    match err.code() {
        Some("ValidationException") => {
            StoreError::Validation(err.message().unwrap_or_default().to_string())
        }
        _ => StoreError::RequestFailed(format!("{operation} failed: {:?}", err)),
    }
}

/// Map a PutItem SDK error to StoreError.
pub fn map_put_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
    table_name: &str,
) -> StoreError {
    if let Some(e) = connection_failure(&err) {
        return e;
    }
    match err.into_service_error() {
        PutItemError::ResourceNotFoundException(_) => {
            StoreError::ResourceNotFound(table_name.to_string())
        }
        PutItemError::ConditionalCheckFailedException(e) => {
            StoreError::ConditionalCheckFailed(e.to_string())
        }
        PutItemError::ProvisionedThroughputExceededException(_) => throughput_exceeded(),
        PutItemError::RequestLimitExceeded(_) => request_limit_exceeded(),
        PutItemError::ItemCollectionSizeLimitExceededException(_) => {
            StoreError::RequestFailed("Item collection size limit exceeded".to_string())
        }
        PutItemError::TransactionConflictException(_) => {
            StoreError::RequestFailed("Transaction conflict, please retry".to_string())
        }
        PutItemError::InternalServerError(_) => internal_server_error(),
        err => unhandled("PutItem", err),
    }
}

/// Map a GetItem SDK error to StoreError.
pub fn map_get_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<GetItemError, R>,
    table_name: &str,
) -> StoreError {
    if let Some(e) = connection_failure(&err) {
        return e;
    }
    match err.into_service_error() {
        GetItemError::ResourceNotFoundException(_) => {
            StoreError::ResourceNotFound(table_name.to_string())
        }
        GetItemError::ProvisionedThroughputExceededException(_) => throughput_exceeded(),
        GetItemError::RequestLimitExceeded(_) => request_limit_exceeded(),
        GetItemError::InternalServerError(_) => internal_server_error(),
        err => unhandled("GetItem", err),
    }
}

/// Map a Scan SDK error to StoreError.
pub fn map_scan_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<ScanError, R>,
    table_name: &str,
) -> StoreError {
    if let Some(e) = connection_failure(&err) {
        return e;
    }
    match err.into_service_error() {
        ScanError::ResourceNotFoundException(_) => {
            StoreError::ResourceNotFound(table_name.to_string())
        }
        ScanError::ProvisionedThroughputExceededException(_) => throughput_exceeded(),
        ScanError::RequestLimitExceeded(_) => request_limit_exceeded(),
        ScanError::InternalServerError(_) => internal_server_error(),
        err => unhandled("Scan", err),
    }
}

/// Map an UpdateItem SDK error to StoreError.
pub fn map_update_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<UpdateItemError, R>,
    table_name: &str,
) -> StoreError {
    if let Some(e) = connection_failure(&err) {
        return e;
    }
    match err.into_service_error() {
        UpdateItemError::ResourceNotFoundException(_) => {
            StoreError::ResourceNotFound(table_name.to_string())
        }
        UpdateItemError::ConditionalCheckFailedException(e) => {
            StoreError::ConditionalCheckFailed(e.to_string())
        }
        UpdateItemError::ProvisionedThroughputExceededException(_) => throughput_exceeded(),
        UpdateItemError::RequestLimitExceeded(_) => request_limit_exceeded(),
        UpdateItemError::ItemCollectionSizeLimitExceededException(_) => {
            StoreError::RequestFailed("Item collection size limit exceeded".to_string())
        }
        UpdateItemError::TransactionConflictException(_) => {
            StoreError::RequestFailed("Transaction conflict, please retry".to_string())
        }
        UpdateItemError::InternalServerError(_) => internal_server_error(),
        err => unhandled("UpdateItem", err),
    }
}

/// Map a DeleteItem SDK error to StoreError.
pub fn map_delete_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DeleteItemError, R>,
    table_name: &str,
) -> StoreError {
    if let Some(e) = connection_failure(&err) {
        return e;
    }
    match err.into_service_error() {
        DeleteItemError::ResourceNotFoundException(_) => {
            StoreError::ResourceNotFound(table_name.to_string())
        }
        DeleteItemError::ConditionalCheckFailedException(e) => {
            StoreError::ConditionalCheckFailed(e.to_string())
        }
        DeleteItemError::ProvisionedThroughputExceededException(_) => throughput_exceeded(),
        DeleteItemError::RequestLimitExceeded(_) => request_limit_exceeded(),
        DeleteItemError::TransactionConflictException(_) => {
            StoreError::RequestFailed("Transaction conflict, please retry".to_string())
        }
        DeleteItemError::InternalServerError(_) => internal_server_error(),
        err => unhandled("DeleteItem", err),
    }
}

/// Map a CreateTable SDK error to StoreError.
pub fn map_create_table_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<CreateTableError, R>,
    table_name: &str,
) -> StoreError {
    if let Some(e) = connection_failure(&err) {
        return e;
    }
    match err.into_service_error() {
        CreateTableError::ResourceInUseException(_) => {
            StoreError::ResourceInUse(table_name.to_string())
        }
        CreateTableError::LimitExceededException(_) => {
            StoreError::ThroughputExceeded("Table operation limit exceeded".to_string())
        }
        CreateTableError::InternalServerError(_) => internal_server_error(),
        err => unhandled("CreateTable", err),
    }
}

/// Map a DeleteTable SDK error to StoreError.
pub fn map_delete_table_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DeleteTableError, R>,
    table_name: &str,
) -> StoreError {
    if let Some(e) = connection_failure(&err) {
        return e;
    }
    match err.into_service_error() {
        DeleteTableError::ResourceNotFoundException(_) => {
            StoreError::ResourceNotFound(table_name.to_string())
        }
        DeleteTableError::ResourceInUseException(_) => {
            StoreError::ResourceInUse(table_name.to_string())
        }
        DeleteTableError::LimitExceededException(_) => {
            StoreError::ThroughputExceeded("Table operation limit exceeded".to_string())
        }
        DeleteTableError::InternalServerError(_) => internal_server_error(),
        err => unhandled("DeleteTable", err),
    }
}

/// Map a DescribeTable SDK error to StoreError.
pub fn map_describe_table_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DescribeTableError, R>,
    table_name: &str,
) -> StoreError {
    if let Some(e) = connection_failure(&err) {
        return e;
    }
    match err.into_service_error() {
        DescribeTableError::ResourceNotFoundException(_) => {
            StoreError::ResourceNotFound(table_name.to_string())
        }
        DescribeTableError::InternalServerError(_) => internal_server_error(),
        err => unhandled("DescribeTable", err),
    }
}
