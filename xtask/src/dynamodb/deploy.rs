//! Table deployment operations (Imperative Shell).

use dynodm::{
    wait_for_table_absent, wait_for_table_active, DocumentStoreDriver, EntitySchema, RetryPolicy,
    StoreClient, ValueMap,
};

use super::error::{DynamodbError, Result};
use super::planning::{DeployPlan, DestroyPlan};

/// Execute a deploy plan.
pub async fn execute_deploy_plan<C: StoreClient>(
    driver: &DocumentStoreDriver<C>,
    schema: &EntitySchema,
    plan: &DeployPlan,
    policy: &RetryPolicy,
) -> Result<()> {
    match plan {
        DeployPlan::CreateTable {
            table_name,
            pending_deletion,
            ..
        } => {
            if *pending_deletion {
                wait_for_table_absent(driver, schema, policy).await?;
            }
            if !driver.create_table(schema).await? {
                return Err(DynamodbError::TableCreationFailed {
                    table_name: table_name.clone(),
                });
            }
            wait_for_table_active(driver, schema, policy).await?;
        }
        DeployPlan::NoChanges { .. } => {}
    }
    Ok(())
}

/// Execute a destroy plan.
pub async fn execute_destroy_plan<C: StoreClient>(
    driver: &DocumentStoreDriver<C>,
    schema: &EntitySchema,
    plan: &DestroyPlan,
    policy: &RetryPolicy,
) -> Result<()> {
    match plan {
        DestroyPlan::DeleteTable { table_name } => {
            if !driver.delete_table(schema).await {
                return Err(DynamodbError::TableDeletionFailed {
                    table_name: table_name.clone(),
                });
            }
            wait_for_table_absent(driver, schema, policy).await?;
        }
        DestroyPlan::AlreadyGone { .. } => {}
    }
    Ok(())
}

/// Adds every item, stopping at the first failure. Returns the number added.
pub async fn seed_items<C: StoreClient>(
    driver: &DocumentStoreDriver<C>,
    schema: &EntitySchema,
    items: &[ValueMap],
) -> Result<usize> {
    if !driver.is_table(schema).await {
        return Err(DynamodbError::TableNotFound {
            table_name: driver.table_name(schema),
        });
    }

    for item in items {
        driver.add(item, schema).await?;
    }
    Ok(items.len())
}
