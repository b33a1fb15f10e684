//! Table lifecycle polling.
//!
//! The driver only offers a single-shot status check. These helpers poll it
//! with a bounded, increasing backoff until a table settles.

use std::time::Duration;

use dynodm_core::schema::EntitySchema;
use dynodm_core::store::{StoreClient, TableStatus};

use crate::driver::DocumentStoreDriver;
use crate::error::{DriverError, Result};

/// Bounded polling schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay before the given zero-based attempt: `attempt * (attempt + 1) * base`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(attempt.saturating_mul(attempt.saturating_add(1)))
    }
}

impl Default for RetryPolicy {
    /// 5 attempts, waiting 0s, 2s, 6s, 12s and 20s.
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
        }
    }
}

/// Polls until the table is `ACTIVE`.
pub async fn wait_for_table_active<C: StoreClient>(
    driver: &DocumentStoreDriver<C>,
    schema: &EntitySchema,
    policy: &RetryPolicy,
) -> Result<()> {
    wait_for(driver, schema, policy, "ACTIVE", |status| {
        *status == TableStatus::Active
    })
    .await
}

/// Polls until the table no longer exists.
pub async fn wait_for_table_absent<C: StoreClient>(
    driver: &DocumentStoreDriver<C>,
    schema: &EntitySchema,
    policy: &RetryPolicy,
) -> Result<()> {
    wait_for(driver, schema, policy, "absent", |status| {
        *status == TableStatus::NotPresent
    })
    .await
}

async fn wait_for<C, F>(
    driver: &DocumentStoreDriver<C>,
    schema: &EntitySchema,
    policy: &RetryPolicy,
    expected: &'static str,
    settled: F,
) -> Result<()>
where
    C: StoreClient,
    F: Fn(&TableStatus) -> bool,
{
    let table = driver.table_name(schema);

    for attempt in 0..policy.max_attempts {
        let delay = policy.delay_for(attempt);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let status = driver.table_status(schema).await;
        if settled(&status) {
            tracing::info!(%table, %status, attempt, "Table settled");
            return Ok(());
        }
        tracing::debug!(%table, %status, attempt, "Waiting for table to become {expected}");
    }

    Err(DriverError::LifecycleTimeout {
        table,
        expected,
        attempts: policy.max_attempts,
    })
}
