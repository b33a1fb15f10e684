//! DynamoDB table management commands.
//!
//! Tables are derived from entity schema files; see `xtask/schemas/` for
//! examples of the format.

mod config;
mod deploy;
mod error;
mod planning;

pub use error::{DynamodbError, Result};

use std::path::PathBuf;

use crate::prelude::*;
use dialoguer::Confirm;
use dynodm::storage::dynamodb::{AwsConfig, DynamoDbStore};
use dynodm::{DocumentStoreDriver, DriverConfig, EntitySchema, RetryPolicy};
use dynodm_core::schema::build_table_schema;

const ENVIRONMENT_HELP: &str = "Environment variables:
  AWS_ENDPOINT_URL     - Use local DynamoDB (e.g., http://localhost:8000)
  AWS_REGION           - AWS region (defaults to us-east-1)
  AWS_PROFILE          - AWS profile to use for credentials
  DYNODM_TABLE_PREFIX  - Prefix prepended to every table name (defaults to default_)";

/// DynamoDB table management commands.
#[derive(Debug, clap::Parser)]
pub struct DynamodbCommand {
    #[command(subcommand)]
    pub action: DynamodbAction,
}

/// Available DynamoDB actions.
#[derive(Debug, clap::Subcommand)]
pub enum DynamodbAction {
    /// Create the table backing an entity schema.
    Deploy(DeployCommand),

    /// Delete the table backing an entity schema.
    Destroy(DestroyCommand),

    /// Show the status of the table backing an entity schema.
    Status(StatusCommand),

    /// Insert items from a JSON file.
    Seed(SeedCommand),
}

/// Options shared by every action.
#[derive(Debug, clap::Args)]
pub struct SchemaArgs {
    /// Entity schema file (JSON).
    #[arg(long, value_name = "PATH")]
    pub schema: PathBuf,

    /// Table name prefix, overriding `DYNODM_TABLE_PREFIX`.
    #[arg(long)]
    pub table_prefix: Option<String>,
}

impl SchemaArgs {
    fn driver_config(&self) -> DriverConfig {
        match &self.table_prefix {
            Some(prefix) => DriverConfig::from_env().with_table_prefix(prefix),
            None => DriverConfig::from_env(),
        }
    }
}

/// Create the table backing an entity schema.
#[derive(Debug, clap::Parser)]
#[command(long_about = format!("Create the DynamoDB table backing an entity schema.

The table name, key schema and Global Secondary Indexes (GSIs) are derived
from the schema file. The command shows a plan of changes before applying,
asks for confirmation, and waits for the table to become ACTIVE.

{ENVIRONMENT_HELP}"))]
pub struct DeployCommand {
    #[command(flatten)]
    pub target: SchemaArgs,

    /// Skip confirmation prompts.
    #[arg(long)]
    pub force: bool,
}

/// Delete the table backing an entity schema.
#[derive(Debug, clap::Parser)]
#[command(long_about = format!("Delete the DynamoDB table backing an entity schema.

The command shows a plan before applying, asks for confirmation, and waits
for the table to disappear.

{ENVIRONMENT_HELP}"))]
pub struct DestroyCommand {
    #[command(flatten)]
    pub target: SchemaArgs,

    /// Skip confirmation prompts.
    #[arg(long)]
    pub force: bool,
}

/// Show the status of the table backing an entity schema.
#[derive(Debug, clap::Parser)]
pub struct StatusCommand {
    #[command(flatten)]
    pub target: SchemaArgs,
}

/// Insert items from a JSON file.
#[derive(Debug, clap::Parser)]
#[command(long_about = "Insert items into the table backing an entity schema.

The items file holds a JSON array of flat objects. Fields not declared by
the schema are ignored; every object must carry the key fields.")]
pub struct SeedCommand {
    #[command(flatten)]
    pub target: SchemaArgs,

    /// Items file (JSON array of objects).
    #[arg(long, value_name = "PATH")]
    pub items: PathBuf,

    /// Skip confirmation prompts.
    #[arg(long)]
    pub force: bool,
}

/// Main entry point for dynamodb command.
pub async fn run(command: DynamodbCommand, global: crate::Global) -> Result<()> {
    match command.action {
        DynamodbAction::Deploy(cmd) => run_deploy(cmd, &global).await,
        DynamodbAction::Destroy(cmd) => run_destroy(cmd, &global).await,
        DynamodbAction::Status(cmd) => run_status(cmd, &global).await,
        DynamodbAction::Seed(cmd) => run_seed(cmd, &global).await,
    }
}

async fn connect(
    target: &SchemaArgs,
    global: &crate::Global,
) -> Result<(DocumentStoreDriver<DynamoDbStore>, EntitySchema)> {
    let schema = config::load_schema(&target.schema)?;
    let aws_config = AwsConfig::from_env();
    let driver = DocumentStoreDriver::new(
        DynamoDbStore::from_config(&aws_config).await,
        target.driver_config(),
    );

    if !global.is_silent() {
        aprintln!("{} {}", p_b("Target:"), aws_config.target_display());
        aprintln!("{} {}", p_b("Table:"), driver.table_name(&schema));
        aprintln!();
    }

    Ok((driver, schema))
}

fn confirm(prompt: &str, default: bool) -> Result<()> {
    let confirmed = Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(|e| DynamodbError::Prompt(e.to_string()))?;

    if confirmed {
        Ok(())
    } else {
        Err(DynamodbError::UserCancelled)
    }
}

async fn run_deploy(cmd: DeployCommand, global: &crate::Global) -> Result<()> {
    let (driver, schema) = connect(&cmd.target, global).await?;
    let table_name = driver.table_name(&schema);
    let descriptor = build_table_schema(&schema).map_err(dynodm::DriverError::from)?;
    let current = driver.table_status(&schema).await;

    let plan = planning::calculate_deploy_plan(&current, &table_name, &descriptor);

    if !global.is_silent() {
        aprintln!("{}", p_c("Deploy Plan:"));
        for line in planning::format_deploy_plan(&plan) {
            aprintln!("  {}", paint_plan_line(&line));
        }
        aprintln!();
    }

    if matches!(plan, planning::DeployPlan::NoChanges { .. }) {
        if !global.is_silent() {
            aprintln!("{}", p_g("Table is up to date."));
        }
        return Ok(());
    }

    if !cmd.force {
        confirm("Apply these changes?", true)?;
    }

    if !global.is_silent() {
        aprintln!("{}", p_b("Creating table..."));
    }

    deploy::execute_deploy_plan(&driver, &schema, &plan, &RetryPolicy::default()).await?;

    if !global.is_silent() {
        aprintln!("{}", p_g("Table deployed successfully."));
    }

    Ok(())
}

async fn run_destroy(cmd: DestroyCommand, global: &crate::Global) -> Result<()> {
    let (driver, schema) = connect(&cmd.target, global).await?;
    let table_name = driver.table_name(&schema);
    let current = driver.table_status(&schema).await;

    let plan = planning::calculate_destroy_plan(&current, &table_name);

    if !global.is_silent() {
        aprintln!("{}", p_y("Destroy Plan:"));
        for line in planning::format_destroy_plan(&plan) {
            aprintln!("  {}", paint_plan_line(&line));
        }
        aprintln!();
    }

    if matches!(plan, planning::DestroyPlan::AlreadyGone { .. }) {
        if !global.is_silent() {
            aprintln!("{}", p_g("Nothing to destroy."));
        }
        return Ok(());
    }

    if !cmd.force {
        confirm(
            "Are you sure you want to delete this table? ALL DATA WILL BE LOST",
            false,
        )?;
    }

    if !global.is_silent() {
        aprintln!("{}", p_b("Deleting table..."));
    }

    deploy::execute_destroy_plan(&driver, &schema, &plan, &RetryPolicy::default()).await?;

    if !global.is_silent() {
        aprintln!("{}", p_g("Table destroyed successfully."));
    }

    Ok(())
}

async fn run_status(cmd: StatusCommand, global: &crate::Global) -> Result<()> {
    let (driver, schema) = connect(&cmd.target, global).await?;
    let status = driver.table_status(&schema).await;

    let rendered = status.to_string();
    let painted = if status.is_usable() {
        p_g(&rendered)
    } else {
        p_r(&rendered)
    };
    aprintln!("{} {}", p_b("Status:"), painted);

    Ok(())
}

async fn run_seed(cmd: SeedCommand, global: &crate::Global) -> Result<()> {
    let items = config::load_items(&cmd.items)?;
    let (driver, schema) = connect(&cmd.target, global).await?;

    if !global.is_silent() {
        aprintln!("{} {}", p_b("Item count:"), items.len());
        aprintln!();
    }

    if !cmd.force {
        confirm(&format!("Insert {} items?", items.len()), true)?;
    }

    let inserted = deploy::seed_items(&driver, &schema, &items).await?;

    if !global.is_silent() {
        aprintln!("{} {} items inserted.", p_g("Success:"), inserted);
    }

    Ok(())
}
