//! Pure functions for calculating deployment plans (Functional Core).

use dynodm::TableStatus;
use dynodm_core::schema::{KeySchemaElement, KeyType, TableSchemaDescriptor};

/// Planned changes for deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployPlan {
    /// Table doesn't exist, needs to be created.
    CreateTable {
        table_name: String,
        schema: TableSchemaDescriptor,
        /// The previous table is still being deleted.
        pending_deletion: bool,
    },
    /// Table exists, no changes needed.
    NoChanges {
        table_name: String,
        status: TableStatus,
    },
}

/// Plan for destroying a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestroyPlan {
    /// Table exists and will be deleted.
    DeleteTable { table_name: String },
    /// Table doesn't exist, nothing to do.
    AlreadyGone { table_name: String },
}

/// Pure function: Calculate what changes are needed to reach desired state.
///
/// A table that is still being deleted counts as absent; creation waits
/// for the deletion to settle.
pub fn calculate_deploy_plan(
    current: &TableStatus,
    table_name: &str,
    desired: &TableSchemaDescriptor,
) -> DeployPlan {
    if current.is_usable() {
        DeployPlan::NoChanges {
            table_name: table_name.to_string(),
            status: current.clone(),
        }
    } else {
        DeployPlan::CreateTable {
            table_name: table_name.to_string(),
            schema: desired.clone(),
            pending_deletion: *current == TableStatus::Deleting,
        }
    }
}

/// Pure function: Calculate destroy plan.
pub fn calculate_destroy_plan(current: &TableStatus, table_name: &str) -> DestroyPlan {
    if current.is_usable() {
        DestroyPlan::DeleteTable {
            table_name: table_name.to_string(),
        }
    } else {
        DestroyPlan::AlreadyGone {
            table_name: table_name.to_string(),
        }
    }
}

fn key_lines(
    lines: &mut Vec<String>,
    indent: &str,
    keys: &[KeySchemaElement],
    schema: &TableSchemaDescriptor,
) {
    for key in keys {
        let label = match key.key_type {
            KeyType::Hash => "Partition key",
            KeyType::Range => "Sort key",
        };
        let attribute_type = schema
            .attribute_type(&key.attribute_name)
            .map(|t| t.as_str())
            .unwrap_or("?");
        lines.push(format!(
            "{indent}{label}: {} ({attribute_type})",
            key.attribute_name
        ));
    }
}

/// Pure function: Format a deploy plan for display.
pub fn format_deploy_plan(plan: &DeployPlan) -> Vec<String> {
    match plan {
        DeployPlan::CreateTable {
            table_name,
            schema,
            pending_deletion,
        } => {
            let mut lines = vec![format!("+ Create table: {}", table_name)];
            if *pending_deletion {
                lines.push("  ~ Waits for the pending deletion to finish".to_string());
            }
            key_lines(&mut lines, "  ", &schema.key_schema, schema);
            for index in &schema.global_secondary_indexes {
                lines.push(format!("  + GSI: {}", index.index_name));
                key_lines(&mut lines, "    ", &index.key_schema, schema);
            }
            lines.push(format!(
                "  Throughput: {} read / {} write",
                schema.provisioned_throughput.read_capacity_units,
                schema.provisioned_throughput.write_capacity_units
            ));
            lines
        }
        DeployPlan::NoChanges { table_name, status } => {
            vec![format!("= Table '{}' exists ({})", table_name, status)]
        }
    }
}

/// Pure function: Format a destroy plan for display.
pub fn format_destroy_plan(plan: &DestroyPlan) -> Vec<String> {
    match plan {
        DestroyPlan::DeleteTable { table_name } => {
            vec![format!(
                "- Delete table: {} (ALL DATA WILL BE LOST)",
                table_name
            )]
        }
        DestroyPlan::AlreadyGone { table_name } => {
            vec![format!("= Table '{}' does not exist", table_name)]
        }
    }
}
