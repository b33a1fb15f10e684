use std::env;

/// Prefix applied to every logical table name unless configured otherwise.
pub const DEFAULT_TABLE_PREFIX: &str = "default_";

/// Driver configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Prefix prepended to logical table names (default: "default_")
    pub table_prefix: String,
}

impl DriverConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DYNODM_TABLE_PREFIX` - Physical table name prefix (default: "default_")
    pub fn from_env() -> Self {
        Self {
            table_prefix: env::var("DYNODM_TABLE_PREFIX")
                .unwrap_or_else(|_| DEFAULT_TABLE_PREFIX.to_string()),
        }
    }

    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    /// Physical table name for a logical one.
    pub fn table_name(&self, logical: &str) -> String {
        format!("{}{}", self.table_prefix, logical)
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            table_prefix: DEFAULT_TABLE_PREFIX.to_string(),
        }
    }
}
