//! Configuration schema definitions.
//!
//! This module defines the configuration structure for tidemark: where the
//! migration files live and how to reach every database target.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::database::DEFAULT_TABLE_NAME;

/// Default migrations root, relative to the working directory.
pub const DEFAULT_MIGRATIONS_DIR: &str = "migrations";

/// Complete configuration structure.
///
/// # Examples
///
/// ```
/// use tidemark::config::{Config, TargetConfig};
///
/// let mut config = Config::default();
/// config
///     .databases
///     .insert("main".into(), TargetConfig::new("sqlite", "main.db"));
///
/// assert_eq!(config.migrations_dir().to_str(), Some("migrations"));
/// assert_eq!(config.ledger_table("main").as_deref(), Some("migrations"));
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Root directory holding one subdirectory of migrations per target.
    pub migrations_dir: Option<PathBuf>,

    /// Prefix prepended to every default ledger table name.
    pub table_prefix: Option<String>,

    /// Database targets by name.
    #[serde(default)]
    pub databases: BTreeMap<String, TargetConfig>,
}

impl Config {
    /// Returns the migrations root, falling back to `migrations`.
    #[must_use]
    pub fn migrations_dir(&self) -> PathBuf {
        self.migrations_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MIGRATIONS_DIR))
    }

    /// Returns the ledger table name for a target, if the target exists.
    ///
    /// An explicit `table_name` is used as is; otherwise the table prefix is
    /// prepended to `migrations`.
    #[must_use]
    pub fn ledger_table(&self, target: &str) -> Option<String> {
        let target = self.databases.get(target)?;
        Some(match &target.table_name {
            Some(name) => name.clone(),
            None => format!(
                "{}{DEFAULT_TABLE_NAME}",
                self.table_prefix.as_deref().unwrap_or_default()
            ),
        })
    }

    /// Returns the configured target names in sorted order.
    pub fn target_names(&self) -> impl Iterator<Item = &str> {
        self.databases.keys().map(String::as_str)
    }
}

/// Connection settings for one database target.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Registry key of the driver, e.g. `sqlite`.
    pub dialect: String,

    /// Driver-specific connection string.
    pub dsn: String,

    /// Ledger table name override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,

    /// Extra clause appended to the ledger `CREATE TABLE` statement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_options: Option<String>,
}

impl TargetConfig {
    /// Creates a target with the default ledger table.
    #[must_use]
    pub fn new(dialect: impl Into<String>, dsn: impl Into<String>) -> Self {
        Self {
            dialect: dialect.into(),
            dsn: dsn.into(),
            table_name: None,
            table_options: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let yaml = r"
migrations_dir: db/migrations
table_prefix: app_
databases:
  main:
    dialect: sqlite
    dsn: ./data/main.db
  audit:
    dialect: sqlite
    dsn: ./data/audit.db
    table_name: schema_history
    table_options: STRICT
";
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.migrations_dir(), PathBuf::from("db/migrations"));
        assert_eq!(config.target_names().collect::<Vec<_>>(), ["audit", "main"]);
        assert_eq!(config.ledger_table("main").as_deref(), Some("app_migrations"));
        assert_eq!(
            config.ledger_table("audit").as_deref(),
            Some("schema_history")
        );
        assert_eq!(
            config.databases["audit"].table_options.as_deref(),
            Some("STRICT")
        );
    }

    #[test]
    fn test_empty_config_has_no_targets() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert!(config.databases.is_empty());
        assert_eq!(config.migrations_dir(), PathBuf::from("migrations"));
        assert_eq!(config.ledger_table("main"), None);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let yaml = "databases:\n  main:\n    dialect: sqlite\n    dsn: x\n    driver: y\n";
        assert!(serde_yaml::from_str::<Config>(yaml).is_err());

        assert!(serde_yaml::from_str::<Config>("ports: 1\n").is_err());
    }

    #[test]
    fn test_target_requires_dialect_and_dsn() {
        let yaml = "databases:\n  main:\n    dsn: x\n";
        assert!(serde_yaml::from_str::<Config>(yaml).is_err());
    }
}
