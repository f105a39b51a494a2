//! Configuration validation.
//!
//! This module checks a parsed [`Config`] before any target is touched, so
//! that a bad entry fails the run up front instead of midway through.

use crate::config::schema::{Config, TargetConfig};
use crate::database::validate_table_name;
use crate::error::{Error, Result};

/// Validates configuration values.
///
/// # Examples
///
/// ```
/// use tidemark::config::{Config, ConfigValidator, TargetConfig};
///
/// let mut config = Config::default();
/// ConfigValidator::validate(&config).unwrap();
///
/// config.databases.insert("main".into(), TargetConfig::new("sqlite", ""));
/// assert!(ConfigValidator::validate(&config).is_err());
/// ```
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a complete configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first offending field.
    pub fn validate(config: &Config) -> Result<()> {
        if let Some(dir) = &config.migrations_dir {
            if dir.as_os_str().is_empty() {
                return Err(Error::Validation {
                    field: "migrations_dir".into(),
                    message: "Cannot be empty".into(),
                });
            }
        }

        if let Some(prefix) = &config.table_prefix {
            if !prefix.is_empty() {
                validate_table_name(prefix).map_err(|_| Error::Validation {
                    field: "table_prefix".into(),
                    message: format!("'{prefix}' cannot start a SQL table identifier"),
                })?;
            }
        }

        for (name, target) in &config.databases {
            Self::validate_target_name(name)?;
            Self::validate_target(name, target)?;
        }

        // Prefixed default names must stay valid identifiers as well.
        for name in config.databases.keys() {
            if let Some(table) = config.ledger_table(name) {
                validate_table_name(&table).map_err(|e| Self::scoped(name, e))?;
            }
        }

        Ok(())
    }

    /// Target names become directory names under the migrations root.
    fn validate_target_name(name: &str) -> Result<()> {
        let field = format!("databases.{name}");

        if name.trim().is_empty() {
            return Err(Error::Validation {
                field,
                message: "Target name cannot be empty or only whitespace".into(),
            });
        }

        if name.contains(['/', '\\', '\0']) || name == "." || name == ".." {
            return Err(Error::Validation {
                field,
                message: "Target name cannot contain path separators".into(),
            });
        }

        Ok(())
    }

    fn validate_target(name: &str, target: &TargetConfig) -> Result<()> {
        if target.dialect.trim().is_empty() {
            return Err(Error::Validation {
                field: format!("databases.{name}.dialect"),
                message: "Cannot be empty".into(),
            });
        }

        if target.dsn.trim().is_empty() {
            return Err(Error::Validation {
                field: format!("databases.{name}.dsn"),
                message: "Cannot be empty".into(),
            });
        }

        if let Some(table) = &target.table_name {
            validate_table_name(table).map_err(|e| Self::scoped(name, e))?;
        }

        Ok(())
    }

    fn scoped(target: &str, error: Error) -> Error {
        match error {
            Error::Validation { field, message } => Error::Validation {
                field: format!("databases.{target}.{field}"),
                message,
            },
            other => other,
        }
    }
}
