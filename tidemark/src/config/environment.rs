//! Environment variable handling for configuration overrides.
//!
//! This module provides support for TIDEMARK_* environment variables that
//! override configuration file values.

use std::env;
use std::path::PathBuf;

use crate::config::schema::Config;
use crate::error::{Error, Result};

/// Path of the configuration file to load instead of the discovered one.
pub const CONFIG_ENV: &str = "TIDEMARK_CONFIG";

/// Overrides `migrations_dir`.
pub const MIGRATIONS_DIR_ENV: &str = "TIDEMARK_MIGRATIONS_DIR";

/// Overrides `table_prefix`.
pub const TABLE_PREFIX_ENV: &str = "TIDEMARK_TABLE_PREFIX";

/// Handles environment variable overrides for configuration.
///
/// # Examples
///
/// ```no_run
/// use tidemark::config::{Config, EnvironmentConfig};
///
/// let mut config = Config::default();
/// EnvironmentConfig::apply_overrides(&mut config).unwrap();
/// ```
pub struct EnvironmentConfig;

impl EnvironmentConfig {
    /// Apply environment variable overrides to config.
    ///
    /// # Errors
    ///
    /// Returns an error if `TIDEMARK_MIGRATIONS_DIR` is set but empty.
    pub fn apply_overrides(config: &mut Config) -> Result<()> {
        if let Ok(dir) = env::var(MIGRATIONS_DIR_ENV) {
            if dir.trim().is_empty() {
                return Err(Error::Validation {
                    field: MIGRATIONS_DIR_ENV.into(),
                    message: "Cannot be empty".into(),
                });
            }
            config.migrations_dir = Some(PathBuf::from(dir));
        }

        // An empty prefix is a valid way to clear a prefix set in the file.
        if let Ok(prefix) = env::var(TABLE_PREFIX_ENV) {
            config.table_prefix = Some(prefix);
        }

        Ok(())
    }

    /// Returns the configuration file named by `TIDEMARK_CONFIG`, if set.
    #[must_use]
    pub fn config_file() -> Option<PathBuf> {
        env::var_os(CONFIG_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }
}
