//! Dialect registry mapping driver names to connection factories.

use std::collections::HashMap;
use std::fmt;

use crate::config::TargetConfig;
use crate::error::{Error, Result};

use super::driver::Connection;
#[cfg(feature = "postgres")]
use super::postgresql;
use super::sqlite::{self, SQLITE_DIALECT};

/// Opens a connection for a named target.
pub type ConnectionFactory = fn(&str, &TargetConfig) -> Result<Box<dyn Connection>>;

/// A table of connection factories keyed by dialect name.
///
/// Dialect names are compared case-insensitively. `sqlite` (and its alias
/// `sqlite3`) is registered by default, as is `postgres` (alias
/// `postgresql`) when the `postgres` feature is enabled.
///
/// # Examples
///
/// ```
/// use tidemark::config::TargetConfig;
/// use tidemark::database::DialectRegistry;
///
/// let registry = DialectRegistry::default();
/// assert!(registry.get("sqlite").is_some());
///
/// let target = TargetConfig::new("oracle", "oracle://localhost/app");
/// assert!(registry.connect("main", &target).is_err());
/// ```
#[derive(Clone)]
pub struct DialectRegistry {
    factories: HashMap<String, ConnectionFactory>,
}

impl DialectRegistry {
    /// Creates a registry with no dialects.
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Creates a registry holding the built-in dialects.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(SQLITE_DIALECT, sqlite::connect);
        registry.register("sqlite3", sqlite::connect);
        #[cfg(feature = "postgres")]
        {
            registry.register(postgresql::POSTGRES_DIALECT, postgresql::connect);
            registry.register("postgresql", postgresql::connect);
        }
        registry
    }

    /// Registers a factory, replacing any previous one for the dialect.
    pub fn register(&mut self, dialect: &str, factory: ConnectionFactory) {
        self.factories.insert(dialect.to_ascii_lowercase(), factory);
    }

    /// Looks up the factory for a dialect.
    #[must_use]
    pub fn get(&self, dialect: &str) -> Option<ConnectionFactory> {
        self.factories.get(&dialect.to_ascii_lowercase()).copied()
    }

    /// Registered dialect names, sorted.
    #[must_use]
    pub fn dialects(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Opens a connection for a target through its dialect's factory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownDialect`] if no factory is registered, or the
    /// factory's error (normally [`Error::Connection`]).
    pub fn connect(&self, target: &str, config: &TargetConfig) -> Result<Box<dyn Connection>> {
        let factory = self
            .get(&config.dialect)
            .ok_or_else(|| Error::UnknownDialect {
                target: target.to_string(),
                dialect: config.dialect.clone(),
            })?;
        log::debug!("Connecting to target '{target}' ({})", config.dialect);
        factory(target, config)
    }
}

impl Default for DialectRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for DialectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialectRegistry")
            .field("dialects", &self.dialects())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::SqliteConnection;

    fn memory(_target: &str, _config: &TargetConfig) -> Result<Box<dyn Connection>> {
        Ok(Box::new(SqliteConnection::open_in_memory()?))
    }

    #[test]
    fn test_defaults_include_sqlite() {
        let registry = DialectRegistry::default();
        assert!(registry.get("SQLite").is_some());
        assert!(registry.get("sqlite3").is_some());
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn test_defaults_include_postgres() {
        let registry = DialectRegistry::default();
        assert_eq!(
            registry.dialects(),
            ["postgres", "postgresql", "sqlite", "sqlite3"]
        );
    }

    #[cfg(not(feature = "postgres"))]
    #[test]
    fn test_postgres_needs_its_feature() {
        let registry = DialectRegistry::default();
        assert_eq!(registry.dialects(), ["sqlite", "sqlite3"]);
        assert!(registry.get("postgres").is_none());
    }

    #[test]
    fn test_unknown_dialect() {
        let registry = DialectRegistry::new();
        let err = registry
            .connect("main", &TargetConfig::new("sqlite", ":memory:"))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            Error::UnknownDialect { ref target, ref dialect } if target == "main" && dialect == "sqlite"
        ));
    }

    #[test]
    fn test_register_custom_dialect() {
        let mut registry = DialectRegistry::new();
        registry.register("Memory", memory);

        let conn = registry
            .connect("main", &TargetConfig::new("memory", "ignored"))
            .unwrap();
        assert_eq!(conn.dialect(), "sqlite");
    }
}
