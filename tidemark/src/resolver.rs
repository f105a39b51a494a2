//! Resolution of target names to open connections.

use crate::config::{Config, TargetConfig};
use crate::database::{Connection, DialectRegistry, Ledger};
use crate::error::{Error, Result};

/// Maps target names to connections and ledgers.
///
/// # Examples
///
/// ```
/// use tidemark::config::{Config, TargetConfig};
/// use tidemark::database::DialectRegistry;
/// use tidemark::TargetResolver;
///
/// let mut config = Config::default();
/// config.databases.insert("main".into(), TargetConfig::new("sqlite", ":memory:"));
/// let registry = DialectRegistry::default();
///
/// let resolver = TargetResolver::new(&config, &registry);
/// assert_eq!(resolver.target_names().unwrap(), vec!["main"]);
/// assert!(resolver.resolve("main").is_ok());
/// assert!(resolver.resolve("other").is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TargetResolver<'a> {
    config: &'a Config,
    registry: &'a DialectRegistry,
}

impl<'a> TargetResolver<'a> {
    /// Creates a resolver over a configuration and a dialect registry.
    #[must_use]
    pub const fn new(config: &'a Config, registry: &'a DialectRegistry) -> Self {
        Self { config, registry }
    }

    /// Every configured target name, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TargetNotConfigured`] if no targets exist.
    pub fn target_names(&self) -> Result<Vec<&'a str>> {
        let names: Vec<&str> = self.config.target_names().collect();
        if names.is_empty() {
            return Err(Error::TargetNotConfigured);
        }
        Ok(names)
    }

    /// Looks up one target's settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TargetNotConfigured`] if no targets exist, or
    /// [`Error::TargetNotFound`] if `name` is not one of them.
    pub fn target(&self, name: &str) -> Result<&'a TargetConfig> {
        if self.config.databases.is_empty() {
            return Err(Error::TargetNotConfigured);
        }
        self.config
            .databases
            .get(name)
            .ok_or_else(|| Error::TargetNotFound {
                name: name.to_string(),
            })
    }

    /// Opens a connection to a target.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unknown targets or dialects, or
    /// [`Error::Connection`] if the driver cannot connect.
    pub fn resolve(&self, name: &str) -> Result<Box<dyn Connection>> {
        let target = self.target(name)?;
        self.registry.connect(name, target)
    }

    /// Returns the ledger accessor configured for a target.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unknown targets or invalid table
    /// names.
    pub fn ledger_for(&self, name: &str) -> Result<Ledger> {
        let target = self.target(name)?;
        let table = self
            .config
            .ledger_table(name)
            .ok_or_else(|| Error::TargetNotFound {
                name: name.to_string(),
            })?;
        Ok(Ledger::new(table)?.with_table_options(target.table_options.clone()))
    }
}
