//! Configuration builder combining file, environment, and programmatic
//! sources.

use std::path::{Path, PathBuf};

use crate::config::environment::EnvironmentConfig;
use crate::config::loader::ConfigLoader;
use crate::config::schema::Config;
use crate::config::validator::ConfigValidator;
use crate::error::Result;

/// Builds a validated [`Config`].
///
/// Sources are layered with the following precedence (highest first):
///
/// 1. Explicit overrides (`with_migrations_dir`)
/// 2. Environment variables (`TIDEMARK_*`)
/// 3. The configuration file, or the programmatic config from `with_config`
///
/// Relative `migrations_dir` values are resolved against the working
/// directory.
///
/// # Examples
///
/// ```
/// use tidemark::config::{Config, ConfigBuilder, TargetConfig};
///
/// let mut custom = Config::default();
/// custom.databases.insert("main".into(), TargetConfig::new("sqlite", ":memory:"));
///
/// let config = ConfigBuilder::new()
///     .skip_files()
///     .skip_env()
///     .with_working_dir("/srv/app")
///     .with_config(custom)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.migrations_dir().to_str(), Some("/srv/app/migrations"));
/// ```
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    working_dir: Option<PathBuf>,
    config_file: Option<PathBuf>,
    migrations_dir: Option<PathBuf>,
    base: Option<Config>,
    skip_files: bool,
    skip_env: bool,
}

impl ConfigBuilder {
    /// Creates a builder that reads files and environment variables from the
    /// current directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory used for discovery and relative paths.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Loads this file instead of discovering one.
    #[must_use]
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Overrides the migrations root.
    #[must_use]
    pub fn with_migrations_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.migrations_dir = Some(dir.into());
        self
    }

    /// Uses a programmatic configuration as the base layer.
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.base = Some(config);
        self
    }

    /// Does not read any configuration file.
    #[must_use]
    pub const fn skip_files(mut self) -> Self {
        self.skip_files = true;
        self
    }

    /// Ignores `TIDEMARK_*` environment variables.
    #[must_use]
    pub const fn skip_env(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be determined, a
    /// configuration file cannot be loaded, an environment variable is
    /// invalid, or validation fails.
    pub fn build(self) -> Result<Config> {
        let working_dir = match self.working_dir {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };

        let explicit = self
            .config_file
            .or_else(|| (!self.skip_env).then(EnvironmentConfig::config_file).flatten());

        let mut config = match self.base {
            Some(base) => base,
            None if self.skip_files => Config::default(),
            None => ConfigLoader::load(&working_dir, explicit.as_deref())?,
        };

        if !self.skip_env {
            EnvironmentConfig::apply_overrides(&mut config)?;
        }
        if let Some(dir) = self.migrations_dir {
            config.migrations_dir = Some(dir);
        }

        ConfigValidator::validate(&config)?;

        config.migrations_dir = Some(resolve(&working_dir, &config.migrations_dir()));
        Ok(config)
    }
}

fn resolve(working_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        working_dir.join(path)
    }
}
