//! Configuration file discovery and loading.
//!
//! This module finds the tidemark configuration file in a working directory,
//! parses it, and expands `~/` in connection strings.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::Config;
use crate::error::{Error, Result};

/// File names searched in the working directory, in order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["tidemark.yaml", "config/db.yaml"];

/// Loads configuration files.
///
/// # Examples
///
/// ```no_run
/// use tidemark::config::ConfigLoader;
/// use std::path::Path;
///
/// if let Some(path) = ConfigLoader::discover(Path::new(".")) {
///     let config = ConfigLoader::load_file(&path).unwrap();
///     println!("{} target(s)", config.databases.len());
/// }
/// ```
pub struct ConfigLoader;

impl ConfigLoader {
    /// Returns the first configuration file present in `working_dir`.
    #[must_use]
    pub fn discover(working_dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| working_dir.join(name))
            .find(|path| path.is_file())
    }

    /// Loads the configuration for a working directory.
    ///
    /// An explicit path must exist. Without one, a missing file yields the
    /// default (empty) configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(working_dir: &Path, explicit: Option<&Path>) -> Result<Config> {
        let path = match explicit {
            Some(path) if path.is_relative() => working_dir.join(path),
            Some(path) => path.to_path_buf(),
            None => match Self::discover(working_dir) {
                Some(path) => path,
                None => {
                    log::debug!("No configuration file in {}", working_dir.display());
                    return Ok(Config::default());
                }
            },
        };

        log::debug!("Loading configuration from {}", path.display());
        Self::load_file(&path)
    }

    /// Load and parse a YAML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the YAML is invalid.
    pub fn load_file(path: &Path) -> Result<Config> {
        let contents = fs::read_to_string(path).map_err(|e| Error::InvalidPath {
            path: path.to_path_buf(),
            reason: format!("Failed to read configuration file: {e}"),
        })?;

        let mut config: Config = serde_yaml::from_str(&contents)?;
        for target in config.databases.values_mut() {
            target.dsn = expand_home(&target.dsn);
        }
        Ok(config)
    }
}

/// Expands a leading `~/` to the current user's home directory.
///
/// Values without the prefix, or on systems without a home directory, are
/// returned unchanged.
#[must_use]
pub fn expand_home(value: &str) -> String {
    match (value.strip_prefix("~/"), home::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest).to_string_lossy().into_owned(),
        _ => value.to_string(),
    }
}
