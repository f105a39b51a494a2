//! Configuration system for tidemark.
//!
//! This module provides:
//! - YAML configuration files (`tidemark.yaml` or `config/db.yaml`)
//! - Environment variable overrides
//! - Programmatic configuration via builder pattern
//! - Validation of target names, connection strings, and ledger tables
//!
//! # Configuration Precedence
//!
//! Configuration is merged from multiple sources with the following precedence
//! (highest to lowest):
//!
//! 1. Explicit overrides (via `ConfigBuilder::with_migrations_dir`)
//! 2. Environment variables (`TIDEMARK_*`)
//! 3. The configuration file (or `ConfigBuilder::with_config`)
//! 4. Built-in defaults
//!
//! # Examples
//!
//! Loading from a specific directory:
//!
//! ```no_run
//! use tidemark::config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new()
//!     .with_working_dir("/path/to/project")
//!     .build()
//!     .unwrap();
//!
//! for name in config.target_names() {
//!     println!("{name}");
//! }
//! ```

pub mod builder;
pub mod environment;
pub mod loader;
pub mod schema;
pub mod validator;

// Re-export key types at module root
pub use builder::ConfigBuilder;
pub use environment::EnvironmentConfig;
pub use loader::{expand_home, ConfigLoader};
pub use schema::{Config, TargetConfig, DEFAULT_MIGRATIONS_DIR};
pub use validator::ConfigValidator;
