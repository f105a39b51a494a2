//! Database layer: driver traits, the built-in `SQLite` driver, the optional
//! `PostgreSQL` driver, the dialect registry, and the per-target ledger table.
//!
//! # Examples
//!
//! ```
//! use tidemark::config::TargetConfig;
//! use tidemark::database::{DialectRegistry, Ledger};
//!
//! let registry = DialectRegistry::default();
//! let target = TargetConfig::new("sqlite", ":memory:");
//! let mut conn = registry.connect("main", &target).unwrap();
//!
//! let ledger = Ledger::default();
//! ledger.ensure_table(conn.as_mut()).unwrap();
//! assert!(ledger.list_applied(conn.as_mut()).unwrap().is_empty());
//! ```

mod driver;
mod ledger;
#[cfg(feature = "postgres")]
mod postgresql;
mod registry;
mod sqlite;

pub use driver::{Connection, Transaction};
pub use ledger::{validate_table_name, Ledger, LedgerEntry, DEFAULT_TABLE_NAME};
#[cfg(feature = "postgres")]
pub use postgresql::{connect as connect_postgres, PostgresConnection, POSTGRES_DIALECT};
pub use registry::{ConnectionFactory, DialectRegistry};
pub use sqlite::{connect as connect_sqlite, SqliteConnection, SQLITE_DIALECT};
