#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # tidemark
//!
//! A library for applying and reverting versioned SQL migrations across one
//! or more named database targets.
//!
//! Each target owns a directory of paired `.up.sql` / `.down.sql` files and a
//! ledger table recording which migrations have been applied. A run compares
//! the two, executes the outstanding scripts in order, and records each one in
//! the same transaction as the script itself.
//!
//! ## Core Types
//!
//! - [`Catalog`], [`MigrationFile`] and [`Direction`]: migration discovery
//! - [`TargetResolver`]: named targets to live connections
//! - [`MigrationRunner`] and [`RunReport`]: multi-target runs
//! - [`CancellationToken`]: cooperative cancellation of a run
//! - [`Error`] and [`Result`]: Error handling types
//! - [`Logger`] and [`LogLevel`]: Logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use tidemark::catalog::{parse_file_name, ParsedName};
//! use tidemark::Direction;
//!
//! match parse_file_name("20240101_create_users.up.sql") {
//!     ParsedName::Migration { sequence_key, name, direction } => {
//!         assert_eq!(sequence_key, "20240101");
//!         assert_eq!(name, "create_users");
//!         assert_eq!(direction, Direction::Up);
//!     }
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

pub mod cancel;
pub mod catalog;
pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod operations;
pub mod output;
pub mod resolver;

// Re-export key types at crate root for convenience
pub use cancel::CancellationToken;
pub use catalog::{Catalog, Direction, MigrationFile};
pub use config::{Config, ConfigBuilder, TargetConfig};
pub use database::{Connection, DialectRegistry, Ledger};
pub use error::{Error, Result, StructuralIssue, TargetFailure};
pub use logging::{init_logger, LogLevel, Logger};
pub use operations::{
    apply_file, create_migration, BatchSummary, CreatedPair, Executor, MigrationRunner,
    Reconciler, RunReport, TargetOutcome, TargetStatus, WorkItem, WorkList,
};
pub use resolver::TargetResolver;
