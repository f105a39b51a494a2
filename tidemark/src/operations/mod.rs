//! Migration operations using the plan-execute pattern.
//!
//! # Architecture
//!
//! Operations are split into two phases:
//! 1. **Planning**: the [`Reconciler`] compares a target's catalog with its
//!    ledger and builds an ordered [`WorkList`]
//! 2. **Execution**: the [`Executor`] runs each item in its own transaction,
//!    recording it in the ledger before commit
//!
//! The [`MigrationRunner`] drives both phases for every configured target.
//!
//! # Examples
//!
//! ```no_run
//! use tidemark::config::ConfigBuilder;
//! use tidemark::database::DialectRegistry;
//! use tidemark::operations::MigrationRunner;
//! use tidemark::Direction;
//!
//! let config = ConfigBuilder::new().build().unwrap();
//! let registry = DialectRegistry::default();
//!
//! let report = MigrationRunner::new(&config, &registry)
//!     .run(Some("main"), Direction::Up)
//!     .unwrap();
//! report.into_result().unwrap();
//! ```

pub mod apply_file;
pub mod create;
pub mod executor;
pub mod plan;
pub mod runner;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

pub use apply_file::{apply_file, work_item_for};
pub use create::{create_migration, next_sequence_key, CreatedPair};
pub use executor::{BatchSummary, Executor};
pub use plan::{Reconciler, WorkItem, WorkList};
pub use runner::{MigrationRunner, RunReport, TargetOutcome, TargetStatus};
