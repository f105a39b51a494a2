//! CLI command implementations.
//!
//! This module contains the implementations of all CLI commands:
//! - `up` / `down`: Run outstanding migrations (`run`)
//! - `apply`: Apply a single migration file
//! - `create`: Scaffold a new migration pair
//! - `status`: Show applied and pending migrations
//! - `validate`: Validate a configuration file

pub mod apply;
pub mod create;
pub mod run;
pub mod status;
pub mod validate;

pub use apply::ApplyCommand;
pub use create::CreateCommand;
pub use run::{ReportFormat, RunCommand};
pub use status::StatusCommand;
pub use validate::ValidateCommand;
