//! Error types for the tidemark library.
//!
//! This module provides the error hierarchy for every stage of a migration
//! run: configuration, connection, discovery, planning, and execution. It
//! uses `thiserror` for ergonomic error handling.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::Direction;

/// Result type alias for operations that may fail with a tidemark error.
///
/// # Examples
///
/// ```
/// use tidemark::{Error, Result};
///
/// fn example_operation() -> Result<usize> {
///     Ok(3)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the tidemark library.
///
/// Errors that concern a single migration file always carry the file (or the
/// migration identifier) they came from. Errors raised after a transaction was
/// opened carry the outcome of the rollback in their `rollback` field: `None`
/// means the rollback succeeded.
#[derive(Debug, Error)]
pub enum Error {
    /// No database targets exist in the configuration.
    #[error("no database targets are configured")]
    TargetNotConfigured,

    /// The requested target is absent from the configuration.
    #[error("database target '{name}' is not configured")]
    TargetNotFound {
        /// The requested target name.
        name: String,
    },

    /// No connection factory is registered for the target's dialect.
    #[error("unknown dialect '{dialect}' for target '{target}'")]
    UnknownDialect {
        /// The target whose dialect could not be resolved.
        target: String,
        /// The unregistered dialect name.
        dialect: String,
    },

    /// The configuration file could not be parsed.
    #[error("configuration error: {0}")]
    Configuration(#[from] serde_yaml::Error),

    /// A validation error occurred.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// An invalid filesystem path was provided.
    #[error("invalid path {}: {reason}", path.display())]
    InvalidPath {
        /// The invalid path.
        path: PathBuf,
        /// The reason the path is invalid.
        reason: String,
    },

    /// The driver could not open a connection to the target.
    #[error("cannot connect to target '{target}': {source}")]
    Connection {
        /// The target being connected to.
        target: String,
        /// The underlying driver error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The migration directory could not be read, or held no migrations.
    #[error("migration discovery failed for {}: {reason}", path.display())]
    Discovery {
        /// The directory being scanned.
        path: PathBuf,
        /// Why discovery failed.
        reason: String,
    },

    /// The migration set is structurally inconsistent.
    ///
    /// Every issue found in one pass is reported together.
    #[error("{}", describe_issues(.0))]
    Structural(Vec<StructuralIssue>),

    /// The ledger table could not be created.
    #[error("cannot create ledger table '{table}': {source}")]
    Schema {
        /// The ledger table name.
        table: String,
        /// The underlying failure.
        #[source]
        source: Box<Error>,
    },

    /// A change-set's SQL body failed.
    #[error("migration {} failed: {source}{}", file.display(), rollback_note(.rollback.as_deref()))]
    Execution {
        /// The migration file being applied.
        file: PathBuf,
        /// The underlying failure.
        #[source]
        source: Box<Error>,
        /// The rollback failure, if the rollback itself failed.
        rollback: Option<Box<Error>>,
    },

    /// The ledger insert or delete failed after the change-set ran.
    #[error(
        "ledger update for '{identifier}' ({}) failed: {source}{}",
        file.display(),
        rollback_note(.rollback.as_deref())
    )]
    LedgerWrite {
        /// The migration identifier being recorded.
        identifier: String,
        /// The migration file being applied.
        file: PathBuf,
        /// The underlying failure.
        #[source]
        source: Box<Error>,
        /// The rollback failure, if the rollback itself failed.
        rollback: Option<Box<Error>>,
    },

    /// The identifier is already present in the ledger.
    #[error("migration '{identifier}' is already recorded as applied")]
    Duplicate {
        /// The duplicated identifier.
        identifier: String,
    },

    /// The identifier has no ledger row to delete.
    #[error("migration '{identifier}' is not recorded as applied")]
    NotRecorded {
        /// The missing identifier.
        identifier: String,
    },

    /// The run was cancelled while a migration was in progress.
    #[error("cancelled while applying {}{}", file.display(), rollback_note(.rollback.as_deref()))]
    Cancelled {
        /// The migration file that was in progress.
        file: PathBuf,
        /// The rollback failure, if the rollback itself failed.
        rollback: Option<Box<Error>>,
    },

    /// A change-set committed or rolled back the transaction it ran in.
    #[error("the change-set ended its own transaction; statements before that point may be committed")]
    TransactionEnded,

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A `PostgreSQL` error occurred.
    #[cfg(feature = "postgres")]
    #[error("database error: {0}")]
    Postgres(#[from] postgres::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// One or more targets of a multi-target run failed.
    #[error("{} target(s) failed: {}", .0.len(), describe_failures(.0))]
    Targets(Vec<TargetFailure>),
}

/// A structural problem in a target's migration set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralIssue {
    /// An identifier has no file for the given direction.
    MissingCounterpart {
        /// The migration identifier.
        identifier: String,
        /// The direction whose file is missing.
        direction: Direction,
    },

    /// A `.sql` file follows the naming scheme but its direction suffix is
    /// neither `up` nor `down`.
    UnknownDirection {
        /// The offending file.
        file: PathBuf,
    },

    /// Two files resolve to the same identifier and direction.
    Ambiguous {
        /// The migration identifier.
        identifier: String,
        /// The direction both files claim.
        direction: Direction,
    },
}

impl fmt::Display for StructuralIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCounterpart {
                identifier,
                direction,
            } => write!(f, "'{identifier}' has no .{direction}.sql file"),
            Self::UnknownDirection { file } => {
                write!(f, "{} has an unrecognized direction suffix", file.display())
            }
            Self::Ambiguous {
                identifier,
                direction,
            } => write!(f, "'{identifier}' has more than one .{direction}.sql file"),
        }
    }
}

/// A failure of one target during a multi-target run.
#[derive(Debug)]
pub struct TargetFailure {
    /// The target name.
    pub target: String,
    /// The error the target reported.
    pub error: Error,
}

impl fmt::Display for TargetFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.target, self.error)
    }
}

fn rollback_note(rollback: Option<&Error>) -> String {
    rollback.map_or_else(String::new, |e| format!(" (rollback also failed: {e})"))
}

fn describe_issues(issues: &[StructuralIssue]) -> String {
    let listed: Vec<String> = issues.iter().map(ToString::to_string).collect();
    format!(
        "{} structural issue(s): {}",
        issues.len(),
        listed.join("; ")
    )
}

fn describe_failures(failures: &[TargetFailure]) -> String {
    let listed: Vec<String> = failures.iter().map(ToString::to_string).collect();
    listed.join("; ")
}

impl Error {
    /// Returns true if the database may no longer match the ledger.
    ///
    /// This is the case for every ledger write failure, since dialects
    /// without transactional DDL keep schema changes across a rollback, for
    /// a change-set that ended its own transaction, and for any error whose
    /// rollback failed.
    ///
    /// # Examples
    ///
    /// ```
    /// use tidemark::Error;
    /// use std::path::PathBuf;
    ///
    /// let err = Error::Execution {
    ///     file: PathBuf::from("1_a.up.sql"),
    ///     source: Box::new(Error::TargetNotConfigured),
    ///     rollback: None,
    /// };
    /// assert!(!err.is_out_of_sync());
    /// ```
    #[must_use]
    pub fn is_out_of_sync(&self) -> bool {
        match self {
            Self::LedgerWrite { .. } => true,
            Self::Execution { source, .. } if matches!(**source, Self::TransactionEnded) => true,
            Self::Execution { rollback, .. } | Self::Cancelled { rollback, .. } => {
                rollback.is_some()
            }
            Self::Targets(failures) => failures.iter().any(|f| f.error.is_out_of_sync()),
            _ => false,
        }
    }

    /// Returns true if this error, or the error it wraps, is a cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled { .. } => true,
            Self::Targets(failures) => failures.iter().any(|f| f.error.is_cancelled()),
            _ => false,
        }
    }

    /// Returns the structural issues carried by this error, if any.
    #[must_use]
    pub fn structural_issues(&self) -> &[StructuralIssue] {
        match self {
            Self::Structural(issues) => issues,
            _ => &[],
        }
    }
}
