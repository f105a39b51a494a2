//! CLI-specific error types with exit codes.
//!
//! This module defines error types specific to the CLI layer,
//! wrapping library errors and providing appropriate exit codes.

use std::fmt;
use tidemark::Error as LibError;

/// CLI-specific error type with exit code mapping.
#[derive(Debug)]
pub enum CliError {
    /// Library error (wrapped).
    Library(LibError),

    /// Invalid command-line arguments.
    InvalidArguments(String),

    /// I/O error.
    Io(std::io::Error),

    /// Configuration error.
    Config(String),

    /// Semantic failure (e.g., validation failed) - exit code 1.
    SemanticFailure(String),
}

impl CliError {
    /// Get the appropriate exit code for this error.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: Migration failure (execution, ledger write, structural,
    ///   duplicate, not recorded, ledger schema)
    /// - 2: Discovery error (missing or empty migrations directory)
    /// - 3: Configuration error
    /// - 4: Invalid arguments
    /// - 5: I/O error
    /// - 6: Other library error
    /// - 130: Cancelled
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::SemanticFailure(_) => 1,
            CliError::Library(lib_err) => library_exit_code(lib_err),
            CliError::Config(_) => 3,
            CliError::InvalidArguments(_) => 4,
            CliError::Io(_) => 5,
        }
    }

    /// Returns true if the ledger may no longer match the schema.
    pub fn is_out_of_sync(&self) -> bool {
        matches!(self, CliError::Library(e) if e.is_out_of_sync())
    }
}

/// Exit code for a library error.
///
/// For a multi-target failure, cancellation wins; otherwise the lowest code
/// among the failed targets is used, so a migration failure outranks a
/// discovery or configuration problem in another target.
fn library_exit_code(err: &LibError) -> i32 {
    match err {
        LibError::Cancelled { .. } => 130,
        LibError::Execution { .. }
        | LibError::LedgerWrite { .. }
        | LibError::Structural(_)
        | LibError::Duplicate { .. }
        | LibError::NotRecorded { .. }
        | LibError::Schema { .. } => 1,
        LibError::Discovery { .. } => 2,
        LibError::TargetNotConfigured
        | LibError::TargetNotFound { .. }
        | LibError::UnknownDialect { .. }
        | LibError::Configuration(_)
        | LibError::Validation { .. } => 3,
        LibError::InvalidPath { .. } => 4,
        LibError::Io(_) => 5,
        LibError::Targets(_) if err.is_cancelled() => 130,
        LibError::Targets(failures) => failures
            .iter()
            .map(|f| library_exit_code(&f.error))
            .min()
            .unwrap_or(6),
        _ => 6,
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Library(e) => write!(f, "{e}"),
            CliError::InvalidArguments(msg) => write!(f, "Invalid arguments: {msg}"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
            CliError::Config(msg) => write!(f, "Configuration error: {msg}"),
            CliError::SemanticFailure(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Library(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LibError> for CliError {
    fn from(e: LibError) -> Self {
        CliError::Library(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
