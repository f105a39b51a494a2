//! Applying a single migration file outside a planned run.

use std::path::Path;

use crate::cancel::CancellationToken;
use crate::catalog::{parse_file_name, ParsedName};
use crate::database::{Connection, Ledger};
use crate::error::{Error, Result, StructuralIssue};

use super::executor::Executor;
use super::plan::WorkItem;

/// Builds the work item for one migration file from its name.
///
/// # Errors
///
/// Returns [`Error::InvalidPath`] if the file name is not a migration, or
/// [`Error::Structural`] if its direction suffix is unknown.
pub fn work_item_for(path: &Path) -> Result<WorkItem> {
    let invalid = |reason: &str| Error::InvalidPath {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| invalid("not a UTF-8 file name"))?;

    match parse_file_name(file_name) {
        ParsedName::Migration {
            sequence_key,
            name,
            direction,
        } => Ok(WorkItem {
            identifier: format!("{sequence_key}_{name}"),
            direction,
            path: path.to_path_buf(),
        }),
        ParsedName::UnknownDirection => Err(Error::Structural(vec![
            StructuralIssue::UnknownDirection {
                file: path.to_path_buf(),
            },
        ])),
        ParsedName::NotMigration => Err(invalid(
            "expected a <sequence_key>_<name>.<up|down>.sql file name",
        )),
    }
}

/// Applies one file through the transactional executor.
///
/// The direction comes from the file suffix. The ledger is created if
/// missing and updated in the same transaction as the file's SQL, so applying
/// an already applied up file fails with a ledger write error wrapping
/// [`Error::Duplicate`], and reverting an unrecorded down file fails wrapping
/// [`Error::NotRecorded`]. Both roll back the file's SQL.
///
/// # Errors
///
/// Returns the error of [`work_item_for`], the ledger table creation error,
/// or the executor error.
pub fn apply_file(
    conn: &mut dyn Connection,
    ledger: &Ledger,
    path: &Path,
    cancel: &CancellationToken,
) -> Result<WorkItem> {
    let item = work_item_for(path)?;
    ledger.ensure_table(conn)?;

    let executor = Executor::new(ledger).with_cancellation(cancel.clone());
    executor.attach(conn);
    executor.apply(conn, &item)?;
    Ok(item)
}
