//! Transactional execution of work-lists.
//!
//! Every change-set runs in its own transaction together with the ledger
//! insert or delete that records it, so the two commit or roll back as one.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::cancel::CancellationToken;
use crate::catalog::Direction;
use crate::database::{Connection, Ledger, Transaction};
use crate::error::{Error, Result};

use super::plan::{WorkItem, WorkList};

/// Result of a fully applied work-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// The direction of the batch.
    pub direction: Direction,
    /// Identifiers applied or reverted, in execution order.
    pub completed: Vec<String>,
}

/// Applies work items to one connection.
///
/// # Examples
///
/// ```
/// use std::fs;
/// use tidemark::database::{Ledger, SqliteConnection};
/// use tidemark::operations::{Executor, WorkItem};
/// use tidemark::Direction;
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("1_users.up.sql");
/// fs::write(&path, "CREATE TABLE users (id INTEGER PRIMARY KEY);").unwrap();
///
/// let mut conn = SqliteConnection::open_in_memory().unwrap();
/// let ledger = Ledger::default();
/// ledger.ensure_table(&mut conn).unwrap();
///
/// let item = WorkItem { identifier: "1_users".into(), direction: Direction::Up, path };
/// Executor::new(&ledger).apply(&mut conn, &item).unwrap();
///
/// assert!(ledger.list_applied(&mut conn).unwrap().contains("1_users"));
/// ```
#[derive(Debug, Clone)]
pub struct Executor<'a> {
    ledger: &'a Ledger,
    cancel: CancellationToken,
}

impl<'a> Executor<'a> {
    /// Creates an executor recording into `ledger`.
    #[must_use]
    pub fn new(ledger: &'a Ledger) -> Self {
        Self {
            ledger,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses a caller-supplied cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Lets cancellation interrupt statements running on `conn`.
    pub fn attach(&self, conn: &dyn Connection) {
        if let Some(hook) = conn.interrupt_hook() {
            self.cancel.on_cancel(hook);
        }
    }

    /// Applies one change-set and records it in the ledger.
    ///
    /// # Errors
    ///
    /// - [`Error::Cancelled`] if the token fired before commit
    /// - [`Error::Execution`] if the file cannot be read, its SQL fails, the
    ///   commit fails, or the SQL ended the transaction itself
    /// - [`Error::LedgerWrite`] if the ledger insert or delete fails
    ///
    /// After a transaction was opened, it is rolled back before returning;
    /// a failed rollback is carried in the error.
    pub fn apply(&self, conn: &mut dyn Connection, item: &WorkItem) -> Result<()> {
        let file = &item.path;
        if self.cancel.is_cancelled() {
            return Err(cancelled(file, None));
        }

        let body = fs::read_to_string(file).map_err(|e| execution(file, e.into(), None))?;
        let mut tx = conn.begin().map_err(|e| execution(file, e, None))?;

        if let Err(e) = tx.execute_batch(&body) {
            let rollback = roll_back(tx.as_mut(), file);
            return Err(if self.cancel.is_cancelled() {
                cancelled(file, rollback)
            } else {
                execution(file, e, rollback)
            });
        }
        if !tx.is_active() {
            log::warn!("{} ended its own transaction", file.display());
            return Err(execution(file, Error::TransactionEnded, None));
        }

        let recorded = match item.direction {
            Direction::Up => self.ledger.record_applied(tx.as_mut(), &item.identifier),
            Direction::Down => self.ledger.record_reverted(tx.as_mut(), &item.identifier),
        };
        if let Err(e) = recorded {
            let rollback = roll_back(tx.as_mut(), file);
            return Err(Error::LedgerWrite {
                identifier: item.identifier.clone(),
                file: file.clone(),
                source: Box::new(e),
                rollback,
            });
        }

        if self.cancel.is_cancelled() {
            let rollback = roll_back(tx.as_mut(), file);
            return Err(cancelled(file, rollback));
        }

        if let Err(e) = tx.commit() {
            let rollback = roll_back(tx.as_mut(), file);
            return Err(execution(file, e, rollback));
        }
        log::info!("{} ({})", item.description(), file.display());
        Ok(())
    }

    /// Applies a work-list in order, stopping at the first failure.
    ///
    /// Items before the failing one stay committed.
    ///
    /// # Errors
    ///
    /// Returns the error of the first item that failed.
    pub fn apply_batch(&self, conn: &mut dyn Connection, list: &WorkList) -> Result<BatchSummary> {
        let mut summary = BatchSummary {
            direction: list.direction,
            completed: Vec::with_capacity(list.len()),
        };

        for item in &list.items {
            if let Err(e) = self.apply(conn, item) {
                if !summary.completed.is_empty() {
                    log::warn!(
                        "Stopped after {} of {} migration(s)",
                        summary.completed.len(),
                        list.len()
                    );
                }
                return Err(e);
            }
            summary.completed.push(item.identifier.clone());
        }

        Ok(summary)
    }
}

fn roll_back(tx: &mut dyn Transaction, file: &Path) -> Option<Box<Error>> {
    match tx.rollback() {
        Ok(()) => None,
        Err(e) => {
            log::warn!("Rollback failed for {}: {e}", file.display());
            Some(Box::new(e))
        }
    }
}

fn execution(file: &Path, source: Error, rollback: Option<Box<Error>>) -> Error {
    Error::Execution {
        file: file.to_path_buf(),
        source: Box::new(source),
        rollback,
    }
}

fn cancelled(file: &Path, rollback: Option<Box<Error>>) -> Error {
    Error::Cancelled {
        file: file.to_path_buf(),
        rollback,
    }
}
