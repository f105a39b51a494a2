//! Driver abstraction over a transactional SQL executor.
//!
//! The migration engine never talks to a concrete database client. It
//! drives a [`Connection`] that can open a [`Transaction`], run SQL scripts,
//! and run parameterized statements. Statements use `?` placeholders.

use crate::cancel::CancelHook;
use crate::error::Result;

/// An open connection to one database target.
pub trait Connection: Send {
    /// The dialect name this connection was opened for (e.g. `sqlite`).
    fn dialect(&self) -> &str;

    /// Executes a script of one or more statements outside a transaction.
    ///
    /// # Errors
    ///
    /// Returns the driver error if any statement fails.
    fn execute_batch(&mut self, sql: &str) -> Result<()>;

    /// Runs a query and returns every row with each column rendered as text.
    ///
    /// `NULL` columns are rendered as an empty string.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the query fails.
    fn query_rows(&mut self, sql: &str) -> Result<Vec<Vec<String>>>;

    /// Opens a transaction.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the transaction cannot be started.
    fn begin(&mut self) -> Result<Box<dyn Transaction + '_>>;

    /// Returns a callback that interrupts a statement running on this
    /// connection from another thread, if the driver supports it.
    fn interrupt_hook(&self) -> Option<CancelHook> {
        None
    }
}

/// A transaction on a [`Connection`].
///
/// Dropping a transaction that is still active rolls it back. After a
/// successful [`commit`](Transaction::commit) or
/// [`rollback`](Transaction::rollback) the transaction is finished and only
/// dropping it remains.
pub trait Transaction {
    /// Executes a script of one or more statements.
    ///
    /// # Errors
    ///
    /// Returns the driver error if any statement fails.
    fn execute_batch(&mut self, sql: &str) -> Result<()>;

    /// Executes one parameterized statement, returning the affected rows.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the statement fails.
    fn execute(&mut self, sql: &str, params: &[&str]) -> Result<usize>;

    /// Returns true if a parameterized query yields at least one row.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the query fails.
    fn exists(&mut self, sql: &str, params: &[&str]) -> Result<bool>;

    /// Returns false once the database has ended the transaction, whether
    /// through a `COMMIT` or `ROLLBACK` in executed SQL or an error the
    /// engine rolled back on its own.
    ///
    /// Drivers that cannot tell report true.
    fn is_active(&self) -> bool {
        true
    }

    /// Commits the transaction.
    ///
    /// If the commit fails the transaction may still be open; callers roll
    /// it back to learn the outcome.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the commit fails.
    fn commit(&mut self) -> Result<()>;

    /// Rolls the transaction back.
    ///
    /// Succeeds without doing anything when the database already ended the
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the rollback fails.
    fn rollback(&mut self) -> Result<()>;
}
