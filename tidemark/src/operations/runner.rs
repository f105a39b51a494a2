//! Running migrations against one or more configured targets.
//!
//! Each target runs its whole sequence on its own thread: connect, ensure
//! the ledger table, read the applied set, scan the target's directory,
//! plan, and execute. Within a target, execution is strictly sequential.
//! Failures are collected per target rather than aborting other targets.

use std::path::{Path, PathBuf};
use std::thread;

use serde::Serialize;

use crate::cancel::CancellationToken;
use crate::catalog::{Catalog, Direction};
use crate::config::Config;
use crate::database::DialectRegistry;
use crate::error::{Error, Result, TargetFailure};
use crate::resolver::TargetResolver;

use super::executor::{BatchSummary, Executor};
use super::plan::Reconciler;

/// What happened to a target that did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TargetStatus {
    /// The work-list was empty.
    NothingToDo,
    /// Every planned migration ran.
    Completed(BatchSummary),
}

/// The outcome of one target in a run.
#[derive(Debug)]
pub struct TargetOutcome {
    /// The target name.
    pub target: String,
    /// The run direction.
    pub direction: Direction,
    /// The target's status, or the error that stopped it.
    pub result: Result<TargetStatus>,
}

impl TargetOutcome {
    /// Returns true if the target did not fail.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// The outcomes of every target in a run, in target-name order.
#[derive(Debug)]
pub struct RunReport {
    /// The run direction.
    pub direction: Direction,
    /// One outcome per selected target.
    pub outcomes: Vec<TargetOutcome>,
}

impl RunReport {
    /// Returns true if every target succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(TargetOutcome::is_success)
    }

    /// The outcomes that failed.
    pub fn failures(&self) -> impl Iterator<Item = &TargetOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Combines every failure into one error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Targets`] listing each failed target, if any.
    pub fn into_result(self) -> Result<Vec<(String, TargetStatus)>> {
        let mut successes = Vec::new();
        let mut failures = Vec::new();
        for outcome in self.outcomes {
            match outcome.result {
                Ok(status) => successes.push((outcome.target, status)),
                Err(error) => failures.push(TargetFailure {
                    target: outcome.target,
                    error,
                }),
            }
        }

        if failures.is_empty() {
            Ok(successes)
        } else {
            Err(Error::Targets(failures))
        }
    }
}

/// Runs migrations for configured targets.
///
/// # Examples
///
/// ```no_run
/// use tidemark::config::ConfigBuilder;
/// use tidemark::database::DialectRegistry;
/// use tidemark::operations::MigrationRunner;
/// use tidemark::Direction;
///
/// let config = ConfigBuilder::new().build().unwrap();
/// let registry = DialectRegistry::default();
/// let runner = MigrationRunner::new(&config, &registry);
///
/// let report = runner.run(None, Direction::Up).unwrap();
/// for outcome in &report.outcomes {
///     println!("{}: {}", outcome.target, outcome.is_success());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MigrationRunner<'a> {
    resolver: TargetResolver<'a>,
    migrations_root: PathBuf,
    cancel: CancellationToken,
}

impl<'a> MigrationRunner<'a> {
    /// Creates a runner over a configuration and a dialect registry.
    #[must_use]
    pub fn new(config: &'a Config, registry: &'a DialectRegistry) -> Self {
        Self {
            resolver: TargetResolver::new(config, registry),
            migrations_root: config.migrations_dir(),
            cancel: CancellationToken::new(),
        }
    }

    /// Uses a caller-supplied cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The root directory holding one migrations directory per target.
    #[must_use]
    pub fn migrations_root(&self) -> &Path {
        &self.migrations_root
    }

    /// The resolver used to open target connections.
    #[must_use]
    pub const fn resolver(&self) -> &TargetResolver<'a> {
        &self.resolver
    }

    /// The cancellation token shared by every target.
    #[must_use]
    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// The migrations directory of one target.
    #[must_use]
    pub fn target_dir(&self, target: &str) -> PathBuf {
        self.migrations_root.join(target)
    }

    /// Runs one target, or every configured target when `target` is `None`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no targets are configured or the
    /// named target does not exist. Per-target failures are reported in the
    /// returned [`RunReport`].
    pub fn run(&self, target: Option<&str>, direction: Direction) -> Result<RunReport> {
        let names = match target {
            Some(name) => {
                self.resolver.target(name)?;
                vec![name]
            }
            None => self.resolver.target_names()?,
        };
        Ok(self.run_targets(&names, direction))
    }

    /// Runs several targets concurrently, one thread per target.
    ///
    /// Outcomes are sorted by target name.
    #[must_use]
    pub fn run_targets(&self, names: &[&str], direction: Direction) -> RunReport {
        let mut outcomes: Vec<TargetOutcome> = if names.len() == 1 {
            names
                .iter()
                .map(|name| self.run_target(name, direction))
                .collect()
        } else {
            thread::scope(|scope| {
                let handles: Vec<_> = names
                    .iter()
                    .map(|name| scope.spawn(move || self.run_target(name, direction)))
                    .collect();
                handles
                    .into_iter()
                    .map(|handle| {
                        handle
                            .join()
                            .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                    })
                    .collect()
            })
        };
        outcomes.sort_by(|a, b| a.target.cmp(&b.target));

        RunReport {
            direction,
            outcomes,
        }
    }

    /// Runs one target's full sequence.
    #[must_use]
    pub fn run_target(&self, name: &str, direction: Direction) -> TargetOutcome {
        let result = self.migrate(name, direction);
        match &result {
            Ok(TargetStatus::NothingToDo) => {
                log::info!("[{name}] nothing to do");
            }
            Ok(TargetStatus::Completed(summary)) => {
                log::info!(
                    "[{name}] {} {direction} migration(s) complete",
                    summary.completed.len()
                );
            }
            Err(e) => log::error!("[{name}] {e}"),
        }

        TargetOutcome {
            target: name.to_string(),
            direction,
            result,
        }
    }

    fn migrate(&self, name: &str, direction: Direction) -> Result<TargetStatus> {
        let ledger = self.resolver.ledger_for(name)?;
        let mut conn = self.resolver.resolve(name)?;

        ledger.ensure_table(conn.as_mut())?;
        let applied = ledger.list_applied(conn.as_mut())?;

        let dir = self.target_dir(name);
        let catalog = Catalog::scan(&dir)?;
        if direction == Direction::Up && catalog.is_empty() {
            return Err(Error::Discovery {
                path: dir,
                reason: "no migration files found".into(),
            });
        }

        let list = Reconciler::plan(direction, &catalog, &applied)?;
        if list.is_empty() {
            return Ok(TargetStatus::NothingToDo);
        }

        let executor = Executor::new(&ledger).with_cancellation(self.cancel.clone());
        executor.attach(conn.as_ref());
        let summary = executor.apply_batch(conn.as_mut(), &list)?;
        Ok(TargetStatus::Completed(summary))
    }
}
