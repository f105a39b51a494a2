//! Work-list planning.
//!
//! The [`Reconciler`] compares a target's [`Catalog`] with the identifiers
//! recorded in its ledger and decides which change-sets must run, in which
//! order, for one direction. Planning never touches the database.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Serialize;

use crate::catalog::{Catalog, Direction, MigrationFile};
use crate::error::{Error, Result, StructuralIssue};

/// One change-set selected for execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkItem {
    /// The ledger identifier (`<sequence_key>_<name>`).
    pub identifier: String,
    /// Whether the change-set applies or reverts the migration.
    pub direction: Direction,
    /// The change-set file.
    pub path: PathBuf,
}

impl WorkItem {
    /// Creates a work item for a discovered file.
    #[must_use]
    pub fn from_file(file: &MigrationFile) -> Self {
        Self {
            identifier: file.identifier(),
            direction: file.direction,
            path: file.path.clone(),
        }
    }

    /// Returns a human-readable description of this item.
    ///
    /// # Examples
    ///
    /// ```
    /// use tidemark::operations::WorkItem;
    /// use tidemark::Direction;
    /// use std::path::PathBuf;
    ///
    /// let item = WorkItem {
    ///     identifier: "1_a".into(),
    ///     direction: Direction::Down,
    ///     path: PathBuf::from("main/1_a.down.sql"),
    /// };
    /// assert_eq!(item.description(), "Revert 1_a");
    /// ```
    #[must_use]
    pub fn description(&self) -> String {
        match self.direction {
            Direction::Up => format!("Apply {}", self.identifier),
            Direction::Down => format!("Revert {}", self.identifier),
        }
    }
}

/// The ordered change-sets to run for one direction.
///
/// `Up` lists are ascending by `(sequence_key, name)`; `Down` lists are
/// descending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkList {
    /// The direction every item shares.
    pub direction: Direction,
    /// The items in execution order.
    pub items: Vec<WorkItem>,
}

impl WorkList {
    /// Creates an empty work list.
    #[must_use]
    pub const fn new(direction: Direction) -> Self {
        Self {
            direction,
            items: Vec::new(),
        }
    }

    /// Returns true if there is nothing to do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of change-sets to run.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// The identifiers in execution order.
    #[must_use]
    pub fn identifiers(&self) -> Vec<&str> {
        self.items.iter().map(|i| i.identifier.as_str()).collect()
    }
}

/// Plans work-lists from a catalog and the applied set.
pub struct Reconciler;

impl Reconciler {
    /// Plans the change-sets to run in `direction`.
    ///
    /// For `Up`, every up file whose identifier is not applied, ascending.
    /// For `Down`, the down file of every applied identifier, descending.
    /// Every structural issue is collected before failing, so one error lists
    /// all of them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Structural`] if the catalog holds unusable files, or
    /// if an applied identifier has no down file when planning `Down`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeSet;
    /// use std::path::{Path, PathBuf};
    /// use tidemark::operations::Reconciler;
    /// use tidemark::{Catalog, Direction, MigrationFile};
    ///
    /// let file = |key: &str, direction| MigrationFile {
    ///     sequence_key: key.into(),
    ///     name: "m".into(),
    ///     direction,
    ///     path: PathBuf::from(format!("{key}_m.{direction}.sql")),
    /// };
    /// let catalog = Catalog::from_files(
    ///     Path::new("."),
    ///     vec![file("2", Direction::Up), file("1", Direction::Up)],
    /// );
    ///
    /// let applied = BTreeSet::from(["1_m".to_string()]);
    /// let plan = Reconciler::plan(Direction::Up, &catalog, &applied).unwrap();
    /// assert_eq!(plan.identifiers(), vec!["2_m"]);
    /// ```
    pub fn plan(
        direction: Direction,
        catalog: &Catalog,
        applied: &BTreeSet<String>,
    ) -> Result<WorkList> {
        let mut issues = catalog.issues().to_vec();
        let mut list = WorkList::new(direction);

        match direction {
            Direction::Up => {
                list.items = catalog
                    .with_direction(Direction::Up)
                    .filter(|f| !applied.contains(&f.identifier()))
                    .map(WorkItem::from_file)
                    .collect();
            }
            Direction::Down => {
                list.items = catalog
                    .with_direction(Direction::Down)
                    .rev()
                    .filter(|f| applied.contains(&f.identifier()))
                    .map(WorkItem::from_file)
                    .collect();

                let planned: BTreeSet<&str> = list.identifiers().into_iter().collect();
                issues.extend(
                    applied
                        .iter()
                        .filter(|id| !planned.contains(id.as_str()))
                        .map(|id| StructuralIssue::MissingCounterpart {
                            identifier: id.clone(),
                            direction: Direction::Down,
                        }),
                );
            }
        }

        if !issues.is_empty() {
            return Err(Error::Structural(issues));
        }

        log::debug!(
            "Planned {} {direction} migration(s) in {}",
            list.len(),
            catalog.dir().display()
        );
        Ok(list)
    }
}
