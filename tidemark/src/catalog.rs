//! Migration file discovery.
//!
//! A target's migrations live in one directory as pairs of files named
//! `<sequence_key>_<name>.up.sql` and `<sequence_key>_<name>.down.sql`. This
//! module parses those names and produces a [`Catalog`] sorted ascending by
//! `(sequence_key, name)`.

use std::cmp::Ordering;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result, StructuralIssue};

const SQL_EXTENSION: &str = ".sql";

/// Direction of a change-set.
///
/// `Up` sorts before `Down` so that the two files of one migration appear in
/// a stable order inside a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Apply the migration.
    Up,
    /// Revert the migration.
    Down,
}

impl Direction {
    /// Parses a direction suffix, ignoring ASCII case.
    ///
    /// # Examples
    ///
    /// ```
    /// use tidemark::Direction;
    ///
    /// assert_eq!(Direction::parse("up"), Some(Direction::Up));
    /// assert_eq!(Direction::parse("DOWN"), Some(Direction::Down));
    /// assert_eq!(Direction::parse("sideways"), None);
    /// ```
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("up") {
            Some(Self::Up)
        } else if s.eq_ignore_ascii_case("down") {
            Some(Self::Down)
        } else {
            None
        }
    }

    /// Returns the file suffix for this direction (`up` or `down`).
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// A migration file discovered on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    /// Lexicographically sortable prefix, e.g. a Unix timestamp.
    pub sequence_key: String,
    /// Human label following the first underscore.
    pub name: String,
    /// Which way this change-set moves the schema.
    pub direction: Direction,
    /// Location of the change-set body.
    pub path: PathBuf,
}

impl MigrationFile {
    /// Returns the direction-independent identifier recorded in the ledger.
    ///
    /// # Examples
    ///
    /// ```
    /// use tidemark::{Direction, MigrationFile};
    /// use std::path::PathBuf;
    ///
    /// let file = MigrationFile {
    ///     sequence_key: "1700000000".into(),
    ///     name: "create_users".into(),
    ///     direction: Direction::Up,
    ///     path: PathBuf::from("1700000000_create_users.up.sql"),
    /// };
    /// assert_eq!(file.identifier(), "1700000000_create_users");
    /// ```
    #[must_use]
    pub fn identifier(&self) -> String {
        format!("{}_{}", self.sequence_key, self.name)
    }

    /// Orders files by `(sequence_key, name)`, then direction.
    #[must_use]
    pub fn order(&self, other: &Self) -> Ordering {
        self.sequence_key
            .cmp(&other.sequence_key)
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.direction.cmp(&other.direction))
    }
}

/// Classification of a single file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedName<'a> {
    /// A recognized migration file.
    Migration {
        /// The sequence key.
        sequence_key: &'a str,
        /// The label.
        name: &'a str,
        /// The direction.
        direction: Direction,
    },
    /// `<key>_<name>.<suffix>.sql` where the suffix is not a direction.
    UnknownDirection,
    /// Anything else: README files, `.sql` files without a direction, etc.
    NotMigration,
}

/// Classifies a file name against the `<key>_<name>.<up|down>.sql` scheme.
///
/// # Examples
///
/// ```
/// use tidemark::catalog::{parse_file_name, ParsedName};
/// use tidemark::Direction;
///
/// assert_eq!(
///     parse_file_name("1_a.up.sql"),
///     ParsedName::Migration { sequence_key: "1", name: "a", direction: Direction::Up }
/// );
/// assert_eq!(parse_file_name("1_a.sideways.sql"), ParsedName::UnknownDirection);
/// assert_eq!(parse_file_name("README.md"), ParsedName::NotMigration);
/// ```
#[must_use]
pub fn parse_file_name(file_name: &str) -> ParsedName<'_> {
    let Some(split) = file_name.len().checked_sub(SQL_EXTENSION.len()) else {
        return ParsedName::NotMigration;
    };
    let stem = match (file_name.get(..split), file_name.get(split..)) {
        (Some(stem), Some(ext)) if ext.eq_ignore_ascii_case(SQL_EXTENSION) => stem,
        _ => return ParsedName::NotMigration,
    };

    // A stem without a second extension is a plain .sql file, not a change-set.
    let Some((base, suffix)) = stem.rsplit_once('.') else {
        return ParsedName::NotMigration;
    };
    if base.contains('.') {
        return ParsedName::NotMigration;
    }
    let Some((sequence_key, name)) = base.split_once('_') else {
        return ParsedName::NotMigration;
    };
    if sequence_key.is_empty() || name.is_empty() {
        return ParsedName::NotMigration;
    }

    match Direction::parse(suffix) {
        Some(direction) => ParsedName::Migration {
            sequence_key,
            name,
            direction,
        },
        None => ParsedName::UnknownDirection,
    }
}

/// The migration files of one target, sorted ascending.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    dir: PathBuf,
    files: Vec<MigrationFile>,
    issues: Vec<StructuralIssue>,
}

impl Catalog {
    /// Scans a directory for migration files.
    ///
    /// Subdirectories and files that are not migrations are skipped. Files
    /// with an unrecognized direction suffix are recorded as structural
    /// issues rather than skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Discovery`] if the directory does not exist or
    /// cannot be read.
    pub fn scan(dir: &Path) -> Result<Self> {
        let discovery = |e: io::Error| Error::Discovery {
            path: dir.to_path_buf(),
            reason: if e.kind() == io::ErrorKind::NotFound {
                "directory does not exist".to_string()
            } else {
                e.to_string()
            },
        };

        let mut files = Vec::new();
        let mut issues = Vec::new();

        for entry in fs::read_dir(dir).map_err(discovery)? {
            let entry = entry.map_err(discovery)?;
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                log::debug!("Skipping non UTF-8 file name in {}", dir.display());
                continue;
            };

            match parse_file_name(file_name) {
                ParsedName::Migration {
                    sequence_key,
                    name,
                    direction,
                } => files.push(MigrationFile {
                    sequence_key: sequence_key.to_string(),
                    name: name.to_string(),
                    direction,
                    path: path.clone(),
                }),
                ParsedName::UnknownDirection => {
                    issues.push(StructuralIssue::UnknownDirection { file: path.clone() });
                }
                ParsedName::NotMigration => {
                    log::debug!("Skipping {file_name}: not a migration file");
                }
            }
        }

        let mut catalog = Self::from_files(dir, files);
        issues.sort_by_key(ToString::to_string);
        issues.append(&mut catalog.issues);
        catalog.issues = issues;
        log::debug!(
            "Found {} migration file(s) in {}",
            catalog.files.len(),
            dir.display()
        );
        Ok(catalog)
    }

    /// Builds a catalog from already-known files, sorting them.
    ///
    /// Two files claiming the same identifier and direction are reported as
    /// an ambiguity; only the first is kept.
    #[must_use]
    pub fn from_files(dir: &Path, mut files: Vec<MigrationFile>) -> Self {
        files.sort_by(|a, b| a.order(b).then_with(|| a.path.cmp(&b.path)));

        let mut issues = Vec::new();
        files.dedup_by(|later, earlier| {
            let duplicate = later.order(earlier) == Ordering::Equal;
            if duplicate {
                issues.push(StructuralIssue::Ambiguous {
                    identifier: earlier.identifier(),
                    direction: earlier.direction,
                });
            }
            duplicate
        });
        issues.dedup();

        Self {
            dir: dir.to_path_buf(),
            files,
            issues,
        }
    }

    /// The scanned directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// All migration files, ascending.
    #[must_use]
    pub fn files(&self) -> &[MigrationFile] {
        &self.files
    }

    /// Structural issues found while scanning.
    #[must_use]
    pub fn issues(&self) -> &[StructuralIssue] {
        &self.issues
    }

    /// Returns true if no migration files were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Files of one direction, ascending.
    pub fn with_direction(
        &self,
        direction: Direction,
    ) -> impl DoubleEndedIterator<Item = &MigrationFile> {
        self.files.iter().filter(move |f| f.direction == direction)
    }

    /// Looks up the file for an identifier and direction.
    #[must_use]
    pub fn find(&self, identifier: &str, direction: Direction) -> Option<&MigrationFile> {
        self.with_direction(direction)
            .find(|f| f.identifier() == identifier)
    }
}
