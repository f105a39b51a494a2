//! Scaffolding of new migration file pairs.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;

use crate::catalog::Direction;
use crate::error::{Error, Result};

/// The files written by [`create_migration`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedPair {
    /// The migration identifier.
    pub identifier: String,
    /// The new up file.
    pub up: PathBuf,
    /// The new down file.
    pub down: PathBuf,
}

/// Returns a sequence key for a migration created now: the current Unix
/// time in seconds.
#[must_use]
pub fn next_sequence_key() -> String {
    Utc::now().timestamp().to_string()
}

fn validate_label(field: &str, value: &str, extra: &[char]) -> Result<()> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || extra.contains(&c));
    if valid {
        Ok(())
    } else {
        Err(Error::Validation {
            field: field.into(),
            message: format!(
                "'{value}' must match [A-Za-z0-9{}]+",
                extra.iter().collect::<String>()
            ),
        })
    }
}

/// Writes empty `<key>_<name>.up.sql` and `.down.sql` files under
/// `<out_dir>/<target>/`, creating the directory.
///
/// # Errors
///
/// Returns [`Error::Validation`] for an invalid target, name, or sequence
/// key, [`Error::InvalidPath`] if either file already exists, or an I/O
/// error if the files cannot be written.
///
/// # Examples
///
/// ```
/// use tidemark::operations::create_migration;
///
/// let dir = tempfile::tempdir().unwrap();
/// let pair = create_migration(dir.path(), "main", "create_users", "1700000000").unwrap();
///
/// assert_eq!(pair.identifier, "1700000000_create_users");
/// assert!(pair.up.ends_with("main/1700000000_create_users.up.sql"));
/// assert!(pair.down.exists());
/// ```
pub fn create_migration(
    out_dir: &Path,
    target: &str,
    name: &str,
    sequence_key: &str,
) -> Result<CreatedPair> {
    validate_label("target", target, &['_', '-'])?;
    validate_label("name", name, &['_', '-'])?;
    validate_label("sequence_key", sequence_key, &[])?;

    let dir = out_dir.join(target);
    fs::create_dir_all(&dir)?;

    let identifier = format!("{sequence_key}_{name}");
    let path_for = |direction: Direction| dir.join(format!("{identifier}.{direction}.sql"));
    let up = path_for(Direction::Up);
    let down = path_for(Direction::Down);

    for path in [&up, &down] {
        if path.exists() {
            return Err(Error::InvalidPath {
                path: path.clone(),
                reason: "migration file already exists".into(),
            });
        }
    }

    write_new(&up, &identifier, Direction::Up)?;
    if let Err(e) = write_new(&down, &identifier, Direction::Down) {
        discard(&up);
        return Err(e);
    }

    log::info!("Created {} and {}", up.display(), down.display());
    Ok(CreatedPair {
        identifier,
        up,
        down,
    })
}

fn write_new(path: &Path, identifier: &str, direction: Direction) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => Error::InvalidPath {
                path: path.to_path_buf(),
                reason: "migration file already exists".into(),
            },
            _ => Error::Io(e),
        })?;
    writeln!(file, "-- {identifier} ({direction})")?;
    Ok(())
}

/// Removes a half-written pair's first file, returning true if it is gone.
fn discard(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Could not remove {}: {e}", path.display());
            false
        }
    }
}
