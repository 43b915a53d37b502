//! Backlog naming and the retention shift.
//!
//! Archived generations live next to the base file:
//!
//! ```text
//! <dir>/
//! ├─ app.log      # current file, append target
//! ├─ app.log.1    # newest archived generation
//! ├─ app.log.2
//! └─ app.log.N    # oldest retained generation (N = retention)
//! ```
//!
//! The shift is a plain sequence of fallible file-system steps. A failure
//! stops the sequence and is returned as is; steps already taken stay taken.

use crate::error::{SinkError, SinkResult};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Returns the path of archived generation `generation` for `base`.
///
/// Generation 1 is the newest archive.
#[must_use]
pub fn archive_path(base: &Path, generation: usize) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(format!(".{generation}"));
    PathBuf::from(name)
}

/// Lists the archived generations of `base` that exist on disk, newest first.
///
/// Gaps left by earlier partial rotations are skipped.
#[must_use]
pub fn list_archives(base: &Path, retention: usize) -> Vec<PathBuf> {
    (1..=retention)
        .map(|generation| archive_path(base, generation))
        .filter(|path| path.is_file())
        .collect()
}

/// What a retention shift did on disk.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct ShiftOutcome {
    /// Files deleted (the oldest generation, or the base file when retention is 0).
    pub removed: usize,
    /// Files renamed, including the base file.
    pub renamed: usize,
    /// Where the base file went, if it existed and was archived.
    pub archived: Option<PathBuf>,
}

/// Shifts the backlog of `base` by one generation.
///
/// With `retention == 0` the base file is simply deleted. Otherwise the
/// oldest generation is deleted, every surviving generation moves up by
/// one (highest first so nothing is overwritten) and the base file becomes
/// generation 1. Missing files are skipped.
///
/// The base file must already be closed.
pub(crate) fn shift_backlog(base: &Path, retention: usize) -> SinkResult<ShiftOutcome> {
    let mut outcome = ShiftOutcome::default();

    if retention == 0 {
        if remove_if_exists(base)? {
            outcome.removed += 1;
        }
        return Ok(outcome);
    }

    if remove_if_exists(&archive_path(base, retention))? {
        outcome.removed += 1;
    }

    for generation in (1..retention).rev() {
        let from = archive_path(base, generation);
        let to = archive_path(base, generation + 1);
        if rename_if_exists(&from, &to)? {
            outcome.renamed += 1;
        }
    }

    let newest = archive_path(base, 1);
    if rename_if_exists(base, &newest)? {
        outcome.renamed += 1;
        outcome.archived = Some(newest);
    }

    Ok(outcome)
}

fn remove_if_exists(path: &Path) -> SinkResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(SinkError::remove(path, e)),
    }
}

fn rename_if_exists(from: &Path, to: &Path) -> SinkResult<bool> {
    match fs::rename(from, to) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(SinkError::rename(from, to, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn archive_names_append_generation() {
        let base = Path::new("logs/test.log");
        assert_eq!(archive_path(base, 1), PathBuf::from("logs/test.log.1"));
        assert_eq!(archive_path(base, 12), PathBuf::from("logs/test.log.12"));
    }

    #[test]
    fn zero_retention_discards_base() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("app.log");
        fs::write(&base, "old").unwrap();

        let outcome = shift_backlog(&base, 0).unwrap();

        assert!(!base.exists());
        assert!(!archive_path(&base, 1).exists());
        assert_eq!(outcome.removed, 1);
        assert_eq!(outcome.archived, None);
    }

    #[test]
    fn shift_moves_every_generation_up() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("app.log");
        fs::write(&base, "current").unwrap();
        fs::write(archive_path(&base, 1), "one").unwrap();
        fs::write(archive_path(&base, 2), "two").unwrap();

        let outcome = shift_backlog(&base, 3).unwrap();

        assert!(!base.exists());
        assert_eq!(read(&archive_path(&base, 1)), "current");
        assert_eq!(read(&archive_path(&base, 2)), "one");
        assert_eq!(read(&archive_path(&base, 3)), "two");
        assert_eq!(outcome.renamed, 3);
        assert_eq!(outcome.removed, 0);
        assert_eq!(outcome.archived, Some(archive_path(&base, 1)));
    }

    #[test]
    fn oldest_generation_falls_off() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("app.log");
        fs::write(&base, "current").unwrap();
        fs::write(archive_path(&base, 1), "one").unwrap();
        fs::write(archive_path(&base, 2), "two").unwrap();

        let outcome = shift_backlog(&base, 2).unwrap();

        assert_eq!(read(&archive_path(&base, 1)), "current");
        assert_eq!(read(&archive_path(&base, 2)), "one");
        assert!(!archive_path(&base, 3).exists());
        assert_eq!(outcome.removed, 1);
    }

    #[test]
    fn gaps_are_skipped() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("app.log");
        fs::write(&base, "current").unwrap();
        fs::write(archive_path(&base, 2), "two").unwrap();

        shift_backlog(&base, 4).unwrap();

        assert_eq!(read(&archive_path(&base, 1)), "current");
        assert!(!archive_path(&base, 2).exists());
        assert_eq!(read(&archive_path(&base, 3)), "two");
        assert_eq!(list_archives(&base, 4).len(), 2);
    }

    #[test]
    fn missing_base_is_not_an_error() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("never-written.log");

        let outcome = shift_backlog(&base, 2).unwrap();
        assert_eq!(outcome, ShiftOutcome::default());
    }

    #[test]
    fn failed_step_stops_the_shift() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("app.log");
        fs::write(&base, "current").unwrap();
        fs::write(archive_path(&base, 1), "one").unwrap();
        // A directory in the oldest slot cannot be removed as a file.
        let blocker = archive_path(&base, 2);
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("keep"), "x").unwrap();

        let result = shift_backlog(&base, 2);

        assert!(matches!(result, Err(SinkError::Remove { .. })));
        assert_eq!(read(&base), "current");
        assert_eq!(read(&archive_path(&base, 1)), "one");
    }

    #[test]
    fn list_archives_is_newest_first() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("app.log");
        fs::write(archive_path(&base, 1), "one").unwrap();
        fs::write(archive_path(&base, 3), "three").unwrap();

        let archives = list_archives(&base, 3);
        assert_eq!(archives, vec![archive_path(&base, 1), archive_path(&base, 3)]);
    }
}
