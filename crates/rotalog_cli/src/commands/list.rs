//! Backlog listing.

use rotalog_core::{RotatingFileSink, SinkResult};
use std::fs;
use std::path::PathBuf;

/// One file of the backlog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFileEntry {
    /// Archive generation, `None` for the current file.
    pub generation: Option<usize>,
    /// File path.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
}

/// Collects the current file and existing archives, current file first.
pub fn run(sink: &RotatingFileSink) -> SinkResult<Vec<LogFileEntry>> {
    let mut entries = Vec::new();

    if sink.path().is_file() {
        entries.push(LogFileEntry {
            generation: None,
            path: sink.path().to_path_buf(),
            size: fs::metadata(sink.path())?.len(),
        });
    }

    for generation in 1..=sink.retention() {
        let path = sink.archive_path(generation);
        if !path.is_file() {
            continue;
        }
        let size = fs::metadata(&path)?.len();
        entries.push(LogFileEntry {
            generation: Some(generation),
            path,
            size,
        });
    }

    Ok(entries)
}

/// Prints entries as a table.
pub fn print(entries: &[LogFileEntry]) {
    if entries.is_empty() {
        println!("No log files found");
        return;
    }

    println!("{:<10} {:>12}  {}", "GENERATION", "SIZE", "PATH");
    for entry in entries {
        let generation = entry
            .generation
            .map_or_else(|| "current".to_string(), |g| g.to_string());
        println!(
            "{:<10} {:>12}  {}",
            generation,
            entry.size,
            entry.path.display()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_current_and_archives() {
        let dir = tempfile::tempdir().unwrap();
        let sink = RotatingFileSink::create(dir.path().join("app.log"), 3).unwrap();
        sink.write(b"first").unwrap();
        sink.rotate().unwrap();
        sink.write(b"second!").unwrap();
        sink.close().unwrap();

        let entries = run(&sink).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].generation, None);
        assert_eq!(entries[0].size, 7);
        assert_eq!(entries[1].generation, Some(1));
        assert_eq!(entries[1].size, 5);
    }

    #[test]
    fn empty_when_nothing_written() {
        let dir = tempfile::tempdir().unwrap();
        let sink = RotatingFileSink::new(dir.path().join("app.log"), 3).unwrap();
        assert!(run(&sink).unwrap().is_empty());
    }
}
