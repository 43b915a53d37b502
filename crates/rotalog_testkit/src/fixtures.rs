//! Test fixtures and sink helpers.
//!
//! Provides temporary-directory sinks that clean up after themselves and a
//! few canned on-disk scenarios.

use rotalog_core::{RotatingFileSink, SinkConfig};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// File name used for the base file of test sinks.
pub const TEST_LOG_NAME: &str = "test.log";

/// A sink living in its own temporary directory.
pub struct TempSink {
    /// The sink instance.
    pub sink: Arc<RotatingFileSink>,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: TempDir,
}

impl TempSink {
    /// Creates an opened sink keeping `retention` archives.
    pub fn new(retention: usize) -> Self {
        let fixture = Self::unopened(retention);
        fixture.sink.open().expect("Failed to open sink");
        fixture
    }

    /// Creates a sink that has not opened its current file yet.
    pub fn unopened(retention: usize) -> Self {
        Self::with_config(|path| SinkConfig::new(path).retention(retention))
    }

    /// Creates an unopened sink from a configuration built for the temp path.
    pub fn with_config<F>(build: F) -> Self
    where
        F: FnOnce(PathBuf) -> SinkConfig,
    {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = build(temp_dir.path().join(TEST_LOG_NAME));
        let sink = RotatingFileSink::with_config(config).expect("Failed to create sink");

        Self {
            sink: Arc::new(sink),
            _temp_dir: temp_dir,
        }
    }

    /// Returns a shared handle to the sink.
    pub fn shared(&self) -> Arc<RotatingFileSink> {
        Arc::clone(&self.sink)
    }

    /// Returns the temporary directory holding the sink's files.
    pub fn dir(&self) -> &Path {
        self._temp_dir.path()
    }

    /// Reads the current file, or an empty buffer if it does not exist.
    pub fn read_current(&self) -> Vec<u8> {
        read_if_exists(self.sink.path()).unwrap_or_default()
    }

    /// Reads archived generation `generation`, if present.
    pub fn read_archive(&self, generation: usize) -> Option<Vec<u8>> {
        read_if_exists(&self.sink.archive_path(generation))
    }

    /// Reads every archive, newest first.
    pub fn read_archives(&self) -> Vec<Vec<u8>> {
        self.sink
            .archives()
            .iter()
            .map(|path| fs::read(path).expect("Failed to read archive"))
            .collect()
    }
}

impl std::ops::Deref for TempSink {
    type Target = RotatingFileSink;

    fn deref(&self) -> &Self::Target {
        &self.sink
    }
}

fn read_if_exists(path: &Path) -> Option<Vec<u8>> {
    path.is_file()
        .then(|| fs::read(path).expect("Failed to read log file"))
}

/// Runs a test with an opened temporary sink.
///
/// # Example
///
/// ```rust
/// use rotalog_testkit::with_temp_sink;
///
/// with_temp_sink(2, |sink| {
///     sink.write(b"hello").unwrap();
///     sink.rotate().unwrap();
/// });
/// ```
pub fn with_temp_sink<F, R>(retention: usize, f: F) -> R
where
    F: FnOnce(&RotatingFileSink) -> R,
{
    let fixture = TempSink::new(retention);
    f(&fixture.sink)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;
    use rotalog_core::archive_path;

    /// Creates a sink whose backlog already holds `generations` archives.
    ///
    /// Archive `n` contains `"generation-n"`; the current file is empty.
    pub fn populated_backlog(retention: usize, generations: usize) -> TempSink {
        let fixture = TempSink::new(retention);
        for generation in (1..=generations).rev() {
            fixture
                .sink
                .write(format!("generation-{generation}").as_bytes())
                .expect("Failed to write generation");
            fixture.sink.rotate().expect("Failed to rotate");
        }
        fixture
    }

    /// Creates a sink whose backlog has a hole at `missing`.
    pub fn backlog_with_gap(retention: usize, missing: usize) -> TempSink {
        let fixture = populated_backlog(retention, retention);
        fs::remove_file(archive_path(fixture.sink.path(), missing))
            .expect("Failed to punch gap");
        fixture
    }
}
