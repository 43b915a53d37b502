//! Benchmark utilities.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use rotalog_core::RotatingFileSink;
use tempfile::TempDir;

/// Creates deterministic payload bytes of the given size.
#[must_use]
pub fn payload(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 256) as u8).collect()
}

/// Creates an opened sink in a fresh temporary directory.
///
/// # Panics
///
/// Panics if the directory or sink cannot be created.
#[must_use]
pub fn temp_sink(retention: usize) -> (TempDir, RotatingFileSink) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let sink = RotatingFileSink::create(temp_dir.path().join("bench.log"), retention)
        .expect("Failed to create sink");
    (temp_dir, sink)
}
