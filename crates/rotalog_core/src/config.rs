//! Sink configuration.

use crate::error::{SinkError, SinkResult};
use std::path::{Path, PathBuf};

/// Configuration for a [`crate::RotatingFileSink`].
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Base path of the current log file.
    pub path: PathBuf,

    /// Maximum number of rotated-out files to keep (0 = keep none).
    pub retention: usize,

    /// Whether to fsync the current file before it is closed.
    pub sync_on_close: bool,
}

impl SinkConfig {
    /// Creates a configuration for `path` with default settings.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            retention: 0,
            sync_on_close: false,
        }
    }

    /// Sets the number of archived generations to keep.
    #[must_use]
    pub const fn retention(mut self, count: usize) -> Self {
        self.retention = count;
        self
    }

    /// Sets whether to fsync before closing the current file.
    #[must_use]
    pub const fn sync_on_close(mut self, value: bool) -> Self {
        self.sync_on_close = value;
        self
    }
}

/// Converts a signed retention count into a backlog bound.
///
/// Used where the count comes from an untyped source such as a command line
/// or environment variable.
///
/// # Errors
///
/// Returns [`SinkError::NegativeRetention`] if `count` is below zero.
pub fn validate_retention(count: i64) -> SinkResult<usize> {
    usize::try_from(count).map_err(|_| SinkError::NegativeRetention { count })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SinkConfig::new("logs/app.log");
        assert_eq!(config.path, PathBuf::from("logs/app.log"));
        assert_eq!(config.retention, 0);
        assert!(!config.sync_on_close);
    }

    #[test]
    fn builder_pattern() {
        let config = SinkConfig::new("app.log").retention(8).sync_on_close(true);

        assert_eq!(config.retention, 8);
        assert!(config.sync_on_close);
    }

    #[test]
    fn negative_retention_rejected() {
        let result = validate_retention(-1);
        assert!(matches!(
            result,
            Err(SinkError::NegativeRetention { count: -1 })
        ));
    }

    #[test]
    fn non_negative_retention_accepted() {
        assert_eq!(validate_retention(0).unwrap(), 0);
        assert_eq!(validate_retention(8).unwrap(), 8);
    }
}
