//! Error types for sink operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;

/// Errors that can occur while configuring, writing to, or rotating a sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The base path was empty.
    #[error("log file path is empty")]
    EmptyPath,

    /// The parent directory of the base path does not exist.
    #[error("log directory does not exist: {}", path.display())]
    DirectoryMissing {
        /// The directory that was checked.
        path: PathBuf,
    },

    /// The parent "directory" of the base path exists but is not a directory.
    #[error("log directory path is not a directory: {}", path.display())]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// A signed retention count below zero was supplied.
    #[error("retention count must not be negative, got {count}")]
    NegativeRetention {
        /// The rejected count.
        count: i64,
    },

    /// No file handle is open.
    #[error("log file is not open")]
    NotOpen,

    /// An I/O error occurred while opening, closing, writing or syncing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Removing a file during rotation failed.
    #[error("failed to remove {}: {source}", path.display())]
    Remove {
        /// File that could not be removed.
        path: PathBuf,
        /// Underlying cause.
        #[source]
        source: io::Error,
    },

    /// Renaming a file during rotation failed.
    #[error("failed to rename {} to {}: {source}", from.display(), to.display())]
    Rename {
        /// Source path of the rename.
        from: PathBuf,
        /// Destination path of the rename.
        to: PathBuf,
        /// Underlying cause.
        #[source]
        source: io::Error,
    },
}

impl SinkError {
    /// Creates a directory missing error.
    pub fn directory_missing(path: impl Into<PathBuf>) -> Self {
        Self::DirectoryMissing { path: path.into() }
    }

    /// Creates a not-a-directory error.
    pub fn not_a_directory(path: impl Into<PathBuf>) -> Self {
        Self::NotADirectory { path: path.into() }
    }

    /// Creates a remove error.
    pub fn remove(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Remove {
            path: path.into(),
            source,
        }
    }

    /// Creates a rename error.
    pub fn rename(from: impl Into<PathBuf>, to: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Rename {
            from: from.into(),
            to: to.into(),
            source,
        }
    }

    /// Returns true for errors raised while validating configuration.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyPath
                | Self::DirectoryMissing { .. }
                | Self::NotADirectory { .. }
                | Self::NegativeRetention { .. }
        )
    }
}

impl From<SinkError> for io::Error {
    fn from(err: SinkError) -> Self {
        match err {
            SinkError::Io(e) => e,
            SinkError::Remove { source, .. } | SinkError::Rename { source, .. } => source,
            SinkError::NotOpen => io::Error::new(io::ErrorKind::NotConnected, err),
            other => io::Error::new(io::ErrorKind::InvalidInput, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_are_classified() {
        assert!(SinkError::EmptyPath.is_config_error());
        assert!(SinkError::NegativeRetention { count: -1 }.is_config_error());
        assert!(SinkError::directory_missing("/nope").is_config_error());
        assert!(!SinkError::NotOpen.is_config_error());
    }

    #[test]
    fn io_conversion_keeps_cause() {
        let err = SinkError::rename(
            "a.log",
            "a.log.1",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let io_err: io::Error = err.into();
        assert_eq!(io_err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn not_open_maps_to_not_connected() {
        let io_err: io::Error = SinkError::NotOpen.into();
        assert_eq!(io_err.kind(), io::ErrorKind::NotConnected);
    }

    #[test]
    fn messages_name_paths() {
        let err = SinkError::directory_missing("/missing/dir");
        assert_eq!(err.to_string(), "log directory does not exist: /missing/dir");
    }
}
