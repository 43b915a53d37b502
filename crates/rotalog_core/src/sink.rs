//! The rotating file sink.

use crate::archive::{self, shift_backlog, ShiftOutcome};
use crate::config::SinkConfig;
use crate::error::{SinkError, SinkResult};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace, warn};

/// An append-only log file that can be rotated into a numbered backlog.
///
/// Writes and rotations are serialized by one lock, so a write lands either
/// entirely in the generation that was current when it acquired the lock or
/// entirely in the fresh file that a rotation opened. No write is split
/// across a rotation and no two rotations interleave.
///
/// # Thread Safety
///
/// The sink is `Send + Sync`; share it by reference or through an `Arc`.
/// The lock is not re-entrant, so a rotation's ready callback must not call
/// back into the same sink.
///
/// # Example
///
/// ```no_run
/// use rotalog_core::RotatingFileSink;
///
/// let sink = RotatingFileSink::create("logs/app.log", 8).unwrap();
/// sink.write(b"first generation\n").unwrap();
/// sink.rotate().unwrap();
/// sink.write(b"second generation\n").unwrap();
/// sink.close().unwrap();
/// ```
#[derive(Debug)]
pub struct RotatingFileSink {
    path: PathBuf,
    directory: PathBuf,
    retention: usize,
    sync_on_close: bool,
    current: Mutex<Option<File>>,
    rotating: AtomicBool,
}

impl RotatingFileSink {
    /// Creates a sink for `path` keeping `retention` archived generations.
    ///
    /// No file is opened or created; call [`open`](Self::open) before writing.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `path` is empty
    /// - the parent directory does not exist or is not a directory
    pub fn new(path: impl AsRef<Path>, retention: usize) -> SinkResult<Self> {
        Self::with_config(SinkConfig::new(path).retention(retention))
    }

    /// Creates a sink from a full configuration.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn with_config(config: SinkConfig) -> SinkResult<Self> {
        let directory = resolve_directory(&config.path)?;

        Ok(Self {
            path: config.path,
            directory,
            retention: config.retention,
            sync_on_close: config.sync_on_close,
            current: Mutex::new(None),
            rotating: AtomicBool::new(false),
        })
    }

    /// Creates a sink and opens its current file.
    ///
    /// # Errors
    ///
    /// Returns a configuration error from [`new`](Self::new) or the I/O
    /// error from opening the file.
    pub fn create(path: impl AsRef<Path>, retention: usize) -> SinkResult<Self> {
        let sink = Self::new(path, retention)?;
        sink.open()?;
        Ok(sink)
    }

    /// Opens the current file for appending, creating it if absent.
    ///
    /// Any handle already held is closed first.
    ///
    /// # Errors
    ///
    /// Returns an error if closing the previous handle fails or the path
    /// cannot be opened (for example because it is a directory).
    pub fn open(&self) -> SinkResult<()> {
        {
            let mut current = self.current.lock();
            self.close_locked(&mut current)?;
            *current = Some(open_append(&self.path)?);
        }
        trace!(path = %self.path.display(), "opened log file");
        Ok(())
    }

    /// Closes the current file. Closing a sink that is not open is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the pre-close sync fails (only with
    /// `sync_on_close`).
    pub fn close(&self) -> SinkResult<()> {
        let closed = {
            let mut current = self.current.lock();
            self.close_locked(&mut current)?
        };
        if closed {
            trace!(path = %self.path.display(), "closed log file");
        }
        Ok(())
    }

    /// Returns true if a current file handle is held.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.current.lock().is_some()
    }

    /// Appends `data` to the current file.
    ///
    /// Returns the number of bytes written, which is always `data.len()` on
    /// success. The file is never opened implicitly.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::NotOpen`] if no file is open, or the I/O error
    /// reported by the platform (a short write surfaces as
    /// `ErrorKind::WriteZero`).
    pub fn write(&self, data: &[u8]) -> SinkResult<usize> {
        let mut current = self.current.lock();
        let file = current.as_mut().ok_or(SinkError::NotOpen)?;
        file.write_all(data)?;
        Ok(data.len())
    }

    /// Flushes the current file. A no-op when the sink is closed.
    pub fn flush(&self) -> SinkResult<()> {
        if let Some(file) = self.current.lock().as_mut() {
            file.flush()?;
        }
        Ok(())
    }

    /// Syncs the current file's data and metadata to disk.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::NotOpen`] if no file is open.
    pub fn sync(&self) -> SinkResult<()> {
        let current = self.current.lock();
        let file = current.as_ref().ok_or(SinkError::NotOpen)?;
        file.sync_all()?;
        Ok(())
    }

    /// Rotates the current file into the backlog.
    ///
    /// Equivalent to [`rotate_with`](Self::rotate_with) with a callback that
    /// does nothing.
    pub fn rotate(&self) -> SinkResult<()> {
        self.rotate_with(|_| {})
    }

    /// Rotates the current file into the backlog and runs `on_ready`.
    ///
    /// Under the sink's lock this closes the current file, shifts the
    /// backlog (see [`crate::archive`]), opens a fresh empty current file and
    /// finally calls `on_ready` with the path the old file was archived to
    /// (`None` when retention is 0 or there was nothing to archive). The
    /// callback runs before any other writer or rotator can proceed.
    ///
    /// Rotation is not transactional: if a step fails, the error is returned
    /// and the files are left as the completed steps made them.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error.
    pub fn rotate_with<F>(&self, on_ready: F) -> SinkResult<()>
    where
        F: FnOnce(Option<&Path>),
    {
        let result = self.rotate_locked(on_ready);

        match &result {
            Ok(outcome) => debug!(
                path = %self.path.display(),
                retention = self.retention,
                removed = outcome.removed,
                renamed = outcome.renamed,
                "rotated log file"
            ),
            Err(e) => warn!(path = %self.path.display(), error = %e, "log rotation failed"),
        }

        result.map(|_| ())
    }

    fn rotate_locked<F>(&self, on_ready: F) -> SinkResult<ShiftOutcome>
    where
        F: FnOnce(Option<&Path>),
    {
        let mut current = self.current.lock();
        // Dropped before the guard, so the flag clears while still locked.
        let _rotating = RotatingFlag::raise(&self.rotating);

        self.close_locked(&mut current)?;
        let outcome = shift_backlog(&self.path, self.retention)?;
        *current = Some(open_append(&self.path)?);

        on_ready(outcome.archived.as_deref());

        Ok(outcome)
    }

    /// Returns true while a rotation is executing.
    ///
    /// Does not take the lock; meant for health reporting only.
    #[must_use]
    pub fn rotation_in_progress(&self) -> bool {
        self.rotating.load(Ordering::Acquire)
    }

    /// Returns the base path of the current file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the resolved directory containing the current file.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Returns the number of archived generations kept.
    #[must_use]
    pub fn retention(&self) -> usize {
        self.retention
    }

    /// Returns the path of archived generation `generation` (1 = newest).
    #[must_use]
    pub fn archive_path(&self, generation: usize) -> PathBuf {
        archive::archive_path(&self.path, generation)
    }

    /// Lists existing archived generations, newest first.
    #[must_use]
    pub fn archives(&self) -> Vec<PathBuf> {
        archive::list_archives(&self.path, self.retention)
    }

    /// Closes the handle held in `current`, returning whether one was open.
    fn close_locked(&self, current: &mut Option<File>) -> SinkResult<bool> {
        let Some(file) = current.take() else {
            return Ok(false);
        };
        if self.sync_on_close {
            file.sync_all()?;
        }
        drop(file);
        Ok(true)
    }
}

impl Drop for RotatingFileSink {
    fn drop(&mut self) {
        if self.sync_on_close {
            if let Some(file) = self.current.get_mut().take() {
                let _ = file.sync_all();
            }
        }
    }
}

impl Write for &RotatingFileSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        RotatingFileSink::write(self, buf).map_err(Into::into)
    }

    fn flush(&mut self) -> io::Result<()> {
        RotatingFileSink::flush(self).map_err(Into::into)
    }
}

impl Write for RotatingFileSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        RotatingFileSink::write(self, buf).map_err(Into::into)
    }

    fn flush(&mut self) -> io::Result<()> {
        RotatingFileSink::flush(self).map_err(Into::into)
    }
}

/// Holds the rotating flag raised for the lifetime of the guard.
struct RotatingFlag<'a>(&'a AtomicBool);

impl<'a> RotatingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for RotatingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Validates `path` and returns the directory it lives in.
fn resolve_directory(path: &Path) -> SinkResult<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(SinkError::EmptyPath);
    }

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    match fs::metadata(&directory) {
        Ok(meta) if meta.is_dir() => Ok(directory),
        Ok(_) => Err(SinkError::not_a_directory(directory)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(SinkError::directory_missing(directory))
        }
        Err(e) => Err(SinkError::Io(e)),
    }
}
