//! # rotalog core
//!
//! A rotating, append-only log file that is safe to share between threads.
//!
//! The sink owns one current file and a bounded backlog of numbered
//! archives. Rotation renames the current file into the backlog and opens a
//! fresh one while holding the same lock that every write takes, so each
//! write lands wholly in one generation.
//!
//! ## Design Principles
//!
//! - The sink is an opaque byte sink; it never parses what it stores
//! - One lock per sink, no process-wide state
//! - Rotation is a best-effort sequence of steps, not a transaction
//! - Deciding *when* to rotate (signals, timers, size) is the caller's job
//!
//! ## Example
//!
//! ```rust
//! use rotalog_core::RotatingFileSink;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let sink = RotatingFileSink::create(dir.path().join("app.log"), 2).unwrap();
//!
//! sink.write(b"before\n").unwrap();
//! sink.rotate().unwrap();
//! sink.write(b"after\n").unwrap();
//!
//! assert_eq!(sink.archives(), vec![dir.path().join("app.log.1")]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod archive;
mod config;
mod error;
mod sink;

pub use archive::{archive_path, list_archives};
pub use config::{validate_retention, SinkConfig};
pub use error::{SinkError, SinkResult};
pub use sink::RotatingFileSink;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
