//! # rotalog testkit
//!
//! Test utilities for rotalog.
//!
//! This crate provides:
//! - Temporary-directory sink fixtures and canned backlog scenarios
//! - Property-based generators for write/rotate plans, with a reference model
//! - A concurrent write/rotate stress harness and a backlog auditor
//!
//! ## Usage
//!
//! ```rust
//! use rotalog_testkit::prelude::*;
//!
//! let fixture = TempSink::new(2);
//! fixture.write(b"hello").unwrap();
//! fixture.rotate().unwrap();
//! assert_eq!(fixture.read_archive(1).unwrap(), b"hello");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
