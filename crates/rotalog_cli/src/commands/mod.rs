//! CLI command implementations.

pub mod list;
pub mod rotate;
pub mod run;
