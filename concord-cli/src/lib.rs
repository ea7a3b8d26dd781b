//! Concord CLI library
//!
//! This library provides the command-line interface for the concord
//! concordance and text-rewrite engine.

pub mod args;
pub mod config;
pub mod error;
pub mod progress;

pub use error::{CliError, CliResult};
