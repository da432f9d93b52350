//! Fob polyfill CLI.
//!
//! Runs the polyfill injector against a polyfill-library `__dist` directory
//! and writes the entry loaders and polyfill bundles to disk.
//!
//! - [`cli`] - Argument parsing
//! - [`config`] - Layered configuration (defaults, file, env, flags)
//! - [`commands`] - Command implementations
//! - [`error`] - CLI errors and miette conversion
//! - [`logger`] - Tracing subscriber setup

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;

pub use error::{CliError, ConfigError, Result};
