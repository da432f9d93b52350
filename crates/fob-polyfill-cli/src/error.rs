//! Error handling for the polyfill CLI.
//!
//! Engine failures keep their own diagnostics (codes and help text) all the
//! way to the terminal; everything else is rendered from its message.

use fob_polyfill::PolyfillError;
use miette::Report;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration-related errors (file not found, invalid values, etc.)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Polyfill resolution or injection failed
    #[error(transparent)]
    Polyfill(#[from] PolyfillError),

    /// Failed to write an emitted asset
    #[error("Failed to write {}: {source}\n\nHint: Check output directory permissions", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Explicit config file doesn't exist
    #[error("Config file not found: {}\n\nHint: Create a fob-polyfill.json file or fix --config", .0.display())]
    NotFound(PathBuf),

    /// Missing required configuration field
    #[error("Missing required field: {field}\n\nHint: {hint}")]
    MissingField { field: String, hint: String },

    /// Invalid value for a configuration field
    #[error("Invalid value for {field}: {value}\n\nHint: {hint}")]
    InvalidValue {
        field: String,
        value: String,
        hint: String,
    },
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Polyfill(e) => Report::new(e),
        other => miette::miette!("{}", other),
    }
}
