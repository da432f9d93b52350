//! Logging setup for the polyfill CLI.
//!
//! The engine crate only emits `tracing` events; this module installs the
//! subscriber that turns them into terminal output on stderr, keeping stdout
//! free for the list of written assets.
//!
//! # Features
//!
//! - **Verbosity control**: `--verbose` for debug, `--quiet` for errors only
//! - **Color support**: ANSI output unless `--no-color` or `NO_COLOR` is set
//! - **Environment filters**: `RUST_LOG` applies when neither flag is given
//! - **Structured fields**: request and asset details travel as event fields
//!
//! # Example
//!
//! ```rust,no_run
//! use fob_polyfill_cli::logger::init_logger;
//! use tracing::{debug, info};
//!
//! init_logger(false, false, false);
//!
//! info!(entries = 2, "building polyfills");
//! debug!(feature = "Promise", "loaded polyfill source");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "fob_polyfill=debug,fob_polyfill_cli=debug";
const QUIET_FILTER: &str = "fob_polyfill=error,fob_polyfill_cli=error";
const DEFAULT_FILTER: &str = "fob_polyfill=info,fob_polyfill_cli=info";

/// Pick the filter for the given flags.
///
/// The filter only covers the `fob_polyfill` and `fob_polyfill_cli`
/// targets, so dependencies stay silent unless `RUST_LOG` says otherwise.
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Initialize the tracing subscriber with the specified options.
///
/// Call once at the start of the program, before any logging occurs.
///
/// # Arguments
///
/// * `verbose` - Enable debug-level logging (takes precedence over `quiet`)
/// * `quiet` - Only show error-level logs
/// * `no_color` - Disable colored output
///
/// # Verbosity Levels
///
/// The level is determined in this order:
/// 1. `--verbose`: DEBUG for the polyfill crates
/// 2. `--quiet`: ERROR only
/// 3. `RUST_LOG`: custom filter
/// 4. Default: INFO for the polyfill crates
///
/// # Panics
///
/// Panics if a global subscriber has already been installed.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && std::env::var_os("NO_COLOR").is_none())
        .with_writer(std::io::stderr)
        .compact();

    tracing_subscriber::registry()
        .with(filter_for(verbose, quiet))
        .with(fmt_layer)
        .init();
}
