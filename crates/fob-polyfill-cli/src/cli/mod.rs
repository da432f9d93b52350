//! Command-line interface definition for the polyfill injector.
//!
//! Argument parsing uses clap's derive API. Global flags (`--verbose`,
//! `--quiet`, `--no-color`) may appear before or after the subcommand.
//!
//! # Commands
//!
//! - `fob-polyfill build` - Emit polyfill bundles and entry loaders
//!
//! # Example
//!
//! ```bash
//! # One guarded bundle for two features
//! fob-polyfill build --polyfills Promise,fetch --modules ./src/index.js --single-file
//!
//! # Every subset, hashed names, served from a CDN
//! fob-polyfill build -p Promise,fetch,Map -m ./src/index.js \
//!     --filename "js/[name].[hash:8].js" --public-path https://cdn.example.com/
//! ```
//!
//! Flags override `fob-polyfill.json` and `FOB_POLYFILL_*` variables; see
//! [`crate::config`] for the full layering.

mod commands;

use clap::Parser;

pub use commands::{BuildArgs, Command};

/// Fob polyfill injector
///
/// Top-level parser; the subcommand carries the build options.
#[derive(Parser, Debug)]
#[command(
    name = "fob-polyfill",
    version,
    about = "Emit polyfill bundles and runtime loaders",
    long_about = "Builds feature-detecting loader scripts for your entry points and the\n\
                  polyfill bundles they fetch, either as one guarded bundle or as one\n\
                  bundle per combination of missing features."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
