use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build polyfill bundles and entry loaders
    ///
    /// Reads feature sources from a polyfill-library `__dist` directory and
    /// writes one loader per entry point plus every bundle those loaders
    /// may fetch.
    Build(BuildArgs),
}

/// Arguments for the build command
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Features to polyfill, in bitmask order
    ///
    /// Examples:
    ///   fob-polyfill build --polyfills Promise,fetch --modules ./src/index.js
    #[arg(short, long, value_delimiter = ',', value_name = "FEATURE")]
    pub polyfills: Vec<String>,

    /// Application modules the loader requires once polyfills are settled
    #[arg(short, long, value_delimiter = ',', value_name = "MODULE")]
    pub modules: Vec<String>,

    /// Name of the entry point defined by `--modules`
    #[arg(long, default_value = "main")]
    pub entry_name: String,

    /// Identifiers never emitted, even as dependencies
    #[arg(long, value_delimiter = ',', value_name = "FEATURE")]
    pub excludes: Vec<String>,

    /// Emit one guarded bundle instead of one bundle per subset
    #[arg(long)]
    pub single_file: bool,

    /// Text prepended to every bundle
    #[arg(long)]
    pub banner: Option<String>,

    /// Output filename template (supports [name], [hash], [chunkhash:N])
    #[arg(long)]
    pub filename: Option<String>,

    /// Digest length for hash placeholders without an explicit one
    #[arg(long)]
    pub hash_length: Option<usize>,

    /// Polyfill library `__dist` directory
    #[arg(short, long)]
    pub library: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// URL prefix the loaders fetch bundles from
    #[arg(long)]
    pub public_path: Option<String>,

    /// Path to a fob-polyfill.json configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
