//! Configuration for the polyfill CLI with multi-source loading.
//!
//! Merges settings from CLI args, environment variables, and config files.
//! Priority: CLI > Environment > File > Defaults

mod loading;
mod validation;

use fob_polyfill::{InjectorOptions, OutputOptions};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use loading::CONFIG_FILE;

/// Polyfill CLI configuration, loaded from fob-polyfill.json or CLI args.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PolyfillConfig {
    /// Polyfill library `__dist` directory
    pub library: PathBuf,

    /// Output directory
    pub out_dir: PathBuf,

    /// URL prefix the loaders fetch bundles from
    #[serde(default)]
    pub public_path: String,

    /// Output filename template for entries and bundles
    pub filename: String,

    /// Digest length for hash placeholders without one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_length: Option<usize>,

    /// Plugin-level defaults shared by every entry
    #[serde(default)]
    pub defaults: InjectorOptions,

    /// Entry points, keyed by name
    #[serde(default)]
    pub entries: IndexMap<String, InjectorOptions>,
}

impl PolyfillConfig {
    /// Output settings handed to the compiler.
    pub fn output_options(&self) -> OutputOptions {
        OutputOptions {
            filename: self.filename.clone(),
            public_path: self.public_path.clone(),
            hash_length: self.hash_length,
        }
    }
}

impl Default for PolyfillConfig {
    fn default() -> Self {
        Self {
            library: PathBuf::from("node_modules/polyfill-library/polyfills/__dist"),
            out_dir: PathBuf::from("dist"),
            public_path: String::new(),
            filename: "[name].js".to_string(),
            hash_length: None,
            defaults: InjectorOptions::default(),
            entries: IndexMap::new(),
        }
    }
}
