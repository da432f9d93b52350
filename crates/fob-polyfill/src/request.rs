//! The canonical identity of one polyfill configuration.

use serde::{Deserialize, Serialize};

/// Prefix marking internal, non-requestable dependency identifiers.
pub const INTERNAL_PREFIX: char = '_';

/// Whether `feature` names an internal implementation dependency.
pub fn is_internal(feature: &str) -> bool {
    feature.starts_with(INTERNAL_PREFIX)
}

/// One distinct polyfill configuration.
///
/// Equality and hashing are structural over every field. Two entry points
/// asking for the same fields collapse into one registry entry no matter who
/// asked first. The order of `polyfills` is significant: it fixes the bit
/// positions of the subset bitmask and the emission order inside bundles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolyfillRequest {
    /// Requested feature identifiers, in request order
    pub polyfills: Vec<String>,

    /// Identifiers never emitted, even when pulled in as dependencies
    #[serde(default)]
    pub excludes: Vec<String>,

    /// One guarded bundle instead of one bundle per subset
    pub single_file: bool,

    /// Text prepended to every emitted bundle
    pub banner: String,

    /// Output filename template, already normalized to `[hash]` placeholders
    pub filename: String,
}

impl PolyfillRequest {
    /// Number of requested features.
    pub fn len(&self) -> usize {
        self.polyfills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polyfills.is_empty()
    }

    /// Whether the single bundle needs per-feature detection guards.
    pub fn needs_guards(&self) -> bool {
        self.single_file && self.polyfills.len() > 1
    }

    /// Whether `feature` was listed in `excludes`.
    pub fn is_excluded(&self, feature: &str) -> bool {
        self.excludes.iter().any(|excluded| excluded == feature)
    }
}
