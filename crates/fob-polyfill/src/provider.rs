//! Polyfill source providers.
//!
//! A provider answers two questions about a feature identifier: what code
//! emulates it, and how to detect native support. The engine only ever
//! talks to the [`PolyfillProvider`] trait; platform bindings and embedders
//! decide where the data lives.

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PolyfillError, Result};

/// Metadata describing one feature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureMeta {
    /// Expression that evaluates truthy when the feature is supported natively
    #[serde(default)]
    pub detect_source: Option<String>,

    /// Identifiers this feature needs at runtime
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// A feature with everything a provider knows about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRecord {
    pub name: String,
    pub source: String,
    pub meta: FeatureMeta,
}

impl FeatureRecord {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            meta: FeatureMeta::default(),
        }
    }

    pub fn with_detector(mut self, detect_source: impl Into<String>) -> Self {
        self.meta.detect_source = Some(detect_source.into());
        self
    }

    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meta.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }
}

/// Source of polyfill code and detection metadata.
///
/// Implementations must be idempotent per identifier within a build; the
/// engine caches results and calls each method at most once per feature.
#[async_trait]
pub trait PolyfillProvider: Send + Sync + std::fmt::Debug {
    /// Load the polyfill code of `feature`.
    async fn load_source(&self, feature: &str) -> Result<String>;

    /// Load the metadata of `feature`.
    async fn load_meta(&self, feature: &str) -> Result<FeatureMeta>;
}

/// Provider backed by a polyfill-library `__dist` directory.
///
/// Each feature lives in its own directory holding `raw.js` (the code) and
/// `meta.json` (with `detectSource` and `dependencies`).
#[derive(Debug, Clone)]
pub struct LibraryProvider {
    root: PathBuf,
}

impl LibraryProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn feature_dir(&self, feature: &str) -> Result<PathBuf> {
        // Identifiers are dotted names; anything path-like would escape the root.
        if feature.is_empty()
            || feature.contains(['/', '\\'])
            || feature == "."
            || feature == ".."
        {
            return Err(PolyfillError::unknown_feature(feature));
        }
        Ok(self.root.join(feature))
    }

    async fn read(&self, feature: &str, file: &str) -> Result<String> {
        let path = self.feature_dir(feature)?.join(file);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(PolyfillError::unknown_feature(feature))
            }
            Err(e) => Err(PolyfillError::provider(
                feature,
                format!("failed to read {}: {}", path.display(), e),
            )),
        }
    }
}

#[async_trait]
impl PolyfillProvider for LibraryProvider {
    async fn load_source(&self, feature: &str) -> Result<String> {
        let source = self.read(feature, "raw.js").await?;
        Ok(source.trim_end().to_string())
    }

    async fn load_meta(&self, feature: &str) -> Result<FeatureMeta> {
        let raw = self.read(feature, "meta.json").await?;
        serde_json::from_str(&raw)
            .map_err(|e| PolyfillError::provider(feature, format!("invalid meta.json: {e}")))
    }
}

/// In-memory provider.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    features: FxHashMap<String, FeatureRecord>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a feature, replacing any previous record with the same name.
    pub fn with_feature(mut self, record: FeatureRecord) -> Self {
        self.insert(record);
        self
    }

    pub fn insert(&mut self, record: FeatureRecord) {
        self.features.insert(record.name.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    fn get(&self, feature: &str) -> Result<&FeatureRecord> {
        self.features
            .get(feature)
            .ok_or_else(|| PolyfillError::unknown_feature(feature))
    }
}

impl FromIterator<FeatureRecord> for MemoryProvider {
    fn from_iter<T: IntoIterator<Item = FeatureRecord>>(iter: T) -> Self {
        let mut provider = Self::new();
        for record in iter {
            provider.insert(record);
        }
        provider
    }
}

#[async_trait]
impl PolyfillProvider for MemoryProvider {
    async fn load_source(&self, feature: &str) -> Result<String> {
        Ok(self.get(feature)?.source.clone())
    }

    async fn load_meta(&self, feature: &str) -> Result<FeatureMeta> {
        Ok(self.get(feature)?.meta.clone())
    }
}
