//! Per-build feature cache.
//!
//! Sources and metadata are loaded at most once per identifier for the
//! lifetime of one build pass. Concurrent callers asking for the same
//! identifier await the same cell; failures are cached like successes so
//! that every requester observes the same outcome.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::{PolyfillError, Result};
use crate::provider::{FeatureMeta, PolyfillProvider};

type Slot<V> = Arc<OnceCell<Result<Arc<V>>>>;

/// Single-flight map: the first caller for a key computes, later callers wait.
struct OnceMap<V> {
    slots: Mutex<FxHashMap<String, Slot<V>>>,
}

impl<V> OnceMap<V> {
    fn new() -> Self {
        Self {
            slots: Mutex::new(FxHashMap::default()),
        }
    }

    fn slot(&self, key: &str) -> Slot<V> {
        self.slots.lock().entry(key.to_string()).or_default().clone()
    }

    async fn get_or_load<F, Fut>(&self, key: &str, load: F) -> Result<Arc<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        let slot = self.slot(key);
        slot.get_or_init(|| async move { load().await.map(Arc::new) })
            .await
            .clone()
    }

    fn len(&self) -> usize {
        self.slots.lock().len()
    }
}

/// Read-mostly cache in front of a [`PolyfillProvider`].
pub struct FeatureCache {
    provider: Arc<dyn PolyfillProvider>,
    sources: OnceMap<String>,
    metas: OnceMap<FeatureMeta>,
}

impl FeatureCache {
    pub fn new(provider: Arc<dyn PolyfillProvider>) -> Self {
        Self {
            provider,
            sources: OnceMap::new(),
            metas: OnceMap::new(),
        }
    }

    /// Polyfill code of `feature`.
    pub async fn source(&self, feature: &str) -> Result<Arc<String>> {
        self.sources
            .get_or_load(feature, || async {
                debug!(feature, "loading polyfill source");
                self.provider.load_source(feature).await
            })
            .await
    }

    /// Metadata of `feature`.
    pub async fn meta(&self, feature: &str) -> Result<Arc<FeatureMeta>> {
        self.metas
            .get_or_load(feature, || async {
                debug!(feature, "loading polyfill metadata");
                self.provider.load_meta(feature).await
            })
            .await
    }

    /// Detection expression of `feature`.
    pub async fn detector(&self, feature: &str) -> Result<String> {
        let meta = self.meta(feature).await?;
        match meta.detect_source.as_deref().map(str::trim) {
            Some(detector) if !detector.is_empty() => Ok(detector.to_string()),
            _ => Err(PolyfillError::missing_detector(feature)),
        }
    }

    /// Number of distinct identifiers whose source was requested.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Number of distinct identifiers whose metadata was requested.
    pub fn meta_count(&self) -> usize {
        self.metas.len()
    }
}

impl std::fmt::Debug for FeatureCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureCache")
            .field("provider", &self.provider)
            .field("sources", &self.source_count())
            .field("metas", &self.meta_count())
            .finish()
    }
}
