//! Configuration registry.
//!
//! One registry lives for one build pass. Entry points register the request
//! their options normalize to; identical requests collapse into a single
//! entry whose filename is resolved exactly once, however many entry points
//! ask for it and however concurrently they do so.

use futures::future::try_join_all;
use indexmap::IndexMap;
use indexmap::map::Entry;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::assemble::canonical_content;
use crate::cache::FeatureCache;
use crate::error::Result;
use crate::filename::{ContentHashInterpolator, NameInterpolator, resource_path};
use crate::provider::PolyfillProvider;
use crate::request::PolyfillRequest;
use crate::resolve::FeatureSet;

/// Outcome of resolving one request.
#[derive(Debug, Clone)]
pub struct ResolvedRequest {
    /// Canonical filename, hash placeholders filled in
    pub filename: String,
    pub features: Arc<FeatureSet>,
}

#[derive(Debug)]
struct RequestEntry {
    index: usize,
    request: PolyfillRequest,
    resolved: OnceCell<Result<Arc<ResolvedRequest>>>,
}

/// Per-build request registry.
#[derive(Debug)]
pub struct PolyfillRegistry {
    public_path: String,
    cache: FeatureCache,
    interpolator: Arc<dyn NameInterpolator>,
    entries: Mutex<IndexMap<PolyfillRequest, Arc<RequestEntry>>>,
    has_loader: AtomicBool,
}

impl PolyfillRegistry {
    pub fn new(provider: Arc<dyn PolyfillProvider>, public_path: impl Into<String>) -> Self {
        Self::with_interpolator(provider, public_path, Arc::new(ContentHashInterpolator))
    }

    pub fn with_interpolator(
        provider: Arc<dyn PolyfillProvider>,
        public_path: impl Into<String>,
        interpolator: Arc<dyn NameInterpolator>,
    ) -> Self {
        Self {
            public_path: public_path.into(),
            cache: FeatureCache::new(provider),
            interpolator,
            entries: Mutex::new(IndexMap::new()),
            has_loader: AtomicBool::new(false),
        }
    }

    pub fn public_path(&self) -> &str {
        &self.public_path
    }

    pub fn cache(&self) -> &FeatureCache {
        &self.cache
    }

    /// Register `request`, reusing the entry of an identical earlier one.
    ///
    /// Indexes are assigned in first-registration order and never change.
    pub fn register(self: &Arc<Self>, request: PolyfillRequest) -> RequestHandle {
        let mut entries = self.entries.lock();
        let index = entries.len();
        let entry = match entries.entry(request) {
            Entry::Occupied(occupied) => occupied.get().clone(),
            Entry::Vacant(vacant) => {
                debug!(index, polyfills = ?vacant.key().polyfills, "registered polyfill request");
                let entry = Arc::new(RequestEntry {
                    index,
                    request: vacant.key().clone(),
                    resolved: OnceCell::new(),
                });
                vacant.insert(entry.clone());
                entry
            }
        };

        RequestHandle {
            registry: Arc::clone(self),
            entry,
        }
    }

    /// Handles of every distinct request, in registration order.
    pub fn handles(self: &Arc<Self>) -> Vec<RequestHandle> {
        self.entries
            .lock()
            .values()
            .map(|entry| RequestHandle {
                registry: Arc::clone(self),
                entry: entry.clone(),
            })
            .collect()
    }

    /// Resolve every request concurrently and hand each to `visitor`.
    ///
    /// The first failure (resolution or visitor) fails the whole call.
    pub async fn iterate<F, Fut, T>(self: &Arc<Self>, visitor: F) -> Result<Vec<T>>
    where
        F: Fn(RequestHandle, Arc<ResolvedRequest>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let visitor = &visitor;
        try_join_all(self.handles().into_iter().map(|handle| async move {
            let resolved = handle.resolve().await?;
            visitor(handle, resolved).await
        }))
        .await
    }

    /// Detection expressions of `polyfills`, in order.
    pub async fn detectors(&self, polyfills: &[String]) -> Result<Vec<String>> {
        try_join_all(polyfills.iter().map(|feature| self.cache.detector(feature))).await
    }

    /// Record that an entry point ran the loader half.
    pub fn mark_loader_used(&self) {
        self.has_loader.store(true, Ordering::SeqCst);
    }

    pub fn has_loader(&self) -> bool {
        self.has_loader.load(Ordering::SeqCst)
    }

    /// Number of distinct requests.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    async fn resolve_entry(&self, entry: &RequestEntry) -> Result<ResolvedRequest> {
        let features = FeatureSet::load(&self.cache, &entry.request).await?;
        let content = canonical_content(&entry.request, &features)?;
        let filename = self.interpolator.interpolate(
            &resource_path(entry.index),
            &entry.request.filename,
            content.as_bytes(),
        );
        debug!(index = entry.index, %filename, "resolved polyfill filename");

        Ok(ResolvedRequest {
            filename,
            features: Arc::new(features),
        })
    }
}

/// A registered request.
#[derive(Debug, Clone)]
pub struct RequestHandle {
    registry: Arc<PolyfillRegistry>,
    entry: Arc<RequestEntry>,
}

impl RequestHandle {
    /// Registration index of the request (0 for the first distinct one).
    pub fn index(&self) -> usize {
        self.entry.index
    }

    pub fn request(&self) -> &PolyfillRequest {
        &self.entry.request
    }

    /// Resolve the request's filename and features.
    ///
    /// Runs once per request; every caller, concurrent or later, observes
    /// the same result, errors included.
    pub async fn resolve(&self) -> Result<Arc<ResolvedRequest>> {
        self.entry
            .resolved
            .get_or_init(|| async {
                self.registry
                    .resolve_entry(&self.entry)
                    .await
                    .map(Arc::new)
            })
            .await
            .clone()
    }

    /// Whether both handles refer to the same registry entry.
    pub fn same_entry(&self, other: &RequestHandle) -> bool {
        Arc::ptr_eq(&self.entry, &other.entry)
    }
}
