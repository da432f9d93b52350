//! Dependency resolution for one request.
//!
//! Metadata is fetched level by level starting from the requested features.
//! Each level is loaded concurrently and identifiers are deduplicated, so a
//! diamond is fetched once. Only internal (`_`-prefixed) dependencies are
//! followed: requestable features are the caller's to request.

use futures::future::try_join_all;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;
use tracing::debug;

use crate::cache::FeatureCache;
use crate::error::{PolyfillError, Result};
use crate::request::{PolyfillRequest, is_internal};

/// Internal dependency edges reachable from a set of features.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    edges: FxHashMap<String, Vec<String>>,
}

impl DependencyGraph {
    /// Walk metadata breadth-wise from `roots`, skipping `excludes`.
    pub async fn collect(
        cache: &FeatureCache,
        roots: &[String],
        excludes: &[String],
    ) -> Result<Self> {
        let mut edges = FxHashMap::default();
        let mut visited = FxHashSet::default();
        let mut frontier: Vec<String> = roots
            .iter()
            .filter(|root| visited.insert(root.to_string()))
            .cloned()
            .collect();

        while !frontier.is_empty() {
            let metas = try_join_all(frontier.iter().map(|feature| cache.meta(feature))).await?;
            let mut next = Vec::new();

            for (feature, meta) in frontier.into_iter().zip(metas) {
                let deps: Vec<String> = meta
                    .dependencies
                    .iter()
                    .filter(|dep| is_internal(dep) && !excludes.contains(dep))
                    .cloned()
                    .collect();
                for dep in &deps {
                    if visited.insert(dep.clone()) {
                        next.push(dep.clone());
                    }
                }
                edges.insert(feature, deps);
            }

            frontier = next;
        }

        Ok(Self { edges })
    }

    /// Internal identifiers present in the graph.
    pub fn internal_nodes(&self) -> impl Iterator<Item = &str> {
        self.edges
            .keys()
            .map(String::as_str)
            .filter(|node| is_internal(node))
    }

    /// Internal dependencies of `features`, each once, dependencies first.
    ///
    /// Fails with [`PolyfillError::DependencyCycle`] when an identifier shows
    /// up again in its own ancestor chain.
    pub fn ordered_dependencies<'a, I>(&self, features: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut done = FxHashSet::default();
        let mut order = Vec::new();
        for feature in features {
            let mut ancestors = Vec::new();
            self.visit(feature, &mut ancestors, &mut done, &mut order)?;
        }
        Ok(order)
    }

    fn visit(
        &self,
        node: &str,
        ancestors: &mut Vec<String>,
        done: &mut FxHashSet<String>,
        order: &mut Vec<String>,
    ) -> Result<()> {
        if done.contains(node) {
            return Ok(());
        }
        if let Some(start) = ancestors.iter().position(|ancestor| ancestor == node) {
            let mut chain = ancestors[start..].to_vec();
            chain.push(node.to_string());
            return Err(PolyfillError::DependencyCycle { chain });
        }

        ancestors.push(node.to_string());
        for dep in self.edges.get(node).into_iter().flatten() {
            self.visit(dep, ancestors, done, order)?;
        }
        ancestors.pop();

        done.insert(node.to_string());
        if is_internal(node) {
            order.push(node.to_string());
        }
        Ok(())
    }
}

/// A requested feature with its loaded code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFeature {
    pub name: String,
    pub source: Arc<String>,
    /// Present whenever the request's bundles guard features individually
    pub detector: Option<String>,
}

/// Everything needed to assemble the bundles of one request.
#[derive(Debug, Clone)]
pub struct FeatureSet {
    features: Vec<ResolvedFeature>,
    dependencies: FxHashMap<String, Arc<String>>,
    graph: DependencyGraph,
}

impl FeatureSet {
    /// Load sources, dependency sources and (when needed) detectors.
    pub async fn load(cache: &FeatureCache, request: &PolyfillRequest) -> Result<Self> {
        let graph = DependencyGraph::collect(cache, &request.polyfills, &request.excludes).await?;
        // Surface cycles before any source is fetched.
        let deps = graph.ordered_dependencies(request.polyfills.iter().map(String::as_str))?;
        debug!(
            polyfills = ?request.polyfills,
            dependencies = ?deps,
            "resolved polyfill dependencies"
        );

        let sources =
            try_join_all(request.polyfills.iter().map(|feature| cache.source(feature))).await?;
        let dep_sources = try_join_all(deps.iter().map(|dep| cache.source(dep))).await?;
        let detectors = if request.needs_guards() {
            try_join_all(request.polyfills.iter().map(|feature| cache.detector(feature)))
                .await?
                .into_iter()
                .map(Some)
                .collect()
        } else {
            vec![None; request.polyfills.len()]
        };

        let features = request
            .polyfills
            .iter()
            .zip(sources)
            .zip(detectors)
            .map(|((name, source), detector)| ResolvedFeature {
                name: name.clone(),
                source,
                detector,
            })
            .collect();

        Ok(Self {
            features,
            dependencies: deps.into_iter().zip(dep_sources).collect(),
            graph,
        })
    }

    /// Requested features in request order.
    pub fn features(&self) -> &[ResolvedFeature] {
        &self.features
    }

    /// Ordered `(name, source)` pairs of the internal dependencies needed by
    /// the features at `selected` indices.
    pub fn dependencies_for(&self, selected: &[usize]) -> Result<Vec<(&str, &str)>> {
        let names = selected
            .iter()
            .filter_map(|&i| self.features.get(i))
            .map(|feature| feature.name.as_str());

        self.graph
            .ordered_dependencies(names)?
            .into_iter()
            .map(|dep| {
                self.dependencies
                    .get_key_value(&dep)
                    .map(|(name, source)| (name.as_str(), source.as_str()))
                    .ok_or_else(|| PolyfillError::provider(dep, "dependency source was not loaded"))
            })
            .collect()
    }

    /// Number of internal dependencies loaded for the whole request.
    pub fn dependency_count(&self) -> usize {
        self.dependencies.len()
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }
}
