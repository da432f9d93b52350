//! Shared test utilities for fob-polyfill tests

#![allow(dead_code)]

use async_trait::async_trait;
use fob_polyfill::{
    Compiler, EntryPoint, FeatureMeta, FeatureRecord, InjectorOptions, MemoryProvider,
    OutputOptions, PolyfillInjectorPlugin, PolyfillProvider, Result,
};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Small polyfill library with detectors and one internal dependency.
pub fn library() -> MemoryProvider {
    [
        FeatureRecord::new("Promise", "self.Promise = function Promise() {};")
            .with_detector("'Promise' in self"),
        FeatureRecord::new("fetch", "self.fetch = function fetch() {};")
            .with_detector("'fetch' in self")
            .with_dependencies(["Promise", "_mutation"]),
        FeatureRecord::new("_mutation", "var _mutation = function () {};"),
        FeatureRecord::new(
            "Array.prototype.find",
            "Array.prototype.find = function find() {\n\n    return undefined;\n};",
        )
        .with_detector("'find' in Array.prototype"),
        FeatureRecord::new("Map", "self.Map = function Map() {};").with_detector("'Map' in self"),
    ]
    .into_iter()
    .collect()
}

/// Provider wrapper counting every call that reaches the library.
#[derive(Debug)]
pub struct CountingProvider {
    inner: MemoryProvider,
    pub sources: AtomicUsize,
    pub metas: AtomicUsize,
}

impl CountingProvider {
    pub fn new(inner: MemoryProvider) -> Arc<Self> {
        Arc::new(Self {
            inner,
            sources: AtomicUsize::new(0),
            metas: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.sources.load(Ordering::SeqCst) + self.metas.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PolyfillProvider for CountingProvider {
    async fn load_source(&self, feature: &str) -> Result<String> {
        self.sources.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.inner.load_source(feature).await
    }

    async fn load_meta(&self, feature: &str) -> Result<FeatureMeta> {
        self.metas.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.inner.load_meta(feature).await
    }
}

/// Compiler with the injector plugin installed.
pub fn compiler(
    plugin_options: InjectorOptions,
    output: OutputOptions,
    provider: Arc<dyn PolyfillProvider>,
) -> Compiler {
    Compiler::new(output).with_plugin(PolyfillInjectorPlugin::new(plugin_options, provider))
}

/// Entry routed through the loader with a single application module.
pub fn entry(name: &str, polyfills: &[&str]) -> EntryPoint {
    EntryPoint::with_loader(
        name,
        InjectorOptions::new()
            .with_modules([format!("./{name}.js").as_str()])
            .with_polyfills(polyfills.iter().map(|p| p.to_string()).collect::<Vec<_>>()),
    )
}

/// Assert that `source` parses as JavaScript.
pub fn assert_valid_js(source: &str) {
    let allocator = oxc_allocator::Allocator::default();
    let source_type = oxc_span::SourceType::default();
    let ret = oxc_parser::Parser::new(&allocator, source, source_type).parse();
    assert!(
        ret.errors.is_empty(),
        "Expected valid JavaScript, got {:?}\n{}",
        ret.errors,
        source
    );
}

/// Write a polyfill-library `__dist` feature directory.
pub fn write_feature(root: &Path, name: &str, source: &str, meta: &str) {
    let dir = root.join(name);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("raw.js"), source).unwrap();
    std::fs::write(dir.join("meta.json"), meta).unwrap();
}
