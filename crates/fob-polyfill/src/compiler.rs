//! In-memory host integration.
//!
//! A minimal compiler that drives the injector the way a bundler would: the
//! plugin half installs a registry on every compilation, the loader half
//! turns each configured entry point into its runtime selector, and once all
//! entries are processed the plugin emits the polyfill bundles and attaches
//! them to every chunk whose entry asked for them.
//!
//! After [`Compiler::invalidate`], later runs are incremental: entry points
//! whose loader output was produced before reuse it verbatim and no polyfill
//! assets are emitted again.

use futures::future::try_join_all;
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::assemble::assemble;
use crate::error::{PolyfillError, Result};
use crate::filename::{ContentHashInterpolator, FilenameTemplate, NameInterpolator};
use crate::options::{InjectorOptions, OptionDefaults, normalize};
use crate::provider::PolyfillProvider;
use crate::registry::PolyfillRegistry;
use crate::request::PolyfillRequest;
use crate::selector::LoaderScript;

/// Output settings of the host build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputOptions {
    /// Chunk filename template; also the default polyfill filename
    pub filename: String,
    /// Prefix of every URL the runtime fetches
    pub public_path: String,
    /// Digest length for hash placeholders without one
    pub hash_length: Option<usize>,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            filename: "[name].js".to_string(),
            public_path: String::new(),
            hash_length: None,
        }
    }
}

/// One entry point of the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    pub name: String,
    /// Module source used when the entry is not routed through the loader
    pub source: String,
    /// Loader options; `Some` routes the entry through the injector
    pub loader: Option<InjectorOptions>,
}

impl EntryPoint {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            loader: None,
        }
    }

    /// Entry whose module is replaced by the polyfill injector.
    pub fn with_loader(name: impl Into<String>, options: InjectorOptions) -> Self {
        Self {
            name: name.into(),
            source: String::new(),
            loader: Some(options),
        }
    }
}

/// Output chunk of one entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub name: String,
    /// Entry asset first, then every polyfill bundle it may load
    pub files: Vec<String>,
    /// Request the entry's loader registered, if any
    pub request: Option<PolyfillRequest>,
}

/// Result of one build pass.
#[derive(Debug, Default)]
pub struct Compilation {
    pub assets: IndexMap<String, String>,
    pub chunks: Vec<Chunk>,
    pub registry: Option<Arc<PolyfillRegistry>>,
}

impl Compilation {
    pub fn asset(&self, filename: &str) -> Option<&str> {
        self.assets.get(filename).map(String::as_str)
    }

    pub fn chunk(&self, name: &str) -> Option<&Chunk> {
        self.chunks.iter().find(|chunk| chunk.name == name)
    }
}

/// Plugin half of the injector.
#[derive(Debug, Clone)]
pub struct PolyfillInjectorPlugin {
    options: InjectorOptions,
    provider: Arc<dyn PolyfillProvider>,
}

impl PolyfillInjectorPlugin {
    /// `options` are defaults shared by every loader.
    pub fn new(options: InjectorOptions, provider: Arc<dyn PolyfillProvider>) -> Self {
        Self { options, provider }
    }

    pub fn options(&self) -> &InjectorOptions {
        &self.options
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LoaderKey {
    entry: String,
    options: InjectorOptions,
}

#[derive(Debug, Clone)]
struct LoaderOutput {
    source: String,
    request: PolyfillRequest,
}

/// Minimal compiler hosting the injector.
#[derive(Debug)]
pub struct Compiler {
    output: OutputOptions,
    plugin: Option<PolyfillInjectorPlugin>,
    interpolator: Arc<dyn NameInterpolator>,
    watch_run: bool,
    loader_cache: FxHashMap<LoaderKey, LoaderOutput>,
}

impl Compiler {
    pub fn new(output: OutputOptions) -> Self {
        Self {
            output,
            plugin: None,
            interpolator: Arc::new(ContentHashInterpolator),
            watch_run: false,
            loader_cache: FxHashMap::default(),
        }
    }

    pub fn with_plugin(mut self, plugin: PolyfillInjectorPlugin) -> Self {
        self.plugin = Some(plugin);
        self
    }

    /// Replace the content-hashing facility.
    pub fn with_interpolator(mut self, interpolator: Arc<dyn NameInterpolator>) -> Self {
        self.interpolator = interpolator;
        self
    }

    /// Mark later runs as incremental re-runs.
    pub fn invalidate(&mut self) {
        debug!("compiler invalidated, later runs are incremental");
        self.watch_run = true;
    }

    pub fn is_watch_run(&self) -> bool {
        self.watch_run
    }

    /// Run one build pass over `entries`.
    pub async fn run(&mut self, entries: &[EntryPoint]) -> Result<Compilation> {
        let mut compilation = self.this_compilation();

        let outputs = {
            let this = &*self;
            let registry = compilation.registry.as_ref();
            try_join_all(
                entries
                    .iter()
                    .map(|entry| async move { this.build_entry(registry, entry).await }),
            )
            .await?
        };

        let entry_template =
            FilenameTemplate::normalize(&self.output.filename, self.output.hash_length);
        let mut seen = FxHashSet::default();
        for (entry, output) in entries.iter().zip(outputs) {
            let (source, request) = match output {
                Some((key, output)) => {
                    let result = (output.source.clone(), Some(output.request.clone()));
                    seen.insert(key.clone());
                    self.loader_cache.insert(key, output);
                    result
                }
                None => (entry.source.clone(), None),
            };

            let filename = self.interpolator.interpolate(
                &format!("./{}.js", entry.name),
                entry_template.as_str(),
                source.as_bytes(),
            );
            compilation.assets.insert(filename.clone(), source);
            compilation.chunks.push(Chunk {
                name: entry.name.clone(),
                files: vec![filename],
                request,
            });
        }

        // Entries removed since the last pass
        self.loader_cache.retain(|key, _| seen.contains(key));

        self.additional_assets(&mut compilation).await?;
        Ok(compilation)
    }

    /// Start a compilation; the plugin half installs a fresh registry.
    fn this_compilation(&self) -> Compilation {
        let registry = self.plugin.as_ref().map(|plugin| {
            Arc::new(PolyfillRegistry::with_interpolator(
                plugin.provider.clone(),
                self.output.public_path.clone(),
                self.interpolator.clone(),
            ))
        });
        Compilation {
            registry,
            ..Compilation::default()
        }
    }

    async fn build_entry(
        &self,
        registry: Option<&Arc<PolyfillRegistry>>,
        entry: &EntryPoint,
    ) -> Result<Option<(LoaderKey, LoaderOutput)>> {
        let Some(options) = &entry.loader else {
            return Ok(None);
        };
        let key = LoaderKey {
            entry: entry.name.clone(),
            options: options.clone(),
        };

        if self.watch_run {
            if let Some(cached) = self.loader_cache.get(&key) {
                debug!(entry = %entry.name, "reusing cached injector output");
                return Ok(Some((key, cached.clone())));
            }
            warn!(
                entry = %entry.name,
                "new polyfill configuration in an incremental run, bundles are not re-emitted"
            );
        }

        let output = self.load_injector(registry, options).await?;
        Ok(Some((key, output)))
    }

    /// Loader half: turn an entry's options into its runtime selector.
    async fn load_injector(
        &self,
        registry: Option<&Arc<PolyfillRegistry>>,
        options: &InjectorOptions,
    ) -> Result<LoaderOutput> {
        let (Some(registry), Some(plugin)) = (registry, self.plugin.as_ref()) else {
            return Err(PolyfillError::LoaderWithoutPlugin);
        };
        registry.mark_loader_used();

        let defaults = OptionDefaults {
            filename: self.output.filename.clone(),
            hash_length: self.output.hash_length,
        };
        let normalized = normalize(&plugin.options, options, &defaults)?;

        let handle = registry.register(normalized.request.clone());
        let (resolved, detectors) = futures::try_join!(
            handle.resolve(),
            registry.detectors(&normalized.request.polyfills)
        )?;

        let script = LoaderScript::generate(
            &normalized.request,
            &normalized.modules,
            &detectors,
            registry.public_path(),
            &resolved.filename,
        )?;

        Ok(LoaderOutput {
            source: script.source,
            request: normalized.request,
        })
    }

    /// Emit every request's bundles once all entries have been processed.
    async fn additional_assets(&self, compilation: &mut Compilation) -> Result<()> {
        let Some(registry) = compilation.registry.clone() else {
            return Ok(());
        };
        if self.watch_run {
            debug!("incremental run, skipping polyfill assets");
            return Ok(());
        }
        if !registry.has_loader() {
            return Err(PolyfillError::PluginWithoutLoader);
        }

        let bundles = registry
            .iterate(|handle, resolved| async move {
                let files = assemble(handle.request(), &resolved.features, &resolved.filename)?;
                Ok::<_, PolyfillError>((handle.request().clone(), files))
            })
            .await?;

        for (request, files) in bundles {
            info!(
                polyfills = ?request.polyfills,
                files = files.len(),
                "emitting polyfill bundles"
            );
            for file in files {
                if compilation.assets.contains_key(&file.filename) {
                    return Err(PolyfillError::AssetConflict {
                        filename: file.filename,
                    });
                }
                for chunk in compilation
                    .chunks
                    .iter_mut()
                    .filter(|chunk| chunk.request.as_ref() == Some(&request))
                {
                    chunk.files.push(file.filename.clone());
                }
                compilation.assets.insert(file.filename.clone(), file.content());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{FeatureRecord, MemoryProvider};

    fn provider() -> Arc<MemoryProvider> {
        Arc::new(
            [FeatureRecord::new("Promise", "promise();").with_detector("'Promise' in self")]
                .into_iter()
                .collect(),
        )
    }

    fn loader_entry() -> EntryPoint {
        EntryPoint::with_loader(
            "app",
            InjectorOptions::new()
                .with_modules(["./entry.js"])
                .with_polyfills(["Promise"]),
        )
    }

    #[tokio::test]
    async fn test_loader_without_plugin() {
        let mut compiler = Compiler::new(OutputOptions::default());
        let err = compiler.run(&[loader_entry()]).await.unwrap_err();
        assert_eq!(err, PolyfillError::LoaderWithoutPlugin);
    }

    #[tokio::test]
    async fn test_plugin_without_loader() {
        let plugin = PolyfillInjectorPlugin::new(InjectorOptions::new(), provider());
        let mut compiler = Compiler::new(OutputOptions::default()).with_plugin(plugin);
        let err = compiler
            .run(&[EntryPoint::new("app", "console.log(1);")])
            .await
            .unwrap_err();
        assert_eq!(err, PolyfillError::PluginWithoutLoader);
    }

    #[tokio::test]
    async fn test_plain_entries_pass_through() {
        let mut compiler = Compiler::new(OutputOptions::default());
        let compilation = compiler
            .run(&[EntryPoint::new("app", "console.log(1);")])
            .await
            .unwrap();
        assert_eq!(compilation.asset("app.js"), Some("console.log(1);"));
        assert!(compilation.registry.is_none());
    }

    #[tokio::test]
    async fn test_watch_runs_drop_removed_entries() {
        let plugin = PolyfillInjectorPlugin::new(InjectorOptions::new(), provider());
        let mut compiler = Compiler::new(OutputOptions::default()).with_plugin(plugin);
        let admin = EntryPoint::with_loader(
            "admin",
            InjectorOptions::new()
                .with_modules(["./admin.js"])
                .with_polyfills(["Promise"]),
        );

        compiler.run(&[loader_entry(), admin]).await.unwrap();
        assert_eq!(compiler.loader_cache.len(), 2);

        compiler.invalidate();
        let compilation = compiler.run(&[loader_entry()]).await.unwrap();
        assert_eq!(compiler.loader_cache.len(), 1);
        assert!(
            compiler
                .loader_cache
                .keys()
                .all(|key| key.entry == "app")
        );
        assert!(compilation.asset("app.js").is_some());
        assert!(compilation.asset("admin.js").is_none());
    }

    #[tokio::test]
    async fn test_single_polyfill_build() {
        let plugin = PolyfillInjectorPlugin::new(InjectorOptions::new(), provider());
        let mut compiler = Compiler::new(OutputOptions::default()).with_plugin(plugin);
        let compilation = compiler.run(&[loader_entry()]).await.unwrap();

        let names: Vec<&str> = compilation.assets.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["app.js", "polyfills.js"]);
        assert_eq!(
            compilation.chunk("app").unwrap().files,
            vec!["app.js", "polyfills.js"]
        );
        assert!(
            compilation
                .asset("polyfills.js")
                .unwrap()
                .ends_with("\npromise();\n")
        );
    }
}
