//! Polyfill injection for fob builds
//!
//! Entry points declare which features they need (`polyfills`) and which
//! application modules to run afterwards (`modules`). The injector replaces
//! each such entry with a small runtime selector and emits the polyfill
//! bundles the selector may fetch.
//!
//! ## Strategies
//!
//! - **Single file**: one bundle holding every requested feature. With more
//!   than one feature each is wrapped in its own detection guard.
//! - **Exhaustive subsets**: one unguarded bundle per non-empty subset of the
//!   features (2^N - 1 files). The selector computes a bitmask of missing
//!   features and fetches exactly the matching file.
//!
//! Identical configurations requested by several entry points are resolved
//! once per build, and every feature is loaded from the provider at most
//! once.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use fob_polyfill::{
//!     Compiler, EntryPoint, InjectorOptions, LibraryProvider, OutputOptions,
//!     PolyfillInjectorPlugin,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> fob_polyfill::Result<()> {
//! let provider = Arc::new(LibraryProvider::new("node_modules/polyfill-library/polyfills/__dist"));
//! let plugin = PolyfillInjectorPlugin::new(
//!     InjectorOptions::new().with_polyfills(["Promise", "fetch"]),
//!     provider,
//! );
//!
//! let mut compiler = Compiler::new(OutputOptions::default()).with_plugin(plugin);
//! let compilation = compiler
//!     .run(&[EntryPoint::with_loader(
//!         "app",
//!         InjectorOptions::new().with_modules(["./src/index.js"]),
//!     )])
//!     .await?;
//!
//! for (filename, _content) in &compilation.assets {
//!     println!("{filename}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod assemble;
pub mod cache;
pub mod compiler;
pub mod error;
pub mod filename;
pub mod options;
pub mod provider;
pub mod registry;
pub mod request;
pub mod resolve;
pub mod selector;
pub mod template;

pub use assemble::{BundleFile, Segment, assemble, canonical_content};
pub use cache::FeatureCache;
pub use compiler::{
    Chunk, Compilation, Compiler, EntryPoint, OutputOptions, PolyfillInjectorPlugin,
};
pub use error::{PolyfillError, Result};
pub use filename::{ContentHashInterpolator, FilenameTemplate, NameInterpolator};
pub use options::{
    DEFAULT_BANNER, InjectorOptions, MAX_SUBSET_FEATURES, NormalizedOptions, OptionDefaults,
    StringOrList, normalize,
};
pub use provider::{FeatureMeta, FeatureRecord, LibraryProvider, MemoryProvider, PolyfillProvider};
pub use registry::{PolyfillRegistry, RequestHandle, ResolvedRequest};
pub use request::{PolyfillRequest, is_internal};
pub use resolve::{DependencyGraph, FeatureSet, ResolvedFeature};
pub use selector::{LoaderScript, SelectorPlan};
pub use template::{InjectorTemplate, TemplateVars};
