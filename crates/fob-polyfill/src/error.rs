//! Error types for polyfill resolution and injection.
//!
//! Every variant is cheap to clone: a single failing request is observed by
//! every entry point that shares it, so the same error value is handed to
//! each of them.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for polyfill operations.
pub type Result<T> = std::result::Result<T, PolyfillError>;

fn format_cycle(chain: &[String]) -> String {
    chain.join(" -> ")
}

/// Errors that can occur while resolving, assembling or injecting polyfills.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum PolyfillError {
    /// The `modules` option is missing or empty
    #[error("[fob-polyfill] You need to specify the `modules` option!")]
    #[diagnostic(
        code(fob::polyfill::missing_modules),
        help("Pass a non-empty list of application modules, e.g. {{\"modules\": [\"./src/index.js\"]}}")
    )]
    MissingModules,

    /// The `polyfills` option is missing or empty
    #[error("[fob-polyfill] You need to specify the `polyfills` option!")]
    #[diagnostic(
        code(fob::polyfill::missing_polyfills),
        help("Pass a non-empty list of features, e.g. {{\"polyfills\": [\"Promise\"]}}")
    )]
    MissingPolyfills,

    /// Loader options could not be parsed
    #[error("[fob-polyfill] Invalid options: {message}")]
    #[diagnostic(code(fob::polyfill::invalid_options))]
    InvalidOptions { message: String },

    /// A requested feature is an internal implementation dependency
    #[error("[fob-polyfill] The polyfill {feature} is internal and cannot be requested directly")]
    #[diagnostic(
        code(fob::polyfill::internal_feature),
        help("Identifiers starting with `_` are pulled in automatically by the features that need them")
    )]
    InternalFeatureRequested { feature: String },

    /// A feature is both requested and excluded
    #[error("[fob-polyfill] The polyfill {feature} is both requested and excluded")]
    #[diagnostic(code(fob::polyfill::excluded_feature))]
    ExcludedFeatureRequested { feature: String },

    /// Too many features for exhaustive-subset mode
    #[error("[fob-polyfill] {count} polyfills requested without `singleFile` (at most {max} supported)")]
    #[diagnostic(
        code(fob::polyfill::too_many_features),
        help("Every subset becomes its own file. Enable `singleFile` or split the request")
    )]
    TooManyFeatures { count: usize, max: usize },

    /// The provider does not know the feature
    #[error("[fob-polyfill] The polyfill {feature} does not exist!")]
    #[diagnostic(code(fob::polyfill::unknown_feature))]
    UnknownFeature { feature: String },

    /// The feature exists but carries no detection expression
    #[error("[fob-polyfill] The polyfill {feature} does not have a detector!")]
    #[diagnostic(
        code(fob::polyfill::missing_detector),
        help("Add a `detectSource` entry to the polyfill's metadata")
    )]
    MissingDetector { feature: String },

    /// Internal dependency metadata forms a cycle
    #[error("[fob-polyfill] Circular polyfill dependency: {}", format_cycle(.chain))]
    #[diagnostic(code(fob::polyfill::dependency_cycle))]
    DependencyCycle { chain: Vec<String> },

    /// The provider failed to load a feature
    #[error("[fob-polyfill] Failed to load polyfill {feature}: {message}")]
    #[diagnostic(code(fob::polyfill::provider_failed))]
    Provider { feature: String, message: String },

    /// The loader half ran without the plugin half installed
    #[error("[fob-polyfill] The loader must be used together with the plugin!")]
    #[diagnostic(
        code(fob::polyfill::loader_without_plugin),
        help("Register `PolyfillInjectorPlugin` on the compiler")
    )]
    LoaderWithoutPlugin,

    /// The plugin half ran but no entry point used the loader
    #[error("[fob-polyfill] The plugin must be used together with the loader!")]
    #[diagnostic(
        code(fob::polyfill::plugin_without_loader),
        help("Configure at least one entry point with polyfill loader options")
    )]
    PluginWithoutLoader,

    /// A polyfill bundle would replace another asset of the build
    #[error("[fob-polyfill] Polyfill bundle {filename} collides with an existing asset")]
    #[diagnostic(
        code(fob::polyfill::asset_conflict),
        help("Rename the entry point or set a `filename` that does not match its output name")
    )]
    AssetConflict { filename: String },

    /// An injector template lost one of its placeholders
    #[error("[fob-polyfill] Injector template is missing the {marker} placeholder")]
    #[diagnostic(code(fob::polyfill::template_mismatch))]
    TemplateMarkerMissing { marker: &'static str },
}

impl PolyfillError {
    pub fn invalid_options(message: impl Into<String>) -> Self {
        Self::InvalidOptions {
            message: message.into(),
        }
    }

    pub fn unknown_feature(feature: impl Into<String>) -> Self {
        Self::UnknownFeature {
            feature: feature.into(),
        }
    }

    pub fn missing_detector(feature: impl Into<String>) -> Self {
        Self::MissingDetector {
            feature: feature.into(),
        }
    }

    pub fn provider(feature: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Provider {
            feature: feature.into(),
            message: message.to_string(),
        }
    }

    /// Whether the error stems from malformed options rather than resolution.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::MissingModules
                | Self::MissingPolyfills
                | Self::InvalidOptions { .. }
                | Self::InternalFeatureRequested { .. }
                | Self::ExcludedFeatureRequested { .. }
                | Self::TooManyFeatures { .. }
                | Self::AssetConflict { .. }
        )
    }
}
