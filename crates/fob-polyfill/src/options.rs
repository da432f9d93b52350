//! Injector options and their normalization into a [`PolyfillRequest`].
//!
//! Options arrive from two places: plugin-level defaults shared by the whole
//! build, and per-entry loader options. Loader options win field by field.

use serde::{Deserialize, Serialize};

use crate::error::{PolyfillError, Result};
use crate::filename::FilenameTemplate;
use crate::request::{PolyfillRequest, is_internal};

/// Banner prepended to emitted bundles unless configured otherwise.
pub const DEFAULT_BANNER: &str =
    "/*! For detailed credits and licence information see https://github.com/financial-times/polyfill-library */\n";

/// Upper bound on features in exhaustive-subset mode (2^N - 1 files).
pub const MAX_SUBSET_FEATURES: usize = 16;

/// A single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
    One(String),
    Many(Vec<String>),
}

impl StringOrList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            StringOrList::One(value) => vec![value],
            StringOrList::Many(values) => values,
        }
    }
}

impl From<&str> for StringOrList {
    fn from(value: &str) -> Self {
        StringOrList::One(value.to_string())
    }
}

impl From<Vec<String>> for StringOrList {
    fn from(values: Vec<String>) -> Self {
        StringOrList::Many(values)
    }
}

impl<const N: usize> From<[&str; N]> for StringOrList {
    fn from(values: [&str; N]) -> Self {
        StringOrList::Many(values.iter().map(|v| v.to_string()).collect())
    }
}

/// Option bag accepted by both the plugin and the per-entry loader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InjectorOptions {
    /// Features to polyfill, in bitmask order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polyfills: Option<StringOrList>,

    /// Application modules executed once polyfills are settled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modules: Option<StringOrList>,

    /// Identifiers never emitted, even as dependencies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excludes: Option<Vec<String>>,

    /// Emit one guarded bundle instead of one bundle per subset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single_file: Option<bool>,

    /// Text prepended to every bundle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,

    /// Output filename template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl InjectorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON loader query such as `{"modules":["./src/index.js"]}`.
    ///
    /// A leading `?` is ignored and an empty query yields empty options.
    pub fn from_query(query: &str) -> Result<Self> {
        let query = query.trim().trim_start_matches('?');
        if query.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(query).map_err(|e| PolyfillError::invalid_options(e.to_string()))
    }

    pub fn with_polyfills(mut self, polyfills: impl Into<StringOrList>) -> Self {
        self.polyfills = Some(polyfills.into());
        self
    }

    pub fn with_modules(mut self, modules: impl Into<StringOrList>) -> Self {
        self.modules = Some(modules.into());
        self
    }

    pub fn with_excludes<I, S>(mut self, excludes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes = Some(excludes.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_single_file(mut self, single_file: bool) -> Self {
        self.single_file = Some(single_file);
        self
    }

    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = Some(banner.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Layer `overrides` on top of `self`; set fields in `overrides` win.
    pub fn merge(self, overrides: InjectorOptions) -> Self {
        Self {
            polyfills: overrides.polyfills.or(self.polyfills),
            modules: overrides.modules.or(self.modules),
            excludes: overrides.excludes.or(self.excludes),
            single_file: overrides.single_file.or(self.single_file),
            banner: overrides.banner.or(self.banner),
            filename: overrides.filename.or(self.filename),
        }
    }
}

/// Build-wide defaults supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDefaults {
    /// Default filename template (the host's output filename)
    pub filename: String,

    /// Digest length forced onto hash placeholders that omit one
    pub hash_length: Option<usize>,
}

impl Default for OptionDefaults {
    fn default() -> Self {
        Self {
            filename: "[name].js".to_string(),
            hash_length: None,
        }
    }
}

/// Fully resolved options of one entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedOptions {
    pub request: PolyfillRequest,
    pub modules: Vec<String>,
}

/// Merge plugin and loader options and validate the result.
pub fn normalize(
    plugin: &InjectorOptions,
    loader: &InjectorOptions,
    defaults: &OptionDefaults,
) -> Result<NormalizedOptions> {
    let merged = plugin.clone().merge(loader.clone());

    let modules = merged.modules.map(StringOrList::into_vec).unwrap_or_default();
    if modules.is_empty() || modules.iter().any(|m| m.trim().is_empty()) {
        return Err(PolyfillError::MissingModules);
    }

    let polyfills = merged
        .polyfills
        .map(StringOrList::into_vec)
        .unwrap_or_default();
    if polyfills.is_empty() || polyfills.iter().any(|p| p.trim().is_empty()) {
        return Err(PolyfillError::MissingPolyfills);
    }

    let excludes = merged.excludes.unwrap_or_default();
    for feature in &polyfills {
        if is_internal(feature) {
            return Err(PolyfillError::InternalFeatureRequested {
                feature: feature.clone(),
            });
        }
        if excludes.contains(feature) {
            return Err(PolyfillError::ExcludedFeatureRequested {
                feature: feature.clone(),
            });
        }
    }

    let single_file = polyfills.len() == 1 || merged.single_file.unwrap_or(false);
    if !single_file && polyfills.len() > MAX_SUBSET_FEATURES {
        return Err(PolyfillError::TooManyFeatures {
            count: polyfills.len(),
            max: MAX_SUBSET_FEATURES,
        });
    }

    let template = merged.filename.unwrap_or_else(|| defaults.filename.clone());
    let filename = FilenameTemplate::normalize(&template, defaults.hash_length).into_string();

    Ok(NormalizedOptions {
        request: PolyfillRequest {
            polyfills,
            excludes,
            single_file,
            banner: merged.banner.unwrap_or_else(|| DEFAULT_BANNER.to_string()),
            filename,
        },
        modules,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader() -> InjectorOptions {
        InjectorOptions::new().with_modules(["./entry.js"])
    }

    #[test]
    fn test_query_accepts_strings_for_lists() {
        let options =
            InjectorOptions::from_query(r#"?{"modules":"./entry.js","polyfills":"Promise"}"#)
                .unwrap();
        let normalized = normalize(&InjectorOptions::new(), &options, &OptionDefaults::default())
            .unwrap();
        assert_eq!(normalized.modules, vec!["./entry.js"]);
        assert_eq!(normalized.request.polyfills, vec!["Promise"]);
    }

    #[test]
    fn test_empty_query() {
        assert_eq!(InjectorOptions::from_query("").unwrap(), InjectorOptions::new());
        assert_eq!(InjectorOptions::from_query("?").unwrap(), InjectorOptions::new());
    }

    #[test]
    fn test_invalid_query() {
        let err = InjectorOptions::from_query("{modules:").unwrap_err();
        assert!(matches!(err, PolyfillError::InvalidOptions { .. }));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let err = InjectorOptions::from_query(r#"{"polyfill":"Promise"}"#).unwrap_err();
        assert!(matches!(err, PolyfillError::InvalidOptions { .. }));
    }

    #[test]
    fn test_loader_overrides_plugin() {
        let plugin = InjectorOptions::new().with_polyfills(["Promise", "fetch"]);
        let loader = loader().with_polyfills(["Array.prototype.find"]);
        let normalized = normalize(&plugin, &loader, &OptionDefaults::default()).unwrap();
        assert_eq!(normalized.request.polyfills, vec!["Array.prototype.find"]);
    }

    #[test]
    fn test_single_polyfill_forces_single_file() {
        let plugin = InjectorOptions::new()
            .with_polyfills(["Promise"])
            .with_single_file(false);
        let normalized = normalize(&plugin, &loader(), &OptionDefaults::default()).unwrap();
        assert!(normalized.request.single_file);
    }

    #[test]
    fn test_defaults_applied() {
        let plugin = InjectorOptions::new().with_polyfills(["Promise", "fetch"]);
        let defaults = OptionDefaults {
            filename: "[name].[chunkhash].js".to_string(),
            hash_length: Some(20),
        };
        let normalized = normalize(&plugin, &loader(), &defaults).unwrap();
        assert!(!normalized.request.single_file);
        assert_eq!(normalized.request.banner, DEFAULT_BANNER);
        assert_eq!(normalized.request.filename, "[name].[hash:20].js");
    }

    #[test]
    fn test_missing_modules() {
        let plugin = InjectorOptions::new().with_polyfills(["Promise"]);
        let err = normalize(&plugin, &InjectorOptions::new(), &OptionDefaults::default())
            .unwrap_err();
        assert_eq!(err, PolyfillError::MissingModules);
    }

    #[test]
    fn test_missing_polyfills() {
        let err = normalize(&InjectorOptions::new(), &loader(), &OptionDefaults::default())
            .unwrap_err();
        assert_eq!(err, PolyfillError::MissingPolyfills);

        let empty = InjectorOptions::new().with_polyfills(Vec::<String>::new());
        let err = normalize(&empty, &loader(), &OptionDefaults::default()).unwrap_err();
        assert_eq!(err, PolyfillError::MissingPolyfills);
    }

    #[test]
    fn test_internal_feature_rejected() {
        let plugin = InjectorOptions::new().with_polyfills(["_ESAbstract.Call"]);
        let err = normalize(&plugin, &loader(), &OptionDefaults::default()).unwrap_err();
        assert!(matches!(err, PolyfillError::InternalFeatureRequested { .. }));
    }

    #[test]
    fn test_excluded_feature_rejected() {
        let plugin = InjectorOptions::new()
            .with_polyfills(["Promise", "fetch"])
            .with_excludes(["fetch"]);
        let err = normalize(&plugin, &loader(), &OptionDefaults::default()).unwrap_err();
        assert_eq!(
            err,
            PolyfillError::ExcludedFeatureRequested {
                feature: "fetch".to_string()
            }
        );
    }

    #[test]
    fn test_subset_limit() {
        let many: Vec<String> = (0..=MAX_SUBSET_FEATURES).map(|i| format!("F{i}")).collect();
        let plugin = InjectorOptions::new().with_polyfills(many.clone());
        let err = normalize(&plugin, &loader(), &OptionDefaults::default()).unwrap_err();
        assert!(matches!(err, PolyfillError::TooManyFeatures { .. }));

        let single = InjectorOptions::new()
            .with_polyfills(many)
            .with_single_file(true);
        assert!(normalize(&single, &loader(), &OptionDefaults::default()).is_ok());
    }
}
