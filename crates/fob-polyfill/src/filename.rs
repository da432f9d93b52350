//! Output filename templating.
//!
//! Templates may carry a hash placeholder in any of the forms hosts use
//! (`[hash]`, `[hash:8]`, `[contenthash]`, `[chunkhash:7]`). Polyfill bundles
//! have no chunk of their own, so every variant is folded into a plain
//! `[hash]` placeholder that is filled from the bundle's own content.

use regex::{Captures, Regex};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::LazyLock;

static HASH_VARIANT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(?:chunk|content)?hash(?::(\d+))?\]").expect("hash placeholder pattern")
});

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(name|ext|hash)(?::(\d+))?\]").expect("filename placeholder pattern")
});

/// A normalized filename template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilenameTemplate(String);

impl FilenameTemplate {
    /// Fold `chunkhash`/`contenthash` variants into `[hash]`.
    ///
    /// When `default_hash_length` is set, placeholders without an explicit
    /// digest length receive it.
    pub fn normalize(template: &str, default_hash_length: Option<usize>) -> Self {
        let normalized = HASH_VARIANT.replace_all(template, |caps: &Captures<'_>| {
            match (caps.get(1), default_hash_length) {
                (Some(len), _) => format!("[hash:{}]", len.as_str()),
                (None, Some(len)) => format!("[hash:{len}]"),
                (None, None) => "[hash]".to_string(),
            }
        });
        Self(normalized.into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Whether the template depends on content.
    pub fn has_hash(&self) -> bool {
        HASH_VARIANT.is_match(&self.0)
    }
}

impl std::fmt::Display for FilenameTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Host facility that turns a template into a concrete filename.
///
/// `resource_path` names the virtual source file (`./polyfills.js`) and
/// `content` is the exact byte content the digest must reflect.
pub trait NameInterpolator: Send + Sync + std::fmt::Debug {
    fn interpolate(&self, resource_path: &str, template: &str, content: &[u8]) -> String;
}

/// Default interpolator: `[name]`, `[ext]` and SHA-256 backed `[hash]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentHashInterpolator;

impl NameInterpolator for ContentHashInterpolator {
    fn interpolate(&self, resource_path: &str, template: &str, content: &[u8]) -> String {
        let path = Path::new(resource_path);
        let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("file");
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        let mut digest: Option<String> = None;

        PLACEHOLDER
            .replace_all(template, |caps: &Captures<'_>| match &caps[1] {
                "name" => name.to_string(),
                "ext" => ext.to_string(),
                _ => {
                    let hash = digest.get_or_insert_with(|| hash_content(content));
                    let len = caps
                        .get(2)
                        .and_then(|len| len.as_str().parse::<usize>().ok())
                        .unwrap_or(hash.len());
                    hash[..len.min(hash.len())].to_string()
                }
            })
            .into_owned()
    }
}

/// Hex-encoded SHA-256 of `content`.
pub fn hash_content(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Virtual resource path of the `index`-th distinct request.
pub fn resource_path(index: usize) -> String {
    if index == 0 {
        "./polyfills.js".to_string()
    } else {
        format!("./polyfills-{index}.js")
    }
}

/// Prefix shared by every subset file of a request; the runtime appends
/// `<mask>.js` to it.
pub fn subset_base(canonical: &str) -> String {
    format!("{}.", canonical.strip_suffix(".js").unwrap_or(canonical))
}

/// Filename of the subset identified by `mask`.
pub fn subset_filename(canonical: &str, mask: &str) -> String {
    format!("{}{}.js", subset_base(canonical), mask)
}
