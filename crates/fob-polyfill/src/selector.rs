//! Runtime selector generation.
//!
//! The selector replaces an entry point's module: it runs the detectors,
//! fetches the bundle a browser needs (if any) and only then requires the
//! application modules.

use crate::error::{PolyfillError, Result};
use crate::filename::subset_base;
use crate::request::PolyfillRequest;
use crate::template::{InjectorTemplate, TemplateVars};

/// Keep identifiers from closing the surrounding `/* ... */` comment.
fn comment_safe(feature: &str) -> String {
    feature.replace("*/", "*\\/")
}

fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// What the generated script fetches, mirrored on the Rust side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorPlan {
    pub single_file: bool,
    /// Bundle URL (single file) or subset URL prefix (multi file)
    pub src: String,
}

impl SelectorPlan {
    /// URL a browser with the given native support would load, `None` when
    /// everything is native. `supported[i]` is the result of detector `i`.
    pub fn select(&self, supported: &[bool]) -> Option<String> {
        if self.single_file {
            return supported
                .iter()
                .any(|native| !native)
                .then(|| self.src.clone());
        }

        let mask: String = supported
            .iter()
            .map(|&native| if native { '0' } else { '1' })
            .collect();
        mask.contains('1').then(|| format!("{}{}.js", self.src, mask))
    }
}

/// A rendered selector script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderScript {
    pub source: String,
    pub plan: SelectorPlan,
}

impl LoaderScript {
    /// Render the selector of one entry point.
    ///
    /// `detectors` are in request order and `filename` is the request's
    /// resolved canonical filename.
    pub fn generate(
        request: &PolyfillRequest,
        modules: &[String],
        detectors: &[String],
        public_path: &str,
        filename: &str,
    ) -> Result<Self> {
        let main = modules
            .iter()
            .map(|module| format!("\n    require({});", js_string(module)))
            .collect::<String>()
            + "\n";

        let mut tests = Vec::with_capacity(request.len());
        for (i, feature) in request.polyfills.iter().enumerate() {
            let detector = detectors
                .get(i)
                .ok_or_else(|| PolyfillError::missing_detector(feature))?;
            let feature = comment_safe(feature);
            tests.push(if request.single_file {
                format!("/* {feature} */ !({detector})")
            } else {
                format!("\n        /* {feature} */ ({detector}) ? 0 : 1")
            });
        }
        let tests = if request.single_file {
            tests.join(" ||\n        ")
        } else {
            tests.join(",") + "\n    "
        };

        let src = if request.single_file {
            format!("{public_path}{filename}")
        } else {
            format!("{public_path}{}", subset_base(filename))
        };

        let template = InjectorTemplate::for_request(request.single_file);
        let source = template.render(&TemplateVars {
            main,
            tests,
            src: js_string(&src),
        })?;

        Ok(Self {
            source,
            plan: SelectorPlan {
                single_file: request.single_file,
                src,
            },
        })
    }
}
