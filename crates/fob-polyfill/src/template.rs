//! Injector templates and their placeholder substitution.

use crate::error::{PolyfillError, Result};

const SINGLE: &str = include_str!("../templates/injector-single.js");
const MULTI: &str = include_str!("../templates/injector-multi.js");

const MAIN_MARKER: &str = "__MAIN__";
const TESTS_MARKER: &str = "__TESTS__";
const SRC_MARKER: &str = "__SRC__";

/// Which runtime selector to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectorTemplate {
    /// Load one bundle when any feature is missing
    Single,
    /// Load the subset bundle matching the missing features
    Multi,
}

impl InjectorTemplate {
    pub fn for_request(single_file: bool) -> Self {
        if single_file { Self::Single } else { Self::Multi }
    }

    pub fn source(self) -> &'static str {
        match self {
            Self::Single => SINGLE,
            Self::Multi => MULTI,
        }
    }

    /// Substitute every placeholder.
    ///
    /// Markers are located in the template text before anything is spliced,
    /// so substituted values may contain marker-like text without being
    /// rewritten themselves.
    pub fn render(self, vars: &TemplateVars) -> Result<String> {
        let raw = self.source();
        let mut spans = Vec::with_capacity(3);
        for (marker, value) in [
            (MAIN_MARKER, vars.main.as_str()),
            (TESTS_MARKER, vars.tests.as_str()),
            (SRC_MARKER, vars.src.as_str()),
        ] {
            let start = raw
                .find(marker)
                .ok_or(PolyfillError::TemplateMarkerMissing { marker })?;
            spans.push((start, start + marker.len(), value));
        }
        spans.sort_by_key(|(start, _, _)| *start);

        let mut out = String::with_capacity(raw.len() + spans.iter().map(|s| s.2.len()).sum::<usize>());
        let mut cursor = 0;
        for (start, end, value) in spans {
            out.push_str(&raw[cursor..start]);
            out.push_str(value);
            cursor = end;
        }
        out.push_str(&raw[cursor..]);
        Ok(out)
    }
}

/// Values for the three template placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateVars {
    /// Body of the deferred `main` function
    pub main: String,
    /// Detection expression(s)
    pub tests: String,
    /// JSON string literal of the bundle URL (or URL prefix)
    pub src: String,
}
