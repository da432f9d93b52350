//! Bundle assembly.
//!
//! A request turns into either one file holding every feature, or one file
//! per non-empty subset of its features. Subset files are never guarded:
//! the runtime selector has already run the detectors when it picks one.

use crate::error::Result;
use crate::filename::subset_filename;
use crate::request::PolyfillRequest;
use crate::resolve::FeatureSet;

const INDENT: &str = "    ";

/// One code segment of a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub feature: String,
    pub code: String,
    /// Detection expression; the segment only runs when it is falsy
    pub guard: Option<String>,
}

impl Segment {
    fn render(&self, out: &mut String) {
        match &self.guard {
            None => {
                out.push('\n');
                out.push_str(&self.code);
                out.push('\n');
            }
            Some(detector) => {
                out.push_str("\nif (!(");
                out.push_str(detector);
                out.push_str(")) {\n");
                out.push_str(&indent(&self.code));
                out.push_str("\n}\n");
            }
        }
    }
}

fn indent(code: &str) -> String {
    code.split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                format!("{INDENT}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One emitted bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleFile {
    pub filename: String,
    pub banner: String,
    pub segments: Vec<Segment>,
}

impl BundleFile {
    /// Rendered file content. Identical inputs always render identically.
    pub fn content(&self) -> String {
        let mut out = self.banner.clone();
        for segment in &self.segments {
            segment.render(&mut out);
        }
        out
    }

    /// Whether any segment belongs to `feature`.
    pub fn contains(&self, feature: &str) -> bool {
        self.segments.iter().any(|segment| segment.feature == feature)
    }
}

/// Fixed-width bitmask of `width` features; char `i` is feature `i`.
pub fn subset_mask(value: u32, width: usize) -> String {
    format!("{value:0width$b}")
}

/// Feature indices flagged `'1'` in `mask`.
pub fn mask_indices(mask: &str) -> Vec<usize> {
    mask.char_indices()
        .filter(|(_, bit)| *bit == '1')
        .map(|(i, _)| i)
        .collect()
}

/// Every non-empty mask over `width` features, in ascending numeric order.
pub fn all_masks(width: usize) -> impl Iterator<Item = String> {
    (1..(1u32 << width)).map(move |value| subset_mask(value, width))
}

fn segments(request: &PolyfillRequest, set: &FeatureSet, selected: &[usize]) -> Result<Vec<Segment>> {
    let guarded = request.needs_guards();
    let mut segments: Vec<Segment> = set
        .dependencies_for(selected)?
        .into_iter()
        .map(|(name, code)| Segment {
            feature: name.to_string(),
            code: code.to_string(),
            guard: None,
        })
        .collect();

    for &i in selected {
        let Some(feature) = set.features().get(i) else {
            continue;
        };
        segments.push(Segment {
            feature: feature.name.clone(),
            code: feature.source.as_str().to_string(),
            guard: if guarded { feature.detector.clone() } else { None },
        });
    }
    Ok(segments)
}

/// Content whose digest names the request: the single bundle, or the subset
/// holding every feature.
pub fn canonical_content(request: &PolyfillRequest, set: &FeatureSet) -> Result<String> {
    let all: Vec<usize> = (0..set.features().len()).collect();
    let file = BundleFile {
        filename: String::new(),
        banner: request.banner.clone(),
        segments: segments(request, set, &all)?,
    };
    Ok(file.content())
}

/// Build every file of a request whose canonical name is `filename`.
pub fn assemble(request: &PolyfillRequest, set: &FeatureSet, filename: &str) -> Result<Vec<BundleFile>> {
    let width = set.features().len();

    if request.single_file {
        let all: Vec<usize> = (0..width).collect();
        return Ok(vec![BundleFile {
            filename: filename.to_string(),
            banner: request.banner.clone(),
            segments: segments(request, set, &all)?,
        }]);
    }

    all_masks(width)
        .map(|mask| {
            let selected = mask_indices(&mask);
            Ok(BundleFile {
                filename: subset_filename(filename, &mask),
                banner: request.banner.clone(),
                segments: segments(request, set, &selected)?,
            })
        })
        .collect()
}
