//! Image macro expansion.
//!
//! Two argument orders are accepted:
//!
//! - path first: `\figure{path}{width=…}` or `\image{path}{…}`, options optional
//! - options first: `\includegraphics[width=…]{path}`
//!
//! Text leaves are split into alternating text and image nodes, spliced in
//! place into their parent's child list.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{DocumentNode, ImageMacroSpec, ImageNode, Length, PX_PER_CM};

static PATH_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(?:figure|image)\{([^{}]+)\}(?:\{([^{}]*)\})?").expect("path-first regex")
});

static OPTIONS_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\includegraphics(?:\[([^\]]*)\])?\{([^{}]+)\}").expect("options-first regex")
});

static LENGTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([0-9]*\.?[0-9]+)?\s*(px|cm|%|\\linewidth|\\textwidth|\\columnwidth|\\textheight)?$",
    )
    .expect("length regex")
});

/// An image macro found in a text leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMatch {
    /// Byte range of the whole macro
    pub range: Range<usize>,
    /// Extracted path and raw size options
    pub spec: ImageMacroSpec,
}

/// Collect image macros of both syntaxes in text order.
///
/// A match overlapping an earlier one is dropped.
pub fn scan(text: &str) -> Vec<ImageMatch> {
    let mut matches: Vec<ImageMatch> = Vec::new();

    for caps in PATH_FIRST.captures_iter(text) {
        let whole = caps.get(0).map(|m| m.range()).unwrap_or_default();
        let mut spec = ImageMacroSpec::new(caps[1].trim());
        if let Some(options) = caps.get(2) {
            apply_options(options.as_str(), &mut spec);
        }
        matches.push(ImageMatch { range: whole, spec });
    }

    for caps in OPTIONS_FIRST.captures_iter(text) {
        let whole = caps.get(0).map(|m| m.range()).unwrap_or_default();
        let mut spec = ImageMacroSpec::new(caps[2].trim());
        if let Some(options) = caps.get(1) {
            apply_options(options.as_str(), &mut spec);
        }
        matches.push(ImageMatch { range: whole, spec });
    }

    matches.sort_by_key(|m| m.range.start);

    let mut kept: Vec<ImageMatch> = Vec::with_capacity(matches.len());
    for candidate in matches {
        let overlaps = kept
            .last()
            .map(|prev| candidate.range.start < prev.range.end)
            .unwrap_or(false);
        if !overlaps {
            kept.push(candidate);
        }
    }
    kept
}

/// Read `width=` / `height=` pairs into the spec. Other keys are ignored.
fn apply_options(options: &str, spec: &mut ImageMacroSpec) {
    for pair in options.split(',') {
        let Some((key, value)) = pair.split_once('=') else {
            // A lone value is a width: `\image{a.png}{5cm}`.
            let value = pair.trim();
            if !value.is_empty() && spec.width_spec.is_none() {
                spec.width_spec = Some(value.to_string());
            }
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.trim() {
            "width" => spec.width_spec = Some(value.to_string()),
            "height" => spec.height_spec = Some(value.to_string()),
            _ => {}
        }
    }
}

/// Resolve a raw size value into a CSS length.
///
/// Returns `None` for values that cannot be read; the image then carries no
/// declared size on that axis.
pub fn resolve_length(value: &str) -> Option<Length> {
    let caps = LENGTH.captures(value.trim())?;
    let number = match caps.get(1) {
        Some(m) => Some(m.as_str().parse::<f64>().ok()?),
        None => None,
    };

    match (number, caps.get(2).map(|m| m.as_str())) {
        (Some(n), None) | (Some(n), Some("px")) => Some(Length::Px(n)),
        (Some(n), Some("cm")) => Some(Length::Px(n * PX_PER_CM)),
        (Some(n), Some("%")) => Some(Length::Percent(n)),
        (fraction, Some(unit)) if unit.starts_with('\\') => {
            let fraction = fraction.unwrap_or(1.0);
            Some(Length::Percent((fraction * 100.0).round()))
        }
        _ => None,
    }
}

/// Resolve a spec into an image node.
pub fn resolve(spec: &ImageMacroSpec) -> ImageNode {
    ImageNode {
        path: spec.path.clone(),
        width: spec.width_spec.as_deref().and_then(resolve_length),
        height: spec.height_spec.as_deref().and_then(resolve_length),
    }
}

/// Split a text leaf into text and image fragments.
///
/// Text without any macro comes back as a single text node.
pub fn expand_text(text: &str) -> Vec<DocumentNode> {
    let matches = scan(text);
    if matches.is_empty() {
        return vec![DocumentNode::text(text)];
    }

    let mut fragments = Vec::with_capacity(matches.len() * 2 + 1);
    let mut cursor = 0;
    for m in matches {
        if m.range.start > cursor {
            fragments.push(DocumentNode::text(&text[cursor..m.range.start]));
        }
        fragments.push(DocumentNode::Image(resolve(&m.spec)));
        cursor = m.range.end;
    }
    if cursor < text.len() {
        fragments.push(DocumentNode::text(&text[cursor..]));
    }
    fragments
}

/// Expand image macros in every text leaf of a tree, in place.
///
/// Adjacent text leaves are merged first so a macro split across parser
/// events is still found. Returns the number of images produced.
pub fn expand_tree(nodes: &mut Vec<DocumentNode>) -> usize {
    merge_text_runs(nodes);

    let mut images = 0;
    let mut i = 0;
    while i < nodes.len() {
        if let DocumentNode::Text { text } = &nodes[i] {
            let fragments = expand_text(text);
            if fragments.len() == 1 && !matches!(fragments[0], DocumentNode::Image(_)) {
                i += 1;
                continue;
            }
            images += fragments
                .iter()
                .filter(|n| matches!(n, DocumentNode::Image(_)))
                .count();
            let added = fragments.len();
            nodes.splice(i..i + 1, fragments);
            i += added;
        } else {
            for children in nodes[i].child_lists_mut() {
                images += expand_tree(children);
            }
            i += 1;
        }
    }
    images
}

/// Merge runs of adjacent text leaves into one leaf.
fn merge_text_runs(nodes: &mut Vec<DocumentNode>) {
    let mut merged: Vec<DocumentNode> = Vec::with_capacity(nodes.len());
    for node in nodes.drain(..) {
        if let DocumentNode::Text { text } = &node {
            if let Some(DocumentNode::Text { text: prev }) = merged.last_mut() {
                prev.push_str(text);
                continue;
            }
        }
        merged.push(node);
    }
    *nodes = merged;
}
