//! Text normalization stages run before the generic parse.
//!
//! The stages must run in order: math delimiters first, so the macro pass
//! can find and skip canonical math spans; image macros are expanded on the
//! parsed tree's text leaves.

pub mod images;
pub mod macros;
pub mod math;
pub mod segments;

pub use images::{expand_text, expand_tree, resolve, resolve_length, scan, ImageMatch};
pub use macros::{normalize_macros, HARD_BREAK};
pub use math::{canonicalize_delimiters, normalize_math};
pub use segments::{split, Segment, SegmentKind};

/// Run the text-level stages in order: math delimiters, then macros.
pub fn normalize_text(text: &str) -> String {
    let math = normalize_math(text);
    let result = normalize_macros(&math);
    log::debug!(
        "normalized text: {} segments, {} bytes",
        split(&result).len(),
        result.len()
    );
    result
}
