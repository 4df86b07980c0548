//! Parsing of normalized text into a sectioned document tree.

mod markdown;
mod options;
mod sectionize;

pub use markdown::parse_markdown;
pub use options::{ParseOptions, SectionizeOptions};
pub use sectionize::{categorize, sectionize, Sectionizer, SECTION_KEYWORDS};

use crate::model::DocumentNode;
use crate::normalize::images;

/// Parse normalized text and expand image macros in its text leaves.
pub fn parse(text: &str, options: &ParseOptions) -> Vec<DocumentNode> {
    let mut nodes = parse_markdown(text, options);
    if options.expand_images {
        let images = images::expand_tree(&mut nodes);
        log::debug!("parser: {} top-level nodes, {} images", nodes.len(), images);
    }
    nodes
}
