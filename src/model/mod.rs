//! Document model types.
//!
//! This module defines the authored input shapes and the tree the pipeline
//! builds from them. Trees own their children by value, so they are acyclic
//! and every node belongs to exactly one parent.

mod document;
mod image;
mod node;

pub use document::{
    AuthoredDocument, DocumentKind, MacroTextBuilder, StructuredBlock, StructuredDocument,
    LABEL_SEPARATOR,
};
pub use image::{ImageMacroSpec, ImageNode, Length, PX_PER_CM};
pub use node::{
    count_nodes, plain_text_of, DocumentNode, EmphasisStyle, ListKind, SectionCategory,
};
