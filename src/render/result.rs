//! Rendering result with statistics.

use serde::{Deserialize, Serialize};

use crate::model::SectionCategory;

/// Result of rendering a document, including content and statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResult {
    /// The rendered HTML body
    pub html: String,

    /// Document title, when the authored document carries one
    pub title: Option<String>,

    /// Rendering statistics
    pub stats: RenderStats,
}

impl RenderResult {
    /// Create a new render result.
    pub fn new(html: String, title: Option<String>, stats: RenderStats) -> Self {
        Self { html, title, stats }
    }

    /// Get the HTML length in bytes.
    pub fn content_len(&self) -> usize {
        self.html.len()
    }
}

/// Statistics collected while writing a tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderStats {
    /// Number of sections
    pub section_count: u32,

    /// Sections per category, in first-seen order
    pub categories: Vec<(SectionCategory, u32)>,

    /// Number of headings
    pub heading_count: u32,

    /// Number of paragraphs
    pub paragraph_count: u32,

    /// Number of list items
    pub list_item_count: u32,

    /// Number of images
    pub image_count: u32,

    /// Number of inline formulas
    pub inline_math_count: u32,

    /// Number of display formulas
    pub display_math_count: u32,

    /// Approximate word count of prose (whitespace-separated tokens)
    pub word_count: u32,
}

impl RenderStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a section.
    pub fn add_section(&mut self, category: SectionCategory) {
        self.section_count += 1;
        match self.categories.iter_mut().find(|(c, _)| *c == category) {
            Some((_, count)) => *count += 1,
            None => self.categories.push((category, 1)),
        }
    }

    /// Increment heading count.
    pub fn add_heading(&mut self) {
        self.heading_count += 1;
    }

    /// Increment paragraph count.
    pub fn add_paragraph(&mut self) {
        self.paragraph_count += 1;
    }

    /// Add list items.
    pub fn add_list_items(&mut self, count: usize) {
        self.list_item_count += count as u32;
    }

    /// Increment image count.
    pub fn add_image(&mut self) {
        self.image_count += 1;
    }

    /// Record a formula.
    pub fn add_math(&mut self, display: bool) {
        if display {
            self.display_math_count += 1;
        } else {
            self.inline_math_count += 1;
        }
    }

    /// Add word counts from prose.
    pub fn count_text(&mut self, text: &str) {
        self.word_count += text.split_whitespace().count() as u32;
    }

    /// Number of sections of a category.
    pub fn sections_of(&self, category: SectionCategory) -> u32 {
        self.categories
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}
