//! Parsing and sectioning options.

use serde::{Deserialize, Serialize};

/// Options for the generic markup parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Recognize `~~strike~~`
    pub strikethrough: bool,

    /// Expand image macros in text leaves after the parse
    pub expand_images: bool,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable strikethrough.
    pub fn with_strikethrough(mut self, enabled: bool) -> Self {
        self.strikethrough = enabled;
        self
    }

    /// Leave image macros as text.
    pub fn without_images(mut self) -> Self {
        self.expand_images = false;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strikethrough: true,
            expand_images: true,
        }
    }
}

/// Options for the sectionizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionizeOptions {
    /// Whether sectioning runs at all
    pub enabled: bool,

    /// Heading levels that open a section
    pub levels: Vec<u8>,
}

impl SectionizeOptions {
    /// Create new sectionize options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the heading levels that open a section.
    pub fn with_levels(mut self, levels: impl Into<Vec<u8>>) -> Self {
        self.levels = levels.into();
        self
    }

    /// Disable sectioning; the parsed tree is returned as-is.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Check if a heading level opens a section.
    pub fn is_eligible(&self, level: u8) -> bool {
        self.levels.contains(&level)
    }
}

impl Default for SectionizeOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            levels: vec![2, 3],
        }
    }
}
