//! Rendering options and configuration.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::math::{ClientSideMath, MathTypesetter, PlainMath};
use crate::parser::{ParseOptions, SectionizeOptions};

/// Math typesetting mode, as named in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MathMode {
    /// Hand math to the engine loaded in the page
    #[default]
    Client,
    /// Emit escaped sources
    Plain,
}

impl MathMode {
    fn typesetter(self) -> Arc<dyn MathTypesetter> {
        match self {
            MathMode::Client => Arc::new(ClientSideMath),
            MathMode::Plain => Arc::new(PlainMath),
        }
    }
}

fn default_typesetter() -> Arc<dyn MathTypesetter> {
    MathMode::default().typesetter()
}

/// Options for rendering documents to HTML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Prefix for image paths in output (e.g., "/media/")
    pub image_path_prefix: String,

    /// Maximum heading level (1-6)
    pub max_heading_level: u8,

    /// Generic parse options
    pub parse: ParseOptions,

    /// Sectionizer options
    pub sectionize: SectionizeOptions,

    /// Math typesetting mode
    pub math: MathMode,

    /// Math typesetter; follows `math` unless replaced with `with_typesetter`
    #[serde(skip, default = "default_typesetter")]
    pub typesetter: Arc<dyn MathTypesetter>,

    /// Collect statistics during rendering
    pub collect_stats: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the image path prefix.
    pub fn with_image_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.image_path_prefix = prefix.into();
        self
    }

    /// Set the maximum heading level.
    pub fn with_max_heading(mut self, level: u8) -> Self {
        self.max_heading_level = level.clamp(1, 6);
        self
    }

    /// Set the parse options.
    pub fn with_parse_options(mut self, parse: ParseOptions) -> Self {
        self.parse = parse;
        self
    }

    /// Set the sectionizer options.
    pub fn with_sectionize(mut self, sectionize: SectionizeOptions) -> Self {
        self.sectionize = sectionize;
        self
    }

    /// Select a built-in math mode.
    pub fn with_math_mode(mut self, mode: MathMode) -> Self {
        self.math = mode;
        self.typesetter = mode.typesetter();
        self
    }

    /// Use a custom math typesetter.
    pub fn with_typesetter(mut self, typesetter: impl MathTypesetter + 'static) -> Self {
        self.typesetter = Arc::new(typesetter);
        self
    }

    /// Enable statistics collection.
    pub fn with_stats(mut self, collect: bool) -> Self {
        self.collect_stats = collect;
        self
    }

    /// Re-derive the typesetter from `math`, after loading from a file.
    pub fn resolved(mut self) -> Self {
        self.typesetter = self.math.typesetter();
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            image_path_prefix: String::new(),
            max_heading_level: 6,
            parse: ParseOptions::default(),
            sectionize: SectionizeOptions::default(),
            math: MathMode::default(),
            typesetter: default_typesetter(),
            collect_stats: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RenderOptions::default();
        assert_eq!(options.max_heading_level, 6);
        assert!(options.typesetter.needs_client_engine());
        assert!(options.sectionize.enabled);
    }

    #[test]
    fn test_builder() {
        let options = RenderOptions::new()
            .with_image_prefix("/media/")
            .with_max_heading(9)
            .with_math_mode(MathMode::Plain);
        assert_eq!(options.image_path_prefix, "/media/");
        assert_eq!(options.max_heading_level, 6);
        assert!(!options.typesetter.needs_client_engine());
    }

    #[test]
    fn test_from_json_config() {
        let options: RenderOptions =
            serde_json::from_str(r#"{"math": "plain", "sectionize": {"levels": [2]}}"#).unwrap();
        let options = options.resolved();
        assert_eq!(options.math, MathMode::Plain);
        assert!(!options.typesetter.needs_client_engine());
        assert_eq!(options.sectionize.levels, vec![2]);
    }
}
