//! # lessonmark
//!
//! Normalization, sectioning and print-ready HTML rendering for educational
//! documents written in a LaTeX-flavoured macro dialect mixed with markdown.
//!
//! ## Quick Start
//!
//! ```
//! use lessonmark::{render, AuthoredDocument};
//!
//! let doc = AuthoredDocument::text(
//!     "\\section{Théorème de Pythagore}\nDans un triangle rectangle, \\(a^2+b^2=c^2\\).",
//! );
//! let html = render::to_html(&doc, &render::RenderOptions::default());
//! assert!(html.contains("section-theorem"));
//! ```
//!
//! ## Pipeline
//!
//! - **Math delimiters**: every upstream variant becomes `$…$` or `$$…$$`
//! - **Macros**: lists, emphasis, headings and line breaks become markdown
//! - **Images**: `\figure`, `\image` and `\includegraphics` become sized image nodes
//! - **Sections**: headings are grouped into semantic sections by keyword
//! - **Validation**: generated content is repaired, checked, and refused when broken
//! - **Capture**: a readiness handshake lets a headless browser print the page
//!   only once math and images have settled

pub mod capture;
pub mod error;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod render;
pub mod validate;

// Re-export commonly used types
pub use error::{Error, Result};
pub use model::{
    AuthoredDocument, DocumentKind, DocumentNode, EmphasisStyle, ImageMacroSpec, ImageNode,
    Length, ListKind, SectionCategory, StructuredBlock, StructuredDocument,
};
pub use parser::{ParseOptions, SectionizeOptions};
pub use render::{
    JsonFormat, MathMode, MathTypesetter, PageOptions, RenderOptions, RenderResult, RenderStats,
};
pub use validate::{
    admit_generated, sanitize, validate, FindingKind, SanitizeResult, ValidationFinding,
    ValidationOptions, ValidationPreset, ValidationReport,
};

use std::path::Path;

/// Load an authored document from a file.
///
/// `.json` files hold a structured document; anything else is read as macro
/// text.
///
/// # Example
///
/// ```no_run
/// use lessonmark::load_document;
///
/// let doc = load_document("lesson.tex").unwrap();
/// ```
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<AuthoredDocument> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        let doc = StructuredDocument::from_json(&content)
            .map_err(|e| Error::InvalidDocument(format!("{}: {}", path.display(), e)))?;
        Ok(AuthoredDocument::Structured(doc))
    } else {
        Ok(AuthoredDocument::Text(content))
    }
}

/// Parse macro text into a sectioned node tree with default options.
pub fn parse_text(text: &str) -> Vec<DocumentNode> {
    render::parse_document(&AuthoredDocument::text(text), &RenderOptions::default())
}

/// Render macro text to an HTML body fragment with default options.
///
/// # Example
///
/// ```
/// let html = lessonmark::to_html("\\begin{itemize}\\item a\\item b\\end{itemize}");
/// assert_eq!(html, "<ul>\n<li>a</li>\n<li>b</li>\n</ul>");
/// ```
pub fn to_html(text: &str) -> String {
    render::to_html(&AuthoredDocument::text(text), &RenderOptions::default())
}

/// Render a document file to an HTML body fragment.
///
/// # Example
///
/// ```no_run
/// use lessonmark::{render_file, RenderOptions};
///
/// let html = render_file("lesson.json", &RenderOptions::default()).unwrap();
/// std::fs::write("lesson.html", html).unwrap();
/// ```
pub fn render_file<P: AsRef<Path>>(path: P, options: &RenderOptions) -> Result<String> {
    let doc = load_document(path)?;
    Ok(render::to_html(&doc, options))
}

/// Render a document file to a complete printable page.
pub fn render_file_page<P: AsRef<Path>>(
    path: P,
    options: &RenderOptions,
    page: &PageOptions,
) -> Result<String> {
    let doc = load_document(path)?;
    Ok(render::render_page(&doc, options, page))
}

/// Builder for rendering documents.
///
/// # Example
///
/// ```
/// use lessonmark::{Lessonmark, MathMode};
///
/// let html = Lessonmark::new()
///     .with_image_prefix("/media/")
///     .with_math_mode(MathMode::Plain)
///     .parse("\\section{Exemple}\n\\image{a.png}{width=5cm}")
///     .to_html();
/// assert!(html.contains("/media/a.png"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Lessonmark {
    render_options: RenderOptions,
    page_options: PageOptions,
    validation: ValidationOptions,
}

impl Lessonmark {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing render options, e.g. loaded from a config file.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Set the image path prefix.
    pub fn with_image_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.render_options = self.render_options.with_image_prefix(prefix);
        self
    }

    /// Select the math mode.
    pub fn with_math_mode(mut self, mode: MathMode) -> Self {
        self.render_options = self.render_options.with_math_mode(mode);
        self
    }

    /// Use a custom math typesetter.
    pub fn with_typesetter(mut self, typesetter: impl MathTypesetter + 'static) -> Self {
        self.render_options = self.render_options.with_typesetter(typesetter);
        self
    }

    /// Group only headings of these levels into sections.
    pub fn with_section_levels(mut self, levels: Vec<u8>) -> Self {
        self.render_options = self
            .render_options
            .with_sectionize(SectionizeOptions::new().with_levels(levels));
        self
    }

    /// Do not group headings into sections.
    pub fn without_sections(mut self) -> Self {
        self.render_options = self
            .render_options
            .with_sectionize(SectionizeOptions::disabled());
        self
    }

    /// Set the page options used by [`LessonmarkResult::to_page`].
    pub fn with_page_options(mut self, page: PageOptions) -> Self {
        self.page_options = page;
        self
    }

    /// Use a validation preset for [`Lessonmark::admit`].
    pub fn with_validation(mut self, preset: ValidationPreset) -> Self {
        self.validation = ValidationOptions::from_preset(preset);
        self
    }

    /// Use lenient validation.
    pub fn lenient(self) -> Self {
        self.with_validation(ValidationPreset::Lenient)
    }

    /// Use strict validation.
    pub fn strict(self) -> Self {
        self.with_validation(ValidationPreset::Strict)
    }

    /// Parse a document.
    pub fn parse(self, doc: impl Into<AuthoredDocument>) -> LessonmarkResult {
        let doc = doc.into();
        let nodes = render::parse_document(&doc, &self.render_options);
        LessonmarkResult {
            nodes,
            title: doc.title().map(str::to_string),
            render_options: self.render_options,
            page_options: self.page_options,
        }
    }

    /// Load and parse a document file.
    pub fn parse_file<P: AsRef<Path>>(self, path: P) -> Result<LessonmarkResult> {
        let doc = load_document(path)?;
        Ok(self.parse(doc))
    }

    /// Admit generated text through sanitize and validate, then parse it.
    ///
    /// Returns [`Error::ContentRejected`] when the content must be
    /// regenerated.
    pub fn admit(self, generated: &str) -> Result<LessonmarkResult> {
        let text = admit_generated(generated, &self.validation)?;
        Ok(self.parse(text))
    }
}

/// A parsed document ready for output.
#[derive(Debug, Clone)]
pub struct LessonmarkResult {
    /// The sectioned node tree
    pub nodes: Vec<DocumentNode>,
    /// Document title, if any
    pub title: Option<String>,
    render_options: RenderOptions,
    page_options: PageOptions,
}

impl LessonmarkResult {
    /// Render the HTML body fragment.
    pub fn to_html(&self) -> String {
        render::render_nodes(&self.nodes, &self.render_options)
    }

    /// Render the body and collect statistics.
    pub fn to_html_with_stats(&self) -> RenderResult {
        let options = self.render_options.clone().with_stats(true);
        let (html, stats) = render::HtmlRenderer::new(&options).render_with_stats(&self.nodes);
        RenderResult::new(html, self.title.clone(), stats)
    }

    /// Render a complete printable page.
    pub fn to_page(&self) -> String {
        let mut page = self.page_options.clone();
        if page.title.is_none() {
            page.title = self.title.clone();
        }
        if !self.render_options.typesetter.needs_client_engine() {
            page.include_math_engine = false;
        }
        render::to_page(&self.to_html(), &page)
    }

    /// Dump the node tree as JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.nodes, format)
    }

    /// Plain text of the whole tree.
    pub fn plain_text(&self) -> String {
        model::plain_text_of(&self.nodes)
    }

    /// Sections in document order.
    pub fn sections(&self) -> impl Iterator<Item = &DocumentNode> {
        self.nodes.iter().filter(|node| node.is_section())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builder_defaults() {
        let builder = Lessonmark::new();
        assert!(builder.render_options.sectionize.enabled);
        assert_eq!(builder.validation, ValidationOptions::default());
    }

    #[test]
    fn test_builder_without_sections() {
        let result = Lessonmark::new()
            .without_sections()
            .parse("\\section{Exemple}\nTexte");
        assert_eq!(result.sections().count(), 0);
    }

    #[test]
    fn test_builder_section_levels() {
        let result = Lessonmark::new()
            .with_section_levels(vec![2])
            .parse("\\subsection{Exemple}\nTexte");
        assert_eq!(result.sections().count(), 0);
    }

    #[test]
    fn test_result_outputs() {
        let result = Lessonmark::new().parse("\\section{Définition}\nUn *carré* est...");
        assert_eq!(
            result.sections().next().and_then(|s| s.category()),
            Some(SectionCategory::Definition)
        );
        assert!(result.to_html().contains("<em>carré</em>"));
        assert!(result.to_json(JsonFormat::Compact).unwrap().contains("definition"));
        assert!(result.plain_text().contains("carré"));
    }

    #[test]
    fn test_admit_rejects_false_identity() {
        let err = Lessonmark::new()
            .admit("On a $(a+b)^2 = a^2 + b^2$ et $\\sqrt{a+b} = \\sqrt{a} + \\sqrt{b}$.")
            .unwrap_err();
        assert!(matches!(err, Error::ContentRejected { .. }));
    }

    #[test]
    fn test_load_text_and_json() {
        let mut tex = tempfile::Builder::new().suffix(".tex").tempfile().unwrap();
        write!(tex, "\\section{{Exemple}}").unwrap();
        assert!(matches!(
            load_document(tex.path()).unwrap(),
            AuthoredDocument::Text(_)
        ));

        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(json, r#"{{"title": "Leçon", "blocks": []}}"#).unwrap();
        let doc = load_document(json.path()).unwrap();
        assert_eq!(doc.title(), Some("Leçon"));
    }

    #[test]
    fn test_load_invalid_json() {
        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(json, "not json").unwrap();
        assert!(matches!(
            load_document(json.path()),
            Err(Error::InvalidDocument(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            load_document("/nonexistent/lesson.tex"),
            Err(Error::Io(_))
        ));
    }
}
