//! Standalone printable page.
//!
//! The same page serves the screen viewer and the capture browser, so what
//! is printed is what is seen. There is no print-only rendering path.

use serde::{Deserialize, Serialize};

use super::html::{escape_attr, escape_text};
use super::{to_html, RenderOptions};
use crate::capture::{agent_script, AgentOptions};
use crate::model::AuthoredDocument;

/// Default location of the client-side math engine.
pub const DEFAULT_MATH_ENGINE_URL: &str = "https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-chtml.js";

const BASE_CSS: &str = r#"@page { margin: 0; }
html { -webkit-print-color-adjust: exact; print-color-adjust: exact; }
body { font-family: "Latin Modern Roman", Georgia, serif; line-height: 1.5; max-width: 190mm; margin: 0 auto; padding: 12mm 10mm; color: #1d1d1f; }
h1, h2, h3, h4 { line-height: 1.25; break-after: avoid-page; }
img { display: block; margin: 0.75em auto; }
.math-display { margin: 0.75em 0; overflow-x: auto; text-align: center; }
.section { margin: 1em 0; padding: 0.5em 1em; border-left: 4px solid #9aa0a6; border-radius: 4px; break-inside: avoid-page; }
.section > :first-child { margin-top: 0.25em; }
.section-introduction { border-color: #5f6368; background: #f8f9fa; }
.section-definition { border-color: #1a73e8; background: #e8f0fe; }
.section-theorem { border-color: #188038; background: #e6f4ea; }
.section-formula { border-color: #9334e6; background: #f3e8fd; }
.section-example { border-color: #e37400; background: #fef7e0; }
.section-exercise { border-color: #d93025; background: #fce8e6; }
.section-summary { border-color: #007b83; background: #e4f7fb; }
.section-alert { border-color: #b31412; background: #fad2cf; }
details.solution { margin: 0.5em 0; }
details.solution > summary { cursor: pointer; font-weight: bold; }
"#;

const MATH_CONFIG: &str = r#"window.MathJax = {
  tex: { inlineMath: [["\\(", "\\)"]], displayMath: [["\\[", "\\]"]], processEscapes: true },
  options: { processHtmlClass: "math" },
  startup: { typeset: true }
};"#;

/// Options for the standalone page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageOptions {
    /// Page title
    pub title: Option<String>,

    /// Document language
    pub lang: String,

    /// Math engine script URL
    pub math_engine_url: String,

    /// Load the math engine
    pub include_math_engine: bool,

    /// Extra CSS appended after the built-in rules
    pub extra_css: Option<String>,

    /// Install the readiness agent
    pub include_agent: bool,

    /// Readiness agent options
    pub agent: AgentOptions,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            title: None,
            lang: "fr".to_string(),
            math_engine_url: DEFAULT_MATH_ENGINE_URL.to_string(),
            include_math_engine: true,
            extra_css: None,
            include_agent: true,
            agent: AgentOptions::default(),
        }
    }
}

impl PageOptions {
    /// Create page options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the document language.
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Set the math engine URL.
    pub fn with_math_engine(mut self, url: impl Into<String>) -> Self {
        self.math_engine_url = url.into();
        self.include_math_engine = true;
        self
    }

    /// Do not load a math engine.
    pub fn without_math_engine(mut self) -> Self {
        self.include_math_engine = false;
        self
    }

    /// Append CSS rules.
    pub fn with_css(mut self, css: impl Into<String>) -> Self {
        self.extra_css = Some(css.into());
        self
    }

    /// Do not install the readiness agent.
    pub fn without_agent(mut self) -> Self {
        self.include_agent = false;
        self
    }

    /// Set the readiness agent options.
    pub fn with_agent(mut self, agent: AgentOptions) -> Self {
        self.agent = agent;
        self
    }
}

/// Wrap an HTML body fragment into a complete page.
pub fn to_page(body: &str, options: &PageOptions) -> String {
    let mut page = String::with_capacity(body.len() + BASE_CSS.len() + 2048);

    page.push_str("<!DOCTYPE html>\n");
    page.push_str(&format!(
        "<html lang=\"{}\">\n<head>\n<meta charset=\"utf-8\">\n",
        escape_attr(&options.lang)
    ));
    page.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    if let Some(title) = &options.title {
        page.push_str(&format!("<title>{}</title>\n", escape_text(title)));
    }

    page.push_str("<style>\n");
    page.push_str(BASE_CSS);
    if let Some(css) = &options.extra_css {
        page.push_str(css);
        page.push('\n');
    }
    page.push_str("</style>\n");

    if options.include_math_engine {
        page.push_str("<script>\n");
        page.push_str(MATH_CONFIG);
        page.push_str("\n</script>\n");
        page.push_str(&format!(
            "<script id=\"math-engine\" async src=\"{}\"></script>\n",
            escape_attr(&options.math_engine_url)
        ));
    }

    page.push_str("</head>\n<body>\n<main class=\"lesson\">\n");
    page.push_str(body);
    page.push_str("\n</main>\n");

    if options.include_agent {
        page.push_str("<script>\n");
        page.push_str(&agent_script(&options.agent));
        page.push_str("</script>\n");
    }

    page.push_str("</body>\n</html>\n");
    page
}

/// Render an authored document straight to a complete page.
///
/// The math engine is only loaded when the configured typesetter needs one,
/// and the document title is used when the page options carry none.
pub fn render_page(doc: &AuthoredDocument, options: &RenderOptions, page: &PageOptions) -> String {
    let body = to_html(doc, options);
    let mut page = page.clone();
    if !options.typesetter.needs_client_engine() {
        page.include_math_engine = false;
    }
    if page.title.is_none() {
        page.title = doc.title().map(str::to_string);
    }
    to_page(&body, &page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::READINESS_MARKER_ID;
    use crate::render::MathMode;

    #[test]
    fn test_page_shell() {
        let page = to_page("<p>Bonjour</p>", &PageOptions::new().with_title("Leçon 1"));
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Leçon 1</title>"));
        assert!(page.contains("@page { margin: 0; }"));
        assert!(page.contains("print-color-adjust: exact"));
        assert!(page.contains(DEFAULT_MATH_ENGINE_URL));
        assert!(page.contains(READINESS_MARKER_ID));
        assert!(page.contains("<p>Bonjour</p>"));
    }

    #[test]
    fn test_page_without_agent_or_engine() {
        let options = PageOptions::new().without_agent().without_math_engine();
        let page = to_page("", &options);
        assert!(!page.contains(READINESS_MARKER_ID));
        assert!(!page.contains("MathJax"));
    }

    #[test]
    fn test_render_page_plain_math_skips_engine() {
        let doc = AuthoredDocument::text("$x$");
        let options = RenderOptions::new().with_math_mode(MathMode::Plain);
        let page = render_page(&doc, &options, &PageOptions::default());
        assert!(!page.contains("math-engine"));
        assert!(page.contains("math-source"));
    }
}
