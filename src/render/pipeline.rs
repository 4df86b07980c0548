//! The rendering pipeline from authored document to HTML.
//!
//! Stages run in a fixed order: projection to macro text, math delimiter
//! normalization, macro normalization, markdown parse with image expansion,
//! then sectioning. Every stage is a pure function, so documents can be
//! rendered concurrently.

use rayon::prelude::*;

use super::html::HtmlRenderer;
use super::{RenderOptions, RenderResult};
use crate::model::{AuthoredDocument, DocumentNode};
use crate::normalize::normalize_text;
use crate::parser::{self, Sectionizer};

/// Parse an authored document into a sectioned node tree.
pub fn parse_document(doc: &AuthoredDocument, options: &RenderOptions) -> Vec<DocumentNode> {
    let text = doc.to_macro_text();
    let normalized = normalize_text(&text);
    log::debug!(
        "normalized {} bytes of macro text into {} bytes",
        text.len(),
        normalized.len()
    );
    let nodes = parser::parse(&normalized, &options.parse);
    Sectionizer::new(options.sectionize.clone()).sectionize(nodes)
}

/// Render an authored document to an HTML body fragment.
///
/// # Example
///
/// ```
/// use lessonmark::render::{to_html, RenderOptions};
/// use lessonmark::AuthoredDocument;
///
/// let doc = AuthoredDocument::text("\\section{Exemple}\nSoit $x>0$.");
/// let html = to_html(&doc, &RenderOptions::default());
/// assert!(html.contains("section-example"));
/// ```
pub fn to_html(doc: &AuthoredDocument, options: &RenderOptions) -> String {
    let nodes = parse_document(doc, options);
    HtmlRenderer::new(options).render(&nodes)
}

/// Render an authored document and collect statistics.
pub fn to_html_with_stats(doc: &AuthoredDocument, options: &RenderOptions) -> RenderResult {
    let nodes = parse_document(doc, options);
    let options = options.clone().with_stats(true);
    let (html, stats) = HtmlRenderer::new(&options).render_with_stats(&nodes);
    RenderResult::new(html, doc.title().map(str::to_string), stats)
}

/// Render many documents in parallel, preserving input order.
pub fn render_batch(docs: &[AuthoredDocument], options: &RenderOptions) -> Vec<String> {
    docs.par_iter().map(|doc| to_html(doc, options)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SectionCategory;

    #[test]
    fn test_parse_document_sections() {
        let doc = AuthoredDocument::text(
            "\\section{Théorème de Pythagore}\nDans un triangle rectangle, $a^2+b^2=c^2$.\n\n\\section{Exemple}\nSoit $x=3$.",
        );
        let nodes = parse_document(&doc, &RenderOptions::default());
        let categories: Vec<_> = nodes.iter().filter_map(|n| n.category()).collect();
        assert_eq!(
            categories,
            vec![SectionCategory::Theorem, SectionCategory::Example]
        );
    }

    #[test]
    fn test_to_html_math_and_image() {
        let doc = AuthoredDocument::text("Voir \\(x^2\\).\n\n\\image{fig.png}{5cm}");
        let html = to_html(&doc, &RenderOptions::new().with_image_prefix("/m/"));
        assert!(html.contains("<span class=\"math math-inline\">\\(x^2\\)</span>"));
        assert!(html.contains("src=\"/m/fig.png\""));
        assert!(html.contains("width: 189px"));
    }

    #[test]
    fn test_with_stats() {
        let doc = AuthoredDocument::text("\\section{Exemple}\nSoit $x$.\n\n$$y$$");
        let result = to_html_with_stats(&doc, &RenderOptions::default());
        assert_eq!(result.stats.section_count, 1);
        assert_eq!(result.stats.inline_math_count, 1);
        assert_eq!(result.stats.display_math_count, 1);
        assert!(result.title.is_none());
    }

    #[test]
    fn test_batch_preserves_order() {
        let docs: Vec<AuthoredDocument> = (0..8)
            .map(|i| AuthoredDocument::text(format!("Paragraphe {}", i)))
            .collect();
        let options = RenderOptions::default();
        let rendered = render_batch(&docs, &options);
        assert_eq!(rendered.len(), 8);
        for (i, html) in rendered.iter().enumerate() {
            assert_eq!(html, &format!("<p>Paragraphe {}</p>", i));
        }
    }
}
