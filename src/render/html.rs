//! HTML writer for document trees.

use crate::model::{DocumentNode, EmphasisStyle, ImageNode, ListKind};

use super::{RenderOptions, RenderStats};

/// Escape text for an HTML text node.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape text for a double-quoted attribute value.
pub fn escape_attr(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}

/// Writes a node tree as HTML.
pub struct HtmlRenderer<'a> {
    options: &'a RenderOptions,
    stats: RenderStats,
}

impl<'a> HtmlRenderer<'a> {
    /// Create a new HTML renderer.
    pub fn new(options: &'a RenderOptions) -> Self {
        Self {
            options,
            stats: RenderStats::new(),
        }
    }

    /// Render a node sequence.
    pub fn render(mut self, nodes: &[DocumentNode]) -> String {
        self.render_internal(nodes)
    }

    /// Render a node sequence and return the collected statistics.
    pub fn render_with_stats(mut self, nodes: &[DocumentNode]) -> (String, RenderStats) {
        let html = self.render_internal(nodes);
        (html, self.stats)
    }

    fn render_internal(&mut self, nodes: &[DocumentNode]) -> String {
        let mut output = String::new();
        for node in nodes {
            self.render_node(&mut output, node);
        }
        output.trim_end().to_string()
    }

    fn render_children(&mut self, output: &mut String, children: &[DocumentNode]) {
        for child in children {
            self.render_node(output, child);
        }
    }

    fn render_node(&mut self, output: &mut String, node: &DocumentNode) {
        let collect = self.options.collect_stats;
        match node {
            DocumentNode::Section { category, children } => {
                if collect {
                    self.stats.add_section(*category);
                }
                output.push_str(&format!(
                    "<section class=\"section section-{0}\" data-category=\"{0}\">\n",
                    category.as_str()
                ));
                self.render_children(output, children);
                output.push_str("</section>\n");
            }
            DocumentNode::Heading { level, children } => {
                if collect {
                    self.stats.add_heading();
                }
                let level = (*level).clamp(1, self.options.max_heading_level.max(1));
                output.push_str(&format!("<h{}>", level));
                self.render_children(output, children);
                output.push_str(&format!("</h{}>\n", level));
            }
            DocumentNode::Paragraph { children } => {
                if collect {
                    self.stats.add_paragraph();
                }
                output.push_str("<p>");
                let start = output.len();
                self.render_children(output, children);
                let trimmed = output[start..].trim_end().len();
                output.truncate(start + trimmed);
                output.push_str("</p>\n");
            }
            DocumentNode::List { kind, items } => {
                if collect {
                    self.stats.add_list_items(items.len());
                }
                let tag = match kind {
                    ListKind::Ordered => "ol",
                    ListKind::Unordered => "ul",
                };
                output.push_str(&format!("<{}>\n", tag));
                for item in items {
                    output.push_str("<li>");
                    self.render_children(output, item);
                    if output.ends_with('\n') {
                        output.pop();
                    }
                    output.push_str("</li>\n");
                }
                output.push_str(&format!("</{}>\n", tag));
            }
            DocumentNode::MathInline { source } => {
                if collect {
                    self.stats.add_math(false);
                }
                output.push_str(&self.options.typesetter.typeset_inline(source));
            }
            DocumentNode::MathDisplay { source } => {
                if collect {
                    self.stats.add_math(true);
                }
                output.push_str(&self.options.typesetter.typeset_display(source));
                output.push('\n');
            }
            DocumentNode::Image(image) => {
                if collect {
                    self.stats.add_image();
                }
                self.render_image(output, image);
            }
            DocumentNode::Emphasis { style, children } => {
                let tag = match style {
                    EmphasisStyle::Strong => "strong",
                    EmphasisStyle::Italic => "em",
                    EmphasisStyle::Underline => "u",
                    EmphasisStyle::Strike => "del",
                };
                output.push_str(&format!("<{}>", tag));
                self.render_children(output, children);
                output.push_str(&format!("</{}>", tag));
            }
            DocumentNode::LineBreak => output.push_str("<br>\n"),
            DocumentNode::Code { source } => {
                output.push_str("<code>");
                output.push_str(&escape_text(source));
                output.push_str("</code>");
            }
            DocumentNode::CodeBlock { language, source } => {
                match language {
                    Some(lang) => output.push_str(&format!(
                        "<pre><code class=\"language-{}\">",
                        escape_attr(lang)
                    )),
                    None => output.push_str("<pre><code>"),
                }
                output.push_str(&escape_text(source));
                output.push_str("</code></pre>\n");
            }
            DocumentNode::Link { url, children } => {
                output.push_str(&format!("<a href=\"{}\">", escape_attr(url)));
                self.render_children(output, children);
                output.push_str("</a>");
            }
            DocumentNode::BlockQuote { children } => {
                output.push_str("<blockquote>\n");
                self.render_children(output, children);
                output.push_str("</blockquote>\n");
            }
            DocumentNode::Rule => output.push_str("<hr>\n"),
            DocumentNode::Text { text } => {
                if collect {
                    self.stats.count_text(text);
                }
                output.push_str(&escape_text(text));
            }
            DocumentNode::Raw { html } => output.push_str(html),
        }
    }

    fn render_image(&self, output: &mut String, image: &ImageNode) {
        let src = format!("{}{}", self.options.image_path_prefix, image.path);
        output.push_str(&format!(
            "<img class=\"lesson-image\" src=\"{}\" alt=\"\" style=\"{}\">",
            escape_attr(&src),
            image.style()
        ));
    }
}

/// Render a node sequence to HTML.
pub fn render_nodes(nodes: &[DocumentNode], options: &RenderOptions) -> String {
    HtmlRenderer::new(options).render(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Length, SectionCategory};

    #[test]
    fn test_escape() {
        assert_eq!(escape_text("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(escape_attr("\"x\""), "&quot;x&quot;");
    }

    #[test]
    fn test_section_markup() {
        let nodes = vec![DocumentNode::section(
            SectionCategory::Theorem,
            vec![
                DocumentNode::heading(2, "Théorème"),
                DocumentNode::paragraph("Énoncé"),
            ],
        )];
        let html = render_nodes(&nodes, &RenderOptions::default());
        assert_eq!(
            html,
            "<section class=\"section section-theorem\" data-category=\"theorem\">\n<h2>Théorème</h2>\n<p>Énoncé</p>\n</section>"
        );
    }

    #[test]
    fn test_image_with_prefix_and_style() {
        let mut image = ImageNode::new("img.png");
        image.width = Some(Length::Percent(50.0));
        let options = RenderOptions::new().with_image_prefix("/media/");
        let html = render_nodes(&[DocumentNode::Image(image)], &options);
        assert!(html.contains("src=\"/media/img.png\""));
        assert!(html.contains("width: 50%"));
        assert!(html.contains("max-width: 100%"));
    }

    #[test]
    fn test_list_markup() {
        let nodes = vec![DocumentNode::List {
            kind: ListKind::Ordered,
            items: vec![vec![DocumentNode::text("a")], vec![DocumentNode::text("b")]],
        }];
        let html = render_nodes(&nodes, &RenderOptions::default());
        assert_eq!(html, "<ol>\n<li>a</li>\n<li>b</li>\n</ol>");
    }

    #[test]
    fn test_stats_collected() {
        let nodes = vec![
            DocumentNode::heading(2, "Exemple"),
            DocumentNode::Paragraph {
                children: vec![
                    DocumentNode::text("Soit "),
                    DocumentNode::MathInline {
                        source: "x".to_string(),
                    },
                ],
            },
        ];
        let options = RenderOptions::new().with_stats(true);
        let (_, stats) = HtmlRenderer::new(&options).render_with_stats(&nodes);
        assert_eq!(stats.heading_count, 1);
        assert_eq!(stats.paragraph_count, 1);
        assert_eq!(stats.inline_math_count, 1);
    }
}
