//! Generic markup parse into a document tree.
//!
//! The markup engine is consumed as a black box: its event stream is folded
//! into [`DocumentNode`]s with a stack of open frames. Every start event
//! pushes a frame and every end event pops one. Underline frames come from
//! inline `<u>` markup rather than start events, so an end event first
//! closes any underline left open inside the frame it ends.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};

use super::options::ParseOptions;
use crate::model::{DocumentNode, EmphasisStyle, ImageNode, ListKind};

const UNDERLINE_OPEN: &str = "<u>";
const UNDERLINE_CLOSE: &str = "</u>";

/// Kind of an open frame.
#[derive(Debug)]
enum Frame {
    Root,
    Paragraph,
    Heading(u8),
    BlockQuote,
    List(ListKind),
    Item,
    Emphasis(EmphasisStyle),
    Link(String),
    Image(String),
    CodeBlock(Option<String>),
    Html,
    Other,
}

#[derive(Debug)]
struct OpenFrame {
    frame: Frame,
    children: Vec<DocumentNode>,
    items: Vec<Vec<DocumentNode>>,
}

impl OpenFrame {
    fn new(frame: Frame) -> Self {
        Self {
            frame,
            children: Vec::new(),
            items: Vec::new(),
        }
    }
}

/// Folds parser events into a node tree.
struct TreeBuilder {
    stack: Vec<OpenFrame>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![OpenFrame::new(Frame::Root)],
        }
    }

    fn push_node(&mut self, node: DocumentNode) {
        if let Some(top) = self.stack.last_mut() {
            top.children.push(node);
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        let frame = match tag {
            Tag::Paragraph => Frame::Paragraph,
            Tag::Heading { level, .. } => Frame::Heading(heading_level(level)),
            Tag::BlockQuote(..) => Frame::BlockQuote,
            Tag::List(Some(_)) => Frame::List(ListKind::Ordered),
            Tag::List(None) => Frame::List(ListKind::Unordered),
            Tag::Item => Frame::Item,
            Tag::Emphasis => Frame::Emphasis(EmphasisStyle::Italic),
            Tag::Strong => Frame::Emphasis(EmphasisStyle::Strong),
            Tag::Strikethrough => Frame::Emphasis(EmphasisStyle::Strike),
            Tag::Link { dest_url, .. } => Frame::Link(dest_url.to_string()),
            Tag::Image { dest_url, .. } => Frame::Image(dest_url.to_string()),
            Tag::CodeBlock(CodeBlockKind::Fenced(lang)) if !lang.is_empty() => {
                Frame::CodeBlock(Some(lang.to_string()))
            }
            Tag::CodeBlock(_) => Frame::CodeBlock(None),
            Tag::HtmlBlock => Frame::Html,
            _ => Frame::Other,
        };
        self.stack.push(OpenFrame::new(frame));
    }

    fn close(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        let Some(open) = self.stack.pop() else {
            return;
        };
        let OpenFrame {
            frame,
            children,
            items,
        } = open;

        match frame {
            Frame::Root => {}
            Frame::Paragraph => {
                for node in split_display_math(children) {
                    self.push_node(node);
                }
            }
            Frame::Heading(level) => self.push_node(DocumentNode::Heading { level, children }),
            Frame::BlockQuote => self.push_node(DocumentNode::BlockQuote { children }),
            Frame::List(kind) => self.push_node(DocumentNode::List { kind, items }),
            Frame::Item => {
                let in_list = matches!(self.stack.last().map(|f| &f.frame), Some(Frame::List(_)));
                if in_list {
                    if let Some(parent) = self.stack.last_mut() {
                        parent.items.push(children);
                    }
                } else {
                    self.extend(children);
                }
            }
            Frame::Emphasis(style) => self.push_node(DocumentNode::Emphasis { style, children }),
            Frame::Link(url) => self.push_node(DocumentNode::Link { url, children }),
            Frame::Image(url) => self.push_node(DocumentNode::Image(ImageNode::new(url))),
            Frame::CodeBlock(language) => {
                let source = crate::model::plain_text_of(&children);
                self.push_node(DocumentNode::CodeBlock { language, source });
            }
            Frame::Html | Frame::Other => self.extend(children),
        }
    }

    fn extend(&mut self, nodes: Vec<DocumentNode>) {
        if let Some(top) = self.stack.last_mut() {
            top.children.extend(nodes);
        }
    }

    fn underline_open(&self) -> bool {
        matches!(
            self.stack.last().map(|f| &f.frame),
            Some(Frame::Emphasis(EmphasisStyle::Underline))
        )
    }

    /// Close the frame opened by the start event matching this end event.
    fn end(&mut self) {
        while self.underline_open() {
            self.close();
        }
        self.close();
    }

    fn inline_html(&mut self, html: &str) {
        match html.trim() {
            UNDERLINE_OPEN => self
                .stack
                .push(OpenFrame::new(Frame::Emphasis(EmphasisStyle::Underline))),
            UNDERLINE_CLOSE if self.underline_open() => self.close(),
            // Its `<u>` was closed with an earlier block
            UNDERLINE_CLOSE => {}
            _ => self.push_node(DocumentNode::Raw {
                html: html.to_string(),
            }),
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(_) => self.end(),
            Event::Text(text) => self.push_node(DocumentNode::text(text.to_string())),
            Event::Code(code) => self.push_node(DocumentNode::Code {
                source: code.to_string(),
            }),
            Event::InlineMath(source) => self.push_node(DocumentNode::MathInline {
                source: source.to_string(),
            }),
            Event::DisplayMath(source) => self.push_node(DocumentNode::MathDisplay {
                source: source.trim().to_string(),
            }),
            Event::Html(html) => self.push_node(DocumentNode::Raw {
                html: html.to_string(),
            }),
            Event::InlineHtml(html) => self.inline_html(&html),
            Event::SoftBreak => self.push_node(DocumentNode::text("\n")),
            Event::HardBreak => self.push_node(DocumentNode::LineBreak),
            Event::Rule => self.push_node(DocumentNode::Rule),
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<DocumentNode> {
        // Unclosed underline frames from a stray `<u>`
        while self.stack.len() > 1 {
            self.close();
        }
        self.stack.pop().map(|root| root.children).unwrap_or_default()
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Lift display math out of a paragraph.
///
/// Display math is a block on the page, so a paragraph holding one is split
/// around it. Whitespace-only text left between the pieces is dropped.
fn split_display_math(children: Vec<DocumentNode>) -> Vec<DocumentNode> {
    if !children
        .iter()
        .any(|n| matches!(n, DocumentNode::MathDisplay { .. }))
    {
        return vec![DocumentNode::Paragraph { children }];
    }

    let mut blocks = Vec::new();
    let mut run: Vec<DocumentNode> = Vec::new();
    for node in children {
        if matches!(node, DocumentNode::MathDisplay { .. }) {
            flush_run(&mut run, &mut blocks);
            blocks.push(node);
        } else {
            run.push(node);
        }
    }
    flush_run(&mut run, &mut blocks);
    blocks
}

fn flush_run(run: &mut Vec<DocumentNode>, blocks: &mut Vec<DocumentNode>) {
    let blank = run.iter().all(|n| match n {
        DocumentNode::Text { text } => text.trim().is_empty(),
        DocumentNode::LineBreak => true,
        _ => false,
    });
    let children = std::mem::take(run);
    if !blank {
        blocks.push(DocumentNode::Paragraph { children });
    }
}

/// Parse normalized markup into a top-level node sequence.
pub fn parse_markdown(text: &str, options: &ParseOptions) -> Vec<DocumentNode> {
    let mut flags = Options::ENABLE_MATH;
    if options.strikethrough {
        flags.insert(Options::ENABLE_STRIKETHROUGH);
    }

    let mut builder = TreeBuilder::new();
    for event in Parser::new_ext(text, flags) {
        builder.event(event);
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Vec<DocumentNode> {
        parse_markdown(text, &ParseOptions::default())
    }

    #[test]
    fn test_headings_and_paragraphs() {
        let nodes = parse("## Titre\n\nUn paragraphe.");
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].heading_level(), Some(2));
        assert_eq!(nodes[0].plain_text(), "Titre");
        assert!(matches!(nodes[1], DocumentNode::Paragraph { .. }));
    }

    #[test]
    fn test_unordered_list_items() {
        let nodes = parse("- a\n- b");
        match &nodes[0] {
            DocumentNode::List { kind, items } => {
                assert_eq!(*kind, ListKind::Unordered);
                assert_eq!(items.len(), 2);
                assert_eq!(crate::model::plain_text_of(&items[1]), "b");
            }
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_inline_math_and_emphasis() {
        let nodes = parse("Soit **$x$** réel");
        let children = nodes[0].children();
        assert!(children.iter().any(|n| matches!(
            n,
            DocumentNode::Emphasis {
                style: EmphasisStyle::Strong,
                ..
            }
        )));
        assert_eq!(nodes[0].plain_text(), "Soit x réel");
    }

    #[test]
    fn test_display_math_is_lifted() {
        let nodes = parse("Avant\n$$a^2 + b^2$$\nAprès");
        assert_eq!(nodes.len(), 3);
        assert_eq!(
            nodes[1],
            DocumentNode::MathDisplay {
                source: "a^2 + b^2".to_string()
            }
        );
    }

    #[test]
    fn test_lone_display_math_is_block() {
        let nodes = parse("$$x$$");
        assert_eq!(
            nodes,
            vec![DocumentNode::MathDisplay {
                source: "x".to_string()
            }]
        );
    }

    #[test]
    fn test_underline_html_becomes_emphasis() {
        let nodes = parse("un <u>mot</u> souligné");
        let children = nodes[0].children();
        assert!(children.iter().any(|n| matches!(
            n,
            DocumentNode::Emphasis {
                style: EmphasisStyle::Underline,
                ..
            }
        )));
    }

    #[test]
    fn test_underline_across_paragraphs_stays_inside_first() {
        let nodes = parse("<u>a\n\nb</u>\n\n## Exemple\n\nx");
        assert_eq!(nodes.len(), 4);
        assert!(matches!(
            nodes[0].children()[0],
            DocumentNode::Emphasis {
                style: EmphasisStyle::Underline,
                ..
            }
        ));
        assert_eq!(nodes[1].plain_text(), "b");
        assert!(!nodes[1]
            .children()
            .iter()
            .any(|n| matches!(n, DocumentNode::Raw { .. })));
        assert_eq!(nodes[2].heading_level(), Some(2));
        assert!(matches!(nodes[3], DocumentNode::Paragraph { .. }));
    }

    #[test]
    fn test_hard_break() {
        let nodes = parse("ligne  \nsuite");
        assert!(nodes[0]
            .children()
            .iter()
            .any(|n| matches!(n, DocumentNode::LineBreak)));
    }

    #[test]
    fn test_html_block_is_raw() {
        let nodes = parse("<details class=\"solution\">\n<summary>Solution</summary>\n\nCorps\n\n</details>");
        assert!(matches!(nodes[0], DocumentNode::Raw { .. }));
        assert!(nodes
            .iter()
            .any(|n| matches!(n, DocumentNode::Paragraph { .. })));
    }
}
