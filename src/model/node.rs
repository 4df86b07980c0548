//! Document tree types.

use super::ImageNode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A node in the parsed document tree.
///
/// Children are owned by value, so a tree is always acyclic and every node
/// has exactly one parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocumentNode {
    /// A heading (level 1-6)
    Heading {
        /// Heading level
        level: u8,
        /// Inline content
        children: Vec<DocumentNode>,
    },

    /// A paragraph of inline content
    Paragraph {
        /// Inline content
        children: Vec<DocumentNode>,
    },

    /// An ordered or unordered list
    List {
        /// List kind
        kind: ListKind,
        /// One child sequence per item
        items: Vec<Vec<DocumentNode>>,
    },

    /// Inline math span (source without delimiters)
    MathInline {
        /// Math source
        source: String,
    },

    /// Display math span (source without delimiters)
    MathDisplay {
        /// Math source
        source: String,
    },

    /// An embedded image with resolved sizing
    Image(ImageNode),

    /// A semantically tagged group of a heading and its content
    Section {
        /// Section category
        category: SectionCategory,
        /// Heading followed by its content
        children: Vec<DocumentNode>,
    },

    /// Emphasized inline content
    Emphasis {
        /// Emphasis kind
        style: EmphasisStyle,
        /// Inline content
        children: Vec<DocumentNode>,
    },

    /// A forced line break
    LineBreak,

    /// Inline code
    Code {
        /// Code text
        source: String,
    },

    /// A fenced or indented code block
    CodeBlock {
        /// Info string language, if any
        language: Option<String>,
        /// Code text
        source: String,
    },

    /// A hyperlink
    Link {
        /// Target URL
        url: String,
        /// Link text
        children: Vec<DocumentNode>,
    },

    /// A block quote
    BlockQuote {
        /// Quoted blocks
        children: Vec<DocumentNode>,
    },

    /// A thematic break
    Rule,

    /// Plain text leaf
    Text {
        /// The text content
        text: String,
    },

    /// Markup passed through verbatim
    Raw {
        /// Raw HTML
        html: String,
    },
}

impl DocumentNode {
    /// Create a text leaf.
    pub fn text(text: impl Into<String>) -> Self {
        DocumentNode::Text { text: text.into() }
    }

    /// Create a heading with plain text content.
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        DocumentNode::Heading {
            level: level.clamp(1, 6),
            children: vec![DocumentNode::text(text)],
        }
    }

    /// Create a paragraph with plain text content.
    pub fn paragraph(text: impl Into<String>) -> Self {
        DocumentNode::Paragraph {
            children: vec![DocumentNode::text(text)],
        }
    }

    /// Create a section container.
    pub fn section(category: SectionCategory, children: Vec<DocumentNode>) -> Self {
        DocumentNode::Section { category, children }
    }

    /// Heading level, if this node is a heading.
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            DocumentNode::Heading { level, .. } => Some(*level),
            _ => None,
        }
    }

    /// Check if this is a heading.
    pub fn is_heading(&self) -> bool {
        matches!(self, DocumentNode::Heading { .. })
    }

    /// Check if this is a section container.
    pub fn is_section(&self) -> bool {
        matches!(self, DocumentNode::Section { .. })
    }

    /// Section category, if this node is a section.
    pub fn category(&self) -> Option<SectionCategory> {
        match self {
            DocumentNode::Section { category, .. } => Some(*category),
            _ => None,
        }
    }

    /// Direct children in document order. List items are flattened.
    pub fn children(&self) -> Vec<&DocumentNode> {
        match self {
            DocumentNode::Heading { children, .. }
            | DocumentNode::Paragraph { children }
            | DocumentNode::Section { children, .. }
            | DocumentNode::Emphasis { children, .. }
            | DocumentNode::Link { children, .. }
            | DocumentNode::BlockQuote { children } => children.iter().collect(),
            DocumentNode::List { items, .. } => items.iter().flatten().collect(),
            _ => Vec::new(),
        }
    }

    /// Mutable access to the child sequences of this node.
    ///
    /// Lists expose one sequence per item.
    pub fn child_lists_mut(&mut self) -> Vec<&mut Vec<DocumentNode>> {
        match self {
            DocumentNode::Heading { children, .. }
            | DocumentNode::Paragraph { children }
            | DocumentNode::Section { children, .. }
            | DocumentNode::Emphasis { children, .. }
            | DocumentNode::Link { children, .. }
            | DocumentNode::BlockQuote { children } => vec![children],
            DocumentNode::List { items, .. } => items.iter_mut().collect(),
            _ => Vec::new(),
        }
    }

    /// Number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(DocumentNode::node_count)
            .sum::<usize>()
    }

    /// Get plain text content of the subtree.
    pub fn plain_text(&self) -> String {
        match self {
            DocumentNode::Text { text } => text.clone(),
            DocumentNode::Code { source } | DocumentNode::CodeBlock { source, .. } => {
                source.clone()
            }
            DocumentNode::MathInline { source } | DocumentNode::MathDisplay { source } => {
                source.clone()
            }
            DocumentNode::LineBreak => "\n".to_string(),
            DocumentNode::Image(image) => image.path.clone(),
            DocumentNode::Rule | DocumentNode::Raw { .. } => String::new(),
            DocumentNode::List { items, .. } => items
                .iter()
                .map(|item| plain_text_of(item))
                .collect::<Vec<_>>()
                .join("\n"),
            DocumentNode::Section { children, .. } | DocumentNode::BlockQuote { children } => {
                children
                    .iter()
                    .map(DocumentNode::plain_text)
                    .collect::<Vec<_>>()
                    .join("\n\n")
            }
            DocumentNode::Heading { children, .. }
            | DocumentNode::Paragraph { children }
            | DocumentNode::Emphasis { children, .. }
            | DocumentNode::Link { children, .. } => plain_text_of(children),
        }
    }
}

/// Concatenate the plain text of a node sequence.
pub fn plain_text_of(nodes: &[DocumentNode]) -> String {
    nodes.iter().map(DocumentNode::plain_text).collect()
}

/// Count every node in a sequence of trees.
pub fn count_nodes(nodes: &[DocumentNode]) -> usize {
    nodes.iter().map(DocumentNode::node_count).sum()
}

/// List kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    /// Numbered list
    Ordered,
    /// Bulleted list
    Unordered,
}

/// Inline emphasis kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmphasisStyle {
    /// Bold text
    Strong,
    /// Italic text
    Italic,
    /// Underlined text
    Underline,
    /// Strikethrough text
    Strike,
}

/// Semantic category of a section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionCategory {
    /// Lesson introduction
    Introduction,
    /// Definition block
    Definition,
    /// Theorem or property
    Theorem,
    /// Formula block
    Formula,
    /// Worked example
    Example,
    /// Exercise statement
    Exercise,
    /// Summary or recap
    Summary,
    /// Warning or remark
    Alert,
    /// Anything else
    #[default]
    Generic,
}

impl SectionCategory {
    /// All categories, in declaration order.
    pub const ALL: [SectionCategory; 9] = [
        SectionCategory::Introduction,
        SectionCategory::Definition,
        SectionCategory::Theorem,
        SectionCategory::Formula,
        SectionCategory::Example,
        SectionCategory::Exercise,
        SectionCategory::Summary,
        SectionCategory::Alert,
        SectionCategory::Generic,
    ];

    /// Lowercase name used in CSS classes and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionCategory::Introduction => "introduction",
            SectionCategory::Definition => "definition",
            SectionCategory::Theorem => "theorem",
            SectionCategory::Formula => "formula",
            SectionCategory::Example => "example",
            SectionCategory::Exercise => "exercise",
            SectionCategory::Summary => "summary",
            SectionCategory::Alert => "alert",
            SectionCategory::Generic => "generic",
        }
    }
}

impl fmt::Display for SectionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        let para = DocumentNode::Paragraph {
            children: vec![
                DocumentNode::text("Soit "),
                DocumentNode::MathInline {
                    source: "x".to_string(),
                },
                DocumentNode::Emphasis {
                    style: EmphasisStyle::Strong,
                    children: vec![DocumentNode::text(" réel")],
                },
            ],
        };
        assert_eq!(para.plain_text(), "Soit x réel");
    }

    #[test]
    fn test_node_count() {
        let list = DocumentNode::List {
            kind: ListKind::Unordered,
            items: vec![
                vec![DocumentNode::text("a")],
                vec![DocumentNode::text("b")],
            ],
        };
        assert_eq!(list.node_count(), 3);

        let section = DocumentNode::section(
            SectionCategory::Example,
            vec![DocumentNode::heading(2, "Exemple"), list],
        );
        assert_eq!(section.node_count(), 6);
    }

    #[test]
    fn test_heading_clamps_level() {
        let h = DocumentNode::heading(9, "Deep");
        assert_eq!(h.heading_level(), Some(6));
        assert!(h.is_heading());
        assert!(!h.is_section());
    }

    #[test]
    fn test_category_default_and_names() {
        assert_eq!(SectionCategory::default(), SectionCategory::Generic);
        assert_eq!(SectionCategory::Theorem.to_string(), "theorem");
        assert_eq!(SectionCategory::ALL.len(), 9);
    }

    #[test]
    fn test_serde_tagging() {
        let node = DocumentNode::MathInline {
            source: "a^2".to_string(),
        };
        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(json, r#"{"type":"math_inline","source":"a^2"}"#);

        let back: DocumentNode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
    }
}
