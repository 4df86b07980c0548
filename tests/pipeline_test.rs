//! End-to-end tests for the rendering pipeline.

use pretty_assertions::assert_eq;

use lessonmark::render::{self, RenderOptions};
use lessonmark::{
    parse_text, AuthoredDocument, DocumentNode, Length, ListKind, SectionCategory,
    StructuredBlock, StructuredDocument,
};

fn categories(nodes: &[DocumentNode]) -> Vec<SectionCategory> {
    nodes.iter().filter_map(|n| n.category()).collect()
}

#[test]
fn test_itemize_becomes_unordered_list() {
    let nodes = parse_text("\\begin{itemize}\\item a\\item b\\end{itemize}");
    assert_eq!(nodes.len(), 1);
    match &nodes[0] {
        DocumentNode::List { kind, items } => {
            assert_eq!(*kind, ListKind::Unordered);
            let texts: Vec<String> = items
                .iter()
                .map(|item| lessonmark::model::plain_text_of(item))
                .collect();
            assert_eq!(texts, vec!["a".to_string(), "b".to_string()]);
        }
        other => panic!("expected a list, got {:?}", other),
    }
}

#[test]
fn test_figure_macro_becomes_sized_image() {
    let nodes = parse_text("\\figure{img.png}{width=0.5\\linewidth}");
    let image = nodes[0]
        .children()
        .into_iter()
        .find_map(|n| match n {
            DocumentNode::Image(image) => Some(image.clone()),
            _ => None,
        })
        .expect("image node");
    assert_eq!(image.path, "img.png");
    assert_eq!(image.width, Some(Length::Percent(50.0)));
    assert!(image.style().contains("width: 50%"));
    assert!(image.style().contains("max-width: 100%"));
}

#[test]
fn test_theorem_then_example_sections() {
    let text = "\\section{Théorème de Pythagore}\n\
                Dans un triangle rectangle, le carré de l'hypoténuse...\n\n\
                On a donc $c^2 = a^2 + b^2$.\n\n\
                \\section{Exemple}\n\
                Soit un triangle de côtés 3, 4 et 5.";
    let nodes = parse_text(text);
    assert_eq!(
        categories(&nodes),
        vec![SectionCategory::Theorem, SectionCategory::Example]
    );
    match &nodes[0] {
        DocumentNode::Section { children, .. } => {
            assert_eq!(children.len(), 3);
            assert!(children[0].is_heading());
        }
        other => panic!("expected a section, got {:?}", other),
    }
}

#[test]
fn test_delimiter_variants_render_alike() {
    let options = RenderOptions::default();
    let a = render::to_html(&AuthoredDocument::text("Soit \\(x\\) et \\[y\\]"), &options);
    let b = render::to_html(&AuthoredDocument::text("Soit $x$ et $$y$$"), &options);
    assert_eq!(a, b);
    assert!(a.contains("math-inline"));
    assert!(a.contains("math-display"));
}

#[test]
fn test_equation_environment_is_display_math() {
    let nodes = parse_text("\\begin{equation}\nE = mc^2\n\\end{equation}");
    assert!(matches!(nodes[0], DocumentNode::MathDisplay { .. }));
    assert_eq!(nodes[0].plain_text(), "E = mc^2");
}

#[test]
fn test_content_before_first_heading_stays_top_level() {
    let nodes = parse_text("Préambule.\n\n\\section{Définition}\nUn mot.");
    assert!(matches!(nodes[0], DocumentNode::Paragraph { .. }));
    assert_eq!(categories(&nodes), vec![SectionCategory::Definition]);
}

#[test]
fn test_structured_document_renders_like_text() {
    let doc = StructuredDocument::new()
        .with_title("Les triangles")
        .with_block(StructuredBlock::Theorem {
            name: Some("Pythagore".to_string()),
            statement: "$a^2+b^2=c^2$".to_string(),
            proof: None,
        })
        .with_block(StructuredBlock::Exercise {
            statement: "Calculer $c$.".to_string(),
            solution: Some("$c = 5$".to_string()),
        });
    let doc = AuthoredDocument::from(doc);

    let result = render::to_html_with_stats(&doc, &RenderOptions::default());
    assert_eq!(result.title.as_deref(), Some("Les triangles"));
    assert_eq!(result.stats.sections_of(SectionCategory::Theorem), 1);
    assert_eq!(result.stats.sections_of(SectionCategory::Exercise), 1);
    assert!(result.html.contains("<details class=\"solution\">"));
}

#[test]
fn test_structured_document_from_json() {
    let json = r#"{
        "title": "Fractions",
        "kind": "lesson",
        "blocks": [
            {"type": "definition", "term": "Fraction", "body": "Un quotient $\\frac{a}{b}$."},
            {"type": "alert", "body": "$b \\neq 0$"}
        ]
    }"#;
    let doc = AuthoredDocument::from(StructuredDocument::from_json(json).unwrap());
    let nodes = render::parse_document(&doc, &RenderOptions::default());
    assert_eq!(
        categories(&nodes),
        vec![SectionCategory::Definition, SectionCategory::Alert]
    );
}

#[test]
fn test_malformed_input_is_rendered_not_refused() {
    let html = lessonmark::to_html("\\textbf{ouvert et $x + \\frac{1}{2$");
    assert!(!html.is_empty());
}

#[test]
fn test_page_contains_body_and_agent() {
    let doc = AuthoredDocument::text("\\section{Exemple}\n$x$");
    let page = render::render_page(
        &doc,
        &RenderOptions::default(),
        &render::PageOptions::default(),
    );
    assert!(page.contains("section-example"));
    assert!(page.contains(lessonmark::capture::READINESS_MARKER_ID));
    assert!(page.contains("MathJax"));
}

#[test]
fn test_underline_across_paragraphs_keeps_later_sections() {
    let nodes = parse_text(
        "\\section{Introduction}\n\\underline{a\n\nb}\n\n\\section{Exemple}\n\nx",
    );
    assert_eq!(
        categories(&nodes),
        vec![SectionCategory::Introduction, SectionCategory::Example]
    );
    assert!(!render::render_nodes(&nodes, &RenderOptions::default()).contains("b</u>"));
}

fn structured_categories(block: StructuredBlock) -> Vec<SectionCategory> {
    let doc = AuthoredDocument::Structured(StructuredDocument::new().with_block(block));
    categories(&render::parse_document(&doc, &RenderOptions::default()))
}

#[test]
fn test_structured_label_decides_category_over_name() {
    let cases = vec![
        (
            StructuredBlock::Definition {
                term: Some("Exemple de fonction".to_string()),
                body: "Une règle.".to_string(),
            },
            SectionCategory::Definition,
        ),
        (
            StructuredBlock::Theorem {
                name: Some("Formule des probabilités totales".to_string()),
                statement: "$P(A) = \\sum P(A \\cap B_i)$".to_string(),
                proof: None,
            },
            SectionCategory::Theorem,
        ),
        (
            StructuredBlock::Formula {
                name: Some("Exercice classique".to_string()),
                body: "$(a+b)^2 = a^2 + 2ab + b^2$".to_string(),
            },
            SectionCategory::Formula,
        ),
        (
            StructuredBlock::Example {
                title: Some("Application du théorème".to_string()),
                body: "Soit $x = 3$.".to_string(),
            },
            SectionCategory::Example,
        ),
    ];

    for (block, expected) in cases {
        assert_eq!(structured_categories(block), vec![expected]);
    }
}

#[test]
fn test_padded_dollar_math_is_not_parsed_as_markup() {
    let html = render::to_html(
        &AuthoredDocument::text("Soit $ a *b* c $ ici."),
        &RenderOptions::default(),
    );
    assert!(html.contains("<span class=\"math math-inline\">\\(a *b* c\\)</span>"));
    assert!(!html.contains("<em>"));
}
