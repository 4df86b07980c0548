//! Property tests for the sectionizer, the macro normalizer and the sanitizer.

use proptest::prelude::*;

use lessonmark::model::count_nodes;
use lessonmark::normalize::{normalize_macros, split};
use lessonmark::parser::sectionize;
use lessonmark::{sanitize, DocumentNode};

const HEADINGS: &[&str] = &[
    "Introduction",
    "Définition",
    "Théorème de Thalès",
    "Exemple 2",
    "Exercice",
    "Résumé",
    "Attention",
    "Autre chose",
];

fn node_strategy() -> impl Strategy<Value = DocumentNode> {
    prop_oneof![
        (1u8..=4, 0..HEADINGS.len()).prop_map(|(level, i)| DocumentNode::heading(level, HEADINGS[i])),
        "[a-z ]{1,12}".prop_map(DocumentNode::paragraph),
        Just(DocumentNode::Rule),
        Just(DocumentNode::MathDisplay {
            source: "x^2".to_string()
        }),
    ]
}

fn section_count(nodes: &[DocumentNode]) -> usize {
    nodes.iter().filter(|n| n.is_section()).count()
}

proptest! {
    #[test]
    fn test_sections_are_flat(nodes in prop::collection::vec(node_strategy(), 0..40)) {
        let output = sectionize(nodes);
        for node in &output {
            if let DocumentNode::Section { children, .. } = node {
                prop_assert!(children.iter().all(|child| !child.is_section()));
            }
        }
    }

    #[test]
    fn test_node_count_conserved(nodes in prop::collection::vec(node_strategy(), 0..40)) {
        let before = count_nodes(&nodes);
        let output = sectionize(nodes);
        prop_assert_eq!(count_nodes(&output) - section_count(&output), before);
    }

    #[test]
    fn test_sectionize_twice_is_noop(nodes in prop::collection::vec(node_strategy(), 0..40)) {
        let once = sectionize(nodes);
        let twice = sectionize(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_sanitize_idempotent(text in "[a-z0-9 {}$()^+=\\\\\t\r\n\u{0C}\u{08}\u{FFFD}]{0,48}") {
        let once = sanitize(&text).text;
        let twice = sanitize(&once).text;
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn test_macro_normalizer_keeps_math_bytes(
        prose in prop::collection::vec("[a-zA-Z ,.]{0,10}", 1..6),
        math in prop::collection::vec("[a-z0-9+^_ ]{1,8}", 1..6),
    ) {
        let mut text = String::new();
        let mut expected = Vec::new();
        for (i, body) in math.iter().enumerate() {
            let piece = &prose[i % prose.len()];
            text.push_str("\\textbf{");
            text.push_str(piece);
            text.push_str("} ");
            text.push('$');
            text.push_str(body);
            text.push_str("$ ");
            expected.push(body.clone());
        }

        let normalized = normalize_macros(&text);
        let bodies: Vec<String> = split(&normalized)
            .into_iter()
            .filter(|s| s.is_math())
            .map(|s| s.body().to_string())
            .collect();
        prop_assert_eq!(bodies, expected);
    }

    #[test]
    fn test_macro_normalizer_idempotent(
        items in prop::collection::vec("[a-z]{1,8}", 1..5),
        bold in "[a-z ]{1,10}",
    ) {
        let text = format!(
            "\\section{{Exemple}}\n\\begin{{itemize}}\\item {}\\end{{itemize}}\n\\textbf{{{}}}",
            items.join("\\item "),
            bold
        );
        let once = normalize_macros(&text);
        prop_assert_eq!(normalize_macros(&once), once.clone());
        prop_assert!(!once.contains("\\item"));
        prop_assert!(!once.contains("\\textbf"));
    }
}
