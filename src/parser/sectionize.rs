//! Grouping of heading runs into flat, categorized sections.

use unicode_normalization::UnicodeNormalization;

use super::options::SectionizeOptions;
use crate::model::{DocumentNode, SectionCategory, LABEL_SEPARATOR};

/// Keywords tested in order against lowercased heading text.
///
/// The first keyword found anywhere in the heading decides the category.
pub const SECTION_KEYWORDS: &[(&str, SectionCategory)] = &[
    ("introduction", SectionCategory::Introduction),
    ("définition", SectionCategory::Definition),
    ("definition", SectionCategory::Definition),
    ("vocabulaire", SectionCategory::Definition),
    ("théorème", SectionCategory::Theorem),
    ("theorem", SectionCategory::Theorem),
    ("propriété", SectionCategory::Theorem),
    ("property", SectionCategory::Theorem),
    ("lemme", SectionCategory::Theorem),
    ("lemma", SectionCategory::Theorem),
    ("corollaire", SectionCategory::Theorem),
    ("corollary", SectionCategory::Theorem),
    ("formule", SectionCategory::Formula),
    ("formula", SectionCategory::Formula),
    ("exemple", SectionCategory::Example),
    ("example", SectionCategory::Example),
    ("exercice", SectionCategory::Exercise),
    ("exercise", SectionCategory::Exercise),
    ("résumé", SectionCategory::Summary),
    ("summary", SectionCategory::Summary),
    ("à retenir", SectionCategory::Summary),
    ("conclusion", SectionCategory::Summary),
    ("attention", SectionCategory::Alert),
    ("remarque", SectionCategory::Alert),
    ("warning", SectionCategory::Alert),
];

/// Category for a heading text.
///
/// In a `label : name` heading the label decides; the name is only searched
/// when the label names no category.
pub fn categorize(heading: &str) -> SectionCategory {
    let normalized: String = heading.nfc().collect();
    if let Some((label, _)) = normalized.split_once(LABEL_SEPARATOR) {
        let category = match_keywords(label);
        if category != SectionCategory::Generic {
            return category;
        }
    }
    match_keywords(&normalized)
}

fn match_keywords(text: &str) -> SectionCategory {
    let lowered = text.to_lowercase();
    SECTION_KEYWORDS
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, category)| *category)
        .unwrap_or_default()
}

/// Groups top-level nodes into sections.
#[derive(Debug, Clone, Default)]
pub struct Sectionizer {
    options: SectionizeOptions,
}

impl Sectionizer {
    /// Create a sectionizer with the given options.
    pub fn new(options: SectionizeOptions) -> Self {
        Self { options }
    }

    /// Run one pass over the top-level sequence.
    ///
    /// Content before the first eligible heading stays at the top level.
    /// An existing section closes the open one and passes through, so
    /// sections never nest and a second pass changes nothing.
    pub fn sectionize(&self, nodes: Vec<DocumentNode>) -> Vec<DocumentNode> {
        if !self.options.enabled {
            return nodes;
        }

        let mut output = Vec::with_capacity(nodes.len());
        let mut open: Option<(SectionCategory, Vec<DocumentNode>)> = None;

        for node in nodes {
            let eligible = node
                .heading_level()
                .map(|level| self.options.is_eligible(level))
                .unwrap_or(false);

            if eligible {
                flush(&mut open, &mut output);
                let category = categorize(&node.plain_text());
                open = Some((category, vec![node]));
            } else if node.is_section() {
                flush(&mut open, &mut output);
                output.push(node);
            } else if let Some((_, children)) = open.as_mut() {
                children.push(node);
            } else {
                output.push(node);
            }
        }
        flush(&mut open, &mut output);

        log::debug!(
            "sectionizer: {} top-level nodes, {} sections",
            output.len(),
            output.iter().filter(|n| n.is_section()).count()
        );
        output
    }
}

fn flush(open: &mut Option<(SectionCategory, Vec<DocumentNode>)>, output: &mut Vec<DocumentNode>) {
    if let Some((category, children)) = open.take() {
        output.push(DocumentNode::section(category, children));
    }
}

/// Sectionize with default options.
pub fn sectionize(nodes: Vec<DocumentNode>) -> Vec<DocumentNode> {
    Sectionizer::default().sectionize(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theorem_then_example() {
        let nodes = vec![
            DocumentNode::heading(2, "Théorème de Pythagore"),
            DocumentNode::paragraph("Premier."),
            DocumentNode::paragraph("Second."),
            DocumentNode::heading(2, "Exemple"),
        ];
        let out = sectionize(nodes);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].category(), Some(SectionCategory::Theorem));
        assert_eq!(out[0].children().len(), 3);
        assert_eq!(out[1].category(), Some(SectionCategory::Example));
    }

    #[test]
    fn test_preamble_passes_through() {
        let nodes = vec![
            DocumentNode::heading(1, "Titre"),
            DocumentNode::paragraph("Intro libre"),
            DocumentNode::heading(3, "Remarque"),
        ];
        let out = sectionize(nodes);
        assert_eq!(out.len(), 3);
        assert!(out[0].is_heading());
        assert_eq!(out[2].category(), Some(SectionCategory::Alert));
    }

    #[test]
    fn test_ineligible_heading_stays_in_section() {
        let nodes = vec![
            DocumentNode::heading(2, "Définition"),
            DocumentNode::heading(4, "Détail"),
        ];
        let out = sectionize(nodes);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].children().len(), 2);
    }

    #[test]
    fn test_categorize_case_insensitive_and_fallback() {
        assert_eq!(categorize("THÉORÈME"), SectionCategory::Theorem);
        assert_eq!(categorize("Exercice 3"), SectionCategory::Exercise);
        assert_eq!(categorize("Pour aller plus loin"), SectionCategory::Generic);
    }

    #[test]
    fn test_categorize_decomposed_accents() {
        // "Théorème" spelled with combining accents
        assert_eq!(categorize("The\u{301}ore\u{300}me"), SectionCategory::Theorem);
    }

    #[test]
    fn test_label_decides_over_name() {
        assert_eq!(
            categorize("Exemple : Application du théorème"),
            SectionCategory::Example
        );
        assert_eq!(
            categorize("Définition : Exercice type"),
            SectionCategory::Definition
        );
        assert_eq!(
            categorize("Partie 1 : Définitions"),
            SectionCategory::Definition
        );
    }

    #[test]
    fn test_second_pass_is_noop() {
        let nodes = vec![
            DocumentNode::paragraph("avant"),
            DocumentNode::heading(2, "Introduction"),
            DocumentNode::paragraph("corps"),
        ];
        let once = sectionize(nodes);
        let twice = sectionize(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_disabled_returns_input() {
        let nodes = vec![DocumentNode::heading(2, "Exemple")];
        let out = Sectionizer::new(SectionizeOptions::disabled()).sectionize(nodes.clone());
        assert_eq!(out, nodes);
    }
}
