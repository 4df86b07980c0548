//! Authored document types and the projection of structured records into
//! macro text.

use serde::{Deserialize, Serialize};

/// A document as authored, before it enters the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", content = "content", rename_all = "lowercase")]
pub enum AuthoredDocument {
    /// Free text in the macro dialect
    Text(String),

    /// A structured record with named fields
    Structured(StructuredDocument),
}

impl AuthoredDocument {
    /// Create a text document.
    pub fn text(text: impl Into<String>) -> Self {
        AuthoredDocument::Text(text.into())
    }

    /// The document as macro text.
    ///
    /// Structured records are projected so that both authoring styles share
    /// one rendering path.
    pub fn to_macro_text(&self) -> String {
        match self {
            AuthoredDocument::Text(text) => text.clone(),
            AuthoredDocument::Structured(doc) => doc.to_macro_text(),
        }
    }

    /// Document title, if the authoring style carries one.
    pub fn title(&self) -> Option<&str> {
        match self {
            AuthoredDocument::Text(_) => None,
            AuthoredDocument::Structured(doc) => doc.title.as_deref(),
        }
    }
}

impl From<String> for AuthoredDocument {
    fn from(text: String) -> Self {
        AuthoredDocument::Text(text)
    }
}

impl From<&str> for AuthoredDocument {
    fn from(text: &str) -> Self {
        AuthoredDocument::Text(text.to_string())
    }
}

impl From<StructuredDocument> for AuthoredDocument {
    fn from(doc: StructuredDocument) -> Self {
        AuthoredDocument::Structured(doc)
    }
}

/// Kind of educational document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// A lesson
    #[default]
    Lesson,
    /// An exercise sheet
    Exercise,
    /// A teacher's lesson plan
    LessonPlan,
}

/// A document authored as named fields rather than free text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredDocument {
    /// Document title
    #[serde(default)]
    pub title: Option<String>,

    /// Document kind
    #[serde(default)]
    pub kind: DocumentKind,

    /// Content blocks in reading order
    #[serde(default)]
    pub blocks: Vec<StructuredBlock>,
}

impl StructuredDocument {
    /// Create an empty structured document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Append a block.
    pub fn with_block(mut self, block: StructuredBlock) -> Self {
        self.blocks.push(block);
        self
    }

    /// Parse a structured document from JSON.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Project the record into macro text.
    pub fn to_macro_text(&self) -> String {
        let mut builder = MacroTextBuilder::new();
        if let Some(ref title) = self.title {
            builder.push_title(title);
        }
        for block in &self.blocks {
            builder.push_block(block);
        }
        builder.finish()
    }
}

/// A named field of a structured document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StructuredBlock {
    /// Lesson introduction
    Introduction {
        /// Body text
        body: String,
    },
    /// A definition of a term
    Definition {
        /// Defined term
        #[serde(default)]
        term: Option<String>,
        /// Body text
        body: String,
    },
    /// A theorem with optional proof
    Theorem {
        /// Theorem name
        #[serde(default)]
        name: Option<String>,
        /// Statement
        statement: String,
        /// Proof
        #[serde(default)]
        proof: Option<String>,
    },
    /// A formula block
    Formula {
        /// Formula name
        #[serde(default)]
        name: Option<String>,
        /// Body text
        body: String,
    },
    /// A worked example
    Example {
        /// Example title
        #[serde(default)]
        title: Option<String>,
        /// Body text
        body: String,
    },
    /// An exercise with optional solution
    Exercise {
        /// Statement
        statement: String,
        /// Solution, rendered collapsed
        #[serde(default)]
        solution: Option<String>,
    },
    /// Summary of the lesson
    Summary {
        /// Body text
        body: String,
    },
    /// A warning or remark
    Alert {
        /// Body text
        body: String,
    },
    /// Free text inserted as-is
    Text {
        /// Body text
        body: String,
    },
}

/// Separator between a heading's label and its name, as in
/// `Théorème : Pythagore`.
pub const LABEL_SEPARATOR: &str = " : ";

/// Builds macro text from structured blocks.
///
/// Headings use the labels the sectionizer recognizes, so a projected
/// record sections exactly like hand-written text.
#[derive(Debug, Default)]
pub struct MacroTextBuilder {
    parts: Vec<String>,
    exercise_count: u32,
}

impl MacroTextBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the document title.
    pub fn push_title(&mut self, title: &str) {
        self.parts.push(format!("# {}", title.trim()));
    }

    /// Add one block.
    pub fn push_block(&mut self, block: &StructuredBlock) {
        match block {
            StructuredBlock::Introduction { body } => {
                self.push_section("Introduction", None, body);
            }
            StructuredBlock::Definition { term, body } => {
                self.push_section("Définition", term.as_deref(), body);
            }
            StructuredBlock::Theorem {
                name,
                statement,
                proof,
            } => {
                self.push_section("Théorème", name.as_deref(), statement);
                if let Some(proof) = proof {
                    self.parts
                        .push(format!("\\textit{{Démonstration.}} {}", proof.trim()));
                }
            }
            StructuredBlock::Formula { name, body } => {
                self.push_section("Formule", name.as_deref(), body);
            }
            StructuredBlock::Example { title, body } => {
                self.push_section("Exemple", title.as_deref(), body);
            }
            StructuredBlock::Exercise {
                statement,
                solution,
            } => {
                self.exercise_count += 1;
                let label = format!("Exercice {}", self.exercise_count);
                self.push_section(&label, None, statement);
                if let Some(solution) = solution {
                    self.parts.push(format!(
                        "\\begin{{solution}}\n{}\n\\end{{solution}}",
                        solution.trim()
                    ));
                }
            }
            StructuredBlock::Summary { body } => {
                self.push_section("Résumé", None, body);
            }
            StructuredBlock::Alert { body } => {
                self.push_section("Attention", None, body);
            }
            StructuredBlock::Text { body } => {
                let body = body.trim();
                if !body.is_empty() {
                    self.parts.push(body.to_string());
                }
            }
        }
    }

    fn push_section(&mut self, label: &str, name: Option<&str>, body: &str) {
        let heading = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => format!("\\section{{{}{}{}}}", label, LABEL_SEPARATOR, name),
            None => format!("\\section{{{}}}", label),
        };
        self.parts.push(heading);
        let body = body.trim();
        if !body.is_empty() {
            self.parts.push(body.to_string());
        }
    }

    /// Join the accumulated blocks.
    pub fn finish(self) -> String {
        self.parts.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_passthrough() {
        let doc = AuthoredDocument::text("\\section{Intro} Bonjour");
        assert_eq!(doc.to_macro_text(), "\\section{Intro} Bonjour");
        assert_eq!(doc.title(), None);
    }

    #[test]
    fn test_structured_projection() {
        let doc = StructuredDocument::new()
            .with_title("Le théorème de Pythagore")
            .with_block(StructuredBlock::Introduction {
                body: "Dans un triangle rectangle...".to_string(),
            })
            .with_block(StructuredBlock::Theorem {
                name: Some("Pythagore".to_string()),
                statement: "$a^2 + b^2 = c^2$".to_string(),
                proof: None,
            });

        let text = doc.to_macro_text();
        assert_eq!(
            text,
            "# Le théorème de Pythagore\n\n\\section{Introduction}\n\nDans un triangle rectangle...\n\n\\section{Théorème : Pythagore}\n\n$a^2 + b^2 = c^2$"
        );
    }

    #[test]
    fn test_exercises_are_numbered_with_collapsed_solution() {
        let doc = StructuredDocument::new()
            .with_block(StructuredBlock::Exercise {
                statement: "Calculer $2+2$.".to_string(),
                solution: Some("$4$".to_string()),
            })
            .with_block(StructuredBlock::Exercise {
                statement: "Calculer $3+3$.".to_string(),
                solution: None,
            });

        let text = doc.to_macro_text();
        assert!(text.contains("\\section{Exercice 1}"));
        assert!(text.contains("\\section{Exercice 2}"));
        assert!(text.contains("\\begin{solution}\n$4$\n\\end{solution}"));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "title": "Vecteurs",
            "kind": "lesson",
            "blocks": [
                {"type": "definition", "term": "Vecteur", "body": "Un objet."},
                {"type": "alert", "body": "Attention aux signes."}
            ]
        }"#;
        let doc = StructuredDocument::from_json(json).unwrap();
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(doc.kind, DocumentKind::Lesson);
        assert!(doc.to_macro_text().contains("\\section{Définition : Vecteur}"));
    }
}
