//! JSON dump of document trees.

use crate::error::{Error, Result};
use crate::model::DocumentNode;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a node tree to JSON.
pub fn to_json(nodes: &[DocumentNode], format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(nodes),
        JsonFormat::Compact => serde_json::to_string(nodes),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SectionCategory;

    #[test]
    fn test_to_json_pretty() {
        let nodes = vec![DocumentNode::section(
            SectionCategory::Example,
            vec![DocumentNode::heading(2, "Exemple")],
        )];

        let json = to_json(&nodes, JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"section\""));
        assert!(json.contains("\"example\""));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact() {
        let nodes = vec![DocumentNode::paragraph("Bonjour")];
        let json = to_json(&nodes, JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
    }
}
