//! Validation findings, reports and sanitize results.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::options::ValidationOptions;

/// Kind of validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// A catalogued corrupted token
    CorruptedToken,
    /// A catalogued false identity
    FalseIdentity,
    /// An exact duplicate sentence
    RepeatedSentence,
    /// A malformed math span
    MalformedMath,
}

impl FindingKind {
    /// Whether a single finding of this kind rejects the content.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FindingKind::CorruptedToken | FindingKind::FalseIdentity)
    }

    /// Name used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingKind::CorruptedToken => "corrupted-token",
            FindingKind::FalseIdentity => "false-identity",
            FindingKind::RepeatedSentence => "repeated-sentence",
            FindingKind::MalformedMath => "malformed-math",
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFinding {
    /// Finding kind
    pub kind: FindingKind,
    /// Human-readable detail
    pub detail: String,
}

impl ValidationFinding {
    /// Create a finding.
    pub fn new(kind: FindingKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for ValidationFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.detail)
    }
}

/// Result of validating a text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// All findings in detection order
    pub findings: Vec<ValidationFinding>,
    /// Whether the content must be discarded and regenerated
    pub should_reject: bool,
}

impl ValidationReport {
    /// Build a report, deriving the verdict from the findings alone.
    ///
    /// Any fatal finding rejects; malformed-math findings reject once their
    /// count exceeds the configured threshold.
    pub fn from_findings(findings: Vec<ValidationFinding>, options: &ValidationOptions) -> Self {
        let fatal = findings.iter().any(|f| f.kind.is_fatal());
        let malformed = findings
            .iter()
            .filter(|f| f.kind == FindingKind::MalformedMath)
            .count();
        Self {
            should_reject: fatal || malformed > options.malformed_math_threshold,
            findings,
        }
    }

    /// Check if there are no findings at all.
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    /// Number of findings of a kind.
    pub fn count(&self, kind: FindingKind) -> usize {
        self.findings.iter().filter(|f| f.kind == kind).count()
    }

    /// Number of findings that reject on their own.
    pub fn fatal_count(&self) -> usize {
        self.findings.iter().filter(|f| f.kind.is_fatal()).count()
    }

    /// Serialize the report to pretty JSON.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Result of sanitizing a text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizeResult {
    /// Repaired text
    pub text: String,
    /// Whether any change was made
    pub was_modified: bool,
}
