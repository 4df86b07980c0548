//! Validation options and presets.

use serde::{Deserialize, Serialize};

/// Validation preset levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationPreset {
    /// Tolerates a few broken formulas and only flags long repeated sentences
    Lenient,
    /// Default thresholds
    #[default]
    Standard,
    /// Rejects on the first malformed formula
    Strict,
}

/// Options for the content validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Sentences must be longer than this (in characters) to be compared
    pub min_sentence_len: usize,

    /// Reject when malformed-math findings exceed this count
    pub malformed_math_threshold: usize,

    /// Look for repeated sentences
    pub check_repetition: bool,

    /// Check math spans for malformed macros
    pub check_math: bool,
}

impl ValidationOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create options from a preset.
    pub fn from_preset(preset: ValidationPreset) -> Self {
        match preset {
            ValidationPreset::Lenient => Self::lenient(),
            ValidationPreset::Standard => Self::standard(),
            ValidationPreset::Strict => Self::strict(),
        }
    }

    /// Lenient options.
    pub fn lenient() -> Self {
        Self {
            min_sentence_len: 40,
            malformed_math_threshold: 6,
            check_repetition: true,
            check_math: true,
        }
    }

    /// Standard options.
    pub fn standard() -> Self {
        Self {
            min_sentence_len: 20,
            malformed_math_threshold: 3,
            check_repetition: true,
            check_math: true,
        }
    }

    /// Strict options.
    pub fn strict() -> Self {
        Self {
            min_sentence_len: 12,
            malformed_math_threshold: 0,
            check_repetition: true,
            check_math: true,
        }
    }

    /// Set the minimum compared sentence length.
    pub fn with_min_sentence_len(mut self, len: usize) -> Self {
        self.min_sentence_len = len;
        self
    }

    /// Set the malformed-math rejection threshold.
    pub fn with_malformed_math_threshold(mut self, threshold: usize) -> Self {
        self.malformed_math_threshold = threshold;
        self
    }

    /// Skip the repetition check.
    pub fn without_repetition(mut self) -> Self {
        self.check_repetition = false;
        self
    }
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self::standard()
    }
}
