//! Validation and repair of generator-produced content.
//!
//! [`validate`] and [`sanitize`] share no state and can be called on their
//! own or chained. [`admit_generated`] chains them at the generation
//! boundary, the only place where content is refused.

mod catalog;
mod options;
mod report;
mod sanitizer;
mod validator;

pub use catalog::{
    correct_square_of_sum, CorruptedToken, FalseIdentity, CORRUPTED_TOKENS, FALSE_IDENTITIES,
};
pub use options::{ValidationOptions, ValidationPreset};
pub use report::{FindingKind, SanitizeResult, ValidationFinding, ValidationReport};
pub use sanitizer::sanitize;
pub use validator::{brace_balance, math_problems, validate, Validator};

use crate::error::{Error, Result};

/// Sanitize generated text, validate the result, and admit it or refuse it.
///
/// A reject verdict returns [`Error::ContentRejected`]; the caller must
/// discard the content and regenerate it.
pub fn admit_generated(text: &str, options: &ValidationOptions) -> Result<String> {
    let sanitized = sanitize(text);
    let report = validate(&sanitized.text, options);
    if report.should_reject {
        log::warn!(
            "generated content rejected: {}",
            report
                .findings
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        );
        return Err(Error::ContentRejected {
            findings: report.findings.len(),
            fatal: report.fatal_count(),
        });
    }
    Ok(sanitized.text)
}
