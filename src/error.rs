//! Error types for lessonmark library.

use std::io;
use thiserror::Error;

/// Result type alias for lessonmark operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur outside the text-transform stages.
///
/// The normalizers, the sectionizer and the HTML writer never fail: malformed
/// input is carried through unchanged. Errors only surface at the edges:
/// loading documents, the generation boundary and PDF capture.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A structured document or report could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The authored document could not be interpreted.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Generated content failed validation and must be regenerated.
    #[error("Content rejected: {fatal} fatal of {findings} findings")]
    ContentRejected {
        /// Total number of findings in the report
        findings: usize,
        /// Number of findings that force rejection on their own
        fatal: usize,
    },

    /// The PDF snapshot could not be produced.
    #[error("Capture failed: {0}")]
    Capture(String),

    /// The external browser reported an error.
    #[error("Browser error: {0}")]
    Browser(String),

    /// Error during rendering (HTML, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ContentRejected {
            findings: 4,
            fatal: 1,
        };
        assert_eq!(err.to_string(), "Content rejected: 1 fatal of 4 findings");

        let err = Error::Capture("page crashed".to_string());
        assert_eq!(err.to_string(), "Capture failed: page crashed");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
