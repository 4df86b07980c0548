//! Image macro and sizing types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pixels per centimeter used to convert physical sizes.
pub const PX_PER_CM: f64 = 37.8;

/// An image macro as found in text, before its sizes are resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMacroSpec {
    /// Image path as written
    pub path: String,

    /// Raw `width=` value
    pub width_spec: Option<String>,

    /// Raw `height=` value
    pub height_spec: Option<String>,
}

impl ImageMacroSpec {
    /// Create a spec with no size options.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            width_spec: None,
            height_spec: None,
        }
    }
}

/// A resolved CSS length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "lowercase")]
pub enum Length {
    /// Absolute pixels
    Px(f64),
    /// Percentage of the container
    Percent(f64),
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Px(v) => write!(f, "{}px", format_number(*v)),
            Length::Percent(v) => write!(f, "{}%", format_number(*v)),
        }
    }
}

/// Format a number without a trailing `.0` and with at most two decimals.
fn format_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}

/// An embeddable image with concrete sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageNode {
    /// Image path
    pub path: String,

    /// Declared width
    pub width: Option<Length>,

    /// Declared height
    pub height: Option<Length>,
}

impl ImageNode {
    /// Create an image with no declared size.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            width: None,
            height: None,
        }
    }

    /// Inline CSS for this image.
    ///
    /// The image never overflows its container and keeps its aspect ratio
    /// whatever size was declared.
    pub fn style(&self) -> String {
        let mut parts = Vec::new();
        match (self.width, self.height) {
            (Some(w), Some(h)) => {
                parts.push(format!("width: {}", w));
                parts.push(format!("height: {}", h));
                parts.push("object-fit: contain".to_string());
            }
            (Some(w), None) => {
                parts.push(format!("width: {}", w));
                parts.push("height: auto".to_string());
            }
            (None, Some(h)) => {
                parts.push(format!("height: {}", h));
                parts.push("width: auto".to_string());
            }
            (None, None) => parts.push("height: auto".to_string()),
        }
        parts.push("max-width: 100%".to_string());
        parts.join("; ")
    }
}
