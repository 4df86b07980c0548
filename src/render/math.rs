//! Math typesetting seam.
//!
//! The HTML writer never interprets math: it hands each source to a
//! [`MathTypesetter`]. The default leaves typesetting to the engine loaded
//! in the page.

use std::fmt;

use super::html::escape_text;

/// Turns math sources into markup.
pub trait MathTypesetter: fmt::Debug + Send + Sync {
    /// Markup for an inline formula.
    fn typeset_inline(&self, source: &str) -> String;

    /// Markup for a display formula.
    fn typeset_display(&self, source: &str) -> String;

    /// Whether the page must load a client-side math engine.
    fn needs_client_engine(&self) -> bool {
        false
    }
}

/// Wraps sources for the in-page math engine.
///
/// Inline math becomes `\(…\)` inside `span.math-inline`, display math
/// becomes `\[…\]` inside `div.math-display`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientSideMath;

impl MathTypesetter for ClientSideMath {
    fn typeset_inline(&self, source: &str) -> String {
        format!(
            "<span class=\"math math-inline\">\\({}\\)</span>",
            escape_text(source.trim())
        )
    }

    fn typeset_display(&self, source: &str) -> String {
        format!(
            "<div class=\"math math-display\">\\[{}\\]</div>",
            escape_text(source.trim())
        )
    }

    fn needs_client_engine(&self) -> bool {
        true
    }
}

/// Emits math sources as escaped code, without any engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainMath;

impl MathTypesetter for PlainMath {
    fn typeset_inline(&self, source: &str) -> String {
        format!("<code class=\"math-source\">{}</code>", escape_text(source))
    }

    fn typeset_display(&self, source: &str) -> String {
        format!(
            "<pre class=\"math-source\"><code>{}</code></pre>",
            escape_text(source)
        )
    }
}
