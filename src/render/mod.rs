//! Rendering of document trees to HTML and JSON.

mod html;
mod json;
mod math;
mod options;
pub mod page;
mod pipeline;
mod result;

pub use html::{escape_attr, escape_text, render_nodes, HtmlRenderer};
pub use json::{to_json, JsonFormat};
pub use math::{ClientSideMath, MathTypesetter, PlainMath};
pub use options::{MathMode, RenderOptions};
pub use page::{render_page, to_page, PageOptions, DEFAULT_MATH_ENGINE_URL};
pub use pipeline::{parse_document, render_batch, to_html, to_html_with_stats};
pub use result::{RenderResult, RenderStats};
