//! Math delimiter normalization.
//!
//! Rewrites every accepted math delimiter convention into the two canonical
//! forms (`$…$` and `$$…$$`), turns `tabular` grids into the math engine's
//! `array`, and applies a short fixed list of token repairs inside math.
//! Sequences it does not recognize are left exactly as they were.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::segments::{self, find_unescaped, SegmentKind};

/// Environments rewritten to display math as-is.
const DISPLAY_ENVS: &[&str] = &["equation", "equation*", "displaymath"];

/// Environments rewritten to display math around an inner environment.
const WRAPPED_ENVS: &[(&str, &str)] = &[
    ("align", "aligned"),
    ("align*", "aligned"),
    ("eqnarray", "aligned"),
    ("eqnarray*", "aligned"),
    ("gather", "gathered"),
    ("gather*", "gathered"),
];

/// Grid environment the math engine does not support.
const GRID_ENV: &str = "tabular";

/// Math engine environment replacing the grid.
const ARRAY_ENV: &str = "array";

/// Fixed token repairs applied inside math spans.
static TOKEN_REPAIRS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        // `\not=` and `\not =` spelled as one token
        (Regex::new(r"\\not\s*=\s*").expect("not-equal regex"), r"\neq "),
        // `\neq` split from its right operand by a line break
        (
            Regex::new(r"\\neq[ \t]*\r?\n\s*").expect("split neq regex"),
            r"\neq ",
        ),
        // literal not-equal sign
        (Regex::new(r"≠\s*").expect("unicode neq regex"), r"\neq "),
    ]
});

/// Control words matched for blackboard shorthand repair.
static CONTROL_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\[A-Za-z]+").expect("control word regex"));

/// Blank lines inside display math.
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*\n\s*").expect("blank regex"));

/// Normalize math delimiters, grids and known garbled tokens.
pub fn normalize_math(text: &str) -> String {
    let canonical = canonicalize_delimiters(text);
    let repaired = segments::map_math(&canonical, |kind, body| {
        let body = rename_grid(body);
        let body = repair_tokens(&body);
        match kind {
            SegmentKind::DisplayMath => BLANK_LINES.replace_all(&body, "\n").into_owned(),
            _ => inline_body(&body).to_string(),
        }
    });
    log::debug!(
        "math normalizer: {} bytes in, {} bytes out",
        text.len(),
        repaired.len()
    );
    repaired
}

/// Rewrite delimiter variants into `$…$` / `$$…$$`.
///
/// Existing display spans are copied verbatim and inline spans lose the
/// padding inside their dollars. An escaped backslash is a single token, so
/// `\\[2mm]` stays a line break.
pub fn canonicalize_delimiters(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < bytes.len() {
        let rest = &text[i..];

        if rest.starts_with("\\\\") {
            out.push_str("\\\\");
            i += 2;
            continue;
        }

        if rest.starts_with("\\$") {
            out.push_str("\\$");
            i += 2;
            continue;
        }

        if bytes[i] == b'$' {
            match segments::math_span_end(text, i) {
                Some((end, SegmentKind::InlineMath)) => {
                    push_inline(&mut out, &text[i + 1..end - 1], &text[i..end]);
                    i = end;
                    continue;
                }
                Some((end, _)) => {
                    out.push_str(&text[i..end]);
                    i = end;
                    continue;
                }
                None => {}
            }
        }

        if rest.starts_with("\\(") {
            if let Some(close) = find_unescaped(text, i + 2, "\\)") {
                push_inline(&mut out, &text[i + 2..close], "");
                i = close + 2;
                continue;
            }
        }

        if rest.starts_with("\\[") {
            if let Some(close) = find_unescaped(text, i + 2, "\\]") {
                push_display(&mut out, &text[i + 2..close]);
                i = close + 2;
                continue;
            }
        }

        if rest.starts_with("\\begin{") {
            if let Some(consumed) = rewrite_environment(text, i, &mut out) {
                i = consumed;
                continue;
            }
        }

        let ch_len = rest.chars().next().map(char::len_utf8).unwrap_or(1);
        out.push_str(&rest[..ch_len]);
        i += ch_len;
    }

    out
}

/// Write an inline span with its padding trimmed.
///
/// The markup engine only reads `$…$` as math when no space sits just
/// inside the dollars. A body ending in a backslash keeps its trailing
/// space so the closing dollar is not escaped. An empty body writes
/// `fallback`.
fn push_inline(out: &mut String, inner: &str, fallback: &str) {
    let body = inline_body(inner);
    if body.is_empty() {
        out.push_str(fallback);
        return;
    }
    out.push('$');
    out.push_str(body);
    out.push('$');
}

fn inline_body(inner: &str) -> &str {
    let body = inner.trim_start();
    let trimmed = body.trim_end();
    if trimmed.ends_with('\\') {
        body
    } else {
        trimmed
    }
}

fn push_display(out: &mut String, inner: &str) {
    out.push_str("$$");
    out.push_str(inner.trim());
    out.push_str("$$");
}

/// Rewrite a math or grid environment starting at `start`.
///
/// Returns the offset just past the environment, or `None` when the
/// environment is not one we rewrite or has no matching end.
fn rewrite_environment(text: &str, start: usize, out: &mut String) -> Option<usize> {
    let name_start = start + "\\begin{".len();
    let name_end = name_start + text[name_start..].find('}')?;
    let name = &text[name_start..name_end];
    let body_start = name_end + 1;

    let (body_end, after) = find_env_end(text, body_start, name)?;
    let body = &text[body_start..body_end];

    if DISPLAY_ENVS.contains(&name) {
        push_display(out, body);
    } else if let Some((_, inner)) = WRAPPED_ENVS.iter().find(|(env, _)| *env == name) {
        out.push_str("$$\\begin{");
        out.push_str(inner);
        out.push('}');
        out.push_str(body.trim());
        out.push_str("\\end{");
        out.push_str(inner);
        out.push_str("}$$");
    } else if name == GRID_ENV {
        out.push_str("$$\\begin{");
        out.push_str(ARRAY_ENV);
        out.push('}');
        out.push_str(&rename_grid(body.trim_end()));
        out.push_str("\\end{");
        out.push_str(ARRAY_ENV);
        out.push_str("}$$");
    } else {
        return None;
    }
    Some(after)
}

/// Find the `\end{name}` matching a `\begin{name}` whose body starts at `from`.
///
/// Returns the body end and the offset just past the `\end{…}`.
pub fn find_env_end(text: &str, from: usize, name: &str) -> Option<(usize, usize)> {
    let open = format!("\\begin{{{}}}", name);
    let close = format!("\\end{{{}}}", name);
    let mut depth = 1usize;
    let mut i = from;

    while i < text.len() {
        let next_close = text[i..].find(&close).map(|p| p + i)?;
        match text[i..].find(&open).map(|p| p + i) {
            Some(next_open) if next_open < next_close => {
                depth += 1;
                i = next_open + open.len();
            }
            _ => {
                depth -= 1;
                if depth == 0 {
                    return Some((next_close, next_close + close.len()));
                }
                i = next_close + close.len();
            }
        }
    }
    None
}

/// Rename grid environments to the array environment.
///
/// Only the environment name changes; the column specification that follows
/// `\begin{…}` is kept verbatim.
fn rename_grid(body: &str) -> String {
    body.replace("\\begin{tabular}", "\\begin{array}")
        .replace("\\end{tabular}", "\\end{array}")
}

/// Apply the fixed token repair table to a math body.
pub fn repair_tokens(body: &str) -> String {
    let mut result = body.to_string();
    for (pattern, replacement) in TOKEN_REPAIRS.iter() {
        result = pattern.replace_all(&result, *replacement).into_owned();
    }
    CONTROL_WORD
        .replace_all(&result, |caps: &Captures| match &caps[0] {
            "\\R" => "\\mathbb{R}".to_string(),
            "\\N" => "\\mathbb{N}".to_string(),
            "\\Z" => "\\mathbb{Z}".to_string(),
            "\\Q" => "\\mathbb{Q}".to_string(),
            "\\C" => "\\mathbb{C}".to_string(),
            other => other.to_string(),
        })
        .into_owned()
}
