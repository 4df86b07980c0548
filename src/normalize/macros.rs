//! Document-structure macro normalization.
//!
//! Rewrites list blocks, emphasis, section headings, forced line breaks and
//! solution blocks into generic markdown. Math spans are masked before any
//! rewrite, so their bytes are never touched. The output contains none of
//! the macros handled here, which makes the pass idempotent.

use once_cell::sync::Lazy;
use regex::Regex;

use super::segments;

/// List environments and whether they are ordered.
const LIST_ENVS: &[(&str, bool)] = &[("itemize", false), ("enumerate", true)];

/// Item separator inside list environments.
const ITEM_SEPARATOR: &str = "\\item";

/// Heading macros and the markdown level they map to.
const HEADING_MACROS: &[(&str, usize)] = &[
    ("section", 2),
    ("subsection", 3),
    ("subsubsection", 4),
];

/// Inline emphasis macros and their markdown wrappers.
const EMPHASIS_MACROS: &[(&str, &str, &str)] = &[
    ("textbf", "**", "**"),
    ("textit", "*", "*"),
    ("emph", "*", "*"),
    ("underline", "<u>", "</u>"),
];

/// Collapsible solution environment.
const SOLUTION_ENV: &str = "solution";

/// Markdown hard line break.
pub const HARD_BREAK: &str = "  \n";

static LINE_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\\\\(?:\[[^\]\n]*\])?|\\newline\b)[ \t]*(?:\r?\n)?").expect("line break regex")
});

static EXTRA_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").expect("newline regex"));

/// Normalize structure macros outside math spans.
pub fn normalize_macros(text: &str) -> String {
    segments::map_prose(text, normalize_prose)
}

/// Rewrite one prose string (math already masked).
fn normalize_prose(text: &str) -> String {
    let mut result = rewrite_lists(text);
    result = rewrite_solutions(&result);
    result = rewrite_headings(&result);
    result = rewrite_emphasis(&result);
    result = LINE_BREAK.replace_all(&result, HARD_BREAK).into_owned();
    EXTRA_NEWLINES.replace_all(&result, "\n\n").into_owned()
}

/// Rewrite list environments, innermost first.
fn rewrite_lists(text: &str) -> String {
    let mut result = text.to_string();
    let mut limit = result.len();

    while let Some((start, env, ordered)) = last_list_open(&result, limit) {
        let open = format!("\\begin{{{}}}", env);
        let close = format!("\\end{{{}}}", env);
        let body_start = start + open.len();
        match result[body_start..].find(&close) {
            Some(rel) => {
                let body_end = body_start + rel;
                let rendered = render_list(&result[body_start..body_end], ordered);
                result.replace_range(start..body_end + close.len(), &rendered);
                limit = result.len();
            }
            None => limit = start,
        }
    }
    result
}

/// Rightmost list opener starting before `limit`.
fn last_list_open(text: &str, limit: usize) -> Option<(usize, &'static str, bool)> {
    LIST_ENVS
        .iter()
        .filter_map(|(env, ordered)| {
            let open = format!("\\begin{{{}}}", env);
            text[..limit]
                .rfind(&open)
                .map(|pos| (pos, *env, *ordered))
        })
        .max_by_key(|(pos, _, _)| *pos)
}

/// Render a list body as a markdown list block.
fn render_list(body: &str, ordered: bool) -> String {
    let mut entries = body.split(ITEM_SEPARATOR);
    let preamble = entries.next().unwrap_or("").trim();

    let mut lines = Vec::new();
    let mut number = 0;
    for entry in entries {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        number += 1;
        let marker = if ordered {
            format!("{}.", number)
        } else {
            "-".to_string()
        };
        let indent = " ".repeat(marker.len() + 1);
        let mut entry_lines = entry.lines().map(str::trim_end).filter(|l| !l.trim().is_empty());
        if let Some(first) = entry_lines.next() {
            lines.push(format!("{} {}", marker, first.trim_start()));
        }
        for line in entry_lines {
            lines.push(format!("{}{}", indent, line));
        }
    }

    let mut out = String::from("\n\n");
    if !preamble.is_empty() && !preamble.starts_with('[') {
        out.push_str(preamble);
        out.push_str("\n\n");
    }
    out.push_str(&lines.join("\n"));
    out.push_str("\n\n");
    out
}

/// Rewrite solution environments into collapsible blocks.
fn rewrite_solutions(text: &str) -> String {
    let open = format!("\\begin{{{}}}", SOLUTION_ENV);
    let close = format!("\\end{{{}}}", SOLUTION_ENV);
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(&open) {
        let body_start = start + open.len();
        let Some(rel) = rest[body_start..].find(&close) else {
            break;
        };
        let body = rest[body_start..body_start + rel].trim();
        result.push_str(&rest[..start]);
        result.push_str("\n\n<details class=\"solution\">\n<summary>Solution</summary>\n\n");
        result.push_str(body);
        result.push_str("\n\n</details>\n\n");
        rest = &rest[body_start + rel + close.len()..];
    }
    result.push_str(rest);
    result
}

/// Rewrite heading macros into markdown headings on their own block.
fn rewrite_headings(text: &str) -> String {
    let mut result = text.to_string();
    for (name, level) in HEADING_MACROS {
        result = replace_command(&result, name, |arg| {
            format!("\n\n{} {}\n\n", "#".repeat(*level), collapse_whitespace(arg))
        });
    }
    result
}

/// Rewrite emphasis macros into markdown emphasis.
fn rewrite_emphasis(text: &str) -> String {
    let mut result = text.to_string();
    for (name, open, close) in EMPHASIS_MACROS {
        result = replace_command(&result, name, |arg| {
            let inner = arg.trim();
            if inner.is_empty() {
                return arg.to_string();
            }
            let lead = &arg[..arg.len() - arg.trim_start().len()];
            let trail = &arg[arg.trim_end().len()..];
            format!("{}{}{}{}{}", lead, open, inner, close, trail)
        });
    }
    result
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Replace every `\name{arg}` (or `\name*{arg}`) with `f(arg)`.
///
/// Arguments are brace-matched and rewritten recursively, so nested macros
/// of the same name are handled. A call without a closing brace is left as
/// it is.
pub fn replace_command<F>(text: &str, name: &str, f: F) -> String
where
    F: Fn(&str) -> String + Copy,
{
    let needle = format!("\\{}", name);
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find(&needle) {
        let after_name = &rest[pos + needle.len()..];
        let after_star = after_name.strip_prefix('*').unwrap_or(after_name);
        let arg = after_star
            .strip_prefix('{')
            .and_then(|s| matching_brace(s).map(|end| &s[..end]));

        match arg {
            Some(arg) => {
                out.push_str(&rest[..pos]);
                let inner = replace_command(arg, name, f);
                out.push_str(&f(&inner));
                let consumed = rest.len() - after_star.len() + 1 + arg.len() + 1;
                rest = &rest[consumed..];
            }
            None => {
                out.push_str(&rest[..pos + needle.len()]);
                rest = after_name;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Offset of the `}` closing a group whose `{` was just consumed.
pub fn matching_brace(text: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut chars = text.char_indices();
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '\\' => {
                chars.next();
            }
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_itemize_to_unordered_list() {
        let out = normalize_macros("\\begin{itemize}\\item a\\item b\\end{itemize}");
        assert_eq!(out.trim(), "- a\n- b");
    }

    #[test]
    fn test_enumerate_to_ordered_list() {
        let out = normalize_macros("\\begin{enumerate}\n  \\item un\n  \\item deux\n\\end{enumerate}");
        assert_eq!(out.trim(), "1. un\n2. deux");
    }

    #[test]
    fn test_nested_lists_indent_under_parent() {
        let text = "\\begin{itemize}\\item a\\begin{enumerate}\\item b\\item c\\end{enumerate}\\item d\\end{itemize}";
        let out = normalize_macros(text);
        assert_eq!(out.trim(), "- a\n  1. b\n  2. c\n- d");
    }

    #[test]
    fn test_list_items_keep_math() {
        let out = normalize_macros("\\begin{itemize}\\item $x \\item y$ \\item z\\end{itemize}");
        assert_eq!(out.trim(), "- $x \\item y$\n- z");
    }

    #[test]
    fn test_headings() {
        let out = normalize_macros("\\section{Théorème de Pythagore}Texte\\subsection*{Cas}");
        assert!(out.contains("\n\n## Théorème de Pythagore\n\n"));
        assert!(out.contains("\n\n### Cas\n\n"));
        assert!(out.contains("Texte"));
    }

    #[test]
    fn test_emphasis() {
        assert_eq!(normalize_macros("\\textbf{gras}"), "**gras**");
        assert_eq!(normalize_macros("\\textit{ital} et \\emph{emph}"), "*ital* et *emph*");
        assert_eq!(normalize_macros("\\underline{souligné}"), "<u>souligné</u>");
        assert_eq!(
            normalize_macros("\\textbf{a \\textit{b} c}"),
            "**a *b* c**"
        );
        assert_eq!(normalize_macros("\\textbf{ espace }"), " **espace** ");
    }

    #[test]
    fn test_nested_braces_in_argument() {
        assert_eq!(
            normalize_macros("\\textbf{f(x) = {a}}"),
            "**f(x) = {a}**"
        );
    }

    #[test]
    fn test_line_breaks() {
        assert_eq!(normalize_macros("a\\\\b"), "a  \nb");
        assert_eq!(normalize_macros("a \\\\\nb"), "a   \nb");
        assert_eq!(normalize_macros("a\\\\[2mm]b"), "a  \nb");
        assert_eq!(normalize_macros("a\\newline b"), "a  \nb");
    }

    #[test]
    fn test_math_bytes_untouched() {
        let text = "\\textbf{x} $\\textbf{x} \\\\ \\section{y}$ $$a \\\\ b$$";
        let out = normalize_macros(text);
        assert!(out.contains("$\\textbf{x} \\\\ \\section{y}$"));
        assert!(out.contains("$$a \\\\ b$$"));
        assert!(out.starts_with("**x**"));
    }

    #[test]
    fn test_solution_block() {
        let out = normalize_macros("\\begin{solution}\n$x = 2$\n\\end{solution}");
        assert!(out.contains("<details class=\"solution\">"));
        assert!(out.contains("<summary>Solution</summary>\n\n$x = 2$\n\n</details>"));
    }

    #[test]
    fn test_unclosed_macros_left_alone() {
        let text = "\\textbf{sans fin \\begin{itemize} \\item a";
        assert_eq!(normalize_macros(text), text);
    }

    #[test]
    fn test_idempotent() {
        let text = "\\section{A}\\begin{itemize}\\item \\textbf{a}\\\\ b\\end{itemize}";
        let once = normalize_macros(text);
        assert_eq!(normalize_macros(&once), once);
    }

    #[test]
    fn test_matching_brace_skips_escapes() {
        assert_eq!(matching_brace("a\\}b}c"), Some(4));
        assert_eq!(matching_brace("a{b}c"), None);
    }
}
