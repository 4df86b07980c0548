//! Fixed catalogs of known corrupted tokens and false identities.
//!
//! Both catalogs are plain data: adding an entry never touches the
//! validator or sanitizer control flow.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// A known corruption left in generated text, with its repair.
///
/// Most entries are control characters left where a JSON decoder consumed
/// the backslash of a macro (`\frac` read as form feed + `rac`).
#[derive(Debug)]
pub struct CorruptedToken {
    /// Short name used in findings
    pub name: &'static str,
    pattern: Regex,
    replacement: &'static str,
    blocked_after: Option<fn(char) -> bool>,
}

impl CorruptedToken {
    fn new(name: &'static str, pattern: &str, replacement: &'static str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("corrupted token pattern"),
            replacement,
            blocked_after: None,
        }
    }

    fn blocked_after(mut self, guard: fn(char) -> bool) -> Self {
        self.blocked_after = Some(guard);
        self
    }

    fn admits(&self, text: &str, start: usize) -> bool {
        match (self.blocked_after, text[..start].chars().next_back()) {
            (Some(blocked), Some(prev)) => !blocked(prev),
            _ => true,
        }
    }

    /// Byte offsets of every match in `text`.
    pub fn find_all(&self, text: &str) -> Vec<usize> {
        self.pattern
            .find_iter(text)
            .filter(|m| self.admits(text, m.start()))
            .map(|m| m.start())
            .collect()
    }

    /// Rewrite every match. Returns the new text and the number of repairs.
    pub fn repair(&self, text: &str) -> (String, usize) {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        let mut count = 0;
        for caps in self.pattern.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if !self.admits(text, whole.start()) {
                continue;
            }
            out.push_str(&text[last..whole.start()]);
            caps.expand(self.replacement, &mut out);
            last = whole.end();
            count += 1;
        }
        out.push_str(&text[last..]);
        (out, count)
    }
}

fn is_word_or_escape(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '\\'
}

fn is_escape(c: char) -> bool {
    c == '\\'
}

/// Known corrupted tokens, applied in order.
///
/// The replacement character comes first so that deleting it can expose
/// a token that a later entry repairs in the same pass.
pub static CORRUPTED_TOKENS: Lazy<Vec<CorruptedToken>> = Lazy::new(|| {
    vec![
        CorruptedToken::new("replacement-character", "\u{FFFD}", ""),
        CorruptedToken::new("form-feed-escape", r"\x0C(rac|orall)", r"\f${1}"),
        CorruptedToken::new("tab-escape", r"\t(imes|extbf|extit|ext|heta|frac)\b", r"\t${1}"),
        CorruptedToken::new("backspace-escape", r"\x08(eta|ar|egin|oxed|inom)", r"\b${1}"),
        CorruptedToken::new("carriage-return-escape", r"\r(ightarrow|ho|ight|angle)\b", r"\r${1}"),
        CorruptedToken::new("newline-escape", r"\n(eq|abla|otin)\b", r"\n${1}"),
        CorruptedToken::new("bare-frac", r"rac\{", r"\frac{").blocked_after(is_word_or_escape),
        CorruptedToken::new(
            "doubled-escape",
            r"\\\\(frac|sqrt|times|cdot|left|right|begin|end)\b",
            r"\${1}",
        )
        .blocked_after(is_escape),
    ]
});

/// A known false identity.
///
/// The `regex` crate has no backreferences, so the pattern captures the
/// variables and `check` compares them.
pub struct FalseIdentity {
    /// Short name used in findings
    pub name: &'static str,
    pattern: Regex,
    check: fn(&Captures<'_>) -> bool,
}

impl std::fmt::Debug for FalseIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FalseIdentity")
            .field("name", &self.name)
            .finish()
    }
}

impl FalseIdentity {
    fn new(name: &'static str, pattern: &str, check: fn(&Captures<'_>) -> bool) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("false identity pattern"),
            check,
        }
    }

    /// Matched substrings of every occurrence in `text`.
    pub fn find_all<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.pattern
            .captures_iter(text)
            .filter(|caps| (self.check)(caps))
            .filter_map(|caps| caps.get(0).map(|m| m.as_str().trim_end()))
            .collect()
    }
}

/// Optional whitespace.
const S: &str = r"\s*";
/// Single-symbol operand.
const VAR: &str = r"([A-Za-z0-9])";
/// A squared exponent, braced or not.
const SQUARED: &str = r"\^\s*\{?\s*2\s*\}?";

fn same_pair(caps: &Captures<'_>, a: usize, b: usize, c: usize, d: usize) -> bool {
    let get = |i: usize| caps.get(i).map(|m| m.as_str());
    (get(a) == get(c) && get(b) == get(d)) || (get(a) == get(d) && get(b) == get(c))
}

fn no_trailing_term(caps: &Captures<'_>, group: usize) -> bool {
    caps.get(group).is_none()
}

static SQUARE_OF_SUM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\({S}{VAR}{S}\+{S}{VAR}{S}\){S}{SQUARED}{S}={S}{VAR}{S}{SQUARED}{S}\+{S}{VAR}{S}{SQUARED}({S}[+\-])?"
    ))
    .expect("square of sum pattern")
});

fn square_of_sum_holds(caps: &Captures<'_>) -> bool {
    same_pair(caps, 1, 2, 3, 4) && no_trailing_term(caps, 5)
}

/// Known false identities.
pub static FALSE_IDENTITIES: Lazy<Vec<FalseIdentity>> = Lazy::new(|| {
    vec![
        FalseIdentity {
            name: "square-of-sum",
            pattern: SQUARE_OF_SUM.clone(),
            check: square_of_sum_holds,
        },
        FalseIdentity::new(
            "root-of-sum",
            &format!(
                r"\\sqrt{S}\{{{S}{VAR}{S}\+{S}{VAR}{S}\}}{S}={S}\\sqrt{S}\{{?{S}{VAR}{S}\}}?{S}\+{S}\\sqrt{S}\{{?{S}{VAR}{S}\}}?"
            ),
            |caps| same_pair(caps, 1, 2, 3, 4),
        ),
        FalseIdentity::new(
            "log-of-sum",
            &format!(
                r"\\(?:ln|log){S}\({S}{VAR}{S}\+{S}{VAR}{S}\){S}={S}\\(?:ln|log){S}\(?{S}{VAR}{S}\)?{S}\+{S}\\(?:ln|log){S}\(?{S}{VAR}{S}\)?"
            ),
            |caps| same_pair(caps, 1, 2, 3, 4),
        ),
        FalseIdentity::new(
            "pythagorean-minus",
            &format!(
                r"\\(sin|cos){S}{SQUARED}{S}\(?{S}([A-Za-z]|\\[a-z]+){S}\)?{S}-{S}\\(sin|cos){S}{SQUARED}{S}\(?{S}([A-Za-z]|\\[a-z]+){S}\)?{S}={S}1({S}[+\-*/^\\A-Za-z0-9])?"
            ),
            |caps| {
                let get = |i: usize| caps.get(i).map(|m| m.as_str());
                get(1) != get(3) && get(2) == get(4) && no_trailing_term(caps, 5)
            },
        ),
    ]
});

/// Rewrite `(a+b)^2 = a^2 + b^2` with its missing cross term.
///
/// Returns the new text and the number of rewrites.
pub fn correct_square_of_sum(text: &str) -> (String, usize) {
    let mut count = 0;
    let result = SQUARE_OF_SUM.replace_all(text, |caps: &Captures<'_>| {
        let whole = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
        if !square_of_sum_holds(caps) {
            return whole.to_string();
        }
        count += 1;
        let lhs = whole.split('=').next().unwrap_or_default();
        let (a, b) = (&caps[1], &caps[2]);
        let cross = if a.chars().chain(b.chars()).all(|c| c.is_ascii_alphabetic()) {
            format!("2{}{}", a, b)
        } else {
            format!("2 \\cdot {} \\cdot {}", a, b)
        };
        format!("{}= {}^2 + {} + {}^2", lhs, a, cross, b)
    });
    (result.into_owned(), count)
}
