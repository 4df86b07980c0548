//! Integrity checks for generated text.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use super::catalog::{CORRUPTED_TOKENS, FALSE_IDENTITIES};
use super::options::ValidationOptions;
use super::report::{FindingKind, ValidationFinding, ValidationReport};
use crate::normalize::macros::matching_brace;
use crate::normalize::math::canonicalize_delimiters;
use crate::normalize::segments;

static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+(?:\s+|$)").expect("sentence regex"));
static FRAC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\[dt]?frac\b").expect("frac regex"));
static SQRT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\sqrt\b").expect("sqrt regex"));
static LEFT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\left\b").expect("left regex"));
static RIGHT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\right\b").expect("right regex"));
static ENVIRONMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\(begin|end)\{([^{}]*)\}").expect("environment regex"));

/// Longest excerpt quoted in a finding.
const EXCERPT_LEN: usize = 60;

/// Pattern-based integrity checker.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    options: ValidationOptions,
}

impl Validator {
    /// Create a validator with the given options.
    pub fn new(options: ValidationOptions) -> Self {
        Self { options }
    }

    /// Validate a text.
    pub fn validate(&self, text: &str) -> ValidationReport {
        let mut findings = Vec::new();

        self.check_corrupted_tokens(text, &mut findings);
        self.check_false_identities(text, &mut findings);
        if self.options.check_repetition {
            self.check_repetition(text, &mut findings);
        }
        if self.options.check_math {
            self.check_math(text, &mut findings);
        }

        let report = ValidationReport::from_findings(findings, &self.options);
        log::debug!(
            "validator: {} findings, reject = {}",
            report.findings.len(),
            report.should_reject
        );
        report
    }

    fn check_corrupted_tokens(&self, text: &str, findings: &mut Vec<ValidationFinding>) {
        for token in CORRUPTED_TOKENS.iter() {
            for offset in token.find_all(text) {
                findings.push(ValidationFinding::new(
                    FindingKind::CorruptedToken,
                    format!("{} at byte {}", token.name, offset),
                ));
            }
        }
    }

    fn check_false_identities(&self, text: &str, findings: &mut Vec<ValidationFinding>) {
        for identity in FALSE_IDENTITIES.iter() {
            for matched in identity.find_all(text) {
                findings.push(ValidationFinding::new(
                    FindingKind::FalseIdentity,
                    format!("{}: {}", identity.name, excerpt(matched)),
                ));
            }
        }
    }

    fn check_repetition(&self, text: &str, findings: &mut Vec<ValidationFinding>) {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        for sentence in SENTENCE_END.split(text) {
            let sentence = sentence.trim();
            if sentence.chars().count() <= self.options.min_sentence_len {
                continue;
            }
            if !seen.insert(sentence) && reported.insert(sentence) {
                findings.push(ValidationFinding::new(
                    FindingKind::RepeatedSentence,
                    format!("repeated sentence: {}", excerpt(sentence)),
                ));
            }
        }
    }

    fn check_math(&self, text: &str, findings: &mut Vec<ValidationFinding>) {
        let canonical = canonicalize_delimiters(text);
        for segment in segments::split(&canonical) {
            if segment.is_math() {
                for problem in math_problems(segment.body()) {
                    findings.push(ValidationFinding::new(
                        FindingKind::MalformedMath,
                        format!("{} in {}", problem, excerpt(segment.raw)),
                    ));
                }
            }
        }
    }
}

/// Validate a text with the given options.
pub fn validate(text: &str, options: &ValidationOptions) -> ValidationReport {
    Validator::new(options.clone()).validate(text)
}

/// Structural problems in one math body.
pub fn math_problems(body: &str) -> Vec<String> {
    let mut problems = Vec::new();

    let balance = brace_balance(body);
    if balance != 0 {
        problems.push(format!("unbalanced braces ({:+})", balance));
    }

    for m in FRAC.find_iter(body) {
        let complete = take_argument(&body[m.end()..])
            .and_then(take_argument)
            .is_some();
        if !complete {
            problems.push(format!("`{}` missing an argument", m.as_str()));
        }
    }

    for m in SQRT.find_iter(body) {
        let mut rest = body[m.end()..].trim_start();
        if let Some(index) = rest.strip_prefix('[') {
            rest = index.find(']').map(|end| &index[end + 1..]).unwrap_or("");
        }
        if take_argument(rest).is_none() {
            problems.push("`\\sqrt` missing its radicand".to_string());
        }
    }

    let lefts = LEFT.find_iter(body).count();
    let rights = RIGHT.find_iter(body).count();
    if lefts != rights {
        problems.push(format!("{} `\\left` for {} `\\right`", lefts, rights));
    }

    let mut open: HashMap<&str, i32> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for caps in ENVIRONMENT.captures_iter(body) {
        let (Some(kind), Some(name)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let name = name.as_str();
        if !open.contains_key(name) {
            order.push(name);
        }
        let depth = open.entry(name).or_insert(0);
        *depth += if kind.as_str() == "begin" { 1 } else { -1 };
    }
    for name in order {
        if open.get(name).copied().unwrap_or(0) > 0 {
            problems.push(format!("`\\begin{{{}}}` without `\\end{{{}}}`", name, name));
        }
    }

    problems
}

/// Net count of unescaped `{` over `}`.
pub fn brace_balance(text: &str) -> i64 {
    let mut balance = 0i64;
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                chars.next();
            }
            '{' => balance += 1,
            '}' => balance -= 1,
            _ => {}
        }
    }
    balance
}

/// Skip one macro argument, returning the text after it.
fn take_argument(text: &str) -> Option<&str> {
    let text = text.trim_start();
    let first = text.chars().next()?;
    match first {
        '{' => matching_brace(&text[1..]).map(|end| &text[end + 2..]),
        '}' | '&' | '^' | '_' | '$' => None,
        '\\' => {
            let word = text[1..]
                .find(|c: char| !c.is_ascii_alphabetic())
                .unwrap_or(text.len() - 1);
            if word > 0 {
                Some(&text[1 + word..])
            } else {
                let next = text[1..].chars().next().map(char::len_utf8).unwrap_or(0);
                Some(&text[1 + next..])
            }
        }
        c => Some(&text[c.len_utf8()..]),
    }
}

fn excerpt(text: &str) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if flat.chars().count() <= EXCERPT_LEN {
        flat
    } else {
        let cut: String = flat.chars().take(EXCERPT_LEN).collect();
        format!("{}…", cut)
    }
}
