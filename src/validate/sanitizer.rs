//! Best-effort repair of generated text.

use unicode_normalization::UnicodeNormalization;

use super::catalog::{correct_square_of_sum, CORRUPTED_TOKENS};
use super::report::SanitizeResult;
use super::validator::brace_balance;

/// Repair catalogued corruptions in a text.
///
/// Steps, in order: NFC normalization, every corrupted-token repair, the
/// square-of-a-sum correction, NFC again (a deleted character can leave a
/// composable pair), and closing braces for any net-positive unmatched `{`.
/// The output is a fixed point: sanitizing it again changes nothing.
pub fn sanitize(text: &str) -> SanitizeResult {
    let mut result: String = text.nfc().collect();
    let mut repairs = 0;

    for token in CORRUPTED_TOKENS.iter() {
        let (repaired, count) = token.repair(&result);
        if count > 0 {
            log::debug!("sanitizer: {} x {}", token.name, count);
            result = repaired;
            repairs += count;
        }
    }

    let (corrected, count) = correct_square_of_sum(&result);
    if count > 0 {
        result = corrected;
        repairs += count;
    }

    if repairs > 0 {
        result = result.nfc().collect();
    }

    let balance = brace_balance(&result);
    if balance > 0 {
        // a trailing lone backslash would escape the first closing brace
        let trailing = result.chars().rev().take_while(|c| *c == '\\').count();
        if trailing % 2 == 1 {
            result.push(' ');
        }
        for _ in 0..balance {
            result.push('}');
        }
    }

    let was_modified = result != text;
    SanitizeResult {
        text: result,
        was_modified,
    }
}
