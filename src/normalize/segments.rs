//! Splitting text into alternating prose and math segments.
//!
//! Transforms that must never touch math work on this segment list: split,
//! rewrite the prose segments, and join the pieces back in order. Math
//! segments keep their delimiters so the join is byte-exact.

/// Kind of a text segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Prose outside any math span
    Text,
    /// `$…$`
    InlineMath,
    /// `$$…$$`
    DisplayMath,
}

/// A slice of the input tagged with its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    /// Segment kind
    pub kind: SegmentKind,
    /// Raw slice, including math delimiters
    pub raw: &'a str,
}

impl<'a> Segment<'a> {
    /// Check if this segment is a math span.
    pub fn is_math(&self) -> bool {
        self.kind != SegmentKind::Text
    }

    /// Content without delimiters.
    pub fn body(&self) -> &'a str {
        match self.kind {
            SegmentKind::Text => self.raw,
            SegmentKind::InlineMath => &self.raw[1..self.raw.len() - 1],
            SegmentKind::DisplayMath => &self.raw[2..self.raw.len() - 2],
        }
    }
}

/// Split text on canonical math delimiters.
///
/// `\$` is a literal dollar. An opener without a closer is prose, and an
/// inline span may not cross a blank line.
pub fn split(text: &str) -> Vec<Segment<'_>> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'$' => match math_span_end(text, i) {
                Some((end, kind)) => {
                    if text_start < i {
                        segments.push(Segment {
                            kind: SegmentKind::Text,
                            raw: &text[text_start..i],
                        });
                    }
                    segments.push(Segment {
                        kind,
                        raw: &text[i..end],
                    });
                    i = end;
                    text_start = end;
                }
                None => i += 1,
            },
            _ => i += 1,
        }
    }

    if text_start < text.len() {
        segments.push(Segment {
            kind: SegmentKind::Text,
            raw: &text[text_start..],
        });
    }
    segments
}

/// End offset and kind of a canonical math span opening at `start`.
///
/// `start` must point at a `$`.
pub fn math_span_end(text: &str, start: usize) -> Option<(usize, SegmentKind)> {
    let bytes = text.as_bytes();
    if bytes.get(start) != Some(&b'$') {
        return None;
    }

    if bytes.get(start + 1) == Some(&b'$') {
        let close = find_unescaped(text, start + 2, "$$")?;
        return Some((close + 2, SegmentKind::DisplayMath));
    }

    let close = find_unescaped(text, start + 1, "$")?;
    if close == start + 1 || text[start + 1..close].contains("\n\n") {
        return None;
    }
    Some((close + 1, SegmentKind::InlineMath))
}

/// Find `pattern` at or after `from`, skipping backslash escapes.
pub fn find_unescaped(text: &str, from: usize, pattern: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        if text[i..].starts_with(pattern) {
            return Some(i);
        }
        if bytes[i] == b'\\' {
            i += 2;
        } else {
            i += 1;
        }
        while i < bytes.len() && !text.is_char_boundary(i) {
            i += 1;
        }
    }
    None
}

/// Rewrite every segment and join the results in order.
pub fn map_segments<'a, F>(text: &'a str, mut f: F) -> String
where
    F: FnMut(&Segment<'a>) -> String,
{
    split(text).iter().map(|segment| f(segment)).collect()
}

/// Rewrite only the prose segments, leaving math spans byte-identical.
pub fn map_text<F>(text: &str, mut f: F) -> String
where
    F: FnMut(&str) -> String,
{
    map_segments(text, |segment| {
        if segment.is_math() {
            segment.raw.to_string()
        } else {
            f(segment.raw)
        }
    })
}

/// Rewrite only the math spans, passing the kind and the body.
///
/// The closure returns the new body; delimiters are restored around it.
pub fn map_math<F>(text: &str, mut f: F) -> String
where
    F: FnMut(SegmentKind, &str) -> String,
{
    map_segments(text, |segment| match segment.kind {
        SegmentKind::Text => segment.raw.to_string(),
        SegmentKind::InlineMath => format!("${}$", f(segment.kind, segment.body())),
        SegmentKind::DisplayMath => format!("$${}$$", f(segment.kind, segment.body())),
    })
}

const MASK_OPEN: char = '\u{E000}';
const MASK_CLOSE: char = '\u{E001}';

/// Text whose math spans were swapped for inert placeholders.
///
/// Lets block-level transforms see prose that surrounds math (a list item
/// holding a formula, a heading with a variable) while the math bytes stay
/// out of reach. Placeholders are private-use characters around an index.
#[derive(Debug)]
pub struct MaskedText<'a> {
    /// Prose with placeholders in place of math spans
    pub text: String,
    spans: Vec<&'a str>,
}

impl<'a> MaskedText<'a> {
    /// Number of masked math spans.
    pub fn span_count(&self) -> usize {
        self.spans.len()
    }

    /// Put the original math spans back into transformed text.
    pub fn restore(&self, transformed: &str) -> String {
        let mut out = String::with_capacity(transformed.len());
        let mut rest = transformed;
        while let Some(open) = rest.find(MASK_OPEN) {
            out.push_str(&rest[..open]);
            let after_open = &rest[open + MASK_OPEN.len_utf8()..];
            let span = after_open.find(MASK_CLOSE).and_then(|close| {
                after_open[..close]
                    .parse::<usize>()
                    .ok()
                    .and_then(|idx| self.spans.get(idx))
                    .map(|span| (close, *span))
            });
            match span {
                Some((close, span)) => {
                    out.push_str(span);
                    rest = &after_open[close + MASK_CLOSE.len_utf8()..];
                }
                None => {
                    out.push(MASK_OPEN);
                    rest = after_open;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// Mask every math span, or `None` if the text already holds placeholder
/// characters.
pub fn mask_math(text: &str) -> Option<MaskedText<'_>> {
    if text.contains(MASK_OPEN) || text.contains(MASK_CLOSE) {
        return None;
    }
    let mut spans = Vec::new();
    let masked = map_segments(text, |segment| {
        if segment.is_math() {
            spans.push(segment.raw);
            format!("{}{}{}", MASK_OPEN, spans.len() - 1, MASK_CLOSE)
        } else {
            segment.raw.to_string()
        }
    });
    Some(MaskedText {
        text: masked,
        spans,
    })
}

/// Rewrite prose with math spans masked, then restore them.
///
/// Falls back to rewriting each prose segment separately when the text
/// cannot be masked.
pub fn map_prose<F>(text: &str, mut f: F) -> String
where
    F: FnMut(&str) -> String,
{
    match mask_math(text) {
        Some(masked) => masked.restore(&f(&masked.text)),
        None => map_text(text, f),
    }
}
