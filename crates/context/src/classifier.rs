//! Heuristic cursor-context classifier.
//!
//! Maps `(text, offset)` to a [`ContextKind`] by running three tests in
//! order, the first hit deciding:
//!
//! 1. **String**: the current line up to the cursor is scanned for quote
//!    pairs (`"` and `'`, backslash escapes). An open quote at the cursor
//!    means String.
//! 2. **Line comment**: the trimmed line starts with `//`, or an unquoted
//!    `//` appears on the line before the cursor.
//! 3. **Block comment**: the document up to the cursor is scanned for
//!    `/*` and `*/`, skipping quoted regions. Markers are counted, not
//!    nested properly: every `/*` adds one and every `*/` removes one
//!    (never below zero), so `/* /* x */ y` still reads as inside a
//!    comment at `y`. Markers inside `//` comments count too.
//!
//! Anything else is Code. Quote state never carries across a newline.
//! On the current line an apostrophe inside a word (`don't`) is text; the
//! block scan treats every `'` as a quote, so `/* don't */` hides its own
//! closing marker.
//!
//! Offsets are byte offsets into `text`. Out-of-range offsets are clamped
//! to the end of the text, and offsets inside a multi-byte character are
//! moved back to its first byte. All markers are ASCII, so the scans work
//! on bytes without decoding.

use crate::kind::{ContextClassification, ContextKind, StringLiteral};
use crate::language::Language;

/// Share of native-script characters above which literal content counts
/// as native text.
const NATIVE_CONTENT_RATIO: f32 = 0.3;

/// Classify the cursor position. Never panics; internal failures degrade
/// to [`ContextKind::Unknown`] with rationale `"detection error"`.
pub fn classify(text: &str, offset: usize) -> ContextClassification {
    match std::panic::catch_unwind(|| classify_unchecked(text, offset)) {
        Ok(classification) => classification,
        Err(_) => {
            tracing::warn!(len = text.len(), offset, "context classification failed");
            ContextClassification::unknown("detection error")
        }
    }
}

fn classify_unchecked(text: &str, offset: usize) -> ContextClassification {
    let offset = clamp_offset(text, offset);
    let bytes = text.as_bytes();
    let (start, end) = line_bounds(bytes, offset);
    let line = &text[start..end];

    if let Some(open) = open_quote(&bytes[start..offset]) {
        return ContextClassification::string(read_literal(line, open));
    }

    if line.trim_start().starts_with("//") {
        return ContextClassification::new(ContextKind::Comment, "line comment");
    }

    if has_line_comment(&bytes[start..offset]) {
        return ContextClassification::new(ContextKind::Comment, "trailing line comment");
    }

    if block_depth(&bytes[..offset]) > 0 {
        return ContextClassification::new(ContextKind::Comment, "block comment");
    }

    ContextClassification::new(ContextKind::Code, "code")
}

/// Which comment opener sits immediately before the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentMarker {
    Line,
    Block,
}

/// Detects a comment opener (`//` or `/*`) ending exactly at `offset`.
///
/// Used after document edits to hint that the user just started a comment.
pub fn comment_marker_before(text: &str, offset: usize) -> Option<CommentMarker> {
    let offset = clamp_offset(text, offset);
    if offset < 2 {
        return None;
    }
    match &text.as_bytes()[offset - 2..offset] {
        b"//" => Some(CommentMarker::Line),
        b"/*" => Some(CommentMarker::Block),
        _ => None,
    }
}

/// True when more than 30% of the visible characters are CJK ideographs,
/// kana, hangul, or full-width and CJK punctuation.
pub fn is_native_text(content: &str) -> bool {
    let mut native = 0usize;
    let mut visible = 0usize;
    for c in content.chars() {
        if c.is_whitespace() || c == '\\' {
            continue;
        }
        visible += 1;
        if is_native_char(c) {
            native += 1;
        }
    }
    visible > 0 && native as f32 / visible as f32 > NATIVE_CONTENT_RATIO
}

fn is_native_char(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'   // CJK unified ideographs
        | '\u{3400}'..='\u{4DBF}' // extension A
        | '\u{3000}'..='\u{303F}' // CJK punctuation
        | '\u{3040}'..='\u{30FF}' // kana
        | '\u{AC00}'..='\u{D7AF}' // hangul syllables
        | '\u{FF00}'..='\u{FFEF}' // full-width forms
        | '\u{2018}' | '\u{2019}' | '\u{201C}' | '\u{201D}'
    )
}

fn clamp_offset(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Start (inclusive) and end (exclusive) of the line containing `offset`.
fn line_bounds(bytes: &[u8], offset: usize) -> (usize, usize) {
    let start = bytes[..offset]
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |i| i + 1);
    let end = bytes[offset..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |i| offset + i);
    (start, end)
}

/// Quote-parity tracker shared by all three tests.
#[derive(Debug, Default)]
struct Quotes {
    /// Delimiter and position of the literal currently open.
    open: Option<(u8, usize)>,
    escaped: bool,
    /// Treat `'` right after a letter or digit as part of a word (`don't`).
    words: bool,
    prev: u8,
}

impl Quotes {
    /// Tracker for the current-line tests.
    fn line() -> Self {
        Self {
            words: true,
            ..Self::default()
        }
    }

    /// Feeds the byte at `pos`. Returns true when it belongs to a quoted
    /// region, delimiters included.
    fn feed(&mut self, b: u8, pos: usize) -> bool {
        let prev = std::mem::replace(&mut self.prev, b);
        if b == b'\n' {
            *self = Self {
                words: self.words,
                ..Self::default()
            };
            return false;
        }
        if self.escaped {
            self.escaped = false;
            return self.open.is_some();
        }
        if b == b'\\' {
            self.escaped = true;
            return self.open.is_some();
        }
        match self.open {
            Some((quote, _)) => {
                if b == quote {
                    self.open = None;
                }
                true
            }
            None if b == b'\'' && self.words && prev.is_ascii_alphanumeric() => false,
            None if b == b'"' || b == b'\'' => {
                self.open = Some((b, pos));
                true
            }
            None => false,
        }
    }
}

/// Position of the quote left open at the end of `line`, if any.
fn open_quote(line: &[u8]) -> Option<usize> {
    let mut quotes = Quotes::line();
    for (i, &b) in line.iter().enumerate() {
        quotes.feed(b, i);
    }
    quotes.open.map(|(_, pos)| pos)
}

fn has_line_comment(line: &[u8]) -> bool {
    let mut quotes = Quotes::line();
    let mut i = 0;
    while i < line.len() {
        if !quotes.feed(line[i], i) && line[i] == b'/' && line.get(i + 1) == Some(&b'/') {
            return true;
        }
        i += 1;
    }
    false
}

/// Count of `/*` minus `*/` outside quoted regions, floored at zero.
/// Markers straddling the end of `bytes` are not counted.
fn block_depth(bytes: &[u8]) -> usize {
    let mut quotes = Quotes::default();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        if quotes.feed(bytes[i], i) {
            i += 1;
            continue;
        }
        match (bytes[i], bytes.get(i + 1)) {
            (b'/', Some(b'*')) => {
                depth += 1;
                i += 2;
            }
            (b'*', Some(b'/')) => {
                depth = depth.saturating_sub(1);
                i += 2;
            }
            _ => i += 1,
        }
    }
    depth
}

/// Reads the literal opened at `open` on `line`: its content up to the
/// closing quote (or the end of the line) and the identifier before it.
fn read_literal(line: &str, open: usize) -> StringLiteral {
    let bytes = line.as_bytes();
    let quote = bytes[open];
    let mut close = line.len();
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(open + 1) {
        if escaped {
            escaped = false;
        } else if b == b'\\' {
            escaped = true;
        } else if b == quote {
            close = i;
            break;
        }
    }

    let content = line[open + 1..close].trim_end_matches('\r');
    let content = if content.trim().is_empty() {
        None
    } else if is_native_text(content) {
        Some(Language::Native)
    } else {
        Some(Language::English)
    };

    StringLiteral {
        name: literal_name(&line[..open]),
        content,
    }
}

/// Last identifier of two or more characters before the opening quote.
fn literal_name(before: &str) -> Option<String> {
    before
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .rev()
        .find(|word| word.chars().count() >= 2 && !word.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
}
