//! Text normalization and character-window helpers.
//!
//! Section text is normalized once, before sentence segmentation and citation
//! recognition. All spans produced by the pipeline are byte offsets into the
//! normalized text.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

static UNDERSCORE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_{2,}").expect("Invalid underscore regex"));

/// Normalize raw paragraph text for segmentation and citation recognition.
///
/// - merges words hyphenated across a line break (`word-\nword` -> `wordword`)
/// - turns em/en dashes into a spaced double hyphen (` -- `)
/// - drops underscore runs (signature lines, blanks)
/// - collapses all whitespace to single spaces
pub fn normalize_text(raw: &str) -> String {
    let merged = merge_hyphenation(raw);
    let dashed = merged.replace(['\u{2014}', '\u{2013}'], " -- ");
    let cleaned = UNDERSCORE_RUN.replace_all(&dashed, " ");
    collapse_whitespace(&cleaned)
}

/// Join hyphenated line breaks: an alphanumeric, a hyphen, optional spaces,
/// a newline, then an alphanumeric.
pub fn merge_hyphenation(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '-' && i > 0 && chars[i - 1].is_alphanumeric() {
            let mut j = i + 1;
            while j < chars.len() && (chars[j] == ' ' || chars[j] == '\t') {
                j += 1;
            }
            if j < chars.len() && chars[j] == '\n' {
                let mut k = j + 1;
                while k < chars.len() && chars[k].is_whitespace() {
                    k += 1;
                }
                if k < chars.len() && chars[k].is_alphanumeric() {
                    i = k;
                    continue;
                }
            }
        }
        out.push(c);
        i += 1;
    }

    out
}

/// Collapse every whitespace run to one space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The last `n` characters of `text`.
pub fn tail_chars(text: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    match text.char_indices().rev().nth(n - 1) {
        Some((idx, _)) => &text[idx..],
        None => text,
    }
}

/// The first `n` characters of `text`.
pub fn head_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Clamp a byte range to `text`, moving both ends onto char boundaries.
///
/// Recognizer spans are trusted but never allowed to panic a slice.
pub fn clamp_range(text: &str, range: &Range<usize>) -> Range<usize> {
    let mut start = range.start.min(text.len());
    let mut end = range.end.min(text.len()).max(start);
    while !text.is_char_boundary(start) {
        start -= 1;
    }
    while !text.is_char_boundary(end) {
        end += 1;
    }
    start..end
}

/// Whether the character before byte `pos` is absent or not alphanumeric.
pub fn word_boundary_before(text: &str, pos: usize) -> bool {
    text[..pos]
        .chars()
        .next_back()
        .map_or(true, |c| !c.is_alphanumeric())
}
