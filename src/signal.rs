//! Signal and explanatory-parenthetical detection around a citation span.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::text::{head_chars, tail_chars, word_boundary_before};

/// Introductory signals, longest first so "see also" wins over "see".
pub const SIGNALS: &[&str] = &[
    "see generally",
    "see, e.g.,",
    "see also",
    "but see",
    "but cf.",
    "compare",
    "contra",
    "accord",
    "citing",
    "e.g.,",
    "cf.",
    "see",
];

/// Verbs that open an explanatory parenthetical.
pub const PARENTHETICAL_VERBS: &[&str] = &[
    "holding",
    "stating",
    "finding",
    "noting",
    "explaining",
    "observing",
    "concluding",
    "reasoning",
    "emphasizing",
    "recognizing",
    "determining",
    "clarifying",
    "reaffirming",
    "affirming",
    "reversing",
    "quoting",
    "citing",
    "discussing",
    "describing",
    "providing",
    "defining",
    "establishing",
    "requiring",
    "permitting",
    "allowing",
    "prohibiting",
];

static QUOTED_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"["\u{201c}\u{201d}]([^"\u{201c}\u{201d}]+)["\u{201c}\u{201d}]"#)
        .expect("Invalid quotation regex")
});

/// An explanatory parenthetical following a citation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parenthetical {
    /// The introducing verb as written ("holding").
    pub verb: String,
    /// Text after the verb, without a leading "that".
    pub content: String,
    /// Quoted runs inside the parenthetical.
    pub quotations: Vec<String>,
    /// Byte range from `(` through `)` inclusive.
    pub range: Range<usize>,
}

/// Find the signal at the very end of `text`, ignoring trailing whitespace.
///
/// Returns the signal's byte offset in `text` and its canonical form.
pub fn trailing_signal(text: &str) -> Option<(usize, &'static str)> {
    let trimmed = text.trim_end();
    let lower = trimmed.to_ascii_lowercase();

    SIGNALS.iter().find_map(|signal| {
        if !lower.ends_with(signal) {
            return None;
        }
        let start = lower.len() - signal.len();
        word_boundary_before(&lower, start).then_some((start, *signal))
    })
}

/// Detect a signal in the `lookback` characters before `span_start`.
pub fn detect_signal(text: &str, span_start: usize, lookback: usize) -> Option<&'static str> {
    let window = tail_chars(&text[..span_start], lookback);
    trailing_signal(window).map(|(_, signal)| signal)
}

/// Remove a trailing signal from `text`, returning what precedes it.
pub fn strip_trailing_signal(text: &str) -> &str {
    match trailing_signal(text) {
        Some((start, _)) => &text[..start],
        None => text,
    }
}

/// Detect an explanatory parenthetical starting within `lookahead`
/// characters after `span_end`.
///
/// The closing parenthesis is searched no further than `limit` (the end of
/// the enclosing paragraph). An unbalanced parenthetical yields `None`.
pub fn detect_parenthetical(
    text: &str,
    span_end: usize,
    lookahead: usize,
    limit: usize,
) -> Option<Parenthetical> {
    let limit = limit.min(text.len());
    if span_end >= limit {
        return None;
    }

    let after = &text[span_end..limit];
    let window_len = after
        .char_indices()
        .nth(lookahead)
        .map_or(after.len(), |(idx, _)| idx);
    let window = &after[..window_len];
    let open = span_end + (window.len() - window.trim_start().len());
    if !window.trim_start().starts_with('(') {
        return None;
    }

    let inner = &text[open + 1..limit];
    let inner_trimmed = inner.trim_start();
    let verb_start = open + 1 + (inner.len() - inner_trimmed.len());
    let verb = match_verb(inner_trimmed)?;

    let mut depth = 1usize;
    let mut close = None;
    for (idx, c) in text[open + 1..limit].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(open + 1 + idx);
                    break;
                }
            }
            _ => {}
        }
    }
    let close = close?;

    let verb_end = verb_start + verb.len();
    let body = text[verb_end.min(close)..close].trim();
    let content = strip_leading_that(body).trim().to_string();
    let quotations = find_quotations(&text[open + 1..close]);

    Some(Parenthetical {
        verb: text[verb_start..verb_end].to_string(),
        content,
        quotations,
        range: open..close + 1,
    })
}

fn match_verb(text: &str) -> Option<&'static str> {
    let lower = head_chars(text, 20).to_ascii_lowercase();
    PARENTHETICAL_VERBS.iter().copied().find(|verb| {
        lower.starts_with(verb)
            && lower[verb.len()..]
                .chars()
                .next()
                .map_or(true, |c| !c.is_alphabetic())
    })
}

fn strip_leading_that(text: &str) -> &str {
    let lower = text.get(..5).map(str::to_ascii_lowercase);
    match lower.as_deref() {
        Some("that ") => &text[5..],
        _ if text.eq_ignore_ascii_case("that") => "",
        _ => text,
    }
}

/// Quoted runs between straight or curly double quotes.
pub fn find_quotations(text: &str) -> Vec<String> {
    QUOTED_RUN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|q| !q.is_empty())
        .collect()
}

/// Whether `text` holds a quoted run of at least `min_chars` characters.
pub fn has_substantial_quotation(text: &str, min_chars: usize) -> bool {
    QUOTED_RUN.captures_iter(text).any(|caps| {
        caps.get(1)
            .map_or(false, |m| m.as_str().chars().count() >= min_chars)
    })
}
