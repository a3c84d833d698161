//! Citation span resolution.
//!
//! Expands a token's base span to the full citation text. Never fails: a
//! missing extension only leaves the span narrower.

use std::ops::Range;

use crate::text::{clamp_range, tail_chars, word_boundary_before};
use crate::token::{CitationToken, TokenKind};

/// Resolve the full byte span of `token` within `text`.
pub fn resolve_span(text: &str, token: &CitationToken, antecedent_lookback: usize) -> Range<usize> {
    let base = clamp_range(text, &token.span.base);

    match &token.kind {
        TokenKind::FullCase { .. } => token
            .span
            .full
            .as_ref()
            .map_or(base, |full| clamp_range(text, full)),
        TokenKind::ShortCase {
            antecedent_guess, ..
        } => {
            if let Some(full) = &token.span.full {
                return clamp_range(text, full);
            }
            antecedent_guess
                .as_deref()
                .and_then(|guess| antecedent_start(text, base.start, guess, antecedent_lookback))
                .map_or(base.clone(), |start| start..base.end)
        }
        TokenKind::Id { .. } | TokenKind::Supra { .. } | TokenKind::Unknown => base,
    }
}

/// Find `<antecedent>,` directly before `before` and return where it starts.
fn antecedent_start(text: &str, before: usize, guess: &str, lookback: usize) -> Option<usize> {
    let guess = guess.trim();
    if guess.is_empty() {
        return None;
    }

    let window = tail_chars(&text[..before], lookback);
    let window_start = before - window.len();
    let name = window.trim_end().strip_suffix(',')?.trim_end();
    let start = name.len().checked_sub(guess.len())?;

    let matches = name
        .get(start..)
        .map_or(false, |tail| tail.eq_ignore_ascii_case(guess));
    (matches && word_boundary_before(name, start)).then_some(window_start + start)
}
