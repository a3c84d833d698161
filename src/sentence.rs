//! Sentence segmentation for legal prose.
//!
//! A period, question mark or exclamation point ends a sentence only when the
//! next non-space character starts a new sentence (an uppercase letter, or an
//! opening quote followed by one) and the mark is not part of an abbreviation.
//!
//! Citations are dense with periods ("S.W.3d", "Tex. App.", "U.S."), so the
//! abbreviation test errs toward keeping text together: a missed boundary
//! merges two sentences, a false one cuts a citation in half.

use std::collections::HashSet;
use std::ops::Range;

/// Abbreviations that never end a sentence, lowercase and without the final period.
pub const LEGAL_ABBREVIATIONS: &[&str] = &[
    // Case names and parties
    "v", "vs", "inc", "ltd", "corp", "co", "jr", "sr", "mr", "mrs", "ms", "dr", "prof", "rep",
    "sen", "st", "et", "al", "ass", "gov", "gen",
    // Courts and procedure
    "app", "crim", "civ", "ct", "dist", "supp", "rev", "stat", "ann", "ch", "cl", "div", "ed",
    "ex", "fed", "proc", "evid", "art", "cir", "pet", "op", "cert", "reh", "aff", "mem",
    "ref'd", "dism'd",
    // Code names
    "prac", "rem", "transp", "fam", "educ", "occ", "ins", "bus", "prop", "gov't", "util",
    // Signals and latin
    "e.g", "cf", "i.e",
    // Reporters
    "f", "l", "r", "s", "w", "p", "n", "u.s", "s.w", "n.w", "s.e", "n.e", "s.w.2d",
    "s.w.3d", "n.w.2d", "n.e.2d", "n.e.3d", "s.e.2d", "so.2d", "so.3d", "p.2d", "p.3d", "f.2d",
    "f.3d", "f.4th", "l.ed", "l.ed.2d", "s.ct", "tex.app", "tex.crim.app",
    // States
    "tex", "cal", "n.y", "fla", "ala", "ariz", "ark", "colo", "conn", "del", "ga", "haw", "ind",
    "kan", "ky", "la", "md", "mich", "minn", "mo", "mont", "neb", "nev", "n.j", "n.m", "n.c",
    "n.d", "s.c", "s.d", "n.h", "r.i", "okla", "pa", "tenn", "va", "w.va", "vt", "wis", "wyo",
];

/// Abbreviations that are also ordinary English words. They only count when
/// capitalized ("Ill.", "So. 2d"); "No." additionally needs a docket or
/// exhibit number after it.
pub const WORD_ABBREVIATIONS: &[&str] = &["no", "nos", "so", "ill", "mass", "miss", "wash"];

/// Abbreviation-aware sentence segmenter.
#[derive(Debug, Clone)]
pub struct SentenceSegmenter {
    abbreviations: HashSet<String>,
}

impl SentenceSegmenter {
    pub fn new() -> Self {
        SentenceSegmenter {
            abbreviations: LEGAL_ABBREVIATIONS.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Add abbreviations (with or without the trailing period).
    pub fn with_custom_abbreviations(mut self, abbreviations: &[&str]) -> Self {
        for abbrev in abbreviations {
            self.abbreviations
                .insert(abbrev.trim_end_matches('.').to_lowercase());
        }
        self
    }

    /// Split `text` into sentences.
    ///
    /// Never empty for text that contains anything but whitespace.
    pub fn segment(&self, text: &str) -> Vec<String> {
        self.split(text)
            .into_iter()
            .map(|range| text[range].to_string())
            .collect()
    }

    /// Split `text` into trimmed byte ranges, one per sentence.
    pub fn split(&self, text: &str) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let mut start = 0;

        for (i, c) in text.char_indices() {
            if !matches!(c, '.' | '!' | '?') || i < start {
                continue;
            }

            // Closing quotes stay with the sentence they close
            let mut end = i + c.len_utf8();
            while let Some(q) = text[end..].chars().next() {
                if !is_closing_quote(q) {
                    break;
                }
                end += q.len_utf8();
            }

            let rest = text[end..].trim_start();
            let boundary = if rest.is_empty() {
                true
            } else if starts_sentence(rest) {
                c != '.' || !self.is_abbreviation_at(text, i, rest)
            } else {
                false
            };

            if boundary {
                push_trimmed(text, start..end, &mut ranges);
                start = end;
            }
        }

        push_trimmed(text, start..text.len(), &mut ranges);
        ranges
    }

    /// Whether the period at byte `dot` belongs to an abbreviation.
    fn is_abbreviation_at(&self, text: &str, dot: usize, rest: &str) -> bool {
        let word = word_ending_at(text, dot);
        self.is_abbreviation(word, rest) || self.continues_abbreviation(word, rest)
    }

    /// Check a period-terminated token against the abbreviation rules.
    fn is_abbreviation(&self, word: &str, rest: &str) -> bool {
        let normalized = word.trim_end_matches('.').to_lowercase();
        if normalized.is_empty() {
            return false;
        }
        if WORD_ABBREVIATIONS.contains(&normalized.as_str()) {
            return is_word_abbreviation(word, &normalized, rest);
        }
        if self.abbreviations.contains(&normalized) {
            return true;
        }

        let chars: Vec<char> = word.chars().collect();

        // Initials: "A."
        if chars.len() == 2 && chars[0].is_uppercase() && chars[1] == '.' {
            return true;
        }

        // Postal state codes: "TX."
        if chars.len() == 3
            && chars[0].is_ascii_uppercase()
            && chars[1].is_ascii_uppercase()
            && chars[2] == '.'
        {
            return true;
        }

        // Reporter series on their own: "2d." "4th."
        is_series_suffix(&normalized)
    }

    /// Look-ahead for multi-token abbreviations such as "U. S." where the
    /// current token is a single letter and the next is another.
    fn continues_abbreviation(&self, word: &str, rest: &str) -> bool {
        let chars: Vec<char> = word.chars().collect();
        if chars.len() != 2 || !chars[0].is_alphabetic() {
            return false;
        }

        let mut next = rest.chars();
        let (Some(letter), Some('.')) = (next.next(), next.next()) else {
            return false;
        };
        if !letter.is_alphabetic() {
            return false;
        }

        let combined = format!("{}.{}", chars[0], letter).to_lowercase();
        if self.abbreviations.contains(&combined) {
            return true;
        }

        "UNSEW".contains(chars[0].to_ascii_uppercase())
            && "SYEWTC".contains(letter.to_ascii_uppercase())
    }
}

impl Default for SentenceSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

/// Segment text with the default legal abbreviation set.
pub fn segment_sentences(text: &str) -> Vec<String> {
    SentenceSegmenter::new().segment(text)
}

fn is_word_abbreviation(word: &str, normalized: &str, rest: &str) -> bool {
    if !word.starts_with(char::is_uppercase) {
        return false;
    }
    match normalized {
        "no" | "nos" => rest
            .split_whitespace()
            .next()
            .map_or(false, |next| next.contains(|c: char| c.is_ascii_digit())),
        _ => true,
    }
}

fn push_trimmed(text: &str, range: Range<usize>, ranges: &mut Vec<Range<usize>>) {
    let slice = &text[range.clone()];
    let leading = slice.len() - slice.trim_start().len();
    let trailing = slice.len() - slice.trim_end().len();
    if leading + trailing < slice.len() {
        ranges.push(range.start + leading..range.end - trailing);
    }
}

/// The maximal run of alphanumerics, periods, hyphens and apostrophes
/// ending at `dot` (inclusive).
fn word_ending_at(text: &str, dot: usize) -> &str {
    let start = text[..dot]
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_alphanumeric() || matches!(c, '.' | '-' | '\'' | '\u{2019}'))
        .last()
        .map_or(dot, |(idx, _)| idx);
    &text[start..dot + 1]
}

fn is_series_suffix(word: &str) -> bool {
    let digits = word.chars().take_while(|c| c.is_ascii_digit()).count();
    digits > 0 && matches!(&word[digits..], "d" | "th")
}

fn starts_sentence(rest: &str) -> bool {
    let mut chars = rest.chars();
    match chars.next() {
        Some(c) if c.is_uppercase() => true,
        Some(c) if is_opening_quote(c) => chars.next().map_or(false, |n| n.is_uppercase()),
        _ => false,
    }
}

fn is_opening_quote(c: char) -> bool {
    matches!(c, '"' | '\'' | '\u{201c}' | '\u{2018}')
}

fn is_closing_quote(c: char) -> bool {
    matches!(c, '"' | '\'' | '\u{201d}' | '\u{2019}')
}
