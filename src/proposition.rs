//! Proposition attribution: what text each citation supports.
//!
//! Citations are walked in document order. Each one looks at the text
//! between the previous citation and itself; if that text carries a new
//! assertion it opens a new string-cite group, otherwise (bare `;`, `and`,
//! a signal) it joins the current group and shares its proposition.

use std::collections::BTreeMap;
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::citation::Citation;
use crate::document::Unit;
use crate::signal::{find_quotations, has_substantial_quotation, strip_trailing_signal};
use crate::text::collapse_whitespace;

static ANNOTATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\([^)]*(?:added|omitted|altered|supplied|cleaned up|quotation marks?|citations?|internal|emphasis|footnote)[^)]*\)\s*\.?\s*",
    )
    .expect("Invalid annotation regex")
});

const CONNECTORS: &[&str] = &["and", "or", "but"];

/// What kind of support a proposition describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropositionKind {
    Statement,
    Quotation,
    BlockQuotation,
    Parenthetical,
}

/// A proposition and the citations that support it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Proposition {
    pub text: String,
    pub kind: PropositionKind,
    pub citations: Vec<Citation>,
    pub string_cite_group: usize,
    /// Inline quotations in the proposition text.
    pub quotations: Vec<String>,
    /// Index of the linked block quotation.
    pub block_quote: Option<usize>,
}

/// The attribution decided for one citation.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribution {
    pub text: String,
    pub kind: PropositionKind,
    pub string_cite_group: usize,
    /// Joined an existing group instead of opening one.
    pub string_cite: bool,
    pub quotations: Vec<String>,
    pub block_quote: Option<usize>,
}

impl Attribution {
    fn new(text: String, group: usize, string_cite: bool, quotation_min_chars: usize) -> Self {
        let kind = if has_substantial_quotation(&text, quotation_min_chars) {
            PropositionKind::Quotation
        } else {
            PropositionKind::Statement
        };
        Attribution {
            quotations: find_quotations(&text),
            text,
            kind,
            string_cite_group: group,
            string_cite,
            block_quote: None,
        }
    }
}

/// Byte offset after a citation and its parenthetical.
pub fn resolved_end(citation: &Citation) -> usize {
    citation
        .parenthetical()
        .map_or(citation.span.end, |p| p.range.end.max(citation.span.end))
}

/// Strip residue from the text before a citation: leading punctuation left
/// over from the previous citation, annotation parentheticals such as
/// "(emphasis added)", and a trailing signal.
pub fn clean_preceding(raw: &str) -> String {
    let mut text = trim_leading_residue(raw);
    while let Some(m) = ANNOTATION.find(text) {
        text = trim_leading_residue(&text[m.end()..]);
    }
    collapse_whitespace(strip_trailing_signal(text))
}

fn trim_leading_residue(text: &str) -> &str {
    text.trim_start_matches(|c: char| c.is_whitespace() || ".,;:!?".contains(c))
}

/// Nothing left but punctuation or a bare connector.
fn is_string_cite_residue(text: &str) -> bool {
    let stripped = text.trim_matches(|c: char| c.is_whitespace() || ";,.".contains(c));
    stripped.is_empty()
        || CONNECTORS
            .iter()
            .any(|connector| stripped.eq_ignore_ascii_case(connector))
}

/// Final shape of proposition text: sentence-ending punctuation stays,
/// trailing commas, semicolons, colons and dashes go.
fn finish_text(text: &str) -> String {
    text.trim_end_matches(|c: char| c.is_whitespace() || ",;:-".contains(c))
        .trim_start()
        .to_string()
}

/// Units where citations sit inside the sentence between `--` markers.
///
/// Maps unit index to the joined proposition text.
fn mid_sentence_propositions(
    text: &str,
    units: &[Unit],
    citations: &[Citation],
    unit_of: &[usize],
) -> BTreeMap<usize, String> {
    let mut per_unit: BTreeMap<usize, (usize, usize)> = BTreeMap::new();
    for (i, &u) in unit_of.iter().enumerate() {
        per_unit.entry(u).and_modify(|(_, last)| *last = i).or_insert((i, i));
    }

    let mut found = BTreeMap::new();
    for (u, (first, last)) in per_unit {
        let Some(unit) = units.get(u) else {
            continue;
        };
        let before_end = citations[first].span.start.max(unit.range.start);
        let after_start = resolved_end(&citations[last]).min(unit.range.end);
        if after_start < before_end {
            continue;
        }

        let before = strip_trailing_signal(&text[unit.range.start..before_end]).trim_end();
        let after = text[after_start..unit.range.end].trim_start();
        if !before.ends_with("--") || !after.starts_with("--") {
            continue;
        }

        let joined = format!(
            "{} {}",
            before.trim_end_matches('-').trim(),
            after.trim_start_matches('-').trim()
        );
        found.insert(u, finish_text(&collapse_whitespace(&joined)));
    }
    found
}

/// Accumulator threaded through the citation sequence.
#[derive(Debug, Default)]
struct AttributorState {
    last_text: Option<String>,
    group: usize,
    previous_end: Option<usize>,
    previous_unit: Option<usize>,
    mid_sentence_groups: BTreeMap<usize, usize>,
    attributions: Vec<Attribution>,
}

impl AttributorState {
    fn step(
        mut self,
        text: &str,
        units: &[Unit],
        mid_sentence: &BTreeMap<usize, String>,
        citation: &Citation,
        u: usize,
        quotation_min_chars: usize,
    ) -> Self {
        let attribution = if let Some(joined) = mid_sentence.get(&u) {
            let group = match self.mid_sentence_groups.get(&u) {
                Some(&group) => group,
                None => {
                    self.group += 1;
                    self.mid_sentence_groups.insert(u, self.group);
                    self.last_text = Some(joined.clone());
                    self.group
                }
            };
            log::trace!("{:?}: mid-sentence proposition", citation.text);
            Attribution::new(joined.clone(), group, false, quotation_min_chars)
        } else {
            let preceding = self.preceding_text(text, units, citation, u);
            self.attribute(preceding, citation, quotation_min_chars)
        };

        self.previous_end = Some(resolved_end(citation));
        self.previous_unit = Some(u);
        self.attributions.push(attribution);
        self
    }

    /// Text the citation can draw its proposition from.
    fn preceding_text(&self, text: &str, units: &[Unit], citation: &Citation, u: usize) -> String {
        let floor = self.previous_end.unwrap_or(0);
        let span_start = citation.span.start;
        let window = |from: usize| -> Range<usize> { floor.max(from).min(span_start)..span_start };

        let unit_start = units.get(u).map_or(0, |unit| unit.range.start);
        let preceding = clean_preceding(&text[window(unit_start)]);

        // A citation standing alone supports the sentence before it
        let opens_unit = self.previous_unit != Some(u);
        if preceding.is_empty() && opens_unit && u > 0 {
            if let Some(previous) = units.get(u - 1) {
                return clean_preceding(&text[window(previous.range.start)]);
            }
        }
        preceding
    }

    fn attribute(&mut self, preceding: String, citation: &Citation, quotation_min_chars: usize) -> Attribution {
        if is_string_cite_residue(&preceding) {
            if let Some(last) = &self.last_text {
                log::trace!("{:?}: string cite in group {}", citation.text, self.group);
                return Attribution::new(last.clone(), self.group, true, quotation_min_chars);
            }
            self.group += 1;
            self.last_text = Some(String::new());
            return Attribution::new(String::new(), self.group, true, quotation_min_chars);
        }

        self.group += 1;
        let text = finish_text(&preceding);
        log::trace!("{:?}: new proposition in group {}", citation.text, self.group);
        self.last_text = Some(text.clone());
        Attribution::new(text, self.group, false, quotation_min_chars)
    }
}

/// Attribute a proposition to every citation, in order.
///
/// `unit_of[i]` is the unit index of `citations[i]`.
pub fn attribute_propositions(
    text: &str,
    units: &[Unit],
    citations: &[Citation],
    unit_of: &[usize],
    quotation_min_chars: usize,
) -> Vec<Attribution> {
    let mid_sentence = mid_sentence_propositions(text, units, citations, unit_of);

    citations
        .iter()
        .zip(unit_of)
        .fold(AttributorState::default(), |state, (citation, &u)| {
            state.step(text, units, &mid_sentence, citation, u, quotation_min_chars)
        })
        .attributions
}

/// Group attributions into propositions.
///
/// Consecutive citations in one string-cite group form one proposition. A
/// citation with both a signal and a parenthetical adds a separate
/// parenthetical proposition right after its group.
pub fn assemble_propositions(attributions: &[Attribution], citations: &[Citation]) -> Vec<Proposition> {
    let mut propositions = Vec::new();
    let mut i = 0;

    while i < attributions.len() {
        let group = attributions[i].string_cite_group;
        let mut j = i + 1;
        while j < attributions.len() && attributions[j].string_cite_group == group {
            j += 1;
        }

        let members = &attributions[i..j];
        let block_quote = members.iter().find_map(|a| a.block_quote);
        let (kind, quotations) = match block_quote {
            Some(_) => (PropositionKind::BlockQuotation, Vec::new()),
            None => (members[0].kind, members[0].quotations.clone()),
        };

        propositions.push(Proposition {
            text: members[0].text.clone(),
            kind,
            citations: citations[i..j].to_vec(),
            string_cite_group: group,
            quotations,
            block_quote,
        });

        for citation in &citations[i..j] {
            if let (Some(_), Some(parenthetical)) = (citation.signal(), citation.parenthetical()) {
                propositions.push(Proposition {
                    text: parenthetical.content.clone(),
                    kind: PropositionKind::Parenthetical,
                    citations: vec![citation.clone()],
                    string_cite_group: group,
                    quotations: parenthetical.quotations.clone(),
                    block_quote: None,
                });
            }
        }

        i = j;
    }

    propositions
}
