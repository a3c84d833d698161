//! Human-readable renderings of analysis results.
//!
//! [`CitationDisplay`] draws citation spans under a sentence or block
//! quotation:
//!
//! ```text
//! See Smith v. State, 1 U.S. 1. Id. at 2.
//!     ╰──────────────────────╯[A] FullCase(Smith v. State) signal=see needs_review
//!                               ╰──────╯ Id pin=2
//!                                 └─refers_to─>[A]
//! ```

use std::collections::BTreeMap;
use std::fmt::{self, Write};
use std::ops::Range;

use unicode_width::UnicodeWidthStr;

use crate::citation::Citation;
use crate::document::Paragraph;
use crate::pipeline::BriefAnalysis;
use crate::proposition::PropositionKind;

/// Convert a zero-based index to a base-26 label: A, B, ..., Z, AA, AB, ...
fn index_to_base26_label(mut n: usize) -> String {
    let mut result = String::new();
    loop {
        let remainder = n % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

/// Citation spans laid under a piece of section text.
pub struct CitationDisplay<'a> {
    text: &'a str,
    offset: usize,
    citations: Vec<&'a Citation>,
}

impl<'a> CitationDisplay<'a> {
    /// `offset` is the position of `text` within the section text that
    /// citation spans index into.
    pub fn new(text: &'a str, offset: usize) -> Self {
        CitationDisplay {
            text,
            offset,
            citations: Vec::new(),
        }
    }

    /// Include the citations whose spans fall inside the text.
    pub fn with_citations(mut self, citations: impl IntoIterator<Item = &'a Citation>) -> Self {
        let (start, end) = (self.offset, self.offset + self.text.len());
        self.citations.extend(
            citations
                .into_iter()
                .filter(|c| c.span.start >= start && c.span.end <= end),
        );
        self
    }

    fn local(&self, span: &Range<usize>) -> Range<usize> {
        span.start - self.offset..span.end - self.offset
    }

    fn column(&self, pos: usize) -> usize {
        self.text
            .get(..pos)
            .map_or(pos, UnicodeWidthStr::width)
    }

    /// Labels for full citations that a back-reference in the display
    /// points to, keyed by case name.
    fn build_labels(&self) -> BTreeMap<String, (usize, String)> {
        let mut labels = BTreeMap::new();
        for (i, citation) in self.citations.iter().enumerate() {
            let Some(name) = &citation.case_name else {
                continue;
            };
            let referenced = self
                .citations
                .iter()
                .skip(i + 1)
                .any(|c| c.refers_to.as_ref() == Some(name));
            if referenced && !labels.contains_key(name) {
                let label = format!("[{}]", index_to_base26_label(labels.len()));
                labels.insert(name.clone(), (i, label));
            }
        }
        labels
    }
}

fn describe(citation: &Citation) -> String {
    let mut description = format!("{:?}", citation.kind);
    if let Some(name) = &citation.case_name {
        description.push_str(&format!("({})", name));
    }
    if let Some(pin) = &citation.pin_cite {
        description.push_str(&format!(" pin={}", pin));
    }
    if let Some(signal) = citation.signal() {
        description.push_str(&format!(" signal={}", signal));
    }
    if citation.needs_review() {
        description.push_str(" needs_review");
    }
    description
}

impl<'a> fmt::Display for CitationDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text)?;

        let labels = self.build_labels();

        for (i, citation) in self.citations.iter().enumerate() {
            f.write_char('\n')?;

            let local = self.local(&citation.span);
            let start_col = self.column(local.start);
            let end_col = self.column(local.end);
            for _ in 0..start_col {
                f.write_char(' ')?;
            }

            f.write_char('╰')?;
            for _ in (start_col + 1)..end_col.saturating_sub(1) {
                f.write_char('─')?;
            }
            if end_col - start_col > 1 {
                f.write_char('╯')?;
            }

            let label = citation
                .case_name
                .as_ref()
                .and_then(|name| labels.get(name))
                .filter(|(index, _)| *index == i);
            if let Some((_, label)) = label {
                f.write_str(label)?;
            }
            write!(f, " {}", describe(citation))?;

            if let Some(target) = &citation.refers_to {
                f.write_char('\n')?;
                for _ in 0..start_col + 2 {
                    f.write_char(' ')?;
                }
                match labels.get(target) {
                    Some((index, label)) if *index < i => write!(f, "└─refers_to─>{}", label)?,
                    _ => write!(f, "└─refers_to─>{:?}", target)?,
                }
            }
        }

        Ok(())
    }
}

impl PropositionKind {
    pub fn label(&self) -> &'static str {
        match self {
            PropositionKind::Statement => "statement",
            PropositionKind::Quotation => "quotation",
            PropositionKind::BlockQuotation => "block quotation",
            PropositionKind::Parenthetical => "parenthetical",
        }
    }
}

impl fmt::Display for BriefAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = &self.summary;
        write!(
            f,
            "pages {}-{}: {} citations, {} propositions",
            summary.start_page,
            summary.end_page,
            summary.total_citations,
            self.propositions.len()
        )?;
        if summary.needs_review > 0 {
            write!(f, ", {} need review", summary.needs_review)?;
        }
        if summary.layout_degraded {
            f.write_str(" (layout degraded)")?;
        }
        if summary.cases_match == Some(false) {
            f.write_str(" (table of authorities differs)")?;
        }

        for (i, proposition) in self.propositions.iter().enumerate() {
            write!(
                f,
                "\n{}. [{}] {}",
                i + 1,
                proposition.kind.label(),
                proposition.text
            )?;
            for citation in &proposition.citations {
                write!(f, "\n   - {}", citation.text)?;
            }
        }

        Ok(())
    }
}

impl BriefAnalysis {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Citation spans drawn under every sentence and block quotation that
    /// has citations.
    pub fn citation_displays(&self) -> Vec<CitationDisplay<'_>> {
        let mut displays = Vec::new();
        for paragraph in &self.paragraphs {
            match paragraph {
                Paragraph::Body { sentences, .. } => {
                    for sentence in sentences.iter().filter(|s| !s.citations.is_empty()) {
                        displays.push(
                            CitationDisplay::new(&sentence.text, sentence.range.start)
                                .with_citations(&sentence.citations),
                        );
                    }
                }
                Paragraph::BlockQuote(quote) => {
                    if let Some(lead_in) = quote.lead_in.as_ref().filter(|s| !s.citations.is_empty()) {
                        displays.push(
                            CitationDisplay::new(&lead_in.text, lead_in.range.start)
                                .with_citations(&lead_in.citations),
                        );
                    }
                    if !quote.citations.is_empty() {
                        displays.push(
                            CitationDisplay::new(&quote.text, quote.range.start)
                                .with_citations(&quote.citations),
                        );
                    }
                }
            }
        }
        displays
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::citation::CitationKind;

    #[test]
    fn test_index_to_base26_label() {
        assert_eq!(index_to_base26_label(0), "A");
        assert_eq!(index_to_base26_label(25), "Z");
        assert_eq!(index_to_base26_label(26), "AA");
        assert_eq!(index_to_base26_label(51), "AZ");
        assert_eq!(index_to_base26_label(702), "AAA");
    }

    #[test]
    fn test_citation_display() {
        let text = "See Smith v. State, 1 U.S. 1. Id. at 2.";
        let mut full = Citation::new(
            "Smith v. State, 1 U.S. 1",
            CitationKind::FullCase,
            4..28,
            Some("see".into()),
            None,
        );
        full.case_name = Some("Smith v. State".into());
        let mut id = Citation::new("Id. at 2", CitationKind::Id, 30..38, None, None);
        id.pin_cite = Some("2".into());
        id.refers_to = Some("Smith v. State".into());
        let citations = vec![full, id];

        let display = CitationDisplay::new(text, 0).with_citations(&citations);
        insta::assert_snapshot!(display.to_string(), @r###"
        See Smith v. State, 1 U.S. 1. Id. at 2.
            ╰──────────────────────╯[A] FullCase(Smith v. State) signal=see needs_review
                                      ╰──────╯ Id pin=2
                                        └─refers_to─>[A]
        "###);
    }

    #[test]
    fn test_offset_and_unlabeled_target() {
        let text = "Jones, 5 F.3d at 9.";
        let mut short = Citation::new("Jones, 5 F.3d at 9", CitationKind::ShortCase, 100..118, None, None);
        short.refers_to = Some("Jones v. Doe".into());
        let outside = Citation::new("Id.", CitationKind::Id, 10..13, None, None);
        let citations = vec![outside, short];

        let display = CitationDisplay::new(text, 100).with_citations(&citations);
        insta::assert_snapshot!(display.to_string(), @r###"
        Jones, 5 F.3d at 9.
        ╰────────────────╯ ShortCase
          └─refers_to─>"Jones v. Doe"
        "###);
    }
}
