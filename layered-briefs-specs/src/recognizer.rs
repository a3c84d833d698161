//! Fixture-backed stand-ins for the external collaborators: a citation
//! recognizer that finds citations by text, and a case-record table.

use std::ops::Range;

use layered_briefs::{
    CaseRecord, CaseRecordLookup, CitationKind, CitationRecognizer, CitationToken, Reference,
    TokenKind, TokenSpan,
};

use crate::fixture::{CitationSpec, RecordSpec};

/// Byte range of the `n`th occurrence of `needle` in `text`.
pub fn find_occurrence(text: &str, needle: &str, n: usize) -> Option<Range<usize>> {
    text.match_indices(needle)
        .nth(n)
        .map(|(start, _)| start..start + needle.len())
}

/// Recognizes exactly the citations a fixture lists.
#[derive(Debug, Clone)]
pub struct FixtureRecognizer {
    specs: Vec<CitationSpec>,
}

impl FixtureRecognizer {
    pub fn new(specs: &[CitationSpec]) -> Self {
        FixtureRecognizer {
            specs: specs.to_vec(),
        }
    }

    /// Indices of argument specs whose text does not occur in `text`.
    pub fn missing(&self, text: &str) -> Vec<usize> {
        self.specs
            .iter()
            .enumerate()
            .filter(|(_, spec)| !spec.table_only)
            .filter(|(_, spec)| find_occurrence(text, &spec.text, spec.occurrence).is_none())
            .map(|(i, _)| i)
            .collect()
    }

    fn token(spec: &CitationSpec, text: &str) -> Option<CitationToken> {
        let full = find_occurrence(text, &spec.text, spec.occurrence)?;
        let base = match &spec.base {
            Some(base) => {
                let offset = spec.text.find(base.as_str())?;
                full.start + offset..full.start + offset + base.len()
            }
            None => full.clone(),
        };

        let reference = || {
            Reference::new(
                spec.volume.clone().unwrap_or_default(),
                spec.reporter.clone().unwrap_or_default(),
                spec.page.as_deref(),
            )
        };
        let kind = match spec.kind {
            CitationKind::FullCase => TokenKind::FullCase {
                reference: reference(),
                pin_cite: spec.pin_cite.clone(),
                plaintiff: spec.plaintiff.clone(),
                defendant: spec.defendant.clone(),
            },
            CitationKind::ShortCase => TokenKind::ShortCase {
                reference: reference(),
                pin_cite: spec.pin_cite.clone(),
                antecedent_guess: spec.antecedent.clone(),
            },
            CitationKind::Id => TokenKind::Id {
                pin_cite: spec.pin_cite.clone(),
            },
            CitationKind::Supra => TokenKind::Supra {
                pin_cite: spec.pin_cite.clone(),
                antecedent_guess: spec.antecedent.clone(),
            },
            CitationKind::Unknown => TokenKind::Unknown,
        };

        let span = if base == full {
            TokenSpan::new(base)
        } else {
            TokenSpan::new(base).with_full(full)
        };
        Some(CitationToken::new(kind, span))
    }
}

impl CitationRecognizer for FixtureRecognizer {
    fn recognize(&self, text: &str) -> Vec<CitationToken> {
        self.specs
            .iter()
            .filter_map(|spec| Self::token(spec, text))
            .collect()
    }
}

/// External case records listed in a fixture.
#[derive(Debug, Clone, Default)]
pub struct RecordTable {
    records: Vec<(String, CaseRecord)>,
}

impl RecordTable {
    pub fn new(specs: &[RecordSpec]) -> Self {
        let records = specs
            .iter()
            .map(|spec| {
                let mut citations = vec![spec.citation.clone()];
                citations.extend(spec.parallel.iter().cloned());
                let record = CaseRecord {
                    case_name: spec.case_name.clone(),
                    citations,
                    cluster_id: None,
                };
                (spec.citation.clone(), record)
            })
            .collect();
        RecordTable { records }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl CaseRecordLookup for RecordTable {
    fn lookup(&self, reference: &Reference) -> Option<CaseRecord> {
        let page = reference.page.as_deref()?;
        let key = format!("{} {} {}", reference.volume, reference.reporter, page);
        self.records
            .iter()
            .find(|(citation, _)| *citation == key)
            .map(|(_, record)| record.clone())
    }
}
