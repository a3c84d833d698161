//! Resolved citations, external case records, and case-name handling.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::signal::Parenthetical;
use crate::token::{Reference, TokenKind};

static SIC_ANNOTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*\[sic\]\s*").expect("Invalid sic regex"));

static LEADING_PAGE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\s+").expect("Invalid page number regex"));

static VERSUS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+v\.?\s+").expect("Invalid versus regex"));

/// The form of a citation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitationKind {
    FullCase,
    ShortCase,
    Id,
    Supra,
    Unknown,
}

impl From<&TokenKind> for CitationKind {
    fn from(kind: &TokenKind) -> Self {
        match kind {
            TokenKind::FullCase { .. } => CitationKind::FullCase,
            TokenKind::ShortCase { .. } => CitationKind::ShortCase,
            TokenKind::Id { .. } => CitationKind::Id,
            TokenKind::Supra { .. } => CitationKind::Supra,
            TokenKind::Unknown => CitationKind::Unknown,
        }
    }
}

/// A case record from an external case-law source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub case_name: String,
    /// Parallel citations, e.g. `["184 S.W.3d 242", "2006 WL 12345"]`.
    pub citations: Vec<String>,
    #[serde(default)]
    pub cluster_id: Option<u64>,
}

impl CaseRecord {
    pub fn new(case_name: impl Into<String>, citations: &[&str]) -> Self {
        CaseRecord {
            case_name: case_name.into(),
            citations: citations.iter().map(|c| c.to_string()).collect(),
            cluster_id: None,
        }
    }

    /// Authoritative start page: the last part of the first citation that
    /// has at least three whitespace-separated parts and a numeric page.
    pub fn start_page(&self) -> Option<u32> {
        self.citations.iter().find_map(|citation| {
            let parts: Vec<&str> = citation.split_whitespace().collect();
            if parts.len() >= 3 {
                parts.last().and_then(|page| page.parse().ok())
            } else {
                None
            }
        })
    }
}

/// Looks up external case records by reporter reference.
pub trait CaseRecordLookup {
    fn lookup(&self, reference: &Reference) -> Option<CaseRecord>;
}

impl<F> CaseRecordLookup for F
where
    F: Fn(&Reference) -> Option<CaseRecord>,
{
    fn lookup(&self, reference: &Reference) -> Option<CaseRecord> {
        self(reference)
    }
}

/// Per-run memo over a [`CaseRecordLookup`].
///
/// Created for one document run and dropped with it, so nothing looked up
/// for one brief can leak into another.
pub struct RecordCache<'a> {
    lookup: &'a dyn CaseRecordLookup,
    entries: BTreeMap<(String, String, String), Option<CaseRecord>>,
}

impl<'a> RecordCache<'a> {
    pub fn new(lookup: &'a dyn CaseRecordLookup) -> Self {
        RecordCache {
            lookup,
            entries: BTreeMap::new(),
        }
    }

    /// Fetch the record for a reference with a start page.
    pub fn get(&mut self, reference: &Reference) -> Option<CaseRecord> {
        let page = reference.page.clone()?;
        let key = (reference.volume.clone(), reference.reporter.clone(), page);
        let lookup = self.lookup;
        self.entries
            .entry(key)
            .or_insert_with(|| lookup.lookup(reference))
            .clone()
    }

    /// Number of distinct references looked up so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A citation with its resolved span and attached context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Citation {
    pub text: String,
    pub kind: CitationKind,
    /// Byte range in the normalized section text.
    pub span: Range<usize>,
    pub case_name: Option<String>,
    signal: Option<String>,
    parenthetical: Option<Parenthetical>,
    pub refers_to: Option<String>,
    needs_review: bool,
    pub volume: Option<String>,
    pub reporter: Option<String>,
    pub page: Option<String>,
    pub pin_cite: Option<String>,
    pub record: Option<CaseRecord>,
}

impl Citation {
    /// Build a citation. `needs_review` is derived here and nowhere else.
    pub fn new(
        text: impl Into<String>,
        kind: CitationKind,
        span: Range<usize>,
        signal: Option<String>,
        parenthetical: Option<Parenthetical>,
    ) -> Self {
        let needs_review = signal.is_some() && parenthetical.is_none();
        Citation {
            text: text.into(),
            kind,
            span,
            case_name: None,
            signal,
            parenthetical,
            refers_to: None,
            needs_review,
            volume: None,
            reporter: None,
            page: None,
            pin_cite: None,
            record: None,
        }
    }

    /// Copy reporter fields from a token.
    pub fn with_token_fields(mut self, kind: &TokenKind) -> Self {
        if let Some(reference) = kind.reference() {
            self.volume = Some(reference.volume.clone());
            self.reporter = Some(reference.reporter.clone());
            self.page = reference.page.clone();
        }
        self.pin_cite = kind.pin_cite().map(str::to_string);
        self
    }

    pub fn signal(&self) -> Option<&str> {
        self.signal.as_deref()
    }

    pub fn parenthetical(&self) -> Option<&Parenthetical> {
        self.parenthetical.as_ref()
    }

    /// True when a signal introduces the citation but no parenthetical
    /// explains it.
    pub fn needs_review(&self) -> bool {
        self.needs_review
    }

    /// The (volume, reporter) key, when the citation has one.
    pub fn reference_key(&self) -> Option<(String, String)> {
        match (&self.volume, &self.reporter) {
            (Some(volume), Some(reporter)) => Some((volume.clone(), reporter.clone())),
            _ => None,
        }
    }
}

/// Build a clean case name from recognizer party fields.
///
/// Strips trailing punctuation and `[sic]`, cuts the defendant at its first
/// comma, and drops page numbers that bled into either name.
pub fn case_name_from_parties(plaintiff: Option<&str>, defendant: Option<&str>) -> Option<String> {
    let plaintiff = clean_party(plaintiff?.trim());
    let defendant = defendant
        .map(|d| {
            let d = d.trim();
            clean_party(d.split(',').next().unwrap_or(d))
        })
        .unwrap_or_default();

    if plaintiff.is_empty() {
        return None;
    }
    if defendant.is_empty() {
        Some(plaintiff)
    } else {
        Some(format!("{} v. {}", plaintiff, defendant))
    }
}

fn clean_party(party: &str) -> String {
    let party = party.trim().trim_end_matches(['.', ',', ';', ':']);
    let party = SIC_ANNOTATION.replace_all(party, "");
    LEADING_PAGE_NUMBER.replace(&party, "").trim().to_string()
}

/// Reduce a case name to "Surname v. Surname" for comparison.
///
/// Government parties ("State", "United States", "People") are kept whole.
pub fn normalize_case_name(name: &str) -> String {
    let name = name.trim();
    let mut parts = VERSUS.splitn(name, 2);
    let (Some(plaintiff), Some(defendant)) = (parts.next(), parts.next()) else {
        return name.to_string();
    };

    let plaintiff_words: Vec<&str> = plaintiff.split_whitespace().collect();
    let plaintiff = match plaintiff_words.as_slice() {
        [first, .., last]
            if !matches!(
                first.to_lowercase().as_str(),
                "united" | "people" | "state" | "commonwealth" | "in"
            ) =>
        {
            last.to_string()
        }
        _ => plaintiff.trim().to_string(),
    };

    let defendant = defendant.split(',').next().unwrap_or(defendant).trim();
    let defendant_words: Vec<&str> = defendant.split_whitespace().collect();
    let defendant = match defendant_words.as_slice() {
        [first, .., last]
            if !matches!(
                first.to_lowercase().as_str(),
                "the" | "state" | "united" | "people" | "commonwealth"
            ) =>
        {
            last.to_string()
        }
        _ => defendant.to_string(),
    };

    format!("{} v. {}", plaintiff, defendant)
}

/// Whether two collections of case names name the same cases.
pub fn cases_match<'a>(
    left: impl IntoIterator<Item = &'a str>,
    right: impl IntoIterator<Item = &'a str>,
) -> bool {
    let left: BTreeSet<String> = left.into_iter().map(normalize_case_name).collect();
    let right: BTreeSet<String> = right.into_iter().map(normalize_case_name).collect();
    left == right
}
