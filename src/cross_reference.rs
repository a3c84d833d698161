//! Cross-reference resolution for short, Id. and supra citations.
//!
//! Citations are folded in document order through a small accumulator that
//! remembers the last full citation, the last citation that carried an
//! external case record, and the pin cite it pointed at. Back-references
//! that cannot be validated are left empty rather than guessed.

use std::collections::BTreeMap;

use crate::citation::{CaseRecord, Citation};
use crate::token::{CitationToken, TokenKind};

/// First page number in a pin cite ("at 685" -> 685, "460-61" -> 460).
pub fn pin_page(pin_cite: &str) -> Option<u32> {
    let start = pin_cite.find(|c: char| c.is_ascii_digit())?;
    let digits: String = pin_cite[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Whether a pin cite is plausible for a case starting at `start_page`.
///
/// A pin cite without a page number cannot be checked and passes.
pub fn is_valid_pin_cite(pin_cite: &str, start_page: u32, window: u32) -> bool {
    match pin_page(pin_cite) {
        None => true,
        Some(page) => page >= start_page && page <= start_page.saturating_add(window),
    }
}

/// Where a back-reference can inherit identity from.
#[derive(Debug, Clone)]
struct RecordSource {
    case_name: Option<String>,
    record: CaseRecord,
}

impl RecordSource {
    fn of(citation: &Citation) -> Option<Self> {
        citation.record.as_ref().map(|record| RecordSource {
            case_name: citation.case_name.clone(),
            record: record.clone(),
        })
    }

    fn apply_to(&self, citation: &mut Citation) {
        if citation.case_name.is_none() {
            citation.case_name = self.case_name.clone();
        }
        citation.record = Some(self.record.clone());
    }
}

/// A named full citation seen so far.
#[derive(Debug, Clone)]
struct PriorFull {
    case_name: String,
    source: Option<RecordSource>,
    pin_cite: Option<String>,
}

/// State carried from one citation to the next.
#[derive(Debug, Default)]
struct ResolverState {
    /// Nearest prior full citation per (volume, reporter).
    full_by_key: BTreeMap<(String, String), (Option<String>, Option<RecordSource>)>,
    last_with_record: Option<RecordSource>,
    last_pin_cite: Option<String>,
    last_full_name: Option<String>,
    /// Named full citations so far, in order.
    prior_full: Vec<PriorFull>,
}

impl ResolverState {
    fn step(mut self, citation: &mut Citation, kind: &TokenKind, window: u32) -> Self {
        match kind {
            TokenKind::FullCase { .. } => {
                if let Some(key) = citation.reference_key() {
                    self.full_by_key.insert(
                        key,
                        (citation.case_name.clone(), RecordSource::of(citation)),
                    );
                }
                if let Some(name) = &citation.case_name {
                    self.last_full_name = Some(name.clone());
                    self.prior_full.push(PriorFull {
                        case_name: name.clone(),
                        source: RecordSource::of(citation),
                        pin_cite: citation.pin_cite.clone().or_else(|| citation.page.clone()),
                    });
                }
                self.track_record(citation);
            }
            TokenKind::ShortCase { .. } => {
                self.resolve_short(citation);
                self.track_record(citation);
            }
            TokenKind::Id { .. } => {
                citation.refers_to = self.last_full_name.clone();
                self.resolve_back_reference(citation, window);
            }
            TokenKind::Supra {
                antecedent_guess, ..
            } => {
                let named = antecedent_guess
                    .as_deref()
                    .and_then(|guess| self.find_antecedent(guess))
                    .cloned();
                match named {
                    // Identity comes from the named case only
                    Some(prior) => {
                        citation.refers_to = Some(prior.case_name);
                        if let Some(source) = prior.source {
                            inherit(citation, &source, prior.pin_cite, window);
                        }
                    }
                    None => {
                        citation.refers_to = self.last_full_name.clone();
                        self.resolve_back_reference(citation, window);
                    }
                }
            }
            TokenKind::Unknown => {}
        }
        self
    }

    fn track_record(&mut self, citation: &Citation) {
        if let Some(source) = RecordSource::of(citation) {
            self.last_with_record = Some(source);
            self.last_pin_cite = citation.pin_cite.clone().or_else(|| citation.page.clone());
        }
    }

    fn resolve_short(&self, citation: &mut Citation) {
        let Some(key) = citation.reference_key() else {
            return;
        };
        let Some((full_name, source)) = self.full_by_key.get(&key) else {
            log::debug!("short citation {:?} has no prior full citation", citation.text);
            return;
        };
        citation.refers_to = full_name.clone();

        let Some(source) = source else {
            return;
        };
        let start_page = source.record.start_page();
        let own_page = citation.page.as_deref().and_then(pin_page);
        let accepted = match (start_page, own_page) {
            (Some(start), Some(page)) => page >= start,
            _ => true,
        };

        if accepted {
            source.apply_to(citation);
            log::debug!("short citation {:?} resolved to {:?}", citation.text, citation.case_name);
        } else {
            log::debug!(
                "short citation {:?} page precedes start page {:?}",
                citation.text,
                start_page
            );
        }
    }

    fn resolve_back_reference(&mut self, citation: &mut Citation, window: u32) {
        let Some(source) = self.last_with_record.clone() else {
            return;
        };
        let fallback_pin = self.last_pin_cite.clone();
        if let Some(pin) = inherit(citation, &source, fallback_pin, window) {
            self.last_pin_cite = Some(pin);
        }
    }

    fn find_antecedent(&self, guess: &str) -> Option<&PriorFull> {
        let guess = guess.trim().to_lowercase();
        if guess.is_empty() {
            return None;
        }
        self.prior_full
            .iter()
            .rev()
            .find(|prior| prior.case_name.to_lowercase().contains(&guess))
    }
}

/// Give `citation` the identity in `source` when its pin cite (or the
/// fallback) lies within the window. Returns the pin cite that was checked,
/// or `None` when the citation was rejected or had no pin cite at all.
fn inherit(
    citation: &mut Citation,
    source: &RecordSource,
    fallback_pin: Option<String>,
    window: u32,
) -> Option<String> {
    let effective_pin = citation.pin_cite.clone().or(fallback_pin);
    let accepted = match (source.record.start_page(), effective_pin.as_deref()) {
        (Some(start), Some(pin)) => is_valid_pin_cite(pin, start, window),
        _ => true,
    };

    if !accepted {
        log::debug!(
            "{:?} rejected: pin cite {:?} outside window of {:?}",
            citation.text,
            effective_pin,
            source.case_name
        );
        return None;
    }

    source.apply_to(citation);
    if citation.pin_cite.is_none() {
        citation.pin_cite = effective_pin.clone();
    }
    log::debug!("{:?} inherits {:?}", citation.text, citation.case_name);
    effective_pin
}

/// Propagate case identity from full and short citations to later
/// back-references. `tokens` must be parallel to `citations`.
pub fn resolve_cross_references(citations: &mut [Citation], tokens: &[CitationToken], window: u32) {
    citations
        .iter_mut()
        .zip(tokens)
        .fold(ResolverState::default(), |state, (citation, token)| {
            state.step(citation, &token.kind, window)
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::citation::CitationKind;
    use crate::token::Reference;

    fn full(name: &str, volume: &str, page: &str, record: Option<CaseRecord>) -> (Citation, CitationToken) {
        let token = CitationToken::full_case(0..1, Reference::new(volume, "S.W.3d", Some(page)));
        let mut citation =
            Citation::new(name, CitationKind::FullCase, 0..1, None, None).with_token_fields(&token.kind);
        citation.case_name = Some(name.to_string());
        citation.record = record;
        (citation, token)
    }

    fn id(pin: &str) -> (Citation, CitationToken) {
        let token = CitationToken::id(0..1).with_pin_cite(pin);
        let citation = Citation::new("Id.", CitationKind::Id, 0..1, None, None).with_token_fields(&token.kind);
        (citation, token)
    }

    fn short(volume: &str, page: &str) -> (Citation, CitationToken) {
        let token = CitationToken::short_case(0..1, Reference::new(volume, "S.W.3d", Some(page)));
        let citation =
            Citation::new("short", CitationKind::ShortCase, 0..1, None, None).with_token_fields(&token.kind);
        (citation, token)
    }

    fn run(pairs: Vec<(Citation, CitationToken)>) -> Vec<Citation> {
        let (mut citations, tokens): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
        resolve_cross_references(&mut citations, &tokens, 500);
        citations
    }

    fn smith_record() -> CaseRecord {
        CaseRecord::new("Smith v. State", &["123 S.W.3d 100"])
    }

    #[test]
    fn test_pin_cite_window() {
        assert!(is_valid_pin_cite("at 105", 100, 500));
        assert!(is_valid_pin_cite("600", 100, 500));
        assert!(!is_valid_pin_cite("601", 100, 500));
        assert!(!is_valid_pin_cite("99", 100, 500));
        assert!(is_valid_pin_cite("passim", 100, 500));
        assert_eq!(pin_page("460-61"), Some(460));
    }

    #[test]
    fn test_id_within_and_outside_window() {
        let citations = run(vec![
            full("Smith v. State", "123", "100", Some(smith_record())),
            id("105"),
            id("900"),
        ]);

        assert_eq!(citations[1].case_name.as_deref(), Some("Smith v. State"));
        assert!(citations[1].record.is_some());

        assert_eq!(citations[2].case_name, None);
        assert!(citations[2].record.is_none());
        // refers_to does not depend on record validation
        assert_eq!(citations[2].refers_to.as_deref(), Some("Smith v. State"));
    }

    #[test]
    fn test_id_inherits_pin_cite() {
        let (first, first_token) = full("Smith v. State", "123", "100", Some(smith_record()));
        let bare_id = CitationToken::id(0..1);
        let bare = Citation::new("Id.", CitationKind::Id, 0..1, None, None);
        let citations = run(vec![(first, first_token), id("110"), (bare, bare_id)]);

        assert_eq!(citations[2].pin_cite.as_deref(), Some("110"));
        assert!(citations[2].record.is_some());
    }

    #[test]
    fn test_id_without_record_is_unresolved() {
        let citations = run(vec![full("Smith v. State", "123", "100", None), id("105")]);
        assert_eq!(citations[1].case_name, None);
        assert_eq!(citations[1].refers_to.as_deref(), Some("Smith v. State"));
    }

    #[test]
    fn test_short_case_matches_by_key() {
        let citations = run(vec![
            full("Smith v. State", "123", "100", Some(smith_record())),
            full("Jones v. State", "50", "7", None),
            short("123", "104"),
            short("123", "90"),
            short("50", "9"),
        ]);

        assert_eq!(citations[2].case_name.as_deref(), Some("Smith v. State"));
        assert!(citations[2].record.is_some());
        // Page before the record's start page
        assert!(citations[3].record.is_none());
        assert_eq!(citations[3].refers_to.as_deref(), Some("Smith v. State"));
        // Full citation without a record
        assert!(citations[4].record.is_none());
        assert_eq!(citations[4].refers_to.as_deref(), Some("Jones v. State"));
    }

    #[test]
    fn test_supra_antecedent() {
        let supra_token = CitationToken::supra(0..1).with_antecedent("smith").with_pin_cite("120");
        let supra = Citation::new("Smith, supra", CitationKind::Supra, 0..1, None, None)
            .with_token_fields(&supra_token.kind);
        let citations = run(vec![
            full("Smith v. State", "123", "100", Some(smith_record())),
            full("Jones v. State", "50", "7", None),
            (supra, supra_token),
        ]);

        assert_eq!(citations[2].refers_to.as_deref(), Some("Smith v. State"));
        assert_eq!(citations[2].case_name.as_deref(), Some("Smith v. State"));
    }

    #[test]
    fn test_supra_inherits_from_the_named_case() {
        let jones_record = CaseRecord::new("Jones v. State", &["50 S.W.3d 7"]);
        let supra_token = CitationToken::supra(0..1).with_antecedent("Smith").with_pin_cite("104");
        let supra = Citation::new("Smith, supra, at 104", CitationKind::Supra, 0..1, None, None)
            .with_token_fields(&supra_token.kind);
        let citations = run(vec![
            full("Smith v. State", "123", "100", Some(smith_record())),
            full("Jones v. State", "50", "7", Some(jones_record)),
            (supra, supra_token),
            id("9"),
        ]);

        let supra = &citations[2];
        assert_eq!(supra.refers_to.as_deref(), Some("Smith v. State"));
        assert_eq!(supra.case_name.as_deref(), Some("Smith v. State"));
        assert_eq!(
            supra.record.as_ref().map(|r| r.case_name.as_str()),
            Some("Smith v. State")
        );
        // Id. still follows the last cited case
        assert_eq!(citations[3].case_name.as_deref(), Some("Jones v. State"));
    }

    #[test]
    fn test_supra_naming_a_case_without_record() {
        let supra_token = CitationToken::supra(0..1).with_antecedent("Jones").with_pin_cite("9");
        let supra = Citation::new("Jones, supra, at 9", CitationKind::Supra, 0..1, None, None)
            .with_token_fields(&supra_token.kind);
        let citations = run(vec![
            full("Jones v. State", "50", "7", None),
            full("Smith v. State", "123", "100", Some(smith_record())),
            (supra, supra_token),
        ]);

        assert_eq!(citations[2].refers_to.as_deref(), Some("Jones v. State"));
        assert_eq!(citations[2].case_name, None);
        assert!(citations[2].record.is_none());
    }
}
