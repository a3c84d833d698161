//! Citation tokens as delivered by a citation recognizer.
//!
//! Reporter grammar (volume/reporter/page recognition, pin-cite parsing) is
//! the recognizer's job. The pipeline only consumes the resulting tokens,
//! which are a closed set of variants every stage matches on exhaustively.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Byte spans of a token within the normalized section text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSpan {
    /// The reporter reference itself ("123 S.W.3d 456, 460", "Id. at 5").
    pub base: Range<usize>,
    /// The whole citation including case name and court/year, when the
    /// recognizer could determine it.
    pub full: Option<Range<usize>>,
}

impl TokenSpan {
    pub fn new(base: Range<usize>) -> Self {
        TokenSpan { base, full: None }
    }

    pub fn with_full(mut self, full: Range<usize>) -> Self {
        self.full = Some(full);
        self
    }
}

/// A reporter reference: `volume reporter page`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub volume: String,
    pub reporter: String,
    /// Starting page, when the recognizer found one.
    pub page: Option<String>,
}

impl Reference {
    pub fn new(volume: impl Into<String>, reporter: impl Into<String>, page: Option<&str>) -> Self {
        Reference {
            volume: volume.into(),
            reporter: reporter.into(),
            page: page.map(str::to_string),
        }
    }

    /// The (volume, reporter) key that ties short citations to full ones.
    pub fn key(&self) -> (String, String) {
        (self.volume.clone(), self.reporter.clone())
    }
}

/// The closed set of citation forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    /// "Smith v. Jones, 123 S.W.3d 456, 460 (Tex. 2004)"
    FullCase {
        reference: Reference,
        pin_cite: Option<String>,
        plaintiff: Option<String>,
        defendant: Option<String>,
    },
    /// "Smith, 123 S.W.3d at 460"
    ShortCase {
        reference: Reference,
        pin_cite: Option<String>,
        antecedent_guess: Option<String>,
    },
    /// "Id. at 460"
    Id { pin_cite: Option<String> },
    /// "Smith, supra, at 460"
    Supra {
        pin_cite: Option<String>,
        antecedent_guess: Option<String>,
    },
    /// Statutes, rules and anything else the recognizer could not type.
    Unknown,
}

impl TokenKind {
    pub fn reference(&self) -> Option<&Reference> {
        match self {
            TokenKind::FullCase { reference, .. } | TokenKind::ShortCase { reference, .. } => {
                Some(reference)
            }
            TokenKind::Id { .. } | TokenKind::Supra { .. } | TokenKind::Unknown => None,
        }
    }

    pub fn pin_cite(&self) -> Option<&str> {
        match self {
            TokenKind::FullCase { pin_cite, .. }
            | TokenKind::ShortCase { pin_cite, .. }
            | TokenKind::Id { pin_cite }
            | TokenKind::Supra { pin_cite, .. } => pin_cite.as_deref(),
            TokenKind::Unknown => None,
        }
    }

    pub fn antecedent_guess(&self) -> Option<&str> {
        match self {
            TokenKind::ShortCase {
                antecedent_guess, ..
            }
            | TokenKind::Supra {
                antecedent_guess, ..
            } => antecedent_guess.as_deref(),
            TokenKind::FullCase { .. } | TokenKind::Id { .. } | TokenKind::Unknown => None,
        }
    }
}

/// One recognized citation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationToken {
    pub span: TokenSpan,
    pub kind: TokenKind,
}

impl CitationToken {
    pub fn new(kind: TokenKind, span: TokenSpan) -> Self {
        CitationToken { span, kind }
    }

    pub fn full_case(base: Range<usize>, reference: Reference) -> Self {
        Self::new(
            TokenKind::FullCase {
                reference,
                pin_cite: None,
                plaintiff: None,
                defendant: None,
            },
            TokenSpan::new(base),
        )
    }

    pub fn short_case(base: Range<usize>, reference: Reference) -> Self {
        Self::new(
            TokenKind::ShortCase {
                reference,
                pin_cite: None,
                antecedent_guess: None,
            },
            TokenSpan::new(base),
        )
    }

    pub fn id(base: Range<usize>) -> Self {
        Self::new(TokenKind::Id { pin_cite: None }, TokenSpan::new(base))
    }

    pub fn supra(base: Range<usize>) -> Self {
        Self::new(
            TokenKind::Supra {
                pin_cite: None,
                antecedent_guess: None,
            },
            TokenSpan::new(base),
        )
    }

    pub fn unknown(base: Range<usize>) -> Self {
        Self::new(TokenKind::Unknown, TokenSpan::new(base))
    }

    pub fn with_full_span(mut self, full: Range<usize>) -> Self {
        self.span = self.span.with_full(full);
        self
    }

    /// Set the pin cite. No-op for `Unknown`.
    pub fn with_pin_cite(mut self, pin: &str) -> Self {
        match &mut self.kind {
            TokenKind::FullCase { pin_cite, .. }
            | TokenKind::ShortCase { pin_cite, .. }
            | TokenKind::Id { pin_cite }
            | TokenKind::Supra { pin_cite, .. } => *pin_cite = Some(pin.to_string()),
            TokenKind::Unknown => {}
        }
        self
    }

    /// Set the parties of a full citation. No-op for other kinds.
    pub fn with_parties(mut self, plaintiff_name: &str, defendant_name: Option<&str>) -> Self {
        if let TokenKind::FullCase {
            plaintiff,
            defendant,
            ..
        } = &mut self.kind
        {
            *plaintiff = Some(plaintiff_name.to_string());
            *defendant = defendant_name.map(str::to_string);
        }
        self
    }

    /// Set the antecedent guess of a short or supra citation. No-op otherwise.
    pub fn with_antecedent(mut self, guess: &str) -> Self {
        match &mut self.kind {
            TokenKind::ShortCase {
                antecedent_guess, ..
            }
            | TokenKind::Supra {
                antecedent_guess, ..
            } => *antecedent_guess = Some(guess.to_string()),
            TokenKind::FullCase { .. } | TokenKind::Id { .. } | TokenKind::Unknown => {}
        }
        self
    }

    /// Start of the base span, the document-order key.
    pub fn start(&self) -> usize {
        self.span.base.start
    }
}

/// Recognizes citation tokens in normalized section text.
///
/// Implementations return tokens in any order; the pipeline sorts them by
/// span start before processing.
pub trait CitationRecognizer {
    fn recognize(&self, text: &str) -> Vec<CitationToken>;
}

impl<F> CitationRecognizer for F
where
    F: Fn(&str) -> Vec<CitationToken>,
{
    fn recognize(&self, text: &str) -> Vec<CitationToken> {
        self(text)
    }
}

/// A recognizer that hands back a fixed token list, for callers that ran
/// recognition ahead of time.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedTokens {
    tokens: Vec<CitationToken>,
}

impl PrecomputedTokens {
    pub fn new(tokens: Vec<CitationToken>) -> Self {
        PrecomputedTokens { tokens }
    }
}

impl CitationRecognizer for PrecomputedTokens {
    fn recognize(&self, _text: &str) -> Vec<CitationToken> {
        self.tokens.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_fill_variant_fields() {
        let token = CitationToken::short_case(10..25, Reference::new("123", "S.W.3d", None))
            .with_pin_cite("460")
            .with_antecedent("Smith")
            .with_parties("ignored", None);

        assert_eq!(token.kind.pin_cite(), Some("460"));
        assert_eq!(token.kind.antecedent_guess(), Some("Smith"));
        assert_eq!(
            token.kind.reference().map(Reference::key),
            Some(("123".to_string(), "S.W.3d".to_string()))
        );
    }

    #[test]
    fn test_unknown_ignores_fields() {
        let token = CitationToken::unknown(0..5).with_pin_cite("3");
        assert_eq!(token.kind, TokenKind::Unknown);
        assert_eq!(token.kind.pin_cite(), None);
    }

    #[test]
    fn test_closure_recognizer() {
        let recognizer = |text: &str| -> Vec<CitationToken> {
            text.find("Id.")
                .map(|start| vec![CitationToken::id(start..start + 3)])
                .unwrap_or_default()
        };
        let tokens = recognizer.recognize("See Id. at 4.");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].start(), 4);
    }
}
