//! Linking block quotations to the citations that introduce them.
//!
//! A block quotation is identified by its first few words. The first
//! citation whose proposition text contains those words claims the
//! quotation; each side links at most once.

use serde::Serialize;

use crate::proposition::{Attribution, PropositionKind};
use crate::text::collapse_whitespace;

/// Endings that mark text before a quotation as its introduction.
const INTRO_ENDINGS: &[&str] = &[":", "\u{2014}", "--", ",", ";", "\u{2026}", "..."];

/// A block quotation linked to a citation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockQuoteLink {
    /// Index of the block quotation in document order.
    pub block_quote: usize,
    /// Index of the citation in document order.
    pub citation: usize,
    pub intro_text: Option<String>,
}

/// The first `words` whitespace-separated words of a quotation.
pub fn quote_identifier(quote: &str, words: usize) -> String {
    quote.split_whitespace().take(words).collect::<Vec<_>>().join(" ")
}

/// Link block quotations to attributions, first match wins.
///
/// A linked attribution becomes a `BlockQuotation` and drops its inline
/// quotations, which are nested inside the block quotation.
pub fn link_block_quotes(
    attributions: &mut [Attribution],
    quotes: &[&str],
    identifier_words: usize,
) -> Vec<BlockQuoteLink> {
    let identifiers: Vec<String> = quotes
        .iter()
        .map(|quote| quote_identifier(quote, identifier_words))
        .collect();
    let mut linked = vec![false; quotes.len()];
    let mut links = Vec::new();

    for (c, attribution) in attributions.iter_mut().enumerate() {
        if attribution.kind == PropositionKind::BlockQuotation {
            continue;
        }
        let context = collapse_whitespace(&attribution.text);

        for (q, identifier) in identifiers.iter().enumerate() {
            if linked[q] || identifier.is_empty() {
                continue;
            }
            let Some(pos) = context.find(identifier.as_str()) else {
                continue;
            };

            let intro = context[..pos].trim();
            let intro_text = (!intro.is_empty()
                && INTRO_ENDINGS.iter().any(|ending| intro.ends_with(ending)))
            .then(|| intro.to_string());

            attribution.kind = PropositionKind::BlockQuotation;
            attribution.quotations.clear();
            attribution.block_quote = Some(q);
            linked[q] = true;

            log::debug!("block quote {} linked to citation {}", q, c);
            links.push(BlockQuoteLink {
                block_quote: q,
                citation: c,
                intro_text,
            });
            break;
        }
    }

    links
}
