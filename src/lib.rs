#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Citation and proposition extraction for the argument section of legal
//! briefs.
//!
//! Input is a brief's positioned text blocks plus the output of an external
//! citation recognizer. Output is every citation in the argument section,
//! what it resolves to, and the proposition it is offered for.
//!
//! ## Stages
//!
//! - [`locate_section`] - Crops the document to the argument section
//! - [`locate_authorities`] - Finds the table of authorities for the case
//!   cross-check in [`Summary`]
//! - [`segment_layout`] - Body paragraphs and block quotations by indentation
//! - [`SentenceSegmenter`] - Legal-abbreviation-aware sentence splitting
//! - [`resolve_span`] - Widens short citations over their case name
//! - [`detect_signal`] / [`detect_parenthetical`] - Introductory signals
//!   ("see", "cf.") and explanatory parentheticals ("(holding that ...)")
//! - [`resolve_cross_references`] - Id., short and supra back-references
//! - [`attribute_propositions`] - String-cite groups and their propositions
//! - [`link_block_quotes`] - Block quotations to their introducing citation
//!
//! [`Pipeline`] runs them in order and returns a [`BriefAnalysis`].
//!
//! ## Review flags
//!
//! A [`Citation`] introduced by a signal but with no parenthetical is
//! flagged with [`Citation::needs_review`]: the brief relies on the
//! authority without saying what it holds.
//!
//! ## Example
//!
//! ```ignore
//! use layered_briefs::{CitationToken, Pipeline, Reference, TextBlock};
//!
//! let recognizer = |text: &str| -> Vec<CitationToken> { my_recognizer(text) };
//! let analysis = Pipeline::new(&recognizer).run_on_document(&blocks)?;
//! println!("{}", analysis);
//! ```

mod block_quote;
mod citation;
mod config;
mod cross_reference;
mod display;
mod document;
mod errors;
mod layout;
mod proposition;
mod section;
mod sentence;
mod signal;
mod span;
mod text;
mod token;

// Runs the stages in dependency order
pub mod pipeline;

pub use block_quote::{link_block_quotes, quote_identifier, BlockQuoteLink};
pub use citation::{
    case_name_from_parties, cases_match, normalize_case_name, CaseRecord, CaseRecordLookup,
    Citation, CitationKind, RecordCache,
};
pub use config::PipelineConfig;
pub use cross_reference::{is_valid_pin_cite, pin_page, resolve_cross_references};
pub use display::CitationDisplay;
pub use document::{unit_at, BlockQuote, Paragraph, SectionDocument, Sentence, Unit, UnitSlot};
pub use errors::{BriefError, BriefResult};
pub use layout::{detect_margins, segment_layout, Layout, LayoutParagraph, Margins, TextBlock};
pub use pipeline::{BriefAnalysis, Pipeline, Summary};
pub use proposition::{
    assemble_propositions, attribute_propositions, clean_preceding, Attribution, Proposition,
    PropositionKind,
};
pub use section::{locate_authorities, locate_section, Section};
pub use sentence::{segment_sentences, SentenceSegmenter, LEGAL_ABBREVIATIONS, WORD_ABBREVIATIONS};
pub use signal::{
    detect_parenthetical, detect_signal, find_quotations, has_substantial_quotation,
    Parenthetical, PARENTHETICAL_VERBS, SIGNALS,
};
pub use span::resolve_span;
pub use text::normalize_text;
pub use token::{
    CitationRecognizer, CitationToken, PrecomputedTokens, Reference, TokenKind, TokenSpan,
};

#[cfg(test)]
mod tests {
    mod authorities;
    mod block_quotes;
    mod cross_references;
    mod fixtures;
    mod propositions;
    mod segmentation;
}
