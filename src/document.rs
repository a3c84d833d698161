//! The paragraph/sentence model of an argument section.
//!
//! A [`SectionDocument`] owns the normalized section text and the paragraphs
//! laid over it. Every range in the model is a byte range into that text.
//! Citations are processed per *unit*: a sentence, or a block quotation
//! together with the lead-in sentence that introduces it.

use std::ops::Range;

use serde::Serialize;

use crate::citation::Citation;
use crate::layout::{Layout, LayoutParagraph};
use crate::sentence::SentenceSegmenter;

/// Sentence endings that mark a lead-in to a block quotation.
const LEAD_IN_ENDINGS: &[&str] = &[":", ";", ",", "--", "\u{2026}", "..."];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sentence {
    pub text: String,
    pub range: Range<usize>,
    pub citations: Vec<Citation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockQuote {
    pub text: String,
    pub range: Range<usize>,
    pub start_page: u32,
    pub end_page: u32,
    /// Introductory clause found by the block-quote linker.
    pub intro_text: Option<String>,
    /// The sentence that introduced the quotation, detached from the
    /// preceding body paragraph.
    pub lead_in: Option<Sentence>,
    pub citations: Vec<Citation>,
}

impl BlockQuote {
    /// Start of the quotation including its lead-in.
    pub fn unit_start(&self) -> usize {
        self.lead_in
            .as_ref()
            .map_or(self.range.start, |lead_in| lead_in.range.start)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Paragraph {
    Body {
        sentences: Vec<Sentence>,
        range: Range<usize>,
        start_page: u32,
        end_page: u32,
    },
    BlockQuote(BlockQuote),
}

impl Paragraph {
    pub fn range(&self) -> &Range<usize> {
        match self {
            Paragraph::Body { range, .. } => range,
            Paragraph::BlockQuote(quote) => &quote.range,
        }
    }

    pub fn as_block_quote(&self) -> Option<&BlockQuote> {
        match self {
            Paragraph::BlockQuote(quote) => Some(quote),
            Paragraph::Body { .. } => None,
        }
    }

    /// All citations in the paragraph, in document order.
    pub fn citations(&self) -> Vec<&Citation> {
        match self {
            Paragraph::Body { sentences, .. } => {
                sentences.iter().flat_map(|s| s.citations.iter()).collect()
            }
            Paragraph::BlockQuote(quote) => quote
                .lead_in
                .iter()
                .flat_map(|s| s.citations.iter())
                .chain(quote.citations.iter())
                .collect(),
        }
    }
}

/// Which part of the document a unit covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitSlot {
    Sentence { paragraph: usize, sentence: usize },
    BlockQuote { paragraph: usize },
}

/// A span of text citations are attributed within.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub range: Range<usize>,
    pub slot: UnitSlot,
    /// End of the enclosing paragraph.
    pub paragraph_end: usize,
    /// End of a block quotation's lead-in sentence.
    pub lead_in_end: Option<usize>,
}

impl Unit {
    /// How far a parenthetical starting near `pos` may extend.
    pub fn limit(&self, pos: usize) -> usize {
        match self.lead_in_end {
            Some(end) if pos < end => end,
            _ => self.paragraph_end,
        }
    }
}

/// Index of the unit containing `pos`: the last unit starting at or before
/// it, or the first unit.
pub fn unit_at(units: &[Unit], pos: usize) -> usize {
    units
        .partition_point(|unit| unit.range.start <= pos)
        .saturating_sub(1)
}

/// An argument section segmented into paragraphs and sentences.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionDocument {
    /// Normalized section text: paragraph texts joined by blank lines.
    #[serde(skip)]
    pub text: String,
    pub paragraphs: Vec<Paragraph>,
}

impl SectionDocument {
    /// Build the paragraph model from segmented layout.
    pub fn from_layout(layout: &Layout, segmenter: &SentenceSegmenter) -> Self {
        let mut text = String::new();
        let mut paragraphs = Vec::new();

        for paragraph in &layout.paragraphs {
            let paragraph_text = paragraph.text();
            if paragraph_text.is_empty() {
                continue;
            }
            if !text.is_empty() {
                text.push_str("\n\n");
            }
            let start = text.len();
            text.push_str(&paragraph_text);
            let range = start..text.len();

            paragraphs.push(match paragraph {
                LayoutParagraph::Body(_) => Paragraph::Body {
                    sentences: segmenter
                        .split(&paragraph_text)
                        .into_iter()
                        .map(|r| Sentence {
                            text: paragraph_text[r.clone()].to_string(),
                            range: start + r.start..start + r.end,
                            citations: Vec::new(),
                        })
                        .collect(),
                    range,
                    start_page: paragraph.start_page(),
                    end_page: paragraph.end_page(),
                },
                LayoutParagraph::BlockQuote(_) => Paragraph::BlockQuote(BlockQuote {
                    text: paragraph_text,
                    range,
                    start_page: paragraph.start_page(),
                    end_page: paragraph.end_page(),
                    intro_text: None,
                    lead_in: None,
                    citations: Vec::new(),
                }),
            });
        }

        let mut document = SectionDocument { text, paragraphs };
        document.detach_lead_ins();
        log::debug!(
            "section: {} paragraphs, {} units",
            document.paragraphs.len(),
            document.units().len()
        );
        document
    }

    /// Move a body paragraph's final sentence into the following block
    /// quotation when it reads as the quotation's lead-in.
    fn detach_lead_ins(&mut self) {
        for i in 1..self.paragraphs.len() {
            let (before, after) = self.paragraphs.split_at_mut(i);
            let (Paragraph::Body { sentences, .. }, Paragraph::BlockQuote(quote)) =
                (&mut before[i - 1], &mut after[0])
            else {
                continue;
            };

            let is_lead_in = sentences.last().map_or(false, |s| {
                let trimmed = s.text.trim_end();
                LEAD_IN_ENDINGS.iter().any(|ending| trimmed.ends_with(ending))
            });
            if is_lead_in {
                quote.lead_in = sentences.pop();
            }
        }

        self.paragraphs.retain(|p| match p {
            Paragraph::Body { sentences, .. } => !sentences.is_empty(),
            Paragraph::BlockQuote(_) => true,
        });
    }

    /// Attribution units in document order.
    pub fn units(&self) -> Vec<Unit> {
        let mut units = Vec::new();
        for (p, paragraph) in self.paragraphs.iter().enumerate() {
            match paragraph {
                Paragraph::Body {
                    sentences, range, ..
                } => {
                    for (s, sentence) in sentences.iter().enumerate() {
                        units.push(Unit {
                            range: sentence.range.clone(),
                            slot: UnitSlot::Sentence {
                                paragraph: p,
                                sentence: s,
                            },
                            paragraph_end: range.end,
                            lead_in_end: None,
                        });
                    }
                }
                Paragraph::BlockQuote(quote) => units.push(Unit {
                    range: quote.unit_start()..quote.range.end,
                    slot: UnitSlot::BlockQuote { paragraph: p },
                    paragraph_end: quote.range.end,
                    lead_in_end: quote.lead_in.as_ref().map(|s| s.range.end),
                }),
            }
        }
        units
    }

    pub fn block_quotes(&self) -> Vec<&BlockQuote> {
        self.paragraphs
            .iter()
            .filter_map(Paragraph::as_block_quote)
            .collect()
    }

    /// The `index`th block quotation in document order.
    pub fn block_quote_mut(&mut self, index: usize) -> Option<&mut BlockQuote> {
        self.paragraphs
            .iter_mut()
            .filter_map(|p| match p {
                Paragraph::BlockQuote(quote) => Some(quote),
                Paragraph::Body { .. } => None,
            })
            .nth(index)
    }

    /// Place each citation in the sentence or block quotation of its unit.
    pub fn attach_citations(&mut self, units: &[Unit], citations: &[Citation], unit_of: &[usize]) {
        for (citation, &u) in citations.iter().zip(unit_of) {
            let Some(unit) = units.get(u) else {
                continue;
            };
            match unit.slot {
                UnitSlot::Sentence { paragraph, sentence } => {
                    if let Some(Paragraph::Body { sentences, .. }) = self.paragraphs.get_mut(paragraph) {
                        if let Some(target) = sentences.get_mut(sentence) {
                            target.citations.push(citation.clone());
                        }
                    }
                }
                UnitSlot::BlockQuote { paragraph } => {
                    if let Some(Paragraph::BlockQuote(quote)) = self.paragraphs.get_mut(paragraph) {
                        match &mut quote.lead_in {
                            Some(lead_in) if citation.span.start < lead_in.range.end => {
                                lead_in.citations.push(citation.clone())
                            }
                            _ => quote.citations.push(citation.clone()),
                        }
                    }
                }
            }
        }
    }
}
