//! The per-document processing pipeline.
//!
//! Runs the stages in dependency order:
//! 1. Layout segmentation - body paragraphs and block quotations
//! 2. Sentence segmentation - sentences of each body paragraph
//! 3. Span resolution, signal and parenthetical detection, per citation
//! 4. Cross-reference resolution - Id./short/supra back-references
//! 5. Proposition attribution - string-cite groups
//! 6. Block-quote linking
//!
//! Every run owns its state. Nothing is shared between documents, so
//! separate briefs can be processed in parallel with separate pipelines or
//! the same one.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::block_quote::{link_block_quotes, BlockQuoteLink};
use crate::citation::{
    case_name_from_parties, cases_match, normalize_case_name, CaseRecord, CaseRecordLookup,
    Citation, CitationKind, RecordCache,
};
use crate::config::PipelineConfig;
use crate::cross_reference::resolve_cross_references;
use crate::document::{unit_at, BlockQuote, Paragraph, SectionDocument, Unit};
use crate::errors::BriefResult;
use crate::layout::{segment_layout, Margins, TextBlock};
use crate::proposition::{assemble_propositions, attribute_propositions, Proposition, PropositionKind};
use crate::section::{locate_authorities, locate_section, Section};
use crate::sentence::SentenceSegmenter;
use crate::signal::{detect_parenthetical, detect_signal};
use crate::span::resolve_span;
use crate::text::normalize_text;
use crate::token::{CitationRecognizer, CitationToken, Reference, TokenKind};

/// Counts and layout facts for one analyzed section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub start_page: u32,
    pub end_page: u32,
    pub total_citations: usize,
    pub total_statements: usize,
    pub total_quotations: usize,
    pub total_block_quotations: usize,
    pub total_parentheticals: usize,
    /// Citations with a signal but no explanatory parenthetical.
    pub needs_review: usize,
    /// Margin detection fell back to an assumed indent.
    pub layout_degraded: bool,
    pub body_margin: f64,
    pub indent_margin: f64,
    /// Cases listed in the table of authorities, sorted.
    pub toa_cases: Vec<String>,
    /// Whether the table of authorities and the argument cite the same
    /// cases by normalized name. `None` when no table was found.
    pub cases_match: Option<bool>,
    /// Listed in the table but never cited in the argument.
    pub toa_only: Vec<String>,
    /// Cited in the argument but missing from the table.
    pub argument_only: Vec<String>,
}

impl Summary {
    fn new(
        propositions: &[Proposition],
        citations: &[Citation],
        margins: &Margins,
        start_page: u32,
        end_page: u32,
    ) -> Self {
        let count = |kind: PropositionKind| propositions.iter().filter(|p| p.kind == kind).count();
        Summary {
            start_page,
            end_page,
            total_citations: citations.len(),
            total_statements: count(PropositionKind::Statement),
            total_quotations: count(PropositionKind::Quotation),
            total_block_quotations: count(PropositionKind::BlockQuotation),
            total_parentheticals: count(PropositionKind::Parenthetical),
            needs_review: citations.iter().filter(|c| c.needs_review()).count(),
            layout_degraded: margins.degraded,
            body_margin: margins.body,
            indent_margin: margins.indent,
            toa_cases: Vec::new(),
            cases_match: None,
            toa_only: Vec::new(),
            argument_only: Vec::new(),
        }
    }

    /// Record the table-of-authorities cross-check. Names are compared
    /// after [`normalize_case_name`] and reported as written.
    fn compare_authorities(&mut self, toa_cases: Vec<String>, argument_cases: &[String]) {
        let normalized = |names: &[String]| -> BTreeSet<String> {
            names.iter().map(|name| normalize_case_name(name)).collect()
        };
        let in_toa = normalized(&toa_cases);
        let in_argument = normalized(argument_cases);

        self.toa_only = toa_cases
            .iter()
            .filter(|name| !in_argument.contains(&normalize_case_name(name)))
            .cloned()
            .collect();
        self.argument_only = argument_cases
            .iter()
            .filter(|name| !in_toa.contains(&normalize_case_name(name)))
            .cloned()
            .collect();
        self.cases_match = Some(cases_match(
            toa_cases.iter().map(String::as_str),
            argument_cases.iter().map(String::as_str),
        ));
        self.toa_cases = toa_cases;
    }
}

/// Everything extracted from one argument section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BriefAnalysis {
    pub summary: Summary,
    pub propositions: Vec<Proposition>,
    pub paragraphs: Vec<Paragraph>,
    pub block_quote_links: Vec<BlockQuoteLink>,
    /// Normalized section text all spans index into.
    #[serde(skip)]
    pub text: String,
}

impl BriefAnalysis {
    /// Citations in document order.
    pub fn citations(&self) -> Vec<&Citation> {
        self.paragraphs.iter().flat_map(Paragraph::citations).collect()
    }

    pub fn block_quotes(&self) -> Vec<&BlockQuote> {
        self.paragraphs
            .iter()
            .filter_map(Paragraph::as_block_quote)
            .collect()
    }

    /// Sorted, de-duplicated case names cited in the section.
    pub fn cited_cases(&self) -> Vec<String> {
        self.citations()
            .into_iter()
            .filter_map(|c| c.case_name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Citation and proposition extraction for brief argument sections.
pub struct Pipeline<'a> {
    config: PipelineConfig,
    segmenter: SentenceSegmenter,
    recognizer: &'a dyn CitationRecognizer,
    records: Option<&'a dyn CaseRecordLookup>,
}

impl<'a> Pipeline<'a> {
    pub fn new(recognizer: &'a dyn CitationRecognizer) -> Self {
        Pipeline {
            config: PipelineConfig::default(),
            segmenter: SentenceSegmenter::new(),
            recognizer,
            records: None,
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_segmenter(mut self, segmenter: SentenceSegmenter) -> Self {
        self.segmenter = segmenter;
        self
    }

    /// Attach an external case-record source for full citations.
    pub fn with_record_lookup(mut self, records: &'a dyn CaseRecordLookup) -> Self {
        self.records = Some(records);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Locate the argument section among all of a document's blocks and
    /// analyze it. When the document has a table of authorities, its cases
    /// are checked against the ones the argument cites.
    pub fn run_on_document(&self, blocks: &[TextBlock]) -> BriefResult<BriefAnalysis> {
        let section = locate_section(blocks, &self.config)?;
        let mut analysis = self.run_on_section(&section.blocks, section.start_page, section.end_page);

        match locate_authorities(blocks, &self.config) {
            Some(table) => {
                let toa_cases = self.table_cases(&table);
                let argument_cases = analysis.cited_cases();
                analysis.summary.compare_authorities(toa_cases, &argument_cases);
                if analysis.summary.cases_match == Some(false) {
                    log::info!(
                        "table of authorities differs: {} only in table, {} only in argument",
                        analysis.summary.toa_only.len(),
                        analysis.summary.argument_only.len()
                    );
                }
            }
            None => log::debug!("no table of authorities"),
        }

        Ok(analysis)
    }

    /// Sorted, de-duplicated names of the full citations in a table of
    /// authorities.
    fn table_cases(&self, table: &Section) -> Vec<String> {
        let raw: Vec<&str> = table.blocks.iter().map(|b| b.content.as_str()).collect();
        let text = normalize_text(&raw.join("\n\n"));
        let mut cache = self.records.map(RecordCache::new);

        self.recognizer
            .recognize(&text)
            .iter()
            .filter_map(|token| match &token.kind {
                TokenKind::FullCase {
                    reference,
                    plaintiff,
                    defendant,
                    ..
                } => case_identity(
                    reference,
                    plaintiff.as_deref(),
                    defendant.as_deref(),
                    cache.as_mut(),
                )
                .1,
                _ => None,
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Analyze blocks already cropped to the argument section.
    pub fn run_on_section(&self, blocks: &[TextBlock], start_page: u32, end_page: u32) -> BriefAnalysis {
        let layout = segment_layout(blocks, &self.config);
        let mut document = SectionDocument::from_layout(&layout, &self.segmenter);
        let units = document.units();

        let mut tokens = self.recognizer.recognize(&document.text);
        tokens.sort_by_key(|t| (t.span.base.start, t.span.base.end));
        if units.is_empty() && !tokens.is_empty() {
            log::warn!("{} citation tokens in an empty section were ignored", tokens.len());
            tokens.clear();
        }

        let mut cache = self.records.map(RecordCache::new);
        let (mut citations, unit_of): (Vec<Citation>, Vec<usize>) = tokens
            .iter()
            .map(|token| self.build_citation(&document.text, &units, token, cache.as_mut()))
            .unzip();

        resolve_cross_references(&mut citations, &tokens, self.config.pin_cite_window);

        let mut attributions = attribute_propositions(
            &document.text,
            &units,
            &citations,
            &unit_of,
            self.config.quotation_min_chars,
        );

        let quote_texts: Vec<String> = document
            .block_quotes()
            .iter()
            .map(|quote| quote.text.clone())
            .collect();
        let quote_refs: Vec<&str> = quote_texts.iter().map(String::as_str).collect();
        let links = link_block_quotes(
            &mut attributions,
            &quote_refs,
            self.config.block_quote_identifier_words,
        );
        for link in &links {
            if let Some(quote) = document.block_quote_mut(link.block_quote) {
                quote.intro_text = link.intro_text.clone();
            }
        }

        let propositions = assemble_propositions(&attributions, &citations);
        document.attach_citations(&units, &citations, &unit_of);

        let summary = Summary::new(&propositions, &citations, &layout.margins, start_page, end_page);
        log::debug!(
            "{} citations, {} propositions",
            summary.total_citations,
            propositions.len()
        );

        BriefAnalysis {
            summary,
            propositions,
            paragraphs: document.paragraphs,
            block_quote_links: links,
            text: document.text,
        }
    }

    /// Resolve one token into a citation and the unit it belongs to.
    fn build_citation(
        &self,
        text: &str,
        units: &[Unit],
        token: &CitationToken,
        cache: Option<&mut RecordCache<'_>>,
    ) -> (Citation, usize) {
        let span = resolve_span(text, token, self.config.antecedent_lookback_chars);
        let u = unit_at(units, span.start);
        let limit = units.get(u).map_or(text.len(), |unit| unit.limit(span.start));

        let signal = detect_signal(text, span.start, self.config.signal_lookback_chars);
        let parenthetical = detect_parenthetical(
            text,
            span.end,
            self.config.parenthetical_lookahead_chars,
            limit,
        );

        let mut citation = Citation::new(
            &text[span.clone()],
            CitationKind::from(&token.kind),
            span,
            signal.map(str::to_string),
            parenthetical,
        )
        .with_token_fields(&token.kind);

        if let TokenKind::FullCase {
            reference,
            plaintiff,
            defendant,
            ..
        } = &token.kind
        {
            (citation.record, citation.case_name) =
                case_identity(reference, plaintiff.as_deref(), defendant.as_deref(), cache);
        }

        (citation, u)
    }
}

/// Record and case name of a full citation. The record's name wins over
/// the recognizer's parties.
fn case_identity(
    reference: &Reference,
    plaintiff: Option<&str>,
    defendant: Option<&str>,
    cache: Option<&mut RecordCache<'_>>,
) -> (Option<CaseRecord>, Option<String>) {
    let record = cache.and_then(|cache| cache.get(reference));
    let case_name = record
        .as_ref()
        .map(|record| record.case_name.trim().to_string())
        .filter(|name| !name.is_empty())
        .or_else(|| case_name_from_parties(plaintiff, defendant));
    (record, case_name)
}
