//! Layout segmentation: positioned text blocks into body paragraphs and
//! block quotations.
//!
//! Block quotations are recognized purely by indentation. The two most
//! common left edges among substantial blocks are taken as the body margin
//! and the block-quote indent. When the page does not show two clear edges,
//! segmentation continues against an assumed indent and the result is marked
//! degraded.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::text::normalize_text;

/// A positioned run of text from the layout extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub content: String,
    pub left_x: f64,
    pub top_y: f64,
    pub page: u32,
}

impl TextBlock {
    pub fn new(content: impl Into<String>, left_x: f64, top_y: f64, page: u32) -> Self {
        TextBlock {
            content: content.into(),
            left_x,
            top_y,
            page,
        }
    }
}

/// Detected margins for a section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Margins {
    pub body: f64,
    pub indent: f64,
    /// Fewer than two margin clusters were found.
    pub degraded: bool,
    #[serde(skip)]
    threshold: f64,
}

impl Margins {
    /// Whether a block sits at block-quote indentation.
    pub fn is_indented(&self, block: &TextBlock) -> bool {
        block.left_x > self.threshold
    }
}

/// A paragraph-level group of blocks.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutParagraph {
    Body(Vec<TextBlock>),
    BlockQuote(Vec<TextBlock>),
}

impl LayoutParagraph {
    pub fn blocks(&self) -> &[TextBlock] {
        match self {
            LayoutParagraph::Body(blocks) | LayoutParagraph::BlockQuote(blocks) => blocks,
        }
    }

    pub fn is_block_quote(&self) -> bool {
        matches!(self, LayoutParagraph::BlockQuote(_))
    }

    /// Normalized paragraph text.
    pub fn text(&self) -> String {
        let joined = self
            .blocks()
            .iter()
            .map(|b| b.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        normalize_text(&joined)
    }

    pub fn start_page(&self) -> u32 {
        self.blocks().first().map_or(0, |b| b.page)
    }

    pub fn end_page(&self) -> u32 {
        self.blocks().last().map_or(0, |b| b.page)
    }
}

/// Result of layout segmentation.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub paragraphs: Vec<LayoutParagraph>,
    pub margins: Margins,
    /// Blocks dropped as running headers, footers or page numbers.
    pub dropped_blocks: usize,
}

/// Detect body and indent margins.
pub fn detect_margins(blocks: &[TextBlock], config: &PipelineConfig) -> Margins {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for block in blocks {
        if block.content.trim().chars().count() > config.min_margin_block_chars {
            *counts.entry(block.left_x.round() as i64).or_default() += 1;
        }
    }

    // Most frequent first, smaller x on ties
    let mut clusters: Vec<(i64, usize)> = counts.into_iter().collect();
    clusters.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    match clusters.as_slice() {
        [first, second, ..] => {
            let body = first.0.min(second.0) as f64;
            let indent = first.0.max(second.0) as f64;
            log::debug!("margins: body={} indent={}", body, indent);
            Margins {
                body,
                indent,
                degraded: false,
                threshold: body + config.indent_tolerance,
            }
        }
        [only] => degraded_margins(only.0 as f64, config),
        [] => {
            let body = blocks
                .iter()
                .map(|b| b.left_x.round())
                .reduce(f64::min)
                .unwrap_or(0.0);
            degraded_margins(body, config)
        }
    }
}

fn degraded_margins(body: f64, config: &PipelineConfig) -> Margins {
    let indent = body + config.fallback_indent_offset;
    log::warn!(
        "margin detection degraded: assuming body={} indent={}",
        body,
        indent
    );
    Margins {
        body,
        indent,
        degraded: true,
        threshold: indent - config.indent_tolerance,
    }
}

/// Group section blocks into body paragraphs and block quotations.
///
/// Blocks are first put in reading order (page, top, left). Runs of at least
/// `min_block_quote_blocks` consecutive indented blocks become block
/// quotations; everything else, including a lone indented first line,
/// accumulates into the current body paragraph.
pub fn segment_layout(blocks: &[TextBlock], config: &PipelineConfig) -> Layout {
    let margins = detect_margins(blocks, config);

    let mut ordered: Vec<&TextBlock> = blocks
        .iter()
        .filter(|b| !b.content.trim().is_empty())
        .collect();
    ordered.sort_by(|a, b| {
        a.page
            .cmp(&b.page)
            .then(a.top_y.total_cmp(&b.top_y))
            .then(a.left_x.total_cmp(&b.left_x))
    });

    let before = ordered.len();
    ordered.retain(|b| (b.left_x - margins.body).abs() <= config.margin_outlier_distance);
    let dropped_blocks = before - ordered.len();
    if dropped_blocks > 0 {
        log::debug!("dropped {} header/footer blocks", dropped_blocks);
    }

    let mut grouper = Grouper::new(config.min_block_quote_blocks.max(1));
    for block in ordered {
        if margins.is_indented(block) {
            grouper.run.push(block.clone());
        } else {
            grouper.flush_run();
            grouper.body.push(block.clone());
        }
    }
    let paragraphs = grouper.finish();

    log::debug!(
        "layout: {} paragraphs ({} block quotes)",
        paragraphs.len(),
        paragraphs.iter().filter(|p| p.is_block_quote()).count()
    );

    Layout {
        paragraphs,
        margins,
        dropped_blocks,
    }
}

struct Grouper {
    min_run: usize,
    paragraphs: Vec<LayoutParagraph>,
    body: Vec<TextBlock>,
    run: Vec<TextBlock>,
}

impl Grouper {
    fn new(min_run: usize) -> Self {
        Grouper {
            min_run,
            paragraphs: Vec::new(),
            body: Vec::new(),
            run: Vec::new(),
        }
    }

    fn flush_run(&mut self) {
        if self.run.len() >= self.min_run {
            self.close_body();
            self.paragraphs
                .push(LayoutParagraph::BlockQuote(std::mem::take(&mut self.run)));
        } else {
            self.body.append(&mut self.run);
        }
    }

    fn close_body(&mut self) {
        if !self.body.is_empty() {
            self.paragraphs
                .push(LayoutParagraph::Body(std::mem::take(&mut self.body)));
        }
    }

    fn finish(mut self) -> Vec<LayoutParagraph> {
        self.flush_run();
        self.close_body();
        self.paragraphs
    }
}
