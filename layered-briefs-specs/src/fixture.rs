//! Core types for `.toml` brief fixtures.
//!
//! A fixture describes one brief section as positioned text blocks, the
//! citations a recognizer would report in it, optional external case
//! records, and the expected analysis:
//!
//! ```toml
//! title = "String cite"
//!
//! [[blocks]]
//! text = "The rule is clear. Jones v. State, 10 S.W.3d 1 (Tex. 2000)."
//!
//! [[citations]]
//! kind = "full_case"
//! text = "Jones v. State, 10 S.W.3d 1 (Tex. 2000)"
//! base = "10 S.W.3d 1"
//!
//! [[expect]]
//! citation = 0
//! proposition_text = "The rule is clear."
//! ```

use layered_briefs::{CitationKind, PipelineConfig, PropositionKind, TextBlock};
use serde::{Deserialize, Serialize};

fn default_left_x() -> f64 {
    72.0
}

fn default_page() -> u32 {
    1
}

/// A parsed brief fixture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BriefFixture {
    #[serde(default)]
    pub title: Option<String>,
    /// Run section location over the blocks instead of treating them as
    /// the section already.
    #[serde(default)]
    pub locate_section: bool,
    /// Overrides for pipeline thresholds.
    #[serde(default)]
    pub config: Option<PipelineConfig>,
    pub blocks: Vec<BlockSpec>,
    #[serde(default)]
    pub citations: Vec<CitationSpec>,
    #[serde(default)]
    pub records: Vec<RecordSpec>,
    #[serde(default)]
    pub expect: Vec<CitationExpectation>,
    #[serde(default)]
    pub summary: Option<SummaryExpectation>,
}

/// One positioned text block. Blocks default to the body margin on page 1
/// and are laid out top to bottom in file order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSpec {
    pub text: String,
    #[serde(default = "default_left_x")]
    pub x: f64,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default = "default_page")]
    pub page: u32,
}

/// A citation as the recognizer would report it, located by text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitationSpec {
    pub kind: CitationKind,
    /// Full citation text, searched for in the normalized section text.
    pub text: String,
    /// Reporter part of `text`; defaults to all of it.
    #[serde(default)]
    pub base: Option<String>,
    /// Which occurrence of `text` to use, 0-based.
    #[serde(default)]
    pub occurrence: usize,
    #[serde(default)]
    pub volume: Option<String>,
    #[serde(default)]
    pub reporter: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub pin_cite: Option<String>,
    #[serde(default)]
    pub plaintiff: Option<String>,
    #[serde(default)]
    pub defendant: Option<String>,
    #[serde(default)]
    pub antecedent: Option<String>,
    /// Listed only in the table of authorities, so absence from the
    /// argument text is not a failure.
    #[serde(default)]
    pub table_only: bool,
}

/// An external case record, keyed by "volume reporter page".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSpec {
    pub citation: String,
    pub case_name: String,
    #[serde(default)]
    pub parallel: Vec<String>,
}

/// Expected fields of one citation, by document-order index. Absent fields
/// are not checked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CitationExpectation {
    pub citation: usize,
    #[serde(default)]
    pub case_name: Option<String>,
    #[serde(default)]
    pub refers_to: Option<String>,
    #[serde(default)]
    pub signal: Option<String>,
    #[serde(default)]
    pub needs_review: Option<bool>,
    #[serde(default)]
    pub has_record: Option<bool>,
    #[serde(default)]
    pub parenthetical: Option<String>,
    #[serde(default)]
    pub proposition_kind: Option<PropositionKind>,
    #[serde(default)]
    pub proposition_text: Option<String>,
    #[serde(default)]
    pub string_cite_group: Option<usize>,
}

/// Expected summary counts. Absent fields are not checked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryExpectation {
    #[serde(default)]
    pub total_citations: Option<usize>,
    #[serde(default)]
    pub total_statements: Option<usize>,
    #[serde(default)]
    pub total_quotations: Option<usize>,
    #[serde(default)]
    pub total_block_quotations: Option<usize>,
    #[serde(default)]
    pub total_parentheticals: Option<usize>,
    #[serde(default)]
    pub needs_review: Option<usize>,
    #[serde(default)]
    pub layout_degraded: Option<bool>,
    #[serde(default)]
    pub block_quote_links: Option<usize>,
    #[serde(default)]
    pub cases_match: Option<bool>,
    #[serde(default)]
    pub toa_only: Option<Vec<String>>,
    #[serde(default)]
    pub argument_only: Option<Vec<String>>,
}

impl BriefFixture {
    /// Blocks as the layout extractor would deliver them.
    pub fn text_blocks(&self) -> Vec<TextBlock> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(i, block)| {
                let y = block.y.unwrap_or(10.0 * (i as f64 + 1.0));
                TextBlock::new(block.text.clone(), block.x, y, block.page)
            })
            .collect()
    }

    /// Pipeline configuration for this fixture.
    pub fn pipeline_config(&self) -> PipelineConfig {
        self.config.clone().unwrap_or_default()
    }
}
