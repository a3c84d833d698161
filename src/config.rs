//! Pipeline configuration.
//!
//! Every heuristic threshold used by the pipeline lives here so that a caller
//! can tune it from a TOML file without touching code. Missing keys fall back
//! to the defaults below.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{BriefError, BriefResult};

/// Configuration for a document-processing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Exact headings that open the argument section, tried in order.
    pub start_headings: Vec<String>,
    /// Heading prefix tried when no exact start heading matches
    /// (e.g. "Argument on sole ground:").
    pub start_prefix: String,
    /// Headings that close the argument section.
    pub end_headings: Vec<String>,
    /// Headings that open the table of authorities.
    pub authorities_headings: Vec<String>,
    /// Headings that close the case list of the table of authorities.
    pub authorities_end_headings: Vec<String>,
    /// Blocks must be longer than this to vote in margin detection.
    pub min_margin_block_chars: usize,
    /// Points beyond the body margin before a block counts as indented.
    pub indent_tolerance: f64,
    /// Indent offset assumed when only one margin cluster exists.
    pub fallback_indent_offset: f64,
    /// Blocks farther than this from the body margin are headers/footers.
    pub margin_outlier_distance: f64,
    /// Consecutive indented blocks needed to form a block quotation.
    pub min_block_quote_blocks: usize,
    /// Characters inspected before a citation when looking for a signal.
    pub signal_lookback_chars: usize,
    /// Characters inspected after a citation when looking for a parenthetical.
    pub parenthetical_lookahead_chars: usize,
    /// Characters searched before a short citation for its case name.
    pub antecedent_lookback_chars: usize,
    /// Minimum quoted run for a proposition to count as a quotation.
    pub quotation_min_chars: usize,
    /// Maximum distance between a case's start page and a pin cite.
    pub pin_cite_window: u32,
    /// Leading words of a block quotation used to find it in citation context.
    pub block_quote_identifier_words: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            start_headings: vec![
                "Reply Argument".into(),
                "Argument".into(),
                "ARGUMENT".into(),
                "REPLY ARGUMENT".into(),
            ],
            start_prefix: "Argument".into(),
            end_headings: vec![
                "Conclusion".into(),
                "Prayer".into(),
                "CONCLUSION".into(),
                "PRAYER".into(),
            ],
            authorities_headings: vec![
                "Index of Authorities".into(),
                "Table of Authorities".into(),
            ],
            authorities_end_headings: vec![
                "Statutes".into(),
                "Rules".into(),
                "Constitutional Provisions".into(),
                "Other Authorities".into(),
                "Statement of the Case".into(),
                "Statement of Facts".into(),
                "Issues Presented".into(),
                "Summary of the Argument".into(),
                "Argument".into(),
                "Reply Argument".into(),
            ],
            min_margin_block_chars: 30,
            indent_tolerance: 3.0,
            fallback_indent_offset: 36.0,
            margin_outlier_distance: 100.0,
            min_block_quote_blocks: 2,
            signal_lookback_chars: 30,
            parenthetical_lookahead_chars: 200,
            antecedent_lookback_chars: 100,
            quotation_min_chars: 15,
            pin_cite_window: 500,
            block_quote_identifier_words: 10,
        }
    }
}

impl PipelineConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text.
    pub fn from_toml_str(content: &str) -> BriefResult<Self> {
        toml::from_str(content).map_err(|e| BriefError::Config {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    /// Load a config from a TOML file.
    pub fn load(path: &Path) -> BriefResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| BriefError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| BriefError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Replace the start headings.
    pub fn with_start_headings(mut self, headings: &[&str]) -> Self {
        self.start_headings = headings.iter().map(|h| h.to_string()).collect();
        self
    }

    /// Replace the end headings.
    pub fn with_end_headings(mut self, headings: &[&str]) -> Self {
        self.end_headings = headings.iter().map(|h| h.to_string()).collect();
        self
    }

    /// Replace the headings that open the table of authorities.
    pub fn with_authorities_headings(mut self, headings: &[&str]) -> Self {
        self.authorities_headings = headings.iter().map(|h| h.to_string()).collect();
        self
    }

    /// Set the pin-cite validation window.
    pub fn with_pin_cite_window(mut self, pages: u32) -> Self {
        self.pin_cite_window = pages;
        self
    }

    /// Set the minimum quoted run for quotation classification.
    pub fn with_quotation_min_chars(mut self, chars: usize) -> Self {
        self.quotation_min_chars = chars;
        self
    }

    /// Set the indent tolerance used for block-quote detection.
    pub fn with_indent_tolerance(mut self, points: f64) -> Self {
        self.indent_tolerance = points;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.signal_lookback_chars, 30);
        assert_eq!(config.pin_cite_window, 500);
        assert_eq!(config.quotation_min_chars, 15);
        assert_eq!(config.start_headings[0], "Reply Argument");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_toml_str("pin_cite_window = 250\n").unwrap();
        assert_eq!(config.pin_cite_window, 250);
        assert_eq!(config.indent_tolerance, 3.0);
        assert_eq!(config.end_headings.len(), 4);
    }

    #[test]
    fn test_invalid_toml() {
        let err = PipelineConfig::from_toml_str("pin_cite_window = \"many\"").unwrap_err();
        assert!(matches!(err, BriefError::Config { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "start_headings = [\"Argument and Authorities\"]").unwrap();
        writeln!(file, "quotation_min_chars = 20").unwrap();

        let config = PipelineConfig::load(file.path()).unwrap();
        assert_eq!(config.start_headings, vec!["Argument and Authorities".to_string()]);
        assert_eq!(config.quotation_min_chars, 20);
    }

    #[test]
    fn test_load_missing_file() {
        let err = PipelineConfig::load(Path::new("/nonexistent/briefs.toml")).unwrap_err();
        match err {
            BriefError::Config { path, .. } => assert!(path.contains("briefs.toml")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_builders() {
        let config = PipelineConfig::new()
            .with_pin_cite_window(100)
            .with_quotation_min_chars(40)
            .with_end_headings(&["Prayer"])
            .with_authorities_headings(&["List of Authorities"]);
        assert_eq!(config.authorities_headings, vec!["List of Authorities".to_string()]);
        assert_eq!(config.pin_cite_window, 100);
        assert_eq!(config.quotation_min_chars, 40);
        assert_eq!(config.end_headings, vec!["Prayer".to_string()]);
    }
}
