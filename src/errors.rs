//! Error types for brief processing.
//!
//! Only structural failures are errors. Degraded layout detection, unresolved
//! back-references and malformed parentheticals are reported through the
//! shape of the output instead.

use thiserror::Error;

/// Errors that can occur while processing a brief.
#[derive(Debug, Error)]
pub enum BriefError {
    /// None of the configured start headings was found in the document.
    #[error("section not found: no heading matched {headings:?}")]
    SectionNotFound { headings: Vec<String> },

    /// A configuration file could not be read or parsed.
    #[error("invalid configuration: {path}: {message}")]
    Config { path: String, message: String },
}

/// Result type for brief processing.
pub type BriefResult<T> = Result<T, BriefError>;
