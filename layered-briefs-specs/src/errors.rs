//! Error types for the fixture harness.
//!
//! This module defines error types for fixture parsing, fixture loading,
//! and assertion failures.

use thiserror::Error;

/// Errors that can occur while loading or running fixtures.
#[derive(Debug, Error)]
pub enum SpecError {
    /// A fixture file is not valid fixture TOML.
    #[error("parse error in {path}: {message}")]
    Parse { path: String, message: String },

    /// A fixture file could not be read.
    #[error("failed to load fixture: {path}: {message}")]
    Load { path: String, message: String },

    /// The pipeline could not run the fixture at all.
    #[error("assertion failed: {message}")]
    Assertion { message: String },
}

/// Result type for harness operations.
pub type SpecResult<T> = Result<T, SpecError>;
