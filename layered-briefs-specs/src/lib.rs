#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Fixture-driven regression testing for layered-briefs.
//!
//! Each `.toml` fixture describes a brief section as positioned text
//! blocks, the citations an external recognizer would report in it, and
//! the expected analysis. The harness runs every fixture through the
//! pipeline and classifies each failed check against
//! `expected_failures.toml`.
//!
//! ## Modules
//!
//! - [`fixture`] - Fixture types
//! - [`loader`] - Loads the scenarios of one flat fixture directory
//! - [`recognizer`] - Fixture-backed citation recognizer and record table
//! - [`runner`] - Runs fixtures and checks expectations
//! - [`failures`] - Expected failures keyed by fixture and assertion
//! - [`errors`] - Error types for the fixture harness

pub mod errors;
pub mod failures;
pub mod fixture;
pub mod loader;
pub mod recognizer;
pub mod runner;

pub use errors::{SpecError, SpecResult};
pub use failures::{ExpectedFailures, FailureEntry, FailureState, HarnessResult, Tracking};
pub use fixture::{
    BlockSpec, BriefFixture, CitationExpectation, CitationSpec, RecordSpec, SummaryExpectation,
};
pub use loader::{load_all_fixtures, load_fixture, parse_fixture, EXPECTED_FAILURES_FILE};
pub use recognizer::{find_occurrence, FixtureRecognizer, RecordTable};
pub use runner::{check_fixture, run_all, run_fixture, AssertionOutcome};

#[cfg(test)]
mod tests;
