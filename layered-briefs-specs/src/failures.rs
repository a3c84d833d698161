//! Expected failures, one TOML table per fixture.
//!
//! ```toml
//! ["id-window.toml"]
//! "C2.refers_to" = { state = "pending", reason = "Pin cite beyond the window" }
//! "summary.needs_review" = { state = "known" }
//! ```
//!
//! Keys inside a table are assertion references: `C<i>.<field>` for the
//! `i`th citation in document order, `summary.<field>` for summary checks.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::{SpecError, SpecResult};

/// Expected failures by fixture file name, then assertion reference.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct ExpectedFailures {
    fixtures: BTreeMap<String, BTreeMap<String, FailureEntry>>,
}

/// Why one assertion is allowed to fail.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FailureEntry {
    pub state: Tracking,
    #[serde(default)]
    pub reason: Option<String>,
}

/// How an expected failure is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tracking {
    /// Known limitation, won't fix soon.
    Known,
    /// Awaiting fix, not blocking.
    Pending,
}

/// Classification of a failed assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureState {
    Known,
    Pending,
    /// Expected to pass - failure is a regression.
    Regression,
}

impl ExpectedFailures {
    /// Load from a TOML file. A missing file means no expected failures.
    pub fn load(path: &Path) -> SpecResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| SpecError::Load {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse expected failures. `path` is only used in error messages.
    pub fn parse(content: &str, path: &str) -> SpecResult<Self> {
        toml::from_str(content).map_err(|e| SpecError::Parse {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    pub fn is_expected(&self, fixture: &str, assertion_ref: &str) -> FailureState {
        match self
            .fixtures
            .get(fixture)
            .and_then(|entries| entries.get(assertion_ref))
        {
            Some(FailureEntry {
                state: Tracking::Known,
                ..
            }) => FailureState::Known,
            Some(FailureEntry {
                state: Tracking::Pending,
                ..
            }) => FailureState::Pending,
            None => FailureState::Regression,
        }
    }

    /// Reference for a field of the citation at `citation` in document order.
    pub fn format_ref(citation: usize, field: &str) -> String {
        format!("C{}.{}", citation, field)
    }

    /// Reference for a summary field.
    pub fn format_summary_ref(field: &str) -> String {
        format!("summary.{}", field)
    }
}

/// Result of running the harness.
#[derive(Debug, Clone, Default)]
pub struct HarnessResult {
    pub total: usize,
    pub passed: usize,
    /// Expected failures (known + pending).
    pub expected_failures: usize,
    pub regressions: usize,
    /// `fixture: reference: message` for every regression.
    pub regression_messages: Vec<String>,
}

impl HarnessResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&self) -> bool {
        self.regressions == 0
    }

    pub fn record_pass(&mut self) {
        self.total += 1;
        self.passed += 1;
    }

    pub fn record_failure(&mut self, state: FailureState) {
        self.total += 1;
        match state {
            FailureState::Known | FailureState::Pending => self.expected_failures += 1,
            FailureState::Regression => self.regressions += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAILURES: &str = r#"
["id-window.toml"]
"C2.refers_to" = { state = "pending", reason = "Pin cite beyond the window" }

["block-quote.toml"]
"summary.block_quote_links" = { state = "known" }
"#;

    #[test]
    fn test_entries_keyed_by_fixture() {
        let failures = ExpectedFailures::parse(FAILURES, "inline").unwrap();

        assert_eq!(
            failures.is_expected("id-window.toml", "C2.refers_to"),
            FailureState::Pending
        );
        assert_eq!(
            failures.is_expected("block-quote.toml", "summary.block_quote_links"),
            FailureState::Known
        );
        assert_eq!(
            failures.is_expected("block-quote.toml", "C2.refers_to"),
            FailureState::Regression
        );
        assert_eq!(
            failures.is_expected("string-cite.toml", "C0.signal"),
            FailureState::Regression
        );
    }

    #[test]
    fn test_unknown_state_is_a_parse_error() {
        let result = ExpectedFailures::parse(
            "[\"a.toml\"]\n\"C0.signal\" = { state = \"someday\" }\n",
            "expected_failures.toml",
        );
        match result {
            Err(SpecError::Parse { path, .. }) => assert_eq!(path, "expected_failures.toml"),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_format_ref() {
        assert_eq!(ExpectedFailures::format_ref(2, "refers_to"), "C2.refers_to");
        assert_eq!(
            ExpectedFailures::format_summary_ref("total_citations"),
            "summary.total_citations"
        );
    }

    #[test]
    fn test_harness_result_record() {
        let mut result = HarnessResult::new();
        result.record_pass();
        result.record_failure(FailureState::Pending);
        assert!(result.success());

        result.record_failure(FailureState::Regression);
        assert!(!result.success());
        assert_eq!((result.total, result.passed), (3, 1));
        assert_eq!((result.expected_failures, result.regressions), (1, 1));
    }

    #[test]
    fn test_load_nonexistent_returns_empty() {
        let failures = ExpectedFailures::load(Path::new("/nonexistent/path.toml")).unwrap();
        assert_eq!(
            failures.is_expected("a.toml", "C0.signal"),
            FailureState::Regression
        );
    }
}
