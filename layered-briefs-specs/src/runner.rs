//! Runs fixtures through the brief pipeline and checks their expectations.

use std::path::Path;

use layered_briefs::{BriefAnalysis, Citation, Pipeline, Proposition, PropositionKind};

use crate::failures::{ExpectedFailures, FailureState, HarnessResult};
use crate::fixture::{BriefFixture, CitationExpectation, SummaryExpectation};
use crate::loader::load_all_fixtures;
use crate::recognizer::{FixtureRecognizer, RecordTable};
use crate::{SpecError, SpecResult};

/// Outcome of one field check.
#[derive(Debug, Clone, PartialEq)]
pub struct AssertionOutcome {
    /// Reference as used in `expected_failures.toml`.
    pub reference: String,
    pub passed: bool,
    pub message: String,
}

impl AssertionOutcome {
    fn check<T: PartialEq + std::fmt::Debug>(reference: String, expected: &T, actual: &T) -> Self {
        let passed = expected == actual;
        let message = if passed {
            String::new()
        } else {
            format!("expected {:?}, got {:?}", expected, actual)
        };
        AssertionOutcome {
            reference,
            passed,
            message,
        }
    }

    fn failed(reference: String, message: String) -> Self {
        AssertionOutcome {
            reference,
            passed: false,
            message,
        }
    }
}

/// Run a fixture through the pipeline.
pub fn run_fixture(fixture: &BriefFixture) -> SpecResult<BriefAnalysis> {
    let recognizer = FixtureRecognizer::new(&fixture.citations);
    let records = RecordTable::new(&fixture.records);
    let blocks = fixture.text_blocks();

    let mut pipeline = Pipeline::new(&recognizer).with_config(fixture.pipeline_config());
    if !records.is_empty() {
        pipeline = pipeline.with_record_lookup(&records);
    }

    if fixture.locate_section {
        return pipeline
            .run_on_document(&blocks)
            .map_err(|e| SpecError::Assertion {
                message: e.to_string(),
            });
    }

    let start_page = blocks.iter().map(|b| b.page).min().unwrap_or(1);
    let end_page = blocks.iter().map(|b| b.page).max().unwrap_or(start_page);
    Ok(pipeline.run_on_section(&blocks, start_page, end_page))
}

/// Check a fixture's expectations against its analysis.
pub fn check_fixture(fixture: &BriefFixture, analysis: &BriefAnalysis) -> Vec<AssertionOutcome> {
    let mut outcomes = Vec::new();

    let recognizer = FixtureRecognizer::new(&fixture.citations);
    for index in recognizer.missing(&analysis.text) {
        outcomes.push(AssertionOutcome::failed(
            format!("citations[{}]", index),
            format!("{:?} not found in section text", fixture.citations[index].text),
        ));
    }

    let citations = analysis.citations();
    for expectation in &fixture.expect {
        match citations.get(expectation.citation) {
            Some(citation) => {
                let proposition = proposition_for(analysis, citation);
                check_citation(expectation, citation, proposition, &mut outcomes);
            }
            None => outcomes.push(AssertionOutcome::failed(
                ExpectedFailures::format_ref(expectation.citation, "exists"),
                format!("only {} citations found", citations.len()),
            )),
        }
    }

    if let Some(summary) = &fixture.summary {
        check_summary(summary, analysis, &mut outcomes);
    }

    outcomes
}

/// The non-parenthetical proposition a citation supports.
fn proposition_for<'a>(analysis: &'a BriefAnalysis, citation: &Citation) -> Option<&'a Proposition> {
    analysis.propositions.iter().find(|p| {
        p.kind != PropositionKind::Parenthetical
            && p.citations.iter().any(|c| c.span == citation.span)
    })
}

fn check_citation(
    expect: &CitationExpectation,
    citation: &Citation,
    proposition: Option<&Proposition>,
    outcomes: &mut Vec<AssertionOutcome>,
) {
    let reference = |field: &str| ExpectedFailures::format_ref(expect.citation, field);

    if let Some(case_name) = &expect.case_name {
        outcomes.push(AssertionOutcome::check(
            reference("case_name"),
            &Some(case_name.as_str()),
            &citation.case_name.as_deref(),
        ));
    }
    if let Some(refers_to) = &expect.refers_to {
        outcomes.push(AssertionOutcome::check(
            reference("refers_to"),
            &Some(refers_to.as_str()),
            &citation.refers_to.as_deref(),
        ));
    }
    if let Some(signal) = &expect.signal {
        outcomes.push(AssertionOutcome::check(
            reference("signal"),
            &Some(signal.as_str()),
            &citation.signal(),
        ));
    }
    if let Some(needs_review) = expect.needs_review {
        outcomes.push(AssertionOutcome::check(
            reference("needs_review"),
            &needs_review,
            &citation.needs_review(),
        ));
    }
    if let Some(has_record) = expect.has_record {
        outcomes.push(AssertionOutcome::check(
            reference("has_record"),
            &has_record,
            &citation.record.is_some(),
        ));
    }
    if let Some(parenthetical) = &expect.parenthetical {
        outcomes.push(AssertionOutcome::check(
            reference("parenthetical"),
            &Some(parenthetical.as_str()),
            &citation.parenthetical().map(|p| p.content.as_str()),
        ));
    }

    let wants_proposition = expect.proposition_kind.is_some()
        || expect.proposition_text.is_some()
        || expect.string_cite_group.is_some();
    let proposition = match (wants_proposition, proposition) {
        (false, _) => return,
        (true, Some(proposition)) => proposition,
        (true, None) => {
            outcomes.push(AssertionOutcome::failed(
                reference("proposition"),
                "citation supports no proposition".to_string(),
            ));
            return;
        }
    };

    if let Some(kind) = expect.proposition_kind {
        outcomes.push(AssertionOutcome::check(
            reference("proposition_kind"),
            &kind,
            &proposition.kind,
        ));
    }
    if let Some(text) = &expect.proposition_text {
        outcomes.push(AssertionOutcome::check(
            reference("proposition_text"),
            text,
            &proposition.text,
        ));
    }
    if let Some(group) = expect.string_cite_group {
        outcomes.push(AssertionOutcome::check(
            reference("string_cite_group"),
            &group,
            &proposition.string_cite_group,
        ));
    }
}

fn check_summary(
    expect: &SummaryExpectation,
    analysis: &BriefAnalysis,
    outcomes: &mut Vec<AssertionOutcome>,
) {
    let summary = &analysis.summary;
    let counts = [
        ("total_citations", expect.total_citations, summary.total_citations),
        ("total_statements", expect.total_statements, summary.total_statements),
        ("total_quotations", expect.total_quotations, summary.total_quotations),
        (
            "total_block_quotations",
            expect.total_block_quotations,
            summary.total_block_quotations,
        ),
        (
            "total_parentheticals",
            expect.total_parentheticals,
            summary.total_parentheticals,
        ),
        ("needs_review", expect.needs_review, summary.needs_review),
        (
            "block_quote_links",
            expect.block_quote_links,
            analysis.block_quote_links.len(),
        ),
    ];
    for (field, expected, actual) in counts {
        if let Some(expected) = expected {
            outcomes.push(AssertionOutcome::check(
                ExpectedFailures::format_summary_ref(field),
                &expected,
                &actual,
            ));
        }
    }

    if let Some(degraded) = expect.layout_degraded {
        outcomes.push(AssertionOutcome::check(
            ExpectedFailures::format_summary_ref("layout_degraded"),
            &degraded,
            &summary.layout_degraded,
        ));
    }
    if let Some(cases_match) = expect.cases_match {
        outcomes.push(AssertionOutcome::check(
            ExpectedFailures::format_summary_ref("cases_match"),
            &Some(cases_match),
            &summary.cases_match,
        ));
    }

    let case_lists = [
        ("toa_only", &expect.toa_only, &summary.toa_only),
        ("argument_only", &expect.argument_only, &summary.argument_only),
    ];
    for (field, expected, actual) in case_lists {
        if let Some(expected) = expected {
            outcomes.push(AssertionOutcome::check(
                ExpectedFailures::format_summary_ref(field),
                expected,
                actual,
            ));
        }
    }
}

/// Run every fixture under `dir`, classifying failures against
/// `expected`.
pub fn run_all(dir: &Path, expected: &ExpectedFailures) -> SpecResult<HarnessResult> {
    let mut result = HarnessResult::new();

    for (name, fixture) in load_all_fixtures(dir)? {
        let outcomes = match run_fixture(&fixture) {
            Ok(analysis) => check_fixture(&fixture, &analysis),
            Err(e) => vec![AssertionOutcome::failed("run".to_string(), e.to_string())],
        };
        log::debug!("{}: {} checks", name, outcomes.len());

        for outcome in outcomes {
            if outcome.passed {
                result.record_pass();
                continue;
            }
            let state = expected.is_expected(&name, &outcome.reference);
            if state == FailureState::Regression {
                log::warn!("{}: {}: {}", name, outcome.reference, outcome.message);
                result
                    .regression_messages
                    .push(format!("{}: {}: {}", name, outcome.reference, outcome.message));
            }
            result.record_failure(state);
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_fixture;

    const FIXTURE: &str = r#"
[[blocks]]
text = "The rule is clear. See Jones v. State, 10 S.W.3d 1 (Tex. 2000)."

[[citations]]
kind = "full_case"
text = "Jones v. State, 10 S.W.3d 1 (Tex. 2000)"
base = "10 S.W.3d 1"
volume = "10"
reporter = "S.W.3d"
page = "1"
plaintiff = "Jones"
defendant = "State"

[[expect]]
citation = 0
case_name = "Jones v. State"
signal = "see"
needs_review = false
"#;

    #[test]
    fn test_failed_checks_are_reported_by_reference() {
        let fixture = parse_fixture(FIXTURE, "inline").unwrap();
        let analysis = run_fixture(&fixture).unwrap();
        let outcomes = check_fixture(&fixture, &analysis);

        let failed: Vec<(&str, &str)> = outcomes
            .iter()
            .filter(|o| !o.passed)
            .map(|o| (o.reference.as_str(), o.message.as_str()))
            .collect();
        insta::assert_debug_snapshot!(failed, @r###"
        [
            (
                "C0.needs_review",
                "expected false, got true",
            ),
        ]
        "###);
        assert_eq!(outcomes.len(), 3);
    }

    #[test]
    fn test_missing_citation_is_a_failure() {
        let fixture = parse_fixture(
            r#"
[[blocks]]
text = "Nothing cited here."

[[citations]]
kind = "id"
text = "Id."

[[expect]]
citation = 0
signal = "see"
"#,
            "inline",
        )
        .unwrap();
        let analysis = run_fixture(&fixture).unwrap();
        let references: Vec<String> = check_fixture(&fixture, &analysis)
            .into_iter()
            .map(|o| o.reference)
            .collect();
        assert_eq!(references, vec!["citations[0]", "C0.exists"]);
    }

    #[test]
    fn test_missing_section_fails_the_run() {
        let fixture = parse_fixture(
            r#"
locate_section = true

[[blocks]]
text = "Statement of Facts"
"#,
            "inline",
        )
        .unwrap();
        assert!(matches!(
            run_fixture(&fixture),
            Err(SpecError::Assertion { .. })
        ));
    }
}
