use crate::{
    check_fixture, load_fixture, run_all, run_fixture, BriefFixture, ExpectedFailures,
    EXPECTED_FAILURES_FILE,
};
use layered_briefs::PropositionKind;
use std::path::{Path, PathBuf};

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

fn fixture(name: &str) -> BriefFixture {
    load_fixture(&fixtures_dir().join(name))
        .unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

fn assert_fixture_passes(name: &str) {
    let fixture = fixture(name);
    let analysis = run_fixture(&fixture).unwrap();
    let failed: Vec<String> = check_fixture(&fixture, &analysis)
        .into_iter()
        .filter(|o| !o.passed)
        .map(|o| format!("{}: {}", o.reference, o.message))
        .collect();
    assert!(failed.is_empty(), "{}:\n{}", name, failed.join("\n"));
}

#[test]
fn test_string_cite_fixture() {
    assert_fixture_passes("string-cite.toml");
}

#[test]
fn test_parentheticals_fixture() {
    assert_fixture_passes("parentheticals.toml");
}

#[test]
fn test_id_window_fixture() {
    assert_fixture_passes("id-window.toml");
}

#[test]
fn test_block_quote_fixture() {
    let fixture = fixture("block-quote.toml");
    assert_eq!(fixture.blocks[1].x, 108.0);
    assert_eq!(
        fixture.expect[0].proposition_kind,
        Some(PropositionKind::BlockQuotation)
    );
    assert_fixture_passes("block-quote.toml");
}

#[test]
fn test_section_crop_fixture() {
    let fixture = fixture("section-crop.toml");
    assert!(fixture.locate_section);

    let analysis = run_fixture(&fixture).unwrap();
    assert_eq!((analysis.summary.start_page, analysis.summary.end_page), (2, 3));
    assert!(!analysis.text.contains("reversed"));
    assert_fixture_passes("section-crop.toml");
}

#[test]
fn test_authorities_fixture() {
    let fixture = fixture("authorities.toml");
    let analysis = run_fixture(&fixture).unwrap();

    assert_eq!(analysis.summary.toa_cases, vec!["Brown v. State", "Smith v. State"]);
    assert!(!analysis.text.contains("Penal Code"));
    assert_fixture_passes("authorities.toml");
}

#[test]
fn test_harness_has_no_regressions() {
    let dir = fixtures_dir();
    let expected = ExpectedFailures::load(&dir.join(EXPECTED_FAILURES_FILE)).unwrap();
    let result = run_all(&dir, &expected).unwrap();

    assert!(result.total > 0);
    assert!(
        result.success(),
        "regressions:\n{}",
        result.regression_messages.join("\n")
    );
}
