use super::fixtures::{body, full_case};
use crate::{BriefAnalysis, CitationToken, Pipeline, PropositionKind};

const JONES: &str = "Jones v. State, 10 S.W.3d 1 (Tex. 2000)";
const BROWN: &str = "Brown v. State, 20 S.W.3d 2 (Tex. 2001)";
const GREEN: &str = "Green v. State, 30 S.W.3d 3 (Tex. 2002)";

fn reporter(full: &str) -> &str {
    let start = full.find(", ").map_or(0, |i| i + 2);
    let end = full.find(" (").unwrap_or(full.len());
    &full[start..end]
}

/// Recognizes each of `cases` wherever its full text appears.
fn analyze(paragraph: &str, cases: &'static [&'static str]) -> BriefAnalysis {
    let recognizer = move |text: &str| -> Vec<CitationToken> {
        cases
            .iter()
            .filter(|case| text.contains(*case))
            .map(|case| full_case(text, case, reporter(case)))
            .collect()
    };
    let blocks = vec![body(paragraph, 10.0)];
    Pipeline::new(&recognizer).run_on_section(&blocks, 1, 1)
}

#[test]
fn string_cite_shares_one_proposition() {
    let paragraph = format!("The rule is clear. {}; {}; and {}.", JONES, BROWN, GREEN);
    let analysis = analyze(&paragraph, &[JONES, BROWN, GREEN]);

    assert_eq!(analysis.propositions.len(), 1);
    let proposition = &analysis.propositions[0];
    assert_eq!(proposition.text, "The rule is clear.");
    assert_eq!(proposition.kind, PropositionKind::Statement);
    assert_eq!(proposition.string_cite_group, 1);
    let cited: Vec<&str> = proposition.citations.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(cited, vec![JONES, BROWN, GREEN]);
}

#[test]
fn parenthetical_becomes_its_own_proposition() {
    let paragraph = format!(
        "The rule is clear. See {} (holding that the statute applies).",
        JONES
    );
    let analysis = analyze(&paragraph, &[JONES]);

    let kinds: Vec<PropositionKind> = analysis.propositions.iter().map(|p| p.kind).collect();
    assert_eq!(kinds, vec![PropositionKind::Statement, PropositionKind::Parenthetical]);
    assert_eq!(analysis.propositions[0].text, "The rule is clear.");
    assert_eq!(analysis.propositions[1].text, "the statute applies");
    assert_eq!(analysis.summary.total_parentheticals, 1);

    let citation = analysis.citations()[0];
    assert_eq!(citation.signal(), Some("see"));
    assert_eq!(citation.parenthetical().map(|p| p.verb.as_str()), Some("holding"));
    assert!(!citation.needs_review());
}

#[test]
fn needs_review_tracks_signal_without_parenthetical() {
    let paragraph = format!(
        "The State must prove intent. Cf. {} (per curiam). Intent was never shown. {}. \
         The jury was misled. Accord {} (noting the same defect).",
        BROWN, JONES, GREEN
    );
    let analysis = analyze(&paragraph, &[JONES, BROWN, GREEN]);
    let citations = analysis.citations();
    assert_eq!(citations.len(), 3);

    for citation in &citations {
        assert_eq!(
            citation.needs_review(),
            citation.signal().is_some() && citation.parenthetical().is_none(),
            "{}",
            citation.text
        );
    }
    // "(per curiam)" does not open with an explanatory verb
    assert_eq!(citations[0].signal(), Some("cf."));
    assert!(citations[0].needs_review());
    assert!(!citations[1].needs_review());
    assert!(!citations[2].needs_review());
    assert_eq!(analysis.summary.needs_review, 1);
}

#[test]
fn quotation_kind_and_quoted_runs() {
    let paragraph = format!(
        "Courts require \"a showing of actual prejudice\" before reversal. {}. \
         The \"error\" was harmless. {}.",
        JONES, BROWN
    );
    let analysis = analyze(&paragraph, &[JONES, BROWN]);

    let quotation = &analysis.propositions[0];
    assert_eq!(quotation.kind, PropositionKind::Quotation);
    assert_eq!(quotation.quotations, vec!["a showing of actual prejudice"]);

    // A one-word quote is below the threshold
    let statement = &analysis.propositions[1];
    assert_eq!(statement.text, "The \"error\" was harmless.");
    assert_eq!(statement.kind, PropositionKind::Statement);
    assert_eq!(statement.string_cite_group, 2);
    assert_eq!(analysis.summary.total_quotations, 1);
    assert_eq!(analysis.summary.total_statements, 1);
}

#[test]
fn mid_sentence_citation_spans_the_citation() {
    let paragraph = format!("The rule -- {} -- applies here.", JONES);
    let analysis = analyze(&paragraph, &[JONES]);

    assert_eq!(analysis.propositions.len(), 1);
    assert_eq!(analysis.propositions[0].text, "The rule applies here.");
}

#[test]
fn annotation_residue_is_not_a_proposition() {
    let paragraph = format!(
        "Review is \"highly deferential to the jury verdict.\" {} (emphasis added); {}.",
        JONES, BROWN
    );
    let analysis = analyze(&paragraph, &[JONES, BROWN]);

    assert_eq!(analysis.propositions.len(), 1);
    assert_eq!(analysis.propositions[0].citations.len(), 2);
    assert_eq!(analysis.propositions[0].kind, PropositionKind::Quotation);
}
