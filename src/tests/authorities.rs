use super::fixtures::full_case;
use crate::{locate_authorities, CitationToken, Pipeline, PipelineConfig, TextBlock};

/// (full text, base, plaintiff) of every citation the scenarios use.
const CITES: &[(&str, &str, &str)] = &[
    ("Smith v. State, 123 S.W.3d 456 (Tex. 2004)", "123 S.W.3d 456", "Smith"),
    ("Brown v. State, 80 S.W.3d 10 (Tex. 2002)", "80 S.W.3d 10", "Brown"),
    (
        "Roderick Smith v. State, 123 S.W.3d 456, 460 (Tex. 2004)",
        "123 S.W.3d 456, 460",
        "Roderick Smith",
    ),
    ("Jones v. State, 50 S.W.3d 7, 9 (Tex. 2001)", "50 S.W.3d 7, 9", "Jones"),
];

fn recognize(text: &str) -> Vec<CitationToken> {
    CITES
        .iter()
        .filter(|(full, ..)| text.contains(full))
        .map(|(full, base, plaintiff)| full_case(text, full, base).with_parties(plaintiff, Some("State")))
        .collect()
}

fn brief(table: &[&str], argument: &str) -> Vec<TextBlock> {
    let mut blocks = vec![
        TextBlock::new("TABLE OF AUTHORITIES", 250.0, 10.0, 1),
        TextBlock::new("Cases", 72.0, 20.0, 1),
    ];
    for (i, line) in table.iter().enumerate() {
        blocks.push(TextBlock::new(*line, 72.0, 30.0 + 10.0 * i as f64, 1));
    }
    blocks.push(TextBlock::new("Statutes", 72.0, 100.0, 1));
    blocks.push(TextBlock::new("Tex. Penal Code § 22.01 ........ 4", 72.0, 110.0, 1));
    blocks.push(TextBlock::new("ARGUMENT", 250.0, 10.0, 2));
    blocks.push(TextBlock::new(argument, 72.0, 20.0, 2));
    blocks
}

const ARGUMENT: &str = "The trial court erred in admitting the statement. \
                        See Roderick Smith v. State, 123 S.W.3d 456, 460 (Tex. 2004). \
                        The error was harmful to the defense. \
                        Jones v. State, 50 S.W.3d 7, 9 (Tex. 2001).";

#[test]
fn table_and_argument_disagree() {
    let blocks = brief(
        &[
            "Smith v. State, 123 S.W.3d 456 (Tex. 2004) ........ 3",
            "Brown v. State, 80 S.W.3d 10 (Tex. 2002) ........ 4",
        ],
        ARGUMENT,
    );
    let analysis = Pipeline::new(&recognize).run_on_document(&blocks).unwrap();
    let summary = &analysis.summary;

    assert_eq!(summary.toa_cases, vec!["Brown v. State", "Smith v. State"]);
    assert_eq!(summary.cases_match, Some(false));
    assert_eq!(summary.toa_only, vec!["Brown v. State"]);
    assert_eq!(summary.argument_only, vec!["Jones v. State"]);
    assert!(analysis
        .to_string()
        .lines()
        .next()
        .unwrap()
        .ends_with("(table of authorities differs)"));
}

#[test]
fn table_matches_after_name_normalization() {
    let blocks = brief(
        &[
            "Jones v. State, 50 S.W.3d 7, 9 (Tex. 2001) ........ 5",
            "Smith v. State, 123 S.W.3d 456 (Tex. 2004) ........ 3",
        ],
        ARGUMENT,
    );
    let analysis = Pipeline::new(&recognize).run_on_document(&blocks).unwrap();

    assert_eq!(
        analysis.cited_cases(),
        vec!["Jones v. State", "Roderick Smith v. State"]
    );
    assert_eq!(analysis.summary.cases_match, Some(true));
    assert!(analysis.summary.toa_only.is_empty());
    assert!(analysis.summary.argument_only.is_empty());
}

#[test]
fn no_table_leaves_the_check_unset() {
    let blocks = vec![
        TextBlock::new("ARGUMENT", 250.0, 10.0, 1),
        TextBlock::new(ARGUMENT, 72.0, 20.0, 1),
    ];
    let analysis = Pipeline::new(&recognize).run_on_document(&blocks).unwrap();

    assert_eq!(analysis.summary.cases_match, None);
    assert!(analysis.summary.toa_cases.is_empty());
    assert!(!analysis.to_string().contains("table of authorities"));
}

#[test]
fn statutes_are_outside_the_case_list() {
    let blocks = brief(&["Smith v. State, 123 S.W.3d 456 (Tex. 2004) ........ 3"], ARGUMENT);
    let table = locate_authorities(&blocks, &PipelineConfig::default()).unwrap();

    assert_eq!(table.heading, "TABLE OF AUTHORITIES");
    assert!(table.blocks.iter().all(|b| !b.content.contains("Penal Code")));
    assert_eq!(table.blocks.len(), 2);
}
