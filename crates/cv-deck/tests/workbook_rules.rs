mod common;

use common::{output_dir, pptx_template, run_stamp, write_inputs, xlsx_workbook, CV_TEXT};
use cv_deck::instructions::{InstructionSource, RuleKind, RuleTable, WorkbookInstructionSource};
use cv_deck::pipeline::CvAutomation;
use cv_deck::slides::{PptxDocument, SlideDocument};
use cv_deck::trace::FixedClock;
use serde_json::Value;

const HEADER: &[&str] = &["Section", "Field", "Rule", "Value"];

#[test]
fn workbook_rows_become_rules_in_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("rules.xlsx");
    std::fs::write(
        &path,
        xlsx_workbook(&[
            HEADER,
            &["summary", "body", "copy", ""],
            &["skills", "skills", "truncate", "40"],
            &["", "", "", ""],
            &["experience", "history", "bullet list", ""],
        ]),
    )
    .expect("write workbook");

    let rows = WorkbookInstructionSource
        .read_rows(&path)
        .expect("workbook reads");
    let table = RuleTable::from_rows(&path, rows, run_stamp());

    assert_eq!(table.len(), 3, "blank row is dropped");
    let rules = table.rules();
    assert_eq!(rules[0].section, "summary");
    assert_eq!(rules[0].value, "", "missing Value cell reads as empty");
    assert_eq!(rules[1].value, "40");
    assert_eq!(rules[1].kind(), RuleKind::TruncateTo(40));
    assert_eq!(rules[2].field, "history");
    assert_eq!(rules[2].kind(), RuleKind::BulletList);
    assert_eq!(table.raw_rows()[1].get("Rule").map(String::as_str), Some("truncate"));
}

#[test]
fn header_only_workbook_yields_no_rules() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("rules.xlsx");
    std::fs::write(&path, xlsx_workbook(&[HEADER])).expect("write workbook");

    let rows = WorkbookInstructionSource
        .read_rows(&path)
        .expect("workbook reads");
    assert!(rows.is_empty());
}

#[test]
fn filesystem_collaborators_run_end_to_end() {
    let dir = tempfile::tempdir().expect("tempdir");
    let inputs = write_inputs(dir.path(), &pptx_template(7), None);
    std::fs::write(
        &inputs.instructions,
        xlsx_workbook(&[
            HEADER,
            &["summary", "body", "copy", ""],
            &["summary", "title", "truncate", "11"],
        ]),
    )
    .expect("write workbook");
    output_dir(&inputs);

    let artifacts = CvAutomation::with_clock(inputs, FixedClock(run_stamp()))
        .run()
        .expect("run succeeds");

    let document = PptxDocument::open(&artifacts.presentation).expect("output reopens");
    assert_eq!(document.slide_count(), 1);
    let xml = document.slide_xml(0).expect("slide xml");
    assert!(xml.contains("<a:t>Experienced</a:t>"));
    assert!(xml.contains(&format!("<a:t>{CV_TEXT}</a:t>")));
    assert!(!xml.contains("<a:t>CV Summary</a:t>"));

    let report: Value = serde_json::from_str(
        &std::fs::read_to_string(&artifacts.traceability_report).expect("report written"),
    )
    .expect("report is json");
    assert_eq!(report["summary"]["instruction_rules"], 2);
    assert_eq!(report["summary"]["total_steps"], 3);
}
