//! Spreadsheet-driven mapping rules: which CV section lands in which slide
//! field, and how it is transformed on the way.

mod normalizer;
mod parser;
mod rules;

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Serialize;

pub(crate) use normalizer::normalize_key;
pub use parser::InstructionRow;
pub use rules::{RuleKind, BULLET};

pub const COLUMN_SECTION: &str = "Section";
pub const COLUMN_FIELD: &str = "Field";
pub const COLUMN_RULE: &str = "Rule";
pub const COLUMN_VALUE: &str = "Value";

#[derive(Debug, thiserror::Error)]
pub enum InstructionFormatError {
    #[error("unable to read instruction workbook {}: {source}", path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },
    #[error("instruction workbook {} has no worksheet", path.display())]
    MissingWorksheet { path: PathBuf },
}

/// One instruction row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingRule {
    pub section: String,
    pub field: String,
    pub rule: String,
    pub value: String,
}

impl MappingRule {
    pub fn new(
        section: impl Into<String>,
        field: impl Into<String>,
        rule: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            section: section.into(),
            field: field.into(),
            rule: rule.into(),
            value: value.into(),
        }
    }

    fn from_row(row: &InstructionRow) -> Self {
        let cell = |column: &str| row.get(column).cloned().unwrap_or_default();
        Self {
            section: cell(COLUMN_SECTION),
            field: cell(COLUMN_FIELD),
            rule: cell(COLUMN_RULE),
            value: cell(COLUMN_VALUE),
        }
    }

    pub fn kind(&self) -> RuleKind {
        RuleKind::parse(&self.rule, &self.value)
    }
}

/// Ordered rules plus the rows they were built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleTable {
    file_path: PathBuf,
    parsed_date: NaiveDateTime,
    rules: Vec<MappingRule>,
    raw_data: Vec<InstructionRow>,
}

impl RuleTable {
    /// Builds one rule per row, in row order. Absent columns become empty
    /// strings rather than errors.
    pub fn from_rows(
        file_path: impl Into<PathBuf>,
        rows: Vec<InstructionRow>,
        parsed_date: NaiveDateTime,
    ) -> Self {
        let rules = rows.iter().map(MappingRule::from_row).collect();
        Self {
            file_path: file_path.into(),
            parsed_date,
            rules,
            raw_data: rows,
        }
    }

    pub fn rules(&self) -> &[MappingRule] {
        &self.rules
    }

    pub fn raw_rows(&self) -> &[InstructionRow] {
        &self.raw_data
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Supplies instruction rows from a tabular source.
pub trait InstructionSource: Debug {
    fn read_rows(&self, path: &Path) -> Result<Vec<InstructionRow>, InstructionFormatError>;
}

/// Reads the first worksheet of an `.xlsx`/`.xls` workbook; the first row
/// holds the column headers.
#[derive(Debug, Default, Clone, Copy)]
pub struct WorkbookInstructionSource;

impl InstructionSource for WorkbookInstructionSource {
    fn read_rows(&self, path: &Path) -> Result<Vec<InstructionRow>, InstructionFormatError> {
        parser::read_workbook(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::Data;
    use chrono::NaiveDate;

    fn parsed_date() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 2, 1)
            .expect("valid date")
            .and_hms_opt(12, 0, 0)
            .expect("valid time")
    }

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn grid_rows_become_rules_in_order() {
        let rows = parser::rows_from_grid(grid(&[
            &["Section", "Field", "Rule", "Value"],
            &["summary", "body", "copy", ""],
            &["skills", "skills", "bullet-list", ""],
            &["experience", "body", "truncate", "80"],
        ]));
        let table = RuleTable::from_rows("rules.xlsx", rows, parsed_date());

        assert_eq!(table.len(), 3);
        assert_eq!(table.rules()[0], MappingRule::new("summary", "body", "copy", ""));
        assert_eq!(table.rules()[1].section, "skills");
        assert_eq!(table.rules()[2].kind(), RuleKind::TruncateTo(80));
    }

    #[test]
    fn missing_columns_default_to_empty() {
        let rows = parser::rows_from_grid(grid(&[
            &["Section", "Field", "Rule"],
            &["summary", "body", "copy"],
        ]));
        let table = RuleTable::from_rows("rules.xlsx", rows, parsed_date());
        assert_eq!(table.rules()[0].value, "");
    }

    #[test]
    fn short_rows_and_blank_rows_are_tolerated() {
        let rows = parser::rows_from_grid(grid(&[
            &["Section", "Field", "Rule", "Value"],
            &["summary", "title"],
            &["", "", "", ""],
            &["education", "body", "copy", "x"],
        ]));
        let table = RuleTable::from_rows("rules.xlsx", rows, parsed_date());
        assert_eq!(table.len(), 2);
        assert_eq!(table.rules()[0].rule, "");
        assert_eq!(table.rules()[0].kind(), RuleKind::Copy);
        assert_eq!(table.raw_rows()[1].get("Value").map(String::as_str), Some("x"));
    }

    #[test]
    fn headers_are_trimmed_and_case_folded() {
        let rows = parser::rows_from_grid(grid(&[
            &["\u{feff} section ", "FIELD", "rule", " Value"],
            &["summary", "body", "copy", "1"],
        ]));
        let rule = MappingRule::from_row(&rows[0]);
        assert_eq!(rule, MappingRule::new("summary", "body", "copy", "1"));
        assert_eq!(normalizer::normalize_for_tests("  A   B "), "a b");
    }

    #[test]
    fn empty_grid_yields_empty_table() {
        let table = RuleTable::from_rows("rules.xlsx", parser::rows_from_grid(Vec::new()), parsed_date());
        assert!(table.is_empty());
    }

    #[test]
    fn numeric_cells_render_without_fraction() {
        assert_eq!(parser::cell_to_string_for_tests(&Data::Float(200.0)), "200");
        assert_eq!(parser::cell_to_string_for_tests(&Data::Float(2.5)), "2.5");
        assert_eq!(parser::cell_to_string_for_tests(&Data::Empty), "");
        assert_eq!(
            parser::cell_to_string_for_tests(&Data::String("copy".into())),
            "copy"
        );
    }

    #[test]
    fn unreadable_workbook_is_an_instruction_format_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("rules.xlsx");
        std::fs::write(&path, b"not a zip archive").expect("write bogus workbook");

        match WorkbookInstructionSource.read_rows(&path) {
            Err(InstructionFormatError::Workbook { path: failed, .. }) => assert_eq!(failed, path),
            other => panic!("expected workbook error, got {other:?}"),
        }
    }
}
