use std::collections::BTreeMap;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use super::normalizer::normalize_key;
use super::InstructionFormatError;

/// One spreadsheet row keyed by its trimmed column header.
pub type InstructionRow = BTreeMap<String, String>;

pub(crate) fn read_workbook(path: &Path) -> Result<Vec<InstructionRow>, InstructionFormatError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|source| InstructionFormatError::Workbook {
            path: path.to_path_buf(),
            source,
        })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| InstructionFormatError::MissingWorksheet {
            path: path.to_path_buf(),
        })?
        .map_err(|source| InstructionFormatError::Workbook {
            path: path.to_path_buf(),
            source,
        })?;

    let grid = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    Ok(rows_from_grid(grid))
}

/// Splits a grid into header + records. Fully blank rows are dropped; short
/// rows leave the trailing columns absent.
pub(crate) fn rows_from_grid(grid: Vec<Vec<String>>) -> Vec<InstructionRow> {
    let mut lines = grid.into_iter();
    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let header: Vec<String> = header.iter().map(|cell| clean_header(cell)).collect();

    lines
        .filter(|cells| cells.iter().any(|cell| !cell.trim().is_empty()))
        .map(|cells| {
            header
                .iter()
                .zip(cells)
                .filter(|(name, _)| !name.is_empty())
                .map(|(name, cell)| (name.clone(), cell.trim().to_string()))
                .collect()
        })
        .collect()
}

fn clean_header(cell: &str) -> String {
    let normalized = normalize_key(cell);
    let mut chars = normalized.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => value.clone(),
        Data::Float(value) if value.is_finite() && value.fract() == 0.0 => {
            format!("{}", *value as i64)
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
pub(crate) fn cell_to_string_for_tests(cell: &Data) -> String {
    cell_to_string(cell)
}
