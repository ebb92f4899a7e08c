/// Worksheet import for locally exported financial sheets
///
/// Layout: the first row holds the column labels ("Metric", "Q1 2025", ...),
/// every following row is one metric line. Fully empty rows are skipped.
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::table::{Cell, Row, Table};

#[derive(Error, Debug)]
pub enum WorkbookError {
    #[error("Failed to open workbook: {0}")]
    WorkbookOpen(String),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("Workbook has no sheets")]
    NoSheets,

    #[error("Sheet has no header row")]
    MissingHeader,
}

/// Read `sheet_name` (or the first sheet) of an xlsx/xls/ods file into a table
///
/// calamine is synchronous; async callers should use `spawn_blocking`.
#[instrument(skip(path), fields(file = %path.as_ref().display()))]
pub fn read_sheet_table(
    path: impl AsRef<Path>,
    sheet_name: Option<&str>,
) -> Result<Table, WorkbookError> {
    let path = path.as_ref();
    info!("Reading workbook: {}", path.display());

    let mut workbook = match open_workbook_auto(path) {
        Ok(wb) => wb,
        Err(e) => return Err(WorkbookError::WorkbookOpen(e.to_string())),
    };

    let sheet = match sheet_name {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(WorkbookError::NoSheets)?,
    };

    let range = match workbook.worksheet_range(&sheet) {
        Ok(range) => range,
        Err(_) => return Err(WorkbookError::SheetNotFound(sheet)),
    };

    let rows = table_from_range(&range)?;
    info!("Read {} rows from sheet {}", rows.len(), sheet);
    Ok(rows)
}

/// Convert a worksheet range (header row + metric rows) into a table
pub fn table_from_range(range: &Range<Data>) -> Result<Table, WorkbookError> {
    let mut sheet_rows = range.rows();
    let header: Vec<String> = sheet_rows
        .next()
        .ok_or(WorkbookError::MissingHeader)?
        .iter()
        .map(header_label)
        .collect();

    if header.iter().all(|label| label.is_empty()) {
        return Err(WorkbookError::MissingHeader);
    }

    let mut rows = Vec::new();
    for (row_idx, cells) in sheet_rows.enumerate() {
        let mut row = Row::new();
        for (label, data) in header.iter().zip(cells) {
            if label.is_empty() {
                continue;
            }
            row.push(label.clone(), cell_value(data));
        }

        if row.cells().all(|(_, cell)| cell.is_none()) {
            debug!("Skipping empty sheet row {}", row_idx + 1);
            continue;
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Header cells become column labels; date headers are rendered as ISO dates
fn header_label(data: &Data) -> String {
    match data {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{f:.0}"),
        Data::Float(f) => f.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|chrono_dt| chrono_dt.date().format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| dt.as_f64().to_string()),
        Data::DateTimeIso(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

fn cell_value(data: &Data) -> Option<Cell> {
    match data {
        Data::String(s) if s.trim().is_empty() => None,
        Data::String(s) => Some(Cell::Text(s.trim().to_string())),
        Data::Float(f) => Some(Cell::Number(*f)),
        Data::Int(i) => Some(Cell::Number(*i as f64)),
        Data::Bool(b) => Some(Cell::Text(b.to_string())),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|chrono_dt| Cell::Text(chrono_dt.date().format("%Y-%m-%d").to_string())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(Cell::Text(s.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_range() -> Range<Data> {
        let mut range = Range::new((0, 0), (3, 3));
        range.set_value((0, 0), Data::String("Metric".to_string()));
        range.set_value((0, 1), Data::String(" Q1 2025 ".to_string()));
        range.set_value((0, 2), Data::String("Q2 2025".to_string()));
        range.set_value((0, 3), Data::Float(2024.0));

        range.set_value((1, 0), Data::String("Revenue".to_string()));
        range.set_value((1, 1), Data::Float(95359.0));
        range.set_value((1, 2), Data::String("94,036".to_string()));
        range.set_value((1, 3), Data::Int(391035));

        // row 2 left empty

        range.set_value((3, 0), Data::String("Gross margin %".to_string()));
        range.set_value((3, 1), Data::Float(0.466));
        range.set_value((3, 2), Data::String("  ".to_string()));
        range
    }

    #[test]
    fn test_table_from_range() {
        let rows = table_from_range(&sample_range()).unwrap();
        assert_eq!(rows.len(), 2);

        let revenue = &rows[0];
        assert_eq!(revenue.metric_name(), Some("Revenue"));
        assert_eq!(revenue.get("Q1 2025"), Some(&Cell::Number(95359.0)));
        assert_eq!(revenue.get("Q2 2025"), Some(&Cell::Text("94,036".to_string())));
        assert_eq!(revenue.get("2024"), Some(&Cell::Number(391035.0)));

        let margin = &rows[1];
        assert_eq!(margin.metric_name(), Some("Gross margin %"));
        assert_eq!(margin.get("Q2 2025"), None);
        assert_eq!(margin.get("2024"), None);
    }

    #[test]
    fn test_header_only_range() {
        let mut range = Range::new((0, 0), (0, 1));
        range.set_value((0, 0), Data::String("Metric".to_string()));
        range.set_value((0, 1), Data::String("Q1 2025".to_string()));
        assert!(table_from_range(&range).unwrap().is_empty());
    }

    #[test]
    fn test_missing_header() {
        let range: Range<Data> = Range::empty();
        assert!(matches!(
            table_from_range(&range),
            Err(WorkbookError::MissingHeader)
        ));
    }

    #[test]
    fn test_header_labels() {
        assert_eq!(header_label(&Data::Float(2024.0)), "2024");
        assert_eq!(header_label(&Data::Float(1.5)), "1.5");
        assert_eq!(header_label(&Data::Empty), "");
    }
}
