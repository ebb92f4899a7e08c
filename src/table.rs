// Sheet table model
//
// A table is the list of rows the sheet provider returns for one symbol. Each row
// maps column labels to human-entered cell text, in the order the columns appear.
// One reserved column ("metric", any case) names the financial line item.
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

use crate::parsing::period_key::is_metric_key;

/// Period shown when neither a margin row nor the component ratio yields a value
pub const NO_DATA_PERIOD: &str = "—";

/// One sheet as delivered by the provider
pub type Table = Vec<Row>;

/// Raw cell content
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn is_blank(&self) -> bool {
        matches!(self, Cell::Text(s) if s.trim().is_empty())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            Cell::Number(_) => None,
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

/// One metric line: column label → cell, order preserving
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, Option<Cell>)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by importers and tests: `Row::new().with_cell("Metric", "Revenue")`
    pub fn with_cell(mut self, label: impl Into<String>, value: impl Into<Cell>) -> Self {
        self.cells.push((label.into(), Some(value.into())));
        self
    }

    /// Append a column whose cell is absent (JSON `null`, empty worksheet cell)
    pub fn with_absent(mut self, label: impl Into<String>) -> Self {
        self.cells.push((label.into(), None));
        self
    }

    pub fn push(&mut self, label: impl Into<String>, value: Option<Cell>) {
        self.cells.push((label.into(), value));
    }

    /// Columns in their original order
    pub fn cells(&self) -> impl Iterator<Item = (&str, Option<&Cell>)> {
        self.cells
            .iter()
            .map(|(label, value)| (label.as_str(), value.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// First cell whose label matches exactly
    pub fn get(&self, label: &str) -> Option<&Cell> {
        self.cells
            .iter()
            .find(|(l, _)| l == label)
            .and_then(|(_, v)| v.as_ref())
    }

    /// Human readable line item name from the reserved metric column
    pub fn metric_name(&self) -> Option<&str> {
        self.cells
            .iter()
            .find(|(label, _)| is_metric_key(label))
            .and_then(|(_, value)| value.as_ref())
            .and_then(Cell::as_text)
            .map(str::trim)
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RowVisitor)
    }
}

struct RowVisitor;

impl<'de> Visitor<'de> for RowVisitor {
    type Value = Row;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a JSON object mapping column labels to cell values")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Row, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut row = Row::new();
        while let Some((label, value)) = map.next_entry::<String, JsonValue>()? {
            let cell = match value {
                JsonValue::Null => None,
                JsonValue::String(s) => Some(Cell::Text(s)),
                JsonValue::Number(n) => match n.as_f64() {
                    Some(f) => Some(Cell::Number(f)),
                    None => return Err(de::Error::custom(format!("number out of range: {n}"))),
                },
                JsonValue::Bool(b) => Some(Cell::Text(b.to_string())),
                other => Some(Cell::Text(other.to_string())),
            };
            row.push(label, cell);
        }
        Ok(row)
    }
}

/// Decode a provider payload (JSON array of row objects) into a table
pub fn rows_from_json(json: &str) -> Result<Table, serde_json::Error> {
    serde_json::from_str(json)
}

/// A single extracted value for one reporting period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Column label as it appeared in the sheet, trimmed
    pub period: String,
    pub value: f64,
}

impl DataPoint {
    pub fn new(period: impl Into<String>, value: f64) -> Self {
        Self {
            period: period.into(),
            value,
        }
    }
}

/// Latest gross margin in percent, always within 0..=100
///
/// Only built through `new` (clamps) or `no_data`; fields are read through getters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarginPoint {
    period: String,
    value: f64,
}

impl MarginPoint {
    pub fn new(period: impl Into<String>, value: f64) -> Self {
        let value = if value.is_finite() {
            value.clamp(0.0, 100.0)
        } else {
            0.0
        };
        Self {
            period: period.into(),
            value,
        }
    }

    /// Explicit "no data" result
    pub fn no_data() -> Self {
        Self {
            period: NO_DATA_PERIOD.to_string(),
            value: 0.0,
        }
    }

    pub fn period(&self) -> &str {
        &self.period
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_no_data(&self) -> bool {
        self.period == NO_DATA_PERIOD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_deserialize_preserves_column_order() {
        let json = r#"[{"Metric": "Revenue", "Q3 2024": "1,000", "Q1 2024": "900", "Q2 2024": null}]"#;
        let rows = rows_from_json(json).unwrap();
        assert_eq!(rows.len(), 1);

        let labels: Vec<&str> = rows[0].cells().map(|(label, _)| label).collect();
        assert_eq!(labels, vec!["Metric", "Q3 2024", "Q1 2024", "Q2 2024"]);
        assert_eq!(rows[0].get("Q2 2024"), None);
    }

    #[test]
    fn test_row_deserialize_numbers_and_bools() {
        let json = r#"[{"metric": "Gross margin %", "Jun 25": 45.5, "flag": true}]"#;
        let rows = rows_from_json(json).unwrap();
        assert_eq!(rows[0].get("Jun 25"), Some(&Cell::Number(45.5)));
        assert_eq!(rows[0].get("flag"), Some(&Cell::Text("true".to_string())));
    }

    #[test]
    fn test_metric_name_case_insensitive() {
        let row = Row::new().with_cell("METRIC", "  Net income ").with_cell("Q1 2025", "5");
        assert_eq!(row.metric_name(), Some("Net income"));
    }

    #[test]
    fn test_metric_name_missing() {
        let row = Row::new().with_cell("Q1 2025", "5");
        assert_eq!(row.metric_name(), None);
    }

    #[test]
    fn test_rows_from_json_rejects_non_array() {
        assert!(rows_from_json(r#"{"error": "sheet not found"}"#).is_err());
    }

    #[test]
    fn test_margin_point_clamps() {
        assert_eq!(MarginPoint::new("Q1 2025", 130.0).value(), 100.0);
        assert_eq!(MarginPoint::new("Q1 2025", -4.0).value(), 0.0);
        assert_eq!(MarginPoint::new("Q1 2025", f64::NAN).value(), 0.0);
        assert_eq!(MarginPoint::new("Q1 2025", 46.5).period(), "Q1 2025");
    }

    #[test]
    fn test_margin_point_serializes_clamped_fields() {
        let json = serde_json::to_value(MarginPoint::new("Q2 2025", 250.0)).unwrap();
        assert_eq!(json, serde_json::json!({"period": "Q2 2025", "value": 100.0}));
    }

    #[test]
    fn test_no_data_sentinel() {
        let point = MarginPoint::no_data();
        assert_eq!(point.period(), "—");
        assert_eq!(point.value(), 0.0);
        assert!(point.is_no_data());
    }
}
