use sheet_metrics::table::{rows_from_json, Table};

/// Provider-shaped sheet for AAPL: newest column first, revenue on row 3,
/// a meta row of 100s and a decimal-comma gross margin row.
pub const AAPL_SHEET: &str = r#"[
  {"Metric": "Shares Outstanding (B)", "Q4 2025": "14.9", "Q3 2025": "15.0", "Q2 2025": "15.1", "Q1 2025": "15.2", "Q4 2024": "15.3", "Q3 2024": "15.4", "Q2 2024": "15.5", "Q1 2024": "15.6"},
  {"Metric": "Last quarter reporting companies", "Q4 2025": 100, "Q3 2025": 100, "Q2 2025": 100, "Q1 2025": 100, "Q4 2024": 100, "Q3 2024": 100, "Q2 2024": 100, "Q1 2024": 100},
  {"Metric": "Gross Profit", "Q4 2025": "103,400", "Q3 2025": "77,550", "Q2 2025": "61,380", "Q1 2025": "51,700", "Q4 2024": "94,000", "Q3 2024": "70,500", "Q2 2024": "56,400", "Q1 2024": "47,000"},
  {"Metric": "Revenue", "Q4 2025": "220,000", "Q3 2025": "165,000", "Q2 2025": "132,000", "Q1 2025": "110,000", "Q4 2024": "200,000", "Q3 2024": "150,000", "Q2 2024": "120,000", "Q1 2024": "100,000"},
  {"Metric": "Net Income", "Q4 2025": "36,000", "Q3 2025": "30,000", "Q2 2025": "28,000", "Q1 2025": "26,000", "Q4 2024": "33,000", "Q3 2024": "27,000", "Q2 2024": "25,000", "Q1 2024": "24,000"},
  {"Metric": "Gross Margin %", "Notes": "restated", "Q4 2025": "46,9%", "Q3 2025": "47.0%", "Q2 2025": "46.5%", "Q1 2025": "47.0%", "Q4 2024": "47.0%", "Q3 2024": "47.0%", "Q2 2024": "47.0%", "Q1 2024": "47.0%"}
]"#;

pub fn aapl_table() -> Table {
    rows_from_json(AAPL_SHEET).expect("fixture sheet is valid JSON")
}

pub fn table(json: &str) -> Table {
    rows_from_json(json).expect("test table is valid JSON")
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
