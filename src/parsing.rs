// Parsing primitives shared by every selector
//
// - numeric: locale tolerant numbers and percentages ("1.234,56", "45 %")
// - period: period labels to calendar dates ("Q2 2025", "12 Mai 24", "Jun 25")
// - period_key: which column labels are reporting periods at all

pub mod numeric;
pub mod period;
pub mod period_key;

pub use numeric::{parse_cell, parse_number, parse_percent, to_percent};
pub use period::{period_date, quarter_label, sort_by_period};
pub use period_key::{is_latest_marker, is_metric_key, is_period_key};
