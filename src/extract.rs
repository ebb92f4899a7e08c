// Row Field Extractor
//
// Turns one sheet row into (period, value) points. Two flavours are kept apart on
// purpose: the series selectors accept any numeric column, the margin scorer and
// the component-ratio fallback only read columns that classify as period keys.
use crate::parsing::numeric::parse_cell;
use crate::parsing::period_key::{is_metric_key, is_period_key};
use crate::table::{Cell, DataPoint, Row};

/// Every non-metric column with a numeric cell, in column order
pub fn numeric_points(row: &Row) -> Vec<DataPoint> {
    collect_points(row, |_| true, parse_cell)
}

/// Period-key columns only, parsed with `parse` (plain number or percentage)
pub fn period_points<F>(row: &Row, parse: F) -> Vec<DataPoint>
where
    F: Fn(&Cell) -> Option<f64>,
{
    collect_points(row, is_period_key, parse)
}

fn collect_points<K, F>(row: &Row, keep_label: K, parse: F) -> Vec<DataPoint>
where
    K: Fn(&str) -> bool,
    F: Fn(&Cell) -> Option<f64>,
{
    row.cells()
        .filter_map(|(label, cell)| {
            let label = label.trim();
            if label.is_empty() || is_metric_key(label) || !keep_label(label) {
                return None;
            }
            let cell = cell.filter(|c| !c.is_blank())?;
            parse(cell).map(|value| DataPoint::new(label, value))
        })
        .collect()
}
