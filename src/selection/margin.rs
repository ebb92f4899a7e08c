/// Margin Row Scorer
///
/// Sheets carry several rows that look like a gross margin: the real one, TTM
/// variants, flag rows that are 100 everywhere, meta rows about report coverage.
/// Each row gets a score from its label and from the distribution of its
/// period values; the best row above the threshold supplies the latest margin.
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::debug;

use crate::extract::period_points;
use crate::parsing::numeric::parse_percent;
use crate::parsing::period::period_date;
use crate::parsing::period_key::is_latest_marker;
use crate::selection::component_ratio::component_ratio_margin;
use crate::table::{DataPoint, MarginPoint, Row};

/// Minimum score for a row to be trusted as the margin series
pub const ACCEPT_THRESHOLD: i32 = 1;

const LABEL_MATCH_BONUS: i32 = 3;
const NOT_SUSPICIOUS_BONUS: i32 = 2;
const NO_VALUES_PENALTY: i32 = -5;
const SATURATED_PENALTY: i32 = -6;
const MOSTLY_ZERO_PENALTY: i32 = -2;
const PLAUSIBLE_MEDIAN_BONUS: i32 = 2;

static GROSS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)gross").expect("valid gross regex"));

static MARGIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:profit\s+margin|margin|marge)").expect("valid margin regex")
});

static PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:%|percent|ratio)").expect("valid percent regex"));

// Meta rows describing the sheet rather than the company
static SUSPICIOUS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:last\s+quarter\s+reporting|availability|coverage|disclosure|companies)")
        .expect("valid suspicious label regex")
});

/// Why a row scored the way it did
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreDiagnostics {
    pub label_match: bool,
    pub suspicious_label: bool,
    pub value_count: usize,
    pub ratio_100: f64,
    pub ratio_0: f64,
    pub median: Option<f64>,
}

/// A scored candidate row
#[derive(Debug, Clone)]
pub struct RowScore<'a> {
    /// Position of the row in the table
    pub index: usize,
    pub row: &'a Row,
    pub score: i32,
    pub diagnostics: ScoreDiagnostics,
}

impl RowScore<'_> {
    pub fn is_accepted(&self) -> bool {
        self.score >= ACCEPT_THRESHOLD
    }
}

/// Score a single row from its label and period values
pub fn score_row(row: &Row) -> (i32, ScoreDiagnostics) {
    let name = row.metric_name().unwrap_or_default();
    let label_match =
        GROSS_RE.is_match(name) && MARGIN_RE.is_match(name) && PERCENT_RE.is_match(name);
    let suspicious_label = SUSPICIOUS_RE.is_match(name);

    let values: Vec<f64> = period_points(row, parse_percent)
        .into_iter()
        .map(|p| p.value)
        .collect();

    let mut score = 0;
    if label_match {
        score += LABEL_MATCH_BONUS;
    }
    if !suspicious_label {
        score += NOT_SUSPICIOUS_BONUS;
    }

    let mut diagnostics = ScoreDiagnostics {
        label_match,
        suspicious_label,
        value_count: values.len(),
        ratio_100: 0.0,
        ratio_0: 0.0,
        median: None,
    };

    if values.is_empty() {
        return (score + NO_VALUES_PENALTY, diagnostics);
    }

    let count = values.len() as f64;
    diagnostics.ratio_100 = values.iter().filter(|v| **v == 100.0).count() as f64 / count;
    diagnostics.ratio_0 = values.iter().filter(|v| **v == 0.0).count() as f64 / count;
    diagnostics.median = median(&values);

    if diagnostics.ratio_100 > 0.5 {
        score += SATURATED_PENALTY;
    }
    if diagnostics.ratio_0 > 0.5 {
        score += MOSTLY_ZERO_PENALTY;
    }
    if diagnostics
        .median
        .is_some_and(|mid| (10.0..=90.0).contains(&mid))
    {
        score += PLAUSIBLE_MEDIAN_BONUS;
    }

    (score, diagnostics)
}

/// Score every row, best first; equal scores keep table order
pub fn rank_margin_rows(rows: &[Row]) -> Vec<RowScore<'_>> {
    let mut ranked: Vec<RowScore> = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let (score, diagnostics) = score_row(row);
            RowScore {
                index,
                row,
                score,
                diagnostics,
            }
        })
        .collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

/// Latest gross margin for a table
///
/// Direct margin row first, then the revenue/gross-profit ratio, then the
/// explicit no-data point. Never fails.
pub fn latest_gross_margin(rows: &[Row]) -> MarginPoint {
    if let Some(point) = direct_margin(rows) {
        return point;
    }
    if let Some(point) = component_ratio_margin(rows) {
        debug!("Gross margin derived from revenue and gross profit: {:?}", point);
        return point;
    }
    debug!("No gross margin available");
    MarginPoint::no_data()
}

fn direct_margin(rows: &[Row]) -> Option<MarginPoint> {
    let ranked = rank_margin_rows(rows);
    let best = ranked.first()?;
    debug!(
        "Best margin row {} ({:?}) scored {}: {:?}",
        best.index,
        best.row.metric_name(),
        best.score,
        best.diagnostics
    );

    if !best.is_accepted() {
        debug!("Best margin row below threshold {}", ACCEPT_THRESHOLD);
        return None;
    }

    let points = period_points(best.row, parse_percent);
    let latest = latest_point(&points)?;
    if latest.value == 100.0 {
        debug!("Latest margin value at {} is exactly 100, rejecting", latest.period);
        return None;
    }

    Some(MarginPoint::new(latest.period.clone(), latest.value))
}

/// Explicit latest marker, else latest date (later column on ties), else last column
pub fn latest_point(points: &[DataPoint]) -> Option<&DataPoint> {
    if let Some(marked) = points.iter().rev().find(|p| is_latest_marker(&p.period)) {
        return Some(marked);
    }

    points
        .iter()
        .enumerate()
        .filter_map(|(i, p)| period_date(&p.period).map(|date| (date, i, p)))
        .max_by_key(|(date, i, _)| (*date, *i))
        .map(|(_, _, p)| p)
        .or_else(|| points.last())
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labelled(name: &str, cells: &[(&str, &str)]) -> Row {
        cells
            .iter()
            .fold(Row::new().with_cell("Metric", name), |row, (label, value)| {
                row.with_cell(*label, *value)
            })
    }

    #[test]
    fn test_score_real_margin_row() {
        let row = labelled(
            "Gross Margin %",
            &[("Q1 2025", "46,6%"), ("Q2 2025", "46,5%"), ("Q3 2025", "47,0%")],
        );
        let (score, diag) = score_row(&row);
        assert!(diag.label_match);
        assert!(!diag.suspicious_label);
        assert_eq!(diag.value_count, 3);
        assert_eq!(diag.median, Some(46.6));
        assert_eq!(score, 3 + 2 + 2);
    }

    #[test]
    fn test_score_saturated_flag_row() {
        let row = labelled(
            "Gross margin % last quarter reporting companies",
            &[("Q1 2025", "100"), ("Q2 2025", "100"), ("Q3 2025", "100"), ("Q4 2025", "1")],
        );
        let (score, diag) = score_row(&row);
        assert!(diag.suspicious_label);
        assert_eq!(diag.ratio_100, 1.0);
        assert_eq!(score, 3 - 6);
    }

    #[test]
    fn test_score_row_without_period_values() {
        let row = labelled("Gross margin %", &[("Notes", "45"), ("Flag", "yes")]);
        let (score, diag) = score_row(&row);
        assert_eq!(diag.value_count, 0);
        assert_eq!(diag.median, None);
        assert_eq!(score, 3 + 2 - 5);
    }

    #[test]
    fn test_score_mostly_zero_row() {
        let row = labelled("Other", &[("Q1 2025", "0"), ("Q2 2025", "0"), ("Q3 2025", "5")]);
        let (score, diag) = score_row(&row);
        assert!((diag.ratio_0 - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(score, 2 - 2);
    }

    #[test]
    fn test_rank_is_descending_and_stable() {
        let rows = vec![
            labelled("Revenue", &[("Q1 2025", "195,359")]),
            labelled("Gross margin %", &[("Q1 2025", "46.6")]),
            labelled("Cost", &[("Q1 2025", "150,000")]),
        ];
        let ranked = rank_margin_rows(&rows);
        let order: Vec<usize> = ranked.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![1, 0, 2]);
        assert_eq!(ranked[0].score, 7);
        assert_eq!(ranked[1].score, ranked[2].score);
    }

    #[test]
    fn test_latest_point_prefers_marker() {
        let points = vec![
            DataPoint::new("Q3 2025", 47.0),
            DataPoint::new("LQ", 46.0),
            DataPoint::new("Q1 2025", 45.0),
        ];
        assert_eq!(latest_point(&points).map(|p| p.value), Some(46.0));
    }

    #[test]
    fn test_latest_point_by_date_ties_take_later_column() {
        let points = vec![
            DataPoint::new("Q2 2025", 47.0),
            DataPoint::new("Q1 2025", 45.0),
            DataPoint::new("Apr 25", 48.0),
        ];
        assert_eq!(latest_point(&points).map(|p| p.value), Some(48.0));
    }

    #[test]
    fn test_latest_point_undated_uses_last_column() {
        let points = vec![DataPoint::new("Jan 2030x", 1.0), DataPoint::new("TTM", 2.0)];
        assert_eq!(latest_point(&points).map(|p| p.value), Some(2.0));
        assert_eq!(latest_point(&[]), None);
    }

    #[test]
    fn test_latest_gross_margin_direct() {
        let rows = vec![
            labelled("Revenue", &[("Q1 2025", "95,359"), ("Q2 2025", "94,036")]),
            labelled("Gross margin %", &[("Q2 2025", "0.465"), ("Q1 2025", "0.47")]),
        ];
        let point = latest_gross_margin(&rows);
        assert_eq!(point.period(), "Q2 2025");
        assert!((point.value() - 46.5).abs() < 1e-9);
    }

    #[test]
    fn test_latest_value_of_100_is_rejected() {
        let rows = vec![labelled(
            "Gross margin %",
            &[("Q1 2025", "40"), ("Q2 2025", "45"), ("Q3 2025", "100")],
        )];
        assert_eq!(latest_gross_margin(&rows), MarginPoint::no_data());
    }

    #[test]
    fn test_all_100_row_never_selected() {
        let rows = vec![
            labelled(
                "Gross margin %",
                &[("Q1 2025", "100"), ("Q2 2025", "100"), ("Q3 2025", "100"), ("Q4 2025", "100")],
            ),
            labelled("Revenue", &[("Q4 2025", "1000")]),
            labelled("Gross profit", &[("Q4 2025", "400")]),
        ];
        let point = latest_gross_margin(&rows);
        assert_eq!(point, MarginPoint::new("Q4 2025", 40.0));
    }

    #[test]
    fn test_empty_table_returns_sentinel() {
        assert_eq!(latest_gross_margin(&[]), MarginPoint::no_data());
    }
}
