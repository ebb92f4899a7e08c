// Component-Ratio Fallback
//
// When no row passes as a direct gross margin, recompute it as
// gross profit / revenue for the latest period both rows report.
// Periods are matched on exact canonical date only.
use chrono::NaiveDate;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::debug;

use crate::extract::period_points;
use crate::parsing::numeric::parse_cell;
use crate::parsing::period::period_date;
use crate::table::{DataPoint, MarginPoint, Row};

static REVENUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:revenue|sales)").expect("valid revenue regex"));

// Growth rates, per-share and trailing figures, cost lines
static REVENUE_EXCLUDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:growth|per[\s\-]*share|/\s*share|ttm|cost\s+of)")
        .expect("valid revenue exclusion regex")
});

static GROSS_PROFIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)gross\s+profit").expect("valid gross profit regex"));

static GROSS_PROFIT_EXCLUDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:margin|marge|percent|%|ratio|ttm)")
        .expect("valid gross profit exclusion regex")
});

/// Gross margin from the revenue and gross profit rows, if both exist and
/// share a dated period with revenue > 0 and gross profit >= 0
pub fn component_ratio_margin(rows: &[Row]) -> Option<MarginPoint> {
    let revenue_row = find_row(rows, &REVENUE_RE, &REVENUE_EXCLUDE_RE)?;
    let gross_profit_row = find_row(rows, &GROSS_PROFIT_RE, &GROSS_PROFIT_EXCLUDE_RE)?;

    let revenue = dated_points(revenue_row);
    let gross_profit = dated_points(gross_profit_row);

    let (date, gp_point) = gross_profit
        .iter()
        .rev()
        .find(|(date, _)| revenue.contains_key(*date))?;
    let revenue_value = revenue.get(date)?.value;

    debug!(
        "Component ratio at {}: gross profit {} / revenue {}",
        date, gp_point.value, revenue_value
    );

    if revenue_value <= 0.0 || gp_point.value < 0.0 {
        return None;
    }

    let margin = 100.0 * gp_point.value / revenue_value;
    margin
        .is_finite()
        .then(|| MarginPoint::new(gp_point.period.clone(), margin))
}

fn find_row<'a>(rows: &'a [Row], include: &Regex, exclude: &Regex) -> Option<&'a Row> {
    rows.iter().find(|row| {
        row.metric_name()
            .is_some_and(|name| include.is_match(name) && !exclude.is_match(name))
    })
}

/// Period-gated values keyed by canonical date; a repeated date keeps the later column
fn dated_points(row: &Row) -> BTreeMap<NaiveDate, DataPoint> {
    period_points(row, parse_cell)
        .into_iter()
        .filter_map(|point| period_date(&point.period).map(|date| (date, point)))
        .collect()
}
