use serde::Serialize;
use tracing::{debug, instrument};

use crate::metrics::{compute_yoy_last4, ttm_sum, DEFAULT_TTM_DIVISOR};
use crate::selection::{latest_gross_margin, net_income_series, revenue_series, RevenueRowMap};
use crate::table::{DataPoint, MarginPoint, Row};

/// Knobs for building a report
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub revenue_rows: RevenueRowMap,
    pub ttm_divisor: f64,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            revenue_rows: RevenueRowMap::default(),
            ttm_divisor: DEFAULT_TTM_DIVISOR,
        }
    }
}

/// Everything derived from one symbol's sheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolReport {
    pub symbol: String,
    pub revenue: Vec<DataPoint>,
    pub net_income: Vec<DataPoint>,
    pub gross_margin: MarginPoint,
    pub revenue_ttm: f64,
    pub net_income_ttm: f64,
    /// YoY % for the last four revenue periods, oldest first
    pub revenue_yoy: [Option<f64>; 4],
}

impl SymbolReport {
    #[instrument(skip(rows, options), fields(rows = rows.len()))]
    pub fn build(symbol: &str, rows: &[Row], options: &ReportOptions) -> Self {
        let revenue = revenue_series(rows, symbol, &options.revenue_rows);
        let net_income = net_income_series(rows);
        let gross_margin = latest_gross_margin(rows);

        let revenue_values: Vec<f64> = revenue.iter().map(|p| p.value).collect();
        let report = Self {
            symbol: symbol.to_string(),
            revenue_ttm: ttm_sum(&revenue, options.ttm_divisor),
            net_income_ttm: ttm_sum(&net_income, options.ttm_divisor),
            revenue_yoy: compute_yoy_last4(&revenue_values),
            revenue,
            net_income,
            gross_margin,
        };

        debug!(
            "Built report for {}: {} revenue points, {} net income points, margin {:?}",
            symbol,
            report.revenue.len(),
            report.net_income.len(),
            report.gross_margin
        );
        report
    }
}
