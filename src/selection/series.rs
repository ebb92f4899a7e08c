/// Series Selectors for revenue and net income
///
/// The provider keeps revenue on a fixed row per ticker; net income is found by
/// its label. Both use the loose extractor (any numeric column) and return the
/// series sorted by period, oldest first.
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::extract::numeric_points;
use crate::parsing::period::sort_by_period;
use crate::table::{DataPoint, Row};

/// Row holding revenue for every ticker the provider currently serves
pub const DEFAULT_REVENUE_ROW: usize = 3;

/// Row used for tickers missing from the map
pub const UNKNOWN_SYMBOL_ROW: usize = 0;

const NET_INCOME_FALLBACK_ROW: usize = 3;

const KNOWN_SYMBOLS: &[&str] = &["AAPL", "META", "MSFT", "GOOG", "AMZN", "TSLA", "NVDA"];

static NET_INCOME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)net\s+(?:income|profit)").expect("valid net income regex"));

/// Per-symbol revenue row index
///
/// Couples output to the provider's row order, so it stays configuration:
/// `RevenueRowMap::default()` covers the known tickers, `with_symbol` and
/// `with_overrides` extend or replace entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevenueRowMap {
    fallback_index: usize,
    by_symbol: HashMap<String, usize>,
}

impl Default for RevenueRowMap {
    fn default() -> Self {
        KNOWN_SYMBOLS
            .iter()
            .fold(Self::empty(UNKNOWN_SYMBOL_ROW), |map, symbol| {
                map.with_symbol(symbol, DEFAULT_REVENUE_ROW)
            })
    }
}

impl RevenueRowMap {
    /// Map without any symbol entries
    pub fn empty(fallback_index: usize) -> Self {
        Self {
            fallback_index,
            by_symbol: HashMap::new(),
        }
    }

    pub fn with_symbol(mut self, symbol: &str, index: usize) -> Self {
        self.by_symbol.insert(normalize_symbol(symbol), index);
        self
    }

    /// Apply overrides in the form "AAPL=3,XYZ=5"; malformed entries are skipped
    pub fn with_overrides(self, overrides: &str) -> Self {
        overrides
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .fold(self, |map, entry| match entry.split_once('=') {
                Some((symbol, index)) if !symbol.trim().is_empty() => {
                    match index.trim().parse::<usize>() {
                        Ok(index) => map.with_symbol(symbol, index),
                        Err(_) => {
                            warn!("Ignoring revenue row override with bad index: {}", entry);
                            map
                        }
                    }
                }
                _ => {
                    warn!("Ignoring malformed revenue row override: {}", entry);
                    map
                }
            })
    }

    pub fn index_for(&self, symbol: &str) -> usize {
        self.by_symbol
            .get(&normalize_symbol(symbol))
            .copied()
            .unwrap_or(self.fallback_index)
    }
}

/// "$aapl" → "AAPL"; sheet names carry a leading `$`
fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().trim_start_matches('$').to_uppercase()
}

/// Revenue series for `symbol`, oldest period first
pub fn revenue_series(rows: &[Row], symbol: &str, row_map: &RevenueRowMap) -> Vec<DataPoint> {
    let index = row_map.index_for(symbol);
    let Some(row) = rows.get(index).or_else(|| rows.first()) else {
        return Vec::new();
    };

    debug!(
        "Revenue for {} from row {} ({:?})",
        symbol,
        if rows.get(index).is_some() { index } else { 0 },
        row.metric_name()
    );
    sorted_points(row)
}

/// Net income series: first row labelled "net income"/"net profit", else row 3, else row 0
pub fn net_income_series(rows: &[Row]) -> Vec<DataPoint> {
    let row = rows
        .iter()
        .find(|row| row.metric_name().is_some_and(|name| NET_INCOME_RE.is_match(name)))
        .or_else(|| rows.get(NET_INCOME_FALLBACK_ROW))
        .or_else(|| rows.first());

    match row {
        Some(row) => {
            debug!("Net income from row {:?}", row.metric_name());
            sorted_points(row)
        }
        None => Vec::new(),
    }
}

fn sorted_points(row: &Row) -> Vec<DataPoint> {
    let mut points = numeric_points(row);
    sort_by_period(&mut points);
    points
}
