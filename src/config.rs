use std::env;

use crate::metrics::DEFAULT_TTM_DIVISOR;
use crate::report::ReportOptions;
use crate::selection::RevenueRowMap;

const DEFAULT_SYMBOLS: &str = "AAPL,META,AMZN,GOOG,MSFT,NVDA,TSLA";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the sheet provider; only needed for remote fetches
    pub sheet_api_url: Option<String>,
    pub symbols: Vec<String>,
    pub revenue_rows: RevenueRowMap,
    pub ttm_divisor: f64,
    pub fetch_concurrency: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            sheet_api_url: env::var("SHEET_API_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            symbols: parse_symbols(
                &env::var("SYMBOLS").unwrap_or_else(|_| DEFAULT_SYMBOLS.to_string()),
            ),
            revenue_rows: RevenueRowMap::default()
                .with_overrides(&env::var("REVENUE_ROW_OVERRIDES").unwrap_or_default()),
            ttm_divisor: env::var("TTM_DIVISOR")
                .unwrap_or_else(|_| DEFAULT_TTM_DIVISOR.to_string())
                .parse()
                .unwrap_or(DEFAULT_TTM_DIVISOR),
            fetch_concurrency: env::var("FETCH_CONCURRENCY")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .unwrap_or(4),
        }
    }

    /// Provider URL, or `NotPresent` when remote fetching is not configured
    pub fn require_sheet_api_url(&self) -> Result<&str, env::VarError> {
        self.sheet_api_url
            .as_deref()
            .ok_or(env::VarError::NotPresent)
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            revenue_rows: self.revenue_rows.clone(),
            ttm_divisor: self.ttm_divisor,
        }
    }
}

/// "aapl, msft,,NVDA" → ["AAPL", "MSFT", "NVDA"]
pub fn parse_symbols(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().trim_start_matches('$').to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_symbols() {
        assert_eq!(parse_symbols("aapl, msft,,$NVDA"), vec!["AAPL", "MSFT", "NVDA"]);
        assert!(parse_symbols("").is_empty());
    }
}
