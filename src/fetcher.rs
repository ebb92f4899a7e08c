use backon::{ExponentialBuilder, Retryable};
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::fetch_error::FetchError;
use crate::table::{rows_from_json, Table};

const DEFAULT_MAX_RETRIES: usize = 2;

/// Client for the remote sheet provider
///
/// Each symbol lives on its own sheet named `$<SYMBOL>`; the provider answers
/// `GET <base_url>?sheet=$AAPL` with a JSON array of row objects.
#[derive(Clone)]
pub struct SheetFetcher {
    client: reqwest::Client,
    base_url: String,
    max_retries: usize,
}

impl SheetFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Retries after the first attempt for transient failures (0 disables retrying)
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// "aapl" → "$AAPL"
    pub fn sheet_name(symbol: &str) -> String {
        format!("${}", symbol.trim().trim_start_matches('$').to_uppercase())
    }

    #[instrument(skip(self), fields(url = %self.base_url))]
    pub async fn fetch_table(&self, symbol: &str) -> Result<Table, FetchError> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(200))
            .with_max_delay(Duration::from_secs(5))
            .with_max_times(self.max_retries);

        (|| self.fetch_once(symbol))
            .retry(backoff)
            .when(FetchError::is_transient)
            .notify(|err: &FetchError, delay: Duration| {
                warn!("Fetching sheet for {} failed ({}), retrying in {:?}", symbol, err, delay);
            })
            .await
    }

    /// Fetch several symbols, at most `concurrency` requests in flight.
    /// Results come back in input order; one failure does not affect the others.
    pub async fn fetch_all(
        &self,
        symbols: &[String],
        concurrency: usize,
    ) -> Vec<(String, Result<Table, FetchError>)> {
        info!("Fetching {} sheets", symbols.len());
        stream::iter(symbols.iter().cloned())
            .map(|symbol| async move {
                let result = self.fetch_table(&symbol).await;
                (symbol, result)
            })
            .buffered(concurrency.max(1))
            .collect()
            .await
    }

    async fn fetch_once(&self, symbol: &str) -> Result<Table, FetchError> {
        let sheet = Self::sheet_name(symbol);
        debug!("Requesting sheet {}", sheet);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("sheet", sheet.as_str())])
            .send()
            .await?;

        let status = response.status();
        debug!("Received HTTP response with status: {}", status);

        if status.as_u16() == 404 {
            return Err(FetchError::NotFound(format!("{sheet} not found on provider")));
        }
        if status.is_server_error() {
            return Err(FetchError::ServerError(format!(
                "Server error {status} while fetching {sheet}"
            )));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                sheet,
            });
        }

        let body = response.text().await?;
        debug!("Retrieved sheet {}, size: {} bytes", sheet, body.len());

        let rows = rows_from_json(&body)?;
        debug!("Decoded {} rows from {}", rows.len(), sheet);
        Ok(rows)
    }
}
