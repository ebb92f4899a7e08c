#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Sheet not found (404): {0}")]
    NotFound(String),
    #[error("Server error (5xx): {0}")]
    ServerError(String),
    #[error("Unexpected HTTP status {status} for sheet {sheet}")]
    Status { status: u16, sheet: String },
    #[error("Failed to decode sheet rows: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    /// Worth retrying: transport failures and 5xx responses
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Request(_) | FetchError::ServerError(_))
    }
}
