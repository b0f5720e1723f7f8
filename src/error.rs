use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoinedError {
    /// The remote chat session could not be established (missing key, bad endpoint).
    #[error("Session initialization failed: {0}")]
    SessionInit(String),

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

}

impl CoinedError {
    /// True for failures of a round trip to the chat service.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            CoinedError::ApiError { .. }
                | CoinedError::NetworkError(_)
                | CoinedError::Timeout(_)
                | CoinedError::MalformedResponse(_)
        )
    }
}

impl From<anyhow::Error> for CoinedError {
    fn from(err: anyhow::Error) -> Self {
        CoinedError::ConfigError(format!("{:#}", err))
    }
}

pub type Result<T> = std::result::Result<T, CoinedError>;
