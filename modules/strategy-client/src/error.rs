use thiserror::Error;

pub type Result<T> = std::result::Result<T, StrategyError>;

#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response. `message` is the backend's `detail` field when the
    /// error body parsed, else the per-stage default — already human-readable,
    /// so Display shows it alone.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for StrategyError {
    fn from(err: reqwest::Error) -> Self {
        StrategyError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for StrategyError {
    fn from(err: serde_json::Error) -> Self {
        StrategyError::Parse(err.to_string())
    }
}
