use std::env;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the strategy analysis backend.
    pub strategy_api_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            strategy_api_url: env::var("STRATEGY_API_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
        }
    }
}
