/// Every failure the pipeline can surface. Nothing is retried; the operator
/// fixes the cause (expired session, service outage, bad input) and re-runs.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("Upstream returned HTTP {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Malformed sleep record: {0}")]
    MalformedRecord(String),

    #[error("Request to upstream failed: {0}")]
    Transport(String),

    #[error("Authentication context error: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Transport(err.to_string())
    }
}
