use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while building an orchestrator client
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Configuration rejected by validation
    #[error("Configuration error: {0}")]
    Config(String),
    /// The underlying HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Why a single attempt against one model failed
///
/// Attempt failures never cross the `complete` boundary as errors; the
/// orchestrator folds them into the fallback walk and finally into a
/// failed `CompletionResult`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AttemptError {
    /// Estimated cost would breach the daily or monthly ceiling
    #[error("Budget limit exceeded")]
    BudgetExceeded,
    /// The request did not complete within the configured deadline
    #[error("Request timeout")]
    Timeout,
    /// Non-2xx response from the provider
    #[error("API Error: {message}")]
    Http { status: StatusCode, message: String },
    /// Model id is not present in the catalog
    #[error("Unexpected error: unknown model '{0}'")]
    UnknownModel(String),
    /// Anything else: connection reset, malformed body, ...
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl AttemptError {
    /// Stable label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BudgetExceeded => "budget_exceeded",
            Self::Timeout => "timeout",
            Self::Http { .. } => "http_error",
            Self::UnknownModel(_) | Self::Unexpected(_) => "unexpected_exception",
        }
    }
}

// reqwest surfaces its own deadline as an error; everything else is unexpected
impl From<reqwest::Error> for AttemptError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Unexpected(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AttemptError {
    fn from(err: serde_json::Error) -> Self {
        Self::Unexpected(format!("invalid response body: {}", err))
    }
}
