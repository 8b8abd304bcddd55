//! Analysis client error types.

use thiserror::Error;
use vsight_models::ReportError;

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Message shown when the service is overloaded.
pub const RATE_LIMITED_MESSAGE: &str =
    "Server Busy (Quota Exceeded). Please try again in a moment.";

/// Message shown when the service returned an unusable report.
pub const MALFORMED_MESSAGE: &str = "AI returned an empty report. Please retry.";

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The service could not be reached.
    #[error("Could not connect to Forensic Backend: {0}")]
    Transport(String),

    /// The service is rate limiting; the detail is kept for logs.
    #[error("{}", RATE_LIMITED_MESSAGE)]
    RateLimited(String),

    /// The service answered with a body missing required fields.
    #[error("{}", MALFORMED_MESSAGE)]
    MalformedResponse(String),

    /// Any other error reported by the service, passed through verbatim.
    #[error("{message}")]
    Remote { status: Option<u16>, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AnalysisError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Classify a non-success HTTP response.
    ///
    /// 429 and quota messages map to `RateLimited` even when a proxy in
    /// between rewrote the status code.
    pub fn from_http_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status == 429 || mentions_rate_limit(&message) {
            Self::RateLimited(message)
        } else {
            Self::Remote {
                status: Some(status),
                message,
            }
        }
    }

    /// True if re-running the analysis may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::RateLimited(_) | Self::MalformedResponse(_) => true,
            Self::Remote { status, .. } => status.map_or(true, |s| s >= 500),
            Self::Config(_) => false,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedResponse(_))
    }

    /// Text shown to the operator.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl From<ReportError> for AnalysisError {
    fn from(err: ReportError) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}

impl From<reqwest::Error> for AnalysisError {
    fn from(err: reqwest::Error) -> Self {
        // The Gemini endpoint carries the API key in its query string
        let err = err.without_url();
        match err.status() {
            Some(status) => Self::from_http_status(status.as_u16(), err.to_string()),
            None => Self::Transport(err.to_string()),
        }
    }
}

fn mentions_rate_limit(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("429") || lower.contains("quota") || lower.contains("resource_exhausted")
}
