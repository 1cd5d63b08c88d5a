use chrono::NaiveDate;
use thiserror::Error;

/// Top-level error for client and analyzer calls.
#[derive(Debug, Error)]
pub enum UsageError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl UsageError {
    /// True when the caller can recover by correcting their input.
    pub fn is_validation(&self) -> bool {
        matches!(self, UsageError::Validation(_))
    }
}

/// Input rejected before any request is issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid date: '{0}' is not a YYYY-MM-DD calendar date")]
    InvalidDate(String),
    #[error("invalid month: '{0}' is not a YYYY-MM month")]
    InvalidMonth(String),
    #[error("invalid range: start {start} is after end {end}")]
    StartAfterEnd { start: NaiveDate, end: NaiveDate },
    #[error("range too large: spans {days} days, maximum is {max}")]
    RangeTooLarge { days: i64, max: i64 },
}

/// A fetch against the usage service failed. Never retried, never swallowed.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Endpoint rejected when the provider was built, before any request.
    #[error("invalid endpoint: {0}")]
    Endpoint(String),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Non-2xx response; `message` is the service's own error message when
    /// the body carries one, otherwise the raw body.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("invalid JSON response: {0}")]
    Decode(#[from] serde_json::Error),
}
