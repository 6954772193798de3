use chrono::{DateTime, Utc};
use thiserror::Error;

/// All errors generated in `tickflow-data`.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum DataError {
    #[error("invalid time range: start {start} is not before end {end}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("rate limited by exchange: {0}")]
    RateLimited(String),

    #[error("request rejected by exchange: {0}")]
    Rejected(String),

    #[error("unexpected response schema: {0}")]
    Schema(String),

    #[error("missing credentials: {0}")]
    MissingCredentials(&'static str),

    #[error("retry budget exhausted after {attempts} attempts, last failure: {last}")]
    RetriesExhausted { attempts: u32, last: String },

    #[error("prediction model failure: {0}")]
    Model(String),

    #[error("dataset io failure: {0}")]
    Io(String),

    #[error("dataset encoding failure: {0}")]
    Csv(String),
}

impl DataError {
    /// Determine if retrying the same request after a delay could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DataError::Timeout(_) | DataError::Transport(_) | DataError::RateLimited(_)
        )
    }

    /// Determine if the failure is an exchange throttle signal, which warrants the
    /// longer fixed cooldown before the next attempt.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, DataError::RateLimited(_))
    }

    /// Classify an HTTP status the exchange returned on an otherwise well-formed
    /// response. 429 and 418 are throttle signals, 5xx is worth retrying, anything
    /// else rejected the request itself.
    pub fn from_status(status: reqwest::StatusCode, context: impl Into<String>) -> Self {
        let context = context.into();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::IM_A_TEAPOT
        {
            DataError::RateLimited(context)
        } else if status.is_server_error() {
            DataError::Transport(context)
        } else {
            DataError::Rejected(context)
        }
    }
}

impl From<reqwest::Error> for DataError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            DataError::Timeout(error.to_string())
        } else if error.is_decode() {
            DataError::Schema(error.to_string())
        } else if let Some(status) = error.status() {
            DataError::from_status(status, error.to_string())
        } else {
            DataError::Transport(error.to_string())
        }
    }
}

impl From<std::io::Error> for DataError {
    fn from(error: std::io::Error) -> Self {
        DataError::Io(error.to_string())
    }
}

impl From<csv::Error> for DataError {
    fn from(error: csv::Error) -> Self {
        DataError::Csv(error.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for DataError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        DataError::Transport(error.to_string())
    }
}
