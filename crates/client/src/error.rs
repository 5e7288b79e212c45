//! Error taxonomy of the client layer.
//!
//! - [`FetchError`]: a read failed (transport, timeout, non-2xx status, or
//!   a body that does not match the expected shape).
//! - [`MutationError`]: the acknowledge call failed.
//! - [`ClientError`]: umbrella type, adding local validation and file IO.

use skyscan_core::error::CoreError;
use skyscan_core::types::DbId;

#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// The request never produced a response (connect, DNS, TLS, reset).
    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    /// The backend answered with a non-2xx status.
    #[error("API error ({status}): {message}")]
    Status {
        status: u16,
        /// The `error` field of a JSON error body, or the raw body text.
        message: String,
    },

    #[error("Malformed response body: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the backend never saw (or never answered) the request.
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport(_) | FetchError::Timeout)
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum MutationError {
    #[error("Failed to acknowledge alert {alert_id}: {source}")]
    Acknowledge {
        alert_id: DbId,
        #[source]
        source: FetchError,
    },
}

impl MutationError {
    /// Only transport failures are safe to re-send; an application error
    /// (e.g. already acknowledged, not found) is opaque and must not be
    /// assumed idempotent.
    pub fn is_retry_safe(&self) -> bool {
        match self {
            MutationError::Acknowledge { source, .. } => source.is_transport(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] CoreError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Mutation(#[from] MutationError),

    #[error("Failed to read upload: {0}")]
    Io(#[from] std::io::Error),
}
