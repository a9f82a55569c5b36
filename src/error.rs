//! Error taxonomy for backend retrieval
//!
//! Every failure a fetch operation can hit falls into one of three buckets.
//! The orchestrator folds all of them into the `Error` state of the affected
//! slot, so callers never see these as panics.

use thiserror::Error;

/// Failure of a single backend call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request never produced an HTTP response (DNS, connect, TLS, IO)
    #[error("network failure: {0}")]
    Network(String),

    /// The backend answered with a non-success status
    #[error("backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body was not the shape we expected
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    pub fn malformed(detail: impl Into<String>) -> Self {
        FetchError::Malformed(detail.into())
    }

    /// Short label for log fields and status lines
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Network(_) => "network",
            FetchError::Status { .. } => "status",
            FetchError::Malformed(_) => "malformed",
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Malformed(err.to_string())
    }
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;
