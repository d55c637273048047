//! Typed errors for the parts of the pipeline whose failures callers classify.

use thiserror::Error;

/// Why a single entity contributed no records.
///
/// These are soft failures: the aggregator records them next to the data
/// and never propagates them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("invalid request url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("malformed response body: {0}")]
    Malformed(String),

    #[error("response has no record array")]
    MissingRecords,

    #[error("fetch task aborted: {0}")]
    Task(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => FetchError::Status(status.as_u16()),
            None => FetchError::Transport(e.to_string()),
        }
    }
}

/// Filter or table input rejected before it reaches the pure transforms.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("period bound {0:?} is not a year")]
    InvalidPeriod(String),

    #[error("rows per page must be greater than zero")]
    EmptyPageSize,
}
