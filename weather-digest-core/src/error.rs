//! Error taxonomy shared by every stage of the digest job.

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that end a digest run before anything is dispatched.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing credentials, unknown timezone and similar setup problems.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    NoData(#[from] NoDataError),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

/// Failures while retrieving observations from the weather provider.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("weather request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("weather request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to parse weather response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("weather provider rejected the query (code {code}): {message}")]
    Provider { code: i64, message: String },

    #[error("weather response contained no station data")]
    NoStation,

    #[error("weather request cancelled")]
    Cancelled,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no temperature samples to aggregate")]
pub struct NoDataError;

/// Failure of a single outbound message.
#[derive(Error, Debug)]
pub enum SendError {
    #[error("message request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("message rejected with status {status}: {message}")]
    Rejected { status: StatusCode, message: String },

    #[error("message send cancelled")]
    Cancelled,
}

/// A send failure attributed to the recipient it was meant for.
#[derive(Error, Debug)]
#[error("delivery to {recipient} failed: {source}")]
pub struct DispatchError {
    pub recipient: String,
    #[source]
    pub source: SendError,
}

impl DispatchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self.source, SendError::Cancelled)
    }
}

/// Cut long provider bodies down before they end up in logs or errors.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
