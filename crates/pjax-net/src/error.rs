//! Fetch error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("HTTP {0}")]
    Status(u16),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Request aborted")]
    Aborted,

    #[error("Unsupported content type: {0}")]
    ContentType(String),

    #[error("Unparsable document: {0}")]
    Unparsable(String),
}

/// The two failure classes a transition can end in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NetworkFailure,
    UnparsableResponse,
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Status(_)
            | FetchError::Transport(_)
            | FetchError::Timeout
            | FetchError::Aborted => FailureKind::NetworkFailure,
            FetchError::ContentType(_) | FetchError::Unparsable(_) => {
                FailureKind::UnparsableResponse
            }
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}
