use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while talking to the upstream forum.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("upstream HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream returned status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("failed to decode upstream response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("upstream unavailable: {0}")]
    Unavailable(String),
}

impl FetchError {
    pub fn status(status: StatusCode, body: String) -> Self {
        FetchError::Status { status, body }
    }

    /// HTTP status carried by the failure, when there is one.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Http(err) => err.status(),
            FetchError::Decode(_) | FetchError::Unavailable(_) => None,
        }
    }
}
