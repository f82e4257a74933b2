//! Client error types.

use thiserror::Error;

/// Transport-level errors.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Unauthorized: {path}")]
    Unauthorized { path: String },

    #[error("Unexpected status {status} from {path}: {body}")]
    Status {
        status: u16,
        path: String,
        body: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ClientError {
    /// Whether the backend rejected the session.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized { .. })
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
