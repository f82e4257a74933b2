//! Query error types.

use kennel_client::ClientError;
use kennel_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    /// The session is missing or expired. The sign-in route has already been
    /// signalled when this is returned.
    #[error("Session expired, sign in again")]
    AuthExpired,

    #[error("Transport failure: {0}")]
    Transport(ClientError),

    #[error("Invalid search filter: {0}")]
    InvalidFilter(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<ClientError> for QueryError {
    fn from(err: ClientError) -> Self {
        if err.is_unauthorized() {
            QueryError::AuthExpired
        } else {
            QueryError::Transport(err)
        }
    }
}

impl From<CoreError> for QueryError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidFilter(msg) | CoreError::InvalidSort(msg) => {
                QueryError::InvalidFilter(msg)
            }
            other => QueryError::InvalidConfig(other.to_string()),
        }
    }
}

impl QueryError {
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, QueryError::AuthExpired)
    }
}

pub type QueryResult<T> = Result<T, QueryError>;
