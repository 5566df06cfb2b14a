use thiserror::Error;

/// Errors that can occur in the repository and use-case layers.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend unreachable or misconfigured. Fatal for the invocation.
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed or missing request fields, rejected before any backend call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Document revision mismatch. Never retried.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
