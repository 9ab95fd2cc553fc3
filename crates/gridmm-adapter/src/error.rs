//! Adapter error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("Response parse error: {0}")]
    Parse(String),

    #[error("Operation not supported: {0}")]
    NotSupported(&'static str),
}

impl AdapterError {
    /// True when the venue (or adapter) lacks the endpoint entirely,
    /// as opposed to a request that failed.
    pub fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported(_))
    }
}

pub type AdapterResult<T> = Result<T, AdapterError>;
