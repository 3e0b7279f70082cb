use thiserror::Error;

use crate::schema::SchemaError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{context}: {reason}")]
    Upstream { context: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn upstream(context: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Error::Upstream {
            context: context.into(),
            reason: reason.to_string(),
        }
    }

    /// Only transport and service failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Upstream { .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::upstream("HTTP request failed", e)
    }
}

impl From<SchemaError> for Error {
    fn from(e: SchemaError) -> Self {
        Error::upstream("model reply rejected", e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
