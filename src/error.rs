//! Error types for query composition and execution.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("Projection error: {0}")]
    ProjectionError(String),
    #[error("Query did not return a unique result: {0} rows matched")]
    NonUniqueResult(usize),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl QueryError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        QueryError::InvalidArgument(msg.into())
    }

    pub fn storage_unavailable(msg: impl Into<String>) -> Self {
        QueryError::StorageUnavailable(msg.into())
    }

    pub fn projection(msg: impl Into<String>) -> Self {
        QueryError::ProjectionError(msg.into())
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        QueryError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for QueryError {
    fn from(err: config::ConfigError) -> Self {
        QueryError::ConfigurationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QueryError>;
