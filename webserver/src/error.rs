//! WebServer-specific error types

use thiserror::Error;
use shared::SharedError;

#[derive(Error, Debug)]
pub enum WebServerError {
    #[error("Combination oracle failed: {message}")]
    OracleFailure { message: String },

    #[error("Element store unavailable: {message}")]
    StorageUnavailable { message: String },

    #[error("Invalid request: {details}")]
    InvalidRequest { details: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Server startup error: {0}")]
    ServerStartup(String),

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl WebServerError {
    pub fn oracle(message: impl Into<String>) -> Self {
        WebServerError::OracleFailure { message: message.into() }
    }

    pub fn storage(message: impl std::fmt::Display) -> Self {
        WebServerError::StorageUnavailable { message: message.to_string() }
    }

    pub fn invalid_request(details: impl Into<String>) -> Self {
        WebServerError::InvalidRequest { details: details.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        WebServerError::ConfigError { message: message.into() }
    }

    /// Message safe to hand back to the client that made the request
    pub fn client_message(&self) -> String {
        match self {
            WebServerError::OracleFailure { message } => format!("combination failed: {message}"),
            WebServerError::StorageUnavailable { .. } => "element store unavailable, try again".to_string(),
            WebServerError::InvalidRequest { details } => format!("invalid request: {details}"),
            WebServerError::SharedError(e) => format!("invalid request: {e}"),
            other => other.to_string(),
        }
    }
}

pub type WebServerResult<T> = Result<T, WebServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_details_are_not_leaked_to_clients() {
        let err = WebServerError::storage("disk /var/lib/elements.redb is read-only");
        assert_eq!(err.client_message(), "element store unavailable, try again");
        assert!(err.to_string().contains("read-only"));
    }

    #[test]
    fn test_oracle_failure_message() {
        let err = WebServerError::oracle("HTTP 503");
        assert_eq!(err.client_message(), "combination failed: HTTP 503");
    }
}
