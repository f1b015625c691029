//! Client-specific error types

use thiserror::Error;
use shared::SharedError;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid server URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Connection closed by server")]
    ConnectionClosed,

    #[error("Timed out waiting for the server")]
    Timeout,

    #[error("Server rejected the request: {message}")]
    ServerError { message: String },

    #[error("Protocol error: {0}")]
    Protocol(#[from] SharedError),
}

pub type ClientResult<T> = Result<T, ClientError>;
