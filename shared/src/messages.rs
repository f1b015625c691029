//! WebSocket protocol between clients and the sync server
//!
//! Both directions are closed tagged unions discriminated by a `type` field.
//! Unknown tags fail to deserialize, so dispatch only ever sees valid variants.

use serde::{Deserialize, Serialize};

use crate::errors::{SharedError, SharedResult};
use crate::types::{Element, Scope};

/// Client -> server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Combine two known elements
    Pair { first: String, second: String },
}

/// Server -> client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Snapshot on connect, or an incremental batch of newly stored elements
    Add { elements: Vec<Element> },
    /// The requester's pair produced an element this deployment had not seen
    Discovery { element: Element, scope: Scope },
    /// The requester's pair produced an element that was already known
    Existing { element: Element },
    /// The request could not be completed
    Error { message: String },
}

impl ClientMessage {
    pub fn pair(first: impl Into<String>, second: impl Into<String>) -> Self {
        ClientMessage::Pair {
            first: first.into(),
            second: second.into(),
        }
    }

    pub fn from_json(text: &str) -> SharedResult<Self> {
        serde_json::from_str(text).map_err(|e| SharedError::DeserializationError {
            message: e.to_string(),
        })
    }

    pub fn to_json(&self) -> SharedResult<String> {
        serde_json::to_string(self).map_err(|e| SharedError::SerializationError {
            message: e.to_string(),
        })
    }
}

impl ServerMessage {
    pub fn from_json(text: &str) -> SharedResult<Self> {
        serde_json::from_str(text).map_err(|e| SharedError::DeserializationError {
            message: e.to_string(),
        })
    }

    pub fn to_json(&self) -> SharedResult<String> {
        serde_json::to_string(self).map_err(|e| SharedError::SerializationError {
            message: e.to_string(),
        })
    }

    /// Short name of the variant, for logs
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::Add { .. } => "add",
            ServerMessage::Discovery { .. } => "discovery",
            ServerMessage::Existing { .. } => "existing",
            ServerMessage::Error { .. } => "error",
        }
    }
}
