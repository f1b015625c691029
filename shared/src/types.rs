//! Core shared types and identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::errors::{SharedError, SharedResult};

/// Global process role singleton - set once at startup
static PROCESS_ROLE: OnceLock<ProcessRole> = OnceLock::new();

/// Role of the running process, stamped on every log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessRole {
    /// The authoritative sync server owning the element store
    Server,
    /// A terminal client connected over WebSocket
    Client,
}

impl ProcessRole {
    /// Initialize the global role for the sync server
    pub fn init_server() -> &'static ProcessRole {
        PROCESS_ROLE.get_or_init(|| ProcessRole::Server)
    }

    /// Initialize the global role for a client
    pub fn init_client() -> &'static ProcessRole {
        PROCESS_ROLE.get_or_init(|| ProcessRole::Client)
    }

    /// Get the global role, falling back to `Server` when nothing was initialized
    /// (library code running under tests)
    pub fn current() -> &'static ProcessRole {
        PROCESS_ROLE.get().unwrap_or(&ProcessRole::Server)
    }
}

impl fmt::Display for ProcessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessRole::Server => write!(f, "webserver"),
            ProcessRole::Client => write!(f, "client"),
        }
    }
}

/// A discovered element: unique name plus its display glyph
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    pub symbol: String,
}

impl Element {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.symbol, self.name)
    }
}

/// Whether a discovery is new to everyone using the oracle or only to this deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Global,
    Local,
}

impl Scope {
    pub fn from_globally_new(is_globally_new: bool) -> Self {
        if is_globally_new { Scope::Global } else { Scope::Local }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => write!(f, "global"),
            Scope::Local => write!(f, "local"),
        }
    }
}

/// The elements every fresh store starts with
pub fn foundational_elements() -> Vec<Element> {
    vec![
        Element::new("Water", "💧"),
        Element::new("Fire", "🔥"),
        Element::new("Wind", "🌬️"),
        Element::new("Earth", "🌍"),
    ]
}

/// Order a pair lexicographically so `(a, b)` and `(b, a)` are the same request
pub fn canonical_pair<'a>(first: &'a str, second: &'a str) -> (&'a str, &'a str) {
    if first > second { (second, first) } else { (first, second) }
}

/// Reject names that cannot identify an element
pub fn validate_element_name(name: &str) -> SharedResult<()> {
    if name.trim().is_empty() {
        return Err(SharedError::InvalidElementName { input: name.to_string() });
    }
    Ok(())
}
