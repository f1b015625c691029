//! Type definitions for the sync server
//!
//! Data types shared between the core logic, the services and the web layer
//! that are not service traits.

use serde::{Deserialize, Serialize};
use shared::{Element, Scope, ServerMessage};

/// Identifier of a log entry; strictly increasing in insertion order
pub type EntryId = u64;

/// Watermark value meaning "nothing observed yet"
pub const EMPTY_WATERMARK: EntryId = 0;

/// One appended element and its position in the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: EntryId,
    pub element: Element,
}

/// Result of asking the oracle to combine two elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combination {
    pub result_name: String,
    pub symbol: String,
    /// First time anyone, anywhere, produced this combination
    pub is_globally_new: bool,
}

impl Combination {
    pub fn element(&self) -> Element {
        Element::new(self.result_name.clone(), self.symbol.clone())
    }
}

/// Classification of a pairing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairOutcome {
    /// Appended to the log for the first time in this deployment
    Discovery { element: Element, scope: Scope },
    /// Already known; nothing was written
    Existing { element: Element },
}

impl PairOutcome {
    pub fn element(&self) -> &Element {
        match self {
            PairOutcome::Discovery { element, .. } | PairOutcome::Existing { element } => element,
        }
    }

    pub fn is_discovery(&self) -> bool {
        matches!(self, PairOutcome::Discovery { .. })
    }
}

impl From<PairOutcome> for ServerMessage {
    fn from(outcome: PairOutcome) -> Self {
        match outcome {
            PairOutcome::Discovery { element, scope } => ServerMessage::Discovery { element, scope },
            PairOutcome::Existing { element } => ServerMessage::Existing { element },
        }
    }
}

/// Lifecycle of a connection session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Connecting,
    Syncing,
    Streaming,
    Closed,
}

/// What startup found when checking the persisted schema marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaStatus {
    /// Marker matched the build-time version
    Current,
    /// No marker: a brand new store
    Missing,
    /// Marker differed; the store has to be wiped
    Mismatch { found: u64, expected: u64 },
}

/// Summary of the startup bootstrap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    pub schema: SchemaStatus,
    pub wiped: bool,
    pub seeded: usize,
    pub total_elements: usize,
}

/// Body of `GET /api/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerStatus {
    pub status: String,
    pub elements: usize,
    pub active_sessions: u32,
    pub uptime_seconds: u64,
}
