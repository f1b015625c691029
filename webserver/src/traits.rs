//! Service trait definitions for dependency injection
//!
//! All I/O operations are abstracted through these traits for testability

use async_trait::async_trait;
use tokio::sync::watch;

use shared::Element;
use crate::error::WebServerResult;
use crate::types::{Combination, EntryId, LogEntry};

/// Durable, append-only record of every discovered element
#[mockall::automock]
#[async_trait]
pub trait ElementLog: Send + Sync {
    /// Persist a new entry with a fresh id and bump the sentinel, atomically
    async fn append(&self, element: Element) -> WebServerResult<LogEntry>;

    /// All entries with id greater than `watermark`, in id order
    async fn read_since(&self, watermark: EntryId) -> WebServerResult<Vec<LogEntry>>;

    /// The full ordered history
    async fn read_all(&self) -> WebServerResult<Vec<LogEntry>>;

    /// An id at least as large as any id currently stored
    async fn current_watermark(&self) -> WebServerResult<EntryId>;

    /// Number of stored entries
    async fn len(&self) -> WebServerResult<usize>;

    /// Subscribe to sentinel changes
    ///
    /// The receiver holds the latest sentinel value and is woken on each
    /// successful append; intermediate values may be coalesced. The channel
    /// closes when the log is dropped.
    fn subscribe(&self) -> watch::Receiver<EntryId>;
}

/// External service that knows what two elements combine into
#[mockall::automock]
#[async_trait]
pub trait CombinationOracle: Send + Sync {
    /// Combine two element names
    async fn combine(&self, first: &str, second: &str) -> WebServerResult<Combination>;
}
