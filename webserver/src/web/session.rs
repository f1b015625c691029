//! Connection session
//!
//! One per WebSocket client. Moves through
//! `Connecting -> Syncing -> Streaming -> Closed`:
//! - syncing sends the full history as a single "add" snapshot,
//! - streaming runs a change watcher from the snapshot's last id and answers
//!   pair requests directly,
//! - closing cancels the watcher; repeated closes are harmless.

use std::sync::Arc;

use uuid::Uuid;

use shared::{ClientMessage, ProcessRole, ServerMessage, canonical_pair, process_debug, process_info, process_warn};
use crate::core::PairingOrchestrator;
use crate::error::WebServerResult;
use crate::services::{ChangeWatcher, SessionOutbox, WatcherHandle};
use crate::traits::{CombinationOracle, ElementLog};
use crate::types::{EMPTY_WATERMARK, EntryId, SessionPhase};

pub struct Session<L, O>
where
    L: ElementLog,
    O: CombinationOracle,
{
    id: Uuid,
    log: Arc<L>,
    pairing: Arc<PairingOrchestrator<L, O>>,
    outbox: SessionOutbox,
    phase: SessionPhase,
    watcher: Option<WatcherHandle>,
    synced_watermark: EntryId,
}

impl<L, O> Session<L, O>
where
    L: ElementLog + 'static,
    O: CombinationOracle + 'static,
{
    pub fn new(log: Arc<L>, pairing: Arc<PairingOrchestrator<L, O>>, outbox: SessionOutbox) -> Self {
        Self {
            id: outbox.session_id(),
            log,
            pairing,
            outbox,
            phase: SessionPhase::Connecting,
            watcher: None,
            synced_watermark: EMPTY_WATERMARK,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Last log id covered by the snapshot
    pub fn synced_watermark(&self) -> EntryId {
        self.synced_watermark
    }

    pub fn watcher_running(&self) -> bool {
        self.watcher.as_ref().is_some_and(WatcherHandle::is_running)
    }

    /// Send the snapshot and start streaming
    pub async fn start(&mut self) -> WebServerResult<()> {
        if self.phase != SessionPhase::Connecting {
            return Ok(());
        }

        // Subscribe first: an append racing the snapshot read then still
        // wakes the watcher, and the watermark filters out what the snapshot
        // already covered.
        let changes = self.log.subscribe();
        let snapshot = self.log.read_all().await?;
        self.synced_watermark = snapshot.last().map(|entry| entry.id).unwrap_or(EMPTY_WATERMARK);
        self.phase = SessionPhase::Syncing;

        let elements: Vec<_> = snapshot.into_iter().map(|entry| entry.element).collect();
        process_info!(
            ProcessRole::current(),
            "📦 Session {} synced with {} element(s)",
            self.id,
            elements.len()
        );
        self.outbox.deliver(ServerMessage::Add { elements }).await;

        let watcher = ChangeWatcher::new(self.log.clone(), changes, self.synced_watermark);
        self.watcher = Some(watcher.spawn(self.outbox.clone()));
        self.phase = SessionPhase::Streaming;
        Ok(())
    }

    /// Parse and dispatch one text frame
    pub async fn handle_text(&self, text: &str) {
        match ClientMessage::from_json(text) {
            Ok(message) => self.handle_message(message).await,
            Err(e) => {
                process_warn!(ProcessRole::current(), "Session {} sent an invalid message: {}", self.id, e);
                self.outbox
                    .deliver(ServerMessage::Error {
                        message: format!("invalid message: {e}"),
                    })
                    .await;
            }
        }
    }

    pub async fn handle_message(&self, message: ClientMessage) {
        if self.phase != SessionPhase::Streaming {
            process_debug!(ProcessRole::current(), "Session {} ignored message in {:?}", self.id, self.phase);
            return;
        }

        match message {
            ClientMessage::Pair { first, second } => {
                let (first, second) = canonical_pair(&first, &second);
                let reply = match self.pairing.pair(first, second).await {
                    Ok(outcome) => ServerMessage::from(outcome),
                    Err(e) => {
                        process_warn!(
                            ProcessRole::current(),
                            "Pair {} + {} failed for session {}: {}",
                            first,
                            second,
                            self.id,
                            e
                        );
                        ServerMessage::Error {
                            message: e.client_message(),
                        }
                    }
                };
                self.outbox.deliver(reply).await;
            }
        }
    }

    /// Cancel the watcher and mark the session closed; false if already closed
    pub fn close(&mut self) -> bool {
        if self.phase == SessionPhase::Closed {
            return false;
        }
        if let Some(mut watcher) = self.watcher.take() {
            watcher.cancel();
        }
        self.phase = SessionPhase::Closed;
        process_debug!(ProcessRole::current(), "Session {} closed", self.id);
        true
    }
}
