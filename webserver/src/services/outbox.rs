//! Per-session outbound message queue
//!
//! Everything a session sends (snapshot, broadcast batches, direct replies)
//! goes through one bounded channel drained by the socket writer task.

use tokio::sync::mpsc;
use uuid::Uuid;

use shared::{ProcessRole, ServerMessage, process_debug};

/// Sending half of a session's outbound queue
#[derive(Debug, Clone)]
pub struct SessionOutbox {
    session_id: Uuid,
    tx: mpsc::Sender<ServerMessage>,
}

impl SessionOutbox {
    pub fn new(session_id: Uuid, tx: mpsc::Sender<ServerMessage>) -> Self {
        Self { session_id, tx }
    }

    /// Create an outbox and the receiver its writer drains
    pub fn channel(session_id: Uuid, capacity: usize) -> (Self, mpsc::Receiver<ServerMessage>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(session_id, tx), rx)
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Queue a message; a closed connection silently drops it
    pub async fn deliver(&self, message: ServerMessage) {
        let kind = message.kind();
        if self.tx.send(message).await.is_err() {
            process_debug!(
                ProcessRole::current(),
                "Session {} is closed, dropped {} message",
                self.session_id,
                kind
            );
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
