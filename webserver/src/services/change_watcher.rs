//! Per-session change watcher
//!
//! Sleeps on the log's sentinel notification, then reads only the entries
//! appended after its watermark and forwards them as one "add" batch.
//!
//! The watermark only ever moves to the largest id actually returned by a
//! read. Entries committed while a read is in flight are therefore picked up
//! by the next read instead of being skipped.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use shared::{Element, ProcessRole, ServerMessage, process_debug, process_warn};
use crate::error::WebServerResult;
use crate::services::outbox::SessionOutbox;
use crate::traits::ElementLog;
use crate::types::EntryId;

/// Tracks one session's position in the log
pub struct ChangeWatcher<L: ElementLog> {
    log: Arc<L>,
    changes: watch::Receiver<EntryId>,
    watermark: EntryId,
}

impl<L: ElementLog + 'static> ChangeWatcher<L> {
    /// `changes` must have been subscribed before the read that produced
    /// `watermark`, otherwise an append in between could go unnoticed
    pub fn new(log: Arc<L>, changes: watch::Receiver<EntryId>, watermark: EntryId) -> Self {
        Self { log, changes, watermark }
    }

    pub fn watermark(&self) -> EntryId {
        self.watermark
    }

    /// Read everything after the watermark and advance it
    pub async fn catch_up(&mut self) -> WebServerResult<Vec<Element>> {
        let entries = self.log.read_since(self.watermark).await?;
        if let Some(last) = entries.last() {
            self.watermark = last.id;
        }
        Ok(entries.into_iter().map(|entry| entry.element).collect())
    }

    /// Wait for the next non-empty batch; `None` once the notification stream ends
    pub async fn next_batch(&mut self) -> Option<Vec<Element>> {
        loop {
            if self.changes.changed().await.is_err() {
                return None;
            }

            match self.catch_up().await {
                Ok(batch) if !batch.is_empty() => return Some(batch),
                Ok(_) => continue,
                Err(e) => {
                    // Retried on the next notification
                    process_warn!(
                        ProcessRole::current(),
                        "Watcher read after {} failed: {}",
                        self.watermark,
                        e
                    );
                }
            }
        }
    }

    /// Forward batches to `outbox` until cancelled, the log goes away, or the
    /// session's connection closes
    pub async fn run(mut self, outbox: SessionOutbox) {
        while let Some(elements) = self.next_batch().await {
            process_debug!(
                ProcessRole::current(),
                "📡 Forwarding {} new element(s) to session {}",
                elements.len(),
                outbox.session_id()
            );
            outbox.deliver(ServerMessage::Add { elements }).await;
            if outbox.is_closed() {
                break;
            }
        }
        process_debug!(ProcessRole::current(), "Watcher for session {} ended", outbox.session_id());
    }

    pub fn spawn(self, outbox: SessionOutbox) -> WatcherHandle {
        WatcherHandle {
            task: Some(tokio::spawn(self.run(outbox))),
        }
    }
}

/// Owner's handle on a running watcher
#[derive(Debug)]
pub struct WatcherHandle {
    task: Option<JoinHandle<()>>,
}

impl WatcherHandle {
    /// Stop the watcher; calling it again does nothing
    pub fn cancel(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
