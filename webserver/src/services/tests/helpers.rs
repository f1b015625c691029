//! Test helpers for sync server service tests

use std::sync::Arc;
use std::time::Duration;

use shared::ServerMessage;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::core::{KnownElements, PairingOrchestrator};
use crate::services::{RecipeBookOracle, RedbElementLog, SessionOutbox};

use super::fixtures::starter_recipes;

pub type TestPairing = PairingOrchestrator<RedbElementLog, RecipeBookOracle>;

/// Fresh in-memory log
pub fn create_test_log() -> Arc<RedbElementLog> {
    Arc::new(RedbElementLog::in_memory().unwrap())
}

/// Pairing orchestrator over `log` answering from the starter recipes
pub async fn create_test_pairing(log: Arc<RedbElementLog>) -> Arc<TestPairing> {
    use crate::traits::ElementLog;

    let history = log.read_all().await.unwrap();
    let known = Arc::new(KnownElements::from_entries(&history));
    let oracle = Arc::new(RecipeBookOracle::new(starter_recipes()));
    Arc::new(PairingOrchestrator::new(log, oracle, known))
}

pub fn create_test_outbox(capacity: usize) -> (SessionOutbox, mpsc::Receiver<ServerMessage>) {
    SessionOutbox::channel(Uuid::new_v4(), capacity)
}

/// Next message, or `None` if nothing arrives within `timeout_ms`
pub async fn recv_within(rx: &mut mpsc::Receiver<ServerMessage>, timeout_ms: u64) -> Option<ServerMessage> {
    tokio::time::timeout(Duration::from_millis(timeout_ms), rx.recv())
        .await
        .ok()
        .flatten()
}

/// Test helper to wait for async operations
pub async fn wait_for_condition<F, Fut>(mut condition: F, timeout_ms: u64) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(timeout_ms);

    loop {
        if condition().await {
            return true;
        }

        if start.elapsed() > timeout {
            return false;
        }

        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
