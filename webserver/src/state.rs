//! Webserver state management
//!
//! Shared handle passed to every HTTP and WebSocket handler.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use crate::core::{KnownElements, PairingOrchestrator};
use crate::traits::{CombinationOracle, ElementLog};

/// Core webserver state
pub struct ServerState<L, O>
where
    L: ElementLog,
    O: CombinationOracle,
{
    pub log: Arc<L>,
    pub pairing: Arc<PairingOrchestrator<L, O>>,
    pub outbound_capacity: usize,
    active_sessions: AtomicU32,
    server_start_time: Instant,
}

impl<L, O> ServerState<L, O>
where
    L: ElementLog,
    O: CombinationOracle,
{
    pub fn new(log: Arc<L>, oracle: Arc<O>, known: Arc<KnownElements>, outbound_capacity: usize) -> Self {
        let pairing = Arc::new(PairingOrchestrator::new(log.clone(), oracle, known));
        Self {
            log,
            pairing,
            outbound_capacity,
            active_sessions: AtomicU32::new(0),
            server_start_time: Instant::now(),
        }
    }

    pub fn known(&self) -> &Arc<KnownElements> {
        self.pairing.known()
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.server_start_time.elapsed().as_secs()
    }

    pub fn active_sessions(&self) -> u32 {
        self.active_sessions.load(Ordering::Relaxed)
    }

    pub fn session_opened(&self) -> u32 {
        self.active_sessions.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn session_closed(&self) -> u32 {
        // Never wraps below zero
        let previous = self
            .active_sessions
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| Some(n.saturating_sub(1)))
            .unwrap_or(0);
        previous.saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{RecipeBookOracle, RedbElementLog};

    fn test_state() -> ServerState<RedbElementLog, RecipeBookOracle> {
        let log = Arc::new(RedbElementLog::in_memory().unwrap());
        ServerState::new(log, Arc::new(RecipeBookOracle::default()), Arc::new(KnownElements::new()), 16)
    }

    #[tokio::test]
    async fn test_session_count_management() {
        let state = test_state();
        assert_eq!(state.active_sessions(), 0);

        assert_eq!(state.session_opened(), 1);
        assert_eq!(state.session_opened(), 2);
        assert_eq!(state.session_closed(), 1);
        assert_eq!(state.active_sessions(), 1);
    }

    #[tokio::test]
    async fn test_session_count_never_underflows() {
        let state = test_state();
        assert_eq!(state.session_closed(), 0);
        assert_eq!(state.active_sessions(), 0);
    }
}
