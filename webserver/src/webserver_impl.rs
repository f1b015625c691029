//! Main webserver implementation
//!
//! Wires the element log, the oracle and the known set into shared state and
//! hosts it behind an axum router.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use shared::{ProcessRole, process_info};
use crate::core::KnownElements;
use crate::error::{WebServerError, WebServerResult};
use crate::state::ServerState;
use crate::traits::{CombinationOracle, ElementLog};
use crate::web::handlers::{health_check, status_handler, websocket_handler};

/// Main webserver struct with dependency injection
pub struct WebServer<L, O>
where
    L: ElementLog,
    O: CombinationOracle,
{
    state: Arc<ServerState<L, O>>,
    shutdown_tx: mpsc::Sender<()>,
    shutdown_rx: Option<mpsc::Receiver<()>>,
}

impl<L, O> WebServer<L, O>
where
    L: ElementLog + 'static,
    O: CombinationOracle + 'static,
{
    /// Create a webserver over an already bootstrapped log
    ///
    /// The known set is rebuilt from the log's full history here.
    pub async fn new(log: Arc<L>, oracle: Arc<O>, outbound_capacity: usize) -> WebServerResult<Self> {
        let history = log.read_all().await?;
        let known = Arc::new(KnownElements::from_entries(&history));
        process_info!(ProcessRole::current(), "🧠 Loaded {} known element(s)", known.len().await);

        let state = Arc::new(ServerState::new(log, oracle, known, outbound_capacity));
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        Ok(Self {
            state,
            shutdown_tx,
            shutdown_rx: Some(shutdown_rx),
        })
    }

    /// Build the Axum router with all routes
    pub fn build_router(&self) -> Router {
        Router::new()
            .route("/api/connect", get(websocket_handler::<L, O>))
            .route("/api/status", get(status_handler::<L, O>))
            .route("/health", get(health_check::<L, O>))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(CorsLayer::permissive())
                    .into_inner(),
            )
            .with_state(self.state.clone())
    }

    /// Sender that stops a running server
    pub fn get_shutdown_sender(&self) -> mpsc::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Bind `addr` and serve until shutdown
    pub async fn run(&mut self, addr: SocketAddr) -> WebServerResult<()> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| WebServerError::ServerStartup(format!("Failed to bind to {addr}: {e}")))?;
        self.serve(listener).await
    }

    /// Serve on an existing listener until a shutdown signal arrives
    pub async fn serve(&mut self, listener: TcpListener) -> WebServerResult<()> {
        let mut shutdown_rx = self
            .shutdown_rx
            .take()
            .ok_or_else(|| WebServerError::ServerStartup("server is already running".to_string()))?;

        let local_addr = listener.local_addr()?;
        process_info!(ProcessRole::current(), "🌐 Sync server listening on http://{}", local_addr);
        process_info!(ProcessRole::current(), "🔌 WebSocket endpoint at ws://{}/api/connect", local_addr);

        axum::serve(listener, self.build_router())
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await
            .map_err(|e| WebServerError::ServerStartup(format!("Server error: {e}")))?;

        Ok(())
    }

    /// Get server state for external access
    pub fn state(&self) -> &Arc<ServerState<L, O>> {
        &self.state
    }
}
