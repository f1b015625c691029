//! Test helper utilities for sync server integration tests

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use shared::{ClientMessage, ServerMessage};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use webserver::services::Recipe;
use webserver::{RecipeBookOracle, RedbElementLog, WebServer, bootstrap_store};

pub type TestSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A server running on an ephemeral port
pub struct TestServer {
    pub addr: SocketAddr,
    pub log: Arc<RedbElementLog>,
    shutdown: mpsc::Sender<()>,
}

impl TestServer {
    /// Seeded in-memory store, offline recipe book
    pub async fn start() -> Self {
        let log = RedbElementLog::in_memory().unwrap();
        bootstrap_store(&log, 1).await.unwrap();
        let log = Arc::new(log);

        let oracle = Arc::new(RecipeBookOracle::new(vec![
            recipe("Water", "Fire", "Steam", "💨", false),
            recipe("Water", "Earth", "Mud", "🟤", false),
            recipe("Steam", "Earth", "Geyser", "⛲", true),
        ]));

        let mut server = WebServer::new(log.clone(), oracle, 64).await.unwrap();
        let shutdown = server.get_shutdown_sender();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = server.serve(listener).await;
        });

        Self { addr, log, shutdown }
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/api/connect", self.addr)
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn stop(self) {
        let _ = self.shutdown.send(()).await;
    }
}

fn recipe(first: &str, second: &str, result: &str, symbol: &str, is_new: bool) -> Recipe {
    Recipe {
        first: first.to_string(),
        second: second.to_string(),
        result: result.to_string(),
        symbol: symbol.to_string(),
        is_new,
    }
}

pub async fn connect(server: &TestServer) -> TestSocket {
    let (socket, _) = connect_async(server.ws_url()).await.unwrap();
    socket
}

pub async fn send_pair(socket: &mut TestSocket, first: &str, second: &str) {
    let json = ClientMessage::pair(first, second).to_json().unwrap();
    socket.send(Message::Text(json)).await.unwrap();
}

/// Next protocol message, or `None` if nothing arrives within `timeout_ms`
pub async fn next_message(socket: &mut TestSocket, timeout_ms: u64) -> Option<ServerMessage> {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);
    loop {
        let frame = tokio::time::timeout_at(deadline, socket.next()).await.ok()??;
        match frame.ok()? {
            Message::Text(text) => return ServerMessage::from_json(&text).ok(),
            Message::Close(_) => return None,
            _ => continue,
        }
    }
}

/// Helper to wait for async conditions with timeout
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
