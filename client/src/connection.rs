//! WebSocket connection to the sync server

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use url::Url;

use shared::{ClientMessage, Element, ProcessRole, Scope, ServerMessage, canonical_pair, process_debug, process_info};
use crate::error::{ClientError, ClientResult};
use crate::state::ClientView;

/// Final answer to a pair request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairReply {
    Discovery { element: Element, scope: Scope },
    Existing { element: Element },
}

/// One open session with the server plus the local view it feeds
pub struct CraftClient {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
    view: ClientView,
}

impl CraftClient {
    /// Connect to a `ws://` or `wss://` endpoint
    pub async fn connect(url: &str) -> ClientResult<Self> {
        let parsed = Url::parse(url).map_err(|e| ClientError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "ws" | "wss") {
            return Err(ClientError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        let (socket, _) = connect_async(parsed.as_str()).await?;
        process_info!(ProcessRole::current(), "🔗 Connected to {}", parsed);

        Ok(Self {
            socket,
            view: ClientView::new(),
        })
    }

    pub fn view(&self) -> &ClientView {
        &self.view
    }

    /// Next protocol message, already applied to the view
    pub async fn next_message(&mut self) -> ClientResult<ServerMessage> {
        while let Some(frame) = self.socket.next().await {
            match frame? {
                Message::Text(text) => {
                    let message = ServerMessage::from_json(&text)?;
                    self.view.apply(&message);
                    process_debug!(ProcessRole::current(), "Received {} message", message.kind());
                    return Ok(message);
                }
                Message::Close(_) => return Err(ClientError::ConnectionClosed),
                _ => continue,
            }
        }
        Err(ClientError::ConnectionClosed)
    }

    /// Wait for the snapshot every session starts with
    pub async fn sync(&mut self, wait: Duration) -> ClientResult<Vec<Element>> {
        tokio::time::timeout(wait, self.next_snapshot())
            .await
            .map_err(|_| ClientError::Timeout)?
    }

    async fn next_snapshot(&mut self) -> ClientResult<Vec<Element>> {
        loop {
            if let ServerMessage::Add { elements } = self.next_message().await? {
                return Ok(elements);
            }
        }
    }

    /// Send a pair request in canonical order
    pub async fn send_pair(&mut self, first: &str, second: &str) -> ClientResult<()> {
        let (first, second) = canonical_pair(first, second);
        let json = ClientMessage::pair(first, second).to_json()?;
        self.socket.send(Message::Text(json)).await?;
        Ok(())
    }

    /// Send a pair request and wait for its reply
    ///
    /// "add" batches arriving in the meantime still update the view.
    pub async fn pair(&mut self, first: &str, second: &str, wait: Duration) -> ClientResult<PairReply> {
        self.send_pair(first, second).await?;

        tokio::time::timeout(wait, self.next_reply())
            .await
            .map_err(|_| ClientError::Timeout)?
    }

    async fn next_reply(&mut self) -> ClientResult<PairReply> {
        loop {
            match self.next_message().await? {
                ServerMessage::Discovery { element, scope } => return Ok(PairReply::Discovery { element, scope }),
                ServerMessage::Existing { element } => return Ok(PairReply::Existing { element }),
                ServerMessage::Error { message } => return Err(ClientError::ServerError { message }),
                ServerMessage::Add { .. } => continue,
            }
        }
    }

    pub async fn close(mut self) -> ClientResult<()> {
        self.socket.close(None).await?;
        Ok(())
    }
}
