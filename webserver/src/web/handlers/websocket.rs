//! WebSocket connection handler
//!
//! Bridges one socket to one [`Session`]: a writer task drains the session's
//! outbox into the socket while this task feeds inbound frames to the session.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use uuid::Uuid;

use shared::{ProcessRole, ServerMessage, process_debug, process_error, process_info, process_warn};
use crate::services::SessionOutbox;
use crate::state::ServerState;
use crate::traits::{CombinationOracle, ElementLog};
use crate::web::session::Session;

/// How long the writer may keep flushing queued messages after the session ends
const WRITER_DRAIN: Duration = Duration::from_secs(1);

/// `GET /api/connect`
pub async fn websocket_handler<L, O>(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState<L, O>>>,
) -> Response
where
    L: ElementLog + 'static,
    O: CombinationOracle + 'static,
{
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Handle individual WebSocket connection
async fn handle_websocket<L, O>(socket: WebSocket, state: Arc<ServerState<L, O>>)
where
    L: ElementLog + 'static,
    O: CombinationOracle + 'static,
{
    let session_id = Uuid::new_v4();
    let active = state.session_opened();
    process_info!(ProcessRole::current(), "🔗 New WebSocket session {} ({} active)", session_id, active);

    let (mut sender, mut receiver) = socket.split();
    let (outbox, mut outgoing) = SessionOutbox::channel(session_id, state.outbound_capacity);

    // Handle outgoing messages (server -> client)
    let mut outgoing_task = tokio::spawn(async move {
        while let Some(message) = outgoing.recv().await {
            let json = match message.to_json() {
                Ok(json) => json,
                Err(e) => {
                    process_error!(ProcessRole::current(), "Failed to serialize {} message: {}", message.kind(), e);
                    continue;
                }
            };

            if let Err(e) = sender.send(Message::Text(json)).await {
                process_debug!(ProcessRole::current(), "Send to session {} failed: {}", session_id, e);
                break;
            }
        }
        let _ = sender.close().await;
    });

    let mut session = Session::new(state.log.clone(), state.pairing.clone(), outbox.clone());

    match session.start().await {
        Ok(()) => {
            // Handle incoming messages (client -> server)
            while let Some(frame) = receiver.next().await {
                match frame {
                    Ok(Message::Text(text)) => session.handle_text(&text).await,
                    Ok(Message::Binary(_)) => {
                        process_warn!(ProcessRole::current(), "Binary frame from session {} ignored", session_id);
                    }
                    Ok(Message::Close(_)) => {
                        process_debug!(ProcessRole::current(), "Session {} requested close", session_id);
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        process_warn!(ProcessRole::current(), "WebSocket error for session {}: {}", session_id, e);
                        break;
                    }
                }
            }
        }
        Err(e) => {
            process_error!(ProcessRole::current(), "❌ Session {} failed to sync: {}", session_id, e);
            outbox
                .deliver(ServerMessage::Error {
                    message: e.client_message(),
                })
                .await;
        }
    }

    // Cleanup
    session.close();
    drop(session);
    drop(outbox);

    if tokio::time::timeout(WRITER_DRAIN, &mut outgoing_task).await.is_err() {
        outgoing_task.abort();
    }

    let active = state.session_closed();
    process_info!(ProcessRole::current(), "👋 WebSocket session {} closed ({} active)", session_id, active);
}
