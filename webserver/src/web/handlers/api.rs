//! HTTP API handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::json;

use shared::{ProcessRole, process_error};
use crate::state::ServerState;
use crate::traits::{CombinationOracle, ElementLog};
use crate::types::ServerStatus;

/// `GET /api/status`
pub async fn status_handler<L, O>(
    State(state): State<Arc<ServerState<L, O>>>,
) -> Result<Json<ServerStatus>, StatusCode>
where
    L: ElementLog + 'static,
    O: CombinationOracle + 'static,
{
    let elements = state.log.len().await.map_err(|e| {
        process_error!(ProcessRole::current(), "Status lookup failed: {}", e);
        StatusCode::SERVICE_UNAVAILABLE
    })?;

    Ok(Json(ServerStatus {
        status: "running".to_string(),
        elements,
        active_sessions: state.active_sessions(),
        uptime_seconds: state.uptime_seconds(),
    }))
}

/// `GET /health`
pub async fn health_check<L, O>(State(state): State<Arc<ServerState<L, O>>>) -> Json<serde_json::Value>
where
    L: ElementLog + 'static,
    O: CombinationOracle + 'static,
{
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().timestamp(),
        "uptime": state.uptime_seconds(),
        "sessions": state.active_sessions()
    }))
}
