//! HTTP and WebSocket route handlers

pub mod api;
pub mod websocket;

pub use api::{health_check, status_handler};
pub use websocket::websocket_handler;
