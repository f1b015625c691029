//! Web layer: per-connection sessions and the axum handlers that host them

pub mod handlers;
pub mod session;

pub use session::Session;
