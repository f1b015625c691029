//! Sync server for collaborative element discovery
//!
//! Keeps a durable, append-only log of every discovered element, asks a
//! combination oracle about new pairs, and streams the log to every connected
//! WebSocket client.

pub mod config;
pub mod core;
pub mod error;
pub mod services;
pub mod state;
pub mod traits;
pub mod types;
pub mod web;
pub mod webserver_impl;

// Re-export main types
pub use error::{WebServerError, WebServerResult};
pub use state::ServerState;
pub use types::*;
pub use webserver_impl::WebServer;

// Re-export trait definitions
pub use traits::{CombinationOracle, ElementLog};

// Re-export service implementations
pub use services::{HttpCombinationOracle, RecipeBookOracle, RedbElementLog, bootstrap_store};
