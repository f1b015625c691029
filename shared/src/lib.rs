//! Shared types for the element crafting system
//!
//! Contains the wire protocol spoken between the sync server and its clients,
//! plus the error and logging conventions both sides use.

pub mod types;
pub mod errors;
pub mod messages;
pub mod logging;

pub use types::*;
pub use errors::*;

pub use messages::{ClientMessage, ServerMessage};
