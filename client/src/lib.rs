//! Terminal client for the element sync server
//!
//! Keeps a local, name-deduplicated view of the shared element set and
//! speaks the same WebSocket protocol as the browser UI.

pub mod connection;
pub mod error;
pub mod state;

pub use connection::{CraftClient, PairReply};
pub use error::{ClientError, ClientResult};
pub use state::{ClientView, ViewChange};
