//! Core business logic
//!
//! Deduplication and pairing rules, independent of transport and storage.

pub mod known;
pub mod pairing;

pub use known::{KnownElements, KnownElementsGuard};
pub use pairing::PairingOrchestrator;
