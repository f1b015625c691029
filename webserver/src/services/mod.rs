//! Service implementations
//!
//! Real implementations of the service traits plus the per-session plumbing
//! built on them

pub mod bootstrap;
pub mod change_watcher;
pub mod element_log;
pub mod oracle;
pub mod outbox;

#[cfg(test)]
mod tests;

// Re-export service implementations
pub use bootstrap::bootstrap_store;
pub use change_watcher::{ChangeWatcher, WatcherHandle};
pub use element_log::RedbElementLog;
pub use oracle::{HttpCombinationOracle, Recipe, RecipeBookOracle};
pub use outbox::SessionOutbox;
