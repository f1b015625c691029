//! Service tests for the sync server
//!
//! Exercise the real redb log, the watcher and sessions together.

pub mod helpers;
pub mod change_watcher;
