//! Process-wide set of known element names
//!
//! Not a source of truth: it is rebuilt from the log at startup and only
//! extended after a successful append. Membership doubles as the cheap
//! "new vs. existing" test, so pairing never reads the store to classify.
//! Each name also keeps the symbol it was stored with.

use std::collections::HashMap;

use tokio::sync::{Mutex, MutexGuard};

use shared::Element;
use crate::types::LogEntry;

/// Known element names, guarded by a single async mutex
#[derive(Debug, Default)]
pub struct KnownElements {
    names: Mutex<HashMap<String, String>>,
}

impl KnownElements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from the ordered log history
    pub fn from_entries(entries: &[LogEntry]) -> Self {
        let names = entries
            .iter()
            .map(|entry| (entry.element.name.clone(), entry.element.symbol.clone()))
            .collect();
        Self { names: Mutex::new(names) }
    }

    #[cfg(test)]
    pub async fn contains(&self, name: &str) -> bool {
        self.names.lock().await.contains_key(name)
    }

    /// Record an element; returns false if the name was already known
    #[cfg(test)]
    pub async fn add(&self, element: &Element) -> bool {
        self.lock().await.add(element)
    }

    pub async fn len(&self) -> usize {
        self.names.lock().await.len()
    }

    #[cfg(test)]
    pub async fn is_empty(&self) -> bool {
        self.names.lock().await.is_empty()
    }

    /// Exclusive access for a check-then-add sequence
    ///
    /// Holding the guard across the store append is what keeps concurrent
    /// pairings of the same result from both appending.
    pub async fn lock(&self) -> KnownElementsGuard<'_> {
        KnownElementsGuard { names: self.names.lock().await }
    }
}

/// Locked view of [`KnownElements`]
pub struct KnownElementsGuard<'a> {
    names: MutexGuard<'a, HashMap<String, String>>,
}

impl KnownElementsGuard<'_> {
    /// The stored element for `name`, if known
    pub fn get(&self, name: &str) -> Option<Element> {
        self.names
            .get(name)
            .map(|symbol| Element::new(name, symbol.clone()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Names are never removed and the first symbol wins
    pub fn add(&mut self, element: &Element) -> bool {
        if self.names.contains_key(&element.name) {
            return false;
        }
        self.names.insert(element.name.clone(), element.symbol.clone());
        true
    }
}
