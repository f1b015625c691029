//! Local view of the shared element set
//!
//! The server may deliver the same element more than once (snapshot overlap,
//! a discovery reply plus its broadcast), so the view keys everything by name.

use std::collections::HashMap;

use shared::{Element, Scope, ServerMessage};

/// What applying one server message did to the view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewChange {
    /// Elements from an "add" batch that were not in the view yet
    Added(Vec<Element>),
    Discovered { element: Element, scope: Scope },
    AlreadyKnown(Element),
    Rejected(String),
}

/// Name-deduplicated elements in arrival order
#[derive(Debug, Default, Clone)]
pub struct ClientView {
    by_name: HashMap<String, usize>,
    elements: Vec<Element>,
}

impl ClientView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the name is already present
    pub fn insert(&mut self, element: Element) -> bool {
        if self.by_name.contains_key(&element.name) {
            return false;
        }
        self.by_name.insert(element.name.clone(), self.elements.len());
        self.elements.push(element);
        true
    }

    pub fn get(&self, name: &str) -> Option<&Element> {
        self.by_name.get(name).map(|&index| &self.elements[index])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn apply(&mut self, message: &ServerMessage) -> ViewChange {
        match message {
            ServerMessage::Add { elements } => {
                let added = elements
                    .iter()
                    .filter(|element| self.insert((*element).clone()))
                    .cloned()
                    .collect();
                ViewChange::Added(added)
            }
            ServerMessage::Discovery { element, scope } => {
                self.insert(element.clone());
                ViewChange::Discovered {
                    element: element.clone(),
                    scope: *scope,
                }
            }
            ServerMessage::Existing { element } => {
                self.insert(element.clone());
                ViewChange::AlreadyKnown(element.clone())
            }
            ServerMessage::Error { message } => ViewChange::Rejected(message.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::foundational_elements;

    #[test]
    fn test_snapshot_fills_empty_view() {
        let mut view = ClientView::new();
        let change = view.apply(&ServerMessage::Add {
            elements: foundational_elements(),
        });

        assert_eq!(change, ViewChange::Added(foundational_elements()));
        assert_eq!(view.len(), 4);
        assert_eq!(view.get("Fire").map(|e| e.symbol.as_str()), Some("🔥"));
    }

    #[test]
    fn test_duplicates_are_dropped_by_name() {
        let mut view = ClientView::new();
        view.apply(&ServerMessage::Add {
            elements: foundational_elements(),
        });

        let change = view.apply(&ServerMessage::Add {
            elements: vec![Element::new("Water", "🌊"), Element::new("Steam", "💨")],
        });

        assert_eq!(change, ViewChange::Added(vec![Element::new("Steam", "💨")]));
        assert_eq!(view.len(), 5);
        // First symbol wins
        assert_eq!(view.get("Water").map(|e| e.symbol.as_str()), Some("💧"));
    }

    #[test]
    fn test_discovery_then_broadcast_adds_once() {
        let mut view = ClientView::new();
        let steam = Element::new("Steam", "💨");

        view.apply(&ServerMessage::Discovery {
            element: steam.clone(),
            scope: Scope::Global,
        });
        let change = view.apply(&ServerMessage::Add {
            elements: vec![steam.clone()],
        });

        assert_eq!(change, ViewChange::Added(vec![]));
        assert_eq!(view.elements(), &[steam]);
    }

    #[test]
    fn test_error_leaves_view_untouched() {
        let mut view = ClientView::new();
        let change = view.apply(&ServerMessage::Error {
            message: "combination failed".to_string(),
        });

        assert_eq!(change, ViewChange::Rejected("combination failed".to_string()));
        assert!(view.is_empty());
    }
}
