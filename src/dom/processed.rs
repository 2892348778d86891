use crate::dom::tree::{DomTree, NodeKey};
use indexmap::IndexSet;

/// Side table of cards that already produced a record.
///
/// Keyed by [`NodeKey`] so marking never mutates the page. Entries whose
/// node has disappeared from the page are dropped by [`ProcessedSet::prune`].
#[derive(Debug, Clone, Default)]
pub struct ProcessedSet {
    /// Keys in the order they were marked
    keys: IndexSet<NodeKey>,
}

impl ProcessedSet {
    pub fn new() -> Self {
        Self { keys: IndexSet::new() }
    }

    /// Mark a node as processed. Returns false if it already was.
    pub fn mark(&mut self, key: NodeKey) -> bool {
        self.keys.insert(key)
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.keys.contains(&key)
    }

    /// Drop every key the snapshot no longer contains; returns how many
    /// were dropped
    pub fn prune(&mut self, tree: &DomTree) -> usize {
        let before = self.keys.len();
        self.keys.retain(|key| tree.contains_key(*key));
        before - self.keys.len()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
