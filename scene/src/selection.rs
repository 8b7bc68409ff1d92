//! Ordered set of selected node ids.

use crate::node::NodeId;
use crate::store::NodeStore;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Vec<NodeId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected ids in selection order.
    pub fn selected(&self) -> &[NodeId] {
        &self.selected
    }

    /// The most recently selected id.
    pub fn primary(&self) -> Option<NodeId> {
        self.selected.last().copied()
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selected.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Selects `id`; without `additive` the previous selection is replaced.
    pub fn select(&mut self, id: NodeId, additive: bool) {
        if !additive {
            self.selected.clear();
        }
        if !self.selected.contains(&id) {
            self.selected.push(id);
        }
    }

    pub fn deselect(&mut self, id: NodeId) {
        self.selected.retain(|s| *s != id);
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Replaces the selection, dropping duplicates.
    pub fn set_selected(&mut self, ids: &[NodeId]) {
        self.selected.clear();
        for id in ids {
            if !self.selected.contains(id) {
                self.selected.push(*id);
            }
        }
    }

    /// Selects every attached node in tree order.
    pub fn select_all(&mut self, store: &NodeStore) {
        self.selected = store.walk();
    }

    /// Drops ids that no longer name a live node.
    pub fn prune(&mut self, store: &NodeStore) {
        self.selected.retain(|id| store.contains(*id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_replaces_unless_additive() {
        let mut selection = Selection::new();
        selection.select(NodeId(1), false);
        selection.select(NodeId(2), true);
        selection.select(NodeId(2), true);
        assert_eq!(selection.selected(), [NodeId(1), NodeId(2)]);
        assert_eq!(selection.primary(), Some(NodeId(2)));

        selection.select(NodeId(3), false);
        assert_eq!(selection.selected(), [NodeId(3)]);
    }

    #[test]
    fn set_selected_deduplicates() {
        let mut selection = Selection::new();
        selection.set_selected(&[NodeId(4), NodeId(4), NodeId(5)]);
        assert_eq!(selection.len(), 2);
        selection.deselect(NodeId(4));
        assert!(!selection.is_selected(NodeId(4)));
        selection.clear();
        assert!(selection.is_empty());
    }
}
