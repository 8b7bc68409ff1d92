//! Identity allocation and the bidirectional id/path index.

use std::collections::HashMap;

use crate::node::{NodeId, NodeKind};

/// Prefix of every node path.
pub const PATH_ROOT: &str = ":/";

/// Hands out node ids by scanning upward from a counter.
///
/// The scan skips ids that are already taken, so nodes created with an
/// explicit id never collide with later allocations.
#[derive(Debug, Default, Clone)]
pub struct IdAllocator {
    counter: u32,
}

impl IdAllocator {
    /// Returns the next id for which `is_taken` is `false`.
    pub fn allocate(&mut self, is_taken: impl Fn(NodeId) -> bool) -> NodeId {
        loop {
            self.counter = self.counter.wrapping_add(1);
            let id = NodeId(self.counter);
            if !is_taken(id) {
                return id;
            }
        }
    }

    /// The last value handed out (or scanned past).
    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn set_counter(&mut self, counter: u32) {
        self.counter = counter;
    }

    pub fn reset(&mut self) {
        self.counter = 0;
    }
}

/// Builds the path segment for a child of `parent_path`.
pub fn child_path(parent_path: Option<&str>, name: &str, kind: NodeKind) -> String {
    match parent_path {
        None => format!("{PATH_ROOT}{name}"),
        Some(parent) => {
            let sep = if kind.is_component() { '#' } else { '/' };
            format!("{parent}{sep}{name}")
        }
    }
}

/// `id -> path` and `path -> id` maps.
///
/// Paths are only as unique as sibling names: when two nodes share a path,
/// the reverse entry points at whichever was indexed last.
#[derive(Debug, Default)]
pub struct PathIndex {
    id_to_path: HashMap<NodeId, String>,
    path_to_id: HashMap<String, NodeId>,
}

impl PathIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the path of `id`, replacing its previous one.
    pub fn insert(&mut self, id: NodeId, path: String) {
        self.remove(id);
        if let Some(previous) = self.path_to_id.insert(path.clone(), id)
            && previous != id
        {
            log::debug!("Path '{path}' now resolves to {id} instead of {previous}");
        }
        self.id_to_path.insert(id, path);
    }

    /// Drops the entries of `id`. The reverse entry is kept if another node
    /// has since claimed the same path.
    pub fn remove(&mut self, id: NodeId) -> Option<String> {
        let path = self.id_to_path.remove(&id)?;
        if self.path_to_id.get(&path) == Some(&id) {
            self.path_to_id.remove(&path);
        }
        Some(path)
    }

    pub fn path_of(&self, id: NodeId) -> Option<&str> {
        self.id_to_path.get(&id).map(String::as_str)
    }

    pub fn id_of(&self, path: &str) -> Option<NodeId> {
        self.path_to_id.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.id_to_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_path.is_empty()
    }

    pub fn clear(&mut self) {
        self.id_to_path.clear();
        self.path_to_id.clear();
    }
}
