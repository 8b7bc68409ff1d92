//! The scene-object store: an arena of nodes indexed by id.
//!
//! [`NodeStore`] owns every live node, the root list, the id allocator and
//! the path index. Parent and child links are ids, never references, so
//! the tree can be edited freely without ownership cycles.
//!
//! Expected failures (missing nodes, cycles) are logged and reported as
//! `false` / `None`; no tree operation panics or returns an error.

mod gui;

use std::collections::HashMap;
use std::fmt;

use tessera_core::math::{self, Mat4, Transform, Vec2, Vec3};

use crate::host::{NullHost, RenderHost};
use crate::index::{IdAllocator, PathIndex, child_path};
use crate::node::{Node, NodeId, NodeKind};
use crate::payload::PayloadData;

/// How a moved node's local transform is adjusted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Placement {
    /// Keep the node's world position and visual size.
    #[default]
    KeepWorld,
    /// Keep the local transform as is (used when rebuilding from snapshots).
    KeepLocal,
}

/// One row of [`NodeStore::graph`].
#[derive(Debug, Clone, PartialEq)]
pub struct GraphEntry {
    pub id: NodeId,
    pub parent_id: Option<NodeId>,
    pub name: String,
    pub visible: bool,
    pub kind: NodeKind,
}

pub struct NodeStore {
    nodes: HashMap<NodeId, Node>,
    roots: Vec<NodeId>,
    ids: IdAllocator,
    paths: PathIndex,
    host: Box<dyn RenderHost>,
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NodeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeStore")
            .field("nodes", &self.nodes.len())
            .field("roots", &self.roots)
            .field("id_counter", &self.ids.counter())
            .finish()
    }
}

impl NodeStore {
    /// Creates an empty headless store.
    pub fn new() -> Self {
        Self::with_host(Box::new(NullHost))
    }

    /// Creates an empty store that reports attach/dispose events to `host`.
    pub fn with_host(host: Box<dyn RenderHost>) -> Self {
        Self {
            nodes: HashMap::new(),
            roots: Vec::new(),
            ids: IdAllocator::default(),
            paths: PathIndex::new(),
            host,
        }
    }

    // ---------------------------------------------------------------------
    // Creation and structure
    // ---------------------------------------------------------------------

    /// Creates a detached node and returns the id actually assigned.
    ///
    /// An `explicit_id` that is already in use is replaced by a fresh id and
    /// the collision is logged. The node is named `<type_tag><id>` and
    /// becomes part of the tree on the first [`add`](Self::add) or
    /// [`move_node`](Self::move_node).
    pub fn create(&mut self, kind: NodeKind, params: &PayloadData, explicit_id: Option<NodeId>) -> NodeId {
        let id = match explicit_id {
            Some(id) if self.nodes.contains_key(&id) => {
                let fresh = self.allocate_id();
                log::error!("Node with id {id} already exists, assigned {fresh}");
                fresh
            }
            Some(id) => id,
            None => self.allocate_id(),
        };
        self.nodes.insert(id, Node::new(id, kind, params));
        id
    }

    fn allocate_id(&mut self) -> NodeId {
        let nodes = &self.nodes;
        self.ids.allocate(|id| nodes.contains_key(&id))
    }

    /// Attaches `id` under `parent` (root if `None`), before `before` or last.
    pub fn add(&mut self, id: NodeId, parent: Option<NodeId>, before: Option<NodeId>) -> bool {
        self.move_node(id, parent, before)
    }

    /// Reparents `id`, keeping its world position and visual size.
    pub fn move_node(&mut self, id: NodeId, parent: Option<NodeId>, before: Option<NodeId>) -> bool {
        self.move_node_with(id, parent, before, Placement::KeepWorld)
    }

    /// Reparents `id` under `parent`, inserting it before the sibling
    /// `before` (or last).
    ///
    /// Rejected, with no state change, if `id` or `parent` is missing or if
    /// `parent` lies inside the subtree of `id`.
    pub fn move_node_with(
        &mut self,
        id: NodeId,
        parent: Option<NodeId>,
        before: Option<NodeId>,
        placement: Placement,
    ) -> bool {
        let Some(node) = self.nodes.get(&id) else {
            log::error!("Cannot move node {id}: not found");
            return false;
        };
        let was_attached = node.attached;
        let old_parent = node.parent;

        if let Some(p) = parent {
            if !self.nodes.contains_key(&p) {
                log::error!("Cannot move node {id}: parent {p} not found");
                return false;
            }
            if p == id || self.is_descendant(p, id) {
                log::error!("Cannot move node {id} under {p}: target is inside its own subtree");
                return false;
            }
        }

        let world = self.world_matrix_or_identity(id);
        let world_position = math::transform_point(&world, Vec3::zeros());
        let world_scale = math::matrix_scale_2d(&world);

        let old_index = if was_attached {
            self.siblings(old_parent).iter().position(|c| *c == id)
        } else {
            None
        };
        let new_siblings = self.siblings(parent);
        let mut index = match before {
            Some(b) => match new_siblings.iter().position(|c| *c == b) {
                Some(i) => i,
                None => {
                    log::warn!("Sibling {b} is not a child of the target, appending {id}");
                    new_siblings.len()
                }
            },
            None => new_siblings.len(),
        };
        if was_attached
            && old_parent == parent
            && let Some(old) = old_index
            && index > old
        {
            index -= 1;
        }

        self.detach(id);
        match parent {
            Some(p) => {
                if let Some(parent_node) = self.nodes.get_mut(&p) {
                    let index = index.min(parent_node.children.len());
                    parent_node.children.insert(index, id);
                }
            }
            None => {
                let index = index.min(self.roots.len());
                self.roots.insert(index, id);
            }
        }

        let parent_world = parent.map_or_else(Mat4::identity, |p| self.world_matrix_or_identity(p));
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        node.parent = parent;
        node.attached = true;

        if placement == Placement::KeepWorld {
            match parent_world.try_inverse() {
                Some(inverse) => node.transform.position = math::transform_point(&inverse, world_position),
                None => log::warn!("Parent of {id} has a singular transform, keeping local position"),
            }
            if was_attached {
                let parent_scale = math::matrix_scale_2d(&parent_world);
                node.transform.scale = Vec2::new(
                    ratio(world_scale.x, parent_scale.x),
                    ratio(world_scale.y, parent_scale.y),
                );
            }
        }

        self.reindex_subtree(id);
        if let Some(node) = self.nodes.get(&id) {
            self.host.on_attached(node, parent);
        }
        if let Some(old) = old_parent
            && old_parent != parent
        {
            self.refresh_gui_around(old);
        }
        self.refresh_gui_around(id);
        true
    }

    /// Unlinks `id` from its parent or the root list. The node stays alive.
    fn detach(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        let parent = node.parent.take();
        let was_attached = std::mem::replace(&mut node.attached, false);
        match parent {
            Some(p) => {
                if let Some(parent_node) = self.nodes.get_mut(&p) {
                    parent_node.children.retain(|c| *c != id);
                }
            }
            None if was_attached => self.roots.retain(|r| *r != id),
            None => {}
        }
    }

    /// Destroys `id` and its whole subtree.
    ///
    /// The render host's dispose hook runs for every destroyed node, parents
    /// before children, and their index entries are erased.
    pub fn remove(&mut self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get(&id) else {
            log::warn!("Cannot remove node {id}: not found");
            return false;
        };
        let parent = node.parent;
        let doomed = self.descendants(id);
        self.detach(id);
        for nid in doomed {
            self.paths.remove(nid);
            if let Some(node) = self.nodes.remove(&nid) {
                self.host.dispose(&node);
            }
        }
        if let Some(p) = parent {
            self.refresh_gui_around(p);
        }
        true
    }

    /// Destroys every node and resets the id counter.
    pub fn clear(&mut self) {
        for root in self.roots.clone() {
            self.remove(root);
        }
        for (_, node) in self.nodes.drain() {
            self.host.dispose(&node);
        }
        self.roots.clear();
        self.paths.clear();
        self.ids.reset();
    }

    /// Renames `id`; paths of the node and its descendants follow.
    pub fn rename(&mut self, id: NodeId, name: &str) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            log::warn!("Cannot rename node {id}: not found");
            return false;
        };
        node.name = name.to_string();
        if node.attached {
            self.reindex_subtree(id);
        }
        true
    }

    /// Mutates a node in place, then refreshes GUI draw state around it.
    ///
    /// Returns `None` if the node does not exist.
    pub fn update<R>(&mut self, id: NodeId, f: impl FnOnce(&mut Node) -> R) -> Option<R> {
        let node = self.nodes.get_mut(&id)?;
        let result = f(node);
        self.refresh_gui_around(id);
        Some(result)
    }

    fn reindex_subtree(&mut self, id: NodeId) {
        let parent_path = self
            .nodes
            .get(&id)
            .and_then(|n| n.parent)
            .and_then(|p| self.paths.path_of(p))
            .map(str::to_owned);
        let mut stack = vec![(id, parent_path)];
        while let Some((nid, parent_path)) = stack.pop() {
            let Some(node) = self.nodes.get(&nid) else {
                continue;
            };
            let path = child_path(parent_path.as_deref(), &node.name, node.kind());
            for child in node.children.iter().rev() {
                stack.push((*child, Some(path.clone())));
            }
            self.paths.insert(nid, path);
        }
    }

    // ---------------------------------------------------------------------
    // Lookup
    // ---------------------------------------------------------------------

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get_by_path(&self, path: &str) -> Option<&Node> {
        self.paths.id_of(path).and_then(|id| self.nodes.get(&id))
    }

    /// First node with `name` in pre-order. Scans the whole tree.
    pub fn get_by_name(&self, name: &str) -> Option<&Node> {
        self.walk()
            .into_iter()
            .filter_map(|id| self.nodes.get(&id))
            .find(|n| n.name == name)
    }

    pub fn path_of(&self, id: NodeId) -> Option<&str> {
        self.paths.path_of(id)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Number of live nodes, detached ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn id_counter(&self) -> u32 {
        self.ids.counter()
    }

    pub fn set_id_counter(&mut self, counter: u32) {
        self.ids.set_counter(counter);
    }

    fn siblings(&self, parent: Option<NodeId>) -> &[NodeId] {
        match parent {
            Some(p) => self.nodes.get(&p).map_or(&[][..], |n| n.children.as_slice()),
            None => &self.roots,
        }
    }

    /// Position of `id` among its siblings.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let node = self.nodes.get(&id)?;
        if !node.attached {
            return None;
        }
        self.siblings(node.parent).iter().position(|c| *c == id)
    }

    /// The sibling that follows `id`, if any.
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let index = self.index_in_parent(id)?;
        let parent = self.nodes.get(&id)?.parent;
        self.siblings(parent).get(index + 1).copied()
    }

    /// Returns `true` if `ancestor` is a strict ancestor of `node`.
    pub fn is_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.nodes.get(&node).and_then(|n| n.parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(&id).and_then(|n| n.parent);
        }
        false
    }

    /// `id` followed by all of its descendants, in pre-order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(nid) = stack.pop() {
            let Some(node) = self.nodes.get(&nid) else {
                continue;
            };
            out.push(nid);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Every attached node, in pre-order over the roots.
    pub fn walk(&self) -> Vec<NodeId> {
        self.roots.iter().flat_map(|r| self.descendants(*r)).collect()
    }

    /// Flat pre-order listing of the tree.
    pub fn graph(&self) -> Vec<GraphEntry> {
        self.walk()
            .into_iter()
            .filter_map(|id| self.nodes.get(&id))
            .map(|n| GraphEntry {
                id: n.id,
                parent_id: n.parent,
                name: n.name.clone(),
                visible: n.visible,
                kind: n.kind(),
            })
            .collect()
    }

    /// Indented text dump of the tree, one node per line.
    pub fn debug_graph(&self) -> String {
        let mut out = String::new();
        for root in &self.roots {
            self.debug_graph_into(*root, 0, &mut out);
        }
        out
    }

    fn debug_graph_into(&self, id: NodeId, level: usize, out: &mut String) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&"   ".repeat(level));
        out.push(' ');
        out.push_str(&node.name);
        for child in &node.children {
            self.debug_graph_into(*child, level + 1, out);
        }
    }

    // ---------------------------------------------------------------------
    // World transforms
    // ---------------------------------------------------------------------

    /// Local-to-world matrix of `id`, composed through its ancestors.
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let mut node = self.nodes.get(&id)?;
        let mut matrix = node.transform.to_matrix();
        while let Some(parent) = node.parent.and_then(|p| self.nodes.get(&p)) {
            matrix = parent.transform.to_matrix() * matrix;
            node = parent;
        }
        Some(matrix)
    }

    fn world_matrix_or_identity(&self, id: NodeId) -> Mat4 {
        self.world_matrix(id).unwrap_or_else(Mat4::identity)
    }

    pub fn world_position(&self, id: NodeId) -> Option<Vec3> {
        self.world_matrix(id).map(|m| math::transform_point(&m, Vec3::zeros()))
    }

    pub fn world_scale(&self, id: NodeId) -> Option<Vec2> {
        self.world_matrix(id).map(|m| math::matrix_scale_2d(&m))
    }

    /// World transform of `id` decomposed into position, rotation and 2D scale.
    pub fn world_transform(&self, id: NodeId) -> Option<Transform> {
        let (scale, rotation, position) = math::to_scale_rotation_translation(&self.world_matrix(id)?);
        Some(Transform {
            position,
            rotation,
            scale: Vec2::new(scale.x, scale.y),
        })
    }
}

fn ratio(value: f32, divisor: f32) -> f32 {
    if divisor == 0.0 { value } else { value / divisor }
}
