//! Render attachment capability consumed by the store.

use crate::node::{Node, NodeId};

/// Receives tree lifecycle notifications so a renderer can mirror the scene.
///
/// The store owns its host; pass one to
/// [`NodeStore::with_host`](crate::NodeStore::with_host).
pub trait RenderHost {
    /// A node was attached under `parent` (`None` is the root container).
    fn on_attached(&mut self, _node: &Node, _parent: Option<NodeId>) {}

    /// A node is being destroyed; free its graphics resources.
    fn dispose(&mut self, node: &Node);
}

/// Host for headless stores.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl RenderHost for NullHost {
    fn dispose(&mut self, _node: &Node) {}
}
