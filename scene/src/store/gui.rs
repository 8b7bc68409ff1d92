//! GUI draw ordering and clip-rect propagation.
//!
//! GuiBox and GuiText nodes are numbered depth-first under their nearest
//! GuiContainer, so later siblings draw on top. A nested GuiContainer
//! numbers its own subtree. Clip rects are the intersection of the world
//! rects of every clipping GuiBox above a node.

use tessera_core::math::{self, Vec2, Vec3};

use super::NodeStore;
use crate::node::{Domain, NodeId, NodeKind, Rect};

impl NodeStore {
    /// Recomputes draw order and clip rects in the GUI scope containing `id`.
    ///
    /// Does nothing if the scope holds no GUI node.
    pub(crate) fn refresh_gui_around(&mut self, id: NodeId) {
        let Some(scope) = self.gui_scope(id) else {
            return;
        };
        let members = self.descendants(scope);
        let has_gui = members
            .iter()
            .filter_map(|m| self.nodes.get(m))
            .any(|n| n.domain() == Domain::Gui);
        if !has_gui {
            return;
        }
        self.assign_render_order(scope);
        let inherited = self.inherited_clip(scope);
        self.propagate_clip(scope, inherited);
    }

    /// Nearest GuiContainer at or above `id`, else the root of its tree.
    fn gui_scope(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.nodes.get(&id)?;
        loop {
            if current.kind() == NodeKind::GuiContainer {
                return Some(current.id);
            }
            match current.parent.and_then(|p| self.nodes.get(&p)) {
                Some(parent) => current = parent,
                None => return Some(current.id),
            }
        }
    }

    fn assign_render_order(&mut self, scope: NodeId) {
        let mut order = Vec::new();
        self.collect_drawables(scope, true, &mut order);
        for (i, nid) in order.into_iter().enumerate() {
            if let Some(node) = self.nodes.get_mut(&nid) {
                node.render_order = Some(i as u32);
            }
        }
    }

    fn collect_drawables(&mut self, id: NodeId, is_scope: bool, out: &mut Vec<NodeId>) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if !is_scope && node.kind() == NodeKind::GuiContainer {
            self.assign_render_order(id);
            return;
        }
        if node.kind().is_gui_drawable() {
            out.push(id);
        }
        for child in node.children.clone() {
            self.collect_drawables(child, false, out);
        }
    }

    fn inherited_clip(&self, id: NodeId) -> Option<Rect> {
        let parent = self.nodes.get(&id)?.parent?;
        let parent_node = self.nodes.get(&parent)?;
        self.combine_clip(parent, parent_node.clip_rect)
    }

    /// Clip passed down to the children of `id`.
    fn combine_clip(&self, id: NodeId, own: Option<Rect>) -> Option<Rect> {
        let node = self.nodes.get(&id)?;
        if node.kind() == NodeKind::GuiBox && node.payload.clips_children() {
            let rect = self.world_rect(id)?;
            return Some(match own {
                Some(clip) => clip.intersect(&rect),
                None => rect,
            });
        }
        own
    }

    fn propagate_clip(&mut self, id: NodeId, clip: Option<Rect>) {
        let children = match self.nodes.get_mut(&id) {
            Some(node) => {
                node.clip_rect = clip;
                node.children.clone()
            }
            None => return,
        };
        let passed = self.combine_clip(id, clip);
        for child in children {
            self.propagate_clip(child, passed);
        }
    }

    /// Axis-aligned world bounds of a sized node, honoring its pivot.
    pub fn world_rect(&self, id: NodeId) -> Option<Rect> {
        let node = self.nodes.get(&id)?;
        let size = node.payload.size()?;
        let pivot = node.payload.pivot().unwrap_or(Vec2::new(0.5, 0.5));
        let world = self.world_matrix(id)?;
        let min = Vec2::new(-pivot.x * size.x, -pivot.y * size.y);
        let max = min + size;
        let corners = [
            Vec3::new(min.x, min.y, 0.0),
            Vec3::new(max.x, min.y, 0.0),
            Vec3::new(min.x, max.y, 0.0),
            Vec3::new(max.x, max.y, 0.0),
        ]
        .map(|c| math::transform_point(&world, c));
        let mut lo = Vec2::new(f32::INFINITY, f32::INFINITY);
        let mut hi = Vec2::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for c in corners {
            lo = Vec2::new(lo.x.min(c.x), lo.y.min(c.y));
            hi = Vec2::new(hi.x.max(c.x), hi.y.max(c.y));
        }
        Some(Rect::new(lo, hi))
    }
}
