//! Clipboard and undoable editing operations on a scene.
//!
//! [`SceneEditor`] combines the [`NodeStore`], a [`Selection`] and an
//! [`EditActionHistory`]. Operations act on the current selection, mutate
//! the store, and record what they did as an [`EditAction`] so it can be
//! undone and redone.

mod commands;

pub use commands::{
    CreateAction, DeleteAction, DuplicateAction, ReparentAction, RenameAction, TransformAction, VisibilityAction,
};

use commands::{DeletedEntry, DuplicateEntry, MoveEntry};
use tessera_core::abstract_editor::{DEFAULT_MAX_UNDO, EditAction, EditActionHistory, EditActionResult, Editable};
use tessera_core::math::Vec3;

use crate::node::{NodeId, NodeKind};
use crate::payload::PayloadData;
use crate::selection::Selection;
use crate::serializer::{NodeDto, SerializeOptions, Space};
use crate::store::NodeStore;

/// The editing target: the scene tree plus what is selected in it.
#[derive(Debug, Default)]
pub struct SceneDocument {
    pub store: NodeStore,
    pub selection: Selection,
}

impl Editable for SceneDocument {}

/// Identity-stripped snapshots awaiting paste.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    snapshots: Vec<NodeDto>,
    is_cut: bool,
    /// Originals of a cut, removed on the next paste.
    cut_ids: Vec<NodeId>,
}

impl Clipboard {
    pub fn snapshots(&self) -> &[NodeDto] {
        &self.snapshots
    }

    pub fn is_cut(&self) -> bool {
        self.is_cut
    }

    pub fn cut_ids(&self) -> &[NodeId] {
        &self.cut_ids
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

pub struct SceneEditor {
    doc: SceneDocument,
    history: EditActionHistory<SceneDocument>,
    clipboard: Clipboard,
}

impl Default for SceneEditor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNDO)
    }
}

impl std::fmt::Debug for SceneEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneEditor")
            .field("doc", &self.doc)
            .field("history", &self.history)
            .field("clipboard", &self.clipboard.snapshots.len())
            .finish()
    }
}

impl SceneEditor {
    pub fn new(max_undo: usize) -> Self {
        Self::with_store(NodeStore::new(), max_undo)
    }

    pub fn with_store(store: NodeStore, max_undo: usize) -> Self {
        Self {
            doc: SceneDocument {
                store,
                selection: Selection::new(),
            },
            history: EditActionHistory::new(max_undo),
            clipboard: Clipboard::default(),
        }
    }

    pub fn store(&self) -> &NodeStore {
        &self.doc.store
    }

    /// Direct store access. Changes made here are not recorded.
    pub fn store_mut(&mut self) -> &mut NodeStore {
        &mut self.doc.store
    }

    pub fn selection(&self) -> &Selection {
        &self.doc.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.doc.selection
    }

    pub fn history(&self) -> &EditActionHistory<SceneDocument> {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut EditActionHistory<SceneDocument> {
        &mut self.history
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// Selected ids, minus those whose ancestor is also selected.
    fn top_level_selection(&self) -> Vec<NodeId> {
        let selected = self.doc.selection.selected();
        selected
            .iter()
            .copied()
            .filter(|id| self.doc.store.contains(*id))
            .filter(|id| !selected.iter().any(|other| self.doc.store.is_descendant(*id, *other)))
            .collect()
    }

    /// `false` if `id` or any of its descendants is protected from removal.
    fn is_removable(&self, id: NodeId) -> bool {
        let store = &self.doc.store;
        match store
            .descendants(id)
            .into_iter()
            .find(|d| store.get(*d).is_some_and(|n| n.flags.no_removing))
        {
            Some(protected) => {
                log::warn!("Node {protected} is protected from removal");
                false
            }
            None => store.contains(id),
        }
    }

    fn record(&mut self, action: Box<dyn EditAction<SceneDocument>>) {
        log::debug!("Recorded '{}'", action.description());
        self.history.push(action);
    }

    // ---------------------------------------------------------------------
    // Clipboard
    // ---------------------------------------------------------------------

    /// Copies the selection to the clipboard. Returns the number copied.
    pub fn copy(&mut self) -> usize {
        self.fill_clipboard(false)
    }

    /// Like [`copy`](Self::copy), but the originals are removed by the next
    /// paste. Cutting without pasting leaves the tree untouched.
    pub fn cut(&mut self) -> usize {
        self.fill_clipboard(true)
    }

    fn fill_clipboard(&mut self, is_cut: bool) -> usize {
        let ids = self.top_level_selection();
        if ids.is_empty() {
            log::warn!("Nothing selected to {}", if is_cut { "cut" } else { "copy" });
            return 0;
        }
        let snapshots = ids
            .iter()
            .filter_map(|id| self.doc.store.serialize(*id, true, false))
            .collect();
        // Protected subtrees are copied, never moved.
        let cut_ids = if is_cut {
            ids.into_iter().filter(|id| self.is_removable(*id)).collect()
        } else {
            Vec::new()
        };
        self.clipboard = Clipboard {
            snapshots,
            is_cut,
            cut_ids,
        };
        log::debug!("Clipboard holds {} node(s), cut: {is_cut}", self.clipboard.snapshots.len());
        self.clipboard.snapshots.len()
    }

    /// Pastes the clipboard at the root and selects the new nodes.
    ///
    /// A pending cut first removes its originals. Paste is not recorded in
    /// the history.
    pub fn paste(&mut self) -> Vec<NodeId> {
        self.paste_under(None)
    }

    /// Pastes the clipboard as children of `parent`, keeping world placement.
    pub fn paste_as_child(&mut self, parent: NodeId) -> Vec<NodeId> {
        let Some(target) = self.doc.store.get(parent) else {
            log::warn!("Paste target {parent} not found");
            return Vec::new();
        };
        if target.kind().is_component() {
            log::warn!("{} cannot have children", target.kind());
            return Vec::new();
        }
        let domain = target.domain();
        if self.clipboard.snapshots.iter().any(|s| s.kind.domain() != domain) {
            log::warn!("Clipboard content does not belong to the domain of {parent}");
            return Vec::new();
        }
        if self.clipboard.is_cut
            && self
                .clipboard
                .cut_ids
                .iter()
                .any(|c| *c == parent || self.doc.store.is_descendant(parent, *c))
        {
            log::warn!("Cannot paste cut nodes into their own subtree");
            return Vec::new();
        }
        self.paste_under(Some(parent))
    }

    fn paste_under(&mut self, parent: Option<NodeId>) -> Vec<NodeId> {
        if self.clipboard.is_empty() {
            log::warn!("Clipboard is empty");
            return Vec::new();
        }
        if self.clipboard.is_cut {
            for id in std::mem::take(&mut self.clipboard.cut_ids) {
                self.doc.store.remove(id);
            }
            self.clipboard.is_cut = false;
        }

        let mut pasted = Vec::with_capacity(self.clipboard.snapshots.len());
        for snapshot in &self.clipboard.snapshots {
            let id = self.doc.store.deserialize(snapshot, false, None);
            if let Some(p) = parent {
                self.doc.store.move_node(id, Some(p), None);
            }
            pasted.push(id);
        }
        self.doc.selection.prune(&self.doc.store);
        self.doc.selection.set_selected(&pasted);
        log::debug!("Pasted {} node(s)", pasted.len());
        pasted
    }

    // ---------------------------------------------------------------------
    // Recorded operations
    // ---------------------------------------------------------------------

    /// Duplicates the selection next to the originals and selects the copies.
    pub fn duplicate(&mut self) -> Vec<NodeId> {
        let ids = self.top_level_selection();
        if ids.is_empty() {
            log::warn!("Nothing selected to duplicate");
            return Vec::new();
        }
        let options = SerializeOptions {
            strip_identity: true,
            shallow: false,
            space: Space::Local,
        };
        let mut entries = Vec::with_capacity(ids.len());
        for original in ids {
            let Some(snapshot) = self.doc.store.serialize_with(original, options) else {
                continue;
            };
            let parent = self.doc.store.get(original).and_then(|n| n.parent());
            let before = self.doc.store.next_sibling(original);
            let copy = self.doc.store.deserialize_at(&snapshot, false, parent, before);
            entries.push(DuplicateEntry {
                snapshot,
                original,
                parent,
                copy,
            });
        }
        let action = DuplicateAction::new(entries);
        let copies = action.copies();
        self.doc.selection.set_selected(&copies);
        self.record(Box::new(action));
        copies
    }

    /// Deletes the selected nodes that are not protected. Returns the number
    /// of deleted subtrees.
    pub fn delete_selected(&mut self) -> usize {
        let mut ids = self.top_level_selection();
        ids.retain(|id| self.is_removable(*id));
        if ids.is_empty() {
            log::warn!("Nothing selected to delete");
            return 0;
        }

        let options = SerializeOptions {
            strip_identity: false,
            shallow: false,
            space: Space::Local,
        };
        let mut entries = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(snapshot) = self.doc.store.serialize_with(id, options) else {
                continue;
            };
            let parent = self.doc.store.get(id).and_then(|n| n.parent());
            let next_sibling = self.doc.store.next_sibling(id);
            self.doc.store.remove(id);
            entries.push(DeletedEntry {
                snapshot,
                parent,
                next_sibling,
                id,
            });
        }
        let count = entries.len();
        self.doc.selection.clear();
        self.record(Box::new(DeleteAction::new(entries)));
        count
    }

    /// Creates a node under `parent` (root if `None`) and selects it.
    ///
    /// Returns `None` if the parent is missing, a component, or of the other
    /// domain.
    pub fn create(&mut self, kind: NodeKind, params: PayloadData, parent: Option<NodeId>) -> Option<NodeId> {
        self.create_with_name(kind, params, parent, None)
    }

    /// Like [`create`](Self::create), naming the node `name` instead of
    /// `<type_tag><id>`. The name is part of the recorded action, so redo
    /// restores it.
    pub fn create_named(
        &mut self,
        kind: NodeKind,
        params: PayloadData,
        parent: Option<NodeId>,
        name: &str,
    ) -> Option<NodeId> {
        self.create_with_name(kind, params, parent, Some(name))
    }

    fn create_with_name(
        &mut self,
        kind: NodeKind,
        params: PayloadData,
        parent: Option<NodeId>,
        name: Option<&str>,
    ) -> Option<NodeId> {
        if let Some(p) = parent {
            let target = self.doc.store.get(p)?;
            if target.domain() != kind.domain() || target.kind().is_component() {
                log::warn!("Cannot create {kind} under {} {p}", target.kind());
                return None;
            }
        }
        let id = self.doc.store.create(kind, &params, None);
        if let Some(name) = name {
            self.doc.store.rename(id, name);
        }
        if !self.doc.store.add(id, parent, None) {
            self.doc.store.remove(id);
            return None;
        }
        self.doc.selection.select(id, false);
        let action = CreateAction::new(id, kind, params, parent);
        self.record(Box::new(match name {
            Some(name) => action.with_name(name),
            None => action,
        }));
        Some(id)
    }

    pub fn create_entity(&mut self, parent: Option<NodeId>) -> Option<NodeId> {
        self.create(NodeKind::Entity, PayloadData::default(), parent)
    }

    pub fn create_gui_container(&mut self, parent: Option<NodeId>) -> Option<NodeId> {
        self.create(NodeKind::GuiContainer, PayloadData::default(), parent)
    }

    pub fn create_gui_box(&mut self, parent: Option<NodeId>, width: f32, height: f32) -> Option<NodeId> {
        self.create(NodeKind::GuiBox, PayloadData::default().with_size(width, height), parent)
    }

    pub fn create_gui_text(&mut self, parent: Option<NodeId>, text: &str) -> Option<NodeId> {
        self.create(NodeKind::GuiText, PayloadData::default().with_text(text), parent)
    }

    pub fn create_go_container(&mut self, parent: Option<NodeId>) -> Option<NodeId> {
        self.create(NodeKind::GoContainer, PayloadData::default(), parent)
    }

    pub fn create_sprite(&mut self, parent: Option<NodeId>, width: f32, height: f32) -> Option<NodeId> {
        self.create(NodeKind::GoSprite, PayloadData::default().with_size(width, height), parent)
    }

    pub fn create_label(&mut self, parent: Option<NodeId>, text: &str) -> Option<NodeId> {
        self.create(NodeKind::GoLabel, PayloadData::default().with_text(text), parent)
    }

    /// Moves `ids` into `target` (`as_child`) or in front of the sibling
    /// `target`. `None` as a child target means the root.
    pub fn move_nodes(&mut self, ids: &[NodeId], target: Option<NodeId>, as_child: bool) -> bool {
        if !self.is_valid_action(target, ids, as_child, true) {
            return false;
        }
        let (parent, before) = match (as_child, target) {
            (true, t) => (t, None),
            (false, Some(t)) => (self.doc.store.get(t).and_then(|n| n.parent()), Some(t)),
            (false, None) => (None, None),
        };

        let mut entries = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(node) = self.doc.store.get(*id) else {
                continue;
            };
            let old_parent = node.parent();
            let old_transform = node.transform;
            let old_next_sibling = self.doc.store.next_sibling(*id);
            if !self.doc.store.move_node(*id, parent, before) {
                continue;
            }
            let Some(moved) = self.doc.store.get(*id) else {
                continue;
            };
            entries.push(MoveEntry {
                id: *id,
                old_parent,
                old_next_sibling,
                old_transform,
                new_parent: parent,
                new_before: before,
                new_transform: moved.transform,
            });
        }
        if entries.is_empty() {
            return false;
        }
        self.record(Box::new(ReparentAction::new(entries)));
        true
    }

    pub fn rename(&mut self, id: NodeId, name: &str) -> bool {
        let Some(node) = self.doc.store.get(id) else {
            log::warn!("Cannot rename {id}: not found");
            return false;
        };
        let action = RenameAction {
            id,
            old_name: node.name().to_string(),
            new_name: name.to_string(),
        };
        self.execute(Box::new(action)).is_ok()
    }

    pub fn set_visible(&mut self, ids: &[NodeId], visible: bool) -> bool {
        let previous: Vec<_> = ids
            .iter()
            .filter_map(|id| self.doc.store.get(*id))
            .map(|n| (n.id(), n.visible))
            .collect();
        if previous.is_empty() {
            return false;
        }
        self.execute(Box::new(VisibilityAction { previous, visible })).is_ok()
    }

    /// Sets the local position. Repeated calls on one node merge into a
    /// single undo step.
    pub fn set_position(&mut self, id: NodeId, position: Vec3) -> bool {
        let Some(node) = self.doc.store.get(id) else {
            log::warn!("Cannot move {id}: not found");
            return false;
        };
        let action = TransformAction {
            id,
            old_position: node.position(),
            new_position: position,
        };
        self.execute(Box::new(action)).is_ok()
    }

    fn execute(&mut self, action: Box<dyn EditAction<SceneDocument>>) -> EditActionResult {
        let result = self.history.execute(action, &mut self.doc);
        if let Err(e) = &result {
            log::error!("Edit failed: {e}");
        }
        result
    }

    // ---------------------------------------------------------------------
    // History
    // ---------------------------------------------------------------------

    pub fn undo(&mut self) -> EditActionResult {
        let result = self.history.undo(&mut self.doc);
        self.doc.selection.prune(&self.doc.store);
        result
    }

    pub fn redo(&mut self) -> EditActionResult {
        let result = self.history.redo(&mut self.doc);
        self.doc.selection.prune(&self.doc.store);
        result
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn begin_group(&mut self, description: &str) {
        self.history.begin_group(description);
    }

    pub fn end_group(&mut self) -> bool {
        self.history.end_group()
    }

    // ---------------------------------------------------------------------
    // Validation and scene lifecycle
    // ---------------------------------------------------------------------

    /// Checks whether `objects` may be pasted or moved relative to `target`.
    ///
    /// All nodes, `target` included, must share one domain. Nothing goes
    /// inside a component. For moves, `target` may not be one of `objects`
    /// or lie inside their subtrees.
    pub fn is_valid_action(&self, target: Option<NodeId>, objects: &[NodeId], as_child: bool, is_move: bool) -> bool {
        let store = &self.doc.store;
        if objects.is_empty() {
            log::warn!("No nodes given");
            return false;
        }
        let mut domains = Vec::with_capacity(objects.len() + 1);
        for id in objects.iter().chain(target.iter()) {
            match store.get(*id) {
                Some(node) => domains.push(node.domain()),
                None => {
                    log::warn!("Node {id} not found");
                    return false;
                }
            }
        }
        if domains.windows(2).any(|w| w[0] != w[1]) {
            log::warn!("Cannot mix GUI and GO nodes in one operation");
            return false;
        }
        if let Some(t) = target {
            if as_child && store.get(t).is_some_and(|n| n.kind().is_component()) {
                log::warn!("Node {t} cannot have children");
                return false;
            }
            if is_move && objects.iter().any(|o| *o == t || store.is_descendant(t, *o)) {
                log::warn!("Cannot move nodes into their own subtree");
                return false;
            }
        }
        true
    }

    /// Replaces the scene, clearing history and selection.
    pub fn load_scene(&mut self, scene: &[NodeDto]) {
        self.doc.store.load_scene(scene);
        self.doc.selection.clear();
        self.history.clear();
        self.history.mark_saved();
    }

    /// Imports `scene` under a new container. Not recorded.
    pub fn import_scene(&mut self, scene: &[NodeDto], name: &str) -> Option<NodeId> {
        let id = self.doc.store.import_scene(scene, name)?;
        self.doc.selection.select(id, false);
        Some(id)
    }

    pub fn save_scene(&self) -> Vec<NodeDto> {
        self.doc.store.save_scene()
    }

    pub fn mark_saved(&mut self) {
        self.history.mark_saved();
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.history.has_unsaved_changes()
    }
}
