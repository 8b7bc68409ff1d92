//! Undoable scene edits recorded by [`SceneEditor`](super::SceneEditor).
//!
//! Every action captures ids and serialized snapshots, never references, so
//! it survives the destruction and recreation of the nodes it mentions.

use tessera_core::abstract_editor::{EditAction, EditActionError, EditActionResult};
use tessera_core::math::{Transform, Vec3};

use super::SceneDocument;
use crate::node::{NodeId, NodeKind};
use crate::payload::PayloadData;
use crate::serializer::NodeDto;
use crate::store::Placement;

fn missing(id: NodeId) -> EditActionError {
    EditActionError::TargetNotFound(format!("node {id}"))
}

fn ensure_all_exist(doc: &SceneDocument, ids: &[NodeId]) -> EditActionResult {
    match ids.iter().find(|id| !doc.store.contains(**id)) {
        Some(id) => Err(missing(*id)),
        None => Ok(()),
    }
}

fn ensure_parent(doc: &SceneDocument, parent: Option<NodeId>) -> EditActionResult {
    match parent {
        Some(p) if !doc.store.contains(p) => Err(missing(p)),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// Undo destroys the created node; redo creates it again with a fresh id.
#[derive(Debug)]
pub struct CreateAction {
    pub(crate) id: NodeId,
    pub(crate) kind: NodeKind,
    pub(crate) params: PayloadData,
    pub(crate) parent: Option<NodeId>,
    /// Name given at creation; `None` keeps the default `<type_tag><id>`.
    pub(crate) name: Option<String>,
    pub(crate) description: String,
}

impl CreateAction {
    pub fn new(id: NodeId, kind: NodeKind, params: PayloadData, parent: Option<NodeId>) -> Self {
        Self {
            id,
            kind,
            params,
            parent,
            name: None,
            description: format!("Create {kind}"),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Id of the node most recently created by this action.
    pub fn id(&self) -> NodeId {
        self.id
    }
}

impl EditAction<SceneDocument> for CreateAction {
    fn apply(&mut self, doc: &mut SceneDocument) -> EditActionResult {
        ensure_parent(doc, self.parent)?;
        let id = doc.store.create(self.kind, &self.params, None);
        if let Some(name) = &self.name {
            doc.store.rename(id, name);
        }
        if !doc.store.add(id, self.parent, None) {
            doc.store.remove(id);
            return Err(EditActionError::InvalidState(format!("cannot attach new {}", self.kind)));
        }
        self.id = id;
        doc.selection.select(id, false);
        Ok(())
    }

    fn undo(&mut self, doc: &mut SceneDocument) -> EditActionResult {
        if !doc.store.remove(self.id) {
            return Err(missing(self.id));
        }
        doc.selection.deselect(self.id);
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn kind(&self) -> &str {
        "create"
    }
}

// ---------------------------------------------------------------------------
// Duplicate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub(crate) struct DuplicateEntry {
    /// Identity-stripped, local-space snapshot of the original.
    pub snapshot: NodeDto,
    pub original: NodeId,
    pub parent: Option<NodeId>,
    /// Id of the copy currently in the tree.
    pub copy: NodeId,
}

#[derive(Debug)]
pub struct DuplicateAction {
    pub(crate) entries: Vec<DuplicateEntry>,
    pub(crate) description: String,
}

impl DuplicateAction {
    pub(crate) fn new(entries: Vec<DuplicateEntry>) -> Self {
        let description = format!("Duplicate {} node(s)", entries.len());
        Self { entries, description }
    }

    pub fn copies(&self) -> Vec<NodeId> {
        self.entries.iter().map(|e| e.copy).collect()
    }
}

impl EditAction<SceneDocument> for DuplicateAction {
    fn apply(&mut self, doc: &mut SceneDocument) -> EditActionResult {
        for entry in &self.entries {
            ensure_parent(doc, entry.parent)?;
        }
        for entry in &mut self.entries {
            let before = if doc.store.contains(entry.original) {
                doc.store.next_sibling(entry.original)
            } else {
                None
            };
            entry.copy = doc.store.deserialize_at(&entry.snapshot, false, entry.parent, before);
        }
        doc.selection.set_selected(&self.copies());
        Ok(())
    }

    fn undo(&mut self, doc: &mut SceneDocument) -> EditActionResult {
        let copies = self.copies();
        ensure_all_exist(doc, &copies)?;
        for id in &copies {
            doc.store.remove(*id);
        }
        doc.selection.prune(&doc.store);
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn kind(&self) -> &str {
        "duplicate"
    }
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub(crate) struct DeletedEntry {
    /// Local-space snapshot with ids.
    pub snapshot: NodeDto,
    pub parent: Option<NodeId>,
    /// Sibling that followed the node when it was deleted.
    pub next_sibling: Option<NodeId>,
    /// Id of the node as last restored.
    pub id: NodeId,
}

/// Entries are recorded in deletion order; undo restores them in reverse.
#[derive(Debug)]
pub struct DeleteAction {
    pub(crate) entries: Vec<DeletedEntry>,
    pub(crate) description: String,
}

impl DeleteAction {
    pub(crate) fn new(entries: Vec<DeletedEntry>) -> Self {
        let description = format!("Delete {} node(s)", entries.len());
        Self { entries, description }
    }

    fn ids(&self) -> Vec<NodeId> {
        self.entries.iter().map(|e| e.id).collect()
    }
}

impl EditAction<SceneDocument> for DeleteAction {
    fn apply(&mut self, doc: &mut SceneDocument) -> EditActionResult {
        ensure_all_exist(doc, &self.ids())?;
        for entry in &self.entries {
            doc.store.remove(entry.id);
        }
        doc.selection.prune(&doc.store);
        Ok(())
    }

    fn undo(&mut self, doc: &mut SceneDocument) -> EditActionResult {
        if let Some(entry) = self
            .entries
            .iter()
            .find(|e| e.parent.is_some_and(|p| !doc.store.contains(p) && !self.restores(p)))
        {
            return Err(missing(entry.parent.unwrap_or(entry.id)));
        }
        for entry in self.entries.iter_mut().rev() {
            entry.id = doc.store.deserialize_at(&entry.snapshot, true, entry.parent, entry.next_sibling);
        }
        let restored = self.ids();
        doc.selection.set_selected(&restored);
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn kind(&self) -> &str {
        "delete"
    }
}

impl DeleteAction {
    /// Whether `id` is restored by this action before it is needed.
    fn restores(&self, id: NodeId) -> bool {
        self.entries.iter().any(|e| e.snapshot.contains_id(id.0))
    }
}

// ---------------------------------------------------------------------------
// Move
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub(crate) struct MoveEntry {
    pub id: NodeId,
    pub old_parent: Option<NodeId>,
    pub old_next_sibling: Option<NodeId>,
    pub old_transform: Transform,
    pub new_parent: Option<NodeId>,
    pub new_before: Option<NodeId>,
    pub new_transform: Transform,
}

/// Reparent of one or more nodes. Entries are replayed in order and
/// reverted in reverse.
#[derive(Debug)]
pub struct ReparentAction {
    pub(crate) entries: Vec<MoveEntry>,
    pub(crate) description: String,
}

impl ReparentAction {
    pub(crate) fn new(entries: Vec<MoveEntry>) -> Self {
        let description = format!("Move {} node(s)", entries.len());
        Self { entries, description }
    }
}

fn place(
    doc: &mut SceneDocument,
    id: NodeId,
    parent: Option<NodeId>,
    before: Option<NodeId>,
    transform: Transform,
) -> EditActionResult {
    if !doc.store.move_node_with(id, parent, before, Placement::KeepLocal) {
        return Err(EditActionError::InvalidState(format!("cannot move node {id}")));
    }
    doc.store.update(id, |node| node.transform = transform);
    Ok(())
}

impl EditAction<SceneDocument> for ReparentAction {
    fn apply(&mut self, doc: &mut SceneDocument) -> EditActionResult {
        let ids: Vec<_> = self.entries.iter().map(|e| e.id).collect();
        ensure_all_exist(doc, &ids)?;
        for entry in &self.entries {
            place(doc, entry.id, entry.new_parent, entry.new_before, entry.new_transform)?;
        }
        Ok(())
    }

    fn undo(&mut self, doc: &mut SceneDocument) -> EditActionResult {
        let ids: Vec<_> = self.entries.iter().map(|e| e.id).collect();
        ensure_all_exist(doc, &ids)?;
        for entry in self.entries.iter().rev() {
            place(doc, entry.id, entry.old_parent, entry.old_next_sibling, entry.old_transform)?;
        }
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn kind(&self) -> &str {
        "move"
    }
}

// ---------------------------------------------------------------------------
// Property edits
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct RenameAction {
    pub(crate) id: NodeId,
    pub(crate) old_name: String,
    pub(crate) new_name: String,
}

impl EditAction<SceneDocument> for RenameAction {
    fn apply(&mut self, doc: &mut SceneDocument) -> EditActionResult {
        if doc.store.rename(self.id, &self.new_name) { Ok(()) } else { Err(missing(self.id)) }
    }

    fn undo(&mut self, doc: &mut SceneDocument) -> EditActionResult {
        if doc.store.rename(self.id, &self.old_name) { Ok(()) } else { Err(missing(self.id)) }
    }

    fn description(&self) -> &str {
        "Rename"
    }

    fn kind(&self) -> &str {
        "rename"
    }
}

#[derive(Debug)]
pub struct VisibilityAction {
    /// Node ids with their visibility before the edit.
    pub(crate) previous: Vec<(NodeId, bool)>,
    pub(crate) visible: bool,
}

impl EditAction<SceneDocument> for VisibilityAction {
    fn apply(&mut self, doc: &mut SceneDocument) -> EditActionResult {
        let ids: Vec<_> = self.previous.iter().map(|(id, _)| *id).collect();
        ensure_all_exist(doc, &ids)?;
        for id in ids {
            doc.store.update(id, |node| node.visible = self.visible);
        }
        Ok(())
    }

    fn undo(&mut self, doc: &mut SceneDocument) -> EditActionResult {
        let ids: Vec<_> = self.previous.iter().map(|(id, _)| *id).collect();
        ensure_all_exist(doc, &ids)?;
        for (id, visible) in &self.previous {
            doc.store.update(*id, |node| node.visible = *visible);
        }
        Ok(())
    }

    fn description(&self) -> &str {
        if self.visible { "Show" } else { "Hide" }
    }

    fn kind(&self) -> &str {
        "visibility"
    }
}

/// Local position edit. Consecutive edits of the same node merge.
#[derive(Debug)]
pub struct TransformAction {
    pub(crate) id: NodeId,
    pub(crate) old_position: Vec3,
    pub(crate) new_position: Vec3,
}

impl EditAction<SceneDocument> for TransformAction {
    fn apply(&mut self, doc: &mut SceneDocument) -> EditActionResult {
        doc.store
            .update(self.id, |node| node.set_position(self.new_position))
            .ok_or_else(|| missing(self.id))
    }

    fn undo(&mut self, doc: &mut SceneDocument) -> EditActionResult {
        doc.store
            .update(self.id, |node| node.set_position(self.old_position))
            .ok_or_else(|| missing(self.id))
    }

    fn description(&self) -> &str {
        "Move position"
    }

    fn kind(&self) -> &str {
        "transform"
    }

    fn merge(
        &mut self,
        other: Box<dyn EditAction<SceneDocument>>,
    ) -> Option<Box<dyn EditAction<SceneDocument>>> {
        if let Some(other) = other.as_any().downcast_ref::<TransformAction>()
            && other.id == self.id
        {
            self.new_position = other.new_position;
            return None;
        }
        Some(other)
    }
}
