//! Undo/redo action history.
//!
//! [`EditActionHistory`] manages a linear undo/redo stack of [`EditAction`] trait
//! objects. When a new action is pushed after undoing, the redo stack is
//! cleared (standard editor behavior).
//!
//! Actions pushed between [`begin_group`](EditActionHistory::begin_group) and
//! [`end_group`](EditActionHistory::end_group) are buffered and committed as
//! a single [`ActionGroup`]. Groups nest: closing an inner group appends the
//! composite to the enclosing one.

use std::collections::VecDeque;
use std::fmt;

use super::action::{EditAction, EditActionError, EditActionResult, Editable};
use super::group::ActionGroup;

/// Default maximum number of undo steps.
pub const DEFAULT_MAX_UNDO: usize = 100;

/// Manages an undo/redo stack of editor actions.
///
/// The undo stack is a bounded [`VecDeque`]; when it exceeds `max_undo`,
/// the oldest action is dropped from the front. The redo stack is an
/// unbounded [`Vec`] (it is cleared on every new push).
///
/// `undo` and `redo` take `&mut self`, so an action callback can never
/// re-enter the history it is being replayed from.
///
/// # Example
///
/// ```ignore
/// let mut history = EditActionHistory::new(50);
/// let mut target = MyScene::new();
///
/// // Execute and record an action
/// history.execute(Box::new(my_action), &mut target).unwrap();
///
/// // Undo the last action
/// history.undo(&mut target).unwrap();
///
/// // Redo it
/// history.redo(&mut target).unwrap();
/// ```
pub struct EditActionHistory<T: Editable> {
    undo_stack: VecDeque<Box<dyn EditAction<T>>>,
    redo_stack: Vec<Box<dyn EditAction<T>>>,
    /// Open groups, innermost last.
    groups: Vec<ActionGroup<T>>,
    max_undo: usize,
    /// Tracks distance from the saved state.
    ///
    /// - `Some(0)`: the current state matches the last save.
    /// - `Some(n)` where `n > 0`: `n` undos needed to reach the saved state.
    /// - `Some(n)` where `n < 0`: `|n|` redos needed to reach the saved state.
    /// - `None`: the save point is permanently unreachable (capacity
    ///   overflow dropped it, or the redo branch was discarded).
    save_distance: Option<i64>,
}

impl<T: Editable> EditActionHistory<T> {
    /// Creates a new empty action history with the given maximum undo depth.
    ///
    /// When the undo stack exceeds `max_undo`, the oldest action is dropped.
    pub fn new(max_undo: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            groups: Vec::new(),
            max_undo,
            save_distance: Some(0),
        }
    }

    /// Applies an action to the target and records it with [`push`](Self::push).
    ///
    /// If the action fails, it is not recorded and the error is returned.
    pub fn execute(&mut self, mut action: Box<dyn EditAction<T>>, target: &mut T) -> EditActionResult {
        action.apply(target)?;
        self.push(action);
        Ok(())
    }

    /// Records an action whose effect has already been applied.
    ///
    /// While a group is open the action is buffered into the innermost
    /// group. Otherwise it clears the redo stack, tries to
    /// [merge](EditAction::merge) with the top of the undo stack, and is
    /// pushed, evicting the oldest entry past `max_undo`.
    pub fn push(&mut self, action: Box<dyn EditAction<T>>) {
        if let Some(group) = self.groups.last_mut() {
            log::trace!("Buffered '{}' into group '{}'", action.description(), group.description());
            group.push(action);
            return;
        }
        self.record(action);
    }

    fn record(&mut self, mut action: Box<dyn EditAction<T>>) {
        // Clearing the redo stack invalidates a save point that was in redo.
        self.redo_stack.clear();
        if let Some(d) = self.save_distance
            && d < 0
        {
            self.save_distance = None;
        }

        if let Some(last) = self.undo_stack.back_mut() {
            match last.merge(action) {
                None => {
                    // Merged into the top entry; if that entry was the save
                    // point, the save is now invalidated.
                    if self.save_distance == Some(0) {
                        self.save_distance = None;
                    }
                    return;
                }
                Some(returned) => action = returned,
            }
        }

        if let Some(d) = &mut self.save_distance {
            *d += 1;
        }
        self.undo_stack.push_back(action);
        self.enforce_capacity();
    }

    fn enforce_capacity(&mut self) {
        while self.undo_stack.len() > self.max_undo {
            if let Some(dropped) = self.undo_stack.pop_front() {
                log::debug!("History full, dropped '{}'", dropped.description());
            }
            // If the save point was beyond the oldest surviving entry, it's gone.
            if let Some(d) = self.save_distance
                && d > self.undo_stack.len() as i64
            {
                self.save_distance = None;
            }
        }
    }

    /// Undoes the most recent action.
    ///
    /// Returns [`EditActionError::NothingToUndo`] on an empty stack. If the
    /// action's undo fails, the failure is logged, the action is put back on
    /// the undo stack so the user can retry, and the error is returned.
    pub fn undo(&mut self, target: &mut T) -> EditActionResult {
        self.ensure_no_open_group("undo")?;
        let mut action = self.undo_stack.pop_back().ok_or(EditActionError::NothingToUndo)?;
        if let Err(e) = action.undo(target) {
            log::error!("Undo of '{}' failed: {e}", action.description());
            self.undo_stack.push_back(action);
            return Err(e);
        }
        self.redo_stack.push(action);
        if let Some(d) = &mut self.save_distance {
            *d -= 1;
        }
        Ok(())
    }

    /// Redoes the most recently undone action.
    ///
    /// Returns [`EditActionError::NothingToRedo`] on an empty stack. A failed
    /// redo is logged and the action stays on the redo stack.
    pub fn redo(&mut self, target: &mut T) -> EditActionResult {
        self.ensure_no_open_group("redo")?;
        let mut action = self.redo_stack.pop().ok_or(EditActionError::NothingToRedo)?;
        if let Err(e) = action.apply(target) {
            log::error!("Redo of '{}' failed: {e}", action.description());
            self.redo_stack.push(action);
            return Err(e);
        }
        self.undo_stack.push_back(action);
        if let Some(d) = &mut self.save_distance {
            *d += 1;
        }
        self.enforce_capacity();
        Ok(())
    }

    fn ensure_no_open_group(&self, op: &str) -> EditActionResult {
        match self.groups.last() {
            Some(group) => Err(EditActionError::InvalidState(format!(
                "cannot {op} while group '{}' is open",
                group.description()
            ))),
            None => Ok(()),
        }
    }

    /// Opens a group. Subsequent pushes are buffered until [`end_group`](Self::end_group).
    ///
    /// Opening a group while another is open nests it inside the outer one.
    pub fn begin_group(&mut self, description: impl Into<String>) {
        let description = description.into();
        if let Some(outer) = self.groups.last() {
            log::warn!("Group '{description}' opened inside '{}'", outer.description());
        }
        self.groups.push(ActionGroup::new(description));
    }

    /// Closes the innermost group and commits it as one composite entry.
    ///
    /// An empty group is discarded. Returns `true` if a composite was
    /// recorded.
    pub fn end_group(&mut self) -> bool {
        let Some(group) = self.groups.pop() else {
            log::warn!("end_group called without an open group");
            return false;
        };
        if group.is_empty() {
            log::debug!("Discarded empty group '{}'", group.description());
            return false;
        }
        self.push(Box::new(group));
        true
    }

    /// Returns `true` while at least one group is open.
    pub fn is_grouping(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Returns `true` if there are actions that can be undone.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns `true` if there are actions that can be redone.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Returns an iterator over undo action descriptions, most recent first.
    pub fn undo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.undo_stack.iter().rev().map(|a| a.description())
    }

    /// Returns an iterator over redo action descriptions, most recent first.
    pub fn redo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.redo_stack.iter().rev().map(|a| a.description())
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_undo(&self) -> usize {
        self.max_undo
    }

    /// Records the current state as the saved state.
    ///
    /// After calling this, [`has_unsaved_changes`](Self::has_unsaved_changes)
    /// returns `false` until the history is modified by push, undo, or redo.
    pub fn mark_saved(&mut self) {
        self.save_distance = Some(0);
    }

    /// Returns `true` if the current state differs from the last saved state.
    pub fn has_unsaved_changes(&self) -> bool {
        self.save_distance != Some(0)
    }

    /// Clears both stacks and drops any open groups.
    ///
    /// If the current state was the saved state it remains so; otherwise the
    /// save point is permanently lost.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.groups.clear();
        if self.save_distance != Some(0) {
            self.save_distance = None;
        }
    }
}

impl<T: Editable> Default for EditActionHistory<T> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNDO)
    }
}

impl<T: Editable> fmt::Debug for EditActionHistory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditActionHistory")
            .field("undo_count", &self.undo_stack.len())
            .field("redo_count", &self.redo_stack.len())
            .field("open_groups", &self.groups.len())
            .field("max_undo", &self.max_undo)
            .field("save_distance", &self.save_distance)
            .finish()
    }
}
