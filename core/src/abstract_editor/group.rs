//! Composite action that undoes and redoes several actions as one step.

use std::fmt;

use super::{EditAction, EditActionResult, Editable};

/// An ordered list of actions recorded between `begin_group` / `end_group`.
///
/// Undo runs the children in reverse order, redo in forward order. If a
/// child fails mid-way, the children already processed are rolled back so the
/// target is left as it was before the group call, and the error is returned.
pub struct ActionGroup<T: Editable> {
    description: String,
    actions: Vec<Box<dyn EditAction<T>>>,
}

impl<T: Editable> ActionGroup<T> {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            actions: Vec::new(),
        }
    }

    pub fn push(&mut self, action: Box<dyn EditAction<T>>) {
        self.actions.push(action);
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Descriptions of the children in recording order.
    pub fn child_descriptions(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.description()).collect()
    }
}

impl<T: Editable> fmt::Debug for ActionGroup<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionGroup")
            .field("description", &self.description)
            .field("actions", &self.actions)
            .finish()
    }
}

impl<T: Editable> EditAction<T> for ActionGroup<T> {
    fn apply(&mut self, target: &mut T) -> EditActionResult {
        for i in 0..self.actions.len() {
            if let Err(e) = self.actions[i].apply(target) {
                for done in self.actions[..i].iter_mut().rev() {
                    if let Err(rollback) = done.undo(target) {
                        log::error!(
                            "Group '{}': rollback of '{}' failed: {rollback}",
                            self.description,
                            done.description()
                        );
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    fn undo(&mut self, target: &mut T) -> EditActionResult {
        let len = self.actions.len();
        for i in (0..len).rev() {
            if let Err(e) = self.actions[i].undo(target) {
                for done in self.actions[i + 1..].iter_mut() {
                    if let Err(rollback) = done.apply(target) {
                        log::error!(
                            "Group '{}': rollback of '{}' failed: {rollback}",
                            self.description,
                            done.description()
                        );
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn kind(&self) -> &str {
        "group"
    }
}
