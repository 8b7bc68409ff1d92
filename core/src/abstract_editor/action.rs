//! Editable targets and reversible editor actions.
//!
//! This module defines the core abstractions for the undo/redo system:
//!
//! - [`Editable`] - marker trait for types that can be edited
//! - [`EditAction`] - a reversible edit operation
//! - [`EditActionError`] / [`EditActionResult`] - error handling for actions
//!
//! An action owns the payload it captured when it was recorded (ids, old and
//! new values, serialized snapshots). It never holds live references into the
//! target, so it stays valid after the objects it mentions are destroyed and
//! later recreated by undo or redo.

use std::any::Any;
use std::fmt;

use thiserror::Error;

/// Helper trait for downcasting trait objects to concrete types.
///
/// Automatically implemented for all `'static` types. Used by
/// [`EditAction::merge`] to downcast `&dyn EditAction<T>` to the
/// concrete action type for merging.
pub trait AsAny: 'static {
    /// Returns a reference to `self` as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl<T: 'static> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Marker trait for types that serve as editing targets.
///
/// Implement this on the document that actions operate on, e.g. a scene
/// store together with its selection.
pub trait Editable: 'static {}

/// Error type for action execution failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditActionError {
    /// The target object was not found.
    #[error("target not found: {0}")]
    TargetNotFound(String),
    /// The target is in an invalid state for this action.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// `undo` was requested with an empty undo stack.
    #[error("nothing to undo")]
    NothingToUndo,
    /// `redo` was requested with an empty redo stack.
    #[error("nothing to redo")]
    NothingToRedo,
    /// A custom error with a description.
    #[error("{0}")]
    Custom(String),
}

/// Result type for action operations.
pub type EditActionResult<T = ()> = Result<T, EditActionError>;

/// A reversible editor action.
///
/// `apply` is the redo direction and `undo` its inverse; the pair must be
/// mutual inverses over the captured payload. An action may be recorded
/// after its effect has already happened (see
/// [`EditActionHistory::push`](super::EditActionHistory::push)), in which
/// case `apply` is only called on redo.
///
/// # Merging
///
/// Actions that represent incremental changes (e.g. each step of a drag) can
/// override [`merge`](Self::merge) so that consecutive actions coalesce into
/// one undo step. Use [`AsAny::as_any`] on the `other` action to downcast it.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug)]
/// struct RenameNode {
///     id: NodeId,
///     old_name: String,
///     new_name: String,
/// }
///
/// impl EditAction<SceneDocument> for RenameNode {
///     fn apply(&mut self, doc: &mut SceneDocument) -> EditActionResult {
///         doc.store.rename(self.id, &self.new_name);
///         Ok(())
///     }
///
///     fn undo(&mut self, doc: &mut SceneDocument) -> EditActionResult {
///         doc.store.rename(self.id, &self.old_name);
///         Ok(())
///     }
///
///     fn description(&self) -> &str {
///         "Rename node"
///     }
/// }
/// ```
pub trait EditAction<T: Editable>: fmt::Debug + AsAny + Send {
    /// Applies the action to the target (forward / redo direction).
    fn apply(&mut self, target: &mut T) -> EditActionResult;

    /// Reverses the action (undo direction).
    ///
    /// Must restore the target to the state before [`apply`](Self::apply)
    /// was called.
    fn undo(&mut self, target: &mut T) -> EditActionResult;

    /// A short, human-readable description for display in the edit menu.
    fn description(&self) -> &str;

    /// Stable type tag, e.g. `"create"`, `"delete"`, `"group"`.
    fn kind(&self) -> &str {
        "action"
    }

    /// Tries to merge `other` into `self`, taking ownership.
    ///
    /// If the actions are compatible, `self` absorbs `other`'s effect and
    /// returns `None`. Otherwise returns `Some(other)` back to the caller.
    ///
    /// Returns `Some(other)` by default (no merging).
    fn merge(&mut self, other: Box<dyn EditAction<T>>) -> Option<Box<dyn EditAction<T>>> {
        Some(other)
    }
}
