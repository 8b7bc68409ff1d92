//! Abstract editor framework for reversible editing operations.
//!
//! This module provides the foundational traits and types for building
//! an undo/redo-capable editor system. It is decoupled from specific
//! editable types so that higher-level crates (the scene store) can
//! implement concrete actions.
//!
//! - [`Editable`] - marker trait for types that can be edited
//! - [`EditAction`] - an edit operation (Command pattern)
//! - [`ActionGroup`] - several actions undone and redone as one step
//! - [`EditActionHistory`] - bounded undo/redo stack with grouping
//!
//! # Recording after the fact
//!
//! Most editor operations mutate the document first and only then know what
//! to record (e.g. the ids a paste allocated). Such callers use
//! [`EditActionHistory::push`] instead of [`EditActionHistory::execute`];
//! the action's `apply` then only runs on redo.

mod action;
mod group;
mod history;

pub use action::{AsAny, EditAction, EditActionError, EditActionResult, Editable};
pub use group::ActionGroup;
pub use history::{DEFAULT_MAX_UNDO, EditActionHistory};
