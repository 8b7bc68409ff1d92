//! # Tessera Core
//!
//! Document-agnostic building blocks for the Tessera scene editor: the
//! undo/redo history engine and the math helpers used by scene transforms.

pub mod abstract_editor;
pub mod math;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
