//! # Tessera Scene
//!
//! Scene-object store for the Tessera editor.
//!
//! - [`NodeStore`]: arena of GUI and GO nodes with id and path lookup,
//!   world transforms and GUI draw ordering.
//! - [`serializer`]: conversion between subtrees and [`NodeDto`] trees,
//!   plus RON scene files.
//! - [`SceneEditor`]: selection, clipboard and undoable edits built on the
//!   history engine from `tessera-core`.

pub mod actions;
pub mod error;
pub mod host;
pub mod index;
pub mod node;
pub mod payload;
pub mod selection;
pub mod serializer;
pub mod store;

pub use actions::{Clipboard, SceneDocument, SceneEditor};
pub use error::{SceneError, SceneResult};
pub use host::{NullHost, RenderHost};
pub use index::{PATH_ROOT, child_path};
pub use node::{Domain, Node, NodeFlags, NodeId, NodeKind, Rect};
pub use payload::{NodePayload, PayloadData};
pub use selection::Selection;
pub use serializer::{FLOAT_PRECISION, NodeDto, SerializeOptions, SessionState, Space};
pub use store::{GraphEntry, NodeStore, Placement};

/// Scene library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
