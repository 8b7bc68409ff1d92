use std::path::PathBuf;

use tessera_core::abstract_editor::EditActionError;
use tessera_scene::SceneError;
use thiserror::Error;

/// Errors surfaced by the editor shell and its startup.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    History(#[from] EditActionError),

    #[error("failed to parse {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A shell command was malformed or named something that does not exist.
    #[error("{0}")]
    Usage(String),
}

impl EditorError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }
}

pub type EditorResult<T> = Result<T, EditorError>;
