//! Error types for the fallible text and file boundary of the scene store.
//!
//! Tree operations never return these: a rejected move or a missing node is
//! logged and reported through `bool` / `Option` results.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SceneError {
    /// RON encoding of a scene failed.
    #[error("failed to encode scene: {0}")]
    Encode(String),
    /// RON text could not be decoded into scene data.
    #[error("failed to decode scene: {0}")]
    Decode(String),
    /// A node kind tag was not recognized.
    #[error("unknown node kind '{0}'")]
    UnknownKind(String),
    /// Reading or writing a scene file failed.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type SceneResult<T> = Result<T, SceneError>;
