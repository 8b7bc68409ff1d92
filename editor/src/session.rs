//! Editor session sidecar stored next to a scene as `<scene>.session.ron`.

use std::path::{Path, PathBuf};

use tessera_scene::NodeStore;
use tessera_scene::serializer::{session_from_ron, session_to_ron};

use crate::error::{EditorError, EditorResult};

pub fn sidecar_path(scene: &Path) -> PathBuf {
    let mut name = scene.as_os_str().to_owned();
    name.push(".session.ron");
    PathBuf::from(name)
}

pub fn save_session(store: &NodeStore, scene: &Path) -> EditorResult<()> {
    let path = sidecar_path(scene);
    let text = session_to_ron(&store.session_state())?;
    std::fs::write(&path, text).map_err(|source| EditorError::Io { path, source })
}

/// Restores the id counter from the sidecar. A missing sidecar is not an
/// error; the counter is then left as the loaded scene set it.
pub fn load_session(store: &mut NodeStore, scene: &Path) -> EditorResult<bool> {
    let path = sidecar_path(scene);
    if !path.exists() {
        log::debug!("No session sidecar at {}", path.display());
        return Ok(false);
    }
    let text = std::fs::read_to_string(&path).map_err(|source| EditorError::Io { path, source })?;
    let state = session_from_ron(&text)?;
    // Never rewind below ids already handed out.
    if state.id_counter >= store.id_counter() {
        store.restore_session(state);
    }
    Ok(true)
}
