use std::path::{Path, PathBuf};

use serde::Deserialize;
use tessera_core::abstract_editor::DEFAULT_MAX_UNDO;

use crate::error::{EditorError, EditorResult};
use crate::log_capture;

/// Top-level project configuration loaded from `project.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    pub project: ProjectInfo,
    #[serde(default)]
    pub editor: EditorSettings,
    #[serde(default)]
    pub scene: SceneSettings,
}

/// General project information.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Undo depth of the history.
    pub max_undo: usize,
    /// Log records kept for the `log` command.
    pub log_capacity: usize,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            max_undo: DEFAULT_MAX_UNDO,
            log_capacity: log_capture::DEFAULT_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SceneSettings {
    /// Scene opened at startup, relative to the project file.
    pub path: Option<PathBuf>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            project: ProjectInfo {
                name: "Untitled".into(),
            },
            editor: EditorSettings::default(),
            scene: SceneSettings::default(),
        }
    }
}

impl ProjectConfig {
    /// Startup scene resolved against the directory of `project_file`.
    pub fn scene_path(&self, project_file: &Path) -> Option<PathBuf> {
        let path = self.scene.path.as_ref()?;
        Some(match project_file.parent() {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.clone(),
        })
    }
}

/// Parses a project config from TOML text.
pub fn parse_project(text: &str, path: &Path) -> EditorResult<ProjectConfig> {
    toml::from_str(text).map_err(|source| EditorError::Config {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads a project config from a TOML file.
pub fn load_project(path: &Path) -> EditorResult<ProjectConfig> {
    let content = std::fs::read_to_string(path).map_err(|source| EditorError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_project(&content, path)
}

/// Loads the project config, falling back to defaults if it can't be read.
pub fn load_or_default(path: &Path) -> ProjectConfig {
    match load_project(path) {
        Ok(config) => {
            log::info!(
                "Loaded project: {} (max_undo {})",
                config.project.name,
                config.editor.max_undo
            );
            config
        }
        Err(e) => {
            log::warn!("No project file ({e}), using defaults");
            ProjectConfig::default()
        }
    }
}
