// Install state (persisted across the install/uninstall transaction)
//
// The installer host owns the lifetime of this bag; the custom action only reads and
// writes individual entries. The CLI host stores it as JSON next to the payload.

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Directory recorded when the IDE was located through the manual file picker.
pub const KEY_INSTALL_DIR: &str = "install.dir";

/// Sentinel written once Install has run to completion.
pub const KEY_INSTALL_SUCCESS: &str = "CustomActionInstallSuccess";

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to access install state file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("install state file {path:?} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstallState {
    entries: BTreeMap<String, Value>,
}

impl InstallState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    /// Writing an existing key replaces its value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn install_succeeded(&self) -> bool {
        self.contains(KEY_INSTALL_SUCCESS)
    }

    pub fn mark_install_succeeded(&mut self) {
        self.insert(KEY_INSTALL_SUCCESS, true);
    }

    pub fn saved_install_dir(&self) -> Option<PathBuf> {
        self.get_str(KEY_INSTALL_DIR)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
    }

    pub fn record_install_dir(&mut self, dir: &Path) {
        self.insert(KEY_INSTALL_DIR, dir.to_string_lossy().into_owned());
    }

    /// Load state from `path`. A missing file yields an empty state.
    pub async fn load(path: &Path) -> Result<Self, StateError> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(
                    "[PHASE: state] [STEP: load] No state file at {:?}; starting empty",
                    path
                );
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(StateError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let state = serde_json::from_str(&raw).map_err(|source| StateError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("[PHASE: state] [STEP: load] Loaded state from {:?}", path);
        Ok(state)
    }

    pub async fn save(&self, path: &Path) -> Result<(), StateError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| StateError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
        tokio::fs::write(path, json)
            .await
            .map_err(|source| StateError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("[PHASE: state] [STEP: save] Saved state to {:?}", path);
        Ok(())
    }

    /// Remove the persisted file once the transaction is fully reversed.
    pub async fn discard(path: &Path) -> Result<(), StateError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StateError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}
