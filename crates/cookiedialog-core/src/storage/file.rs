//! File-backed store: one JSON object holding every key.
//!
//! Writes go through a temp file and a rename so a crash never leaves a
//! half-written document behind.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{ConsentError, ConsentResult};

use super::KeyValueStore;

/// JSON document on disk, read and rewritten on every operation.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> ConsentResult<BTreeMap<String, String>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(ConsentError::StorageUnavailable {
                    message: format!("failed to read {}: {}", self.path.display(), e),
                })
            }
        };

        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        match serde_json::from_str(&text) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                // A damaged document is dropped rather than blocking every key.
                warn!(path = %self.path.display(), error = %e, "storage file unreadable, starting empty");
                Ok(BTreeMap::new())
            }
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> ConsentResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ConsentError::StorageUnavailable {
                    message: format!("failed to create {}: {}", parent.display(), e),
                })?;
            }
        }

        let json = serde_json::to_string_pretty(entries).map_err(|e| {
            ConsentError::StorageUnavailable {
                message: format!("failed to serialize storage: {}", e),
            }
        })?;

        let temp_path = self.path.with_extension("tmp");
        std::fs::write(&temp_path, json).map_err(|e| ConsentError::StorageUnavailable {
            message: format!("failed to write temp file: {}", e),
        })?;
        std::fs::rename(&temp_path, &self.path).map_err(|e| {
            ConsentError::StorageUnavailable {
                message: format!("failed to rename temp file: {}", e),
            }
        })?;

        debug!(path = %self.path.display(), keys = entries.len(), "storage saved");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> ConsentResult<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> ConsentResult<()> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> ConsentResult<()> {
        let mut entries = self.load()?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.save(&entries)
    }
}
