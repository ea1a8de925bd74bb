//! File-backed named saves.
//!
//! Layout inside the save directory:
//! ```text
//! <name>.json       - one pretty-printed SaveDocument per save
//! <name>.json.tmp   - transient, renamed over <name>.json on success
//! ```

use crate::snapshot::SaveDocument;
use gridturn_kernel::{SCHEMA_VERSION, State};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Errors from file-backed persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no save named '{0}'")]
    NotFound(String),
    #[error("invalid save name '{0}'")]
    InvalidName(String),
    #[error("schema version mismatch: file has v{file_version}, expected v{expected_version}")]
    SchemaMismatch {
        file_version: u64,
        expected_version: u32,
    },
    #[error("corrupt save: {0}")]
    Corrupt(String),
}

/// Directory of named save documents.
#[derive(Debug, Clone)]
pub struct SaveStore {
    root: PathBuf,
}

impl SaveStore {
    /// The directory is created lazily on first save.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the document for `name`.
    pub fn path_of(&self, name: &str) -> Result<PathBuf, StoreError> {
        let valid = !name.is_empty()
            && !name.starts_with('.')
            && !name.contains(['/', '\\'])
            && name != "..";
        if !valid {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(format!("{name}.json")))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_of(name).is_ok_and(|p| p.is_file())
    }

    /// Write `state` under `name`, replacing any previous save.
    pub fn save(&self, state: &State, name: &str) -> Result<PathBuf, StoreError> {
        let path = self.path_of(name)?;
        fs::create_dir_all(&self.root)?;

        let doc = SaveDocument::capture(state);
        let bytes = serde_json::to_vec_pretty(&doc)?;

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)?;

        tracing::info!(
            save = name,
            path = %path.display(),
            turn = state.turn,
            events = state.event_log.len(),
            "state saved"
        );
        Ok(path)
    }

    /// Read and rebuild the state saved under `name`.
    pub fn load(&self, name: &str) -> Result<State, StoreError> {
        let path = self.path_of(name)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        // Check the version before committing to the current layout.
        let raw: serde_json::Value = serde_json::from_slice(&bytes)?;
        let file_version = raw
            .pointer("/metadata/schemaVersion")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| StoreError::Corrupt("missing metadata.schemaVersion".into()))?;
        if file_version != u64::from(SCHEMA_VERSION) {
            return Err(StoreError::SchemaMismatch {
                file_version,
                expected_version: SCHEMA_VERSION,
            });
        }

        let doc: SaveDocument = serde_json::from_value(raw)?;
        let state = doc.restore()?;
        tracing::info!(save = name, turn = state.turn, players = state.players.len(), "state loaded");
        Ok(state)
    }

    /// Names of all saves, sorted.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(name) = filename.strip_suffix(".json")
            {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}
