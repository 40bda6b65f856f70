//! Versioned tab-state persistence
//!
//! One JSON snapshot per space, stored in a [`StorageBackend`] slot keyed
//! `"{prefix}:{space_id}"`. Snapshots from an older schema version, or
//! with a shape we cannot trust, are deleted on load rather than migrated.

use crate::config::WorkspaceConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::StorageError;
use crate::types::{Pane, PaneId, WorkbenchState};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Schema version written by [`PersistenceCodec::save`]
pub const CURRENT_VERSION: u32 = 3;

/// Key/value slot storage
pub trait StorageBackend: Debug + Send + Sync {
    /// Read a slot
    ///
    /// # Errors
    /// Backend failure.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a slot
    ///
    /// # Errors
    /// Backend failure.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a slot; deleting a missing slot succeeds
    ///
    /// # Errors
    /// Backend failure.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// All slot keys
    ///
    /// # Errors
    /// Backend failure.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// In-process storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    /// Create empty storage
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.slots.write().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.slots.read().keys().cloned().collect())
    }
}

/// One `.json` file per slot in a directory
///
/// File names are the form-urlencoded key, so `tabspace:tabs:space_a`
/// becomes `tabspace%3Atabs%3Aspace_a.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (and create) a storage directory
    ///
    /// # Errors
    /// `StorageError::Io` when the directory cannot be created.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Storage directory
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let encoded: String = url::form_urlencoded::byte_serialize(key.as_bytes()).collect();
        self.dir.join(format!("{encoded}.json"))
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            // Encoded names contain no raw '&' or '=', so they parse as one key.
            if let Some((key, _)) = url::form_urlencoded::parse(stem.as_bytes()).next() {
                keys.push(key.into_owned());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// On-disk snapshot shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSnapshot {
    /// Schema version
    pub version: u32,
    /// Panes, left first
    pub panes: Vec<Pane>,
    /// Focused pane
    pub active_pane_id: PaneId,
    /// Expanded sidebar views
    #[serde(default)]
    pub expanded_view_ids: Vec<String>,
}

/// Outcome of reading a slot
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// No snapshot stored
    Missing,
    /// Snapshot restored (after dedup and repair)
    Loaded(WorkbenchState),
    /// Snapshot deleted
    Discarded(String),
}

/// Reads and writes per-space snapshots
#[derive(Debug, Clone)]
pub struct PersistenceCodec {
    storage: Arc<dyn StorageBackend>,
    key_prefix: String,
    min_pane_width: f64,
    diagnostics: Diagnostics,
}

impl PersistenceCodec {
    /// Create codec over a backend
    #[must_use]
    pub fn new(
        storage: Arc<dyn StorageBackend>,
        config: &WorkspaceConfig,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            storage,
            key_prefix: config.storage_key_prefix.clone(),
            min_pane_width: config.min_pane_width,
            diagnostics,
        }
    }

    /// Storage key of a space
    #[must_use]
    pub fn key(&self, space_id: &str) -> String {
        format!("{}:{space_id}", self.key_prefix)
    }

    /// Underlying backend
    #[inline]
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn StorageBackend> {
        &self.storage
    }

    /// Write a space's state at the current schema version
    ///
    /// # Errors
    /// Serialization or backend failure.
    pub fn save(&self, space_id: &str, state: &WorkbenchState) -> Result<(), StorageError> {
        let snapshot = PersistedSnapshot {
            version: CURRENT_VERSION,
            panes: state.panes.clone(),
            active_pane_id: state.active_pane_id,
            expanded_view_ids: state.expanded_view_ids.clone(),
        };
        let json = serde_json::to_string(&snapshot)?;
        self.storage.set(&self.key(space_id), &json)
    }

    /// Read a space's state
    ///
    /// Returns `None` when nothing usable is stored; outdated or malformed
    /// snapshots are deleted first.
    #[must_use]
    pub fn load(&self, space_id: &str) -> Option<WorkbenchState> {
        match self.load_outcome(space_id) {
            LoadOutcome::Loaded(state) => Some(state),
            LoadOutcome::Missing | LoadOutcome::Discarded(_) => None,
        }
    }

    /// Read a space's state, reporting why nothing was restored
    pub fn load_outcome(&self, space_id: &str) -> LoadOutcome {
        let key = self.key(space_id);
        let raw = match self.storage.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return LoadOutcome::Missing,
            Err(e) => {
                self.diagnostics.emit(Diagnostic::StorageFailure {
                    key,
                    error: e.to_string(),
                });
                return LoadOutcome::Missing;
            }
        };

        match decode(&raw, self.min_pane_width) {
            Ok(state) => {
                tracing::debug!(space_id, tabs = state.tab_count(), "restored tabs");
                LoadOutcome::Loaded(state)
            }
            Err(reason) => {
                if let Err(e) = self.storage.remove(&key) {
                    self.diagnostics.emit(Diagnostic::StorageFailure {
                        key,
                        error: e.to_string(),
                    });
                }
                self.diagnostics.emit(Diagnostic::SnapshotDiscarded {
                    space_id: space_id.to_string(),
                    reason: reason.clone(),
                });
                LoadOutcome::Discarded(reason)
            }
        }
    }

    /// Delete a space's slot
    ///
    /// # Errors
    /// Backend failure.
    pub fn clear(&self, space_id: &str) -> Result<(), StorageError> {
        self.storage.remove(&self.key(space_id))
    }
}

fn decode(raw: &str, min_pane_width: f64) -> Result<WorkbenchState, String> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| format!("not json: {e}"))?;
    let version = value
        .get("version")
        .and_then(serde_json::Value::as_u64)
        .ok_or("missing version")?;
    if version != u64::from(CURRENT_VERSION) {
        return Err(format!("version {version}, expected {CURRENT_VERSION}"));
    }
    let snapshot: PersistedSnapshot =
        serde_json::from_value(value).map_err(|e| format!("malformed snapshot: {e}"))?;
    restore(snapshot, min_pane_width)
}

fn restore(snapshot: PersistedSnapshot, min_pane_width: f64) -> Result<WorkbenchState, String> {
    let PersistedSnapshot {
        mut panes,
        mut active_pane_id,
        expanded_view_ids,
        ..
    } = snapshot;

    match panes.len() {
        1 => {
            panes[0].id = PaneId::Left;
            panes[0].width_percent = 100.0;
            active_pane_id = PaneId::Left;
        }
        2 => {
            if panes[0].id == panes[1].id {
                return Err("two panes share an id".to_string());
            }
            panes.sort_by_key(|p| p.id);
            let left = panes[0].width_percent;
            let left = if left.is_finite() {
                left.clamp(min_pane_width, 100.0 - min_pane_width)
            } else {
                50.0
            };
            panes[0].width_percent = left;
            panes[1].width_percent = 100.0 - left;
        }
        n => return Err(format!("{n} panes")),
    }

    if !panes.iter().any(|p| p.id == active_pane_id) {
        return Err(format!("active pane {active_pane_id} missing"));
    }

    let mut seen = HashSet::new();
    for pane in &mut panes {
        pane.tabs.retain(|t| seen.insert(t.id));
        pane.sort_pinned_first();
        pane.repair_active();
    }

    Ok(WorkbenchState {
        panes,
        active_pane_id,
        expanded_view_ids,
    })
}
