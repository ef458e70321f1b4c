//! Key/value persistence for project snapshots.
//!
//! Mirrors browser local storage: string keys, string values. The studio
//! saves one JSON snapshot under [`SNAPSHOT_KEY`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, StudioError};
use crate::model::Track;

/// Key the current project is stored under.
pub const SNAPSHOT_KEY: &str = "daw-shell.project";

/// Current snapshot schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Minimal string key/value backend.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
    /// Returns true when a value was removed.
    fn remove(&mut self, key: &str) -> Result<bool>;
}

/// In-process backend.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        Ok(self.entries.remove(key).is_some())
    }
}

/// Everything needed to restore a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub schema_version: u32,
    pub name: String,
    pub bpm: f64,
    pub tracks: Vec<Track>,
    pub saved_at: DateTime<Utc>,
}

impl ProjectSnapshot {
    pub fn new(name: impl Into<String>, bpm: f64, tracks: Vec<Track>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            name: name.into(),
            bpm,
            tracks,
            saved_at: Utc::now(),
        }
    }
}

/// Serialize `snapshot` into the backend.
pub fn save_snapshot(store: &mut dyn KeyValueStore, snapshot: &ProjectSnapshot) -> Result<()> {
    let json = serde_json::to_string(snapshot)?;
    store.set(SNAPSHOT_KEY, json)?;
    info!(name = %snapshot.name, tracks = snapshot.tracks.len(), "project saved");
    Ok(())
}

/// Read the saved snapshot, if any.
///
/// Snapshots written by a newer schema are rejected rather than half-read.
pub fn load_snapshot(store: &dyn KeyValueStore) -> Result<Option<ProjectSnapshot>> {
    let Some(json) = store.get(SNAPSHOT_KEY)? else {
        return Ok(None);
    };

    let snapshot: ProjectSnapshot = serde_json::from_str(&json).map_err(|e| {
        warn!(error = %e, "saved project is unreadable");
        StudioError::Storage {
            reason: format!("saved project is unreadable: {}", e),
        }
    })?;

    if snapshot.schema_version > SCHEMA_VERSION {
        return Err(StudioError::Storage {
            reason: format!(
                "saved project uses schema {} but only {} is supported",
                snapshot.schema_version, SCHEMA_VERSION
            ),
        });
    }
    Ok(Some(snapshot))
}
