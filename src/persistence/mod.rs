//! Save/load persistence
//!
//! Features:
//! - Flat versioned JSON snapshot
//! - Pluggable key/value store (memory, LocalStorage on web)
//! - Version and corruption checks degrade to "no save"

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::quests::QuestLogSave;
/// Storage key for the single save slot
pub const SAVE_KEY: &str = "wild-west-save";
/// Current snapshot format
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("save data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("save version {found} does not match {expected}")]
    VersionMismatch { found: u32, expected: u32 },
    #[error("storage unavailable: {0}")]
    Storage(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSave {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub hp: u32,
    pub max_hp: u32,
}

/// Everything needed to resume a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveData {
    pub version: u32,
    /// Milliseconds since the Unix epoch
    pub timestamp: f64,
    pub player: PlayerSave,
    pub wallet: u32,
    pub quests: QuestLogSave,
    pub shop: Vec<String>,
    /// Weapon keys; unknown keys are skipped on restore
    pub unlocked_weapons: Vec<String>,
    pub current_weapon: String,
    pub collected_items: Vec<String>,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

/// Where snapshots live
pub trait SaveStore {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
    fn remove(&mut self, key: &str);
}

/// In-process store for native runs and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl SaveStore for LocalStorageStore {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(crate::platform::storage::get_item(key))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        if crate::platform::storage::set_item(key, value) {
            Ok(())
        } else {
            Err(PersistenceError::Storage("LocalStorage write failed".into()))
        }
    }

    fn remove(&mut self, key: &str) {
        crate::platform::storage::remove_item(key);
    }
}

/// Stamp the current version and write the snapshot
pub fn save(store: &mut dyn SaveStore, data: &SaveData) -> Result<(), PersistenceError> {
    let data = SaveData {
        version: SAVE_VERSION,
        ..data.clone()
    };
    let json = serde_json::to_string(&data)?;
    store.write(SAVE_KEY, &json)?;
    log::info!("Game saved ({} bytes)", json.len());
    Ok(())
}

/// Read the snapshot. `Ok(None)` when there is no save.
pub fn try_load(store: &dyn SaveStore) -> Result<Option<SaveData>, PersistenceError> {
    let Some(json) = store.read(SAVE_KEY)? else {
        return Ok(None);
    };
    let probe: VersionProbe = serde_json::from_str(&json)?;
    if probe.version != SAVE_VERSION {
        return Err(PersistenceError::VersionMismatch {
            found: probe.version,
            expected: SAVE_VERSION,
        });
    }
    Ok(Some(serde_json::from_str(&json)?))
}

/// Like [`try_load`], but unusable saves are logged and treated as missing
pub fn load(store: &dyn SaveStore) -> Option<SaveData> {
    match try_load(store) {
        Ok(data) => data,
        Err(e) => {
            log::warn!("Starting fresh: {}", e);
            None
        }
    }
}

pub fn has_save(store: &dyn SaveStore) -> bool {
    matches!(store.read(SAVE_KEY), Ok(Some(_)))
}

pub fn delete_save(store: &mut dyn SaveStore) {
    store.remove(SAVE_KEY);
}
