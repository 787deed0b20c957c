//! Profile persistence
//!
//! The simulation never touches storage. The controller loads a [`Profile`]
//! before a run and writes it back after economically significant events,
//! through whichever [`Storage`] backend the host provides:
//! - `MemoryStorage`: tests and headless runs
//! - `FileStorage`: native, one JSON file per key
//! - `LocalStorage`: browser LocalStorage (WASM only)

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::sim::{Inventory, ItemKind, Upgrades};
use crate::tuning::Tuning;

/// Why a save did not happen
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode profile: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Minimal key/value store
pub trait Storage {
    /// Raw value for `key`, if any
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Directory of `<key>.json` files
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStorage {
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> std::path::PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        std::fs::create_dir_all(&self.dir)?;
        // Write then rename so a crash never leaves a half-written profile
        let tmp = self.path(&format!("{key}.tmp"));
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, self.path(key))?;
        Ok(())
    }
}

/// Browser LocalStorage (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }
}

#[cfg(target_arch = "wasm32")]
impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let storage = Self::storage()
            .ok_or_else(|| PersistenceError::Unavailable("no LocalStorage".to_string()))?;
        storage
            .set_item(key, value)
            .map_err(|e| PersistenceError::Unavailable(format!("{e:?}")))
    }
}

/// Everything that outlives a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub upgrades: Upgrades,
    /// Banked score
    pub currency: u64,
    pub inventory: Inventory,
}

impl Profile {
    pub const STORAGE_KEY: &'static str = "sky_barrage_profile";

    /// Load the profile. Missing or malformed fields read as zero, upgrade
    /// levels are clamped to the cap.
    pub fn load(storage: &dyn Storage, tuning: &Tuning) -> Self {
        let Some(raw) = storage.get(Self::STORAGE_KEY) else {
            log::info!("No saved profile, starting fresh");
            return Self::default();
        };
        let value: Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("Saved profile unreadable ({e}), starting fresh");
                return Self::default();
            }
        };

        let count = |v: &Value| v.as_u64().unwrap_or(0);
        let level = |v: &Value| u32::try_from(count(v)).unwrap_or(u32::MAX);

        let upgrades = Upgrades {
            fire_rate: level(&value["upgrades"]["fire_rate"]),
            bullet_size: level(&value["upgrades"]["bullet_size"]),
        }
        .clamped(tuning.max_upgrade_level);

        let mut inventory = Inventory::default();
        for kind in ItemKind::ALL {
            let n = u32::try_from(count(&value["inventory"][kind.as_str()])).unwrap_or(u32::MAX);
            if n > 0 {
                inventory.add(kind, n);
            }
        }

        let profile = Self {
            upgrades,
            currency: count(&value["currency"]),
            inventory,
        };
        log::info!(
            "Loaded profile: {} currency, fire rate {}, bullet size {}",
            profile.currency,
            profile.upgrades.fire_rate,
            profile.upgrades.bullet_size
        );
        profile
    }

    pub fn save(&self, storage: &mut dyn Storage) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(self)?;
        storage.set(Self::STORAGE_KEY, &json)?;
        log::debug!("Profile saved ({} currency)", self.currency);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_profile_is_default() {
        let storage = MemoryStorage::new();
        assert_eq!(Profile::load(&storage, &Tuning::default()), Profile::default());
    }

    #[test]
    fn test_save_then_load() {
        let tuning = Tuning::default();
        let mut storage = MemoryStorage::new();
        let mut profile = Profile {
            currency: 4321,
            upgrades: Upgrades {
                fire_rate: 3,
                bullet_size: 7,
            },
            ..Default::default()
        };
        profile.inventory.add(ItemKind::Homing, 2);
        profile.save(&mut storage).unwrap();

        let loaded = Profile::load(&storage, &tuning);
        assert_eq!(loaded, profile);
        assert_eq!(loaded.inventory.count(ItemKind::Homing), 2);
    }

    #[test]
    fn test_invalid_fields_read_as_zero() {
        let mut storage = MemoryStorage::new();
        storage
            .set(
                Profile::STORAGE_KEY,
                r#"{"currency": "lots", "upgrades": {"fire_rate": -4, "bullet_size": 99},
                    "inventory": {"Spread": 3, "Laser": 5, "Triple": "x"}}"#,
            )
            .unwrap();
        let profile = Profile::load(&storage, &Tuning::default());
        assert_eq!(profile.currency, 0);
        assert_eq!(profile.upgrades.fire_rate, 0);
        assert_eq!(profile.upgrades.bullet_size, 20);
        assert_eq!(profile.inventory.count(ItemKind::Spread), 3);
        assert_eq!(profile.inventory.count(ItemKind::Triple), 0);
    }

    #[test]
    fn test_garbage_is_default() {
        let mut storage = MemoryStorage::new();
        storage.set(Profile::STORAGE_KEY, "not json").unwrap();
        assert_eq!(Profile::load(&storage, &Tuning::default()), Profile::default());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_storage() {
        let dir = std::env::temp_dir().join(format!("sky-barrage-test-{}", std::process::id()));
        let mut storage = FileStorage::new(&dir);
        assert!(storage.get("profile").is_none());
        storage.set("profile", "{\"currency\":5}").unwrap();
        assert_eq!(storage.get("profile").as_deref(), Some("{\"currency\":5}"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
