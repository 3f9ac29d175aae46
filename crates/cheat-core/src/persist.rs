//! Persisted cheat lists
//!
//! The engine only produces and consumes [`PersistedCheatList`]; where the list
//! lives is up to a [`CheatPersistence`] implementation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One saved cheat
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedCheat {
    /// Canonical code text
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub enabled: bool,
}

/// Ordered cheat list plus the store-level switch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedCheatList {
    #[serde(default)]
    pub cheats: Vec<PersistedCheat>,
    #[serde(default)]
    pub disable_all_cheats: bool,
}

/// Errors from the persistence collaborator
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("cheat list I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("cheat list is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Storage for a cheat list
pub trait CheatPersistence {
    /// Read the saved list
    fn load(&self) -> Result<PersistedCheatList, PersistenceError>;
    /// Replace the saved list
    fn save(&self, list: &PersistedCheatList) -> Result<(), PersistenceError>;
}

/// Cheat list kept as pretty-printed JSON on disk
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CheatPersistence for JsonFilePersistence {
    /// A missing file is an empty list
    fn load(&self) -> Result<PersistedCheatList, PersistenceError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(PersistedCheatList::default())
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&data)?)
    }

    fn save(&self, list: &PersistedCheatList) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(list)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// In-memory storage, mostly for tests and tools
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    list: Mutex<PersistedCheatList>,
}

impl MemoryPersistence {
    pub fn new(list: PersistedCheatList) -> Self {
        Self {
            list: Mutex::new(list),
        }
    }

    /// Copy of the currently saved list
    pub fn snapshot(&self) -> PersistedCheatList {
        match self.list.lock() {
            Ok(list) => list.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl CheatPersistence for MemoryPersistence {
    fn load(&self) -> Result<PersistedCheatList, PersistenceError> {
        Ok(self.snapshot())
    }

    fn save(&self, list: &PersistedCheatList) -> Result<(), PersistenceError> {
        match self.list.lock() {
            Ok(mut saved) => *saved = list.clone(),
            Err(poisoned) => *poisoned.into_inner() = list.clone(),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PersistedCheatList {
        PersistedCheatList {
            cheats: vec![
                PersistedCheat {
                    code: "00FF:09".into(),
                    description: "Lives".into(),
                    enabled: true,
                },
                PersistedCheat {
                    code: "0100:01".into(),
                    description: String::new(),
                    enabled: false,
                },
            ],
            disable_all_cheats: true,
        }
    }

    #[test]
    fn test_json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFilePersistence::new(dir.path().join("nested").join("cheats.json"));

        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), sample());

        let json = fs::read_to_string(store.path()).unwrap();
        assert!(json.contains("\"disableAllCheats\": true"));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFilePersistence::new(dir.path().join("absent.json"));
        assert_eq!(store.load().unwrap(), PersistedCheatList::default());
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cheats.json");
        fs::write(&path, "{ not json").unwrap();
        let err = JsonFilePersistence::new(&path).load().unwrap_err();
        assert!(matches!(err, PersistenceError::Corrupt(_)));
    }

    #[test]
    fn test_missing_fields_default() {
        let list: PersistedCheatList =
            serde_json::from_str(r#"{ "cheats": [ { "code": "GOSSIP" } ] }"#).unwrap();
        assert_eq!(list.cheats[0].description, "");
        assert!(!list.cheats[0].enabled);
        assert!(!list.disable_all_cheats);
    }

    #[test]
    fn test_memory_persistence() {
        let store = MemoryPersistence::default();
        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), sample());
    }
}
