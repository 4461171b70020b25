//! Durable key/value state area (the local-storage equivalent).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{MemoBoardError, Result};

pub const HYPOTHESES_KEY: &str = "hypotheses";
pub const RECOMMENDATION_KEY: &str = "recommendation";
pub const VERSION_KEY: &str = "state_version";

/// String-keyed storage for serialized state values
pub trait StateStorage: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

fn validate_key(key: &str) -> Result<()> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(MemoBoardError::InvalidParams {
            message: format!("invalid storage key '{}'", key),
        })
    }
}

/// One JSON file per key inside a data directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| MemoBoardError::Storage {
            message: format!("failed to create data dir {}: {}", dir.display(), e),
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StateStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                tracing::debug!("read {} bytes from {}", content.len(), path.display());
                Ok(Some(content))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(MemoBoardError::Storage {
                message: format!("failed to read {}: {}", path.display(), e),
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{}.json.tmp", key));
        std::fs::write(&tmp, value).map_err(|e| MemoBoardError::Storage {
            message: format!("failed to write {}: {}", tmp.display(), e),
        })?;
        std::fs::rename(&tmp, &path).map_err(|e| MemoBoardError::Storage {
            message: format!("failed to replace {}: {}", path.display(), e),
        })?;
        tracing::debug!("wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        validate_key(key)?;
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory storage. Clones share the same values, so a caller can keep a
/// handle after boxing one into a `Dashboard`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    values: HashMap<String, String>,
    writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `set` calls across all clones.
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StateStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        Ok(self.lock().values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        let mut inner = self.lock();
        inner.values.insert(key.to_string(), value.to_string());
        inner.writes += 1;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        validate_key(key)?;
        self.lock().values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_storage_round_trips_and_removes() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::open(dir.path().join("state")).unwrap();

        assert_eq!(storage.get(HYPOTHESES_KEY).unwrap(), None);
        storage.set(HYPOTHESES_KEY, "[1,2]").unwrap();
        assert_eq!(storage.get(HYPOTHESES_KEY).unwrap().as_deref(), Some("[1,2]"));
        assert!(!storage.dir().join("hypotheses.json.tmp").exists());

        storage.remove(HYPOTHESES_KEY).unwrap();
        storage.remove(HYPOTHESES_KEY).unwrap();
        assert_eq!(storage.get(HYPOTHESES_KEY).unwrap(), None);
    }

    #[test]
    fn rejects_path_like_keys() {
        let mut storage = MemoryStorage::new();
        assert!(storage.set("../escape", "x").is_err());
        assert!(storage.get("").is_err());
        assert_eq!(storage.writes(), 0);
    }

    #[test]
    fn memory_clones_share_values() {
        let mut storage = MemoryStorage::new();
        let handle = storage.clone();
        storage.set(VERSION_KEY, "3").unwrap();
        assert_eq!(handle.get(VERSION_KEY).unwrap().as_deref(), Some("3"));
        assert_eq!(handle.writes(), 1);
    }
}
