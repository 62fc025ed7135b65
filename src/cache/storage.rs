//! Session Storage Module
//!
//! The medium the cache snapshot is persisted to. Storage lives only as long
//! as the working session: the process for [`MemoryStorage`], or until
//! [`FileStorage::clear`] runs at shutdown.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use thiserror::Error;

// == Storage Error ==
/// Failure reported by a storage medium.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The write would push the medium past its byte quota
    #[error("Storage quota exceeded: {needed} bytes needed, quota is {quota} bytes")]
    QuotaExceeded { needed: usize, quota: usize },

    /// Underlying filesystem failure
    #[error("Storage I/O error: {0}")]
    Io(#[from] io::Error),

    /// The snapshot could not be encoded
    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The medium cannot be used at all
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

// == Session Storage Trait ==
/// A string key/value medium scoped to the current session.
pub trait SessionStorage: Send + Sync {
    /// Reads an item, `None` when absent.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes an item, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes an item. Removing an absent item is not an error.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

// == Memory Storage ==
/// In-process storage with an optional byte quota.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStorage {
    /// Creates an unbounded memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a memory storage that rejects writes once the total size of
    /// all stored values would exceed `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            items: Mutex::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Total bytes currently stored.
    pub fn used_bytes(&self) -> usize {
        self.items.lock().values().map(String::len).sum()
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock();

        if let Some(quota) = self.quota_bytes {
            let others: usize = items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let needed = others + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }

        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.lock().remove(key);
        Ok(())
    }
}

// == File Storage ==
/// Stores each item as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Opens (creating if needed) a session directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Removes every item in the session directory, ending the session.
    pub fn clear(&self) -> Result<(), StorageError> {
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    fn item_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(StorageError::Unavailable(format!(
                "invalid storage key '{key}'"
            )));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl SessionStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.item_path(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::write(self.item_path(key)?, value)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.item_path(key)?) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();

        assert!(storage.get_item("a").unwrap().is_none());
        storage.set_item("a", "1").unwrap();
        assert_eq!(storage.get_item("a").unwrap().as_deref(), Some("1"));

        storage.remove_item("a").unwrap();
        assert!(storage.get_item("a").unwrap().is_none());
    }

    #[test]
    fn test_memory_storage_quota() {
        let storage = MemoryStorage::with_quota(10);

        storage.set_item("a", "12345").unwrap();
        // Replacing an item only counts the new value
        storage.set_item("a", "1234567890").unwrap();

        let err = storage.set_item("b", "x").unwrap_err();
        assert!(matches!(
            err,
            StorageError::QuotaExceeded {
                needed: 11,
                quota: 10
            }
        ));
        assert_eq!(storage.used_bytes(), 10);
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path().join("session")).unwrap();

        assert!(storage.get_item("cache").unwrap().is_none());
        storage.set_item("cache", "[]").unwrap();
        assert_eq!(storage.get_item("cache").unwrap().as_deref(), Some("[]"));

        storage.remove_item("cache").unwrap();
        storage.remove_item("cache").unwrap();
        assert!(storage.get_item("cache").unwrap().is_none());
    }

    #[test]
    fn test_file_storage_clear() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        storage.set_item("one", "1").unwrap();
        storage.set_item("two", "2").unwrap();
        storage.clear().unwrap();

        assert!(storage.get_item("one").unwrap().is_none());
        assert!(storage.get_item("two").unwrap().is_none());
    }

    #[test]
    fn test_file_storage_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        assert!(matches!(
            storage.set_item("../escape", "x"),
            Err(StorageError::Unavailable(_))
        ));
    }
}
