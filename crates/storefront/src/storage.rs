//! Durable key-value storage for the cart.
//!
//! The cart is mirrored into a single string slot, the same shape as a
//! browser's local storage. [`FileStorage`] keeps every slot of the area in one
//! JSON object on disk and rewrites it atomically; [`MemoryStorage`] keeps
//! slots in process memory.

use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;

/// Errors that can occur when reading or writing storage slots.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The storage file is not a JSON object of string values.
    #[error("corrupt storage file: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// A previous writer panicked while holding the storage lock.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// A string-keyed slot store.
pub trait CartStorage: Send + Sync {
    /// Read a slot. Returns `None` if it was never written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite a slot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

// =============================================================================
// FileStorage
// =============================================================================

/// Local storage area persisted as a JSON object in a single file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStorage {
    /// Create a storage area backed by `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read_area(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_area(&self, area: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let raw = serde_json::to_string_pretty(area)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, raw)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl CartStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(self.read_area()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;

        let mut area = match self.read_area() {
            Ok(area) => area,
            Err(StorageError::Corrupt(e)) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Discarding corrupt storage file"
                );
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };

        area.insert(key.to_string(), value.to_string());
        self.write_area(&area)
    }
}

// =============================================================================
// MemoryStorage
// =============================================================================

/// Storage area held in process memory. Contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty storage area.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage area with one slot already written.
    #[must_use]
    pub fn with_item(key: &str, value: &str) -> Self {
        let storage = Self::new();
        if let Ok(mut slots) = storage.slots.lock() {
            slots.insert(key.to_string(), value.to_string());
        }
        storage
    }
}

impl CartStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let slots = self.slots.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(slots.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut slots = self.slots.lock().map_err(|_| StorageError::Poisoned)?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_missing_file_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("storage.json"));
        assert_eq!(storage.get_item("@RocketShoes:cart").unwrap(), None);
    }

    #[test]
    fn test_file_storage_round_trip_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/area/storage.json");
        let storage = FileStorage::new(&path);

        storage.set_item("@RocketShoes:cart", "[]").unwrap();
        storage.set_item("other", "value").unwrap();

        assert_eq!(
            storage.get_item("@RocketShoes:cart").unwrap().as_deref(),
            Some("[]")
        );
        assert_eq!(storage.get_item("other").unwrap().as_deref(), Some("value"));
        assert!(path.exists());
    }

    #[test]
    fn test_file_storage_overwrites_slot() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("storage.json"));

        storage.set_item("cart", "first").unwrap();
        storage.set_item("cart", "second").unwrap();

        assert_eq!(storage.get_item("cart").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_file_storage_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();
        let storage = FileStorage::new(&path);

        assert!(matches!(
            storage.get_item("cart"),
            Err(StorageError::Corrupt(_))
        ));

        // Writing replaces the corrupt area.
        storage.set_item("cart", "[]").unwrap();
        assert_eq!(storage.get_item("cart").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::with_item("cart", "[]");
        assert_eq!(storage.get_item("cart").unwrap().as_deref(), Some("[]"));
        assert_eq!(storage.get_item("missing").unwrap(), None);

        storage.set_item("cart", "[1]").unwrap();
        assert_eq!(storage.get_item("cart").unwrap().as_deref(), Some("[1]"));
    }
}
