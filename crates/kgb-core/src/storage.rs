//! Key-value backends that hold the serialized record list.
//!
//! The store writes one key and overwrites it wholesale on every change,
//! so a backend only needs `get` and `set`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// Key under which the employee list is persisted.
pub const STORAGE_KEY: &str = "kgb-assistant-employees";

/// A minimal string key-value store.
pub trait KeyValueStore {
    /// Read the value for `key`, or `None` if it was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value for `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory backend for tests and dry runs.
///
/// Writes can be made to fail to exercise the store's warning path.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `value` already stored under `key`.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut store = Self::default();
        store.entries.insert(key.to_string(), value.to_string());
        store
    }

    /// Make every subsequent `set` fail.
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Raw stored value, bypassing the trait.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Write {
                key: key.to_string(),
                message: "storage quota exceeded".into(),
            });
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Directory-backed store: each key is a `<key>.json` file.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                tracing::debug!(path = %path.display(), bytes = content.len(), "loaded key");
                Ok(Some(content))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Read {
                key: key.to_string(),
                message: format!("{}: {e}", path.display()),
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let write_err = |e: std::io::Error| StorageError::Write {
            key: key.to_string(),
            message: format!("{}: {e}", path.display()),
        };

        std::fs::create_dir_all(&self.dir).map_err(write_err)?;
        // Sibling file + rename: readers see the old list or the new one.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(write_err)?;
        std::fs::rename(&tmp, &path).map_err(write_err)?;
        tracing::debug!(path = %path.display(), bytes = value.len(), "saved key");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip_and_failure() {
        let mut store = MemoryStore::new();
        assert!(store.get("k").unwrap().is_none());
        store.set("k", "[]").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("[]"));

        store.set_fail_writes(true);
        let err = store.set("k", "[1]").unwrap_err();
        assert!(matches!(err, StorageError::Write { .. }));
        assert_eq!(store.raw("k"), Some("[]"));
    }

    #[test]
    fn file_store_creates_directory_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("data"));

        assert!(store.get(STORAGE_KEY).unwrap().is_none());
        store.set(STORAGE_KEY, "[]").unwrap();
        store.set(STORAGE_KEY, "[ ]").unwrap();

        assert_eq!(store.get(STORAGE_KEY).unwrap().as_deref(), Some("[ ]"));
        assert!(store.path_for(STORAGE_KEY).exists());
        assert!(!store.path_for(STORAGE_KEY).with_extension("json.tmp").exists());
    }
}
