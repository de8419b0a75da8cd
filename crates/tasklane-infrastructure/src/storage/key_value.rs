//! Durable string key-value storage.
//!
//! The persisted session is kept as a handful of named string entries, so
//! this is the only storage shape the session store needs.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use tasklane_core::{Result, TasklaneError};
use tracing::warn;

use super::atomic_toml::AtomicTomlFile;

/// String key-value storage that outlives the process.
pub trait KeyValueStore: Send + Sync {
    /// Reads one entry.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes all entries in a single step: either every entry lands or none does.
    fn set_many(&self, entries: &[(&str, String)]) -> Result<()>;

    /// Removes entries. Missing keys are ignored.
    fn remove_many(&self, keys: &[&str]) -> Result<()>;
}

/// Key-value store backed by one TOML table on disk.
///
/// The whole table is rewritten atomically on every change.
pub struct FileKeyValueStore {
    file: AtomicTomlFile<BTreeMap<String, String>>,
}

impl FileKeyValueStore {
    /// Creates a store at `path`. The file is created on first write with
    /// owner-only permissions.
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path).private(),
        }
    }

    /// Deletes the file if it no longer parses.
    ///
    /// Writers then start from an empty table instead of failing on every
    /// call. Other read failures are left for the caller to hit.
    fn discard_if_unreadable(&self) -> Result<()> {
        match self.file.load() {
            Err(TasklaneError::Serialization { message, .. }) => {
                warn!(
                    path = %self.file.path().display(),
                    error = %message,
                    "Discarding unreadable key-value file"
                );
                self.file.remove()
            }
            _ => Ok(()),
        }
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .file
            .load()?
            .and_then(|mut entries| entries.remove(key)))
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<()> {
        self.discard_if_unreadable()?;
        self.file.update(BTreeMap::new(), |table| {
            for (key, value) in entries {
                table.insert((*key).to_string(), value.clone());
            }
            Ok(())
        })
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        self.discard_if_unreadable()?;
        if !self.file.path().exists() {
            return Ok(());
        }

        self.file.update(BTreeMap::new(), |table| {
            for key in keys {
                table.remove(*key);
            }
            Ok(())
        })
    }
}

/// In-process key-value store, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every entry currently held.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set_many(&self, new_entries: &[(&str, String)]) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        for (key, value) in new_entries {
            entries.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path().join("kv.toml"));

        store
            .set_many(&[("a", "1".to_string()), ("b", r#"{"quoted":"json"}"#.to_string())])
            .unwrap();

        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.get("b").unwrap().as_deref(), Some(r#"{"quoted":"json"}"#));
        assert!(store.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kv.toml");

        FileKeyValueStore::new(path.clone())
            .set_many(&[("token", "tok1".to_string())])
            .unwrap();

        let reopened = FileKeyValueStore::new(path);
        assert_eq!(reopened.get("token").unwrap().as_deref(), Some("tok1"));
    }

    #[test]
    fn test_file_store_remove() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path().join("kv.toml"));

        store.remove_many(&["nothing-yet"]).unwrap();
        assert!(!temp_dir.path().join("kv.toml").exists());

        store
            .set_many(&[("a", "1".to_string()), ("b", "2".to_string())])
            .unwrap();
        store.remove_many(&["a"]).unwrap();

        assert!(store.get("a").unwrap().is_none());
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_file_store_recovers_from_unreadable_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kv.toml");
        std::fs::write(&path, "todo_token = \"tok").unwrap();
        let store = FileKeyValueStore::new(path.clone());

        assert!(store.get("todo_token").is_err());

        store.set_many(&[("todo_token", "tok2".to_string())]).unwrap();
        assert_eq!(store.get("todo_token").unwrap().as_deref(), Some("tok2"));
    }

    #[test]
    fn test_file_store_remove_clears_unreadable_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kv.toml");
        std::fs::write(&path, "a = [").unwrap();
        let store = FileKeyValueStore::new(path.clone());

        store.remove_many(&["a"]).unwrap();

        assert!(!path.exists());
        assert!(store.get("a").unwrap().is_none());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryKeyValueStore::new();
        store.set_many(&[("a", "1".to_string())]).unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));

        store.remove_many(&["a", "b"]).unwrap();
        assert!(store.snapshot().is_empty());
    }
}
