//! Durable key-value storage scoped to an origin
//!
//! Values are whole JSON documents; every write replaces the previous value.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Synchronous string key-value store
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Stores each key as `<key>.json` inside a per-origin directory
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn init(data_dir: &Path, origin: &str) -> Result<Self, StorageError> {
        let dir = data_dir.join(sanitize_origin(origin));
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        tracing::debug!(dir = %dir.display(), "File store initialized");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Process-local store, used for tests and when no data directory is usable
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Turn an origin such as `https://app.example.com:8443` into a directory name
fn sanitize_origin(origin: &str) -> String {
    let stripped = origin
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    let name: String = stripped
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    if name.is_empty() { "default".to_string() } else { name }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_origin() {
        assert_eq!(sanitize_origin("https://app.example.com:8443"), "app.example.com_8443");
        assert_eq!(sanitize_origin("local"), "local");
        assert_eq!(sanitize_origin("  "), "default");
    }

    #[test]
    fn test_file_store_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::init(temp_dir.path(), "http://localhost:3000").unwrap();

        assert!(store.get("missing").unwrap().is_none());
        store.set("playlistStreams", "{}").unwrap();
        assert_eq!(store.get("playlistStreams").unwrap().as_deref(), Some("{}"));
        assert!(store.dir().join("playlistStreams.json").exists());
        assert!(!store.dir().join("playlistStreams.json.tmp").exists());
    }

    #[test]
    fn test_file_store_overwrites_whole_value() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::init(temp_dir.path(), "origin").unwrap();

        store.set("k", "a much longer first value").unwrap();
        store.set("k", "short").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("short"));
    }

    #[test]
    fn test_origins_are_isolated() {
        let temp_dir = tempfile::tempdir().unwrap();
        let a = FileStore::init(temp_dir.path(), "a.example").unwrap();
        let b = FileStore::init(temp_dir.path(), "b.example").unwrap();

        a.set("k", "1").unwrap();
        assert!(b.get("k").unwrap().is_none());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.get("k").unwrap().is_none());
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }
}
