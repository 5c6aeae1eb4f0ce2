use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tempfile::NamedTempFile;

/// Error type for key-value storage
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("could not access {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("storage file {path} is not a JSON object of strings: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not encode storage: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Persistent string key-value storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Volatile store, for tests and throwaway boards
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File store
// ---------------------------------------------------------------------------

/// Store backed by a single JSON file holding an object of key → string.
/// Every `set` rewrites the whole file atomically.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<IndexMap<String, String>, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(IndexMap::new()),
            Err(e) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };
        if content.trim().is_empty() {
            return Ok(IndexMap::new());
        }
        serde_json::from_str(&content).map_err(|e| StorageError::Malformed {
            path: self.path.clone(),
            source: e,
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.shift_remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        let content = serde_json::to_string_pretty(&entries)?;
        atomic_write(&self.path, content.as_bytes()).map_err(|e| StorageError::Io {
            path: self.path.clone(),
            source: e,
        })
    }
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_store_get_set() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("tasks").unwrap(), None);
        store.set("tasks", "{}").unwrap();
        assert_eq!(store.get("tasks").unwrap(), Some("{}".to_string()));
    }

    #[test]
    fn file_store_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("storage.json"));
        assert_eq!(store.get("tasks").unwrap(), None);
    }

    #[test]
    fn file_store_set_then_get_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        let mut store = FileStore::new(&path);
        store.set("theme", "dark").unwrap();
        store.set("tasks", r#"{"asignada":[]}"#).unwrap();
        store.set("tasks", r#"{"asignada":[],"completada":[]}"#).unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("theme").unwrap(), Some("dark".to_string()));
        assert_eq!(
            reopened.get("tasks").unwrap(),
            Some(r#"{"asignada":[],"completada":[]}"#.to_string())
        );
    }

    #[test]
    fn file_store_empty_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "").unwrap();
        assert_eq!(FileStore::new(&path).get("tasks").unwrap(), None);
    }

    #[test]
    fn file_store_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "not json {{{").unwrap();
        let mut store = FileStore::new(&path);
        assert!(matches!(store.get("tasks"), Err(StorageError::Malformed { .. })));
        // A broken file is never overwritten
        assert!(store.set("tasks", "{}").is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "not json {{{");
    }
}
