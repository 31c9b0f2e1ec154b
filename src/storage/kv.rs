//! Durable key-value storage
//!
//! The stores persist whole snapshots under fixed keys. [`FileStore`] keeps
//! one `{key}.json` file per key in a data directory; [`MemoryStore`] keeps
//! them in memory and can be told to reject writes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use fs2::FileExt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("Storage I/O failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Storage rejected write to '{key}': {reason}")]
    WriteRejected { key: String, reason: String },
}

impl StorageError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A durable string-to-string map
pub trait KeyValueStore {
    /// Returns the stored value, or `None` if the key was never written
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the value stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// Stores each key as `{dir}/{key}.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the file backing `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let mut file = File::open(&path).map_err(|e| StorageError::io(&path, e))?;

        // Shared lock for reading; released when file is dropped
        file.lock_shared().map_err(|e| StorageError::io(&path, e))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| StorageError::io(&path, e))?;

        Ok(Some(content))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;

        fs::create_dir_all(&self.dir).map_err(|e| StorageError::io(&self.dir, e))?;

        // Writers take `{key}.json.lock` before touching the temp file;
        // released when `lock` is dropped
        let lock_path = path.with_extension("json.lock");
        let lock = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| StorageError::io(&lock_path, e))?;
        lock.lock_exclusive()
            .map_err(|e| StorageError::io(&lock_path, e))?;

        // Write to temp file first
        let temp_path = path.with_extension("json.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|e| StorageError::io(&temp_path, e))?;

            let mut writer = BufWriter::new(&file);
            writer
                .write_all(value.as_bytes())
                .and_then(|_| writer.flush())
                .map_err(|e| StorageError::io(&temp_path, e))?;
            drop(writer);

            file.sync_all().map_err(|e| StorageError::io(&temp_path, e))?;
        }

        // Atomic rename
        fs::rename(&temp_path, &path).map_err(|e| StorageError::io(&path, e))?;
        drop(lock);

        tracing::debug!(key, path = %path.display(), bytes = value.len(), "wrote snapshot");
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    entries: HashMap<String, String>,
    writes: usize,
    reject_writes: Option<String>,
}

/// In-memory storage. Clones share the same entries, so a test can keep a
/// handle after giving one to a store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following write fail with `reason` (e.g. a full quota)
    pub fn reject_writes(&self, reason: impl Into<String>) {
        self.inner.borrow_mut().reject_writes = Some(reason.into());
    }

    /// Lets writes succeed again
    pub fn accept_writes(&self) {
        self.inner.borrow_mut().reject_writes = None;
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.inner.borrow().writes
    }

    /// Seeds a raw value without counting it as a write
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.inner
            .borrow_mut()
            .entries
            .insert(key.to_string(), value.to_string());
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.borrow().entries.get(key).cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let mut inner = self.inner.borrow_mut();
        if let Some(reason) = &inner.reject_writes {
            return Err(StorageError::WriteRejected {
                key: key.to_string(),
                reason: reason.clone(),
            });
        }

        inner.entries.insert(key.to_string(), value.to_string());
        inner.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn read_missing_key() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        assert!(store.get("todo-storage").unwrap().is_none());
    }

    #[test]
    fn write_and_read_value() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        store.set("todo-storage", r#"{"a":1}"#).unwrap();
        assert_eq!(
            store.get("todo-storage").unwrap().as_deref(),
            Some(r#"{"a":1}"#)
        );

        store.set("todo-storage", "replaced").unwrap();
        assert_eq!(store.get("todo-storage").unwrap().as_deref(), Some("replaced"));
    }

    #[test]
    fn creates_data_directory() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("data"));

        store.set("ui-storage", "{}").unwrap();
        assert!(store.path_for("ui-storage").unwrap().exists());
    }

    #[test]
    fn atomic_write_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        store.set("todo-storage", "{}").unwrap();

        let temp_path = store
            .path_for("todo-storage")
            .unwrap()
            .with_extension("json.tmp");
        assert!(!temp_path.exists());
    }

    #[test]
    fn writer_waits_for_lock_before_touching_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let path = store.path_for("todo-storage").unwrap();
        let temp_path = path.with_extension("json.tmp");
        let partial = r#"{"schemaVersion":1,"tasks":"#;

        // Another writer halfway through its snapshot
        let lock = File::create(path.with_extension("json.lock")).unwrap();
        lock.lock_exclusive().unwrap();
        fs::write(&temp_path, partial).unwrap();

        let writer = {
            let store = store.clone();
            thread::spawn(move || store.set("todo-storage", r#"{"schemaVersion":1,"tasks":[]}"#))
        };
        thread::sleep(Duration::from_millis(200));

        assert_eq!(fs::read_to_string(&temp_path).unwrap(), partial);

        drop(lock);
        writer.join().unwrap().unwrap();
        assert_eq!(
            store.get("todo-storage").unwrap().as_deref(),
            Some(r#"{"schemaVersion":1,"tasks":[]}"#)
        );
    }

    #[test]
    fn concurrent_writers_leave_a_whole_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let writers = 8;
        let barrier = Arc::new(Barrier::new(writers));

        let values: Vec<String> = (0..writers)
            .map(|i| format!(r#"{{"writer":{},"pad":"{}"}}"#, i, "x".repeat((writers - i) * 4096)))
            .collect();

        let handles: Vec<_> = values
            .iter()
            .cloned()
            .map(|value| {
                let store = store.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for _ in 0..5 {
                        store.set("todo-storage", &value).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let saved = store.get("todo-storage").unwrap().unwrap();
        assert!(serde_json::from_str::<serde_json::Value>(&saved).is_ok());
        assert!(values.contains(&saved));
    }

    #[test]
    fn rejects_path_like_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        assert!(matches!(
            store.set("../escape", "x"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(store.get(""), Err(StorageError::InvalidKey(_))));
    }

    #[test]
    fn write_failure_reports_io_error() {
        let dir = TempDir::new().unwrap();
        // A regular file where the data directory should be
        let blocker = dir.path().join("blocked");
        fs::write(&blocker, "not a directory").unwrap();
        let store = FileStore::new(&blocker);

        assert!(matches!(
            store.set("todo-storage", "{}"),
            Err(StorageError::Io { .. })
        ));
    }

    #[test]
    fn memory_store_clones_share_entries() {
        let store = MemoryStore::new();
        let handle = store.clone();

        store.set("todo-storage", "value").unwrap();
        assert_eq!(handle.raw("todo-storage").as_deref(), Some("value"));
        assert_eq!(handle.write_count(), 1);
    }

    #[test]
    fn memory_store_can_reject_writes() {
        let store = MemoryStore::new();
        store.reject_writes("quota exceeded");

        let err = store.set("todo-storage", "value").unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
        assert_eq!(store.write_count(), 0);

        store.accept_writes();
        store.set("todo-storage", "value").unwrap();
        assert_eq!(store.write_count(), 1);
    }
}
