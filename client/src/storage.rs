use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage io failure: {0}")]
    Io(#[from] io::Error),
    #[error("storage document corrupt: {0}")]
    Corrupt(String),
}

/// Synchronous key-value persistence for token material.
///
/// Implementations must complete writes before returning so that a crash
/// immediately after `set_item` still observes the value; they must never
/// block on network I/O.
pub trait DurableStorage: Send + Sync {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove_item(&self, key: &str) -> StorageResult<()>;
}

/// Process-local storage; tokens do not survive a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DurableStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.items.lock().expect("lock poisoned").get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.items
            .lock()
            .expect("lock poisoned")
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.items.lock().expect("lock poisoned").remove(key);
        Ok(())
    }
}

/// Single JSON document on disk, rewritten whole on every mutation.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> StorageResult<HashMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => {
                serde_json::from_str(&raw).map_err(|err| StorageError::Corrupt(err.to_string()))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_all(&self, items: &HashMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(items)
            .map_err(|err| StorageError::Corrupt(err.to_string()))?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl DurableStorage for FileStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.read_all()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut items = self.read_all()?;
        items.insert(key.to_owned(), value.to_owned());
        self.write_all(&items)
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        let mut items = self.read_all()?;
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }
}
