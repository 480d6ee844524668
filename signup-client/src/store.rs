//! Key-value store that keeps the session across runs
//!
//! Plays the part of the browser's local storage: string keys, string values,
//! absence meaning "not set".

use signup_core::{storage_error, SignupResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info};

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> SignupResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> SignupResult<()>;

    fn remove(&self, key: &str) -> SignupResult<()>;
}

/// In-process store, used by tests and the interactive shell's `--ephemeral` mode
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored key
    pub fn keys(&self) -> Vec<String> {
        self.entries
            .read()
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> SignupResult<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| storage_error!("Memory store lock poisoned", "memory_store"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> SignupResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| storage_error!("Memory store lock poisoned", "memory_store"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> SignupResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| storage_error!("Memory store lock poisoned", "memory_store"))?;
        entries.remove(key);
        Ok(())
    }
}

/// Store persisted as a JSON object in a single file
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store, creating the parent directory. A missing file is an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> SignupResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| storage_error!("Failed to create store directory", "file_store", e))?;
        }

        let entries = if path.exists() {
            let json_data = std::fs::read_to_string(&path)
                .map_err(|e| storage_error!("Failed to read store file", "file_store", e))?;
            if json_data.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&json_data)
                    .map_err(|e| storage_error!("Store file is not valid JSON", "file_store", e))?
            }
        } else {
            BTreeMap::new()
        };

        info!("Session store opened at: {}", path.display());

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> SignupResult<()> {
        let json_data = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, json_data)
            .map_err(|e| storage_error!("Failed to write store file", "file_store", e))?;

        debug!("Flushed {} keys to {}", entries.len(), self.path.display());
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> SignupResult<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| storage_error!("File store lock poisoned", "file_store"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> SignupResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| storage_error!("File store lock poisoned", "file_store"))?;
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> SignupResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| storage_error!("File store lock poisoned", "file_store"))?;
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}
