/// Persistence bridge: maps the entity store to and from a key-value store.
///
/// Two keys, one JSON array each. Loading is tolerant: a missing or malformed
/// key yields an empty collection, and tasks whose column did not survive the
/// load are dropped. Saving skips any key whose serialized value matches what
/// was last written.
pub mod local;
pub mod writer;

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::store::EntityStore;
use crate::types::{Column, Task};

pub use local::{FileKeyValueStore, MemoryKeyValueStore};
pub use writer::PersistWriter;

pub const DEFAULT_COLUMNS_KEY: &str = "kanban_columns";
pub const DEFAULT_TASKS_KEY: &str = "kanban_tasks";

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// String key-value storage, one opaque value per key.
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`, or `None` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>, PersistError>;

    fn set(&self, key: &str, value: &str) -> Result<(), PersistError>;

    /// Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), PersistError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        (**self).remove(key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub columns: String,
    pub tasks: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS_KEY.to_string(),
            tasks: DEFAULT_TASKS_KEY.to_string(),
        }
    }
}

/// SHA-256 fingerprint of a serialized value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentFingerprint(pub String);

impl ContentFingerprint {
    pub fn from_content(content: &str) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }
}

/// Receiver of committed snapshots at the end of each turn.
///
/// Submitting never fails from the caller's point of view; sinks report their
/// own errors through the log.
pub trait PersistSink {
    fn submit(&mut self, store: &EntityStore);
}

pub struct PersistenceBridge<S: KeyValueStore> {
    kv: S,
    keys: StorageKeys,
    /// key -> fingerprint of the value last read or written
    written: HashMap<String, ContentFingerprint>,
}

impl<S: KeyValueStore> PersistenceBridge<S> {
    pub fn new(kv: S) -> Self {
        Self::with_keys(kv, StorageKeys::default())
    }

    pub fn with_keys(kv: S, keys: StorageKeys) -> Self {
        Self {
            kv,
            keys,
            written: HashMap::new(),
        }
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    /// Load the persisted store. Never fails; problems are logged and the
    /// affected collection starts empty.
    pub fn load(&mut self) -> EntityStore {
        let columns_key = self.keys.columns.clone();
        let tasks_key = self.keys.tasks.clone();
        let columns: Vec<Column> = self.load_key(&columns_key);
        let tasks: Vec<Task> = self.load_key(&tasks_key);

        let (store, dropped) = EntityStore::from_persisted(columns, tasks);
        if !dropped.is_empty() {
            log::warn!(
                "[dragboard.persist] Dropped {} task(s) without a column: {}",
                dropped.len(),
                dropped.iter().map(|t| t.id.as_str()).collect::<Vec<_>>().join(", ")
            );
            // the stored tasks value no longer matches the store
            self.written.remove(&tasks_key);
        }
        log::debug!(
            "[dragboard.persist] Loaded {} column(s), {} task(s)",
            store.columns().len(),
            store.tasks().len()
        );
        store
    }

    fn load_key<T: DeserializeOwned>(&mut self, key: &str) -> Vec<T> {
        let raw = match self.kv.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                log::info!("[dragboard.persist] No value for {}, starting empty", key);
                return Vec::new();
            }
            Err(e) => {
                log::warn!("[dragboard.persist] Failed to read {}: {}", key, e);
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(items) => {
                self.written
                    .insert(key.to_string(), ContentFingerprint::from_content(&raw));
                items
            }
            Err(e) => {
                log::warn!("[dragboard.persist] Malformed value for {}: {}", key, e);
                Vec::new()
            }
        }
    }

    /// Write both collections. Keys whose value is unchanged since the last
    /// read or write are skipped.
    pub fn save(&mut self, store: &EntityStore) -> Result<(), PersistError> {
        let columns = serde_json::to_string(store.columns())?;
        let tasks = serde_json::to_string(store.tasks())?;
        let columns_key = self.keys.columns.clone();
        let tasks_key = self.keys.tasks.clone();
        self.save_key(&columns_key, &columns)?;
        self.save_key(&tasks_key, &tasks)?;
        Ok(())
    }

    fn save_key(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        let fingerprint = ContentFingerprint::from_content(value);
        if self.written.get(key) == Some(&fingerprint) {
            log::trace!("[dragboard.persist] {} unchanged, skipping", key);
            return Ok(());
        }
        self.kv.set(key, value)?;
        self.written.insert(key.to_string(), fingerprint);
        log::debug!("[dragboard.persist] Wrote {} ({} bytes)", key, value.len());
        Ok(())
    }

    /// Remove both keys.
    pub fn clear(&mut self) -> Result<(), PersistError> {
        self.kv.remove(&self.keys.columns)?;
        self.kv.remove(&self.keys.tasks)?;
        self.written.clear();
        log::info!("[dragboard.persist] Cleared persisted board");
        Ok(())
    }
}

impl<S: KeyValueStore> PersistSink for PersistenceBridge<S> {
    fn submit(&mut self, store: &EntityStore) {
        if let Err(e) = self.save(store) {
            log::error!("[dragboard.persist] Save failed: {}", e);
        }
    }
}
