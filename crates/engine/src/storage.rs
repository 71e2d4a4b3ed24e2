//! Durable local persistence port.
//!
//! Two independent keyed blobs: the full table list and the serialized
//! history ledger. Writes happen in the same call as the in-memory
//! mutation; there is no separate flush phase.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Tables,
    History,
}

impl StorageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Tables => "peony_tables",
            StorageKey::History => "peony_history_v3",
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read {key}: {message}")]
    Read { key: &'static str, message: String },
    #[error("failed to write {key}: {message}")]
    Write { key: &'static str, message: String },
}

/// Keyed blob storage (browser localStorage, a directory of files, memory).
pub trait Storage: Send + Sync {
    /// `Ok(None)` when nothing has been stored under `key`.
    fn read(&self, key: StorageKey) -> Result<Option<String>, StorageError>;
    fn write(&self, key: StorageKey, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: StorageKey) -> Result<(), StorageError>;
}

/// In-process storage for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    blobs: Mutex<HashMap<StorageKey, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a blob, e.g. to simulate state left by a previous session.
    pub fn with(self, key: StorageKey, value: impl Into<String>) -> Self {
        self.blobs.lock().insert(key, value.into());
        self
    }

    pub fn get(&self, key: StorageKey) -> Option<String> {
        self.blobs.lock().get(&key).cloned()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        Ok(self.blobs.lock().get(&key).cloned())
    }

    fn write(&self, key: StorageKey, value: &str) -> Result<(), StorageError> {
        self.blobs.lock().insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        self.blobs.lock().remove(&key);
        Ok(())
    }
}

/// Read and decode a blob. Absent, unreadable or corrupt data all yield
/// `None`; the latter two are logged, never propagated.
pub(crate) fn load_json<T: DeserializeOwned>(storage: &dyn Storage, key: StorageKey) -> Option<T> {
    let raw = match storage.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("{}; starting empty", e);
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Discarding corrupt {}: {}", key.as_str(), e);
            None
        }
    }
}

/// Encode and write a blob. Failures are logged; the in-memory state
/// stays authoritative for the rest of the session.
pub(crate) fn store_json<T: Serialize + ?Sized>(storage: &dyn Storage, key: StorageKey, value: &T) {
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("Failed to encode {}: {}", key.as_str(), e);
            return;
        }
    };
    if let Err(e) = storage.write(key, &json) {
        log::warn!("{}", e);
    }
}

pub(crate) fn remove_blob(storage: &dyn Storage, key: StorageKey) {
    if let Err(e) = storage.remove(key) {
        log::warn!("{}", e);
    }
}
