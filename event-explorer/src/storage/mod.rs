//! Durable key-value persistence
//!
//! The store is a passive, synchronous string map. Slices of the state tree
//! write their own keys through it after every mutation. Access from the
//! state layer goes through the best-effort helpers at the bottom of this
//! module: a failing store is logged and otherwise ignored, the in-memory
//! state stays authoritative.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Persisted keys
pub mod keys {
    /// JSON list of favorited events
    pub const FAVORITES: &str = "favorites";
    /// `light`, `dark` or `custom`
    pub const THEME: &str = "theme";
    /// JSON object of the user's custom palette
    pub const CUSTOM_COLORS: &str = "customColors";
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("storage lock poisoned")]
    Poisoned,
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Synchronous, process-local string store.
///
/// Every operation may fail; callers decide whether that matters.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn delete(&self, key: &str) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

/// Read a raw string, logging and swallowing failures.
pub fn load_string(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(key, error = %e, "failed to read from storage");
            None
        }
    }
}

/// Read and decode a JSON value, logging and swallowing failures.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = load_string(store, key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::error!(key, error = %e, "discarding unreadable stored value");
            None
        }
    }
}

/// Write a raw string. Returns whether the write succeeded.
pub fn save_string(store: &dyn KeyValueStore, key: &str, value: &str) -> bool {
    match store.set(key, value) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(key, error = %e, "failed to write to storage");
            false
        }
    }
}

/// Encode as JSON and write. Returns whether the write succeeded.
pub fn save_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> bool {
    match serde_json::to_string(value) {
        Ok(raw) => save_string(store, key, &raw),
        Err(e) => {
            tracing::error!(key, error = %e, "failed to encode value for storage");
            false
        }
    }
}

/// Delete a key. Returns whether the delete succeeded.
pub fn remove(store: &dyn KeyValueStore, key: &str) -> bool {
    match store.delete(key) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(key, error = %e, "failed to delete from storage");
            false
        }
    }
}
