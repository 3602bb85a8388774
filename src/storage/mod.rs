// Storage module - durable key-value persistence for the cart

pub mod file_store;

use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::{StorageError, StorageResult};

pub use file_store::FileStore;

/// Key the serialized cart is stored under
pub const CART_STORAGE_KEY: &str = "@RocketShoes:cart";

/// Synchronous, string-keyed durable store.
///
/// Implementations use interior mutability; all methods take `&self`.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Returns `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Insert or overwrite a value
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a value. Succeeds when the key is already absent.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Drop every key, leaving an empty store that can be written again
    fn clear(&self) -> StorageResult<()>;
}

/// In-process store, mainly for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one value
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut values) = store.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        values.remove(key);
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        values.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_get_set_remove() {
        let store = MemoryStore::new();

        assert_eq!(store.get(CART_STORAGE_KEY).unwrap(), None);

        store.set(CART_STORAGE_KEY, "[]").unwrap();
        assert_eq!(store.get(CART_STORAGE_KEY).unwrap().as_deref(), Some("[]"));

        store.set(CART_STORAGE_KEY, "[1]").unwrap();
        assert_eq!(store.get(CART_STORAGE_KEY).unwrap().as_deref(), Some("[1]"));

        store.remove(CART_STORAGE_KEY).unwrap();
        store.remove(CART_STORAGE_KEY).unwrap();
        assert_eq!(store.get(CART_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn test_memory_store_clear() {
        let store = MemoryStore::with_value(CART_STORAGE_KEY, "[]");
        store.set("other", "x").unwrap();

        store.clear().unwrap();

        assert_eq!(store.get(CART_STORAGE_KEY).unwrap(), None);
        assert_eq!(store.get("other").unwrap(), None);
    }

    #[test]
    fn test_memory_store_with_value() {
        let store = MemoryStore::with_value("k", "v");
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        assert_eq!(store.get("other").unwrap(), None);
    }
}
