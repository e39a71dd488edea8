//! String-keyed persistence boundary.

use std::{collections::HashMap, io};

use thiserror::Error;

/// Failures reported by a persistence store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing medium could not be read or written.
    #[error("save store i/o failed: {0}")]
    Io(#[from] io::Error),
    /// The backing medium holds data the store cannot interpret.
    #[error("save store contents are corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Host key-value service that holds encoded saves.
pub trait SaveStore {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;

    /// Removes every stored value.
    fn clear(&mut self) -> Result<(), StoreError>;
}

/// Volatile store kept entirely in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SaveStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let _ = self.entries.insert(key.to_owned(), value);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.entries.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_overwrites_and_clears() {
        let mut store = MemoryStore::new();
        store.set("s1", "first".to_owned()).expect("set");
        store.set("s1", "second".to_owned()).expect("set");
        assert_eq!(store.get("s1").as_deref(), Some("second"));
        assert_eq!(store.len(), 1);

        store.clear().expect("clear");
        assert!(store.get("s1").is_none());
        assert!(store.is_empty());
    }
}
