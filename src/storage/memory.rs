//! In-memory settings storage for testing.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::Result;
use crate::storage::SettingsStore;

/// In-memory settings store.
///
/// Thread-safe implementation using `RwLock<HashMap>`. Values are lost when
/// the store is dropped; intended for unit tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: RwLock<HashMap<String, Vec<String>>>,
}

impl MemorySettingsStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
        }
    }

    /// Number of keys with a stored value.
    pub fn len(&self) -> usize {
        self.values.read().unwrap().len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.values.read().unwrap().is_empty()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get_strings(&self, key: &str) -> Result<Vec<String>> {
        let values = self.values.read().unwrap();
        Ok(values.get(key).cloned().unwrap_or_default())
    }

    fn set_strings(&self, key: &str, new_values: &[String]) -> Result<()> {
        let mut values = self.values.write().unwrap();
        values.insert(key.to_string(), new_values.to_vec());
        Ok(())
    }
}
