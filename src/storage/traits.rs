//! Settings storage trait.
//!
//! The core reads and writes lesson progress through this narrow key-value
//! contract; the real persistence backend (on the reference platform, a
//! GSettings-style store) lives outside the crate.

use std::sync::Arc;

use crate::error::Result;

/// Key holding the set of unlocked lesson names.
pub const UNLOCKED_LESSONS_KEY: &str = "unlocked-lessons";

/// Key holding the set of completed ("known") lesson names.
pub const KNOWN_SPELLS_KEY: &str = "known-spells";

/// Key holding registered clues, one JSON object per entry.
pub const CLUES_KEY: &str = "clues";

/// Trait for the settings storage collaborator.
///
/// Values are lists of strings. A key that was never written reads as an
/// empty list.
pub trait SettingsStore: Send + Sync {
    /// Read the string list stored under `key`.
    fn get_strings(&self, key: &str) -> Result<Vec<String>>;

    /// Replace the string list stored under `key`.
    fn set_strings(&self, key: &str, values: &[String]) -> Result<()>;
}

/// Blanket implementation for Arc-wrapped stores, so a store can be shared
/// between the service and tests.
impl<T: SettingsStore + ?Sized> SettingsStore for Arc<T> {
    fn get_strings(&self, key: &str) -> Result<Vec<String>> {
        (**self).get_strings(key)
    }

    fn set_strings(&self, key: &str, values: &[String]) -> Result<()> {
        (**self).set_strings(key, values)
    }
}

/// Test utilities for SettingsStore implementations.
#[cfg(test)]
pub mod tests {
    use super::*;

    /// Shared conformance check for SettingsStore implementations.
    pub fn test_settings_store_roundtrip<S: SettingsStore>(store: &S) {
        // Unwritten keys read as empty.
        assert!(store.get_strings(UNLOCKED_LESSONS_KEY).unwrap().is_empty());

        let values = vec!["intro".to_string(), "terminal".to_string()];
        store.set_strings(UNLOCKED_LESSONS_KEY, &values).unwrap();
        assert_eq!(store.get_strings(UNLOCKED_LESSONS_KEY).unwrap(), values);

        // Keys are independent.
        assert!(store.get_strings(KNOWN_SPELLS_KEY).unwrap().is_empty());

        // Writes replace, not append.
        let replacement = vec!["intro".to_string()];
        store
            .set_strings(UNLOCKED_LESSONS_KEY, &replacement)
            .unwrap();
        assert_eq!(
            store.get_strings(UNLOCKED_LESSONS_KEY).unwrap(),
            replacement
        );

        // Writing an empty list clears the key.
        store.set_strings(UNLOCKED_LESSONS_KEY, &[]).unwrap();
        assert!(store.get_strings(UNLOCKED_LESSONS_KEY).unwrap().is_empty());
    }
}
