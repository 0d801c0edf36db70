//! File-based settings storage.
//!
//! Settings are stored as a single JSON object mapping key to string list
//! in `~/.tutor/settings.json`. Atomic writes are achieved via temp file +
//! rename.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::config::settings_path;
use crate::error::{Result, TutorError};
use crate::storage::SettingsStore;

/// File-based settings storage.
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    /// Path of the settings JSON file.
    path: PathBuf,
}

impl FileSettingsStore {
    /// Create a store at the default location.
    ///
    /// Uses `~/.tutor/settings.json` or `$TUTOR_HOME/settings.json`.
    pub fn new() -> Result<Self> {
        let path = settings_path().ok_or_else(|| {
            TutorError::config("could not determine settings path (no home directory)")
        })?;
        Self::with_path(path)
    }

    /// Create a store at a custom path.
    pub fn with_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| TutorError::storage(parent, e))?;
            }
        }
        Ok(Self { path })
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    fn read_all(&self) -> Result<BTreeMap<String, Vec<String>>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content =
            fs::read_to_string(&self.path).map_err(|e| TutorError::storage(&self.path, e))?;
        serde_json::from_str(&content).map_err(|e| {
            TutorError::serde(format!(
                "invalid settings file {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn write_all(&self, values: &BTreeMap<String, Vec<String>>) -> Result<()> {
        let json = serde_json::to_string_pretty(values)?;
        let temp_path = self.temp_path();

        {
            let mut file =
                fs::File::create(&temp_path).map_err(|e| TutorError::storage(&temp_path, e))?;
            file.write_all(json.as_bytes())
                .map_err(|e| TutorError::storage(&temp_path, e))?;
            file.sync_all()
                .map_err(|e| TutorError::storage(&temp_path, e))?;
        }

        // Rename is atomic on POSIX.
        fs::rename(&temp_path, &self.path).map_err(|e| TutorError::storage(&self.path, e))?;
        Ok(())
    }
}

impl SettingsStore for FileSettingsStore {
    fn get_strings(&self, key: &str) -> Result<Vec<String>> {
        Ok(self.read_all()?.remove(key).unwrap_or_default())
    }

    fn set_strings(&self, key: &str, values: &[String]) -> Result<()> {
        let mut all = self.read_all()?;
        all.insert(key.to_string(), values.to_vec());
        self.write_all(&all)
    }
}
