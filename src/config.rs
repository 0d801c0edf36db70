//! Configuration loading for the tutor service.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. User config (`~/.tutor/config.toml`)
//! 3. Defaults (lowest priority)
//!
//! All configuration is optional. The service runs with sensible defaults
//! when no config exists.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::error::{Result, TutorError};

/// Environment variable overriding the tutor home directory.
pub const TUTOR_HOME_ENV: &str = "TUTOR_HOME";

/// Environment variable overriding the lessons file path.
pub const TUTOR_LESSONS_FILE_ENV: &str = "TUTOR_LESSONS_FILE";

/// Main configuration struct for the tutor service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Lesson descriptor loading configuration.
    pub lessons: LessonsConfig,
    /// Progress defaults.
    pub progress: ProgressConfig,
}

/// Lesson descriptor loading configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LessonsConfig {
    /// Explicit lessons file path, overriding the default search locations.
    pub file: Option<PathBuf>,
}

/// Progress defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProgressConfig {
    /// Lessons that are always unlocked, even if the stored set is empty
    /// or was reset. The stored set is unioned with this list on read.
    pub always_unlocked: Vec<String>,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            always_unlocked: vec!["tutor".to_string(), "intro".to_string()],
        }
    }
}

impl Config {
    /// Load configuration from the user config file, if present.
    ///
    /// A missing file yields defaults; an unreadable or malformed file is a
    /// config error (the author should see it, not have it masked).
    pub fn load() -> Result<Self> {
        match user_config_path() {
            Some(path) if path.exists() => {
                let content = fs::read_to_string(&path)
                    .map_err(|e| TutorError::storage(&path, e))?;
                toml::from_str(&content).map_err(|e| {
                    TutorError::config(format!("invalid config at {}: {}", path.display(), e))
                })
            }
            _ => Ok(Self::default()),
        }
    }

    /// Candidate lessons file paths, in priority order.
    ///
    /// 1. `TUTOR_LESSONS_FILE` environment variable
    /// 2. An explicit path passed on the command line
    /// 3. `lessons.file` from the config
    /// 4. `<config dir>/tutor/lessons.json`
    pub fn lessons_file_candidates(&self, cmdline: Option<PathBuf>) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Ok(path) = env::var(TUTOR_LESSONS_FILE_ENV) {
            candidates.push(PathBuf::from(path));
        }
        if let Some(path) = cmdline {
            candidates.push(path);
        }
        if let Some(path) = &self.lessons.file {
            candidates.push(path.clone());
        }
        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join("tutor").join("lessons.json"));
        }
        candidates
    }
}

/// Get the tutor home directory.
///
/// Uses `$TUTOR_HOME` if set, otherwise `~/.tutor`.
pub fn tutor_home() -> Option<PathBuf> {
    if let Ok(home) = env::var(TUTOR_HOME_ENV) {
        return Some(PathBuf::from(home));
    }
    dirs::home_dir().map(|home| home.join(".tutor"))
}

/// Path to the user config file.
pub fn user_config_path() -> Option<PathBuf> {
    tutor_home().map(|home| home.join("config.toml"))
}

/// Path to the persisted settings file (unlocked lessons, known spells,
/// clues).
pub fn settings_path() -> Option<PathBuf> {
    tutor_home().map(|home| home.join("settings.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.lessons.file.is_none());
        assert_eq!(
            config.progress.always_unlocked,
            vec!["tutor".to_string(), "intro".to_string()]
        );
    }

    #[test]
    fn test_parse_partial_config() {
        let config: Config = toml::from_str(
            r#"
            [lessons]
            file = "/opt/lessons.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.lessons.file, Some(PathBuf::from("/opt/lessons.json")));
        // Unspecified sections keep their defaults.
        assert_eq!(config.progress.always_unlocked.len(), 2);
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_always_unlocked_override() {
        let config: Config = toml::from_str(
            r#"
            [progress]
            always_unlocked = ["orientation"]
            "#,
        )
        .unwrap();
        assert_eq!(config.progress.always_unlocked, vec!["orientation"]);
    }

    #[test]
    fn test_lessons_file_candidates_ordering() {
        let config: Config = toml::from_str(
            r#"
            [lessons]
            file = "/from/config.json"
            "#,
        )
        .unwrap();
        let candidates = config.lessons_file_candidates(Some(PathBuf::from("/from/cli.json")));
        let cli_pos = candidates
            .iter()
            .position(|p| p == &PathBuf::from("/from/cli.json"))
            .unwrap();
        let config_pos = candidates
            .iter()
            .position(|p| p == &PathBuf::from("/from/config.json"))
            .unwrap();
        assert!(cli_pos < config_pos);
    }
}
