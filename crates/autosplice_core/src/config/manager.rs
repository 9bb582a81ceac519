//! Config manager for loading and saving settings.
//!
//! Saves are atomic: the file is written to a temp path in the same
//! directory, then renamed over the target.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use super::settings::Settings;

/// Errors that can occur during config operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("config file not found: {0}")]
    NotFound(PathBuf),
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Manages the application configuration file.
pub struct ConfigManager {
    config_path: PathBuf,
    settings: Settings,
}

impl ConfigManager {
    /// Create a manager for the given config file path.
    ///
    /// Does not load anything - call `load()` or `load_or_create()` after.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            settings: Settings::default(),
        }
    }

    /// The config file path.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Current settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Mutable settings; changes are in memory until `save()`.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Load the config file, failing if it doesn't exist.
    pub fn load(&mut self) -> ConfigResult<()> {
        if !self.config_path.exists() {
            return Err(ConfigError::NotFound(self.config_path.clone()));
        }
        let content = fs::read_to_string(&self.config_path)?;
        self.settings = toml::from_str(&content)?;
        Ok(())
    }

    /// Load the config file, creating it with defaults if absent.
    pub fn load_or_create(&mut self) -> ConfigResult<()> {
        if self.config_path.exists() {
            self.load()
        } else {
            if let Some(parent) = self.config_path.parent() {
                fs::create_dir_all(parent)?;
            }
            self.settings = Settings::default();
            self.save()?;
            info!("created default config at {}", self.config_path.display());
            Ok(())
        }
    }

    /// Save the settings atomically (temp file + rename).
    pub fn save(&self) -> ConfigResult<()> {
        let content = toml::to_string_pretty(&self.settings)?;
        let tmp_path = self.config_path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, &self.config_path)?;
        Ok(())
    }

    /// Logs folder from the loaded settings.
    pub fn logs_folder(&self) -> PathBuf {
        self.settings.paths.logs_folder.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_or_create_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("autosplice.toml");

        let mut manager = ConfigManager::new(&path);
        manager.load_or_create().unwrap();

        assert!(path.exists());
        assert_eq!(manager.settings().splice.anchor_track, 1);
    }

    #[test]
    fn saved_settings_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autosplice.toml");

        let mut manager = ConfigManager::new(&path);
        manager.load_or_create().unwrap();
        manager.settings_mut().splice.anchor_marker = "CUSTOM_MARKER".to_string();
        manager.save().unwrap();

        let mut reloaded = ConfigManager::new(&path);
        reloaded.load().unwrap();
        assert_eq!(reloaded.settings().splice.anchor_marker, "CUSTOM_MARKER");
    }

    #[test]
    fn load_of_missing_file_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = ConfigManager::new(dir.path().join("missing.toml"));

        let err = manager.load().unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn malformed_config_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[splice\nanchor_track = ").unwrap();

        let mut manager = ConfigManager::new(&path);
        let err = manager.load().unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
