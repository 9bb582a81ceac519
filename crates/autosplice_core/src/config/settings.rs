//! Settings struct with TOML-based sections.
//!
//! Every field carries a serde default so a partial config file (or an
//! empty one) loads cleanly; missing sections fall back whole.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::logging::LogLevel;
use crate::splice::{RetryPolicy, SpliceConfig};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path candidates and folders.
    #[serde(default)]
    pub paths: PathSettings,

    /// Splice-engine parameters.
    #[serde(default)]
    pub splice: SpliceSettings,

    /// External silence-removal tool.
    #[serde(default)]
    pub auto_editor: AutoEditorSettings,

    /// Host connection and launch behavior.
    #[serde(default)]
    pub host: HostSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// Directories searched for exported edit files; defaults to the
    /// recordings directories when not configured (the silence-removal
    /// tool exports next to its input).
    pub fn edit_export_dirs(&self) -> &[PathBuf] {
        if self.paths.edit_export_dirs.is_empty() {
            &self.paths.recordings_dirs
        } else {
            &self.paths.edit_export_dirs
        }
    }
}

/// Candidate paths for synced folders that mount under different roots
/// per machine; the first existing entry wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathSettings {
    /// Folders holding screen recordings (`.mkv`).
    #[serde(default)]
    pub recordings_dirs: Vec<PathBuf>,

    /// Folders holding exported edits; empty means "same as recordings".
    #[serde(default)]
    pub edit_export_dirs: Vec<PathBuf>,

    /// Candidate paths of the ending clip to append.
    #[serde(default)]
    pub ending_clips: Vec<PathBuf>,

    /// Optional project template archive (`.drp`) to start each run from.
    #[serde(default)]
    pub template_project: Option<PathBuf>,

    /// Folder for run log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: PathBuf,
}

fn default_logs_folder() -> PathBuf {
    PathBuf::from(".logs")
}

/// Splice-engine parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpliceSettings {
    /// Marker substring identifying the anchor clip on the destination.
    #[serde(default = "default_anchor_marker")]
    pub anchor_marker: String,

    /// 1-based video track scanned for the anchor.
    #[serde(default = "default_anchor_track")]
    pub anchor_track: u32,

    /// Name of the persistent destination timeline.
    #[serde(default = "default_main_timeline")]
    pub main_timeline: String,

    /// Append retry budget.
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,

    /// Backoff delay between append attempts, in seconds.
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
}

fn default_anchor_marker() -> String {
    "01_EBI_CHAN_OP".to_string()
}

fn default_anchor_track() -> u32 {
    1
}

fn default_main_timeline() -> String {
    "main".to_string()
}

fn default_retry_max_attempts() -> u32 {
    3
}

fn default_retry_delay_secs() -> u64 {
    2
}

impl Default for SpliceSettings {
    fn default() -> Self {
        Self {
            anchor_marker: default_anchor_marker(),
            anchor_track: default_anchor_track(),
            main_timeline: default_main_timeline(),
            retry_max_attempts: default_retry_max_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
        }
    }
}

impl SpliceSettings {
    /// Engine-level splice configuration derived from these settings.
    pub fn to_splice_config(&self) -> SpliceConfig {
        SpliceConfig {
            anchor_marker: self.anchor_marker.clone(),
            anchor_track: self.anchor_track,
            retry: RetryPolicy::new(
                self.retry_max_attempts,
                Duration::from_secs(self.retry_delay_secs),
            ),
        }
    }
}

/// External silence-removal tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoEditorSettings {
    /// Whether the silence-cut step runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Executable name or path.
    #[serde(default = "default_auto_editor_exe")]
    pub executable: String,

    /// Silence margin kept around cuts.
    #[serde(default = "default_margin")]
    pub margin: String,

    /// Edit expression passed to the tool.
    #[serde(default = "default_edit")]
    pub edit: String,

    /// Export format.
    #[serde(default = "default_export")]
    pub export: String,
}

fn default_true() -> bool {
    true
}

fn default_auto_editor_exe() -> String {
    "auto-editor".to_string()
}

fn default_margin() -> String {
    "0.2sec".to_string()
}

fn default_edit() -> String {
    "audio:threshold=1%".to_string()
}

fn default_export() -> String {
    "resolve".to_string()
}

impl Default for AutoEditorSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            executable: default_auto_editor_exe(),
            margin: default_margin(),
            edit: default_edit(),
            export: default_export(),
        }
    }
}

/// Host connection and launch behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostSettings {
    /// Connection attempts after launching the host.
    #[serde(default = "default_connect_retries")]
    pub connect_retries: u32,

    /// Interval between connection attempts, in seconds.
    #[serde(default = "default_connect_interval_secs")]
    pub connect_interval_secs: u64,

    /// Grace period after spawning the host before connecting, in seconds.
    #[serde(default = "default_launch_grace_secs")]
    pub launch_grace_secs: u64,
}

fn default_connect_retries() -> u32 {
    60
}

fn default_connect_interval_secs() -> u64 {
    1
}

fn default_launch_grace_secs() -> u64 {
    10
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            connect_retries: default_connect_retries(),
            connect_interval_secs: default_connect_interval_secs(),
            launch_grace_secs: default_launch_grace_secs(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Minimum level written to stderr and the log file.
    #[serde(default)]
    pub level: LogLevel,

    /// Whether runs also write a log file under `paths.logs_folder`.
    #[serde(default = "default_true")]
    pub file_logging: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            file_logging: default_true(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_loads_with_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.splice.anchor_marker, "01_EBI_CHAN_OP");
        assert_eq!(settings.splice.anchor_track, 1);
        assert_eq!(settings.splice.retry_max_attempts, 3);
        assert!(settings.auto_editor.enabled);
        assert_eq!(settings.host.connect_retries, 60);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [splice]
            anchor_marker = "MY_OPENER"
            "#,
        )
        .unwrap();
        assert_eq!(settings.splice.anchor_marker, "MY_OPENER");
        assert_eq!(settings.splice.main_timeline, "main");
    }

    #[test]
    fn edit_export_dirs_fall_back_to_recordings() {
        let mut settings = Settings::default();
        settings.paths.recordings_dirs = vec![PathBuf::from("/rec")];
        assert_eq!(settings.edit_export_dirs(), &[PathBuf::from("/rec")]);

        settings.paths.edit_export_dirs = vec![PathBuf::from("/exports")];
        assert_eq!(settings.edit_export_dirs(), &[PathBuf::from("/exports")]);
    }

    #[test]
    fn splice_config_mirrors_settings() {
        let settings = SpliceSettings {
            retry_max_attempts: 5,
            retry_delay_secs: 1,
            ..Default::default()
        };
        let config = settings.to_splice_config();
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.delay, Duration::from_secs(1));
    }

    #[test]
    fn settings_round_trip_through_toml() {
        let settings = Settings::default();
        let text = toml::to_string_pretty(&settings).unwrap();
        let back: Settings = toml::from_str(&text).unwrap();
        assert_eq!(back.splice.anchor_marker, settings.splice.anchor_marker);
        assert_eq!(back.logging.file_logging, settings.logging.file_logging);
    }
}
