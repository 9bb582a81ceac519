//! Application configuration.
//!
//! TOML-backed settings split into logical sections, loaded and saved
//! through [`ConfigManager`].

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    AutoEditorSettings, HostSettings, LoggingSettings, PathSettings, Settings, SpliceSettings,
};
