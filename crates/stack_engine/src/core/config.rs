//! # Editor Configuration
//!
//! Settings the editor reads at startup: log level, toolbox set, window
//! size and where parts and sessions live. Stored as TOML or RON through
//! [`Config`], or read from the legacy line-based `StackEditor.cfg`:
//!
//! ```text
//! resolution 1280 800
//! tbxset default
//! loglevel debug
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::assets::LineReader;
use crate::foundation::logging;

pub use crate::config::{Config, ConfigError};

/// # Editor Configuration
///
/// Everything an [`EditorSession`](crate::session::EditorSession) needs to
/// locate its files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Log level name, see [`logging::parse_level`]
    pub log_level: String,
    /// Toolbox set shown in the part picker
    pub toolbox_set: String,
    /// Window size, `None` for the platform default
    pub window_resolution: Option<(u32, u32)>,
    /// Base directory sessions and parts are resolved against
    pub working_directory: PathBuf,
    /// Part configs directory, relative to the working directory
    pub parts_subdirectory: PathBuf,
}

impl EditorConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self {
            log_level: "warn".to_string(),
            toolbox_set: "default".to_string(),
            window_resolution: None,
            working_directory: PathBuf::from("."),
            parts_subdirectory: PathBuf::from("Config"),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the working directory
    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = dir.into();
        self
    }

    /// Directory part configs are read from
    pub fn parts_directory(&self) -> PathBuf {
        self.working_directory.join(&self.parts_subdirectory)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if logging::parse_level(&self.log_level).is_none() {
            return Err(format!("Unknown log level: {}", self.log_level));
        }
        if self.toolbox_set.trim().is_empty() {
            return Err("Toolbox set cannot be empty".to_string());
        }
        if let Some((width, height)) = self.window_resolution {
            if width == 0 || height == 0 {
                return Err(format!("Window resolution must be non-zero, got {}x{}", width, height));
            }
        }
        if self.parts_subdirectory.is_absolute() {
            return Err("Parts subdirectory must be relative to the working directory".to_string());
        }
        Ok(())
    }

    /// Load from a TOML/RON file and validate
    pub fn load_validated(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let config = Self::load_from_file(path)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Read the legacy `StackEditor.cfg` format.
    ///
    /// Bad entries are logged and skipped; the matching default stays in
    /// place.
    pub fn from_legacy_cfg(text: &str) -> Self {
        let mut config = Self::new();
        let mut reader = LineReader::new(text);

        while let Some(tokens) = reader.next_tokens() {
            let line = reader.line_number();
            match tokens.as_slice() {
                [] => {}
                ["resolution", width, height] => match (width.parse(), height.parse()) {
                    (Ok(width), Ok(height)) => config.window_resolution = Some((width, height)),
                    _ => log::warn!("Line {}: bad resolution '{} {}'", line, width, height),
                },
                ["resolution", ..] => log::warn!("Line {}: resolution needs a width and a height", line),
                ["tbxset", name @ ..] if !name.is_empty() => config.toolbox_set = name.join(" "),
                ["tbxset"] => log::warn!("Line {}: missing toolbox set name", line),
                ["loglevel", level, rest @ ..] => {
                    let level = level.to_ascii_lowercase();
                    if logging::parse_level(&level).is_some() {
                        config.log_level = level;
                    } else {
                        log::warn!("Line {}: bad loglevel '{}', defaulting to warn", line, level);
                    }
                    if !rest.is_empty() {
                        log::warn!("Line {}: unusual loglevel setting, too many arguments", line);
                    }
                }
                ["loglevel"] => log::warn!("Line {}: missing loglevel setting, defaulting to warn", line),
                _ => {}
            }
        }
        config
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for EditorConfig {}
