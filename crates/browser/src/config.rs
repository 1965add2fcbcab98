//! Configuration management for FileView.
//!
//! This module provides TOML-based configuration file loading and saving.
//! The default configuration path is `~/.config/fileview/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::service::{ListOptions, SortOrder, DEFAULT_PREVIEW_CHARS};

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("storage.root must not be empty")]
    EmptyRoot,

    #[error("preview_chars must be greater than 0, got {0}")]
    InvalidPreviewChars(usize),

    #[error("log level must be one of: trace, debug, info, warn, error; got {0}")]
    InvalidLogLevel(String),
}

/// Valid log level values for tracing configuration.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Default maximum readable file size (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Main configuration structure for FileView.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    /// Root directory and read limits.
    pub storage: StorageConfig,

    /// Listing and preview defaults.
    pub browse: BrowseConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Root directory and read limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory outside which nothing is ever read or reported.
    pub root: PathBuf,

    /// Maximum readable file size in bytes. Zero means unlimited.
    pub max_file_size: u64,
}

/// Listing and preview defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BrowseConfig {
    /// Include dotfiles in listings.
    pub show_hidden: bool,

    /// Default listing order.
    pub sort: SortOrder,

    /// Characters shown in a content preview.
    pub preview_chars: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    pub level: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            show_hidden: false,
            sort: SortOrder::Name,
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Returns the default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fileview")
        .join("config.toml")
}

impl Config {
    /// Apply environment variable overrides to the configuration.
    ///
    /// Environment variables take precedence over config file values.
    /// Supported variables:
    /// - FILEVIEW_ROOT: Override the root directory
    /// - FILEVIEW_MAX_FILE_SIZE: Override the maximum file size in bytes
    /// - FILEVIEW_LOG_LEVEL: Override log level (trace, debug, info, warn, error)
    pub fn apply_env_overrides(&mut self) {
        if let Ok(root) = std::env::var("FILEVIEW_ROOT") {
            if !root.is_empty() {
                tracing::info!("Overriding root from environment: {}", root);
                self.storage.root = PathBuf::from(root);
            }
        }

        if let Ok(max) = std::env::var("FILEVIEW_MAX_FILE_SIZE") {
            match max.parse::<u64>() {
                Ok(bytes) => {
                    tracing::info!("Overriding max_file_size from environment: {}", bytes);
                    self.storage.max_file_size = bytes;
                }
                Err(_) => {
                    tracing::warn!("Ignoring invalid FILEVIEW_MAX_FILE_SIZE: {:?}", max);
                }
            }
        }

        if let Ok(level) = std::env::var("FILEVIEW_LOG_LEVEL") {
            if !level.is_empty() {
                tracing::info!("Overriding log level from environment: {}", level);
                self.logging.level = level;
            }
        }
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.root.as_os_str().is_empty() {
            return Err(ConfigError::EmptyRoot);
        }

        if self.browse.preview_chars == 0 {
            return Err(ConfigError::InvalidPreviewChars(self.browse.preview_chars));
        }

        let level = self.logging.level.to_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.logging.level.clone()));
        }

        Ok(())
    }

    /// Listing options derived from the browse defaults.
    pub fn list_options(&self) -> ListOptions {
        ListOptions {
            show_hidden: self.browse.show_hidden,
            sort: self.browse.sort,
            pattern: None,
        }
    }

    /// Load configuration from a file.
    ///
    /// If the file does not exist, returns the default configuration.
    /// If the file exists but is invalid TOML, returns an error with
    /// a helpful message.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self> {
        Self::load(default_config_path())
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| anyhow::anyhow!("Invalid TOML configuration: {}", format_toml_error(&e)))
    }

    /// Save configuration to a file.
    ///
    /// Creates parent directories if they don't exist.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = self.to_toml()?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::debug!("Configuration saved to {:?}", path);
        Ok(())
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }
}

/// Format a TOML deserialization error for user-friendly display.
fn format_toml_error(error: &toml::de::Error) -> String {
    let mut msg = error.message().to_string();

    if let Some(span) = error.span() {
        msg.push_str(&format!(" (at position {}..{})", span.start, span.end));
    }

    msg
}
