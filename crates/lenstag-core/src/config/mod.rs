//! Configuration management for LensTag.
//!
//! Configuration is loaded from a TOML file with defaults for every field,
//! then selected fields can be overridden from `LENSTAG_*` environment
//! variables. It is read once at startup and never mutated afterwards.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for LensTag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener settings
    pub server: ServerConfig,

    /// Provider and schema selection
    pub tagging: TaggingConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// LLM provider settings
    pub llm: LlmConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.lenstag.lenstag/config.toml
    /// - Linux: ~/.config/lenstag/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\lenstag\config\config.toml
    ///
    /// Falls back to ~/.lenstag/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "lenstag", "lenstag")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".lenstag").join("config.toml")
            })
    }

    /// Apply `LENSTAG_*` environment overrides on top of the file values.
    ///
    /// Recognised: `LENSTAG_HOST`, `LENSTAG_PORT`, `LENSTAG_PROVIDER`,
    /// `LENSTAG_SCHEMA`, `LENSTAG_MODEL`.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("LENSTAG_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("LENSTAG_PORT") {
            self.server.port = port.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!("LENSTAG_PORT is not a valid port: {port}"))
            })?;
        }
        if let Some(provider) = lookup("LENSTAG_PROVIDER") {
            self.tagging.provider = provider.parse().map_err(ConfigError::ValidationError)?;
        }
        if let Some(schema) = lookup("LENSTAG_SCHEMA") {
            self.tagging.schema = Some(schema.parse().map_err(ConfigError::ValidationError)?);
        }
        if let Some(model) = lookup("LENSTAG_MODEL") {
            self.tagging.model = Some(model);
        }
        self.validate()
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
