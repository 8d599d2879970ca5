//! Configuration management for the dstar directive engine.
//!
//! Parses `dstar.toml` with serde. Every section is optional and falls back
//! to the defaults below:
//!
//! ```toml
//! [scan]
//! root = "body"
//!
//! [actions]
//! base_extension = "action"
//! ```
//!
//! Without an explicit path, [`Config::load`] looks for `dstar.toml` in the
//! current directory and its parents.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "dstar.toml";

/// Engine configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directive scan settings.
    pub scan: ScanConfig,
    /// Action registry settings.
    pub actions: ActionsConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Directive scan configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Tag of the element every scan starts from.
    ///
    /// When the document has no such element the scan starts at the
    /// document root.
    pub root: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root: "body".to_owned(),
        }
    }
}

/// Action registry configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ActionsConfig {
    /// Extension that every action implicitly requires.
    pub base_extension: String,
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            base_extension: "action".to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `dstar.toml` in the current directory and parents, and falls back
    /// to defaults when none is found.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, or if reading,
    /// parsing or validation fails.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::load_from_file(path);
        }

        let discovered = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_from(&cwd));
        match discovered {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.scan.root, "scan.root")?;

        let base = &self.actions.base_extension;
        require_non_empty(base, "actions.base_extension")?;
        if base.to_lowercase() != *base {
            return Err(ConfigError::Validation(
                "actions.base_extension must be lowercase".to_owned(),
            ));
        }

        Ok(())
    }

    /// Search for the config file in `start` and its parents.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }
}
