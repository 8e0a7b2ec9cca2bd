//! Bridge configuration
//!
//! TOML/JSON configuration files plus environment-variable overrides.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Config parse error: {0}")]
    ParseError(String),
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Bridge-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Engine identification reported to embedding hosts.
    #[serde(default = "default_language_name")]
    pub language_name: String,

    /// Re-resolve a property name after writing it, as a validation step.
    #[serde(default = "default_true")]
    pub validate_puts: bool,

    /// Per-evaluation debug tracing in the embedding engine.
    #[serde(default)]
    pub trace_calls: bool,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_language_name() -> String {
    "script_bridge".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            language_name: default_language_name(),
            validate_puts: true,
            trace_calls: false,
            logging: LoggingConfig::default(),
        }
    }
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Apply environment-variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("BRIDGE_VALIDATE_PUTS") {
            if let Ok(flag) = val.parse() {
                self.validate_puts = flag;
            }
        }
        if let Ok(val) = env::var("BRIDGE_TRACE_CALLS") {
            if let Ok(flag) = val.parse() {
                self.trace_calls = flag;
            }
        }
        if let Ok(val) = env::var("BRIDGE_LOG_LEVEL") {
            self.logging.level = val;
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.language_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "language_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Initialize the global tracing subscriber. `RUST_LOG` wins over the
/// configured level; repeated calls are no-ops.
pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
