//! Configuration system for MatchForge.
//!
//! Load matching configuration from TOML or YAML files to tune the background
//! executor, the solver sentinel and log filtering without code changes.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use matchforge_config::MatchingConfig;
//! use std::time::Duration;
//!
//! let config = MatchingConfig::from_toml_str(r#"
//!     [executor]
//!     thread_name = "matching"
//!     shutdown_timeout_ms = 250
//!
//!     [solver]
//!     unassigned_sentinel = -2
//! "#).unwrap();
//!
//! assert_eq!(config.executor.thread_name, "matching");
//! assert_eq!(config.executor.shutdown_timeout(), Duration::from_millis(250));
//! assert_eq!(config.solver.unassigned_sentinel, -2);
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use matchforge_config::MatchingConfig;
//!
//! let config = MatchingConfig::load("matchforge.toml").unwrap_or_default();
//! // Proceeds with defaults if file doesn't exist
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main matching configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MatchingConfig {
    /// Background executor configuration.
    #[serde(default)]
    pub executor: ExecutorConfig,

    /// Assignment solver configuration.
    #[serde(default)]
    pub solver: SolverConfig,

    /// Log filtering configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MatchingConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist, contains invalid TOML, or fails
    /// validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.executor.thread_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "executor.thread_name must not be empty".to_string(),
            ));
        }
        if self.executor.thread_name.contains('\0') {
            return Err(ConfigError::Invalid(
                "executor.thread_name must not contain a NUL byte".to_string(),
            ));
        }
        Ok(())
    }

    /// Sets the worker thread name.
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.executor.thread_name = name.into();
        self
    }

    /// Sets the default shutdown timeout.
    pub fn with_shutdown_timeout_ms(mut self, millis: u64) -> Self {
        self.executor.shutdown_timeout_ms = millis;
        self
    }

    /// Sets the sentinel the default solver uses for unassigned rows/columns.
    pub fn with_unassigned_sentinel(mut self, sentinel: i64) -> Self {
        self.solver.unassigned_sentinel = sentinel;
        self
    }

    /// Sets the log filter directive.
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.logging.filter = filter.into();
        self
    }
}

/// Background executor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ExecutorConfig {
    /// Name given to the worker thread.
    pub thread_name: String,

    /// Milliseconds to wait for the worker when shutting down implicitly.
    pub shutdown_timeout_ms: u64,
}

impl ExecutorConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            thread_name: "matchforge-worker".to_string(),
            shutdown_timeout_ms: 5_000,
        }
    }
}

/// Assignment solver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SolverConfig {
    /// Value the solver reports for unassigned rows and columns.
    pub unassigned_sentinel: i64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            unassigned_sentinel: -1,
        }
    }
}

/// Log filtering configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct LoggingConfig {
    /// `tracing-subscriber` filter directive applied when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "matchforge=info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests;
