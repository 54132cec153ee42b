//! Lattest Configuration System
//!
//! Provides configuration management for lattest runs:
//! - Project configuration (`lattest.toml`, found next to the suites)
//! - Environment variable overrides (`LATTEST_*`)
//! - Configuration precedence and merging
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Project config (`lattest.toml`, searched upwards from the suite root)
//! 3. Environment variables (`LATTEST_*`)
//! 4. CLI flags (applied by the caller)
//!
//! # Example
//!
//! ```no_run
//! use lattest_config::ConfigLoader;
//! use std::path::Path;
//!
//! let loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! println!("interpreter: {}", config.interpreter());
//! ```

pub mod loader;
pub mod project;

use std::path::PathBuf;
use thiserror::Error;

/// Name of the project configuration file
pub const CONFIG_FILE_NAME: &str = "lattest.toml";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

pub use loader::{parse_timeout, Config, ConfigLoader, DEFAULT_INTERPRETER};
pub use project::{ProjectConfig, ReportConfig, RunnerConfig};
