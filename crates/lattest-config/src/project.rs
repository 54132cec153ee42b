//! Project Configuration (lattest.toml)
//!
//! Handles configuration stored in `lattest.toml` next to the test suites.

use crate::{ConfigError, ConfigResult};
use serde::Deserialize;
use std::path::Path;

/// Project configuration from lattest.toml
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// How test cases are executed
    pub runner: Option<RunnerConfig>,

    /// How results are presented
    pub report: Option<ReportConfig>,
}

/// Runner configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct RunnerConfig {
    /// Interpreter command used to run compiled bytecode (default: "lli")
    pub interpreter: Option<String>,

    /// Per-invocation timeout in seconds (default: none)
    pub timeout: Option<u64>,

    /// Suites to run when none are named on the command line
    pub suites: Option<Vec<String>>,
}

/// Report configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// Print a totals line after all suites
    pub summary: Option<bool>,
}

impl ProjectConfig {
    /// Load project configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::TomlParseError { error, .. } => ConfigError::TomlParseError {
                file: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::TomlParseError {
            file: Default::default(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the project configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(runner) = &self.runner {
            if let Some(interpreter) = &runner.interpreter {
                if interpreter.trim().is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: "runner.interpreter".to_string(),
                        reason: "interpreter cannot be empty".to_string(),
                    });
                }
            }

            if runner.timeout == Some(0) {
                return Err(ConfigError::InvalidValue {
                    field: "runner.timeout".to_string(),
                    reason: "timeout must be at least one second".to_string(),
                });
            }

            if let Some(suites) = &runner.suites {
                if let Some(empty) = suites.iter().position(|s| s.is_empty()) {
                    return Err(ConfigError::InvalidValue {
                        field: format!("runner.suites[{}]", empty),
                        reason: "suite name cannot be empty".to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Get the configured interpreter, if present
    pub fn interpreter(&self) -> Option<&str> {
        self.runner.as_ref().and_then(|r| r.interpreter.as_deref())
    }

    /// Get the configured timeout in seconds, if present
    pub fn timeout_secs(&self) -> Option<u64> {
        self.runner.as_ref().and_then(|r| r.timeout)
    }

    /// Get the configured default suites, if present
    pub fn suites(&self) -> Option<&[String]> {
        self.runner.as_ref().and_then(|r| r.suites.as_deref())
    }

    /// Whether the summary line is requested
    pub fn summary(&self) -> Option<bool> {
        self.report.as_ref().and_then(|r| r.summary)
    }
}
