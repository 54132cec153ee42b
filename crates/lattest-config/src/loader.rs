//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::project::ProjectConfig;
use crate::{ConfigError, ConfigResult, CONFIG_FILE_NAME};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Interpreter used when nothing else is configured
pub const DEFAULT_INTERPRETER: &str = "lli";

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Project config (lattest.toml) - lowest priority
/// 2. Environment variables (LATTEST_*) - overrides project
/// 3. CLI flags - highest priority (handled by caller)
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Skip the environment override pass
    ignore_env: bool,
}

/// Merged configuration result
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Project configuration, with environment overrides applied
    pub project: ProjectConfig,

    /// Directory where lattest.toml was found
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { ignore_env: false }
    }

    /// Do not read `LATTEST_*` environment variables
    pub fn without_env(mut self) -> Self {
        self.ignore_env = true;
        self
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find lattest.toml, then applies
    /// environment overrides.
    pub fn load_from_directory(&self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project_config) = self.find_project_config(start_dir)?;
        let project_config = self.apply_env_overrides(project_config)?;

        Ok(Config {
            project: project_config,
            project_root,
        })
    }

    /// Load configuration from a specific config file
    pub fn load_from_file(&self, config_path: &Path) -> ConfigResult<Config> {
        let project_config = ProjectConfig::load_from_file(config_path)?;
        let project_config = self.apply_env_overrides(project_config)?;

        Ok(Config {
            project: project_config,
            project_root: config_path.parent().map(|p| p.to_path_buf()),
        })
    }

    /// Find project configuration by walking up directory tree
    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, ProjectConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);

            if config_path.is_file() {
                let project_config = ProjectConfig::load_from_file(&config_path)?;
                return Ok((Some(current), project_config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, ProjectConfig::default())),
            }
        }
    }

    /// Apply environment variable overrides to project config
    ///
    /// Recognized variables: LATTEST_INTERPRETER, LATTEST_TIMEOUT
    fn apply_env_overrides(&self, config: ProjectConfig) -> ConfigResult<ProjectConfig> {
        if self.ignore_env {
            return Ok(config);
        }
        let mut config = config;

        if let Ok(interpreter) = env::var("LATTEST_INTERPRETER") {
            if interpreter.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "LATTEST_INTERPRETER".to_string(),
                    reason: "interpreter cannot be empty".to_string(),
                });
            }
            config
                .runner
                .get_or_insert_with(Default::default)
                .interpreter = Some(interpreter);
        }

        if let Ok(timeout) = env::var("LATTEST_TIMEOUT") {
            let secs = parse_timeout("LATTEST_TIMEOUT", &timeout)?;
            config.runner.get_or_insert_with(Default::default).timeout = Some(secs);
        }

        Ok(config)
    }
}

/// Parse a timeout given in whole seconds
pub fn parse_timeout(field: &str, value: &str) -> ConfigResult<u64> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: "timeout must be at least one second".to_string(),
        }),
        Ok(secs) => Ok(secs),
        Err(e) => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("'{}' is not a number of seconds ({})", value, e),
        }),
    }
}

impl Config {
    /// Get the effective interpreter command
    pub fn interpreter(&self) -> &str {
        self.project.interpreter().unwrap_or(DEFAULT_INTERPRETER)
    }

    /// Get the effective per-invocation timeout, if any
    pub fn timeout(&self) -> Option<Duration> {
        self.project.timeout_secs().map(Duration::from_secs)
    }

    /// Get the configured default suites, if any
    pub fn suites(&self) -> Option<&[String]> {
        self.project.suites()
    }

    /// Whether a summary should be printed after the run
    pub fn summary(&self) -> bool {
        self.project.summary().unwrap_or(false)
    }

    /// Get the directory containing lattest.toml
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Check if a lattest.toml was found
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }
}
