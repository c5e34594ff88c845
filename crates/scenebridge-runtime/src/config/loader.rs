//! Configuration loader with hierarchical merging.
//!
//! # Load Order
//!
//! 1. Default values (compile-time)
//! 2. Global config (`~/.scenebridge/config.toml`)
//! 3. Project config (`.scenebridge/config.toml`)
//! 4. Environment variables (`SCENEBRIDGE_*`)
//!
//! Each layer overrides the previous.

use super::{default_config_path, BridgeConfig, ConfigError, PROJECT_CONFIG_DIR, PROJECT_CONFIG_FILE};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Helper macro for parsing boolean environment variables.
macro_rules! parse_env_bool {
    ($field:expr, $var:literal) => {
        if let Ok(val) = std::env::var($var) {
            $field = parse_bool(&val)
                .ok_or_else(|| ConfigError::invalid_env_var($var, "expected bool"))?;
        }
    };
}

/// Helper macro for parsing environment variables through [`FromStr`].
macro_rules! parse_env_value {
    ($field:expr, $var:literal, $expected:literal) => {
        if let Ok(val) = std::env::var($var) {
            $field = FromStr::from_str(val.trim())
                .map_err(|_| ConfigError::invalid_env_var($var, $expected))?;
        }
    };
}

/// Configuration loader with builder pattern.
///
/// # Example
///
/// ```
/// use scenebridge_runtime::config::ConfigLoader;
///
/// let config = ConfigLoader::new()
///     .skip_global_config()
///     .skip_project_config()
///     .skip_env_vars()
///     .load()
///     .unwrap();
/// assert_eq!(config.pump.tick_ms, 16);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    /// Global config file path (defaults to ~/.scenebridge/config.toml).
    global_config_path: Option<PathBuf>,

    /// Project root directory.
    project_root: Option<PathBuf>,

    skip_env: bool,
    skip_global: bool,
    skip_project: bool,
}

impl ConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom global config path.
    #[must_use]
    pub fn with_global_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_config_path = Some(path.into());
        self
    }

    /// Sets the project root directory.
    ///
    /// Project config will be loaded from `<project_root>/.scenebridge/config.toml`.
    #[must_use]
    pub fn with_project_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_root = Some(path.into());
        self
    }

    /// Skips environment variable loading.
    #[must_use]
    pub fn skip_env_vars(mut self) -> Self {
        self.skip_env = true;
        self
    }

    #[must_use]
    pub fn skip_global_config(mut self) -> Self {
        self.skip_global = true;
        self
    }

    #[must_use]
    pub fn skip_project_config(mut self) -> Self {
        self.skip_project = true;
        self
    }

    /// Loads and merges configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any config file exists but cannot be
    /// parsed, or an environment variable holds an invalid value. Missing
    /// config files are silently ignored.
    pub fn load(&self) -> Result<BridgeConfig, ConfigError> {
        let mut config = BridgeConfig::default();

        // Layer 1: Global config
        if !self.skip_global {
            let global_path = self
                .global_config_path
                .clone()
                .unwrap_or_else(default_config_path);

            if let Some(global_config) = Self::load_file(&global_path)? {
                debug!(path = %global_path.display(), "Loaded global config");
                config.merge(&global_config);
            }
        }

        // Layer 2: Project config
        if !self.skip_project {
            if let Some(ref project_root) = self.project_root {
                let project_config_path = project_root
                    .join(PROJECT_CONFIG_DIR)
                    .join(PROJECT_CONFIG_FILE);

                if let Some(project_config) = Self::load_file(&project_config_path)? {
                    debug!(
                        path = %project_config_path.display(),
                        project = %project_root.display(),
                        "Loaded project config"
                    );
                    config.merge(&project_config);
                }
            }
        }

        // Layer 3: Environment variables
        if !self.skip_env {
            Self::apply_env_vars(&mut config)?;
        }

        Ok(config)
    }

    /// Loads a config file, returning None if it doesn't exist.
    fn load_file(path: &Path) -> Result<Option<BridgeConfig>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config =
            BridgeConfig::from_toml(&content).map_err(|e| ConfigError::parse_toml(path, e))?;

        Ok(Some(config))
    }

    fn apply_env_vars(config: &mut BridgeConfig) -> Result<(), ConfigError> {
        parse_env_bool!(config.debug, "SCENEBRIDGE_DEBUG");

        parse_env_value!(
            config.queue.max_event_count,
            "SCENEBRIDGE_MAX_EVENT_COUNT",
            "expected a non-negative integer"
        );
        parse_env_value!(
            config.pump.tick_ms,
            "SCENEBRIDGE_TICK_MS",
            "expected milliseconds as an integer"
        );
        parse_env_value!(
            config.interests.max_event_depth,
            "SCENEBRIDGE_MAX_EVENT_DEPTH",
            "expected a non-negative integer"
        );
        parse_env_value!(config.transport.codec, "SCENEBRIDGE_CODEC", "expected json or lines");

        if let Ok(val) = std::env::var("SCENEBRIDGE_LOG_FILE") {
            config.logging.file = true;
            config.logging.file_path = Some(PathBuf::from(val));
        }

        Ok(())
    }
}

/// Parses a boolean from string.
///
/// Accepts: "true", "false", "1", "0", "yes", "no", "on", "off"
/// (case-insensitive).
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
