//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration error type.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file.
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse config file '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Invalid environment variable value.
    #[error("invalid value for environment variable '{name}': {message}")]
    InvalidEnvVar { name: String, message: String },
}

impl ConfigError {
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }

    pub fn parse_toml(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::ParseToml {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_env_var(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEnvVar {
            name: name.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_var_error_names_variable() {
        let err = ConfigError::invalid_env_var("SCENEBRIDGE_TICK_MS", "expected integer");
        assert!(err.to_string().contains("SCENEBRIDGE_TICK_MS"));
        assert!(err.to_string().contains("expected integer"));
    }

    #[test]
    fn parse_error_names_path() {
        let source = toml::from_str::<toml::Value>("= nope").expect_err("invalid toml");
        let err = ConfigError::parse_toml("/tmp/config.toml", source);
        assert!(err.to_string().contains("/tmp/config.toml"));
    }
}
