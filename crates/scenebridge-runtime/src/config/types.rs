//! Configuration types.
//!
//! All types implement [`Default`] for compile-time fallback values.

use scenebridge_event::CodecKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure.
///
/// This is the unified configuration after merging all layers.
///
/// # Example
///
/// ```
/// use scenebridge_runtime::config::BridgeConfig;
///
/// let config = BridgeConfig::default();
/// assert!(!config.debug);
/// assert_eq!(config.queue.max_event_count, 64);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BridgeConfig {
    /// Enable debug mode (verbose logging).
    pub debug: bool,

    /// Outbound queue settings.
    pub queue: QueueConfig,

    /// Pump (tick) settings.
    pub pump: PumpConfig,

    /// Interest engine settings.
    pub interests: InterestsConfig,

    /// Transport settings.
    pub transport: TransportConfig,

    /// Bridge instance settings.
    pub bridge: BridgeSection,

    /// File logging settings.
    pub logging: LoggingConfig,
}

impl BridgeConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration with the process-wide exclusive guard off, for
    /// tests and embedders running several bridges side by side.
    #[must_use]
    pub fn shared() -> Self {
        let mut config = Self::default();
        config.bridge.exclusive = false;
        config
    }

    /// Deserializes from TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if deserialization fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Merges another config into this one.
    ///
    /// Values from `other` override values in `self` only if they differ
    /// from the default.
    pub fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.debug != default.debug {
            self.debug = other.debug;
        }

        self.queue.merge(&other.queue);
        self.pump.merge(&other.pump);
        self.interests.merge(&other.interests);
        self.transport.merge(&other.transport);
        self.bridge.merge(&other.bridge);
        self.logging.merge(&other.logging);
    }
}

/// Outbound queue configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QueueConfig {
    /// Maximum events joined into one outbound batch per pump.
    pub max_event_count: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_event_count: 64,
        }
    }
}

impl QueueConfig {
    fn merge(&mut self, other: &Self) {
        if other.max_event_count != Self::default().max_event_count {
            self.max_event_count = other.max_event_count;
        }
    }
}

/// Pump configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PumpConfig {
    /// Tick interval in milliseconds. Drives timers, animations and flushes.
    pub tick_ms: u64,
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self { tick_ms: 16 }
    }
}

impl PumpConfig {
    /// Tick interval as a [`Duration`]. Never zero.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    fn merge(&mut self, other: &Self) {
        if other.tick_ms != Self::default().tick_ms {
            self.tick_ms = other.tick_ms;
        }
    }
}

/// Interest engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InterestsConfig {
    /// Maximum nesting of synthetic `events` dispatched from interests.
    pub max_event_depth: usize,
}

impl Default for InterestsConfig {
    fn default() -> Self {
        Self { max_event_depth: 8 }
    }
}

impl InterestsConfig {
    fn merge(&mut self, other: &Self) {
        if other.max_event_depth != Self::default().max_event_depth {
            self.max_event_depth = other.max_event_depth;
        }
    }
}

/// Transport configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransportConfig {
    /// Batch codec.
    pub codec: CodecKind,
}

impl TransportConfig {
    fn merge(&mut self, other: &Self) {
        if other.codec != CodecKind::default() {
            self.codec = other.codec;
        }
    }
}

/// Bridge instance configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BridgeSection {
    /// Allow only one bridge per process.
    pub exclusive: bool,
}

impl Default for BridgeSection {
    fn default() -> Self {
        Self { exclusive: true }
    }
}

impl BridgeSection {
    fn merge(&mut self, other: &Self) {
        if other.exclusive != Self::default().exclusive {
            self.exclusive = other.exclusive;
        }
    }
}

/// File logging configuration.
///
/// Terminal logging is controlled by CLI flags and `RUST_LOG`; this section
/// only covers the optional persistent log file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write a log file.
    pub file: bool,

    /// Filter level for the file layer.
    pub file_level: String,

    /// Log directory. Defaults to `~/.scenebridge/logs`.
    pub file_path: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: false,
            file_level: "debug".into(),
            file_path: None,
        }
    }
}

impl LoggingConfig {
    /// Log directory after applying the default.
    #[must_use]
    pub fn resolved_file_path(&self) -> PathBuf {
        self.file_path
            .clone()
            .unwrap_or_else(|| super::default_config_dir().join("logs"))
    }

    /// `EnvFilter` directive for the file layer.
    #[must_use]
    pub fn file_filter_directive(&self) -> String {
        format!("{},tokio=warn", self.file_level)
    }

    fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.file != default.file {
            self.file = other.file;
        }
        if other.file_level != default.file_level {
            self.file_level.clone_from(&other.file_level);
        }
        if other.file_path.is_some() {
            self.file_path.clone_from(&other.file_path);
        }
    }
}
