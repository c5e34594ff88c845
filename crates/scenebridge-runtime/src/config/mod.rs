//! Configuration management with hierarchical layering.
//!
//! # Architecture
//!
//! Configuration is loaded from multiple sources with priority-based merging:
//!
//! ```text
//! Priority (highest to lowest):
//!
//! ┌────────────────────────────────────────────────┐
//! │  1. CLI flags (ConfigResolver)                 │  Invocation override
//! ├────────────────────────────────────────────────┤
//! │  2. Environment Variables (SCENEBRIDGE_*)      │  Runtime override
//! ├────────────────────────────────────────────────┤
//! │  3. Project Config (.scenebridge/config.toml)  │  Project-specific
//! ├────────────────────────────────────────────────┤
//! │  4. Global Config (~/.scenebridge/config.toml) │  User defaults
//! ├────────────────────────────────────────────────┤
//! │  5. Default Values (compile-time)              │  Fallback
//! └────────────────────────────────────────────────┘
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Config Field | Type |
//! |----------|--------------|------|
//! | `SCENEBRIDGE_DEBUG` | `debug` | bool |
//! | `SCENEBRIDGE_MAX_EVENT_COUNT` | `queue.max_event_count` | usize |
//! | `SCENEBRIDGE_TICK_MS` | `pump.tick_ms` | u64 |
//! | `SCENEBRIDGE_CODEC` | `transport.codec` | `json` / `lines` |
//! | `SCENEBRIDGE_MAX_EVENT_DEPTH` | `interests.max_event_depth` | usize |
//! | `SCENEBRIDGE_LOG_FILE` | `logging.file_path` (enables `logging.file`) | PathBuf |
//!
//! # Example Configuration
//!
//! ```toml
//! # ~/.scenebridge/config.toml
//! debug = false
//!
//! [queue]
//! max_event_count = 64
//!
//! [pump]
//! tick_ms = 16
//!
//! [interests]
//! max_event_depth = 8
//!
//! [transport]
//! codec = "json"
//!
//! [bridge]
//! exclusive = true
//!
//! [logging]
//! file = false
//! file_level = "debug"
//! ```

mod error;
mod loader;
mod resolver;
mod types;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use resolver::{ConfigResolver, NoOpResolver};
pub use types::{
    BridgeConfig, BridgeSection, InterestsConfig, LoggingConfig, PumpConfig, QueueConfig,
    TransportConfig,
};

/// Default global config directory.
pub fn default_config_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".scenebridge")
}

/// Default global config file path.
pub fn default_config_path() -> std::path::PathBuf {
    default_config_dir().join("config.toml")
}

/// Project config directory name.
pub const PROJECT_CONFIG_DIR: &str = ".scenebridge";

/// Project config file name.
pub const PROJECT_CONFIG_FILE: &str = "config.toml";
