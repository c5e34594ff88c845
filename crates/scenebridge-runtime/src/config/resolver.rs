//! Configuration resolver trait for layered overrides.
//!
//! # Architecture
//!
//! ```text
//! ConfigLoader.load()  →  BridgeConfig (files + env)
//!                              │
//!                              ▼
//!                     ConfigResolver.apply()     (CLI flags)
//!                              │
//!                              ▼
//!                     BridgeConfig (final)
//! ```
//!
//! # Example
//!
//! ```
//! use scenebridge_runtime::config::{BridgeConfig, ConfigResolver};
//!
//! struct CliOverrides {
//!     tick_ms: Option<u64>,
//! }
//!
//! impl ConfigResolver for CliOverrides {
//!     fn apply(&self, config: &mut BridgeConfig) {
//!         if let Some(ms) = self.tick_ms {
//!             config.pump.tick_ms = ms;
//!         }
//!     }
//! }
//!
//! let mut config = BridgeConfig::default();
//! CliOverrides { tick_ms: Some(5) }.apply(&mut config);
//! assert_eq!(config.pump.tick_ms, 5);
//! ```

use super::BridgeConfig;

/// Applies overrides on top of a loaded configuration.
///
/// Separates file/env loading from invocation-time overrides such as CLI
/// flags or programmatic settings.
pub trait ConfigResolver {
    /// Applies overrides to the given configuration.
    ///
    /// Only explicitly given values are applied; everything else keeps the
    /// loaded value.
    fn apply(&self, config: &mut BridgeConfig);
}

/// Resolver that changes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpResolver;

impl ConfigResolver for NoOpResolver {
    fn apply(&self, _config: &mut BridgeConfig) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_resolver_does_nothing() {
        let mut config = BridgeConfig::default();
        let original = config.clone();

        NoOpResolver.apply(&mut config);

        assert_eq!(config, original);
    }

    #[test]
    fn custom_resolver() {
        struct TestResolver {
            exclusive: Option<bool>,
        }

        impl ConfigResolver for TestResolver {
            fn apply(&self, config: &mut BridgeConfig) {
                if let Some(e) = self.exclusive {
                    config.bridge.exclusive = e;
                }
            }
        }

        let mut config = BridgeConfig::default();
        assert!(config.bridge.exclusive);

        TestResolver {
            exclusive: Some(false),
        }
        .apply(&mut config);

        assert!(!config.bridge.exclusive);
    }
}
