//! Runtime configuration persistence
//!
//! Re-exports the shared config types from statclock-types and adds
//! confy-backed load/store.

mod error;


use std::path::{Path, PathBuf};

pub use error::ConfigError;
pub use statclock_types::{LogConfig, RuntimeConfig};

const APP_NAME: &str = "statclock";
const CONFIG_NAME: &str = "config";

// ─────────────────────────────────────────────────────────────────────────────
// RuntimeConfig Extensions
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for RuntimeConfig persistence
pub trait ConfigExt: Sized {
    /// Load from the per-user config file, falling back to defaults
    fn load() -> Self;
    fn store(&self) -> Result<(), ConfigError>;
    fn load_from(path: &Path) -> Result<Self, ConfigError>;
    fn store_to(&self, path: &Path) -> Result<(), ConfigError>;
    /// Reject values the runtime cannot work with
    fn validate(&self) -> Result<(), ConfigError>;
}

impl ConfigExt for RuntimeConfig {
    fn load() -> Self {
        match confy::load::<RuntimeConfig>(APP_NAME, CONFIG_NAME) {
            Ok(config) if config.validate().is_ok() => config,
            Ok(_) => {
                tracing::warn!("Stored configuration is invalid, using defaults");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load configuration, using defaults");
                Self::default()
            }
        }
    }

    fn store(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }

    fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = confy::load_path(path)?;
        config.validate()?;
        Ok(config)
    }

    fn store_to(&self, path: &Path) -> Result<(), ConfigError> {
        confy::store_path(path, self).map_err(ConfigError::Save)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.physics_hz.is_finite() && self.physics_hz > 0.0) {
            return Err(ConfigError::Invalid {
                reason: format!("physics_hz must be positive, got {}", self.physics_hz),
            });
        }
        if self.max_physics_steps == 0 {
            return Err(ConfigError::Invalid {
                reason: "max_physics_steps must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Location of the per-user config file
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)?)
}
