//! Shared configuration types for statclock
//!
//! This crate contains serializable configuration types that are shared between
//! the engine (statclock-core) and any host driving it (the CLI, a game loop).
//! Persistence (load/store) lives in statclock-core behind `ConfigExt`.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Runtime Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Tuning for the tick runtime.
///
/// Every field is defaulted so partial config files deserialize cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Timer slots reserved up front for the frame group
    #[serde(default = "default_frame_capacity")]
    pub frame_capacity: usize,

    /// Timer slots reserved up front for the physics group
    #[serde(default = "default_physics_capacity")]
    pub physics_capacity: usize,

    /// Fixed physics rate used when the host only supplies frame deltas
    #[serde(default = "default_physics_hz")]
    pub physics_hz: f32,

    /// Upper bound on physics steps run for a single frame.
    /// Time beyond this is dropped rather than caught up.
    #[serde(default = "default_max_physics_steps")]
    pub max_physics_steps: u32,

    /// Run the ownership liveness sweep every N frames (0 = never automatically)
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_frames: u32,

    #[serde(default)]
    pub log: LogConfig,
}

fn default_frame_capacity() -> usize {
    256
}
fn default_physics_capacity() -> usize {
    64
}
fn default_physics_hz() -> f32 {
    50.0
}
fn default_max_physics_steps() -> u32 {
    5
}
fn default_sweep_interval() -> u32 {
    120
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            frame_capacity: default_frame_capacity(),
            physics_capacity: default_physics_capacity(),
            physics_hz: default_physics_hz(),
            max_physics_steps: default_max_physics_steps(),
            sweep_interval_frames: default_sweep_interval(),
            log: LogConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Length of one fixed physics step in seconds.
    ///
    /// Non-positive rates fall back to the default rate.
    pub fn physics_step(&self) -> f32 {
        if self.physics_hz > 0.0 {
            1.0 / self.physics_hz
        } else {
            1.0 / default_physics_hz()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Log output settings consumed by hosts when they install a subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `DEBUG_LOGGING` is not set
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Include the module target in each line
    #[serde(default = "default_true")]
    pub show_target: bool,
}

fn default_filter() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            show_target: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: RuntimeConfig = toml::from_str("physics_hz = 60.0").unwrap();
        assert_eq!(config.physics_hz, 60.0);
        assert_eq!(config.frame_capacity, 256);
        assert_eq!(config.max_physics_steps, 5);
        assert_eq!(config.log.filter, "info");
    }

    #[test]
    fn test_physics_step_falls_back_on_bad_rate() {
        let config = RuntimeConfig {
            physics_hz: 0.0,
            ..RuntimeConfig::default()
        };
        assert!((config.physics_step() - 0.02).abs() < 1e-6);
    }
}
