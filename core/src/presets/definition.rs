//! Modifier preset definitions
//!
//! Presets are named, data-driven modifiers loaded from TOML:
//!
//! ```toml
//! [[preset]]
//! id = "slow"
//! stat = "Speed"
//! op = "multiply"
//! value = 0.5
//! duration_secs = 3.0
//! ```
//!
//! A preset without `duration_secs` applies permanently.

use serde::{Deserialize, Serialize};

use crate::stats::Modifier;

/// How a preset's value combines with the stat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetOp {
    Add,
    Multiply,
    Override,
}

/// A named modifier template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierPreset {
    /// Unique identifier across every loaded file
    pub id: String,

    /// Stat tag name the modifier targets (`StatTag::NAME`)
    pub stat: String,

    pub op: PresetOp,

    pub value: f32,

    /// Remove the modifier again after this many seconds of frame time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f32>,

    /// Free-form note shown by hosts
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl ModifierPreset {
    pub fn modifier(&self) -> Modifier {
        match self.op {
            PresetOp::Add => Modifier::Add(self.value),
            PresetOp::Multiply => Modifier::Multiply(self.value),
            PresetOp::Override => Modifier::Override(self.value),
        }
    }

    pub fn is_timed(&self) -> bool {
        self.duration_secs.is_some()
    }

    /// Reason this preset cannot be used, if any
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("id is empty".to_string());
        }
        if self.stat.trim().is_empty() {
            return Err("stat is empty".to_string());
        }
        if !self.value.is_finite() {
            return Err(format!("value {} is not finite", self.value));
        }
        match self.duration_secs {
            Some(d) if !(d.is_finite() && d > 0.0) => {
                Err(format!("duration_secs must be positive, got {d}"))
            }
            _ => Ok(()),
        }
    }
}

/// Root of a preset file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresetFile {
    #[serde(default, rename = "preset")]
    pub presets: Vec<ModifierPreset>,
}
