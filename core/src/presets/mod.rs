//! Data-driven modifier presets
//!
//! TOML-defined modifiers that hosts apply to entities by stat name,
//! optionally bounded by a duration.

mod apply;
mod definition;
mod error;
mod loader;

#[cfg(test)]
mod apply_tests;

pub use apply::{AppliedPreset, apply_preset};
pub use definition::{ModifierPreset, PresetFile, PresetOp};
pub use error::PresetError;
pub use loader::{load_presets_from_dir, load_presets_from_file};
