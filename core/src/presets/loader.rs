//! Preset file loading
//!
//! Loads every `*.toml` file in a directory tree. Ids must be unique across
//! everything loaded in one call.

use std::fs;
use std::path::Path;

use hashbrown::HashSet;
use tracing::{debug, info};

use super::{ModifierPreset, PresetError, PresetFile};

/// Load and validate presets from a single TOML file
pub fn load_presets_from_file(path: &Path) -> Result<Vec<ModifierPreset>, PresetError> {
    let content = fs::read_to_string(path).map_err(|source| PresetError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    let file: PresetFile = toml::from_str(&content).map_err(|source| PresetError::ParseToml {
        path: path.to_path_buf(),
        source,
    })?;

    for preset in &file.presets {
        preset
            .validate()
            .map_err(|reason| invalid(path, &preset.id, reason))?;
    }
    if let Some(id) = duplicate_id(&file.presets) {
        return Err(invalid(path, &id, "duplicate id".to_string()));
    }

    debug!(path = %path.display(), count = file.presets.len(), "Loaded presets");
    Ok(file.presets)
}

/// Load every preset under `dir` (recursive). A missing directory yields none.
pub fn load_presets_from_dir(dir: &Path) -> Result<Vec<ModifierPreset>, PresetError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut presets = Vec::new();
    load_recursive(dir, &mut presets)?;

    if let Some(id) = duplicate_id(&presets) {
        return Err(invalid(dir, &id, "duplicate id across files".to_string()));
    }

    info!(dir = %dir.display(), count = presets.len(), "Loaded preset directory");
    Ok(presets)
}

/// First id that appears more than once
fn duplicate_id(presets: &[ModifierPreset]) -> Option<String> {
    let mut seen = HashSet::new();
    presets
        .iter()
        .find(|preset| !seen.insert(preset.id.as_str()))
        .map(|preset| preset.id.clone())
}

fn load_recursive(dir: &Path, presets: &mut Vec<ModifierPreset>) -> Result<(), PresetError> {
    let entries = fs::read_dir(dir).map_err(|source| PresetError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    // Sorted so load order (and duplicate reporting) is stable
    let mut paths: Vec<_> = entries.flatten().map(|entry| entry.path()).collect();
    paths.sort();

    for path in paths {
        if path.is_dir() {
            load_recursive(&path, presets)?;
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            presets.extend(load_presets_from_file(&path)?);
        }
    }
    Ok(())
}

fn invalid(path: &Path, id: &str, reason: String) -> PresetError {
    PresetError::InvalidPreset {
        path: path.to_path_buf(),
        id: id.to_string(),
        reason,
    }
}
