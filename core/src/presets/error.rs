//! Error types for preset loading

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorKind;

/// Errors while loading modifier preset files
#[derive(Debug, Error)]
pub enum PresetError {
    #[error("failed to read {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML in {path}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to read directory {path}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid preset '{id}' in {path}: {reason}")]
    InvalidPreset {
        path: PathBuf,
        id: String,
        reason: String,
    },
}

impl PresetError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PresetError::ReadFile { .. } | PresetError::ReadDir { .. } => ErrorKind::Io,
            PresetError::ParseToml { .. } | PresetError::InvalidPreset { .. } => ErrorKind::Parse,
        }
    }
}
