//! Error types for configuration persistence

use thiserror::Error;

use crate::error::ErrorKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration")]
    Load(#[from] confy::ConfyError),

    #[error("failed to save configuration")]
    Save(#[source] confy::ConfyError),

    #[error("invalid configuration: {reason}")]
    Invalid { reason: String },
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::Load(_) | ConfigError::Save(_) => ErrorKind::Io,
            ConfigError::Invalid { .. } => ErrorKind::Parse,
        }
    }
}
