//! Error types for stat operations

use thiserror::Error;

use super::ModifierId;
use crate::error::ErrorKind;

/// Errors raised by stats, pipelines and stat tables
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatError {
    #[error("no stat registered for tag '{tag}'")]
    MissingStat { tag: String },

    #[error("a stat for tag '{tag}' is already registered")]
    DuplicateStat { tag: &'static str },

    #[error("tag '{tag}' shares slot {slot} with '{existing}' (tags from different sets?)")]
    SlotConflict {
        tag: &'static str,
        existing: &'static str,
        slot: usize,
    },

    #[error("modifier {0:?} is not in this pipeline")]
    UnknownModifier(ModifierId),

    #[error("stat '{tag}' is borrowed elsewhere")]
    Borrowed { tag: String },
}

impl StatError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StatError::MissingStat { .. } => ErrorKind::MissingStat,
            StatError::DuplicateStat { .. } | StatError::SlotConflict { .. } => {
                ErrorKind::DuplicateStat
            }
            StatError::UnknownModifier(_) => ErrorKind::UnknownHandle,
            StatError::Borrowed { .. } => ErrorKind::InvalidStateTransition,
        }
    }
}
