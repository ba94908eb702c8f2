//! Error types for timer and scheduler operations

use thiserror::Error;

use super::{SubscriptionId, TickGroup, TimerId, TimerState};
use crate::error::ErrorKind;

/// Errors raised by a single timer's state machine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    #[error("cannot {operation} a timer that is {state:?}")]
    InvalidStateTransition {
        operation: &'static str,
        state: TimerState,
    },
}

impl TimerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TimerError::InvalidStateTransition { .. } => ErrorKind::InvalidStateTransition,
        }
    }
}

/// Errors raised by the tick scheduler
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("timer {0:?} is not tracked by this scheduler")]
    UnknownTimer(TimerId),

    #[error("subscription {0:?} is not tracked by this scheduler")]
    UnknownSubscription(SubscriptionId),

    #[error("timer {timer:?} is not registered in any group")]
    NotRegistered { timer: TimerId },

    #[error("timer {timer:?} is already registered in the {group:?} group")]
    AlreadyRegistered { timer: TimerId, group: TickGroup },

    #[error("timer {timer:?} appears more than once in a registration batch")]
    DuplicateBinding { timer: TimerId },

    #[error("advance({group:?}) called while another pass is running")]
    ReentrantAdvance { group: TickGroup },

    #[error(transparent)]
    Timer(#[from] TimerError),
}

impl SchedulerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SchedulerError::UnknownTimer(_)
            | SchedulerError::UnknownSubscription(_)
            | SchedulerError::NotRegistered { .. } => ErrorKind::UnknownHandle,
            SchedulerError::AlreadyRegistered { .. }
            | SchedulerError::DuplicateBinding { .. }
            | SchedulerError::ReentrantAdvance { .. } => ErrorKind::InvalidStateTransition,
            SchedulerError::Timer(e) => e.kind(),
        }
    }
}

/// Failure reported by an event handler.
///
/// Handlers return this instead of panicking; the scheduler logs it, records
/// it in the pass report and keeps the handler subscribed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<SchedulerError> for HandlerError {
    fn from(error: SchedulerError) -> Self {
        Self::new(error.to_string())
    }
}
