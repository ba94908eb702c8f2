//! Timer system
//!
//! This module provides:
//! - **Timer**: a countdown state machine (idle, running, paused, expired)
//! - **Scheduler**: owns timers and advances the frame and physics groups
//!   from external ticks, removing expired members in constant time
//! - **Events**: per-timer lifecycle notifications and subscriptions
//!
//! # Ownership
//!
//! Timers live in the scheduler's arena and are addressed by `TimerId`.
//! Removing a timer from its group does not destroy it; `remove_timer` does.

mod error;
mod events;
mod scheduler;
mod timer;


pub use error::{HandlerError, SchedulerError, TimerError};
pub use events::{
    HandlerFailure, HandlerResult, StopReason, SubscriptionId, TimerCallback, TimerEvent,
    TimerEventKind,
};
pub use scheduler::{AdvanceReport, Scheduler, TickGroup, TimerId};
pub use timer::{TickOutcome, Timer, TimerDuration, TimerState};
