//! Countdown timer state machine
//!
//! A `Timer` is pure state: it knows its duration, how much time has elapsed
//! and which lifecycle state it is in. It never calls back into anything.
//! Notifications are raised by the `Scheduler`, which owns the timers and
//! turns state transitions into `TimerEvent`s.
//!
//! # State machine
//!
//! ```text
//! Idle ──start──▶ Running ──tick(expire)──▶ Expired ──start──▶ Running
//!                 Running ──pause──▶ Paused ──resume──▶ Running
//!                 any ──stop──▶ Idle
//! ```

use std::cell::Cell;
use std::rc::Rc;

use super::TimerError;

/// Lifecycle state of a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimerState {
    #[default]
    Idle,
    Running,
    Paused,
    Expired,
}

/// Where a timer reads its duration from.
///
/// `Bound` durations are shared cells the host may rewrite between ticks
/// (e.g. a cooldown scaled by a stat). The value is re-read on every query.
#[derive(Debug, Clone)]
pub enum TimerDuration {
    Fixed(f32),
    Bound(Rc<Cell<f32>>),
}

impl TimerDuration {
    /// Current duration in seconds. Negative and NaN values read as zero.
    pub fn get(&self) -> f32 {
        let raw = match self {
            TimerDuration::Fixed(secs) => *secs,
            TimerDuration::Bound(cell) => cell.get(),
        };
        raw.max(0.0)
    }
}

impl Default for TimerDuration {
    fn default() -> Self {
        TimerDuration::Fixed(0.0)
    }
}

impl From<f32> for TimerDuration {
    fn from(secs: f32) -> Self {
        TimerDuration::Fixed(secs)
    }
}

impl From<Rc<Cell<f32>>> for TimerDuration {
    fn from(cell: Rc<Cell<f32>>) -> Self {
        TimerDuration::Bound(cell)
    }
}

/// Result of a successful `tick`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still counting
    Running,
    /// This tick crossed the duration; the timer is now `Expired`
    Expired,
}

/// A single countdown unit
#[derive(Debug, Clone, Default)]
pub struct Timer {
    duration: TimerDuration,
    elapsed: f32,
    state: TimerState,
}

impl Timer {
    /// Create an idle timer
    pub fn new(duration: impl Into<TimerDuration>) -> Self {
        Self {
            duration: duration.into(),
            elapsed: 0.0,
            state: TimerState::Idle,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn duration(&self) -> f32 {
        self.duration.get()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Seconds left before expiry (never negative)
    pub fn remaining(&self) -> f32 {
        (self.duration() - self.elapsed).max(0.0)
    }

    /// Normalized progress in [0, 1], recomputed on every call.
    ///
    /// An expired timer always reports 1.0, even if a bound duration grew
    /// afterwards. A zero-length timer that has not expired reports 0.0.
    pub fn progress(&self) -> f32 {
        if self.state == TimerState::Expired {
            return 1.0;
        }
        let duration = self.duration();
        if duration <= 0.0 {
            return 0.0;
        }
        (self.elapsed / duration).clamp(0.0, 1.0)
    }

    /// Begin counting from zero.
    ///
    /// Returns false (and changes nothing) if the timer is already running.
    /// A paused timer restarts from zero.
    pub fn start(&mut self) -> bool {
        if self.state == TimerState::Running {
            return false;
        }
        self.elapsed = 0.0;
        self.state = TimerState::Running;
        true
    }

    /// Return to `Idle` from any state, keeping the elapsed time.
    ///
    /// Returns true if the timer was active (running or paused), which is
    /// when a stop notification is owed.
    pub fn stop(&mut self) -> bool {
        let was_active = matches!(self.state, TimerState::Running | TimerState::Paused);
        self.state = TimerState::Idle;
        was_active
    }

    pub fn pause(&mut self) -> Result<(), TimerError> {
        if self.state != TimerState::Running {
            return Err(TimerError::InvalidStateTransition {
                operation: "pause",
                state: self.state,
            });
        }
        self.state = TimerState::Paused;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), TimerError> {
        if self.state != TimerState::Paused {
            return Err(TimerError::InvalidStateTransition {
                operation: "resume",
                state: self.state,
            });
        }
        self.state = TimerState::Running;
        Ok(())
    }

    /// Rewind to zero, optionally replacing the duration.
    ///
    /// Running and paused timers keep their state; an expired timer drops
    /// back to `Idle` so it never reports `Expired` with zero progress.
    pub fn reset(&mut self, duration: Option<TimerDuration>) {
        if let Some(duration) = duration {
            self.duration = duration;
        }
        self.elapsed = 0.0;
        if self.state == TimerState::Expired {
            self.state = TimerState::Idle;
        }
    }

    /// Advance by `delta_secs`. Only valid while running.
    ///
    /// Negative or NaN deltas advance by zero. On reaching the duration the
    /// elapsed time is clamped to it and the timer becomes `Expired`.
    pub fn tick(&mut self, delta_secs: f32) -> Result<TickOutcome, TimerError> {
        if self.state != TimerState::Running {
            return Err(TimerError::InvalidStateTransition {
                operation: "tick",
                state: self.state,
            });
        }

        let duration = self.duration();
        self.elapsed += delta_secs.max(0.0);
        if self.elapsed >= duration {
            self.elapsed = duration;
            self.state = TimerState::Expired;
            return Ok(TickOutcome::Expired);
        }
        Ok(TickOutcome::Running)
    }
}
