//! Centralized tick scheduler
//!
//! Owns every timer in a generational arena and keeps two dense groups of
//! registered timers: `Frame` (variable rate) and `Physics` (fixed rate).
//! One `advance` call ticks every running member of a group exactly once.
//!
//! # Pass algorithm
//!
//! 1. Snapshot the group's membership into a reusable scratch buffer.
//! 2. Tick each snapshot member that is still registered in the group and
//!    running. Expiries raise `Stopped { reason: Expired }` immediately, so
//!    handlers run before the next timer is ticked.
//! 3. After the loop, timers that expired during the pass and are still
//!    `Expired` are swap-removed from the group. A timer restarted by its
//!    own handler stays registered.
//!
//! Handlers may register, unregister, start or stop any timer during a pass.
//! Unregistering takes effect immediately (the member is skipped if not yet
//! reached); timers registered mid-pass are first ticked on the next pass.
//!
//! Group storage order changes on every removal and carries no meaning.

use std::hash::Hash;
use std::panic::{self, AssertUnwindSafe};

use slotmap::{SlotMap, new_key_type};
use tracing::{debug, warn};

use super::events::EventBus;
use super::{
    HandlerFailure, HandlerResult, SchedulerError, StopReason, SubscriptionId, TickOutcome, Timer,
    TimerDuration, TimerEvent, TimerEventKind, TimerState,
};

new_key_type! {
    /// Stable handle for a timer owned by a `Scheduler`
    pub struct TimerId;
}

/// The two independent timer collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickGroup {
    /// Advanced once per rendered frame
    Frame,
    /// Advanced once per fixed physics step
    Physics,
}

impl TickGroup {
    pub const ALL: [TickGroup; 2] = [TickGroup::Frame, TickGroup::Physics];

    const fn index(self) -> usize {
        match self {
            TickGroup::Frame => 0,
            TickGroup::Physics => 1,
        }
    }
}

/// Summary of one `advance` pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvanceReport {
    pub group: TickGroup,
    /// Timers whose `tick` was called
    pub ticked: usize,
    /// Timers that reached their duration this pass
    pub expired: usize,
    /// Timers removed from the group at the end of the pass
    pub removed: usize,
    /// Handler errors and panics raised during the pass (and any left over
    /// from calls made between passes)
    pub failures: Vec<HandlerFailure>,
}

impl AdvanceReport {
    fn new(group: TickGroup) -> Self {
        Self {
            group,
            ticked: 0,
            expired: 0,
            removed: 0,
            failures: Vec::new(),
        }
    }
}

struct TimerSlot {
    timer: Timer,
    /// Group the timer was registered into; kept across expiry removal
    home: Option<TickGroup>,
    /// Position inside the home group's storage while registered
    index: Option<usize>,
}

/// Owns timers and advances them from external ticks
pub struct Scheduler {
    timers: SlotMap<TimerId, TimerSlot>,
    groups: [Vec<TimerId>; 2],
    events: EventBus,
    failures: Vec<HandlerFailure>,
    scratch: Vec<TimerId>,
    expired: Vec<TimerId>,
    advancing: bool,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("timers", &self.timers.len())
            .field("frame", &self.groups[0].len())
            .field("physics", &self.groups[1].len())
            .field("subscriptions", &self.events.len())
            .field("advancing", &self.advancing)
            .finish()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Create a scheduler with storage reserved for each group
    pub fn with_capacity(frame: usize, physics: usize) -> Self {
        Self {
            timers: SlotMap::with_capacity_and_key(frame + physics),
            groups: [Vec::with_capacity(frame), Vec::with_capacity(physics)],
            events: EventBus::default(),
            failures: Vec::new(),
            scratch: Vec::with_capacity(frame.max(physics)),
            expired: Vec::new(),
            advancing: false,
        }
    }

    // ─── Timer ownership ────────────────────────────────────────────────────

    /// Create an idle, unregistered timer
    pub fn create_timer(&mut self, duration: impl Into<TimerDuration>) -> TimerId {
        self.timers.insert(TimerSlot {
            timer: Timer::new(duration),
            home: None,
            index: None,
        })
    }

    /// Destroy a timer: unregister it, drop its subscriptions and free its slot.
    ///
    /// The timer value is handed back; its id is dead afterwards.
    pub fn remove_timer(&mut self, id: TimerId) -> Result<Timer, SchedulerError> {
        if !self.timers.contains_key(id) {
            return Err(SchedulerError::UnknownTimer(id));
        }
        self.detach(id);
        let dropped = self.events.remove_timer(id);
        let slot = self
            .timers
            .remove(id)
            .ok_or(SchedulerError::UnknownTimer(id))?;
        debug!(timer = ?id, subscriptions = dropped, "Timer removed");
        Ok(slot.timer)
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    pub fn timer(&self, id: TimerId) -> Option<&Timer> {
        self.timers.get(id).map(|slot| &slot.timer)
    }

    /// Number of timers owned, registered or not
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    // ─── Registration ───────────────────────────────────────────────────────

    /// Add a timer to a group. A timer lives in at most one group at a time.
    pub fn register(&mut self, id: TimerId, group: TickGroup) -> Result<(), SchedulerError> {
        let slot = self
            .timers
            .get_mut(id)
            .ok_or(SchedulerError::UnknownTimer(id))?;
        if let (Some(_), Some(current)) = (slot.index, slot.home) {
            return Err(SchedulerError::AlreadyRegistered {
                timer: id,
                group: current,
            });
        }
        slot.home = Some(group);
        self.insert_member(id, group);
        debug!(timer = ?id, ?group, "Timer registered");
        Ok(())
    }

    /// Remove a timer from its group immediately. The timer itself survives.
    pub fn unregister(&mut self, id: TimerId) -> Result<(), SchedulerError> {
        if !self.timers.contains_key(id) {
            return Err(SchedulerError::UnknownTimer(id));
        }
        let detached = self.detach(id);
        // An expired timer is already out of its group but still remembers it
        if let Some(slot) = self.timers.get_mut(id) {
            slot.home = None;
        }
        let group = detached.ok_or(SchedulerError::NotRegistered { timer: id })?;
        debug!(timer = ?id, ?group, "Timer unregistered");
        Ok(())
    }

    pub fn is_registered(&self, id: TimerId) -> bool {
        self.timers.get(id).is_some_and(|slot| slot.index.is_some())
    }

    /// The group a timer is currently registered in
    pub fn group_of(&self, id: TimerId) -> Option<TickGroup> {
        self.timers
            .get(id)
            .and_then(|slot| slot.index.and(slot.home))
    }

    /// Number of timers registered in a group
    pub fn group_len(&self, group: TickGroup) -> usize {
        self.groups[group.index()].len()
    }

    /// Current members of a group. Order is unspecified and changes on removal.
    pub fn members(&self, group: TickGroup) -> &[TimerId] {
        &self.groups[group.index()]
    }

    fn insert_member(&mut self, id: TimerId, group: TickGroup) {
        let members = &mut self.groups[group.index()];
        let index = members.len();
        members.push(id);
        if let Some(slot) = self.timers.get_mut(id) {
            slot.index = Some(index);
        }
    }

    /// Swap-remove a timer from its group, keeping its home. O(1).
    fn detach(&mut self, id: TimerId) -> Option<TickGroup> {
        let slot = self.timers.get_mut(id)?;
        let (Some(index), Some(group)) = (slot.index, slot.home) else {
            return None;
        };
        slot.index = None;

        let members = &mut self.groups[group.index()];
        let removed = members.swap_remove(index);
        debug_assert_eq!(removed, id);
        if let Some(&moved) = members.get(index) {
            if let Some(moved_slot) = self.timers.get_mut(moved) {
                moved_slot.index = Some(index);
            }
        }
        Some(group)
    }

    // ─── Timer control ──────────────────────────────────────────────────────

    /// Start (or restart) a timer and raise `Started`.
    ///
    /// Returns `Ok(false)` without side effects if it is already running.
    /// A timer that was dropped from its group on expiry rejoins that group.
    pub fn start(&mut self, id: TimerId) -> Result<bool, SchedulerError> {
        let slot = self
            .timers
            .get_mut(id)
            .ok_or(SchedulerError::UnknownTimer(id))?;
        if !slot.timer.start() {
            return Ok(false);
        }
        if let (None, Some(home)) = (slot.index, slot.home) {
            self.insert_member(id, home);
        }
        self.dispatch(TimerEvent::Started { timer: id });
        Ok(true)
    }

    /// Stop a timer and raise `Stopped { Cancelled }` if it was running or paused
    pub fn stop(&mut self, id: TimerId) -> Result<bool, SchedulerError> {
        let slot = self
            .timers
            .get_mut(id)
            .ok_or(SchedulerError::UnknownTimer(id))?;
        if !slot.timer.stop() {
            return Ok(false);
        }
        self.dispatch(TimerEvent::Stopped {
            timer: id,
            reason: StopReason::Cancelled,
        });
        Ok(true)
    }

    pub fn pause(&mut self, id: TimerId) -> Result<(), SchedulerError> {
        self.timers
            .get_mut(id)
            .ok_or(SchedulerError::UnknownTimer(id))?
            .timer
            .pause()?;
        self.dispatch(TimerEvent::Paused { timer: id });
        Ok(())
    }

    pub fn resume(&mut self, id: TimerId) -> Result<(), SchedulerError> {
        self.timers
            .get_mut(id)
            .ok_or(SchedulerError::UnknownTimer(id))?
            .timer
            .resume()?;
        self.dispatch(TimerEvent::Resumed { timer: id });
        Ok(())
    }

    /// Rewind a timer, optionally with a new duration. Raises no event.
    pub fn reset(
        &mut self,
        id: TimerId,
        duration: Option<TimerDuration>,
    ) -> Result<(), SchedulerError> {
        self.timers
            .get_mut(id)
            .ok_or(SchedulerError::UnknownTimer(id))?
            .timer
            .reset(duration);
        Ok(())
    }

    // ─── Ticking ────────────────────────────────────────────────────────────

    /// Tick every running member of `group` once.
    ///
    /// Fails only when called from a handler while a pass is in progress.
    pub fn advance(
        &mut self,
        group: TickGroup,
        delta_secs: f32,
    ) -> Result<AdvanceReport, SchedulerError> {
        if self.advancing {
            return Err(SchedulerError::ReentrantAdvance { group });
        }
        self.advancing = true;

        let mut members = std::mem::take(&mut self.scratch);
        members.clear();
        members.extend_from_slice(&self.groups[group.index()]);
        let mut expired = std::mem::take(&mut self.expired);
        expired.clear();

        let mut report = AdvanceReport::new(group);

        for &id in &members {
            // Handlers earlier in this pass may have removed or moved it
            let Some(slot) = self.timers.get_mut(id) else {
                continue;
            };
            if slot.index.is_none() || slot.home != Some(group) || !slot.timer.is_running() {
                continue;
            }

            report.ticked += 1;
            match slot.timer.tick(delta_secs) {
                Ok(TickOutcome::Running) => {}
                Ok(TickOutcome::Expired) => {
                    report.expired += 1;
                    expired.push(id);
                    self.dispatch(TimerEvent::Stopped {
                        timer: id,
                        reason: StopReason::Expired,
                    });
                }
                Err(e) => debug!(timer = ?id, error = %e, "Skipped tick"),
            }
        }

        for &id in &expired {
            let still_expired = self
                .timers
                .get(id)
                .is_some_and(|slot| slot.timer.state() == TimerState::Expired);
            if still_expired && self.detach(id).is_some() {
                report.removed += 1;
            }
        }

        members.clear();
        expired.clear();
        self.scratch = members;
        self.expired = expired;
        self.advancing = false;

        report.failures = std::mem::take(&mut self.failures);
        if report.expired > 0 {
            debug!(
                ?group,
                ticked = report.ticked,
                expired = report.expired,
                removed = report.removed,
                "Advance pass"
            );
        }
        Ok(report)
    }

    // ─── Subscriptions ──────────────────────────────────────────────────────

    /// Listen for one kind of event on one timer
    pub fn subscribe<F>(
        &mut self,
        timer: TimerId,
        kind: TimerEventKind,
        callback: F,
    ) -> Result<SubscriptionId, SchedulerError>
    where
        F: FnMut(&mut Scheduler, &TimerEvent) -> HandlerResult + 'static,
    {
        if !self.timers.contains_key(timer) {
            return Err(SchedulerError::UnknownTimer(timer));
        }
        Ok(self.events.insert(timer, kind, None, Box::new(callback)))
    }

    /// Like `subscribe`, but returns the existing subscription when the same
    /// closure type was already subscribed with an equal `key`.
    ///
    /// The match is a hash comparison and only an optimization; keep the
    /// returned id to unsubscribe.
    pub fn subscribe_unique<F, K>(
        &mut self,
        timer: TimerId,
        kind: TimerEventKind,
        key: &K,
        callback: F,
    ) -> Result<SubscriptionId, SchedulerError>
    where
        F: FnMut(&mut Scheduler, &TimerEvent) -> HandlerResult + 'static,
        K: Hash + ?Sized,
    {
        if !self.timers.contains_key(timer) {
            return Err(SchedulerError::UnknownTimer(timer));
        }
        let fingerprint = self.events.fingerprint::<F, K>(key);
        if let Some(existing) = self.events.find_fingerprint(timer, kind, fingerprint) {
            debug!(?timer, ?kind, subscription = ?existing, "Duplicate subscription skipped");
            return Ok(existing);
        }
        Ok(self
            .events
            .insert(timer, kind, Some(fingerprint), Box::new(callback)))
    }

    /// Shorthand for a `Stopped` subscription
    pub fn on_stop<F>(&mut self, timer: TimerId, callback: F) -> Result<SubscriptionId, SchedulerError>
    where
        F: FnMut(&mut Scheduler, &TimerEvent) -> HandlerResult + 'static,
    {
        self.subscribe(timer, TimerEventKind::Stopped, callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> Result<(), SchedulerError> {
        if self.events.remove(id) {
            Ok(())
        } else {
            Err(SchedulerError::UnknownSubscription(id))
        }
    }

    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.events.contains(id)
    }

    pub fn subscription_count(&self, timer: TimerId) -> usize {
        self.events.count_for(timer)
    }

    /// Drain handler failures raised outside of `advance`
    pub fn take_failures(&mut self) -> Vec<HandlerFailure> {
        std::mem::take(&mut self.failures)
    }

    /// Run every handler for `event`. Failures are isolated and recorded.
    fn dispatch(&mut self, event: TimerEvent) {
        for id in self.events.listeners(event.timer(), event.kind()) {
            // Already executing further up the stack
            let Some(mut callback) = self.events.take_callback(id) else {
                continue;
            };

            match panic::catch_unwind(AssertUnwindSafe(|| callback(self, &event))) {
                Ok(Ok(())) => self.events.restore_callback(id, callback),
                Ok(Err(error)) => {
                    warn!(subscription = ?id, ?event, error = %error, "Timer handler failed");
                    self.failures.push(HandlerFailure {
                        subscription: id,
                        event,
                        message: error.to_string(),
                        panicked: false,
                    });
                    self.events.restore_callback(id, callback);
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    warn!(subscription = ?id, ?event, %message, "Timer handler panicked, unsubscribing");
                    self.failures.push(HandlerFailure {
                        subscription: id,
                        event,
                        message,
                        panicked: true,
                    });
                    self.events.remove(id);
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}
