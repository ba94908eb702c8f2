//! Timer lifecycle events and subscription storage
//!
//! Handlers are stored per (timer, event kind) and receive `&mut Scheduler`
//! when they fire, so they can start/stop timers or touch stats without
//! holding any reference back into the scheduler.
//!
//! Subscriptions are removed by the `SubscriptionId` returned at insertion.
//! `subscribe_unique` additionally derives an advisory fingerprint from the
//! closure type plus a caller-supplied key to skip duplicate subscriptions;
//! the fingerprint may collide and is never used for removal.

use std::any::TypeId;
use std::hash::{BuildHasher, Hash};

use hashbrown::HashMap;
use slotmap::{SecondaryMap, SlotMap, new_key_type};

use super::{HandlerError, Scheduler, TimerId};

new_key_type! {
    /// Stable handle for an event subscription
    pub struct SubscriptionId;
}

/// Why a timer left the running/paused states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// Elapsed time reached the duration during a tick
    Expired,
    /// `stop()` was called explicitly
    Cancelled,
}

/// Which notification a handler listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerEventKind {
    Started,
    Stopped,
    Paused,
    Resumed,
}

/// A lifecycle notification raised by the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Started { timer: TimerId },
    Stopped { timer: TimerId, reason: StopReason },
    Paused { timer: TimerId },
    Resumed { timer: TimerId },
}

impl TimerEvent {
    pub fn timer(&self) -> TimerId {
        match *self {
            TimerEvent::Started { timer }
            | TimerEvent::Stopped { timer, .. }
            | TimerEvent::Paused { timer }
            | TimerEvent::Resumed { timer } => timer,
        }
    }

    pub fn kind(&self) -> TimerEventKind {
        match self {
            TimerEvent::Started { .. } => TimerEventKind::Started,
            TimerEvent::Stopped { .. } => TimerEventKind::Stopped,
            TimerEvent::Paused { .. } => TimerEventKind::Paused,
            TimerEvent::Resumed { .. } => TimerEventKind::Resumed,
        }
    }
}

pub type HandlerResult = Result<(), HandlerError>;

/// Boxed event handler
pub type TimerCallback = Box<dyn FnMut(&mut Scheduler, &TimerEvent) -> HandlerResult>;

/// A handler failure collected during dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFailure {
    pub subscription: SubscriptionId,
    pub event: TimerEvent,
    pub message: String,
    /// The handler panicked and was unsubscribed
    pub panicked: bool,
}

type FingerprintKey = (TimerId, TimerEventKind, u64);

struct Subscription {
    timer: TimerId,
    kind: TimerEventKind,
    fingerprint: Option<u64>,
    /// `None` while the handler is executing
    callback: Option<TimerCallback>,
}

/// Subscription storage owned by the scheduler
#[derive(Default)]
pub(crate) struct EventBus {
    subscriptions: SlotMap<SubscriptionId, Subscription>,
    by_timer: SecondaryMap<TimerId, Vec<SubscriptionId>>,
    fingerprints: HashMap<FingerprintKey, SubscriptionId>,
}

impl EventBus {
    pub(crate) fn insert(
        &mut self,
        timer: TimerId,
        kind: TimerEventKind,
        fingerprint: Option<u64>,
        callback: TimerCallback,
    ) -> SubscriptionId {
        let id = self.subscriptions.insert(Subscription {
            timer,
            kind,
            fingerprint,
            callback: Some(callback),
        });
        if let Some(entry) = self.by_timer.entry(timer) {
            entry.or_default().push(id);
        }
        if let Some(fp) = fingerprint {
            self.fingerprints.insert((timer, kind, fp), id);
        }
        id
    }

    /// Advisory fingerprint for a closure type plus a caller key
    pub(crate) fn fingerprint<F: 'static, K: Hash + ?Sized>(&self, key: &K) -> u64 {
        self.fingerprints.hasher().hash_one((TypeId::of::<F>(), key))
    }

    pub(crate) fn find_fingerprint(
        &self,
        timer: TimerId,
        kind: TimerEventKind,
        fingerprint: u64,
    ) -> Option<SubscriptionId> {
        self.fingerprints
            .get(&(timer, kind, fingerprint))
            .copied()
            .filter(|id| self.subscriptions.contains_key(*id))
    }

    pub(crate) fn contains(&self, id: SubscriptionId) -> bool {
        self.subscriptions.contains_key(id)
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let Some(sub) = self.subscriptions.remove(id) else {
            return false;
        };
        if let Some(list) = self.by_timer.get_mut(sub.timer) {
            list.retain(|&other| other != id);
        }
        if let Some(fp) = sub.fingerprint {
            let key = (sub.timer, sub.kind, fp);
            if self.fingerprints.get(&key) == Some(&id) {
                self.fingerprints.remove(&key);
            }
        }
        true
    }

    /// Drop every subscription attached to a timer. Returns how many were dropped.
    pub(crate) fn remove_timer(&mut self, timer: TimerId) -> usize {
        let Some(ids) = self.by_timer.remove(timer) else {
            return 0;
        };
        for &id in &ids {
            if let Some(sub) = self.subscriptions.remove(id) {
                if let Some(fp) = sub.fingerprint {
                    self.fingerprints.remove(&(sub.timer, sub.kind, fp));
                }
            }
        }
        ids.len()
    }

    pub(crate) fn count_for(&self, timer: TimerId) -> usize {
        self.by_timer.get(timer).map_or(0, Vec::len)
    }

    pub(crate) fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Snapshot of handlers for an event, in subscription order
    pub(crate) fn listeners(&self, timer: TimerId, kind: TimerEventKind) -> Vec<SubscriptionId> {
        self.by_timer
            .get(timer)
            .map(|ids| {
                ids.iter()
                    .copied()
                    .filter(|&id| self.subscriptions.get(id).is_some_and(|s| s.kind == kind))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Take a handler out for execution. `None` if it is gone or already running.
    pub(crate) fn take_callback(&mut self, id: SubscriptionId) -> Option<TimerCallback> {
        self.subscriptions.get_mut(id)?.callback.take()
    }

    /// Put a handler back after execution, unless it unsubscribed itself meanwhile
    pub(crate) fn restore_callback(&mut self, id: SubscriptionId, callback: TimerCallback) {
        if let Some(sub) = self.subscriptions.get_mut(id) {
            sub.callback = Some(callback);
        }
    }
}
