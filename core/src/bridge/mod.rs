//! Timer-modifier bridge
//!
//! Ties a modifier already in a stat's pipeline to a frame timer. When the
//! timer stops (expiry or explicit cancel) its handler removes the modifier
//! and destroys the timer.
//!
//! Both the timer and its subscription are attached to the owner. Tearing
//! the owner down before expiry cancels the pending removal: the modifier
//! stays in the pipeline.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use thiserror::Error;
use tracing::{debug, warn};

use crate::error::ErrorKind;
use crate::ownership::{Owner, OwnershipRegistry};
use crate::stats::{Modifier, ModifierId, SharedStat, Stat, StatError};
use crate::timers::{
    HandlerError, HandlerResult, Scheduler, SchedulerError, StopReason, SubscriptionId, TickGroup,
    TimerDuration, TimerEvent, TimerId,
};


/// Handles created by `with_timer`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedModifier {
    pub modifier: ModifierId,
    pub timer: TimerId,
    pub subscription: SubscriptionId,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Stat(#[from] StatError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

impl BridgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::Stat(e) => e.kind(),
            BridgeError::Scheduler(e) => e.kind(),
        }
    }
}

/// Schedule removal of `modifier` from `stat` after `duration` seconds of
/// frame time.
///
/// The modifier must already be in the stat's pipeline. On error nothing is
/// created.
pub fn with_timer(
    scheduler: &mut Scheduler,
    registry: &mut OwnershipRegistry,
    owner: &Owner,
    stat: &SharedStat,
    modifier: ModifierId,
    duration: impl Into<TimerDuration>,
) -> Result<TimedModifier, BridgeError> {
    let present = stat
        .try_borrow()
        .map(|s| s.contains_modifier(modifier))
        .unwrap_or(false);
    if !present {
        return Err(StatError::UnknownModifier(modifier).into());
    }

    let timer = scheduler.create_timer(duration);
    let subscription = match arm(scheduler, timer, Rc::downgrade(stat), modifier) {
        Ok(subscription) => subscription,
        Err(e) => {
            // Also drops any subscription made before the failure
            let _ = scheduler.remove_timer(timer);
            return Err(e.into());
        }
    };

    registry.attach_timer(owner, timer);
    registry.attach_subscription(owner, subscription);
    scheduler.start(timer)?;

    debug!(
        owner = owner.label(),
        ?timer,
        ?modifier,
        duration = ?scheduler.timer(timer).map(|t| t.duration()),
        "Timed modifier armed"
    );
    Ok(TimedModifier {
        modifier,
        timer,
        subscription,
    })
}

/// Add `modifier` to `stat` and bind it to a timer in one step
pub fn add_timed(
    scheduler: &mut Scheduler,
    registry: &mut OwnershipRegistry,
    owner: &Owner,
    stat: &SharedStat,
    modifier: Modifier,
    duration: impl Into<TimerDuration>,
) -> Result<TimedModifier, BridgeError> {
    let id = stat
        .try_borrow_mut()
        .map_err(|_| StatError::Borrowed {
            tag: "<timed modifier target>".to_string(),
        })?
        .add_modifier(modifier);

    with_timer(scheduler, registry, owner, stat, id, duration).inspect_err(|_| {
        if let Ok(mut s) = stat.try_borrow_mut() {
            let _ = s.remove_modifier(id);
        }
    })
}

fn arm(
    scheduler: &mut Scheduler,
    timer: TimerId,
    target: Weak<RefCell<Stat>>,
    modifier: ModifierId,
) -> Result<SubscriptionId, SchedulerError> {
    scheduler.register(timer, TickGroup::Frame)?;
    scheduler.on_stop(timer, move |scheduler, event| {
        revoke(scheduler, event, &target, modifier)
    })
}

fn revoke(
    scheduler: &mut Scheduler,
    event: &TimerEvent,
    target: &Weak<RefCell<Stat>>,
    modifier: ModifierId,
) -> HandlerResult {
    let outcome = target.upgrade().map_or(Ok(()), |stat| remove_from(&stat, modifier));
    if let Err(e) = &outcome {
        warn!(timer = ?event.timer(), ?modifier, error = %e, "Timed modifier left in place");
    }

    let reason = match event {
        TimerEvent::Stopped { reason, .. } => *reason,
        _ => StopReason::Cancelled,
    };
    debug!(timer = ?event.timer(), ?modifier, ?reason, "Timed modifier revoked");
    // The timer goes away even when the modifier could not be removed
    scheduler.remove_timer(event.timer())?;
    outcome
}

fn remove_from(stat: &RefCell<Stat>, modifier: ModifierId) -> HandlerResult {
    let mut stat = stat
        .try_borrow_mut()
        .map_err(|_| HandlerError::new("timed modifier target is borrowed"))?;
    match stat.remove_modifier(modifier) {
        Ok(_) => Ok(()),
        // Removed by hand before the timer ran out
        Err(StatError::UnknownModifier(_)) => Ok(()),
        Err(e) => Err(HandlerError::new(e.to_string())),
    }
}
