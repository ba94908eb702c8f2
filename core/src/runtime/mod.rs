//! Tick entry points and owner lifecycle hooks
//!
//! `TickRuntime` bundles the scheduler, the ownership registry and the
//! fixed-step driver behind the surface a host calls into: one
//! `advance_frame`/`advance_physics` per tick (or `frame` for hosts that
//! only have a frame delta), plus `initialize`/`teardown` per owner.

mod stepper;

#[cfg(test)]
mod runtime_tests;

pub use stepper::FixedStepper;

use hashbrown::HashSet;
use statclock_types::RuntimeConfig;
use tracing::{debug, info};

use crate::bridge::{self, BridgeError, TimedModifier};
use crate::ownership::{Attachment, Owner, OwnershipRegistry, SweepReport};
use crate::stats::{Modifier, ModifierId, SharedStat};
use crate::timers::{
    AdvanceReport, HandlerFailure, Scheduler, SchedulerError, TickGroup, TimerDuration, TimerId,
};

/// Outcome of one `frame` call
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub frame: AdvanceReport,
    /// Fixed steps run for this frame
    pub physics_steps: u32,
    /// Physics timers that expired across those steps
    pub physics_expired: usize,
    /// Handler failures from the physics steps
    pub physics_failures: Vec<HandlerFailure>,
    /// Set when this frame triggered the periodic liveness sweep
    pub sweep: Option<SweepReport>,
}

/// Host-facing driver around one scheduler
#[derive(Debug)]
pub struct TickRuntime {
    scheduler: Scheduler,
    registry: OwnershipRegistry,
    stepper: FixedStepper,
    config: RuntimeConfig,
    frames: u64,
    last_sweep: Option<SweepReport>,
}

impl Default for TickRuntime {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

impl TickRuntime {
    pub fn new(config: RuntimeConfig) -> Self {
        let scheduler = Scheduler::with_capacity(config.frame_capacity, config.physics_capacity);
        let stepper = FixedStepper::new(config.physics_step(), config.max_physics_steps);
        debug!(
            physics_hz = config.physics_hz,
            max_physics_steps = config.max_physics_steps,
            sweep_interval = config.sweep_interval_frames,
            "Tick runtime created"
        );
        Self {
            scheduler,
            registry: OwnershipRegistry::new(),
            stepper,
            config,
            frames: 0,
            last_sweep: None,
        }
    }

    // ─── Tick entry points ──────────────────────────────────────────────────

    /// Advance the frame group once. Runs the liveness sweep every
    /// `sweep_interval_frames` calls.
    pub fn advance_frame(&mut self, delta_secs: f32) -> Result<AdvanceReport, SchedulerError> {
        let report = self.scheduler.advance(TickGroup::Frame, delta_secs)?;
        self.frames += 1;

        let interval = u64::from(self.config.sweep_interval_frames);
        self.last_sweep = if interval > 0 && self.frames % interval == 0 {
            Some(self.sweep())
        } else {
            None
        };
        Ok(report)
    }

    /// Advance the physics group once by a fixed step
    pub fn advance_physics(&mut self, step_secs: f32) -> Result<AdvanceReport, SchedulerError> {
        self.scheduler.advance(TickGroup::Physics, step_secs)
    }

    /// One host frame: the frame group, then as many fixed physics steps as
    /// the accumulated time allows.
    pub fn frame(&mut self, delta_secs: f32) -> Result<FrameReport, SchedulerError> {
        let frame = self.advance_frame(delta_secs)?;
        let steps = self.stepper.accumulate(delta_secs);
        let step = self.stepper.step();

        let mut physics_expired = 0;
        let mut physics_failures = Vec::new();
        for _ in 0..steps {
            let report = self.advance_physics(step)?;
            physics_expired += report.expired;
            physics_failures.extend(report.failures);
        }

        Ok(FrameReport {
            frame,
            physics_steps: steps,
            physics_expired,
            physics_failures,
            sweep: self.last_sweep.take(),
        })
    }

    // ─── Owner lifecycle ────────────────────────────────────────────────────

    /// Register a batch of timers into their groups and attach them to `owner`.
    ///
    /// The whole batch is validated first; on error nothing is registered.
    pub fn initialize(
        &mut self,
        owner: &Owner,
        bindings: &[(TimerId, TickGroup)],
    ) -> Result<(), SchedulerError> {
        let mut seen = HashSet::with_capacity(bindings.len());
        for &(timer, _) in bindings {
            if !seen.insert(timer) {
                return Err(SchedulerError::DuplicateBinding { timer });
            }
            if !self.scheduler.contains(timer) {
                return Err(SchedulerError::UnknownTimer(timer));
            }
            if let Some(group) = self.scheduler.group_of(timer) {
                return Err(SchedulerError::AlreadyRegistered { timer, group });
            }
        }

        for &(timer, group) in bindings {
            self.scheduler.register(timer, group)?;
            self.registry.attach_timer(owner, timer);
        }
        info!(owner = owner.label(), timers = bindings.len(), "Owner initialized");
        Ok(())
    }

    /// Release every handle `owner` attached. Safe to call more than once.
    pub fn teardown(&mut self, owner: &Owner) -> usize {
        let released = self.registry.release_all(owner, &mut self.scheduler);
        info!(owner = owner.label(), released, "Owner torn down");
        released
    }

    /// Create a timer, register it and attach it to `owner`
    pub fn spawn_timer(
        &mut self,
        owner: &Owner,
        duration: impl Into<TimerDuration>,
        group: TickGroup,
    ) -> Result<TimerId, SchedulerError> {
        let timer = self.scheduler.create_timer(duration);
        if let Err(e) = self.scheduler.register(timer, group) {
            let _ = self.scheduler.remove_timer(timer);
            return Err(e);
        }
        self.registry.attach_timer(owner, timer);
        Ok(timer)
    }

    /// Attach a handle created directly on the scheduler to `owner`
    pub fn attach(&mut self, owner: &Owner, attachment: impl Into<Attachment>) {
        self.registry.attach(owner, attachment);
    }

    /// Bind an existing modifier to a frame timer (see `bridge::with_timer`)
    pub fn with_timer(
        &mut self,
        owner: &Owner,
        stat: &SharedStat,
        modifier: ModifierId,
        duration: impl Into<TimerDuration>,
    ) -> Result<TimedModifier, BridgeError> {
        bridge::with_timer(
            &mut self.scheduler,
            &mut self.registry,
            owner,
            stat,
            modifier,
            duration,
        )
    }

    /// Add a modifier and bind it to a frame timer
    pub fn add_timed(
        &mut self,
        owner: &Owner,
        stat: &SharedStat,
        modifier: Modifier,
        duration: impl Into<TimerDuration>,
    ) -> Result<TimedModifier, BridgeError> {
        bridge::add_timed(
            &mut self.scheduler,
            &mut self.registry,
            owner,
            stat,
            modifier,
            duration,
        )
    }

    /// Prune owners that were dropped without teardown
    pub fn sweep(&mut self) -> SweepReport {
        self.registry.sweep(&mut self.scheduler)
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    pub fn registry(&self) -> &OwnershipRegistry {
        &self.registry
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn stepper(&self) -> &FixedStepper {
        &self.stepper
    }

    /// Number of `advance_frame` calls so far
    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}
