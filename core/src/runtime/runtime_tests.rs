//! Tests for the tick runtime and fixed-step driver

use statclock_types::RuntimeConfig;

use super::{FixedStepper, TickRuntime};
use crate::error::ErrorKind;
use crate::ownership::Owner;
use crate::stats::{Modifier, Stat};
use crate::timers::{SchedulerError, TickGroup};

fn config(physics_hz: f32, sweep_interval_frames: u32) -> RuntimeConfig {
    RuntimeConfig {
        physics_hz,
        sweep_interval_frames,
        ..RuntimeConfig::default()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// FixedStepper
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_stepper_yields_whole_steps_and_carries_remainder() {
    let mut stepper = FixedStepper::new(0.25, 10);
    assert_eq!(stepper.accumulate(0.125), 0);
    assert_eq!(stepper.alpha(), 0.5);
    assert_eq!(stepper.accumulate(0.5), 2);
    assert_eq!(stepper.alpha(), 0.5);
}

#[test]
fn test_stepper_clamps_and_drops_backlog() {
    let mut stepper = FixedStepper::new(0.25, 3);
    assert_eq!(stepper.accumulate(10.125), 3);
    assert_eq!(stepper.alpha(), 0.5, "only the partial step survives");
    assert_eq!(stepper.accumulate(0.0), 0);
}

#[test]
fn test_stepper_alpha_stays_in_range_after_huge_backlog() {
    for step in [0.25, 1.0 / 60.0, 1.0 / 30.0, 0.1] {
        for delta in [1.0e9, 12_345.678, 3.3e5, 7.77e7] {
            let mut stepper = FixedStepper::new(step, 3);
            assert_eq!(stepper.accumulate(delta), 3);
            let alpha = stepper.alpha();
            assert!(
                (0.0..1.0).contains(&alpha),
                "alpha {alpha} out of range for step {step} delta {delta}"
            );
        }
    }
}

#[test]
fn test_stepper_ignores_bad_deltas() {
    let mut stepper = FixedStepper::new(0.5, 4);
    assert_eq!(stepper.accumulate(-1.0), 0);
    assert_eq!(stepper.accumulate(f32::NAN), 0);
    assert_eq!(stepper.accumulate(f32::INFINITY), 0);
    assert_eq!(stepper.alpha(), 0.0);
}

#[test]
fn test_stepper_sanitizes_construction() {
    let stepper = FixedStepper::new(0.0, 0);
    assert!(stepper.step() > 0.0);
    assert_eq!(stepper.max_steps(), 1);
}

// ═══════════════════════════════════════════════════════════════════════════
// Tick entry points
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_frame_runs_frame_then_physics_steps() {
    let mut runtime = TickRuntime::new(config(4.0, 0));
    let owner = Owner::new("body");
    let frame_timer = runtime.spawn_timer(&owner, 1.0, TickGroup::Frame).unwrap();
    let physics_timer = runtime.spawn_timer(&owner, 0.5, TickGroup::Physics).unwrap();
    runtime.scheduler_mut().start(frame_timer).unwrap();
    runtime.scheduler_mut().start(physics_timer).unwrap();

    let report = runtime.frame(0.5).unwrap();
    assert_eq!(report.physics_steps, 2);
    assert_eq!(report.physics_expired, 1);
    assert_eq!(report.frame.ticked, 1);
    assert_eq!(report.frame.expired, 0);
    assert_eq!(runtime.scheduler().timer(frame_timer).unwrap().elapsed(), 0.5);
}

#[test]
fn test_groups_advance_independently() {
    let mut runtime = TickRuntime::default();
    let owner = Owner::new("body");
    let physics_timer = runtime.spawn_timer(&owner, 1.0, TickGroup::Physics).unwrap();
    runtime.scheduler_mut().start(physics_timer).unwrap();

    runtime.advance_frame(5.0).unwrap();
    assert_eq!(runtime.scheduler().timer(physics_timer).unwrap().elapsed(), 0.0);

    runtime.advance_physics(0.25).unwrap();
    assert_eq!(runtime.scheduler().timer(physics_timer).unwrap().elapsed(), 0.25);
}

#[test]
fn test_periodic_sweep_prunes_dropped_owner() {
    let mut runtime = TickRuntime::new(config(50.0, 3));
    let owner = Owner::new("doomed");
    for _ in 0..3 {
        let timer = runtime.spawn_timer(&owner, 100.0, TickGroup::Frame).unwrap();
        runtime.scheduler_mut().start(timer).unwrap();
    }
    drop(owner);

    assert!(runtime.frame(0.01).unwrap().sweep.is_none());
    assert!(runtime.frame(0.01).unwrap().sweep.is_none());
    let sweep = runtime.frame(0.01).unwrap().sweep.expect("third frame sweeps");
    assert_eq!(sweep.pruned_owners, 1);
    assert_eq!(sweep.released, 3);
    assert!(runtime.scheduler().is_empty());
    assert_eq!(runtime.frame_count(), 3);
}

// ═══════════════════════════════════════════════════════════════════════════
// Owner lifecycle
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_initialize_registers_and_attaches() {
    let mut runtime = TickRuntime::default();
    let owner = Owner::new("ship");
    let a = runtime.scheduler_mut().create_timer(1.0);
    let b = runtime.scheduler_mut().create_timer(2.0);

    runtime
        .initialize(&owner, &[(a, TickGroup::Frame), (b, TickGroup::Physics)])
        .unwrap();
    assert_eq!(runtime.scheduler().group_of(a), Some(TickGroup::Frame));
    assert_eq!(runtime.scheduler().group_of(b), Some(TickGroup::Physics));
    assert_eq!(runtime.registry().attachments(&owner).len(), 2);

    assert_eq!(runtime.teardown(&owner), 2);
    assert!(runtime.scheduler().is_empty());
    assert_eq!(runtime.teardown(&owner), 0, "second teardown is a no-op");
}

#[test]
fn test_initialize_rejects_batch_atomically() {
    let mut runtime = TickRuntime::default();
    let owner = Owner::new("ship");
    let fresh = runtime.scheduler_mut().create_timer(1.0);
    let taken = runtime.scheduler_mut().create_timer(1.0);
    runtime.scheduler_mut().register(taken, TickGroup::Physics).unwrap();

    let err = runtime
        .initialize(&owner, &[(fresh, TickGroup::Frame), (taken, TickGroup::Frame)])
        .unwrap_err();
    assert_eq!(
        err,
        SchedulerError::AlreadyRegistered {
            timer: taken,
            group: TickGroup::Physics
        }
    );
    assert!(!runtime.scheduler().is_registered(fresh), "nothing applied");
    assert!(!runtime.registry().is_tracked(&owner));

    let err = runtime
        .initialize(&owner, &[(fresh, TickGroup::Frame), (fresh, TickGroup::Physics)])
        .unwrap_err();
    assert_eq!(err, SchedulerError::DuplicateBinding { timer: fresh });
    assert_eq!(err.kind(), ErrorKind::InvalidStateTransition);
}

#[test]
fn test_initialize_with_unknown_timer() {
    let mut runtime = TickRuntime::default();
    let owner = Owner::new("ship");
    let gone = runtime.scheduler_mut().create_timer(1.0);
    runtime.scheduler_mut().remove_timer(gone).unwrap();

    let err = runtime.initialize(&owner, &[(gone, TickGroup::Frame)]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownHandle);
}

#[test]
fn test_timed_modifier_through_runtime() {
    let mut runtime = TickRuntime::default();
    let owner = Owner::new("hero");
    let stat = Stat::new(10.0).shared();
    let id = stat.borrow_mut().add_modifier(Modifier::Multiply(0.5));
    runtime.with_timer(&owner, &stat, id, 3.0).unwrap();

    runtime.advance_frame(2.9).unwrap();
    assert_eq!(stat.borrow().effective_value(), 5.0);
    runtime.advance_frame(0.2).unwrap();
    assert_eq!(stat.borrow().effective_value(), 10.0);
}

#[test]
fn test_teardown_keeps_active_timed_modifier() {
    let mut runtime = TickRuntime::default();
    let owner = Owner::new("hero");
    let stat = Stat::new(1.0).shared();
    runtime
        .add_timed(&owner, &stat, Modifier::Add(2.0), 1.0)
        .unwrap();

    runtime.teardown(&owner);
    runtime.advance_frame(5.0).unwrap();
    assert_eq!(stat.borrow().effective_value(), 3.0);
}
