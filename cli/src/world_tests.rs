//! Tests for the demo world

use statclock_core::stats::HasStats;
use statclock_core::{Modifier, TickGroup};
use statclock_types::RuntimeConfig;

use crate::world::{Speed, World};

fn world() -> World {
    World::new(RuntimeConfig {
        physics_hz: 4.0,
        sweep_interval_frames: 0,
        ..RuntimeConfig::default()
    })
}

#[test]
fn test_spawn_registers_regen_timer() {
    let mut world = world();
    world.spawn("alice").unwrap();
    assert!(world.spawn("alice").is_err(), "names are unique");

    let scheduler = world.runtime.scheduler();
    let entity = world.entity("alice").unwrap();
    assert_eq!(scheduler.group_of(entity.regen_timer()), Some(TickGroup::Physics));
    assert_eq!(world.runtime.registry().attachments(entity.owner()).len(), 2);
}

#[test]
fn test_regen_timer_restarts_itself() {
    let mut world = world();
    world.spawn("alice").unwrap();

    world.frame(1.0).unwrap();
    world.frame(1.0).unwrap();
    let entity = world.entity("alice").unwrap();
    assert_eq!(entity.regen_ticks(), 2);
    assert!(world.runtime.scheduler().is_registered(entity.regen_timer()));
}

#[test]
fn test_timed_buff_wears_off() {
    let mut world = world();
    world.spawn("bob").unwrap();
    world
        .buff("bob", "Speed", Modifier::Multiply(0.5), Some(0.5))
        .unwrap();
    assert_eq!(world.entity("bob").unwrap().stats().value::<Speed>().unwrap(), 3.0);

    world.frame(0.5).unwrap();
    assert_eq!(world.entity("bob").unwrap().stats().value::<Speed>().unwrap(), 6.0);
}

#[test]
fn test_buff_unknown_stat() {
    let mut world = world();
    world.spawn("bob").unwrap();
    assert!(world.buff("bob", "Mana", Modifier::Add(1.0), None).is_err());
}

#[test]
fn test_teardown_and_leak() {
    let mut world = world();
    world.spawn("alice").unwrap();
    world.spawn("bob").unwrap();

    assert_eq!(world.despawn("alice", false).unwrap(), 2);
    assert_eq!(world.despawn("bob", true).unwrap(), 0);
    assert_eq!(world.runtime.scheduler().len(), 1, "bob's timer lingers");

    let report = world.runtime.sweep();
    assert_eq!(report.pruned_owners, 1);
    assert!(world.runtime.scheduler().is_empty());
}
