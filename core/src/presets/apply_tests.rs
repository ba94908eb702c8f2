//! Tests for applying presets through the runtime

use super::{ModifierPreset, PresetOp, apply_preset};
use crate::bridge::BridgeError;
use crate::error::ErrorKind;
use crate::ownership::Owner;
use crate::runtime::TickRuntime;
use crate::stats::{Stat, StatTable};

crate::stat_tags! {
    Speed,
    Armor,
}

fn preset(id: &str, stat: &str, op: PresetOp, value: f32, duration: Option<f32>) -> ModifierPreset {
    ModifierPreset {
        id: id.to_string(),
        stat: stat.to_string(),
        op,
        value,
        duration_secs: duration,
        description: String::new(),
    }
}

fn table() -> StatTable {
    let mut table = StatTable::new();
    table.insert::<Speed>(Stat::new(6.0)).unwrap();
    table.insert::<Armor>(Stat::new(10.0)).unwrap();
    table
}

#[test]
fn test_timed_preset_expires() {
    let mut runtime = TickRuntime::default();
    let owner = Owner::new("runner");
    let table = table();

    let slow = preset("slow", "Speed", PresetOp::Multiply, 0.5, Some(2.0));
    let applied = apply_preset(&mut runtime, &owner, &table, &slow).unwrap();
    assert!(applied.timed.is_some());
    assert_eq!(table.value::<Speed>().unwrap(), 3.0);

    runtime.advance_frame(2.0).unwrap();
    assert_eq!(table.value::<Speed>().unwrap(), 6.0);
}

#[test]
fn test_permanent_preset_stays() {
    let mut runtime = TickRuntime::default();
    let owner = Owner::new("tank");
    let table = table();

    let fortify = preset("fortify", "Armor", PresetOp::Add, 5.0, None);
    let applied = apply_preset(&mut runtime, &owner, &table, &fortify).unwrap();
    assert!(applied.timed.is_none());

    runtime.advance_frame(100.0).unwrap();
    assert_eq!(table.value::<Armor>().unwrap(), 15.0);
    assert!(runtime.scheduler().is_empty());
}

#[test]
fn test_preset_for_missing_stat() {
    let mut runtime = TickRuntime::default();
    let owner = Owner::new("tank");
    let table = table();

    let err = apply_preset(
        &mut runtime,
        &owner,
        &table,
        &preset("mana", "Mana", PresetOp::Add, 1.0, Some(1.0)),
    )
    .unwrap_err();
    assert!(matches!(err, BridgeError::Stat(_)));
    assert_eq!(err.kind(), ErrorKind::MissingStat);
    assert!(runtime.scheduler().is_empty());
}
