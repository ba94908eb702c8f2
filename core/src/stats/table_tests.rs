//! Tests for tag-keyed stat tables

use std::rc::Rc;

use super::{HasStats, Modifier, Stat, StatError, StatTable};
use crate::error::ErrorKind;

crate::stat_tags! {
    Health,
    Speed,
    /// Declared last so its slot is past the end of small tables
    Armor,
}

mod other_set {
    crate::stat_tags! {
        pub Stamina,
    }
}

mod inventory_stats {
    crate::stat_tags! {
        pub Health,
    }
}

mod shield_stats {
    crate::stat_tags! {
        pub Health,
    }
}

use other_set::Stamina;

fn sample_table() -> StatTable {
    StatTable::new()
        .with::<Health>(100.0)
        .and_then(|t| t.with::<Speed>(4.0))
        .unwrap()
}

#[test]
fn test_tags_get_consecutive_slots() {
    use super::StatTag;
    assert_eq!(Health::SLOT, 0);
    assert_eq!(Speed::SLOT, 1);
    assert_eq!(Armor::SLOT, 2);
    assert_eq!(Armor::NAME, "Armor");
}

#[test]
fn test_insert_and_lookup() {
    let table = sample_table();
    assert_eq!(table.len(), 2);
    assert!(table.contains::<Health>());
    assert!(!table.contains::<Armor>());
    assert_eq!(table.value::<Health>().unwrap(), 100.0);
}

#[test]
fn test_lookup_returns_shared_stat() {
    let table = sample_table();
    let handle = table.get::<Speed>().unwrap();
    handle.borrow_mut().add_modifier(Modifier::Multiply(0.5));

    assert_eq!(table.value::<Speed>().unwrap(), 2.0);
    assert!(Rc::ptr_eq(&handle, &table.get::<Speed>().unwrap()));
}

#[test]
fn test_missing_stat() {
    let table = sample_table();
    let err = table.get::<Armor>().unwrap_err();
    assert_eq!(
        err,
        StatError::MissingStat {
            tag: "Armor".to_string()
        }
    );
    assert_eq!(err.kind(), ErrorKind::MissingStat);
}

#[test]
fn test_duplicate_stat_rejected() {
    let mut table = sample_table();
    let err = table.insert::<Health>(Stat::new(1.0)).unwrap_err();
    assert_eq!(err, StatError::DuplicateStat { tag: "Health" });
    assert_eq!(err.kind(), ErrorKind::DuplicateStat);
    assert_eq!(table.value::<Health>().unwrap(), 100.0, "first stat kept");
}

#[test]
fn test_tags_from_different_sets_conflict_on_shared_slot() {
    let mut table = sample_table();
    let err = table.insert::<Stamina>(Stat::new(5.0)).unwrap_err();
    assert!(matches!(
        err,
        StatError::SlotConflict {
            tag: "Stamina",
            existing: "Health",
            slot: 0
        }
    ));

    // A foreign tag never reads another set's stat
    assert!(!table.contains::<Stamina>());
    assert!(table.get::<Stamina>().is_err());
}

#[test]
fn test_same_named_tags_from_different_sets_stay_distinct() {
    let mut table = StatTable::new();
    table
        .insert::<inventory_stats::Health>(Stat::new(10.0))
        .unwrap();

    let err = table
        .insert::<shield_stats::Health>(Stat::new(99.0))
        .unwrap_err();
    assert!(matches!(
        err,
        StatError::SlotConflict {
            tag: "Health",
            existing: "Health",
            slot: 0
        }
    ));

    assert!(table.contains::<inventory_stats::Health>());
    assert!(!table.contains::<shield_stats::Health>());
    assert!(table.get::<shield_stats::Health>().is_err());
    assert_eq!(table.value::<inventory_stats::Health>().unwrap(), 10.0);
    assert_eq!(table.len(), 1);
}

#[test]
fn test_get_by_name() {
    let table = sample_table();
    assert_eq!(table.get_by_name("Speed").unwrap().borrow().base(), 4.0);
    assert!(matches!(
        table.get_by_name("Mana"),
        Err(StatError::MissingStat { .. })
    ));
}

#[test]
fn test_value_while_mutably_borrowed() {
    let table = sample_table();
    let handle = table.get::<Health>().unwrap();
    let _guard = handle.borrow_mut();
    assert!(matches!(
        table.value::<Health>(),
        Err(StatError::Borrowed { .. })
    ));
}

#[test]
fn test_iter_in_slot_order() {
    let mut table = StatTable::new();
    table.insert::<Armor>(Stat::new(3.0)).unwrap();
    table.insert::<Health>(Stat::new(1.0)).unwrap();
    let names: Vec<_> = table.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["Health", "Armor"]);
}

struct Dummy {
    stats: StatTable,
}

impl HasStats for Dummy {
    fn stats(&self) -> &StatTable {
        &self.stats
    }
}

#[test]
fn test_has_stats_lookup() {
    let dummy = Dummy {
        stats: sample_table(),
    };
    assert_eq!(dummy.stat::<Health>().unwrap().borrow().base(), 100.0);
    assert!(dummy.stat::<Armor>().is_err());
}
