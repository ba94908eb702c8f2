//! Tag-keyed stat tables
//!
//! Each logical quantity (health, speed, ...) is a zero-sized marker type
//! implementing `StatTag`. Tags declared together with `stat_tags!` get
//! consecutive slot numbers, so `table.get::<Health>()` is a direct index
//! into a small vector resolved at compile time. Names are kept alongside
//! for data-driven lookups (`get_by_name`).
//!
//! Tables are built explicitly by the owning entity at initialization:
//!
//! ```
//! use statclock_core::stats::{Stat, StatTable};
//!
//! statclock_core::stat_tags! {
//!     pub Health,
//!     pub Speed,
//! }
//!
//! let mut table = StatTable::new();
//! table.insert::<Health>(Stat::new(100.0)).unwrap();
//! table.insert::<Speed>(Stat::new(4.5)).unwrap();
//! assert_eq!(table.value::<Speed>().unwrap(), 4.5);
//! ```

use std::any::TypeId;

use hashbrown::HashMap;

use super::{SharedStat, Stat, StatError};

/// Compile-time identity of a stat
pub trait StatTag: 'static {
    /// Dense index within the tag set this tag was declared in
    const SLOT: usize;
    /// Stable name, used for data-driven lookups and logs
    const NAME: &'static str;
}

/// Declare a set of stat tags with consecutive slots.
///
/// Tags used together in one `StatTable` should come from one invocation;
/// tags from separate invocations reuse slot numbers and are rejected with
/// `StatError::SlotConflict` when they collide.
#[macro_export]
macro_rules! stat_tags {
    (@step $slot:expr, ) => {};
    (@step $slot:expr, $(#[$meta:meta])* $vis:vis $name:ident, $($rest:tt)*) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name;

        impl $crate::stats::StatTag for $name {
            const SLOT: usize = $slot;
            const NAME: &'static str = stringify!($name);
        }

        $crate::stat_tags!(@step $slot + 1, $($rest)*);
    };
    ($($(#[$meta:meta])* $vis:vis $name:ident),+ $(,)?) => {
        $crate::stat_tags!(@step 0usize, $($(#[$meta])* $vis $name,)+);
    };
}

#[derive(Debug)]
struct TableEntry {
    tag: TypeId,
    name: &'static str,
    stat: SharedStat,
}

/// The stats of one entity, at most one per tag
#[derive(Debug, Default)]
pub struct StatTable {
    slots: Vec<Option<TableEntry>>,
    by_name: HashMap<&'static str, usize>,
}

impl StatTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the stat for tag `T`. Fails if that tag (or its slot) is taken.
    pub fn insert<T: StatTag>(&mut self, stat: Stat) -> Result<SharedStat, StatError> {
        if let Some(Some(existing)) = self.slots.get(T::SLOT) {
            return Err(if existing.tag == TypeId::of::<T>() {
                StatError::DuplicateStat { tag: T::NAME }
            } else {
                StatError::SlotConflict {
                    tag: T::NAME,
                    existing: existing.name,
                    slot: T::SLOT,
                }
            });
        }
        if self.slots.len() <= T::SLOT {
            self.slots.resize_with(T::SLOT + 1, || None);
        }

        let shared = stat.shared();
        self.slots[T::SLOT] = Some(TableEntry {
            tag: TypeId::of::<T>(),
            name: T::NAME,
            stat: shared.clone(),
        });
        // Same-named tags from different sets: the first one owns the name
        self.by_name.entry(T::NAME).or_insert(T::SLOT);
        Ok(shared)
    }

    /// Builder form of `insert` with a fresh stat
    pub fn with<T: StatTag>(mut self, base: f32) -> Result<Self, StatError> {
        self.insert::<T>(Stat::new(base))?;
        Ok(self)
    }

    /// Shared handle to the stat for `T`
    pub fn get<T: StatTag>(&self) -> Result<SharedStat, StatError> {
        self.entry::<T>()
            .map(|entry| entry.stat.clone())
            .ok_or_else(|| StatError::MissingStat {
                tag: T::NAME.to_string(),
            })
    }

    /// Lookup by tag name, for callers that only have data
    pub fn get_by_name(&self, name: &str) -> Result<SharedStat, StatError> {
        self.by_name
            .get(name)
            .and_then(|&slot| self.slots.get(slot))
            .and_then(Option::as_ref)
            .map(|entry| entry.stat.clone())
            .ok_or_else(|| StatError::MissingStat {
                tag: name.to_string(),
            })
    }

    /// Current effective value of the stat for `T`
    pub fn value<T: StatTag>(&self) -> Result<f32, StatError> {
        let entry = self.entry::<T>().ok_or_else(|| StatError::MissingStat {
            tag: T::NAME.to_string(),
        })?;
        let stat = entry.stat.try_borrow().map_err(|_| StatError::Borrowed {
            tag: T::NAME.to_string(),
        })?;
        Ok(stat.effective_value())
    }

    pub fn contains<T: StatTag>(&self) -> bool {
        self.entry::<T>().is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Stats in slot order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &SharedStat)> {
        self.slots
            .iter()
            .flatten()
            .map(|entry| (entry.name, &entry.stat))
    }

    fn entry<T: StatTag>(&self) -> Option<&TableEntry> {
        self.slots
            .get(T::SLOT)
            .and_then(Option::as_ref)
            .filter(|entry| entry.tag == TypeId::of::<T>())
    }
}

/// Implemented by entities that expose a stat table
pub trait HasStats {
    fn stats(&self) -> &StatTable;

    fn stat<T: StatTag>(&self) -> Result<SharedStat, StatError> {
        self.stats().get::<T>()
    }
}
