//! Modifier entries and the ordered pipeline that folds them
//!
//! Modifiers are a closed enum stored inline, so a pipeline is one flat
//! `Vec` with no per-entry boxing and no virtual calls. Entries are applied
//! in insertion order. Removal goes through the `ModifierId` issued at
//! insertion and never compares payloads (custom functions are not
//! comparable).

use std::fmt;

/// A single value transformation
#[derive(Clone, Copy)]
pub enum Modifier {
    /// Add the payload to the running value
    Add(f32),
    /// Multiply the running value by the payload
    Multiply(f32),
    /// Replace the running value. Later entries still apply.
    Override(f32),
    /// Arbitrary pure function of the running value
    Custom(fn(f32) -> f32),
}

impl Modifier {
    #[inline]
    pub fn apply(&self, value: f32) -> f32 {
        match *self {
            Modifier::Add(amount) => value + amount,
            Modifier::Multiply(factor) => value * factor,
            Modifier::Override(replacement) => replacement,
            Modifier::Custom(f) => f(value),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Modifier::Add(_) => "add",
            Modifier::Multiply(_) => "multiply",
            Modifier::Override(_) => "override",
            Modifier::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::Add(v) => write!(f, "Add({v})"),
            Modifier::Multiply(v) => write!(f, "Multiply({v})"),
            Modifier::Override(v) => write!(f, "Override({v})"),
            Modifier::Custom(_) => f.write_str("Custom(fn)"),
        }
    }
}

/// Handle to a pipeline entry. Unique within the pipeline that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModifierId(u64);

#[derive(Debug, Clone, Copy)]
struct Entry {
    id: ModifierId,
    /// `None` once removed; compacted lazily
    modifier: Option<Modifier>,
}

/// Fewer entries than this are never compacted
const COMPACT_MIN_LEN: usize = 16;

/// Ordered, tombstoned modifier list.
///
/// Ids increase monotonically and entries are only appended, so the vector
/// stays sorted by id and removal is a binary search plus a tombstone.
/// Tombstones are swept once they outnumber live entries.
#[derive(Debug, Clone, Default)]
pub struct ModifierPipeline {
    entries: Vec<Entry>,
    next_id: u64,
    live: usize,
}

impl ModifierPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a modifier; it applies after every existing entry
    pub fn push(&mut self, modifier: Modifier) -> ModifierId {
        let id = ModifierId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            modifier: Some(modifier),
        });
        self.live += 1;
        id
    }

    /// Remove an entry by handle. `None` if it was never issued or already removed.
    pub fn remove(&mut self, id: ModifierId) -> Option<Modifier> {
        let index = self.entries.binary_search_by_key(&id, |e| e.id).ok()?;
        let removed = self.entries[index].modifier.take()?;
        self.live -= 1;
        self.compact_if_sparse();
        Some(removed)
    }

    pub fn contains(&self, id: ModifierId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: ModifierId) -> Option<&Modifier> {
        let index = self.entries.binary_search_by_key(&id, |e| e.id).ok()?;
        self.entries[index].modifier.as_ref()
    }

    /// Fold `base` through every live entry in insertion order
    pub fn apply(&self, base: f32) -> f32 {
        self.entries
            .iter()
            .filter_map(|e| e.modifier.as_ref())
            .fold(base, |value, modifier| modifier.apply(value))
    }

    /// Live entries in application order
    pub fn iter(&self) -> impl Iterator<Item = (ModifierId, &Modifier)> {
        self.entries
            .iter()
            .filter_map(|e| e.modifier.as_ref().map(|m| (e.id, m)))
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Remove every entry. Issued ids are not reused.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.live = 0;
    }

    fn compact_if_sparse(&mut self) {
        let dead = self.entries.len() - self.live;
        if self.entries.len() >= COMPACT_MIN_LEN && dead > self.live {
            self.entries.retain(|e| e.modifier.is_some());
        }
    }
}
