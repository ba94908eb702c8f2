//! A numeric stat: base value plus modifier pipeline
//!
//! The effective value is cached and recomputed lazily on the first read
//! after any change to the base or the pipeline.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::{Modifier, ModifierId, ModifierPipeline, StatError};

/// Stats are shared between their table and any timed modifier removing
/// entries from them later.
pub type SharedStat = Rc<RefCell<Stat>>;

#[derive(Debug, Clone, Default)]
pub struct Stat {
    base: f32,
    pipeline: ModifierPipeline,
    cached: Cell<Option<f32>>,
}

impl Stat {
    pub fn new(base: f32) -> Self {
        Self {
            base,
            pipeline: ModifierPipeline::new(),
            cached: Cell::new(None),
        }
    }

    /// Wrap into the shared form stored by `StatTable`
    pub fn shared(self) -> SharedStat {
        Rc::new(RefCell::new(self))
    }

    pub fn base(&self) -> f32 {
        self.base
    }

    pub fn set_base(&mut self, base: f32) {
        self.base = base;
        self.invalidate();
    }

    /// Base folded through every modifier in insertion order
    pub fn effective_value(&self) -> f32 {
        if let Some(value) = self.cached.get() {
            return value;
        }
        let value = self.pipeline.apply(self.base);
        self.cached.set(Some(value));
        value
    }

    pub fn add_modifier(&mut self, modifier: Modifier) -> ModifierId {
        self.invalidate();
        self.pipeline.push(modifier)
    }

    pub fn remove_modifier(&mut self, id: ModifierId) -> Result<Modifier, StatError> {
        let removed = self
            .pipeline
            .remove(id)
            .ok_or(StatError::UnknownModifier(id))?;
        self.invalidate();
        Ok(removed)
    }

    pub fn contains_modifier(&self, id: ModifierId) -> bool {
        self.pipeline.contains(id)
    }

    pub fn modifier_count(&self) -> usize {
        self.pipeline.len()
    }

    pub fn modifiers(&self) -> impl Iterator<Item = (ModifierId, &Modifier)> {
        self.pipeline.iter()
    }

    pub fn clear_modifiers(&mut self) {
        self.pipeline.clear();
        self.invalidate();
    }

    fn invalidate(&self) {
        self.cached.set(None);
    }
}
