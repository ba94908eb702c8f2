//! Demo world driven by the REPL
//!
//! Entities own a small stat table and one physics "regen" timer that
//! restarts itself on expiry. Everything they create is attached to their
//! `Owner`, so despawning either tears them down or (with `leak`) just
//! drops them for the liveness sweep to find.

use std::cell::Cell;
use std::rc::Rc;

use statclock_core::presets::{self, AppliedPreset, ModifierPreset};
use statclock_core::stats::{HasStats, StatError, StatTable};
use statclock_core::timers::{StopReason, TimerEvent};
use statclock_core::{
    FrameReport, Modifier, Owner, SchedulerError, TickGroup, TickRuntime, TimedModifier, TimerId,
};
use statclock_types::RuntimeConfig;

statclock_core::stat_tags! {
    pub Health,
    pub Speed,
    pub Armor,
}

const REGEN_SECS: f32 = 1.0;

pub struct Entity {
    pub name: String,
    owner: Owner,
    stats: StatTable,
    regen_timer: TimerId,
    regen_ticks: Rc<Cell<u32>>,
}

impl HasStats for Entity {
    fn stats(&self) -> &StatTable {
        &self.stats
    }
}

impl Entity {
    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    /// Number of completed regen cycles
    pub fn regen_ticks(&self) -> u32 {
        self.regen_ticks.get()
    }

    pub fn regen_timer(&self) -> TimerId {
        self.regen_timer
    }
}

fn base_stats() -> Result<StatTable, StatError> {
    StatTable::new()
        .with::<Health>(100.0)?
        .with::<Speed>(6.0)?
        .with::<Armor>(10.0)
}

pub struct World {
    pub runtime: TickRuntime,
    entities: Vec<Entity>,
    presets: Vec<ModifierPreset>,
    clock: f64,
}

impl World {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            runtime: TickRuntime::new(config),
            entities: Vec::new(),
            presets: Vec::new(),
            clock: 0.0,
        }
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Seconds of frame time simulated so far
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn spawn(&mut self, name: &str) -> Result<&Entity, String> {
        if self.entity(name).is_some() {
            return Err(format!("entity '{name}' already exists"));
        }

        let owner = Owner::new(name);
        let stats = base_stats().map_err(|e| e.to_string())?;
        let regen_ticks = Rc::new(Cell::new(0));

        let scheduler = self.runtime.scheduler_mut();
        let regen_timer = scheduler.create_timer(REGEN_SECS);
        let counter = Rc::clone(&regen_ticks);
        let subscription = scheduler
            .on_stop(regen_timer, move |scheduler, event| {
                if let TimerEvent::Stopped {
                    timer,
                    reason: StopReason::Expired,
                } = *event
                {
                    counter.set(counter.get() + 1);
                    scheduler.start(timer)?;
                }
                Ok(())
            })
            .map_err(|e| e.to_string())?;

        self.runtime
            .initialize(&owner, &[(regen_timer, TickGroup::Physics)])
            .map_err(|e| e.to_string())?;
        // initialize only attaches timers
        self.runtime.attach(&owner, subscription);
        self.runtime
            .scheduler_mut()
            .start(regen_timer)
            .map_err(|e| e.to_string())?;

        self.entities.push(Entity {
            name: name.to_string(),
            owner,
            stats,
            regen_timer,
            regen_ticks,
        });
        self.entity(name)
            .ok_or_else(|| format!("entity '{name}' vanished"))
    }

    /// Remove an entity. With `leak`, skip teardown and leave its handles
    /// for the liveness sweep.
    pub fn despawn(&mut self, name: &str, leak: bool) -> Result<usize, String> {
        let index = self
            .entities
            .iter()
            .position(|e| e.name == name)
            .ok_or_else(|| format!("no entity named '{name}'"))?;
        let entity = self.entities.swap_remove(index);
        if leak {
            return Ok(0);
        }
        Ok(self.runtime.teardown(&entity.owner))
    }

    /// Add a modifier to one of an entity's stats, optionally timed
    pub fn buff(
        &mut self,
        name: &str,
        stat: &str,
        modifier: Modifier,
        secs: Option<f32>,
    ) -> Result<Option<TimedModifier>, String> {
        let entity = self
            .entities
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| format!("no entity named '{name}'"))?;
        let target = entity.stats.get_by_name(stat).map_err(|e| e.to_string())?;

        match secs {
            Some(secs) => self
                .runtime
                .add_timed(&entity.owner, &target, modifier, secs)
                .map(Some)
                .map_err(|e| e.to_string()),
            None => {
                target
                    .try_borrow_mut()
                    .map_err(|_| format!("stat '{stat}' is busy"))?
                    .add_modifier(modifier);
                Ok(None)
            }
        }
    }

    pub fn frame(&mut self, delta_secs: f32) -> Result<FrameReport, SchedulerError> {
        let report = self.runtime.frame(delta_secs)?;
        self.clock += f64::from(delta_secs);
        Ok(report)
    }

    pub fn set_presets(&mut self, presets: Vec<ModifierPreset>) {
        self.presets = presets;
    }

    pub fn presets(&self) -> &[ModifierPreset] {
        &self.presets
    }

    pub fn apply_preset(&mut self, name: &str, preset_id: &str) -> Result<AppliedPreset, String> {
        let preset = self
            .presets
            .iter()
            .find(|p| p.id == preset_id)
            .ok_or_else(|| format!("no preset with id '{preset_id}'"))?;
        let entity = self
            .entities
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| format!("no entity named '{name}'"))?;
        presets::apply_preset(&mut self.runtime, &entity.owner, &entity.stats, preset)
            .map_err(|e| e.to_string())
    }
}
