//! statclock engine
//!
//! A centralized tick scheduler for timers, a weak ownership registry for the
//! handles entities create, and a stat/modifier pipeline with time-bounded
//! modifiers bridged onto scheduler timers.

pub mod bridge;
pub mod config;
pub mod error;
pub mod ownership;
pub mod presets;
pub mod runtime;
pub mod stats;
pub mod timers;

// Re-exports for convenience
pub use bridge::{BridgeError, TimedModifier};
pub use config::{ConfigError, ConfigExt};
pub use error::ErrorKind;
pub use ownership::{Attachment, Owner, OwnershipRegistry, SweepReport};
pub use presets::{ModifierPreset, PresetError, apply_preset, load_presets_from_dir};
pub use runtime::{FixedStepper, FrameReport, TickRuntime};
pub use stats::{
    HasStats, Modifier, ModifierId, SharedStat, Stat, StatError, StatTable, StatTag,
};
pub use timers::{
    AdvanceReport, HandlerError, HandlerResult, Scheduler, SchedulerError, StopReason,
    SubscriptionId, TickGroup, Timer, TimerDuration, TimerError, TimerEvent, TimerEventKind,
    TimerId, TimerState,
};
