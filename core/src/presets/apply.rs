//! Applying presets to an entity's stats

use tracing::debug;

use super::ModifierPreset;
use crate::bridge::{BridgeError, TimedModifier};
use crate::ownership::Owner;
use crate::runtime::TickRuntime;
use crate::stats::{ModifierId, StatError, StatTable};

/// What applying a preset created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedPreset {
    pub modifier: ModifierId,
    /// Present for presets with a duration
    pub timed: Option<TimedModifier>,
}

/// Add the preset's modifier to the stat it names in `table`.
///
/// Timed presets go through the bridge and are attached to `owner`.
pub fn apply_preset(
    runtime: &mut TickRuntime,
    owner: &Owner,
    table: &StatTable,
    preset: &ModifierPreset,
) -> Result<AppliedPreset, BridgeError> {
    let stat = table.get_by_name(&preset.stat)?;

    let applied = match preset.duration_secs {
        Some(duration) => {
            let timed = runtime.add_timed(owner, &stat, preset.modifier(), duration)?;
            AppliedPreset {
                modifier: timed.modifier,
                timed: Some(timed),
            }
        }
        None => {
            let modifier = stat
                .try_borrow_mut()
                .map_err(|_| StatError::Borrowed {
                    tag: preset.stat.clone(),
                })?
                .add_modifier(preset.modifier());
            AppliedPreset {
                modifier,
                timed: None,
            }
        }
    };

    debug!(
        preset = %preset.id,
        stat = %preset.stat,
        owner = owner.label(),
        timed = applied.timed.is_some(),
        "Preset applied"
    );
    Ok(applied)
}
