use std::io::Write;
use std::path::Path;

use statclock_core::config::{ConfigExt, RuntimeConfig, config_path};
use statclock_core::presets::{load_presets_from_dir, load_presets_from_file};
use statclock_core::stats::HasStats;
use statclock_core::{Modifier, TickGroup};

use crate::world::World;

pub fn spawn(world: &mut World, name: &str) -> Result<(), String> {
    let entity = world.spawn(name)?;
    println!("spawned {} ({})", entity.name, entity.owner().label());
    Ok(())
}

pub fn despawn(world: &mut World, name: &str, leak: bool) -> Result<(), String> {
    let released = world.despawn(name, leak)?;
    if leak {
        println!("dropped {name} without teardown; run `sweep` to reclaim its handles");
    } else {
        println!("tore down {name}, released {released} handles");
    }
    Ok(())
}

pub fn buff(
    world: &mut World,
    name: &str,
    stat: &str,
    modifier: Modifier,
    secs: Option<f32>,
) -> Result<(), String> {
    match world.buff(name, stat, modifier, secs)? {
        Some(timed) => println!(
            "{name}.{stat}: {modifier:?} for {}s (timer {:?})",
            secs.unwrap_or_default(),
            timed.timer
        ),
        None => println!("{name}.{stat}: {modifier:?} (permanent)"),
    }
    Ok(())
}

pub fn frame(world: &mut World, dt: f32, count: u32) -> Result<(), String> {
    let mut expired = 0;
    let mut physics_steps = 0;
    let mut failures = Vec::new();

    for _ in 0..count.max(1) {
        let report = world.frame(dt).map_err(|e| e.to_string())?;
        expired += report.frame.expired + report.physics_expired;
        physics_steps += report.physics_steps;
        failures.extend(report.frame.failures);
        failures.extend(report.physics_failures);
        if let Some(sweep) = report.sweep {
            println!(
                "sweep: pruned {} owners, released {} handles",
                sweep.pruned_owners, sweep.released
            );
        }
    }

    println!(
        "t={:.3}s  physics steps: {physics_steps}  expired: {expired}",
        world.clock()
    );
    for failure in failures {
        println!(
            "  handler failure on {:?}: {}{}",
            failure.event,
            failure.message,
            if failure.panicked { " (dropped)" } else { "" }
        );
    }
    Ok(())
}

pub fn show(world: &World, name: Option<&str>) -> Result<(), String> {
    let scheduler = world.runtime.scheduler();
    println!(
        "t={:.3}s  timers: {}  frame: {}  physics: {}  owners: {}",
        world.clock(),
        scheduler.len(),
        scheduler.group_len(TickGroup::Frame),
        scheduler.group_len(TickGroup::Physics),
        world.runtime.registry().owner_count()
    );

    let entities: Vec<_> = match name {
        Some(name) => vec![
            world
                .entity(name)
                .ok_or_else(|| format!("no entity named '{name}'"))?,
        ],
        None => world.entities().iter().collect(),
    };

    for entity in entities {
        println!(
            "{}  regen cycles: {}  handles: {}",
            entity.name,
            entity.regen_ticks(),
            world.runtime.registry().attachments(entity.owner()).len()
        );
        for (tag, stat) in entity.stats().iter() {
            let stat = stat.borrow();
            println!(
                "  {:<8} base {:>8.2}  effective {:>8.2}  modifiers {}",
                tag,
                stat.base(),
                stat.effective_value(),
                stat.modifier_count()
            );
        }
    }
    Ok(())
}

pub fn sweep(world: &mut World) -> Result<(), String> {
    let report = world.runtime.sweep();
    println!(
        "pruned {} owners, released {} handles, dropped {} stale handles",
        report.pruned_owners, report.released, report.stale_dropped
    );
    Ok(())
}

pub fn load_presets(world: &mut World, path: &str) -> Result<(), String> {
    let path = Path::new(path);
    let presets = if path.is_dir() {
        load_presets_from_dir(path)
    } else {
        load_presets_from_file(path)
    }
    .map_err(|e| format!("{e}: {}", error_chain(&e)))?;

    println!("loaded {} presets", presets.len());
    for preset in &presets {
        let duration = preset
            .duration_secs
            .map(|d| format!("{d}s"))
            .unwrap_or_else(|| "permanent".to_string());
        println!(
            "  {:<16} {:<8} {:?} {} ({duration})",
            preset.id, preset.stat, preset.op, preset.value
        );
    }
    world.set_presets(presets);
    Ok(())
}

pub fn apply(world: &mut World, name: &str, preset: &str) -> Result<(), String> {
    let applied = world.apply_preset(name, preset)?;
    match applied.timed {
        Some(timed) => println!("applied {preset} to {name} (timer {:?})", timed.timer),
        None => println!("applied {preset} to {name}"),
    }
    Ok(())
}

pub fn show_config(world: &World) -> Result<(), String> {
    let config = world.runtime.config();
    match config_path() {
        Ok(path) => println!("config file: {}", path.display()),
        Err(e) => println!("config file: unavailable ({e})"),
    }
    println!("{config:#?}");
    Ok(())
}

pub fn save_config(world: &World) -> Result<(), String> {
    let config: &RuntimeConfig = world.runtime.config();
    config.store().map_err(|e| format!("{e}: {}", error_chain(&e)))?;
    println!("configuration saved");
    Ok(())
}

pub fn exit() {
    let mut stdout = std::io::stdout();
    let _ = writeln!(stdout, "quitting...");
    let _ = stdout.flush();
}

fn error_chain(error: &dyn std::error::Error) -> String {
    let mut parts = Vec::new();
    let mut source = error.source();
    while let Some(cause) = source {
        parts.push(cause.to_string());
        source = cause.source();
    }
    parts.join(": ")
}
