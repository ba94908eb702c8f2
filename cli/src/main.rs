use std::io::Write;

use clap::{Parser, Subcommand, ValueEnum};
use statclock_cli::{World, commands, logging, readline};
use statclock_core::Modifier;
use statclock_core::config::{ConfigExt, RuntimeConfig};

fn main() -> Result<(), String> {
    let config = RuntimeConfig::load();
    logging::init(&config.log);
    let mut world = World::new(config);

    while let Some(line) = readline()? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &mut world) {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                writeln!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(version, about = "statclock tick scheduler playground")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Op {
    Add,
    Multiply,
    Override,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an entity with default stats and a regen timer
    Spawn {
        #[arg(short, long)]
        name: String,
    },
    /// Remove an entity
    Despawn {
        #[arg(short, long)]
        name: String,
        /// Drop without teardown, leaving handles for the sweep
        #[arg(long)]
        leak: bool,
    },
    /// Add a modifier to a stat
    Buff {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        stat: String,
        #[arg(short, long, value_enum)]
        op: Op,
        #[arg(short, long, allow_negative_numbers = true)]
        value: f32,
        /// Remove again after this many seconds
        #[arg(long)]
        secs: Option<f32>,
    },
    /// Advance the world by one or more frames
    Frame {
        #[arg(short, long, default_value_t = 1.0 / 60.0)]
        dt: f32,
        #[arg(short, long, default_value_t = 1)]
        count: u32,
    },
    Show {
        #[arg(short, long)]
        name: Option<String>,
    },
    Sweep,
    Presets {
        #[arg(short, long)]
        path: String,
    },
    Apply {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        preset: String,
    },
    Config,
    SaveConfig,
    Exit,
}

fn respond(line: &str, world: &mut World) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "statclock".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match &cli.command {
        Some(Commands::Spawn { name }) => commands::spawn(world, name)?,
        Some(Commands::Despawn { name, leak }) => commands::despawn(world, name, *leak)?,
        Some(Commands::Buff {
            name,
            stat,
            op,
            value,
            secs,
        }) => {
            let modifier = match op {
                Op::Add => Modifier::Add(*value),
                Op::Multiply => Modifier::Multiply(*value),
                Op::Override => Modifier::Override(*value),
            };
            commands::buff(world, name, stat, modifier, *secs)?
        }
        Some(Commands::Frame { dt, count }) => commands::frame(world, *dt, *count)?,
        Some(Commands::Show { name }) => commands::show(world, name.as_deref())?,
        Some(Commands::Sweep) => commands::sweep(world)?,
        Some(Commands::Presets { path }) => commands::load_presets(world, path)?,
        Some(Commands::Apply { name, preset }) => commands::apply(world, name, preset)?,
        Some(Commands::Config) => commands::show_config(world)?,
        Some(Commands::SaveConfig) => commands::save_config(world)?,
        Some(Commands::Exit) => {
            commands::exit();
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
