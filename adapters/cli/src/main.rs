#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Quantum Loop levels headlessly.

mod board_transfer;
mod frame;
mod script;

use std::{fs, path::PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{ArgGroup, Parser};
use log::info;
use quantum_loop_world::{
    self as world, catalogue, query, LevelDefinition, Session, SessionConfig,
    DEFAULT_HISTORY_CAPACITY, DEFAULT_PROJECTILE_STOCK, DEFAULT_SEED,
};

use crate::{board_transfer::BoardSnapshot, script::Action};

/// Command-line arguments accepted by the Quantum Loop CLI.
#[derive(Debug, Parser)]
#[command(
    name = "quantum-loop",
    about = "Rotate tiles until the beam reaches the sink",
    group(ArgGroup::new("board").required(true).args(["level", "builtin", "import"]))
)]
struct CliArgs {
    /// Level definition in JSON format.
    #[arg(value_name = "LEVEL.json")]
    level: Option<PathBuf>,

    /// Plays a built-in level by number.
    #[arg(long, value_name = "N")]
    builtin: Option<u32>,

    /// Starts from a board snapshot produced by `--export`.
    #[arg(long, value_name = "SNAPSHOT")]
    import: Option<String>,

    /// Seed driving adversary spawning and behaviour.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Scripted action: rotate:R,C | tick[:N] | fire:ANGLE:POWER | grant:N | expire.
    #[arg(long = "action", short = 'a', value_name = "ACTION")]
    actions: Vec<Action>,

    /// Prints the board after every action.
    #[arg(long)]
    frames: bool,

    /// Number of replaced grids retained by the session.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_HISTORY_CAPACITY)]
    history: usize,

    /// Projectiles available at level start.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_PROJECTILE_STOCK)]
    projectiles: u32,

    /// Prints a snapshot string of the final board.
    #[arg(long)]
    export: bool,
}

/// Entry point for the Quantum Loop command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();
    let level = load_level(&args)?;
    let config = SessionConfig::new(args.seed)
        .with_history_capacity(args.history)
        .with_projectile_stock(args.projectiles);
    let mut session = Session::start(&level, config)
        .with_context(|| format!("level {} is not playable", level.number))?;

    info!(
        "level {}: {} (par {}, {}s on the clock)",
        query::level_number(&session),
        query::description(&session),
        query::par(&session),
        query::time_limit(&session).as_secs()
    );
    if args.frames {
        print!("{}", frame::render(&session));
    }

    let mut events = Vec::new();
    for action in &args.actions {
        for command in action.commands() {
            events.clear();
            world::apply(&mut session, command, &mut events);
            for event in &events {
                info!("{event:?}");
            }
        }
        if args.frames {
            println!();
            print!("{}", frame::render(&session));
        }
    }

    println!("{}", frame::summary(&session));
    if args.export {
        let snapshot = BoardSnapshot::new(query::level_snapshot(&session));
        println!("{}", snapshot.encode().context("failed to encode board snapshot")?);
    }
    Ok(())
}

fn load_level(args: &CliArgs) -> Result<LevelDefinition> {
    if let Some(path) = &args.level {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read level file {}", path.display()))?;
        return serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse level file {}", path.display()));
    }

    if let Some(number) = args.builtin {
        let level = catalogue::level(number).ok_or_else(|| {
            anyhow!(
                "there is no built-in level {number}, choose 1..={}",
                catalogue::len()
            )
        })?;
        return level.with_context(|| format!("built-in level {number} is malformed"));
    }

    if let Some(encoded) = &args.import {
        let snapshot = BoardSnapshot::decode(encoded).context("failed to import board snapshot")?;
        return Ok(snapshot.into_level());
    }

    Err(anyhow!("no level source was provided"))
}
