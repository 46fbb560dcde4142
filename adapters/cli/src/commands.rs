//! Subcommand implementations.

use std::fs;

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use clap::Args;
use dungeon_runner_core::{Command, Direction, Event, Level, Tile};
use dungeon_runner_level_io::{
    confine_resolved, open_level, require_suffix, safe_resolve, save_level, LEVEL_SUFFIX,
};
use dungeon_runner_rendering::{ascii_frame, Palette, Scene};
use dungeon_runner_system_generator::generate as generate_level;
use dungeon_runner_world::{apply, query, World};
use rand::Rng;

use crate::{config::AppConfig, report::RunReport};

const DEFAULT_WIDTH: u32 = 41;
const DEFAULT_HEIGHT: u32 = 31;

const DEMO_LEVEL: [&str; 4] = ["##########", "#S......E#", "#........#", "##########"];
const DEMO_LEVEL_NAME: &str = "fallback_demo";

/// Arguments of `generate`.
#[derive(Debug, Args)]
pub(crate) struct GenerateArgs {
    /// Seed driving the generator.
    #[arg(long)]
    seed: u64,
    /// Level width in tiles.
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: u32,
    /// Level height in tiles.
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: u32,
    /// Save the level under the levels directory with this `.json` name.
    #[arg(long, value_name = "NAME.json")]
    out: Option<String>,
}

/// Arguments naming a level inside the levels directory.
#[derive(Debug, Args)]
pub(crate) struct LevelArgs {
    /// Level file, relative to the levels directory.
    level: String,
}

/// Arguments of `simulate`.
#[derive(Debug, Args)]
pub(crate) struct SimulateArgs {
    /// Level file, relative to the levels directory.
    #[arg(long, conflicts_with = "seed")]
    level: Option<String>,
    /// Generate the level from this seed instead of loading one.
    #[arg(long)]
    seed: Option<u64>,
    /// Width of a generated level.
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: u32,
    /// Height of a generated level.
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: u32,
    /// One step per tick: U/D/L/R or N/S/W/E to move, `.` to wait.
    #[arg(long, default_value = "")]
    moves: String,
    /// Seed for enemy placement and movement; random when omitted.
    #[arg(long)]
    enemy_seed: Option<u64>,
}

/// Generates a level, prints it, and optionally saves it.
pub(crate) fn generate(config: &AppConfig, args: &GenerateArgs) -> Result<()> {
    let level = generate_level(args.seed, args.width, args.height).with_context(|| {
        format!(
            "failed to generate a {}x{} level from seed {}",
            args.width, args.height, args.seed
        )
    })?;
    log::info!(
        "generated '{}' ({}x{})",
        level.name(),
        level.width(),
        level.height()
    );
    print_rows(&level.grid().to_ascii());

    if let Some(out) = &args.out {
        let path = safe_resolve(&config.levels_dir, out)?;
        let _ = require_suffix(&path, LEVEL_SUFFIX)?;
        confine_resolved(&config.levels_dir, &path)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        save_level(&level, &path)?;
        log::info!("level saved: {}", path.display());
        println!("saved {}", path.display());
    }
    Ok(())
}

/// Loads a level and prints a short summary.
pub(crate) fn validate(config: &AppConfig, args: &LevelArgs) -> Result<()> {
    let level = load(config, &args.level)?;
    println!("{}", summary(&level));
    Ok(())
}

/// Loads a level and prints it as ASCII.
pub(crate) fn show(config: &AppConfig, args: &LevelArgs) -> Result<()> {
    let level = load(config, &args.level)?;
    print_rows(&level.grid().to_ascii());
    Ok(())
}

/// Runs a scripted headless session and writes its run report.
pub(crate) fn simulate(config: &AppConfig, args: &SimulateArgs) -> Result<()> {
    let steps = parse_script(&args.moves)?;
    let (level, level_source) = match (&args.level, args.seed) {
        (Some(name), _) => {
            let source = config.levels_dir.join(name).display().to_string();
            (load(config, name)?, source)
        }
        (None, Some(seed)) => {
            let level = generate_level(seed, args.width, args.height)
                .with_context(|| format!("failed to generate level from seed {seed}"))?;
            let source = format!("generated:{}", level.name());
            (level, source)
        }
        (None, None) => {
            let level = Level::from_ascii(DEMO_LEVEL, DEMO_LEVEL_NAME)
                .context("built-in demo level is invalid")?;
            (level, format!("ascii:{DEMO_LEVEL_NAME}"))
        }
    };
    log::info!(
        "level loaded: {} ({}x{})",
        level.name(),
        level.width(),
        level.height()
    );

    let mut rng = rand::thread_rng();
    let enemy_seed = args.enemy_seed.unwrap_or_else(|| u64::from(rng.gen::<u32>()));
    let mut world = World::new(level, config.world_config(), enemy_seed);
    log::info!("player spawned at {}", query::player(&world));

    let scene = Scene::from_world(&world, &Palette::default(), config.viewport());
    log::debug!(
        "render params: tile_size={} offset={} quads={}",
        scene.params().tile_size(),
        scene.params().offset(),
        scene.quads().len()
    );

    let tick = config.tick();
    let mut events = Vec::new();
    for step in steps {
        if query::state(&world).is_final() {
            break;
        }
        if let Step::Move(direction) = step {
            apply(&mut world, Command::MovePlayer { direction }, &mut events);
        }
        apply(&mut world, Command::Tick { dt: tick }, &mut events);
        log_events(&mut events);
    }
    while !query::state(&world).is_final() {
        apply(&mut world, Command::Tick { dt: tick }, &mut events);
        log_events(&mut events);
    }

    print_rows(&ascii_frame(&world));
    let state = query::state(&world);
    let elapsed = query::elapsed(&world);
    println!("result: {} in {:.2}s", state.label(), elapsed.as_secs_f64());

    let report = RunReport::new(
        &mut rng,
        Local::now(),
        enemy_seed,
        elapsed,
        state,
        level_source,
    );
    let path = report.write(&config.reports_dir)?;
    log::info!("run report saved: {}", path.display());
    println!("report {}", path.display());
    Ok(())
}

/// A single scripted step of a simulated session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Move(Direction),
    Wait,
}

fn parse_script(script: &str) -> Result<Vec<Step>> {
    script
        .chars()
        .filter(|c| !c.is_whitespace())
        .enumerate()
        .map(|(index, c)| match c.to_ascii_uppercase() {
            'U' | 'N' => Ok(Step::Move(Direction::North)),
            'D' | 'S' => Ok(Step::Move(Direction::South)),
            'L' | 'W' => Ok(Step::Move(Direction::West)),
            'R' | 'E' => Ok(Step::Move(Direction::East)),
            '.' => Ok(Step::Wait),
            _ => Err(anyhow!("unknown move '{c}' at position {index}")),
        })
        .collect()
}

fn load(config: &AppConfig, name: &str) -> Result<Level> {
    let level = open_level(&config.levels_dir, name)
        .with_context(|| format!("failed to load level {name}"))?;
    log::debug!("level '{}' validated", level.name());
    Ok(level)
}

fn summary(level: &Level) -> String {
    let position = |tile: Tile| {
        level
            .find_first(tile)
            .map_or_else(|| "-".to_owned(), |pos| pos.to_string())
    };
    format!(
        "ok: '{}' {}x{} start {} exit {} enemies {}",
        level.name(),
        level.width(),
        level.height(),
        position(Tile::Start),
        position(Tile::Exit),
        level.enemies().len()
    )
}

fn log_events(events: &mut Vec<Event>) {
    for event in events.drain(..) {
        log::debug!("{event:?}");
    }
}

fn print_rows(rows: &[String]) {
    for row in rows {
        println!("{row}");
    }
}
