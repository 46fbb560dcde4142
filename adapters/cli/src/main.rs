#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for generating, inspecting and simulating Dungeon
//! Runner levels.

mod commands;
mod config;
mod crash;
mod logging;
mod report;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::{
    commands::{GenerateArgs, LevelArgs, SimulateArgs},
    config::AppConfig,
};

/// Command-line arguments accepted by the `dungeon-runner` binary.
#[derive(Debug, Parser)]
#[command(name = "dungeon-runner", version, about = "Dungeon Runner level tools")]
struct Cli {
    /// Configuration file; defaults to `config.toml` in the working directory.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log debug output to the console.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Generate a level from a seed and print it.
    Generate(GenerateArgs),
    /// Load a level from the levels directory and report whether it is valid.
    Validate(LevelArgs),
    /// Print a level from the levels directory as ASCII.
    Show(LevelArgs),
    /// Run a headless session and write a run report.
    Simulate(SimulateArgs),
}

/// Entry point for the Dungeon Runner command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    config.ensure_output_dirs()?;
    logging::install(&config.logging, &config.log_file(), cli.verbose)?;
    log::debug!(
        "dungeon-runner {} using {}",
        env!("CARGO_PKG_VERSION"),
        config.describe_source()
    );

    let outcome = match &cli.command {
        CliCommand::Generate(args) => commands::generate(&config, args),
        CliCommand::Validate(args) => commands::validate(&config, args),
        CliCommand::Show(args) => commands::show(&config, args),
        CliCommand::Simulate(args) => commands::simulate(&config, args),
    };
    if let Err(error) = &outcome {
        log::error!("{error:#}");
        crash::record(error, &config);
    }
    outcome
}
