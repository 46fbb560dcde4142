//! Console and file logging.

use std::{fs::File, path::Path};

use anyhow::{Context as _, Result};
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};

use crate::config::LoggingSection;

/// Installs the global logger: the console on stderr plus an appending log file.
pub(crate) fn install(section: &LoggingSection, log_file: &Path, verbose: bool) -> Result<()> {
    let console_level = if verbose {
        LevelFilter::Debug
    } else {
        parse_level(&section.console_level, LevelFilter::Info)
    };
    let file_level = parse_level(&section.file_level, LevelFilter::Debug);

    let file = File::options()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("failed to open log file {}", log_file.display()))?;

    let config = ConfigBuilder::new()
        .set_target_level(LevelFilter::Off)
        .set_location_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build();

    let loggers: Vec<Box<dyn SharedLogger>> = vec![
        TermLogger::new(
            console_level,
            config.clone(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ),
        WriteLogger::new(file_level, config, file),
    ];
    CombinedLogger::init(loggers).context("failed to initialize logging")
}

/// Maps a configured level name onto a filter, falling back to `default` for
/// unknown names. `WARNING`, `CRITICAL` and `FATAL` are accepted as aliases.
fn parse_level(name: &str, default: LevelFilter) -> LevelFilter {
    let name = name.trim();
    let canonical = match name.to_ascii_uppercase().as_str() {
        "WARNING" => "WARN",
        "CRITICAL" | "FATAL" => "ERROR",
        _ => name,
    };
    canonical.parse().unwrap_or(default)
}
