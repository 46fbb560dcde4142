//! Application configuration loaded from `config.toml`.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use dungeon_runner_world::WorldConfig;
use glam::UVec2;
use serde::{Deserialize, Serialize};

/// Configuration file looked up in the working directory when none is given.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    paths: PathsSection,
    logging: LoggingSection,
    game: GameSection,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct PathsSection {
    levels_dir: PathBuf,
    reports_dir: PathBuf,
    logs_dir: PathBuf,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            levels_dir: PathBuf::from("levels"),
            reports_dir: PathBuf::from("reports"),
            logs_dir: PathBuf::from("logs"),
        }
    }
}

/// `[logging]` table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct LoggingSection {
    /// Level name for console output.
    pub(crate) console_level: String,
    /// Level name for the log file.
    pub(crate) file_level: String,
    /// Log file name inside the logs directory.
    pub(crate) file_name: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            console_level: "INFO".to_owned(),
            file_level: "DEBUG".to_owned(),
            file_name: "dungeon-runner.log".to_owned(),
        }
    }
}

/// `[game]` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct GameSection {
    /// Session time limit in seconds.
    pub(crate) time_limit_secs: u64,
    /// Simulated time advanced per scripted step.
    pub(crate) tick_millis: u64,
    /// Time between enemy steps.
    pub(crate) enemy_move_interval_millis: u64,
    /// Probability of an enemy turning on a step.
    pub(crate) enemy_change_chance: f64,
    /// Viewport width used for render parameters.
    pub(crate) viewport_width: u32,
    /// Viewport height used for render parameters.
    pub(crate) viewport_height: u32,
}

impl Default for GameSection {
    fn default() -> Self {
        Self {
            time_limit_secs: 60,
            tick_millis: 100,
            enemy_move_interval_millis: 350,
            enemy_change_chance: 0.25,
            viewport_width: 960,
            viewport_height: 540,
        }
    }
}

/// Fully resolved application configuration.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct AppConfig {
    /// File the configuration was read from, if any.
    pub(crate) source: Option<PathBuf>,
    /// Directory holding level files.
    pub(crate) levels_dir: PathBuf,
    /// Directory receiving run reports.
    pub(crate) reports_dir: PathBuf,
    /// Directory receiving the log file.
    pub(crate) logs_dir: PathBuf,
    /// Logging levels and file name.
    pub(crate) logging: LoggingSection,
    /// Session tuning.
    pub(crate) game: GameSection,
}

impl AppConfig {
    /// Loads the configuration.
    ///
    /// An explicit path must exist. Without one, `config.toml` in the working
    /// directory is used when present and built-in defaults otherwise.
    pub(crate) fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.is_file() {
                    bail!("missing config file: {}", path.display());
                }
                path.to_path_buf()
            }
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !path.is_file() {
                    return Ok(Self::from_file(ConfigFile::default(), Path::new(".")));
                }
                path
            }
        };

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let base_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut config = Self::from_toml(&contents, &base_dir)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        config.source = Some(path);
        Ok(config)
    }

    /// Parses configuration text, resolving directories against `base_dir`.
    pub(crate) fn from_toml(contents: &str, base_dir: &Path) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).context("failed to parse config toml contents")?;
        if !(0.0..=1.0).contains(&file.game.enemy_change_chance) {
            bail!(
                "enemy_change_chance must lie in 0.0..=1.0, got {}",
                file.game.enemy_change_chance
            );
        }
        Ok(Self::from_file(file, base_dir))
    }

    fn from_file(file: ConfigFile, base_dir: &Path) -> Self {
        Self {
            source: None,
            levels_dir: base_dir.join(file.paths.levels_dir),
            reports_dir: base_dir.join(file.paths.reports_dir),
            logs_dir: base_dir.join(file.paths.logs_dir),
            logging: file.logging,
            game: file.game,
        }
    }

    /// Creates the directories the application writes into.
    pub(crate) fn ensure_output_dirs(&self) -> Result<()> {
        for dir in [&self.logs_dir, &self.reports_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create directory {}", dir.display()))?;
        }
        Ok(())
    }

    /// Human-readable origin of the configuration.
    pub(crate) fn describe_source(&self) -> String {
        match &self.source {
            Some(path) => path.display().to_string(),
            None => "built-in defaults".to_owned(),
        }
    }

    /// Path of the log file.
    pub(crate) fn log_file(&self) -> PathBuf {
        self.logs_dir.join(&self.logging.file_name)
    }

    /// Simulated time advanced by each scripted step; never zero.
    pub(crate) fn tick(&self) -> Duration {
        Duration::from_millis(self.game.tick_millis.max(1))
    }

    /// Session parameters handed to the world.
    pub(crate) fn world_config(&self) -> WorldConfig {
        WorldConfig::new(
            Duration::from_secs(self.game.time_limit_secs),
            Duration::from_millis(self.game.enemy_move_interval_millis),
            self.game.enemy_change_chance,
        )
    }

    /// Viewport used for render parameters.
    pub(crate) fn viewport(&self) -> UVec2 {
        UVec2::new(self.game.viewport_width, self.game.viewport_height)
    }
}
