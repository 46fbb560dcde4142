//! Run reports written when a simulated session ends.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use dungeon_runner_core::GameState;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// `strftime` layout of report timestamps, `YYYYMMDD_HHMMSS_mmm`.
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S_%3f";

/// Summary of a finished session persisted as JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct RunReport {
    /// Ten hex digit identifier of the run.
    pub(crate) run_id: String,
    /// Local time the report was created, `YYYYMMDD_HHMMSS_mmm`.
    pub(crate) timestamp: String,
    /// Seed that drove the session's enemies.
    pub(crate) seed: u64,
    /// Simulated session length.
    pub(crate) duration_seconds: f64,
    /// Final state label such as `WON`.
    pub(crate) result: String,
    /// Where the level came from.
    pub(crate) level_source: String,
    /// Score, unused by the current rules.
    pub(crate) score: Option<u32>,
    /// Version of the binary that produced the report.
    pub(crate) version: Option<String>,
}

impl RunReport {
    /// Creates a report stamped with `now` and a fresh run id.
    pub(crate) fn new<R: Rng + ?Sized>(
        rng: &mut R,
        now: DateTime<Local>,
        seed: u64,
        duration: Duration,
        result: GameState,
        level_source: impl Into<String>,
    ) -> Self {
        Self {
            run_id: make_run_id(rng),
            timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
            seed,
            duration_seconds: duration.as_secs_f64(),
            result: result.label().to_owned(),
            level_source: level_source.into(),
            score: None,
            version: Some(env!("CARGO_PKG_VERSION").to_owned()),
        }
    }

    /// File name of the report inside the reports directory.
    pub(crate) fn file_name(&self) -> String {
        format!("run_{}_{}.json", self.timestamp, self.run_id)
    }

    /// Writes the report as pretty JSON into `reports_dir`, returning its path.
    pub(crate) fn write(&self, reports_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(reports_dir)
            .with_context(|| format!("failed to create {}", reports_dir.display()))?;
        let path = reports_dir.join(self.file_name());
        let json = serde_json::to_string_pretty(self).context("failed to serialize run report")?;
        fs::write(&path, json)
            .with_context(|| format!("failed to write run report {}", path.display()))?;
        Ok(path)
    }
}

/// Ten lowercase hex digits identifying a run.
pub(crate) fn make_run_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{:010x}", rng.gen::<u64>() & 0xff_ffff_ffff)
}
