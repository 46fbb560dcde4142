//! Crash reports written when a command fails.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    config::AppConfig,
    report::{make_run_id, TIMESTAMP_FORMAT},
};

/// Number of trailing log lines embedded in a crash report.
pub(crate) const LOG_TAIL_LINES: usize = 80;

/// Replacement for configuration values whose key looks sensitive.
const REDACTED: &str = "[REDACTED]";

/// Key fragments that mark a configuration value as sensitive.
const SENSITIVE_MARKERS: [&str; 5] = ["password", "secret", "token", "apikey", "key"];

/// Diagnostic snapshot of a failed command persisted as JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct CrashReport {
    /// Ten hex digit identifier of the failed run.
    pub(crate) run_id: String,
    /// Local time the report was created, `YYYYMMDD_HHMMSS_mmm`.
    pub(crate) timestamp: String,
    /// Random seed recorded for the run.
    pub(crate) seed: u64,
    /// Outermost error message.
    pub(crate) error_message: String,
    /// Innermost cause of the failure.
    pub(crate) root_cause: String,
    /// Full error chain, including a backtrace when one was captured.
    pub(crate) error_chain: String,
    /// Configuration with sensitive entries redacted.
    pub(crate) config: Value,
    /// Log file the tail was read from.
    pub(crate) log_file: Option<String>,
    /// Last lines of the log file, when it could be read.
    pub(crate) log_tail: Option<String>,
    /// Version of the binary that failed.
    pub(crate) version: Option<String>,
}

impl CrashReport {
    /// Captures `error` together with the configuration and the log tail.
    pub(crate) fn new<R: Rng + ?Sized>(
        rng: &mut R,
        now: DateTime<Local>,
        error: &anyhow::Error,
        config: &AppConfig,
    ) -> Self {
        let log_file = config.log_file();
        let snapshot = serde_json::to_value(config).unwrap_or(Value::Null);
        Self {
            run_id: make_run_id(rng),
            timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
            seed: u64::from(rng.gen::<u32>()),
            error_message: error.to_string(),
            root_cause: error.root_cause().to_string(),
            error_chain: format!("{error:?}"),
            config: sanitize(snapshot),
            log_file: Some(log_file.display().to_string()),
            log_tail: log_tail(&log_file, LOG_TAIL_LINES),
            version: Some(env!("CARGO_PKG_VERSION").to_owned()),
        }
    }

    /// File name of the report inside the reports directory.
    pub(crate) fn file_name(&self) -> String {
        format!("crash_{}_{}.json", self.timestamp, self.run_id)
    }

    /// Writes the report as pretty JSON into `reports_dir`, returning its path.
    pub(crate) fn write(&self, reports_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(reports_dir)
            .with_context(|| format!("failed to create {}", reports_dir.display()))?;
        let path = reports_dir.join(self.file_name());
        let json =
            serde_json::to_string_pretty(self).context("failed to serialize crash report")?;
        fs::write(&path, json)
            .with_context(|| format!("failed to write crash report {}", path.display()))?;
        Ok(path)
    }
}

/// Records a crash report for a failed command, logging where it went.
pub(crate) fn record(error: &anyhow::Error, config: &AppConfig) {
    let report = CrashReport::new(&mut rand::thread_rng(), Local::now(), error, config);
    match report.write(&config.reports_dir) {
        Ok(path) => log::error!("crash report saved: {}", path.display()),
        Err(write_error) => log::warn!("could not save crash report: {write_error:#}"),
    }
}

/// Replaces every object entry whose key contains a sensitive marker.
fn sanitize(value: Value) -> Value {
    match value {
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(key, value)| {
                    let value = if is_sensitive(&key) {
                        Value::String(REDACTED.to_owned())
                    } else {
                        sanitize(value)
                    };
                    (key, value)
                })
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize).collect()),
        other => other,
    }
}

fn is_sensitive(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_MARKERS.iter().any(|marker| key.contains(marker))
}

/// Last `max_lines` lines of a text file, or `None` when it cannot be read.
fn log_tail(path: &Path, max_lines: usize) -> Option<String> {
    let bytes = fs::read(path).ok()?;
    let text = String::from_utf8_lossy(&bytes);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    Some(lines[start..].join("\n"))
}
