//! File system boundary for level documents.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use dungeon_runner_core::{Level, DEFAULT_LEVEL_NAME};
use thiserror::Error;

use crate::{
    codec::{decode_named, encode, DecodeError},
    paths::{confine_resolved, require_suffix, safe_resolve, PathError, LEVEL_SUFFIX},
};

/// Failure to load or store a level file.
#[derive(Debug, Error)]
pub enum LevelIoError {
    /// The level file does not exist.
    #[error("level file not found: {}", path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },
    /// Reading or writing the file failed.
    #[error("failed to access {}", path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The file content is not a valid level document.
    #[error("invalid level file {}", path.display())]
    Decode {
        /// File being decoded.
        path: PathBuf,
        /// Underlying decode failure.
        #[source]
        source: DecodeError,
    },
    /// The requested path was rejected.
    #[error(transparent)]
    Path(#[from] PathError),
}

/// Loads a level from a JSON file.
///
/// Documents without a `name` are named after the file stem.
pub fn load_level(path: &Path) -> Result<Level, LevelIoError> {
    let text = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            LevelIoError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            LevelIoError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_LEVEL_NAME.to_owned());
    let level = decode_named(&text, &stem).map_err(|source| LevelIoError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    log::debug!(
        "loaded level '{}' ({}x{}) from {}",
        level.name(),
        level.width(),
        level.height(),
        path.display()
    );
    Ok(level)
}

/// Writes a level to `path` as a pretty-printed version 1 document.
pub fn save_level(level: &Level, path: &Path) -> Result<(), LevelIoError> {
    fs::write(path, encode(level)).map_err(|source| LevelIoError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("saved level '{}' to {}", level.name(), path.display());
    Ok(())
}

/// Resolves a user-supplied level path inside `levels_dir` and loads it.
///
/// The path must stay inside the directory, also after following symbolic
/// links, and end in `.json`.
pub fn open_level(levels_dir: &Path, user_path: &str) -> Result<Level, LevelIoError> {
    let path = safe_resolve(levels_dir, user_path)?;
    let _ = require_suffix(&path, LEVEL_SUFFIX)?;
    confine_resolved(levels_dir, &path)?;
    load_level(&path)
}
