//! Guards for user-supplied file paths.

use std::{
    fs,
    path::{Component, Path, PathBuf},
};

use thiserror::Error;

/// File suffix required for level documents.
pub const LEVEL_SUFFIX: &str = ".json";

/// Rejected user-supplied path.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// The path resolves outside of its base directory.
    #[error("unsafe path: {}", path.display())]
    Escapes {
        /// Path as supplied by the user.
        path: PathBuf,
    },
    /// The path does not carry the required suffix.
    #[error("invalid file type: expected {expected}, got {found:?}")]
    WrongSuffix {
        /// Required suffix, including the leading dot.
        expected: String,
        /// Suffix found on the path, empty when there is none.
        found: String,
    },
}

/// Resolves `user_path` inside `base`.
///
/// Resolution is lexical: `.` and `..` components are collapsed without
/// touching the file system. The result must be `base` itself or lie below it.
pub fn safe_resolve(base: &Path, user_path: impl AsRef<Path>) -> Result<PathBuf, PathError> {
    let user_path = user_path.as_ref();
    let escapes = || PathError::Escapes {
        path: user_path.to_path_buf(),
    };
    let base = normalize(base);

    if user_path.has_root() {
        let candidate = normalize(user_path);
        if base.has_root() && candidate.starts_with(&base) {
            return Ok(candidate);
        }
        return Err(escapes());
    }

    let mut resolved = base;
    let mut depth = 0_usize;
    for component in user_path.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(part) => {
                resolved.push(part);
                depth += 1;
            }
            Component::ParentDir if depth > 0 => {
                let _ = resolved.pop();
                depth -= 1;
            }
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(escapes())
            }
        }
    }
    Ok(resolved)
}

/// Checks that `resolved` still lies inside `base` once symbolic links are
/// followed.
///
/// The deepest existing ancestor of `resolved` (the path itself when it
/// exists) is canonicalized and compared with the canonical `base`. When
/// `base` does not exist yet there is nothing a link could redirect, so the
/// check passes.
pub fn confine_resolved(base: &Path, resolved: &Path) -> Result<(), PathError> {
    let Ok(canonical_base) = fs::canonicalize(base) else {
        return Ok(());
    };
    let existing = resolved
        .ancestors()
        .filter(|ancestor| !ancestor.as_os_str().is_empty())
        .find_map(|ancestor| fs::canonicalize(ancestor).ok());
    match existing {
        Some(target) if !target.starts_with(&canonical_base) => Err(PathError::Escapes {
            path: resolved.to_path_buf(),
        }),
        _ => Ok(()),
    }
}

/// Requires `path` to end in `suffix`, compared case-insensitively.
pub fn require_suffix<'a>(path: &'a Path, suffix: &str) -> Result<&'a Path, PathError> {
    let found = path
        .extension()
        .map(|extension| format!(".{}", extension.to_string_lossy()))
        .unwrap_or_default();
    if found.eq_ignore_ascii_case(suffix) {
        return Ok(path);
    }
    Err(PathError::WrongSuffix {
        expected: suffix.to_owned(),
        found,
    })
}

fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last_is_normal =
                    matches!(normalized.components().next_back(), Some(Component::Normal(_)));
                if last_is_normal {
                    let _ = normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push(Component::ParentDir);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}
