#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level persistence for Dungeon Runner.
//!
//! Levels are stored as version 1 JSON documents:
//!
//! ```json
//! { "version": 1, "name": "demo", "grid": [[1, 1, 1], [1, 2, 1], [1, 3, 1]] }
//! ```
//!
//! The [`codec`] converts between text and [`Level`] values, [`files`] adds
//! the file system boundary, and [`paths`] guards user-supplied paths.
//!
//! [`Level`]: dungeon_runner_core::Level

pub mod codec;
pub mod files;
pub mod paths;

pub use codec::{decode, decode_named, encode, DecodeError, SchemaError, FORMAT_VERSION};
pub use files::{load_level, open_level, save_level, LevelIoError};
pub use paths::{confine_resolved, require_suffix, safe_resolve, PathError, LEVEL_SUFFIX};
