//! Version 1 JSON level codec.

use dungeon_runner_core::{Level, StructuralError, Tile, DEFAULT_LEVEL_NAME};
use serde_json::{json, Map, Number, Value};
use thiserror::Error;

/// Level file format version understood by the codec.
pub const FORMAT_VERSION: i64 = 1;

/// Failure to turn text into a level.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The text is not JSON.
    #[error("malformed JSON: {0}")]
    Format(#[from] serde_json::Error),
    /// The document declares a version other than 1.
    #[error("unsupported level version {found}")]
    UnsupportedVersion {
        /// Declared version, as written in the document.
        found: Number,
    },
    /// The document is JSON but does not describe a playable level.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Structural violations of the level document schema.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// The top-level value is not an object.
    #[error("level document must be a JSON object")]
    NotAnObject,
    /// `version` is present but not a number.
    #[error("\"version\" must be a number")]
    InvalidVersion,
    /// `name` is present but not a string.
    #[error("\"name\" must be a string")]
    NameNotString,
    /// `grid` is absent.
    #[error("missing \"grid\"")]
    MissingGrid,
    /// `grid` is not an array.
    #[error("\"grid\" must be an array of rows")]
    GridNotArray,
    /// `grid` has no rows.
    #[error("\"grid\" must not be empty")]
    EmptyGrid,
    /// A grid row is not an array.
    #[error("grid row {row} must be an array")]
    RowNotArray {
        /// Index of the offending row.
        row: usize,
    },
    /// A grid cell is not an integer.
    #[error("grid cell at ({x},{y}) must be an integer")]
    CellNotInteger {
        /// Column of the offending cell.
        x: usize,
        /// Row of the offending cell.
        y: usize,
    },
    /// The grid failed structural validation.
    #[error("invalid grid: {0}")]
    InvalidGrid(#[source] StructuralError),
    /// The level does not contain exactly one tile of a required kind.
    #[error("expected exactly {expected} {tile} tile, found {found}")]
    TileCount {
        /// Tile kind being counted.
        tile: Tile,
        /// Required count.
        expected: usize,
        /// Count present in the grid.
        found: usize,
    },
}

/// Encodes a level as a pretty-printed version 1 document.
///
/// Enemy spawns are not persisted.
#[must_use]
pub fn encode(level: &Level) -> String {
    let grid: Vec<Vec<u8>> = level
        .grid()
        .rows()
        .map(|row| row.iter().map(|tile| tile.code()).collect())
        .collect();
    let document = json!({
        "version": FORMAT_VERSION,
        "name": level.name(),
        "grid": grid,
    });
    format!("{document:#}")
}

/// Decodes a version 1 document, naming unnamed levels `"unnamed"`.
pub fn decode(text: &str) -> Result<Level, DecodeError> {
    decode_named(text, DEFAULT_LEVEL_NAME)
}

/// Decodes a version 1 document, using `fallback_name` when `name` is absent.
pub fn decode_named(text: &str, fallback_name: &str) -> Result<Level, DecodeError> {
    let document: Value = serde_json::from_str(text)?;
    let Value::Object(fields) = document else {
        return Err(SchemaError::NotAnObject.into());
    };

    let version = read_version(&fields)?;
    // `1.0` names the same version as `1`.
    if version.as_f64() != Some(FORMAT_VERSION as f64) {
        return Err(DecodeError::UnsupportedVersion { found: version });
    }

    let name = match fields.get("name") {
        None => fallback_name,
        Some(Value::String(name)) => name.as_str(),
        Some(_) => return Err(SchemaError::NameNotString.into()),
    };

    let rows = read_grid(&fields)?;
    let level = Level::from_rows(rows, name, []).map_err(SchemaError::InvalidGrid)?;
    require_single(&level, Tile::Start)?;
    require_single(&level, Tile::Exit)?;
    Ok(level)
}

fn read_version(fields: &Map<String, Value>) -> Result<Number, SchemaError> {
    match fields.get("version") {
        None => Ok(Number::from(FORMAT_VERSION)),
        Some(Value::Number(number)) => Ok(number.clone()),
        Some(_) => Err(SchemaError::InvalidVersion),
    }
}

fn read_grid(fields: &Map<String, Value>) -> Result<Vec<Vec<i64>>, SchemaError> {
    let grid = fields.get("grid").ok_or(SchemaError::MissingGrid)?;
    let rows = grid.as_array().ok_or(SchemaError::GridNotArray)?;
    if rows.is_empty() {
        return Err(SchemaError::EmptyGrid);
    }

    rows.iter()
        .enumerate()
        .map(|(y, row)| -> Result<Vec<i64>, SchemaError> {
            let cells = row.as_array().ok_or(SchemaError::RowNotArray { row: y })?;
            cells
                .iter()
                .enumerate()
                .map(|(x, cell)| cell.as_i64().ok_or(SchemaError::CellNotInteger { x, y }))
                .collect()
        })
        .collect()
}

fn require_single(level: &Level, tile: Tile) -> Result<(), SchemaError> {
    let found = level.positions_of(tile).count();
    if found == 1 {
        return Ok(());
    }
    Err(SchemaError::TileCount {
        tile,
        expected: 1,
        found,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_runner_core::TilePos;

    const DEMO: &str = r#"{"version":1,"name":"demo","grid":[[1,1,1,1,1],[1,2,0,0,1],[1,0,1,0,1],[1,0,0,3,1],[1,1,1,1,1]]}"#;

    fn schema(text: &str) -> SchemaError {
        match decode(text) {
            Err(DecodeError::Schema(error)) => error,
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn decodes_valid_document() {
        let level = decode(DEMO).expect("valid level");
        assert_eq!(level.name(), "demo");
        assert_eq!(level.width(), 5);
        assert_eq!(level.height(), 5);
        assert_eq!(level.find_first(Tile::Start), Some(TilePos::new(1, 1)));
        assert_eq!(level.find_first(Tile::Exit), Some(TilePos::new(3, 3)));
    }

    #[test]
    fn missing_version_and_name_default() {
        let level = decode(r#"{"grid":[[2,0,3]]}"#).expect("valid level");
        assert_eq!(level.name(), DEFAULT_LEVEL_NAME);

        let named = decode_named(r#"{"grid":[[2,0,3]]}"#, "stem").expect("valid level");
        assert_eq!(named.name(), "stem");
    }

    #[test]
    fn encode_is_pretty_and_ordered() {
        let level = decode(DEMO).expect("valid level");
        let text = encode(&level);
        assert!(text.starts_with("{\n  \"version\": 1,\n  \"name\": \"demo\",\n  \"grid\""));

        let restored = decode(&text).expect("round trip");
        assert_eq!(restored, level);
    }

    #[test]
    fn rejects_unsupported_version() {
        for (text, declared) in [
            (r#"{"version":2,"grid":[[1]]}"#, "2"),
            (r#"{"version":1.5,"grid":[[1]]}"#, "1.5"),
            (r#"{"version":-1,"grid":[[1]]}"#, "-1"),
            (r#"{"version":1e30,"grid":[[1]]}"#, "1e30"),
        ] {
            match decode(text) {
                Err(DecodeError::UnsupportedVersion { found }) => {
                    assert_eq!(found.as_f64(), declared.parse::<f64>().ok(), "{text}");
                }
                other => panic!("expected unsupported version for {text}, got {other:?}"),
            }
        }
    }

    #[test]
    fn integral_float_version_is_version_one() {
        let level = decode(r#"{"version":1.0,"grid":[[2,0,3]]}"#).expect("version 1.0");
        assert_eq!(level.width(), 3);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(decode("{not valid json"), Err(DecodeError::Format(_))));
    }

    #[test]
    fn schema_errors_name_the_location() {
        assert_eq!(schema("[1, 2]"), SchemaError::NotAnObject);
        assert_eq!(schema(r#"{"version":"1","grid":[[2,3]]}"#), SchemaError::InvalidVersion);
        assert_eq!(schema(r#"{"name":7,"grid":[[2,3]]}"#), SchemaError::NameNotString);
        assert_eq!(schema(r#"{"version":1}"#), SchemaError::MissingGrid);
        assert_eq!(schema(r#"{"grid":{}}"#), SchemaError::GridNotArray);
        assert_eq!(schema(r#"{"grid":[]}"#), SchemaError::EmptyGrid);
        assert_eq!(schema(r#"{"grid":[[2,3],5]}"#), SchemaError::RowNotArray { row: 1 });
        assert_eq!(
            schema(r#"{"grid":[[2,3],[0,"1"]]}"#),
            SchemaError::CellNotInteger { x: 1, y: 1 }
        );
        assert_eq!(
            schema(r#"{"grid":[[2,3],[0]]}"#),
            SchemaError::InvalidGrid(StructuralError::RaggedRow {
                row: 1,
                expected: 2,
                found: 1,
            })
        );
        assert_eq!(
            schema(r#"{"grid":[[2,3],[0,9]]}"#),
            SchemaError::InvalidGrid(StructuralError::InvalidTileCode {
                position: TilePos::new(1, 1),
                code: 9,
            })
        );
        assert_eq!(schema(r#"{"grid":[[]]}"#), SchemaError::InvalidGrid(StructuralError::EmptyGrid));
    }

    #[test]
    fn requires_exactly_one_start_and_exit() {
        assert_eq!(
            schema(r#"{"grid":[[2,2,3]]}"#),
            SchemaError::TileCount {
                tile: Tile::Start,
                expected: 1,
                found: 2,
            }
        );
        assert_eq!(
            schema(r#"{"grid":[[0,1,3]]}"#),
            SchemaError::TileCount {
                tile: Tile::Start,
                expected: 1,
                found: 0,
            }
        );
        assert_eq!(
            schema(r#"{"grid":[[2,0,1]]}"#),
            SchemaError::TileCount {
                tile: Tile::Exit,
                expected: 1,
                found: 0,
            }
        );
        assert_eq!(
            schema(r#"{"grid":[[2,3,3]]}"#),
            SchemaError::TileCount {
                tile: Tile::Exit,
                expected: 1,
                found: 2,
            }
        );
    }
}
