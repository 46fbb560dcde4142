//! Validated levels: a grid plus its name and enemy spawn points.

use crate::{
    grid::check_shape, Grid, LevelError, OutOfBounds, ParseError, StructuralError, Tile, TilePos,
};

/// Name given to levels constructed without one.
pub const DEFAULT_LEVEL_NAME: &str = "unnamed";

/// Value that can be converted into a [`Tile`] during level construction.
///
/// Implemented for [`Tile`] itself and for the integer types used to carry
/// tile codes.
pub trait TileValue: Copy {
    /// Converts the value, returning the rejected code on failure.
    fn to_tile(self) -> Result<Tile, i64>;
}

impl TileValue for Tile {
    fn to_tile(self) -> Result<Tile, i64> {
        Ok(self)
    }
}

macro_rules! impl_tile_value_for_integers {
    ($($integer:ty),*) => {
        $(
            impl TileValue for $integer {
                fn to_tile(self) -> Result<Tile, i64> {
                    let code = i64::try_from(self).unwrap_or(i64::MAX);
                    u8::try_from(code)
                        .ok()
                        .and_then(Tile::from_code)
                        .ok_or(code)
                }
            }
        )*
    };
}

impl_tile_value_for_integers!(u8, u16, u32, u64, i8, i16, i32, i64);

/// A single playable level.
///
/// Every `Level` satisfies its structural invariants: the grid is rectangular
/// and non-empty, and each enemy spawn is in bounds, walkable and not on the
/// start tile. The tile grid is never mutated after construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    grid: Grid,
    name: String,
    enemies: Vec<TilePos>,
}

impl Level {
    /// Wraps an already built grid, validating the enemy spawns.
    pub fn new(
        grid: Grid,
        name: impl Into<String>,
        enemies: impl IntoIterator<Item = TilePos>,
    ) -> Result<Self, StructuralError> {
        let enemies: Vec<TilePos> = enemies.into_iter().collect();
        for &position in &enemies {
            validate_enemy(&grid, position)?;
        }

        Ok(Self {
            grid,
            name: name.into(),
            enemies,
        })
    }

    /// Builds a level from rows of tiles or integer tile codes.
    ///
    /// Shape is validated before tile codes, and tile codes before enemies.
    pub fn from_rows<R, Row, V>(
        rows: R,
        name: impl Into<String>,
        enemies: impl IntoIterator<Item = TilePos>,
    ) -> Result<Self, StructuralError>
    where
        R: IntoIterator<Item = Row>,
        Row: IntoIterator<Item = V>,
        V: TileValue,
    {
        let raw: Vec<Vec<V>> = rows
            .into_iter()
            .map(|row| row.into_iter().collect())
            .collect();

        let (width, height) = check_shape(raw.iter().map(Vec::len))?;

        let mut tiles = Vec::with_capacity(raw.iter().map(Vec::len).sum());
        for (y, values) in raw.iter().enumerate() {
            for (x, value) in values.iter().enumerate() {
                let tile = value
                    .to_tile()
                    .map_err(|code| StructuralError::InvalidTileCode {
                        position: TilePos::new(x as i32, y as i32),
                        code,
                    })?;
                tiles.push(tile);
            }
        }

        let grid = Grid::from_raw(width, height, tiles)?;
        Self::new(grid, name, enemies)
    }

    /// Builds a level from ASCII art.
    ///
    /// Legend: `.` floor, `#` wall, `S` start, `E` exit. Blank lines are
    /// skipped; trailing line breaks are ignored.
    pub fn from_ascii<I, S>(lines: I, name: impl Into<String>) -> Result<Self, LevelError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rows: Vec<Vec<Tile>> = Vec::new();
        for (y, line) in lines.into_iter().enumerate() {
            let line = line.as_ref().trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                continue;
            }

            let mut row = Vec::with_capacity(line.len());
            for (x, character) in line.chars().enumerate() {
                let tile = Tile::from_glyph(character).ok_or(ParseError {
                    character,
                    position: TilePos::new(x as i32, y as i32),
                })?;
                row.push(tile);
            }
            rows.push(row);
        }

        let grid = Grid::from_rows(rows)?;
        Ok(Self::new(grid, name, [])?)
    }

    /// Returns a copy of the level with a different enemy spawn list.
    pub fn with_enemies(
        &self,
        enemies: impl IntoIterator<Item = TilePos>,
    ) -> Result<Self, StructuralError> {
        Self::new(self.grid.clone(), self.name.clone(), enemies)
    }

    /// Underlying tile grid.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Display name of the level.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enemy spawn positions in declaration order.
    #[must_use]
    pub fn enemies(&self) -> &[TilePos] {
        &self.enemies
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.grid.width()
    }

    /// Number of rows.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.grid.height()
    }

    /// See [`Grid::in_bounds`].
    #[must_use]
    pub fn in_bounds(&self, pos: TilePos) -> bool {
        self.grid.in_bounds(pos)
    }

    /// See [`Grid::tile_at`].
    pub fn tile_at(&self, pos: TilePos) -> Result<Tile, OutOfBounds> {
        self.grid.tile_at(pos)
    }

    /// See [`Grid::is_walkable`].
    #[must_use]
    pub fn is_walkable(&self, pos: TilePos) -> bool {
        self.grid.is_walkable(pos)
    }

    /// See [`Grid::positions_of`].
    pub fn positions_of(&self, tile: Tile) -> impl Iterator<Item = TilePos> + '_ {
        self.grid.positions_of(tile)
    }

    /// See [`Grid::find_first`].
    #[must_use]
    pub fn find_first(&self, tile: Tile) -> Option<TilePos> {
        self.grid.find_first(tile)
    }

    /// See [`Grid::iter_tiles`].
    pub fn iter_tiles(&self) -> impl Iterator<Item = (TilePos, Tile)> + '_ {
        self.grid.iter_tiles()
    }
}

fn validate_enemy(grid: &Grid, position: TilePos) -> Result<(), StructuralError> {
    match grid.tile_at(position) {
        Err(_) => Err(StructuralError::EnemyOutOfBounds { position }),
        Ok(Tile::Wall) => Err(StructuralError::EnemyOnWall { position }),
        Ok(Tile::Start) => Err(StructuralError::EnemyOnStart { position }),
        Ok(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEMO: [&str; 4] = ["##########", "#S......E#", "#........#", "##########"];

    #[test]
    fn ascii_demo_level_matches_layout() {
        let level = Level::from_ascii(DEMO, "demo").expect("demo parses");

        assert_eq!(level.width(), 10);
        assert_eq!(level.height(), 4);
        assert_eq!(level.name(), "demo");
        assert_eq!(
            level.positions_of(Tile::Start).collect::<Vec<_>>(),
            vec![TilePos::new(1, 1)]
        );
        assert_eq!(
            level.positions_of(Tile::Exit).collect::<Vec<_>>(),
            vec![TilePos::new(8, 1)]
        );
        assert!(level.is_walkable(TilePos::new(1, 1)));
        assert!(!level.is_walkable(TilePos::new(0, 0)));
        assert_eq!(level.grid().to_ascii(), DEMO.map(str::to_owned).to_vec());
    }

    #[test]
    fn ascii_unknown_character_reports_coordinate() {
        let error = Level::from_ascii(["###", "#x#"], "bad").expect_err("must fail");
        assert_eq!(
            error,
            LevelError::Parse(ParseError {
                character: 'x',
                position: TilePos::new(1, 1),
            })
        );
    }

    #[test]
    fn ascii_skips_blank_lines_and_rejects_ragged() {
        let level = Level::from_ascii(["", "S.E\n", ""], "blank").expect("parses");
        assert_eq!(level.height(), 1);

        let error = Level::from_ascii(["S.E", "#"], "ragged").expect_err("ragged");
        assert!(matches!(
            error,
            LevelError::Structural(StructuralError::RaggedRow { row: 1, .. })
        ));
    }

    #[test]
    fn rows_accept_integer_codes() {
        let level = Level::from_rows(
            vec![vec![1, 1, 1], vec![2, 0, 3]],
            "codes",
            [TilePos::new(1, 1)],
        )
        .expect("valid codes");
        assert_eq!(level.tile_at(TilePos::new(0, 1)), Ok(Tile::Start));
        assert_eq!(level.enemies(), &[TilePos::new(1, 1)]);
    }

    #[test]
    fn non_rectangular_rows_never_truncate() {
        let error = Level::from_rows(vec![vec![1, 1, 1], vec![2, 3]], "ragged", [])
            .expect_err("ragged rows");
        assert_eq!(
            error,
            StructuralError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2,
            }
        );
    }

    #[test]
    fn shape_is_checked_before_codes() {
        let error = Level::from_rows(vec![vec![9, 1], vec![1]], "order", [])
            .expect_err("ragged rows");
        assert!(matches!(error, StructuralError::RaggedRow { .. }));
    }

    #[test]
    fn invalid_codes_are_rejected() {
        let error =
            Level::from_rows(vec![vec![0_i64, -1]], "negative", []).expect_err("bad code");
        assert_eq!(
            error,
            StructuralError::InvalidTileCode {
                position: TilePos::new(1, 0),
                code: -1,
            }
        );
        assert!(Level::from_rows(vec![vec![4_u8]], "four", []).is_err());
    }

    #[test]
    fn empty_rows_are_rejected() {
        let no_rows: Vec<Vec<u8>> = Vec::new();
        assert_eq!(
            Level::from_rows(no_rows, "empty", []),
            Err(StructuralError::EmptyGrid)
        );
        assert_eq!(
            Level::from_rows(vec![Vec::<u8>::new()], "empty", []),
            Err(StructuralError::EmptyGrid)
        );
    }

    #[test]
    fn enemy_spawns_are_validated() {
        let rows = vec![vec![1, 1, 1, 1], vec![1, 2, 0, 3], vec![1, 1, 1, 1]];

        let out_of_bounds = TilePos::new(7, 1);
        assert_eq!(
            Level::from_rows(rows.clone(), "enemies", [out_of_bounds]),
            Err(StructuralError::EnemyOutOfBounds {
                position: out_of_bounds
            })
        );
        let wall = TilePos::new(0, 0);
        assert_eq!(
            Level::from_rows(rows.clone(), "enemies", [wall]),
            Err(StructuralError::EnemyOnWall { position: wall })
        );
        let start = TilePos::new(1, 1);
        assert_eq!(
            Level::from_rows(rows.clone(), "enemies", [start]),
            Err(StructuralError::EnemyOnStart { position: start })
        );

        let duplicated = [TilePos::new(2, 1), TilePos::new(2, 1), TilePos::new(3, 1)];
        let level = Level::from_rows(rows, "enemies", duplicated).expect("valid spawns");
        assert_eq!(level.enemies().len(), 3);
    }

    #[test]
    fn with_enemies_revalidates() {
        let level = Level::from_ascii(DEMO, "demo").expect("demo parses");
        assert!(level.with_enemies([TilePos::new(1, 1)]).is_err());
        let spawned = level
            .with_enemies([TilePos::new(4, 2)])
            .expect("floor spawn");
        assert_eq!(spawned.grid(), level.grid());
        assert_eq!(spawned.enemies(), &[TilePos::new(4, 2)]);
    }
}
