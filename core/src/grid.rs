//! Flat rectangular tile storage.

use crate::{OutOfBounds, StructuralError, Tile, TilePos};

/// Rectangular, non-empty grid of tiles stored row-major in a single buffer.
///
/// Width and height are derived from the buffer at construction, so every
/// row has the same length by construction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Builds a grid from a row-major tile buffer.
    pub fn from_raw(width: u32, height: u32, tiles: Vec<Tile>) -> Result<Self, StructuralError> {
        if width == 0 || height == 0 {
            return Err(StructuralError::EmptyGrid);
        }

        let expected = usize::try_from(u64::from(width) * u64::from(height)).ok();
        if expected != Some(tiles.len()) {
            return Err(StructuralError::DimensionMismatch {
                width,
                height,
                len: tiles.len(),
            });
        }

        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    /// Builds a grid from nested rows, rejecting empty or ragged input.
    pub fn from_rows<R>(rows: R) -> Result<Self, StructuralError>
    where
        R: IntoIterator,
        R::Item: AsRef<[Tile]>,
    {
        let rows: Vec<R::Item> = rows.into_iter().collect();
        let (width, height) = check_shape(rows.iter().map(|row| row.as_ref().len()))?;
        let tiles: Vec<Tile> = rows
            .iter()
            .flat_map(|row| row.as_ref().iter().copied())
            .collect();
        Self::from_raw(width, height, tiles)
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the position lies inside the grid.
    #[must_use]
    pub fn in_bounds(&self, pos: TilePos) -> bool {
        self.index(pos).is_some()
    }

    /// Tile stored at the position.
    pub fn tile_at(&self, pos: TilePos) -> Result<Tile, OutOfBounds> {
        self.index(pos)
            .map(|index| self.tiles[index])
            .ok_or(OutOfBounds { position: pos })
    }

    /// Reports whether an entity may stand on the position.
    ///
    /// Positions outside the grid are never walkable; this query does not fail.
    #[must_use]
    pub fn is_walkable(&self, pos: TilePos) -> bool {
        self.index(pos)
            .map_or(false, |index| self.tiles[index].is_walkable())
    }

    /// Iterates every position holding `tile` in row-major order.
    pub fn positions_of(&self, tile: Tile) -> impl Iterator<Item = TilePos> + '_ {
        self.iter_tiles()
            .filter(move |(_, candidate)| *candidate == tile)
            .map(|(pos, _)| pos)
    }

    /// First position holding `tile` in row-major order.
    #[must_use]
    pub fn find_first(&self, tile: Tile) -> Option<TilePos> {
        self.positions_of(tile).next()
    }

    /// Number of positions holding `tile`.
    #[must_use]
    pub fn count_of(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|candidate| **candidate == tile).count()
    }

    /// Iterates every `(position, tile)` pair in row-major order.
    pub fn iter_tiles(&self) -> impl Iterator<Item = (TilePos, Tile)> + '_ {
        let width = self.width as usize;
        self.tiles.iter().enumerate().map(move |(index, tile)| {
            let x = (index % width) as i32;
            let y = (index / width) as i32;
            (TilePos::new(x, y), *tile)
        })
    }

    /// Iterates the rows as tile slices, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> + '_ {
        self.tiles.chunks_exact(self.width as usize)
    }

    /// Row-major tile buffer.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Renders the grid with the ASCII legend, one line per row.
    #[must_use]
    pub fn to_ascii(&self) -> Vec<String> {
        self.rows()
            .map(|row| row.iter().map(|tile| tile.glyph()).collect())
            .collect()
    }

    fn index(&self, pos: TilePos) -> Option<usize> {
        let x = u32::try_from(pos.x()).ok()?;
        let y = u32::try_from(pos.y()).ok()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        let row = usize::try_from(y).ok()?;
        let column = usize::try_from(x).ok()?;
        let width = usize::try_from(self.width).ok()?;
        Some(row * width + column)
    }
}

/// Validates row lengths, returning the grid's `(width, height)`.
///
/// The grid must have at least one row, a non-empty first row, and every row
/// as long as the first.
pub(crate) fn check_shape(
    row_lengths: impl IntoIterator<Item = usize>,
) -> Result<(u32, u32), StructuralError> {
    let mut lengths = row_lengths.into_iter();
    let width = match lengths.next() {
        Some(width) if width > 0 => width,
        _ => return Err(StructuralError::EmptyGrid),
    };
    let mut height = 1_usize;
    for (offset, found) in lengths.enumerate() {
        if found != width {
            return Err(StructuralError::RaggedRow {
                row: offset + 1,
                expected: width,
                found,
            });
        }
        height += 1;
    }

    // Oversized inputs saturate and then fail the buffer length check.
    let width = u32::try_from(width).unwrap_or(u32::MAX);
    let height = u32::try_from(height).unwrap_or(u32::MAX);
    Ok((width, height))
}
