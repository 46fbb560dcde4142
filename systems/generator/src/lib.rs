#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic rooms-and-corridors level generator.
//!
//! The generator scatters non-overlapping rectangular rooms over a board of
//! walls, links them with L-shaped corridors in a stable order, and stamps a
//! single start and exit tile. Every random draw comes from one explicitly
//! passed stream, so the same seed and dimensions always yield the same grid.

use dungeon_runner_core::{Grid, Level, StructuralError, Tile, TilePos};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Smallest board width the generator accepts.
pub const MIN_WIDTH: u32 = 15;
/// Smallest board height the generator accepts.
pub const MIN_HEIGHT: u32 = 11;

/// Reasons generation can fail.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GenerateError {
    /// The requested board is smaller than [`MIN_WIDTH`] x [`MIN_HEIGHT`].
    #[error(
        "{width}x{height} is too small for the rooms and corridors generator (min {MIN_WIDTH}x{MIN_HEIGHT})"
    )]
    InvalidDimensions {
        /// Requested column count.
        width: u32,
        /// Requested row count.
        height: u32,
    },
    /// The carved grid failed level validation.
    #[error("generated grid is invalid: {0}")]
    Structural(#[from] StructuralError),
}

/// Tuning knobs for room placement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Number of candidate rooms drawn before corridors are carved.
    pub room_attempts: u32,
    /// Smallest room edge length; values below two are raised to two.
    pub min_room_size: u32,
    /// Largest room edge length before clamping to the board.
    pub max_room_size: u32,
    /// Wall tiles that must separate accepted rooms.
    pub padding: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            room_attempts: 80,
            min_room_size: 4,
            max_room_size: 10,
            padding: 1,
        }
    }
}

/// Generates a level with the default configuration.
///
/// Equivalent to `Generator::default().generate(seed, width, height)`.
pub fn generate(seed: u64, width: u32, height: u32) -> Result<Level, GenerateError> {
    Generator::default().generate(seed, width, height)
}

/// Rooms-and-corridors generator.
#[derive(Clone, Debug, Default)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    /// Creates a generator with the provided tuning.
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Tuning in use.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates a level from a seed; the level is named `generated_seed_<seed>`.
    pub fn generate(&self, seed: u64, width: u32, height: u32) -> Result<Level, GenerateError> {
        validate_dimensions(width, height)?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.generate_with_rng(&mut rng, width, height, format!("generated_seed_{seed}"))
    }

    /// Generates a level drawing every random value from `rng`.
    ///
    /// Dimensions are validated before the stream is touched.
    pub fn generate_with_rng<R>(
        &self,
        rng: &mut R,
        width: u32,
        height: u32,
        name: impl Into<String>,
    ) -> Result<Level, GenerateError>
    where
        R: Rng + ?Sized,
    {
        validate_dimensions(width, height)?;
        let name = name.into();

        let mut canvas = Canvas::new(width, height);
        let rooms = self.place_rooms(rng, &mut canvas);

        let (start, exit) = if rooms.is_empty() {
            canvas.carve_fallback()
        } else {
            connect_rooms(rng, &mut canvas, rooms.clone())
        };

        canvas.set(start, Tile::Start);
        canvas.set(exit, Tile::Exit);

        log::debug!(
            "generated {name} ({width}x{height}): {} rooms, start {start}, exit {exit}",
            rooms.len()
        );

        let grid = canvas.into_grid()?;
        Ok(Level::new(grid, name, [])?)
    }

    fn place_rooms<R>(&self, rng: &mut R, canvas: &mut Canvas) -> Vec<Rect>
    where
        R: Rng + ?Sized,
    {
        let min_size = self.config.min_room_size.max(2);
        let max_width = self.config.max_room_size.min(canvas.width - 3);
        let max_height = self.config.max_room_size.min(canvas.height - 3);
        if min_size > max_width || min_size > max_height {
            return Vec::new();
        }

        let mut rooms: Vec<Rect> = Vec::new();
        for _ in 0..self.config.room_attempts {
            let w = rng.gen_range(min_size..=max_width);
            let h = rng.gen_range(min_size..=max_height);
            let x = rng.gen_range(1..=canvas.width - w - 2);
            let y = rng.gen_range(1..=canvas.height - h - 2);
            let candidate = Rect::new(x, y, w, h);

            if rooms
                .iter()
                .any(|room| candidate.intersects(room, self.config.padding))
            {
                continue;
            }

            canvas.carve_room(candidate);
            rooms.push(candidate);
        }
        rooms
    }
}

fn validate_dimensions(width: u32, height: u32) -> Result<(), GenerateError> {
    if width < MIN_WIDTH || height < MIN_HEIGHT {
        return Err(GenerateError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// Links rooms in centre order and returns the start and exit positions.
fn connect_rooms<R>(rng: &mut R, canvas: &mut Canvas, mut rooms: Vec<Rect>) -> (TilePos, TilePos)
where
    R: Rng + ?Sized,
{
    rooms.sort_by_key(|room| {
        let center = room.center();
        (center.x(), center.y())
    });

    for pair in rooms.windows(2) {
        canvas.carve_corridor(rng, pair[0].center(), pair[1].center());
    }

    let first = rooms[0];
    let last = rooms[rooms.len() - 1];
    let start = first.center();
    let exit = if rooms.len() == 1 {
        // A lone room would put both markers on its centre.
        TilePos::new(last.x as i32, last.y as i32)
    } else {
        last.center()
    };
    (start, exit)
}

/// Axis-aligned room rectangle in tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rect {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Left column.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Top row.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Width in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.w
    }

    /// Height in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.h
    }

    /// Centre tile, rounding toward the bottom-right for even sizes.
    #[must_use]
    pub fn center(&self) -> TilePos {
        TilePos::new((self.x + self.w / 2) as i32, (self.y + self.h / 2) as i32)
    }

    /// Reports whether the rectangles come within `pad` tiles of each other.
    #[must_use]
    pub fn intersects(&self, other: &Rect, pad: u32) -> bool {
        let reach = |start: u32, len: u32| start.saturating_add(len).saturating_add(pad);
        !(reach(self.x, self.w) <= other.x
            || reach(other.x, other.w) <= self.x
            || reach(self.y, self.h) <= other.y
            || reach(other.y, other.h) <= self.y)
    }

    /// Reports whether the position lies inside the rectangle.
    #[must_use]
    pub fn contains(&self, pos: TilePos) -> bool {
        let (Ok(x), Ok(y)) = (u32::try_from(pos.x()), u32::try_from(pos.y())) else {
            return false;
        };
        x >= self.x
            && x < self.x.saturating_add(self.w)
            && y >= self.y
            && y < self.y.saturating_add(self.h)
    }
}

/// Mutable tile buffer used while carving.
#[derive(Debug)]
struct Canvas {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            tiles: vec![Tile::Wall; len],
        }
    }

    fn set(&mut self, pos: TilePos, tile: Tile) {
        let (Ok(x), Ok(y)) = (usize::try_from(pos.x()), usize::try_from(pos.y())) else {
            return;
        };
        let width = self.width as usize;
        if x < width && y < self.height as usize {
            self.tiles[y * width + x] = tile;
        }
    }

    fn carve_room(&mut self, room: Rect) {
        for y in room.y..room.y + room.h {
            for x in room.x..room.x + room.w {
                self.set(TilePos::new(x as i32, y as i32), Tile::Floor);
            }
        }
    }

    fn carve_corridor<R>(&mut self, rng: &mut R, a: TilePos, b: TilePos)
    where
        R: Rng + ?Sized,
    {
        if rng.gen_bool(0.5) {
            self.carve_horizontal(a.x(), b.x(), a.y());
            self.carve_vertical(a.y(), b.y(), b.x());
        } else {
            self.carve_vertical(a.y(), b.y(), a.x());
            self.carve_horizontal(a.x(), b.x(), b.y());
        }
    }

    fn carve_horizontal(&mut self, x1: i32, x2: i32, y: i32) {
        for x in x1.min(x2)..=x1.max(x2) {
            self.set(TilePos::new(x, y), Tile::Floor);
        }
    }

    fn carve_vertical(&mut self, y1: i32, y2: i32, x: i32) {
        for y in y1.min(y2)..=y1.max(y2) {
            self.set(TilePos::new(x, y), Tile::Floor);
        }
    }

    /// Carves a straight corridor across the middle row.
    fn carve_fallback(&mut self) -> (TilePos, TilePos) {
        let y = (self.height / 2) as i32;
        let right = self.width as i32 - 2;
        self.carve_horizontal(1, right, y);
        (TilePos::new(2, y), TilePos::new(self.width as i32 - 3, y))
    }

    fn into_grid(self) -> Result<Grid, StructuralError> {
        Grid::from_raw(self.width, self.height, self.tiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_rounds_down_from_origin() {
        assert_eq!(Rect::new(2, 3, 4, 5).center(), TilePos::new(4, 5));
        assert_eq!(Rect::new(1, 1, 5, 4).center(), TilePos::new(3, 3));
    }

    #[test]
    fn padded_intersection_rejects_touching_rooms() {
        let left = Rect::new(1, 1, 4, 4);
        let adjacent = Rect::new(5, 1, 4, 4);
        let separated = Rect::new(6, 1, 4, 4);

        assert!(!left.intersects(&adjacent, 0));
        assert!(left.intersects(&adjacent, 1));
        assert!(!left.intersects(&separated, 1));
        assert!(separated.intersects(&left, 2));
        assert!(left.intersects(&left, 0));
    }

    #[test]
    fn huge_padding_saturates_instead_of_overflowing() {
        let a = Rect::new(1, 1, 4, 4);
        let far = Rect::new(u32::MAX - 4, u32::MAX - 4, 4, 4);
        assert!(a.intersects(&far, u32::MAX));
        assert!(far.intersects(&a, u32::MAX));
        assert!(!a.intersects(&far, 0));
        assert!(!far.contains(TilePos::new(i32::MAX, i32::MAX)));
    }

    #[test]
    fn huge_padding_config_still_generates() {
        let generator = Generator::new(GeneratorConfig {
            padding: u32::MAX,
            ..GeneratorConfig::default()
        });
        let level = generator.generate(3, 41, 31).expect("level");
        assert_eq!(level.grid().count_of(Tile::Start), 1);
        assert_eq!(level.grid().count_of(Tile::Exit), 1);
    }

    #[test]
    fn contains_covers_room_interior() {
        let room = Rect::new(2, 2, 3, 3);
        assert!(room.contains(TilePos::new(2, 2)));
        assert!(room.contains(TilePos::new(4, 4)));
        assert!(!room.contains(TilePos::new(5, 4)));
        assert!(!room.contains(TilePos::new(-1, 2)));
    }

    #[test]
    fn dimensions_are_checked_before_drawing() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let untouched = rng.clone();
        let result = Generator::default().generate_with_rng(&mut rng, 14, 40, "small");
        assert_eq!(
            result,
            Err(GenerateError::InvalidDimensions {
                width: 14,
                height: 40
            })
        );
        assert_eq!(rng, untouched);
    }

    #[test]
    fn fallback_corridor_spans_middle_row() {
        let generator = Generator::new(GeneratorConfig {
            room_attempts: 0,
            ..GeneratorConfig::default()
        });
        let level = generator.generate(5, 20, 12).expect("fallback level");

        let y = 6;
        assert_eq!(level.tile_at(TilePos::new(2, y)), Ok(Tile::Start));
        assert_eq!(level.tile_at(TilePos::new(17, y)), Ok(Tile::Exit));
        assert_eq!(level.tile_at(TilePos::new(1, y)), Ok(Tile::Floor));
        assert_eq!(level.tile_at(TilePos::new(18, y)), Ok(Tile::Floor));
        assert_eq!(level.tile_at(TilePos::new(0, y)), Ok(Tile::Wall));
        assert_eq!(level.tile_at(TilePos::new(19, y)), Ok(Tile::Wall));

        let walkable = level
            .iter_tiles()
            .filter(|(_, tile)| tile.is_walkable())
            .count();
        assert_eq!(walkable, 18);
    }

    #[test]
    fn oversized_minimum_room_falls_back() {
        let generator = Generator::new(GeneratorConfig {
            min_room_size: 20,
            ..GeneratorConfig::default()
        });
        let level = generator.generate(1, 15, 11).expect("fallback level");
        assert_eq!(level.find_first(Tile::Start), Some(TilePos::new(2, 5)));
        assert_eq!(level.find_first(Tile::Exit), Some(TilePos::new(12, 5)));
    }

    #[test]
    fn single_room_keeps_start_and_exit_apart() {
        let generator = Generator::new(GeneratorConfig {
            room_attempts: 1,
            ..GeneratorConfig::default()
        });
        let level = generator.generate(11, 15, 11).expect("single room level");

        let starts: Vec<_> = level.positions_of(Tile::Start).collect();
        let exits: Vec<_> = level.positions_of(Tile::Exit).collect();
        assert_eq!(starts.len(), 1);
        assert_eq!(exits.len(), 1);
        assert_ne!(starts[0], exits[0]);
    }
}
