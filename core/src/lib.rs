#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Dungeon Runner engine.
//!
//! This crate owns the level data model: typed [`Tile`] values, the flat
//! rectangular [`Grid`], and the validated [`Level`] that generators and codecs
//! produce. It also defines the message surface that connects adapters with
//! the headless world. Adapters submit [`Command`] values, the world executes
//! them, and then reports the resulting [`Event`] values.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod grid;
mod level;

pub use grid::Grid;
pub use level::{Level, TileValue, DEFAULT_LEVEL_NAME};

/// Atomic cell classification of a level grid.
///
/// The discriminants are persisted by the level file format and must never be
/// renumbered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Tile {
    /// Open ground that entities may occupy.
    Floor = 0,
    /// Solid rock that blocks every entity.
    Wall = 1,
    /// Tile where the player enters the level.
    Start = 2,
    /// Tile the player must reach to win.
    Exit = 3,
}

impl Tile {
    /// Every tile variant in code order.
    pub const ALL: [Tile; 4] = [Tile::Floor, Tile::Wall, Tile::Start, Tile::Exit];

    /// Stable integer code used by the level file format.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Looks up the tile stored under the provided integer code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Floor),
            1 => Some(Self::Wall),
            2 => Some(Self::Start),
            3 => Some(Self::Exit),
            _ => None,
        }
    }

    /// Reports whether entities may stand on the tile.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        !matches!(self, Self::Wall)
    }

    /// Character used by the ASCII legend.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Floor => '.',
            Self::Wall => '#',
            Self::Start => 'S',
            Self::Exit => 'E',
        }
    }

    /// Parses a character of the ASCII legend.
    #[must_use]
    pub const fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '.' => Some(Self::Floor),
            '#' => Some(Self::Wall),
            'S' => Some(Self::Start),
            'E' => Some(Self::Exit),
            _ => None,
        }
    }
}

impl From<Tile> for u8 {
    fn from(tile: Tile) -> Self {
        tile.code()
    }
}

impl TryFrom<u8> for Tile {
    type Error = TileCodeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Tile::from_code(code).ok_or(TileCodeError { code: code.into() })
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Floor => "FLOOR",
            Self::Wall => "WALL",
            Self::Start => "START",
            Self::Exit => "EXIT",
        };
        write!(f, "{name}")
    }
}

/// Integer value that does not name any [`Tile`].
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("{code} is not a valid tile code")]
pub struct TileCodeError {
    /// The rejected value.
    pub code: i64,
}

/// Location of a single tile expressed as signed column and row coordinates.
///
/// `x` grows to the right and `y` grows downward; `(0, 0)` is the top-left
/// tile. Coordinates are signed so that neighbours of edge tiles can be
/// expressed and rejected by bounds checks.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TilePos {
    x: i32,
    y: i32,
}

impl TilePos {
    /// Creates a new tile position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column of the tile.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the tile.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Position displaced by the provided deltas, saturating at the `i32` range.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Neighbouring position one tile away in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy)
    }

    /// Computes the Manhattan distance between two positions.
    #[must_use]
    pub fn manhattan_distance(self, other: TilePos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl From<(i32, i32)> for TilePos {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for TilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Cardinal movement directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// The four cardinal directions in a fixed order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Unit `(dx, dy)` displacement of a single step.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Direction whose unit delta equals `(dx, dy)`, if any.
    #[must_use]
    pub const fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        match (dx, dy) {
            (0, -1) => Some(Self::North),
            (1, 0) => Some(Self::East),
            (0, 1) => Some(Self::South),
            (-1, 0) => Some(Self::West),
            _ => None,
        }
    }
}

/// Reasons an in-memory grid or level failed validation.
///
/// Construction never returns a partially built value alongside these errors.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StructuralError {
    /// The grid contained no rows, or its first row contained no tiles.
    #[error("level grid is empty")]
    EmptyGrid,
    /// A row's length differed from the first row's length.
    #[error("non-rectangular grid: row 0 width={expected}, row {row} width={found}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// A flat tile buffer did not match the declared dimensions.
    #[error("tile buffer of length {len} does not match {width}x{height}")]
    DimensionMismatch {
        /// Declared column count.
        width: u32,
        /// Declared row count.
        height: u32,
        /// Length of the supplied buffer.
        len: usize,
    },
    /// A value did not name a tile.
    #[error("invalid tile at {position}: {code}")]
    InvalidTileCode {
        /// Location of the rejected value.
        position: TilePos,
        /// The rejected value.
        code: i64,
    },
    /// An enemy spawn lies outside the grid.
    #[error("enemy out of bounds: {position}")]
    EnemyOutOfBounds {
        /// Rejected spawn position.
        position: TilePos,
    },
    /// An enemy spawn lies on a wall.
    #[error("enemy on non-walkable tile at {position}")]
    EnemyOnWall {
        /// Rejected spawn position.
        position: TilePos,
    },
    /// An enemy spawn lies on the start tile.
    #[error("enemy cannot spawn on START tile at {position}")]
    EnemyOnStart {
        /// Rejected spawn position.
        position: TilePos,
    },
}

/// A character outside the ASCII legend.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("unknown char '{character}' at {position}")]
pub struct ParseError {
    /// The offending character.
    pub character: char,
    /// Column and row of the character, counting skipped blank lines.
    pub position: TilePos,
}

/// Failure to build a [`Level`] from ASCII art.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    /// The art used a character outside the legend.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The parsed grid failed structural validation.
    #[error(transparent)]
    Structural(#[from] StructuralError),
}

/// Direct coordinate indexing outside the grid.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("out of bounds: {position}")]
pub struct OutOfBounds {
    /// The rejected position.
    pub position: TilePos,
}

/// Identifier assigned to an enemy within a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// High-level state of a game session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    /// The session accepts input and advances time.
    Running,
    /// The player reached the exit.
    Won,
    /// The player was caught or ran out of time.
    Lost,
    /// The session was abandoned before an outcome.
    Aborted,
}

impl GameState {
    /// Reports whether the session reached a final state.
    #[must_use]
    pub const fn is_final(self) -> bool {
        !matches!(self, Self::Running)
    }

    /// Upper-case label used in logs and run reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Won => "WON",
            Self::Lost => "LOST",
            Self::Aborted => "ABORTED",
        }
    }
}

/// Reason a session reached its final state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The player stepped onto the exit.
    ExitReached,
    /// An enemy shared a tile with the player.
    EnemyCollision,
    /// The session ran past its time limit.
    TimeLimit,
    /// The session was aborted externally.
    Aborted,
}

impl Outcome {
    /// Game state entered when the outcome is reached.
    #[must_use]
    pub const fn state(self) -> GameState {
        match self {
            Self::ExitReached => GameState::Won,
            Self::EnemyCollision | Self::TimeLimit => GameState::Lost,
            Self::Aborted => GameState::Aborted,
        }
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Requests that the player advance a single tile in the specified direction.
    MovePlayer {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Ends a running session without an outcome.
    Abort,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the player moved between two tiles.
    PlayerMoved {
        /// Tile the player occupied before moving.
        from: TilePos,
        /// Tile the player occupies after moving.
        to: TilePos,
    },
    /// Reports that a requested player step was blocked.
    PlayerBlocked {
        /// Tile the player remains on.
        at: TilePos,
        /// Direction that was blocked.
        direction: Direction,
    },
    /// Confirms that an enemy moved between two tiles during a tick.
    EnemyMoved {
        /// Identifier of the enemy that advanced.
        enemy: EnemyId,
        /// Tile the enemy occupied before the tick.
        from: TilePos,
        /// Tile the enemy occupies after the tick.
        to: TilePos,
    },
    /// Announces that the session reached a final state.
    OutcomeReached {
        /// Reason the session ended.
        outcome: Outcome,
        /// Simulated time elapsed when the outcome was reached.
        elapsed: Duration,
    },
}
