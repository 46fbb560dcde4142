#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Player movement over a level's walkability query.
//!
//! Blocked moves are a normal outcome reported as `false`; nothing in this
//! crate allocates or fails on the per-tick path.

use dungeon_runner_core::{Direction, Level, Tile, TilePos};

/// Attempts to move `position` by `(dx, dy)`.
///
/// Returns `false` without touching `position` when the delta is zero or the
/// target tile is not walkable; otherwise moves exactly onto the target.
pub fn try_move(level: &Level, position: &mut TilePos, dx: i32, dy: i32) -> bool {
    if dx == 0 && dy == 0 {
        return false;
    }

    let target = position.offset(dx, dy);
    if !level.is_walkable(target) {
        return false;
    }

    *position = target;
    true
}

/// Spawn position for the player: the first start tile, or the origin.
#[must_use]
pub fn find_spawn(level: &Level) -> TilePos {
    level.find_first(Tile::Start).unwrap_or_default()
}

/// Player position in tile coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Player {
    position: TilePos,
}

impl Player {
    /// Creates a player standing at the provided position.
    #[must_use]
    pub const fn at(position: TilePos) -> Self {
        Self { position }
    }

    /// Creates a player standing on the level's spawn position.
    #[must_use]
    pub fn spawn(level: &Level) -> Self {
        Self::at(find_spawn(level))
    }

    /// Tile currently occupied by the player.
    #[must_use]
    pub const fn position(&self) -> TilePos {
        self.position
    }

    /// Attempts a single step in the provided direction.
    pub fn try_step(&mut self, level: &Level, direction: Direction) -> bool {
        let (dx, dy) = direction.delta();
        try_move(level, &mut self.position, dx, dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> Level {
        Level::from_ascii(["#####", "#S.E#", "#####"], "corridor").expect("valid level")
    }

    #[test]
    fn spawn_prefers_start_tile() {
        assert_eq!(find_spawn(&corridor()), TilePos::new(1, 1));
    }

    #[test]
    fn spawn_falls_back_to_origin() {
        let level = Level::from_ascii(["...", ".E."], "no start").expect("valid level");
        assert_eq!(find_spawn(&level), TilePos::new(0, 0));
    }

    #[test]
    fn player_steps_until_blocked() {
        let level = corridor();
        let mut player = Player::spawn(&level);

        assert!(player.try_step(&level, Direction::East));
        assert!(player.try_step(&level, Direction::East));
        assert_eq!(player.position(), TilePos::new(3, 1));
        assert!(!player.try_step(&level, Direction::East));
        assert!(!player.try_step(&level, Direction::North));
        assert_eq!(player.position(), TilePos::new(3, 1));
    }
}
