#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Random-walk patrol enemies.
//!
//! Each [`Patrol`] owns its position, heading, step timer, and random stream.
//! Enemies never share a stream, so updating one enemy cannot perturb the
//! sequence another enemy observes.

use std::time::Duration;

use dungeon_runner_core::{Direction, Level, TilePos};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Default time an enemy waits between steps.
pub const DEFAULT_MOVE_INTERVAL: Duration = Duration::from_millis(350);
/// Default probability of picking a fresh heading on each step.
pub const DEFAULT_CHANGE_CHANCE: f64 = 0.25;

/// Configuration parameters required to construct a patrol.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    move_interval: Duration,
    change_chance: f64,
    rng_seed: u64,
    direction: Direction,
}

impl Config {
    /// Creates a configuration with the provided cadence, turn chance, and seed.
    ///
    /// A zero `move_interval` makes every update perform exactly one step.
    /// `change_chance` is clamped to `0.0..=1.0`; NaN counts as zero.
    #[must_use]
    pub fn new(move_interval: Duration, change_chance: f64, rng_seed: u64) -> Self {
        let change_chance = if change_chance.is_nan() {
            0.0
        } else {
            change_chance.clamp(0.0, 1.0)
        };
        Self {
            move_interval,
            change_chance,
            rng_seed,
            direction: Direction::East,
        }
    }

    /// Overrides the initial heading, which defaults to east.
    #[must_use]
    pub const fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Returns the same configuration with a different seed.
    #[must_use]
    pub const fn with_seed(mut self, rng_seed: u64) -> Self {
        self.rng_seed = rng_seed;
        self
    }

    /// Time between steps.
    #[must_use]
    pub const fn move_interval(&self) -> Duration {
        self.move_interval
    }

    /// Probability of choosing a new heading on each step.
    #[must_use]
    pub const fn change_chance(&self) -> f64 {
        self.change_chance
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_MOVE_INTERVAL, DEFAULT_CHANGE_CHANCE, 0)
    }
}

/// Enemy that wanders the level one tile at a time.
#[derive(Clone, Debug)]
pub struct Patrol {
    position: TilePos,
    direction: Direction,
    move_interval: Duration,
    change_chance: f64,
    accumulator: Duration,
    rng: ChaCha8Rng,
}

impl Patrol {
    /// Creates a patrol whose stream is seeded from the configuration.
    #[must_use]
    pub fn new(position: TilePos, config: Config) -> Self {
        Self::with_rng(position, config, ChaCha8Rng::seed_from_u64(config.rng_seed))
    }

    /// Creates a patrol drawing from a caller-supplied stream.
    #[must_use]
    pub fn with_rng(position: TilePos, config: Config, rng: ChaCha8Rng) -> Self {
        Self {
            position,
            direction: config.direction,
            move_interval: config.move_interval,
            change_chance: config.change_chance,
            accumulator: Duration::ZERO,
            rng,
        }
    }

    /// Tile currently occupied by the enemy.
    #[must_use]
    pub const fn position(&self) -> TilePos {
        self.position
    }

    /// Current heading.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Time accumulated toward the next step.
    #[must_use]
    pub const fn accumulated(&self) -> Duration {
        self.accumulator
    }

    /// Advances the step timer by `dt` and performs every step that came due.
    ///
    /// Returns the number of tiles the enemy actually moved.
    pub fn update(&mut self, dt: Duration, level: &Level) -> u32 {
        let steps = self.resolve_step_count(dt);
        let mut moved = 0;
        for _ in 0..steps {
            if self.step(level) {
                moved += 1;
            }
        }
        moved
    }

    fn resolve_step_count(&mut self, dt: Duration) -> u32 {
        if self.move_interval.is_zero() {
            return 1;
        }

        self.accumulator = self.accumulator.saturating_add(dt);
        let interval = self.move_interval.as_nanos();
        let pending = self.accumulator.as_nanos();
        let remainder = pending % interval;
        self.accumulator = duration_from_nanos(remainder);
        // Steps past u32::MAX are dropped rather than replayed.
        u32::try_from(pending / interval).unwrap_or(u32::MAX)
    }

    fn step(&mut self, level: &Level) -> bool {
        let wants_turn = self.rng.gen_bool(self.change_chance);
        let blocked = !level.is_walkable(self.position.step(self.direction));

        if wants_turn || blocked {
            let mut options = Direction::ALL;
            options.shuffle(&mut self.rng);
            let position = self.position;
            match options
                .into_iter()
                .find(|direction| level.is_walkable(position.step(*direction)))
            {
                Some(direction) => self.direction = direction,
                None => return false,
            }
        }

        let next = self.position.step(self.direction);
        if !level.is_walkable(next) {
            return false;
        }
        self.position = next;
        true
    }
}

/// Rebuilds a duration from a nanosecond count that came from a `Duration`.
fn duration_from_nanos(nanos: u128) -> Duration {
    const NANOS_PER_SEC: u128 = 1_000_000_000;
    let secs = u64::try_from(nanos / NANOS_PER_SEC).unwrap_or(u64::MAX);
    // The remainder is below one billion and always fits.
    let subsec = (nanos % NANOS_PER_SEC) as u32;
    Duration::new(secs, subsec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_interval_always_steps_once() {
        let mut patrol = Patrol::new(TilePos::new(0, 0), Config::new(Duration::ZERO, 0.0, 1));
        assert_eq!(patrol.resolve_step_count(Duration::from_secs(10)), 1);
        assert_eq!(patrol.resolve_step_count(Duration::ZERO), 1);
        assert_eq!(patrol.accumulated(), Duration::ZERO);
    }

    #[test]
    fn large_dt_catches_up_in_whole_steps() {
        let mut patrol = Patrol::new(
            TilePos::new(0, 0),
            Config::new(Duration::from_millis(100), 0.0, 1),
        );
        assert_eq!(patrol.resolve_step_count(Duration::from_millis(350)), 3);
        assert_eq!(patrol.accumulated(), Duration::from_millis(50));
        assert_eq!(patrol.resolve_step_count(Duration::from_millis(49)), 0);
        assert_eq!(patrol.resolve_step_count(Duration::from_millis(1)), 1);
        assert_eq!(patrol.accumulated(), Duration::ZERO);
    }

    #[test]
    fn huge_backlog_resolves_without_spinning() {
        let mut patrol = Patrol::new(
            TilePos::new(0, 0),
            Config::new(Duration::from_nanos(1), 0.0, 1),
        );
        assert_eq!(patrol.resolve_step_count(Duration::from_secs(5)), u32::MAX);
        assert_eq!(patrol.accumulated(), Duration::ZERO);

        let mut patrol = Patrol::new(
            TilePos::new(0, 0),
            Config::new(Duration::from_nanos(3), 0.0, 1),
        );
        assert_eq!(patrol.resolve_step_count(Duration::from_nanos(10)), 3);
        assert_eq!(patrol.accumulated(), Duration::from_nanos(1));
    }

    #[test]
    fn remainder_keeps_whole_seconds() {
        let mut patrol = Patrol::new(
            TilePos::new(0, 0),
            Config::new(Duration::from_secs(4), 0.0, 1),
        );
        assert_eq!(patrol.resolve_step_count(Duration::from_millis(6_500)), 1);
        assert_eq!(patrol.accumulated(), Duration::from_millis(2_500));
    }

    #[test]
    fn change_chance_is_clamped() {
        assert_eq!(Config::new(Duration::ZERO, 3.0, 0).change_chance(), 1.0);
        assert_eq!(Config::new(Duration::ZERO, -1.0, 0).change_chance(), 0.0);
        assert_eq!(Config::new(Duration::ZERO, f64::NAN, 0).change_chance(), 0.0);
    }
}
