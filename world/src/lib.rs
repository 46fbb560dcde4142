#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state for Dungeon Runner.
//!
//! The world owns a level, the player, the patrol enemies and the game state.
//! Adapters drive it exclusively through [`apply`] and observe it through the
//! [`query`] module.

use std::time::Duration;

use dungeon_runner_core::{Command, EnemyId, Event, GameState, Level, Outcome, Tile, TilePos};
use dungeon_runner_system_movement::Player;
use dungeon_runner_system_patrol::{self as patrol, Patrol};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Default wall-clock budget for a session.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(60);

/// Tunable parameters of a session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldConfig {
    time_limit: Duration,
    enemy_move_interval: Duration,
    enemy_change_chance: f64,
}

impl WorldConfig {
    /// Creates a configuration with the provided time limit and enemy cadence.
    #[must_use]
    pub const fn new(
        time_limit: Duration,
        enemy_move_interval: Duration,
        enemy_change_chance: f64,
    ) -> Self {
        Self {
            time_limit,
            enemy_move_interval,
            enemy_change_chance,
        }
    }

    /// Simulated time after which a running session is lost.
    #[must_use]
    pub const fn time_limit(&self) -> Duration {
        self.time_limit
    }

    /// Time between enemy steps.
    #[must_use]
    pub const fn enemy_move_interval(&self) -> Duration {
        self.enemy_move_interval
    }

    /// Probability that an enemy picks a new heading on a step.
    #[must_use]
    pub const fn enemy_change_chance(&self) -> f64 {
        self.enemy_change_chance
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_TIME_LIMIT,
            patrol::DEFAULT_MOVE_INTERVAL,
            patrol::DEFAULT_CHANGE_CHANCE,
        )
    }
}

#[derive(Clone, Debug)]
struct Enemy {
    id: EnemyId,
    patrol: Patrol,
}

/// Represents the authoritative Dungeon Runner session state.
#[derive(Clone, Debug)]
pub struct World {
    level: Level,
    player: Player,
    enemies: Vec<Enemy>,
    state: GameState,
    outcome: Option<Outcome>,
    elapsed: Duration,
    time_limit: Duration,
}

impl World {
    /// Creates a running session on the provided level.
    ///
    /// Enemies spawn on the level's enemy positions. A level without enemy
    /// spawns receives one enemy on a walkable tile other than the player's,
    /// picked with a stream seeded from `enemy_seed`. Enemy `i` draws its
    /// moves from its own stream seeded with `enemy_seed + i + 1`.
    #[must_use]
    pub fn new(level: Level, config: WorldConfig, enemy_seed: u64) -> Self {
        let player = Player::spawn(&level);
        let spawns: Vec<TilePos> = if level.enemies().is_empty() {
            fallback_spawn(&level, player.position(), enemy_seed)
                .into_iter()
                .collect()
        } else {
            level.enemies().to_vec()
        };

        let enemies: Vec<Enemy> = spawns
            .into_iter()
            .enumerate()
            .map(|(index, position)| {
                let seed = enemy_seed.wrapping_add(index as u64 + 1);
                let patrol_config = patrol::Config::new(
                    config.enemy_move_interval,
                    config.enemy_change_chance,
                    seed,
                );
                Enemy {
                    id: EnemyId::new(index as u32),
                    patrol: Patrol::new(position, patrol_config),
                }
            })
            .collect();

        log::debug!(
            "session on '{}' ({}x{}): player at {}, {} enemies",
            level.name(),
            level.width(),
            level.height(),
            player.position(),
            enemies.len()
        );

        Self {
            level,
            player,
            enemies,
            state: GameState::Running,
            outcome: None,
            elapsed: Duration::ZERO,
            time_limit: config.time_limit,
        }
    }

    fn evaluate_outcome(&self) -> Option<Outcome> {
        let player = self.player.position();
        if self.level.tile_at(player) == Ok(Tile::Exit) {
            return Some(Outcome::ExitReached);
        }
        if self
            .enemies
            .iter()
            .any(|enemy| enemy.patrol.position() == player)
        {
            return Some(Outcome::EnemyCollision);
        }
        if self.elapsed >= self.time_limit {
            return Some(Outcome::TimeLimit);
        }
        None
    }

    fn finish(&mut self, outcome: Outcome, out_events: &mut Vec<Event>) {
        self.state = outcome.state();
        self.outcome = Some(outcome);
        log::info!(
            "result: {} ({:?}) after {:.2}s",
            self.state.label(),
            outcome,
            self.elapsed.as_secs_f64()
        );
        out_events.push(Event::OutcomeReached {
            outcome,
            elapsed: self.elapsed,
        });
    }
}

fn fallback_spawn(level: &Level, player: TilePos, seed: u64) -> Option<TilePos> {
    let candidates: Vec<TilePos> = level
        .iter_tiles()
        .filter(|(pos, tile)| tile.is_walkable() && *pos != player)
        .map(|(pos, _)| pos)
        .collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let chosen = candidates.choose(&mut rng).copied();
    if let Some(position) = chosen {
        log::debug!("fallback enemy spawn at {position}");
    }
    chosen
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands received after the session reached a final state are ignored.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.state.is_final() {
        return;
    }

    match command {
        Command::MovePlayer { direction } => {
            let from = world.player.position();
            if world.player.try_step(&world.level, direction) {
                out_events.push(Event::PlayerMoved {
                    from,
                    to: world.player.position(),
                });
            } else {
                out_events.push(Event::PlayerBlocked {
                    at: from,
                    direction,
                });
            }
        }
        Command::Tick { dt } => {
            world.elapsed = world.elapsed.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });

            let level = &world.level;
            for enemy in &mut world.enemies {
                let from = enemy.patrol.position();
                if enemy.patrol.update(dt, level) > 0 && enemy.patrol.position() != from {
                    out_events.push(Event::EnemyMoved {
                        enemy: enemy.id,
                        from,
                        to: enemy.patrol.position(),
                    });
                }
            }

            if let Some(outcome) = world.evaluate_outcome() {
                world.finish(outcome, out_events);
            }
        }
        Command::Abort => world.finish(Outcome::Aborted, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use dungeon_runner_core::{Direction, EnemyId, GameState, Level, Outcome, TilePos};

    use super::World;

    /// Level the session is played on.
    #[must_use]
    pub fn level(world: &World) -> &Level {
        &world.level
    }

    /// Tile currently occupied by the player.
    #[must_use]
    pub fn player(world: &World) -> TilePos {
        world.player.position()
    }

    /// Captures a read-only snapshot of every enemy.
    #[must_use]
    pub fn enemies(world: &World) -> EnemyView {
        let snapshots = world
            .enemies
            .iter()
            .map(|enemy| EnemySnapshot {
                id: enemy.id,
                position: enemy.patrol.position(),
                direction: enemy.patrol.direction(),
            })
            .collect();
        EnemyView { snapshots }
    }

    /// Current game state.
    #[must_use]
    pub fn state(world: &World) -> GameState {
        world.state
    }

    /// Reason the session ended, if it has.
    #[must_use]
    pub fn outcome(world: &World) -> Option<Outcome> {
        world.outcome
    }

    /// Simulated time elapsed since the session started.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Simulated time budget of the session.
    #[must_use]
    pub fn time_limit(world: &World) -> Duration {
        world.time_limit
    }

    /// Read-only snapshot of the enemies.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct EnemyView {
        snapshots: Vec<EnemySnapshot>,
    }

    impl EnemyView {
        /// Iterates over the captured enemy snapshots.
        pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
            self.snapshots.iter()
        }

        /// Number of enemies in the session.
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots.len()
        }

        /// Reports whether the session has no enemies.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.snapshots.is_empty()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<EnemySnapshot> {
            self.snapshots
        }
    }

    /// Captures the state of a single enemy for rendering or inspection.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct EnemySnapshot {
        /// Identifier assigned to the enemy.
        pub id: EnemyId,
        /// Tile the enemy occupies.
        pub position: TilePos,
        /// Heading of the enemy.
        pub direction: Direction,
    }
}
