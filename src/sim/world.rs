/// GameState: the complete snapshot of a running game.
///
/// ## Tile Architecture
///
/// One `Tilemap` per level, each carrying its own pristine copy. Only the
/// current level's map is touched by play; all maps are restored together
/// when the level cycle wraps to 0 or the game restarts.
///
/// ## Ownership
///
/// The frontend owns exactly one `GameState` and hands `&mut` to
/// `step::update` once per frame. Renderers get read-only accessors.

use crate::config::{PhysicsConfig, RulesConfig};
use crate::domain::entity::{Enemy, Player, MAX_ENEMIES};
use crate::domain::physics::Rect;
use crate::domain::tile::{Tile, TILE_SIZE};
use crate::domain::tilemap::Tilemap;
use crate::error::{GameError, GameResult};

/// Spawn position when a level has no `P` marker.
pub const FALLBACK_SPAWN: (f32, f32) = (TILE_SIZE * 2.0, TILE_SIZE * 2.0);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    GameOver,
}

/// Values shown on the HUD.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hud {
    /// 1-based for display.
    pub level: usize,
    pub level_count: usize,
    pub lives: u32,
    pub time_left: f32,
    pub keys_left: usize,
    pub game_over: bool,
}

pub struct GameState {
    // ── Level geometry ──
    pub levels: Vec<Tilemap>,
    pub current_level: usize,

    // ── Entities ──
    pub player: Player,
    pub enemies: Vec<Enemy>,

    // ── Progression ──
    pub lives: u32,
    pub timer: f32,
    pub phase: Phase,

    // ── Tuning ──
    pub physics: PhysicsConfig,
    pub rules: RulesConfig,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
}

// ── Construction ──

impl GameState {
    /// Start a new game on level 0. Every level must share the first
    /// level's dimensions.
    pub fn new(levels: Vec<Tilemap>, physics: PhysicsConfig, rules: RulesConfig) -> GameResult<Self> {
        let first = levels.first().ok_or(GameError::NoLevels)?;
        let expected = (first.width(), first.height());
        for (level, map) in levels.iter().enumerate() {
            let found = (map.width(), map.height());
            if found != expected {
                return Err(GameError::LevelSize { level, expected, found });
            }
        }

        let mut world = GameState {
            levels,
            current_level: 0,
            player: Player::new(FALLBACK_SPAWN.0, FALLBACK_SPAWN.1),
            enemies: Vec::with_capacity(MAX_ENEMIES),
            lives: rules.starting_lives,
            timer: rules.level_time,
            phase: Phase::Playing,
            physics,
            rules,
            message: String::new(),
            message_timer: 0,
        };
        world.respawn_entities();
        Ok(world)
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }
}

// ── Read-only snapshots ──

impl GameState {
    #[inline]
    pub fn tilemap(&self) -> &Tilemap {
        &self.levels[self.current_level]
    }

    #[inline]
    pub fn tilemap_mut(&mut self) -> &mut Tilemap {
        &mut self.levels[self.current_level]
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn player_rect(&self) -> Rect {
        self.player.rect()
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn hud(&self) -> Hud {
        Hud {
            level: self.current_level + 1,
            level_count: self.levels.len(),
            lives: self.lives,
            time_left: self.timer.max(0.0),
            keys_left: self.tilemap().count(Tile::Key),
            game_over: self.phase == Phase::GameOver,
        }
    }
}

// ── (Re)initialisation ──

impl GameState {
    /// Player back to the spawn marker, enemy roster rebuilt from the
    /// current map.
    pub fn respawn_entities(&mut self) {
        self.spawn_player();
        self.spawn_enemies();
    }

    fn spawn_player(&mut self) {
        let (x, y) = match self.tilemap().find_first(Tile::PlayerSpawn) {
            Some((tx, ty)) => (tx as f32 * TILE_SIZE, ty as f32 * TILE_SIZE),
            None => FALLBACK_SPAWN,
        };
        self.player = Player::new(x, y);
    }

    fn spawn_enemies(&mut self) {
        let spawns = self.tilemap().find_all(Tile::EnemySpawn);
        self.enemies.clear();
        for (tx, ty) in spawns {
            if self.enemies.len() == MAX_ENEMIES {
                log::warn!(
                    "level {}: enemy spawn at ({tx}, {ty}) skipped, roster full",
                    self.current_level + 1
                );
                continue;
            }
            self.enemies.push(Enemy::new(tx as f32 * TILE_SIZE, ty as f32 * TILE_SIZE));
        }
    }

    /// Restore every level from its pristine snapshot.
    pub fn reset_all_tilemaps(&mut self) {
        for map in &mut self.levels {
            map.reset_to_initial();
        }
    }
}
