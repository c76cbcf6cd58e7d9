/// Enemy AI: horizontal patrol.
///
/// Enemies are kinematic: no gravity, no collision response. Each step an
/// enemy looks half a tile ahead of its center and turns around when
///   1. the tile ahead (center height) is solid, or
///   2. the tile 1.5 tiles below that point is blank (a ledge). Spawn
///      markers are blank too.
/// Then it moves. The turn happens before the move, so an enemy never
/// steps past the edge of its platform.

use super::entity::Enemy;
use super::tile::{Tile, TILE_SIZE};
use super::tilemap::Tilemap;

/// Should the enemy turn around before moving this step?
pub fn should_turn(map: &Tilemap, enemy: &Enemy) -> bool {
    let rect = enemy.rect();
    let probe_x = rect.center_x() + enemy.facing.sign() * TILE_SIZE / 2.0;
    let probe_y = rect.center_y();

    let ahead: Tile = map.tile_at_point(probe_x, probe_y);
    if ahead.is_solid() {
        return true;
    }

    let below_ahead = map.tile_at_point(probe_x, probe_y + TILE_SIZE * 1.5);
    below_ahead.is_blank()
}

/// Advance one enemy by one step.
pub fn patrol(map: &Tilemap, enemy: &mut Enemy, speed: f32, dt: f32) {
    if should_turn(map, enemy) {
        enemy.facing = enemy.facing.flipped();
    }
    enemy.x += enemy.facing.sign() * speed * dt;
}
