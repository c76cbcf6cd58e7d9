/// The step function: advances the world by one frame.
///
/// Processing order:
///   0. Game over: only a restart request is evaluated
///   1. Countdown timer (expiry = death)
///   2. Player kinematics
///        input → ladder sampling → climb / gravity → jump
///        → key pickup → door → hazard → vertical pass → horizontal pass
///        → enemy contact → damping
///   3. Enemy patrol
///
/// A level transition or a death ends the step immediately; nothing after
/// it runs that frame.

use crate::domain::ai;
use crate::domain::entity::{Control, Facing, FrameInput, PlayerMotion, PLAYER_H, PLAYER_W};
use crate::domain::physics;
use crate::domain::tile::{Tile, TILE_SIZE};
use crate::domain::tilemap::Tilemap;
use super::event::{DeathCause, GameEvent};
use super::world::{GameState, Phase};

/// Collision retries per axis.
const RESOLVE_ITERATIONS: usize = 4;
const DAMPING_X: f32 = 0.8;
const DAMPING_Y: f32 = 0.9;

/// Did the step run to completion, or did a transition end it early?
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Flow {
    Continue,
    Ended,
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn update(world: &mut GameState, input: &FrameInput, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };

    if world.phase == Phase::GameOver {
        if input.is_pressed(Control::Restart) {
            restart_game(world, &mut events);
        }
        return events;
    }

    if resolve_timer(world, dt, &mut events) == Flow::Ended {
        return events;
    }
    if resolve_player(world, input, dt, &mut events) == Flow::Ended {
        return events;
    }
    resolve_enemies(world, dt);

    events
}

// ══════════════════════════════════════════════════════════════
// Timer
// ══════════════════════════════════════════════════════════════

fn resolve_timer(world: &mut GameState, dt: f32, events: &mut Vec<GameEvent>) -> Flow {
    world.timer -= dt;
    if world.timer > 0.0 {
        return Flow::Continue;
    }
    world.timer = world.rules.level_time;
    events.push(GameEvent::TimerExpired);
    player_die(world, DeathCause::Timer, events);
    Flow::Ended
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

/// Ladder occupancy sampled at the player's horizontal center.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LadderProbe {
    above_top: bool,
    in_climb_zone: bool,
}

fn probe_ladder(world: &GameState) -> LadderProbe {
    let map = world.tilemap();
    let p = &world.player;

    let cx = p.x + PLAYER_W / 2.0;
    let top = p.y + 1.0;
    let mid = top + PLAYER_H / 2.0;
    let bottom = top + PLAYER_H;

    let top_l = map.tile_at_point(cx, top).is_ladder();
    let mid_l = map.tile_at_point(cx, mid).is_ladder();
    let bottom_l = map.tile_at_point(cx, bottom).is_ladder();

    let on_ladder = top_l || mid_l || bottom_l;
    // Integer pixel alignment. At frame rate a climb moves less than one
    // pixel per step, so a climbing player lands in this window.
    let aligned = (p.y.floor() as i64).rem_euclid(TILE_SIZE as i64) == 0;
    let above_top = bottom_l && !top_l && !mid_l && aligned;

    // A quarter tile at each edge of the ladder column is a dead zone.
    let offset = cx.rem_euclid(TILE_SIZE);
    let centered = offset > TILE_SIZE / 4.0 && offset < TILE_SIZE - TILE_SIZE / 4.0;

    LadderProbe { above_top, in_climb_zone: on_ladder && centered }
}

fn classify_motion(probe: LadderProbe, grounded: bool) -> PlayerMotion {
    if probe.in_climb_zone && probe.above_top {
        PlayerMotion::AboveLadderTop
    } else if probe.in_climb_zone {
        PlayerMotion::OnLadder
    } else if grounded {
        PlayerMotion::Grounded
    } else {
        PlayerMotion::Airborne
    }
}

fn resolve_player(
    world: &mut GameState,
    input: &FrameInput,
    dt: f32,
    events: &mut Vec<GameEvent>,
) -> Flow {
    let speed = world.physics.player_speed;

    // 1. Horizontal acceleration
    if input.is_down(Control::Right) {
        world.player.vx += speed * dt;
        world.player.facing = Facing::Right;
    }
    if input.is_down(Control::Left) {
        world.player.vx -= speed * dt;
        world.player.facing = Facing::Left;
    }

    // 2. Ladder state
    let probe = probe_ladder(world);
    let motion = classify_motion(probe, world.player.grounded);
    world.player.motion = motion;

    // 3–4. Climb or fall
    let p = &mut world.player;
    if probe.in_climb_zone {
        p.vy = 0.0;
        let column = ((p.x + PLAYER_W / 2.0) / TILE_SIZE).floor();
        let centered_x = column * TILE_SIZE + (TILE_SIZE - PLAYER_W) / 2.0;
        if input.is_down(Control::Up) {
            p.vx = 0.0;
            p.vy -= speed * 2.0 * dt;
            p.x = centered_x;
        }
        if input.is_down(Control::Down) {
            p.vx = 0.0;
            p.vy += speed * 2.0 * dt;
            p.x = centered_x;
        }
        if input.is_down(Control::Up) && probe.above_top {
            p.y = (p.y / TILE_SIZE).floor() * TILE_SIZE;
            p.vy = 0.0;
        }
    } else {
        p.vy += world.physics.gravity * dt;
    }

    // 5. Jump
    if input.is_pressed(Control::Up) && motion.can_jump() {
        p.vy -= world.physics.jump_impulse;
    }

    // 6. Pickups, doors, hazards
    if resolve_interactions(world, events) == Flow::Ended {
        return Flow::Ended;
    }

    // 7–8. Collision
    resolve_collisions(world);

    // 9. Enemy contact
    let body = world.player.rect();
    if world.enemies.iter().any(|e| e.rect().overlaps(&body)) {
        player_die(world, DeathCause::Enemy, events);
        return Flow::Ended;
    }

    // 10. Damping
    world.player.vx *= DAMPING_X;
    world.player.vy *= DAMPING_Y;

    Flow::Continue
}

/// Key pickup → open door → hazard, in that order. Door and hazard end the
/// step.
fn resolve_interactions(world: &mut GameState, events: &mut Vec<GameEvent>) -> Flow {
    let cx = world.player.x + PLAYER_W / 2.0;
    let upper_y = world.player.y + PLAYER_H / 4.0;
    let lower_y = world.player.y + PLAYER_H * 3.0 / 4.0;

    let map = world.tilemap_mut();
    let samples = [map.cell_at_point(cx, upper_y), map.cell_at_point(cx, lower_y)];

    if touches(map, &samples, Tile::Key) {
        let mut collected = false;
        for &(x, y) in samples.iter().flatten() {
            if map.tile_at(x, y) == Some(Tile::Key) {
                map.set_tile(x, y, Tile::Empty);
                collected = true;
                events.push(GameEvent::KeyCollected { x, y, remaining: map.count(Tile::Key) });
            }
        }
        if collected && map.count(Tile::Key) == 0 {
            let count = map.open_all_doors();
            events.push(GameEvent::DoorsOpened { count });
        }
    }

    if touches(map, &samples, Tile::DoorOpen) {
        advance_level(world, events);
        return Flow::Ended;
    }

    let lower_hazard = samples[1]
        .and_then(|(x, y)| map.tile_at(x, y))
        .is_some_and(|t| t.is_hazard());
    if lower_hazard {
        player_die(world, DeathCause::Hazard, events);
        return Flow::Ended;
    }

    Flow::Continue
}

fn touches(map: &Tilemap, samples: &[Option<(usize, usize)>], tile: Tile) -> bool {
    samples.iter().flatten().any(|&(x, y)| map.tile_at(x, y) == Some(tile))
}

/// Vertical pass, then horizontal. Collisions halve the velocity instead
/// of zeroing it, and the proposal is retried.
fn resolve_collisions(world: &mut GameState) {
    let map = &world.levels[world.current_level];
    let p = &mut world.player;

    let mut skip_horizontal = false;
    let mut new_y = p.y + p.vy;
    for _ in 0..RESOLVE_ITERATIONS {
        match physics::query_map_collision(map, &p.rect_at(p.x, new_y)) {
            Some(hit) if p.y + PLAYER_H <= hit.y => {
                p.y = p.y.ceil();
                p.vy /= 2.0;
                new_y = p.y + p.vy;
                p.grounded = true;
            }
            hit => {
                // a ceiling or side hit is passed through this step
                skip_horizontal |= hit.is_some();
                p.y = new_y;
                p.grounded = false;
                break;
            }
        }
    }

    let mut new_x = p.x + p.vx;
    for _ in 0..RESOLVE_ITERATIONS {
        let hit = physics::query_map_collision(map, &p.rect_at(new_x, p.y));
        if hit.is_some() && !skip_horizontal {
            p.vx /= 2.0;
            new_x = p.x + p.vx;
        } else {
            p.x = new_x;
            break;
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Enemies
// ══════════════════════════════════════════════════════════════

fn resolve_enemies(world: &mut GameState, dt: f32) {
    let speed = world.physics.enemy_speed;
    let map = &world.levels[world.current_level];
    for enemy in &mut world.enemies {
        ai::patrol(map, enemy, speed, dt);
    }
}

// ══════════════════════════════════════════════════════════════
// Transitions
// ══════════════════════════════════════════════════════════════

/// Next level (wrapping). Wrapping to level 0 restores every tilemap.
pub fn advance_level(world: &mut GameState, events: &mut Vec<GameEvent>) {
    world.current_level = (world.current_level + 1) % world.level_count();
    world.timer = world.rules.level_time;
    let wrapped = world.current_level == 0;
    if wrapped {
        world.reset_all_tilemaps();
    }
    world.respawn_entities();
    events.push(GameEvent::LevelEntered { level: world.current_level, wrapped });
}

/// Lose a life. The level and its tilemap are kept.
pub fn player_die(world: &mut GameState, cause: DeathCause, events: &mut Vec<GameEvent>) {
    world.lives = world.lives.saturating_sub(1);
    events.push(GameEvent::PlayerDied { cause, lives_left: world.lives });
    if world.lives == 0 {
        world.phase = Phase::GameOver;
        events.push(GameEvent::GameOver);
    } else {
        world.respawn_entities();
    }
}

/// Full restart from the game-over screen.
pub fn restart_game(world: &mut GameState, events: &mut Vec<GameEvent>) {
    world.current_level = 0;
    world.lives = world.rules.starting_lives;
    world.timer = world.rules.level_time;
    world.phase = Phase::Playing;
    world.reset_all_tilemaps();
    world.respawn_entities();
    events.push(GameEvent::Restarted);
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
