/// Entry point and game loop.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::fs::File;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use config::GameConfig;
use domain::entity::FrameInput;
use error::GameResult;
use sim::editor::{self, Brush};
use sim::event::{DeathCause, GameEvent};
use sim::level;
use sim::step;
use sim::world::GameState;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::{self, Renderer};

const LOG_FILE: &str = "rungfall.log";

fn main() -> ExitCode {
    init_logging();

    let config = GameConfig::load();

    let (names, maps) = match level::load_levels() {
        Ok(levels) => levels,
        Err(e) => {
            log::error!("level load failed: {e}");
            eprintln!("Level load failed: {e}");
            return ExitCode::FAILURE;
        }
    };
    log::info!("{} levels loaded", maps.len());

    let mut world = match GameState::new(maps, config.physics.clone(), config.rules.clone()) {
        Ok(w) => w,
        Err(e) => {
            log::error!("cannot start game: {e}");
            eprintln!("Cannot start game: {e}");
            return ExitCode::FAILURE;
        }
    };
    world.set_message(&names[0], 90);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        let _ = renderer.cleanup();
        eprintln!("Terminal init failed: {e}");
        return ExitCode::FAILURE;
    }

    let result = game_loop(&mut world, &mut renderer, &config, &names);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    match result {
        Ok(()) => {
            log::info!("quit on level {} with {} lives", world.current_level + 1, world.lives);
            println!("Thanks for playing Rungfall!");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("game loop failed: {e}");
            eprintln!("Game error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Log to a file: the terminal is in raw alternate-screen mode while the
/// game runs. `RUST_LOG` overrides the default `info` filter.
fn init_logging() {
    let file = match File::create(LOG_FILE) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Logging disabled, cannot create {LOG_FILE}: {e}");
            return;
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

fn game_loop(
    world: &mut GameState,
    renderer: &mut Renderer,
    config: &GameConfig,
    names: &[String],
) -> GameResult<()> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new(&config.gamepad);
    if gp.connected {
        log::info!("gamepad detected");
    }
    let mut brush = Brush::default();
    let frame_time = Duration::from_millis(config.frame.frame_ms);
    let mut last_frame = Instant::now();

    loop {
        let frame_start = Instant::now();

        kb.drain_events();
        gp.update();

        if kb.quit_requested() {
            break;
        }

        let input = kb.frame_input().merge(gp.frame_input());

        handle_editor(world, &kb, &input, &mut brush, config);

        let dt = frame_start
            .duration_since(last_frame)
            .as_secs_f32()
            .min(config.frame.max_frame_dt);
        last_frame = frame_start;

        let events = step::update(world, &input, dt);
        report_events(world, &events, names);

        if world.message_timer > 0 {
            world.message_timer -= 1;
            if world.message_timer == 0 {
                world.message.clear();
            }
        }

        renderer.render(world, brush)?;

        if let Some(rest) = frame_time.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    Ok(())
}

// ── Editor hooks ──

fn handle_editor(
    world: &mut GameState,
    kb: &InputState,
    input: &FrameInput,
    brush: &mut Brush,
    config: &GameConfig,
) {
    for c in kb.typed_chars() {
        if brush.select(c) {
            log::debug!("brush set to {:?}", brush.tile);
            world.set_message(&format!("Brush: {:?}", brush.tile), 40);
        }
    }

    if input.mouse_left_pressed {
        let (col, row) = input.mouse_position;
        let map = world.tilemap_mut();
        if let Some((x, y)) = renderer::screen_to_tile(col, row, map.width(), map.height()) {
            if brush.paint(map, x, y) {
                log::debug!("painted {:?} at ({x}, {y})", brush.tile);
            }
        }
    }

    if kb.export_requested() {
        let path = &config.export_path;
        match editor::save_tilemap(path, world.tilemap()) {
            Ok(()) => {
                log::info!(
                    "level {} exported to {} ({} cells edited or collected)",
                    world.current_level + 1,
                    path.display(),
                    world.tilemap().diff_from_pristine().len()
                );
                world.set_message(&format!("Exported to {}", path.display()), 60);
            }
            Err(e) => {
                log::error!("export to {} failed: {e}", path.display());
                world.set_message("Export failed!", 60);
            }
        }
    }
}

// ── Event reporting ──

fn report_events(world: &mut GameState, events: &[GameEvent], names: &[String]) {
    for event in events {
        match *event {
            GameEvent::KeyCollected { x, y, remaining } => {
                log::debug!("key collected at ({x}, {y}), {remaining} left");
                if remaining > 0 {
                    world.set_message(&format!("Key! {remaining} to go"), 40);
                }
            }
            GameEvent::DoorsOpened { count } => {
                log::debug!("{count} doors opened");
                world.set_message("The doors are open!", 60);
            }
            GameEvent::LevelEntered { level, wrapped } => {
                let name = names.get(level).map(String::as_str).unwrap_or("");
                log::info!("entered level {} '{name}'{}", level + 1, if wrapped { " (cycle wrapped)" } else { "" });
                world.set_message(name, 90);
            }
            GameEvent::TimerExpired => log::debug!("timer expired"),
            GameEvent::PlayerDied { cause, lives_left } => {
                log::debug!("player died: {cause:?}, {lives_left} lives left");
                let why = match cause {
                    DeathCause::Hazard => "Spiked!",
                    DeathCause::Enemy => "Caught!",
                    DeathCause::Timer => "Out of time!",
                };
                world.set_message(&format!("{why} {lives_left} lives left"), 60);
            }
            GameEvent::GameOver => {
                log::info!("game over on level {}", world.current_level + 1);
                world.set_message("GAME OVER", 0);
            }
            GameEvent::Restarted => {
                log::info!("game restarted");
                world.set_message(names.first().map(String::as_str).unwrap_or(""), 90);
            }
        }
    }
}
