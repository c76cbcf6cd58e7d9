/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::GameResult;

// ── Public Config Struct ──

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub physics: PhysicsConfig,
    pub rules: RulesConfig,
    pub frame: FrameConfig,
    pub gamepad: GamepadConfig,
    pub export_path: PathBuf,
}

/// Kinematics tuning. Player velocities are pixels per step; gravity,
/// speed and the enemy speed are per second and get scaled by `dt`.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub player_speed: f32,
    pub jump_impulse: f32,
    pub enemy_speed: f32,
}

/// Progression rules.
#[derive(Clone, Debug, PartialEq)]
pub struct RulesConfig {
    pub starting_lives: u32,
    /// Countdown per level, seconds.
    pub level_time: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FrameConfig {
    pub frame_ms: u64,
    /// Upper bound on one step's `dt`, seconds.
    pub max_frame_dt: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub restart: Vec<String>,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig {
            gravity: default_gravity(),
            player_speed: default_player_speed(),
            jump_impulse: default_jump_impulse(),
            enemy_speed: default_enemy_speed(),
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            starting_lives: default_starting_lives(),
            level_time: default_level_time(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    game: TomlGame,
    #[serde(default)]
    editor: TomlEditor,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_player_speed")]
    player_speed: f32,
    #[serde(default = "default_jump_impulse")]
    jump_impulse: f32,
    #[serde(default = "default_enemy_speed")]
    enemy_speed: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGame {
    #[serde(default = "default_starting_lives")]
    starting_lives: u32,
    #[serde(default = "default_level_time")]
    level_time: f32,
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
    #[serde(default = "default_max_frame_dt")]
    max_frame_dt: f32,
}

#[derive(Deserialize, Debug)]
struct TomlEditor {
    #[serde(default = "default_export_path")]
    export_path: String,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_jump")]
    jump: Vec<String>,
    #[serde(default = "default_restart")]
    restart: Vec<String>,
}

// ── Defaults ──

fn default_gravity() -> f32 { 30.0 }
fn default_player_speed() -> f32 { 20.0 }
fn default_jump_impulse() -> f32 { 10.0 }
fn default_enemy_speed() -> f32 { 40.0 }
fn default_starting_lives() -> u32 { 3 }
fn default_level_time() -> f32 { 60.0 }
fn default_frame_ms() -> u64 { 16 }     // ~60 fps
fn default_max_frame_dt() -> f32 { 0.1 }
fn default_export_path() -> String { "tilemap.txt".into() }
fn default_jump() -> Vec<String> { vec!["A".into()] }
fn default_restart() -> Vec<String> { vec!["Start".into()] }

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            gravity: default_gravity(),
            player_speed: default_player_speed(),
            jump_impulse: default_jump_impulse(),
            enemy_speed: default_enemy_speed(),
        }
    }
}

impl Default for TomlGame {
    fn default() -> Self {
        TomlGame {
            starting_lives: default_starting_lives(),
            level_time: default_level_time(),
            frame_ms: default_frame_ms(),
            max_frame_dt: default_max_frame_dt(),
        }
    }
}

impl Default for TomlEditor {
    fn default() -> Self {
        TomlEditor { export_path: default_export_path() }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_jump(),
            restart: default_restart(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        for dir in candidate_dirs() {
            let path = dir.join("config.toml");
            if !path.exists() {
                continue;
            }
            match Self::load_from(&path) {
                Ok(cfg) => {
                    log::info!("config loaded from {}", path.display());
                    return cfg;
                }
                Err(e) => {
                    log::warn!("{}: {e}; using default settings", path.display());
                    return GameConfig::default();
                }
            }
        }
        log::debug!("no config.toml found, using defaults");
        GameConfig::default()
    }

    pub fn load_from(path: &Path) -> GameResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> GameResult<Self> {
        let raw: TomlConfig = toml::from_str(text)?;
        Ok(GameConfig::from_toml(raw))
    }

    fn from_toml(raw: TomlConfig) -> Self {
        GameConfig {
            physics: PhysicsConfig {
                gravity: raw.physics.gravity,
                player_speed: raw.physics.player_speed,
                jump_impulse: raw.physics.jump_impulse,
                enemy_speed: raw.physics.enemy_speed,
            },
            rules: RulesConfig {
                starting_lives: raw.game.starting_lives.max(1),
                level_time: positive_or_default(
                    "level_time",
                    raw.game.level_time,
                    default_level_time(),
                ),
            },
            frame: FrameConfig {
                frame_ms: raw.game.frame_ms.max(1),
                max_frame_dt: positive_or_default(
                    "max_frame_dt",
                    raw.game.max_frame_dt,
                    default_max_frame_dt(),
                ),
            },
            gamepad: GamepadConfig {
                jump: raw.gamepad.jump,
                restart: raw.gamepad.restart,
            },
            export_path: PathBuf::from(raw.editor.export_path),
        }
    }
}

/// Durations must be finite and positive; anything else falls back.
fn positive_or_default(key: &str, value: f32, default: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        log::warn!("[game] {key} = {value} is not a positive duration; using {default}");
        default
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}
