/// Error type for everything that can fail outside the per-frame step:
/// level loading, config parsing and tilemap export.

/// Core error type for the game.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// config.toml could not be parsed
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    /// A level row contains a character that is not a tile code
    #[error("level {level}: unknown tile {ch:?} on line {line}")]
    LevelParse { level: usize, line: usize, ch: char },

    /// Every level must share the same grid size
    #[error("level {level}: expected {expected:?} grid, found {found:?}")]
    LevelSize {
        level: usize,
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// The level set is empty
    #[error("no levels to play")]
    NoLevels,
}

/// Result type used throughout the crate.
pub type GameResult<T> = Result<T, GameError>;
