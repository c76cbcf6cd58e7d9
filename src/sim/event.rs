/// Events emitted during a simulation step.
/// The presentation layer consumes these for logging and HUD messages.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeathCause {
    Hazard,
    Enemy,
    Timer,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    KeyCollected { x: usize, y: usize, remaining: usize },
    DoorsOpened { count: usize },
    LevelEntered { level: usize, wrapped: bool },
    TimerExpired,
    PlayerDied { cause: DeathCause, lives_left: u32 },
    GameOver,
    Restarted,
}
