//! Rock Dodge - steer a square through drifting asteroids and survive
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, spawning, collisions, game loop)
//! - `render`: Drawing collaborator trait and HUD painting
//! - `starfield`: Background hyperdrive effect
//! - `platform`: Cooperative scheduler shared by the tick and spawn timers
//! - `highscores`: Persisted best survival time
//! - `settings`: Persisted tunables

pub mod error;
pub mod highscores;
pub mod input;
pub mod platform;
pub mod render;
pub mod settings;
pub mod sim;
pub mod starfield;

pub use error::{GameError, StoreError};
pub use highscores::{MemoryScoreStore, ScoreStore};
pub use settings::{GameOverPolicy, Settings};

/// Game configuration constants
pub mod consts {
    /// Delay between the end of one tick and the next (~60 Hz)
    pub const TICK_INTERVAL_MS: f64 = 16.0;

    /// Player defaults
    pub const PLAYER_SIZE: f32 = 50.0;
    pub const PLAYER_SPEED: f32 = 5.0;

    /// Obstacle size range [min, max), whole units
    pub const OBSTACLE_MIN_SIZE: u32 = 20;
    pub const OBSTACLE_MAX_SIZE: u32 = 100;
    /// Obstacle speed range [0, max)
    pub const OBSTACLE_MAX_SPEED: f32 = 5.0;
    /// Grey shade range [min, max)
    pub const OBSTACLE_MIN_SHADE: u8 = 50;
    pub const OBSTACLE_MAX_SHADE: u8 = 200;

    /// Session defaults
    pub const DEFAULT_MAX_OBSTACLES: usize = 10;
    pub const DEFAULT_SPAWN_INTERVAL_SECS: f64 = 5.0;
    /// Shortest spawn interval; below a millisecond the timer never advances
    pub const MIN_SPAWN_INTERVAL_SECS: f64 = 0.001;

    /// Drawing
    pub const SHADOW_BLUR: f32 = 20.0;
    pub const OBSTACLE_BORDER_WIDTH: f32 = 3.0;
    pub const HUD_FONT_SIZE: f32 = 32.0;
    pub const HUD_MARGIN: f32 = 32.0;
    pub const HUD_LINE_2_Y: f32 = 80.0;

    /// Starfield
    pub const STAR_COUNT: usize = 100;
    pub const STAR_SPEED: f32 = 1.01;
}

/// Format a millisecond count as `MM:SS:mmm`
///
/// Minutes are padded to two digits but never wrap.
pub fn format_time(millis: f64) -> String {
    let total = millis.max(0.0).floor() as u64;
    let ms = total % 1000;
    let secs = (total / 1000) % 60;
    let mins = total / 60_000;
    format!("{:02}:{:02}:{:03}", mins, secs, ms)
}
