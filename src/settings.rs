//! Game settings
//!
//! Persisted separately from the best time in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::GameError;

/// What happens after the player is hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GameOverPolicy {
    /// Start a fresh session on the next tick and keep running
    #[default]
    Restart,
    /// Stop the loop; `start` begins a fresh session
    Halt,
}

impl GameOverPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameOverPolicy::Restart => "Restart",
            GameOverPolicy::Halt => "Halt",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "restart" => Some(GameOverPolicy::Restart),
            "halt" | "stop" => Some(GameOverPolicy::Halt),
            _ => None,
        }
    }
}

/// Tunables the host may change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Obstacle capacity (also the number spawned at session start)
    pub max_obstacles: usize,
    /// Seconds between spawn attempts
    pub spawn_interval_secs: f64,
    pub on_game_over: GameOverPolicy,
    /// Draw the hyperdrive background
    pub starfield: bool,
    /// Fixed RNG seed; the host picks one when absent
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_obstacles: DEFAULT_MAX_OBSTACLES,
            spawn_interval_secs: DEFAULT_SPAWN_INTERVAL_SECS,
            on_game_over: GameOverPolicy::Restart,
            starfield: true,
            seed: None,
        }
    }
}

/// Capacity must be at least one
pub fn validate_max_obstacles(n: usize) -> Result<usize, GameError> {
    if n == 0 {
        return Err(GameError::InvalidConfiguration {
            what: "max_obstacles",
            value: 0.0,
        });
    }
    Ok(n)
}

/// Interval must be a finite number of seconds, at least one millisecond
pub fn validate_spawn_interval(secs: f64) -> Result<f64, GameError> {
    if !secs.is_finite() || secs < MIN_SPAWN_INTERVAL_SECS {
        return Err(GameError::InvalidConfiguration {
            what: "spawn_interval_secs",
            value: secs,
        });
    }
    Ok(secs)
}

impl Settings {
    pub fn validate(&self) -> Result<(), GameError> {
        validate_max_obstacles(self.max_obstacles)?;
        validate_spawn_interval(self.spawn_interval_secs)?;
        Ok(())
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "rock_dodge_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str::<Settings>(&json) {
                    if settings.validate().is_ok() {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    log::warn!("Stored settings are invalid, using defaults");
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
