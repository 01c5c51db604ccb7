//! Error types

use thiserror::Error;

/// Errors surfaced by the game's public control API
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    /// A tunable was given a value that would stall or break the spawner
    #[error("invalid configuration: {what} must be positive, got {value}")]
    InvalidConfiguration { what: &'static str, value: f64 },
}

/// Errors from a best-time storage backend
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("score store unavailable: {0}")]
    Unavailable(String),
    #[error("stored best time is corrupt: {0}")]
    Corrupt(String),
}
