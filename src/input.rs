//! Directional input flags
//!
//! The host flips these from key events; the simulation only reads them.

use serde::{Deserialize, Serialize};

/// One of the four movement directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Up,
    Right,
    Down,
}

impl Direction {
    fn index(self) -> usize {
        match self {
            Direction::Left => 0,
            Direction::Up => 1,
            Direction::Right => 2,
            Direction::Down => 3,
        }
    }

    /// Map a DOM `KeyboardEvent.key` value to a direction (WASD + arrows)
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "a" | "A" | "ArrowLeft" => Some(Direction::Left),
            "w" | "W" | "ArrowUp" => Some(Direction::Up),
            "d" | "D" | "ArrowRight" => Some(Direction::Right),
            "s" | "S" | "ArrowDown" => Some(Direction::Down),
            _ => None,
        }
    }
}

/// Held-state of the four direction keys (left, up, right, down)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    pressed: [bool; 4],
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pressed(&self, dir: Direction) -> bool {
        self.pressed[dir.index()]
    }

    pub fn set(&mut self, dir: Direction, pressed: bool) {
        self.pressed[dir.index()] = pressed;
    }

    /// Apply a key-down (`pressed = true`) or key-up event.
    /// Returns true if the key was a movement key.
    pub fn handle_key(&mut self, key: &str, pressed: bool) -> bool {
        match Direction::from_key(key) {
            Some(dir) => {
                self.set(dir, pressed);
                true
            }
            None => false,
        }
    }

    /// Release every direction
    pub fn clear(&mut self) {
        self.pressed = [false; 4];
    }
}
