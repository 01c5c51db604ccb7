//! Deterministic simulation module
//!
//! All gameplay logic lives here. Given the same seed, the same key flags
//! and the same tick timestamps, a run replays exactly:
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - Time comes in from the caller, never from a wall clock

pub mod clock;
pub mod collision;
pub mod entity;
pub mod game;
pub mod spawner;
pub mod state;
pub mod tick;

pub use clock::SimClock;
pub use collision::{Aabb, squares_overlap};
pub use entity::{Body, Entity, Obstacle, Player, overlaps};
pub use game::{Game, RunState};
pub use spawner::Spawner;
pub use state::World;
pub use tick::{TickOutcome, despawn_radius, tick};
