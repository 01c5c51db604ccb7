//! Per-frame simulation step
//!
//! Advances the world by one tick: timer, movement, collision, cleanup.
//! Rendering, score persistence and rescheduling belong to the game loop.

use glam::Vec2;

use super::entity::{Entity, overlaps};
use super::state::World;
use crate::input::InputState;

/// Result of one simulation step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The player hit an obstacle; the session is over
    Collided { obstacle_id: u32, timer_ms: f64 },
    /// Nobody was hit; `despawned` obstacles drifted out of range
    Survived { despawned: usize },
}

/// Despawn radius for a viewport: half-width plus half-height
///
/// This is larger than the half-diagonal, so obstacles drift well off
/// screen before they are dropped.
#[inline]
pub fn despawn_radius(width: f32, height: f32) -> f32 {
    width / 2.0 + height / 2.0
}

/// Advance the world by one tick
pub fn tick(world: &mut World, input: &InputState, now_ms: f64, width: f32, height: f32) -> TickOutcome {
    world.clock.advance(now_ms);

    world.player.update(input);
    world.player.ensure_in_bounds(width, height);

    for obstacle in &mut world.obstacles {
        obstacle.update(input);
    }

    // First hit in spawn order ends the session; skip cleanup this tick
    if let Some(hit) = world
        .obstacles
        .iter()
        .find(|o| overlaps(&world.player, *o))
    {
        world.done = true;
        return TickOutcome::Collided {
            obstacle_id: hit.id,
            timer_ms: world.timer_ms(),
        };
    }

    let center = Vec2::new(width / 2.0, height / 2.0);
    let radius = despawn_radius(width, height);
    let before = world.obstacles.len();
    world
        .obstacles
        .retain(|o| !o.is_out_of_bounds(radius, center));

    TickOutcome::Survived {
        despawned: before - world.obstacles.len(),
    }
}
