//! Obstacle factory
//!
//! Drops obstacles at uniformly random viewport positions (not off-screen)
//! with random heading, size, speed and shade. All draws come from one seeded
//! PCG stream so a run is reproducible from its seed.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::entity::Obstacle;
use crate::consts::*;

#[derive(Debug, Clone)]
pub struct Spawner {
    rng: Pcg32,
    next_id: u32,
}

impl Spawner {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new obstacle ID
    fn next_obstacle_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Create one obstacle somewhere in `[0, width) x [0, height)`
    pub fn spawn_obstacle(&mut self, width: f32, height: f32) -> Obstacle {
        let x = (self.rng.random::<f32>() * width).floor();
        let y = (self.rng.random::<f32>() * height).floor();
        let size = self.rng.random_range(OBSTACLE_MIN_SIZE..OBSTACLE_MAX_SIZE) as f32;
        let angle_deg = self.rng.random_range(0.0f32..360.0);
        let speed = self.rng.random_range(0.0f32..OBSTACLE_MAX_SPEED);
        let shade = self.rng.random_range(OBSTACLE_MIN_SHADE..OBSTACLE_MAX_SHADE);

        let id = self.next_obstacle_id();
        log::debug!(
            "Spawned obstacle {} at ({}, {}) size {} speed {:.2}",
            id,
            x,
            y,
            size,
            speed
        );
        Obstacle::new(id, Vec2::new(x, y), size, speed, angle_deg, shade)
    }
}
