//! Session state
//!
//! Everything a single run owns: the player, the live obstacles, the survival
//! timer and the spawn configuration.

use glam::Vec2;

use super::clock::SimClock;
use super::entity::{Obstacle, Player};
use super::spawner::Spawner;

/// Live world for one session
#[derive(Debug, Clone)]
pub struct World {
    pub player: Player,
    /// Live obstacles in spawn order (iteration order is deterministic)
    pub obstacles: Vec<Obstacle>,
    pub clock: SimClock,
    /// Spawn-time ceiling on `obstacles.len()`
    pub max_obstacles: usize,
    pub spawn_interval_secs: f64,
    /// Set when the player was hit this session
    pub done: bool,
    spawner: Spawner,
}

impl World {
    /// Create an empty world; call [`World::reset_session`] to populate it
    pub fn new(seed: u64, max_obstacles: usize, spawn_interval_secs: f64, now_ms: f64) -> Self {
        Self {
            player: Player::new(Vec2::ZERO),
            obstacles: Vec::new(),
            clock: SimClock::new(now_ms),
            max_obstacles,
            spawn_interval_secs,
            done: false,
            spawner: Spawner::new(seed),
        }
    }

    /// Milliseconds survived this session
    pub fn timer_ms(&self) -> f64 {
        self.clock.elapsed_ms()
    }

    pub fn spawn_interval_ms(&self) -> f64 {
        self.spawn_interval_secs * 1000.0
    }

    /// Fresh session: player centered, a full set of obstacles, timer at zero
    pub fn reset_session(&mut self, width: f32, height: f32) {
        self.player = Player::new(Vec2::new(width / 2.0, height / 2.0));
        self.obstacles.clear();
        for _ in 0..self.max_obstacles {
            let obstacle = self.spawner.spawn_obstacle(width, height);
            self.obstacles.push(obstacle);
        }
        self.clock.reset();
        self.done = false;
    }

    /// Add one obstacle unless already at capacity. Returns whether it spawned.
    pub fn try_spawn(&mut self, width: f32, height: f32) -> bool {
        if self.obstacles.len() >= self.max_obstacles {
            return false;
        }
        let obstacle = self.spawner.spawn_obstacle(width, height);
        self.obstacles.push(obstacle);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::DEFAULT_MAX_OBSTACLES;

    #[test]
    fn test_reset_session_fills_to_capacity() {
        let mut world = World::new(5, 4, 5.0, 0.0);
        world.reset_session(800.0, 600.0);
        assert_eq!(world.obstacles.len(), 4);
        assert_eq!(world.player.body.pos, Vec2::new(400.0, 300.0));
        assert_eq!(world.timer_ms(), 0.0);
        assert!(!world.done);
    }

    #[test]
    fn test_spawn_respects_capacity() {
        let mut world = World::new(5, 3, 5.0, 0.0);
        world.reset_session(800.0, 600.0);
        assert_eq!(world.obstacles.len(), 3);
        assert!(!world.try_spawn(800.0, 600.0));
        assert_eq!(world.obstacles.len(), 3);

        world.obstacles.pop();
        assert!(world.try_spawn(800.0, 600.0));
        assert_eq!(world.obstacles.len(), 3);
    }

    #[test]
    fn test_capacity_not_enforced_after_shrinking() {
        let mut world = World::new(5, 6, 5.0, 0.0);
        world.reset_session(800.0, 600.0);
        world.max_obstacles = 2;
        // Existing obstacles are kept, only new spawns are refused
        assert_eq!(world.obstacles.len(), 6);
        assert!(!world.try_spawn(800.0, 600.0));
    }

    #[test]
    fn test_obstacle_ids_unique_across_sessions() {
        let mut world = World::new(5, 3, 5.0, 0.0);
        world.reset_session(800.0, 600.0);
        let first: Vec<u32> = world.obstacles.iter().map(|o| o.id).collect();
        world.reset_session(800.0, 600.0);
        assert!(world.obstacles.iter().all(|o| !first.contains(&o.id)));
    }

    #[test]
    fn test_spawn_interval_in_ms() {
        let world = World::new(5, 3, 2.5, 0.0);
        assert_eq!(world.spawn_interval_ms(), 2500.0);
        assert_eq!(DEFAULT_MAX_OBSTACLES, 10);
    }
}
