//! Hyperdrive starfield background
//!
//! Stars start at random positions and are pushed away from the viewport
//! center by a constant factor each tick, leaving a short streak. Purely
//! visual; it has its own RNG so it never perturbs the simulation.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::render::{Colour, Surface};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub pos: Vec2,
    pub prev: Vec2,
}

#[derive(Debug, Clone)]
pub struct StarField {
    stars: Vec<Star>,
    speed: f32,
    rng: Pcg32,
}

impl StarField {
    pub fn new(count: usize, speed: f32, seed: u64, width: f32, height: f32) -> Self {
        let mut field = Self {
            stars: Vec::with_capacity(count),
            speed,
            rng: Pcg32::seed_from_u64(seed),
        };
        for _ in 0..count {
            let star = field.fresh_star(width, height);
            field.stars.push(star);
        }
        field
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    /// Random whole-unit position that isn't the exact center (a star there
    /// would never move)
    fn fresh_star(&mut self, width: f32, height: f32) -> Star {
        let center = Vec2::new(width / 2.0, height / 2.0);
        let mut pos = center;
        for _ in 0..8 {
            pos = Vec2::new(
                (self.rng.random::<f32>() * width).floor(),
                (self.rng.random::<f32>() * height).floor(),
            );
            if pos != center {
                break;
            }
        }
        if pos == center {
            pos.x += 1.0;
        }
        Star { pos, prev: pos }
    }

    /// Push every star outward; respawn those that leave the viewport
    pub fn update(&mut self, width: f32, height: f32) {
        let center = Vec2::new(width / 2.0, height / 2.0);
        for i in 0..self.stars.len() {
            let star = &mut self.stars[i];
            let next = (star.pos - center) * self.speed + center;
            star.prev = star.pos;
            star.pos = next;

            if next.x < 0.0 || next.x >= width || next.y < 0.0 || next.y >= height {
                self.stars[i] = self.fresh_star(width, height);
            }
        }
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        for star in &self.stars {
            surface.line(star.prev, star.pos, Colour::WHITE, 1.0);
        }
    }
}
