//! Player and obstacle entities
//!
//! Both variants share a [`Body`] (center, side length, speed). Behaviour is
//! exposed through the [`Entity`] trait so the game loop can update and draw
//! either one the same way.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::consts::*;
use crate::input::{Direction, InputState};
use crate::render::{Border, Colour, Rect, Shadow, Surface};

/// Shared geometry: a square centered on `pos`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    /// Side length (> 0)
    pub size: f32,
    /// Units per tick
    pub speed: f32,
}

impl Body {
    pub fn new(pos: Vec2, size: f32, speed: f32) -> Self {
        Self { pos, size, speed }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, self.size)
    }

    pub fn left(&self) -> f32 {
        self.pos.x - self.size / 2.0
    }

    pub fn right(&self) -> f32 {
        self.pos.x + self.size / 2.0
    }

    pub fn top(&self) -> f32 {
        self.pos.y - self.size / 2.0
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size / 2.0
    }

    pub fn overlaps(&self, other: &Body) -> bool {
        self.bounds().overlaps(&other.bounds())
    }
}

/// Something that moves itself and can be drawn
pub trait Entity {
    fn body(&self) -> &Body;

    /// Advance one tick. Touches only this entity's own state.
    fn update(&mut self, input: &InputState);

    fn render(&self, surface: &mut dyn Surface);
}

/// Check whether two entities' bounding squares intersect
#[inline]
pub fn overlaps(a: &dyn Entity, b: &dyn Entity) -> bool {
    a.body().overlaps(b.body())
}

/// The player's square
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub colour: Colour,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            body: Body::new(pos, PLAYER_SIZE, PLAYER_SPEED),
            colour: Colour::RED,
        }
    }

    /// Wrap around the viewport edges (toroidal, not clamped).
    /// An empty viewport (e.g. a collapsed canvas) leaves the position alone.
    pub fn ensure_in_bounds(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let pos = &mut self.body.pos;
        if pos.x < 0.0 {
            pos.x = width;
        }
        if pos.y < 0.0 {
            pos.y = height;
        }
        if pos.x > width {
            pos.x %= width;
        }
        if pos.y > height {
            pos.y %= height;
        }
    }
}

impl Entity for Player {
    fn body(&self) -> &Body {
        &self.body
    }

    fn update(&mut self, input: &InputState) {
        let speed = self.body.speed;
        if input.is_pressed(Direction::Left) {
            self.body.pos.x -= speed;
        }
        if input.is_pressed(Direction::Up) {
            self.body.pos.y -= speed;
        }
        if input.is_pressed(Direction::Right) {
            self.body.pos.x += speed;
        }
        if input.is_pressed(Direction::Down) {
            self.body.pos.y += speed;
        }
    }

    fn render(&self, surface: &mut dyn Surface) {
        surface.fill_rect_with_shadow(
            Rect::centered_square(self.body.pos, self.body.size),
            self.colour,
            Shadow::default(),
        );
    }
}

/// A drifting asteroid. Direction and speed are fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub body: Body,
    /// Unit heading
    pub dir: Vec2,
    pub colour: Colour,
}

impl Obstacle {
    /// Build an obstacle heading along `angle_deg` (0° = +x, clockwise on screen)
    pub fn new(id: u32, pos: Vec2, size: f32, speed: f32, angle_deg: f32, shade: u8) -> Self {
        let theta = angle_deg.to_radians();
        Self {
            id,
            body: Body::new(pos, size, speed),
            dir: Vec2::new(theta.cos(), theta.sin()),
            colour: Colour::grey(shade),
        }
    }

    /// True once the obstacle is farther than `max_distance` from `center`
    pub fn is_out_of_bounds(&self, max_distance: f32, center: Vec2) -> bool {
        self.body.pos.distance(center) > max_distance
    }
}

impl Entity for Obstacle {
    fn body(&self) -> &Body {
        &self.body
    }

    fn update(&mut self, _input: &InputState) {
        self.body.pos += self.dir * self.body.speed;
    }

    fn render(&self, surface: &mut dyn Surface) {
        surface.fill_rect_with_shadow_and_border(
            Rect::centered_square(self.body.pos, self.body.size),
            self.colour,
            Shadow::default(),
            Border {
                colour: Colour::BLACK,
                width: OBSTACLE_BORDER_WIDTH,
            },
        );
    }
}
