//! Axis-aligned overlap tests
//!
//! Every entity is a square centered on its position, so its bounds come
//! straight from `(pos, size)`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Bounding box derived from a center and side length
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Aabb {
    pub fn from_center(center: Vec2, size: f32) -> Self {
        let half = size / 2.0;
        Self {
            left: center.x - half,
            right: center.x + half,
            top: center.y - half,
            bottom: center.y + half,
        }
    }

    /// Strict intersection: shared edges do not count
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let right_of = self.left >= other.right;
        let left_of = self.right <= other.left;
        let above = self.bottom <= other.top;
        let below = self.top >= other.bottom;
        !(right_of || left_of || above || below)
    }
}

/// Check whether two centered squares overlap
#[inline]
pub fn squares_overlap(a_pos: Vec2, a_size: f32, b_pos: Vec2, b_size: f32) -> bool {
    Aabb::from_center(a_pos, a_size).overlaps(&Aabb::from_center(b_pos, b_size))
}
