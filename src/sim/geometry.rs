//! Axis-aligned rectangles for hit tests
//!
//! Screen convention: `y` grows downward, so a rectangle "above the feet"
//! starts at a smaller `y`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{HURTBOX_HALF_WIDTH, HURTBOX_HEIGHT};

/// Rectangle given by its top-left corner and size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self::new(origin.x, origin.y, size.x, size.y)
    }

    /// Square bounding a circle
    pub fn around_circle(center: Vec2, radius: f32) -> Self {
        Self::new(center.x - radius, center.y - radius, radius * 2.0, radius * 2.0)
    }

    /// A fighter's vulnerable body, anchored on its feet
    pub fn hurtbox(feet: Vec2) -> Self {
        Self::new(
            feet.x - HURTBOX_HALF_WIDTH,
            feet.y - HURTBOX_HEIGHT,
            HURTBOX_HALF_WIDTH * 2.0,
            HURTBOX_HEIGHT,
        )
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Strict overlap test; rectangles that only share an edge do not overlap
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}
