//! The fixed 2D playfield bounds and its coordinate frame.
//!
//! All placement math in this crate happens in **arena space**: origin at the
//! top-left corner, x growing right, y growing *down* — the frame the level
//! tables and the planet generator are written in.  Bevy's world space is
//! centered on the window with y growing up; [`Arena::to_world`] converts
//! between the two when entities are spawned.

use bevy::prelude::*;

/// Immutable playfield dimensions.  Created once at startup; never mutated.
#[derive(Resource, Debug, Clone, Copy)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Horizontal midpoint in arena space.
    pub fn mid_x(&self) -> f32 {
        self.width / 2.0
    }

    /// Vertical midpoint in arena space.
    pub fn mid_y(&self) -> f32 {
        self.height / 2.0
    }

    /// Convert an arena-space point (top-left origin, y down) into Bevy world
    /// space (centered origin, y up).
    pub fn to_world(&self, arena_point: Vec2) -> Vec2 {
        Vec2::new(
            arena_point.x - self.width / 2.0,
            self.height / 2.0 - arena_point.y,
        )
    }

    /// Convert a Bevy world-space point back into arena space.
    pub fn to_arena(&self, world_point: Vec2) -> Vec2 {
        Vec2::new(
            world_point.x + self.width / 2.0,
            self.height / 2.0 - world_point.y,
        )
    }
}
