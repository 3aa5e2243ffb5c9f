//! Placement components: where a graphic sits and how much room it takes.

use bevy_ecs::prelude::Component;

use crate::types::Vector2;

/// Top-left corner for boxes, center for circles drawn from origin,
/// start point for lines.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    pub pos: Vector2,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            pos: Vector2::new(x, y),
        }
    }
}

/// Axis-aligned extent. Together with [`Position`] this makes an entity hoverable.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Size {
    pub size: Vector2,
}

impl Size {
    pub fn new(w: f32, h: f32) -> Self {
        Self {
            size: Vector2::new(w, h),
        }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self {
            size: Vector2::splat(16.0),
        }
    }
}

#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct Radius {
    pub radius: f32,
}
