//! Fill color component.
//!
//! The [`Tint`] is the fill of boxes, circles, polygons and the stroke of
//! lines. Labels carry their own text color (see
//! [`Label`](crate::components::shape::Label)).

use bevy_ecs::prelude::Component;

use crate::types::Rgba;

#[derive(Component, Clone, Debug, Copy, Default, PartialEq)]
pub struct Tint {
    pub color: Rgba,
}

impl Tint {
    /// Create a new Tint with the specified RGBA values.
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            color: Rgba::new(r, g, b, a),
        }
    }
}

impl From<Rgba> for Tint {
    fn from(color: Rgba) -> Self {
        Self { color }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_white() {
        let t = Tint::default();
        assert_eq!(t.color, Rgba::WHITE);
    }
}
