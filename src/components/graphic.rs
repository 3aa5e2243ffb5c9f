use bevy_ecs::prelude::Component;

/// Marks an entity as drawable and carries the render-pass switches.
///
/// When `draw_from_origin` is `false` the render pass saves the surface
/// transform, translates to the entity position, rotates by its
/// [`Rotation`](super::rotation::Rotation) and, if `mask` is set and the
/// extent is non-zero, clips to the extent before drawing.
#[derive(Component, Clone, Copy, Debug)]
pub struct Graphic {
    /// Gates drawing.
    pub visible: bool,
    /// Draw in absolute coordinates instead of the entity's local frame.
    pub draw_from_origin: bool,
    /// Clip drawing to the entity's extent.
    pub mask: bool,
}

impl Default for Graphic {
    fn default() -> Self {
        Self {
            visible: true,
            draw_from_origin: false,
            mask: false,
        }
    }
}

impl Graphic {
    /// Defaults for shapes that position themselves (circles, lines, polygons).
    pub fn absolute() -> Self {
        Self {
            draw_from_origin: true,
            ..Self::default()
        }
    }
}
