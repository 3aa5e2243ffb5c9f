use bevy_ecs::prelude::Component;

/// Rotation applied by the render pass around the entity's local origin.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Rotation {
    pub angle: f32,
    /// `angle` is in radians when set, degrees otherwise.
    pub use_radians: bool,
}

impl Rotation {
    pub fn degrees(angle: f32) -> Self {
        Self {
            angle,
            use_radians: false,
        }
    }

    pub fn radians(angle: f32) -> Self {
        Self {
            angle,
            use_radians: true,
        }
    }

    pub fn as_radians(&self) -> f32 {
        if self.use_radians {
            self.angle
        } else {
            self.angle.to_radians()
        }
    }
}
