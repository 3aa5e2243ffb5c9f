use bevy_ecs::prelude::Resource;

/// Scene clock in milliseconds, set by the host at the start of every tick
/// and frame. Hover timestamps and animation progress read `now` from here.
#[derive(Resource, Clone, Copy, Debug, Default)]
pub struct WorldTime {
    pub now: f64,
    pub ticks: u64,
    pub frames: u64,
}
