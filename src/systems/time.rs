//! Time update system.
//!
//! Writes the host-supplied timestamp into the shared
//! [`WorldTime`](crate::resources::worldtime::WorldTime) resource before a
//! tick or frame runs.
use bevy_ecs::prelude::*;
use log::warn;

use crate::resources::worldtime::WorldTime;

/// Set the scene clock to `now` (milliseconds).
///
/// The clock never runs backwards; an earlier timestamp is logged and
/// ignored so hover durations and animation progress stay non-negative.
pub fn update_world_time(world: &mut World, now: f64) {
    let mut wt = world.resource_mut::<WorldTime>();
    if now < wt.now {
        warn!("Clock went backwards ({} -> {}), keeping {}", wt.now, now, wt.now);
        return;
    }
    wt.now = now;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_monotonic() {
        let mut world = World::new();
        world.init_resource::<WorldTime>();
        update_world_time(&mut world, 100.0);
        update_world_time(&mut world, 50.0);
        assert_eq!(world.resource::<WorldTime>().now, 100.0);
        update_world_time(&mut world, 120.5);
        assert_eq!(world.resource::<WorldTime>().now, 120.5);
    }
}
