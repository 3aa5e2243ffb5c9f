//! Animation systems.
//!
//! - [`animation_system`] advances every running
//!   [`Animation`](crate::resources::animations::Animation) once per frame.
//! - [`start_animation`], [`pause_animation`] and [`finish_animation`] are
//!   the world-level lifecycle operations used by the scene and by hooks.
//!
//! Hooks are collected while the [`AnimationRegistry`] is borrowed and run
//! once it has been put back, so `on_update`/`on_finish` may start, pause
//! or add animations.

use bevy_ecs::prelude::*;
use log::{debug, warn};

use crate::error::{FrameworkError, FrameworkResult};
use crate::resources::animations::{AnimationId, AnimationRegistry, FinishHook, Step, UpdateHook};
use crate::resources::worldtime::WorldTime;

/// Threshold easing: identity for an exponent of `1`, otherwise the two
/// halves of the curve are `p^e` scaled into `[0, 0.5]` and mirrored.
pub fn ease(progress: f32, exponent: f32) -> f32 {
    let p = progress.clamp(0.0, 1.0);
    if exponent == 1.0 {
        return p;
    }
    if p < 0.5 {
        0.5 * (2.0 * p).powf(exponent)
    } else {
        1.0 - 0.5 * (2.0 * (1.0 - p)).powf(exponent)
    }
}

/// Linearly interpolate between two floats.
pub(crate) fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

enum Fired {
    Update(UpdateHook, AnimationId, f32),
    Finish(FinishHook, AnimationId),
}

fn run_hooks(world: &mut World, fired: Vec<Fired>) {
    for f in fired {
        match f {
            Fired::Update(hook, id, value) => hook(world, id, value),
            Fired::Finish(hook, id) => hook(world, id),
        }
    }
}

/// Advance every running animation to the current scene time.
///
/// A failing animation is stopped and logged; the others keep going.
pub fn animation_system(world: &mut World) {
    let now = world.resource::<WorldTime>().now;
    let mut fired = Vec::new();
    world.resource_scope(|world, mut registry: Mut<AnimationRegistry>| {
        for (id, anim) in registry.iter_mut() {
            if !anim.running {
                continue;
            }
            match anim.update(world, now) {
                Ok(Step::Idle) => {}
                Ok(Step::Progressed(value)) => {
                    if let Some(h) = &anim.on_update {
                        fired.push(Fired::Update(h.clone(), id, value));
                    }
                }
                Ok(Step::Finished) => {
                    debug!("Animation {} finished at {}", id, now);
                    if let Some(h) = &anim.on_update {
                        fired.push(Fired::Update(h.clone(), id, anim.value));
                    }
                    if let Some(h) = &anim.on_finish {
                        fired.push(Fired::Finish(h.clone(), id));
                    }
                }
                Err(e) => warn!("Animation {} stopped: {}", id, e),
            }
        }
    });
    run_hooks(world, fired);
}

fn unknown(id: AnimationId) -> FrameworkError {
    FrameworkError::argument(format!("unknown animation {id}"))
}

/// Start (or resume) `id` at the current scene time.
pub fn start_animation(world: &mut World, id: AnimationId, restart: bool) -> FrameworkResult<()> {
    let now = world.resource::<WorldTime>().now;
    world.resource_scope(|world, mut registry: Mut<AnimationRegistry>| -> FrameworkResult<()> {
        let anim = registry.get_mut(id).ok_or_else(|| unknown(id))?;
        anim.start(world, now, restart)?;
        debug!("Animation {} started ({})", id, anim.describe());
        Ok(())
    })
}

pub fn pause_animation(world: &mut World, id: AnimationId) -> FrameworkResult<()> {
    let now = world.resource::<WorldTime>().now;
    let mut registry = world.resource_mut::<AnimationRegistry>();
    let anim = registry.get_mut(id).ok_or_else(|| unknown(id))?;
    anim.pause(now);
    Ok(())
}

/// Jump `id` to its end value and fire its `on_finish` hook.
///
/// Returns `Ok(false)` when the animation was not running.
pub fn finish_animation(world: &mut World, id: AnimationId) -> FrameworkResult<bool> {
    let now = world.resource::<WorldTime>().now;
    let mut fired = Vec::new();
    let finished = world.resource_scope(
        |world, mut registry: Mut<AnimationRegistry>| -> FrameworkResult<bool> {
            let anim = registry.get_mut(id).ok_or_else(|| unknown(id))?;
            let finished = anim.finish(world, now)?;
            if finished {
                if let Some(h) = &anim.on_update {
                    fired.push(Fired::Update(h.clone(), id, anim.value));
                }
                if let Some(h) = &anim.on_finish {
                    fired.push(Fired::Finish(h.clone(), id));
                }
            }
            Ok(finished)
        },
    )?;
    run_hooks(world, fired);
    Ok(finished)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::animations::{Animation, SharedValue};

    fn world() -> World {
        let mut world = World::new();
        world.init_resource::<AnimationRegistry>();
        world.init_resource::<WorldTime>();
        world
    }

    fn set_now(world: &mut World, now: f64) {
        world.resource_mut::<WorldTime>().now = now;
    }

    #[test]
    fn test_ease_endpoints_and_midpoint() {
        for e in [0.5, 1.0, 2.0, 3.0] {
            assert_eq!(ease(0.0, e), 0.0);
            assert_eq!(ease(1.0, e), 1.0);
            assert!((ease(0.5, e) - 0.5).abs() < 1e-6);
        }
        assert!((ease(0.25, 2.0) - 0.125).abs() < 1e-6);
        assert!((ease(0.75, 2.0) - 0.875).abs() < 1e-6);
        assert_eq!(ease(0.3, 1.0), 0.3);
    }

    #[test]
    fn test_system_converges_and_fires_finish_once() {
        #[derive(Resource, Default)]
        struct Done(u32);

        let mut world = world();
        world.init_resource::<Done>();
        let v = SharedValue::new(0.0);
        let id = world.resource_mut::<AnimationRegistry>().add(
            Animation::new(100.0)
                .target(v.clone())
                .end_at(10.0)
                .on_finish(|w, _| w.resource_mut::<Done>().0 += 1),
        );
        start_animation(&mut world, id, false).unwrap();

        let mut schedule = Schedule::default();
        schedule.add_systems(animation_system);
        for t in [16.0, 50.0, 99.0, 120.0, 140.0] {
            set_now(&mut world, t);
            schedule.run(&mut world);
        }
        assert_eq!(v.get(), 10.0);
        assert_eq!(world.resource::<Done>().0, 1);
        let reg = world.resource::<AnimationRegistry>();
        assert!(!reg.get(id).unwrap().running);
        assert_eq!(reg.get(id).unwrap().progress, 1.0);
    }

    #[test]
    fn test_finish_hook_can_chain_another_animation() {
        let mut world = world();
        let v = SharedValue::new(0.0);
        let second = world
            .resource_mut::<AnimationRegistry>()
            .add(Animation::new(100.0).target(v.clone()).end_at(0.0));
        let first = world.resource_mut::<AnimationRegistry>().add(
            Animation::new(100.0)
                .target(v.clone())
                .end_at(50.0)
                .on_finish(move |w, _| {
                    start_animation(w, second, false).unwrap();
                }),
        );
        start_animation(&mut world, first, false).unwrap();
        set_now(&mut world, 100.0);
        animation_system(&mut world);
        assert_eq!(v.get(), 50.0);
        assert!(world.resource::<AnimationRegistry>().get(second).unwrap().running);

        set_now(&mut world, 150.0);
        animation_system(&mut world);
        assert!((v.get() - 25.0).abs() < 1e-4);
    }

    #[test]
    fn test_failure_is_isolated() {
        #[derive(Component)]
        struct Gauge(f32);

        let mut world = world();
        let e = world.spawn(Gauge(0.0)).id();
        let good = SharedValue::new(0.0);
        let (bad_id, good_id) = {
            let mut reg = world.resource_mut::<AnimationRegistry>();
            let bad = reg.add(
                Animation::new(100.0)
                    .target(crate::resources::animations::ComponentField::<Gauge>::new(
                        e,
                        "0",
                        |g| g.0,
                        |g, v| g.0 = v,
                    ))
                    .end_at(1.0),
            );
            let good_id = reg.add(Animation::new(100.0).target(good.clone()).end_at(1.0));
            (bad, good_id)
        };
        start_animation(&mut world, bad_id, false).unwrap();
        start_animation(&mut world, good_id, false).unwrap();
        world.despawn(e);

        set_now(&mut world, 50.0);
        animation_system(&mut world);
        assert!((good.get() - 0.5).abs() < 1e-6);
        let reg = world.resource::<AnimationRegistry>();
        assert!(!reg.get(bad_id).unwrap().running);
        assert!(reg.get(good_id).unwrap().running);
    }

    #[test]
    fn test_world_finish_and_unknown_ids() {
        let mut world = world();
        let v = SharedValue::new(1.0);
        let id = world
            .resource_mut::<AnimationRegistry>()
            .add(Animation::new(1000.0).target(v.clone()).end_at(2.0));
        assert!(!finish_animation(&mut world, id).unwrap());
        start_animation(&mut world, id, false).unwrap();
        pause_animation(&mut world, id).unwrap();
        start_animation(&mut world, id, false).unwrap();
        assert!(finish_animation(&mut world, id).unwrap());
        assert_eq!(v.get(), 2.0);
        assert!(matches!(
            start_animation(&mut world, AnimationId(99), false),
            Err(FrameworkError::ArgumentType(_))
        ));
    }
}
