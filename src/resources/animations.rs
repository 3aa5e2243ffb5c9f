//! Numeric property animations and the registry that owns them.
//!
//! An [`Animation`] drives exactly one float reached through a
//! [`TweenTarget`] accessor. Animations are not entities: they live in the
//! [`AnimationRegistry`] resource, independent of the graphic they modify,
//! and are advanced once per render frame by
//! [`animation_system`](crate::systems::animation::animation_system).
//!
//! The lifecycle operations here are pure bookkeeping on one animation;
//! the world-level wrappers in [`crate::systems::animation`] also fire the
//! `on_update`/`on_finish` hooks once the registry borrow is released.

use bevy_ecs::component::Mutable;
use bevy_ecs::prelude::*;
use log::warn;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::{FrameworkError, FrameworkResult};
use crate::systems::animation::{ease, lerp_f32};

/// Registry key of an animation. Never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnimationId(pub u64);

impl fmt::Display for AnimationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "anim#{}", self.0)
    }
}

pub type FinishHook = Arc<dyn Fn(&mut World, AnimationId) + Send + Sync>;
pub type UpdateHook = Arc<dyn Fn(&mut World, AnimationId, f32) + Send + Sync>;

/// Accessor pair bound when the animation is created.
///
/// `get` returns `None` when the field is gone or not a finite number;
/// `set` returns `false` when it cannot be written.
pub trait TweenTarget: Send + Sync {
    fn get(&self, world: &World) -> Option<f32>;
    fn set(&self, world: &mut World, value: f32) -> bool;
    /// Human readable `object.field`, used in errors and logs.
    fn describe(&self) -> String;
}

/// A float inside component `C` of one entity.
pub struct ComponentField<C: Component<Mutability = Mutable>> {
    pub entity: Entity,
    pub field: &'static str,
    read: fn(&C) -> f32,
    write: fn(&mut C, f32),
}

impl<C: Component<Mutability = Mutable>> ComponentField<C> {
    pub fn new(
        entity: Entity,
        field: &'static str,
        read: fn(&C) -> f32,
        write: fn(&mut C, f32),
    ) -> Self {
        Self {
            entity,
            field,
            read,
            write,
        }
    }
}

impl<C: Component<Mutability = Mutable>> TweenTarget for ComponentField<C> {
    fn get(&self, world: &World) -> Option<f32> {
        world
            .get::<C>(self.entity)
            .map(self.read)
            .filter(|v| v.is_finite())
    }

    fn set(&self, world: &mut World, value: f32) -> bool {
        match world.get_mut::<C>(self.entity) {
            Some(mut c) => {
                (self.write)(&mut *c, value);
                true
            }
            None => false,
        }
    }

    fn describe(&self) -> String {
        format!(
            "{}.{} on {:?}",
            std::any::type_name::<C>()
                .rsplit("::")
                .next()
                .unwrap_or("component"),
            self.field,
            self.entity
        )
    }
}

/// A float shared between the animation and arbitrary host code.
#[derive(Clone, Default)]
pub struct SharedValue {
    bits: Arc<AtomicU32>,
}

impl SharedValue {
    pub fn new(value: f32) -> Self {
        Self {
            bits: Arc::new(AtomicU32::new(value.to_bits())),
        }
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }

    pub fn set(&self, value: f32) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }
}

impl fmt::Debug for SharedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedValue").field(&self.get()).finish()
    }
}

impl TweenTarget for SharedValue {
    fn get(&self, _world: &World) -> Option<f32> {
        Some(SharedValue::get(self)).filter(|v| v.is_finite())
    }

    fn set(&self, _world: &mut World, value: f32) -> bool {
        SharedValue::set(self, value);
        true
    }

    fn describe(&self) -> String {
        "shared value".to_string()
    }
}

/// Result of one [`Animation::update`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Step {
    /// Not running; nothing written.
    Idle,
    /// Interpolated value written to the target.
    Progressed(f32),
    /// Elapsed time reached the duration; the end value was written.
    Finished,
}

pub struct Animation {
    pub target: Option<Box<dyn TweenTarget>>,
    /// Start value. Resolved from the target on first start when `None`.
    pub start: Option<f32>,
    pub end: Option<f32>,
    /// Milliseconds.
    pub duration: f64,
    /// Easing exponent, `1.0` is linear.
    pub ease: f32,
    /// Raw `elapsed / duration`.
    pub progress: f32,
    /// Last value written to the target.
    pub value: f32,
    /// Milliseconds run so far; kept across a pause.
    pub elapsed: f64,
    pub running: bool,
    pub finished: bool,
    pub start_time: f64,
    pub finish_time: Option<f64>,
    pub on_update: Option<UpdateHook>,
    pub on_finish: Option<FinishHook>,
}

impl Animation {
    pub fn new(duration: f64) -> Self {
        Self {
            target: None,
            start: None,
            end: None,
            duration,
            ease: 1.0,
            progress: 0.0,
            value: 0.0,
            elapsed: 0.0,
            running: false,
            finished: false,
            start_time: 0.0,
            finish_time: None,
            on_update: None,
            on_finish: None,
        }
    }

    pub fn target(mut self, target: impl TweenTarget + 'static) -> Self {
        self.target = Some(Box::new(target));
        self
    }

    pub fn start_at(mut self, start: f32) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end_at(mut self, end: f32) -> Self {
        self.end = Some(end);
        self
    }

    pub fn ease(mut self, exponent: f32) -> Self {
        self.ease = exponent;
        self
    }

    pub fn on_update(
        mut self,
        f: impl Fn(&mut World, AnimationId, f32) + Send + Sync + 'static,
    ) -> Self {
        self.on_update = Some(Arc::new(f));
        self
    }

    pub fn on_finish(
        mut self,
        f: impl Fn(&mut World, AnimationId) + Send + Sync + 'static,
    ) -> Self {
        self.on_finish = Some(Arc::new(f));
        self
    }

    pub fn describe(&self) -> String {
        self.target
            .as_ref()
            .map(|t| t.describe())
            .unwrap_or_else(|| "<no target>".to_string())
    }

    /// Begin or resume.
    ///
    /// A paused animation (`elapsed > 0`) resumes where it stopped unless
    /// `restart` is set; a finished one always starts over. Starting a
    /// running animation without `restart` leaves it untouched.
    pub fn start(&mut self, world: &World, now: f64, restart: bool) -> FrameworkResult<()> {
        if self.running && !restart {
            return Ok(());
        }
        let target = self
            .target
            .as_ref()
            .ok_or_else(|| FrameworkError::configuration("animation has no target"))?;
        let current = target.get(world).ok_or_else(|| {
            FrameworkError::configuration(format!("{} is not a numeric field", target.describe()))
        })?;
        let end = self
            .end
            .filter(|e| e.is_finite())
            .ok_or_else(|| FrameworkError::configuration("animation end must be a finite number"))?;
        if let Some(start) = self.start {
            if !start.is_finite() {
                return Err(FrameworkError::configuration(
                    "animation start must be a finite number",
                ));
            }
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(FrameworkError::configuration(format!(
                "animation duration must be a non-negative number, got {}",
                self.duration
            )));
        }
        if !self.ease.is_finite() || self.ease <= 0.0 {
            return Err(FrameworkError::configuration(format!(
                "easing exponent must be positive, got {}",
                self.ease
            )));
        }

        let start = *self.start.get_or_insert(current);
        self.end = Some(end);

        if restart || self.finished || self.elapsed <= 0.0 {
            self.elapsed = 0.0;
            self.progress = 0.0;
            self.value = start;
            self.finished = false;
            self.finish_time = None;
            self.start_time = now;
        } else {
            self.start_time = now - self.elapsed;
        }
        self.running = true;
        Ok(())
    }

    pub fn pause(&mut self, now: f64) {
        if !self.running {
            return;
        }
        self.running = false;
        self.elapsed = now - self.start_time;
    }

    /// Advance to `now` and write the interpolated value.
    ///
    /// On a [`FrameworkError::TypeAssertion`] the animation is stopped.
    pub fn update(&mut self, world: &mut World, now: f64) -> FrameworkResult<Step> {
        if !self.running {
            return Ok(Step::Idle);
        }
        self.elapsed = now - self.start_time;
        self.progress = if self.duration > 0.0 {
            (self.elapsed / self.duration) as f32
        } else {
            1.0
        };
        if self.elapsed >= self.duration {
            return self.finish(world, now).map(|_| Step::Finished);
        }

        let (start, end) = self.bounds();
        let value = lerp_f32(start, end, ease(self.progress, self.ease));
        if !self.write(world, value) {
            self.running = false;
            return Err(FrameworkError::type_assertion(format!(
                "{} is no longer a numeric field",
                self.describe()
            )));
        }
        self.value = value;
        Ok(Step::Progressed(value))
    }

    /// Jump to the end value. Returns `false` (and warns) when not running.
    pub fn finish(&mut self, world: &mut World, now: f64) -> FrameworkResult<bool> {
        if !self.running {
            warn!("finish() called on idle animation {}", self.describe());
            return Ok(false);
        }
        let (_, end) = self.bounds();
        self.running = false;
        self.finished = true;
        self.progress = 1.0;
        self.finish_time = Some(now);
        if !self.write(world, end) {
            return Err(FrameworkError::type_assertion(format!(
                "{} is no longer a numeric field",
                self.describe()
            )));
        }
        self.value = end;
        Ok(true)
    }

    fn bounds(&self) -> (f32, f32) {
        let end = self.end.unwrap_or(0.0);
        (self.start.unwrap_or(end), end)
    }

    fn write(&self, world: &mut World, value: f32) -> bool {
        match &self.target {
            Some(t) => t.get(world).is_some() && t.set(world, value),
            None => false,
        }
    }
}

impl fmt::Debug for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animation")
            .field("target", &self.describe())
            .field("start", &self.start)
            .field("end", &self.end)
            .field("duration", &self.duration)
            .field("ease", &self.ease)
            .field("progress", &self.progress)
            .field("running", &self.running)
            .field("finished", &self.finished)
            .finish()
    }
}

/// Owns every animation for the lifetime of the scene.
#[derive(Resource, Default, Debug)]
pub struct AnimationRegistry {
    next: u64,
    entries: BTreeMap<AnimationId, Animation>,
}

impl AnimationRegistry {
    pub fn add(&mut self, animation: Animation) -> AnimationId {
        let id = AnimationId(self.next);
        self.next += 1;
        self.entries.insert(id, animation);
        id
    }

    pub fn get(&self, id: AnimationId) -> Option<&Animation> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: AnimationId) -> Option<&mut Animation> {
        self.entries.get_mut(&id)
    }

    pub fn remove(&mut self, id: AnimationId) -> Option<Animation> {
        self.entries.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (AnimationId, &Animation)> {
        self.entries.iter().map(|(id, a)| (*id, a))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (AnimationId, &mut Animation)> {
        self.entries.iter_mut().map(|(id, a)| (*id, a))
    }

    pub fn running_count(&self) -> usize {
        self.entries.values().filter(|a| a.running).count()
    }

    /// Drop finished animations, returning how many were removed.
    pub fn prune_finished(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, a| !a.finished);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn shared_anim(value: &SharedValue, end: f32, duration: f64) -> Animation {
        Animation::new(duration).target(value.clone()).end_at(end)
    }

    #[test]
    fn test_start_without_target_is_configuration_error() {
        let world = World::new();
        let mut a = Animation::new(100.0).end_at(1.0);
        assert!(matches!(
            a.start(&world, 0.0, false),
            Err(FrameworkError::Configuration(_))
        ));
        assert!(!a.running);
    }

    #[test]
    fn test_start_without_end_is_configuration_error() {
        let world = World::new();
        let mut a = Animation::new(100.0).target(SharedValue::new(0.0));
        assert!(matches!(
            a.start(&world, 0.0, false),
            Err(FrameworkError::Configuration(_))
        ));
    }

    #[test]
    fn test_start_rejects_non_finite_bounds() {
        let world = World::new();
        let v = SharedValue::new(0.0);
        let mut a = shared_anim(&v, f32::NAN, 100.0);
        assert!(a.start(&world, 0.0, false).is_err());
        let mut a = shared_anim(&v, 1.0, 100.0).start_at(f32::INFINITY);
        assert!(a.start(&world, 0.0, false).is_err());
        let mut a = shared_anim(&v, 1.0, -5.0);
        assert!(a.start(&world, 0.0, false).is_err());
    }

    #[test]
    fn test_start_reads_current_value_as_start() {
        let world = World::new();
        let v = SharedValue::new(7.0);
        let mut a = shared_anim(&v, 10.0, 100.0);
        a.start(&world, 0.0, false).unwrap();
        assert_eq!(a.start, Some(7.0));
        assert!(a.running);
    }

    #[test]
    fn test_linear_interpolation() {
        let mut world = World::new();
        let v = SharedValue::new(0.0);
        let mut a = shared_anim(&v, 100.0, 1000.0);
        a.start(&world, 0.0, false).unwrap();
        for t in [0.0, 100.0, 250.0, 500.0, 999.0] {
            let step = a.update(&mut world, t).unwrap();
            assert_eq!(step, Step::Progressed(v.get()));
            assert!(approx_eq(v.get(), (t / 1000.0 * 100.0) as f32));
        }
    }

    #[test]
    fn test_finish_writes_exact_end() {
        let mut world = World::new();
        let v = SharedValue::new(0.1);
        let mut a = shared_anim(&v, 0.3, 30.0);
        a.start(&world, 0.0, false).unwrap();
        a.update(&mut world, 10.0).unwrap();
        assert_eq!(a.update(&mut world, 45.0).unwrap(), Step::Finished);
        assert_eq!(v.get(), 0.3);
        assert_eq!(a.progress, 1.0);
        assert!(!a.running);
        assert!(a.finished);
        assert_eq!(a.finish_time, Some(45.0));
        assert_eq!(a.update(&mut world, 50.0).unwrap(), Step::Idle);
    }

    #[test]
    fn test_finish_on_idle_is_noop() {
        let mut world = World::new();
        let v = SharedValue::new(0.0);
        let mut a = shared_anim(&v, 5.0, 10.0);
        assert!(!a.finish(&mut world, 0.0).unwrap());
        assert_eq!(v.get(), 0.0);
        assert!(!a.finished);
    }

    #[test]
    fn test_pause_resume_continues_progress() {
        let mut world = World::new();
        let v = SharedValue::new(0.0);
        let mut a = shared_anim(&v, 100.0, 1000.0);
        a.start(&world, 0.0, false).unwrap();
        a.update(&mut world, 300.0).unwrap();
        a.pause(300.0);
        assert!(!a.running);
        assert_eq!(a.elapsed, 300.0);
        // Nothing moves while paused.
        assert_eq!(a.update(&mut world, 800.0).unwrap(), Step::Idle);
        a.start(&world, 5000.0, false).unwrap();
        a.update(&mut world, 5000.0).unwrap();
        assert!(approx_eq(v.get(), 30.0));
        a.update(&mut world, 5200.0).unwrap();
        assert!(approx_eq(v.get(), 50.0));
    }

    #[test]
    fn test_start_while_running_keeps_progress() {
        let mut world = World::new();
        let v = SharedValue::new(0.0);
        let mut a = shared_anim(&v, 100.0, 1000.0);
        a.start(&world, 0.0, false).unwrap();
        a.update(&mut world, 100.0).unwrap();
        a.update(&mut world, 600.0).unwrap();
        assert!(approx_eq(v.get(), 60.0));
        a.start(&world, 800.0, false).unwrap();
        assert_eq!(a.start_time, 0.0);
        a.update(&mut world, 900.0).unwrap();
        assert!(approx_eq(v.get(), 90.0));
    }

    #[test]
    fn test_restart_resets_progress() {
        let mut world = World::new();
        let v = SharedValue::new(0.0);
        let mut a = shared_anim(&v, 100.0, 1000.0);
        a.start(&world, 0.0, false).unwrap();
        a.update(&mut world, 600.0).unwrap();
        a.pause(600.0);
        a.start(&world, 1000.0, true).unwrap();
        a.update(&mut world, 1100.0).unwrap();
        assert!(approx_eq(v.get(), 10.0));
    }

    #[test]
    fn test_zero_duration_finishes_on_first_update() {
        let mut world = World::new();
        let v = SharedValue::new(3.0);
        let mut a = shared_anim(&v, 9.0, 0.0);
        a.start(&world, 0.0, false).unwrap();
        assert_eq!(a.update(&mut world, 0.0).unwrap(), Step::Finished);
        assert_eq!(v.get(), 9.0);
    }

    #[derive(Component)]
    struct Meter {
        level: f32,
    }

    #[test]
    fn test_component_field_target() {
        let mut world = World::new();
        let e = world.spawn(Meter { level: 2.0 }).id();
        let target =
            ComponentField::<Meter>::new(e, "level", |m| m.level, |m, v| m.level = v);
        assert_eq!(target.get(&world), Some(2.0));
        assert!(target.set(&mut world, 4.0));
        assert_eq!(world.get::<Meter>(e).unwrap().level, 4.0);
        assert!(target.describe().contains("Meter.level"));
    }

    #[test]
    fn test_update_fails_when_target_disappears() {
        let mut world = World::new();
        let e = world.spawn(Meter { level: 0.0 }).id();
        let mut a = Animation::new(100.0)
            .target(ComponentField::<Meter>::new(
                e,
                "level",
                |m| m.level,
                |m, v| m.level = v,
            ))
            .end_at(1.0);
        a.start(&world, 0.0, false).unwrap();
        world.despawn(e);
        assert!(matches!(
            a.update(&mut world, 10.0),
            Err(FrameworkError::TypeAssertion(_))
        ));
        assert!(!a.running);
    }

    #[test]
    fn test_registry_ids_and_prune() {
        let mut world = World::new();
        let v = SharedValue::new(0.0);
        let mut reg = AnimationRegistry::default();
        let a = reg.add(shared_anim(&v, 1.0, 0.0));
        let b = reg.add(shared_anim(&v, 2.0, 100.0));
        assert_eq!((a, b), (AnimationId(0), AnimationId(1)));
        reg.get_mut(a).unwrap().start(&world, 0.0, false).unwrap();
        reg.get_mut(b).unwrap().start(&world, 0.0, false).unwrap();
        assert_eq!(reg.running_count(), 2);
        reg.get_mut(a).unwrap().update(&mut world, 1.0).unwrap();
        assert_eq!(reg.running_count(), 1);
        assert_eq!(reg.prune_finished(), 1);
        assert!(reg.get(a).is_none());
        assert_eq!(reg.add(shared_anim(&v, 3.0, 1.0)), AnimationId(2));
    }
}
