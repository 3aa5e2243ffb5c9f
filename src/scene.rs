//! The scene: one ECS world plus the tick and frame passes that run on it.
//!
//! A [`Scene`] is the context object both loops share. It owns the entity
//! registry, the animation registry, the input snapshot, the configuration
//! and the frame statistics as resources of a single [`World`]; two scenes
//! never share anything, so independent scenes can run side by side (in
//! tests, for instance).
//!
//! The host drives it with timestamps in milliseconds:
//!
//! - [`Scene::tick`] runs one think pass
//! - [`Scene::render_frame`] runs one render frame onto a [`Surface`]
//!
//! [`Scheduler`](crate::scheduler::Scheduler) decides when each is due.

use bevy_ecs::component::Mutable;
use bevy_ecs::prelude::*;
use crossbeam_channel::Sender;
use log::{debug, warn};
use std::time::Instant;

use crate::components::identity::{EntityId, Hierarchy};
use crate::error::{FrameworkError, FrameworkResult};
use crate::resources::animations::{Animation, AnimationId, AnimationRegistry};
use crate::resources::config::FrameworkConfig;
use crate::resources::frametiming::{FrameCallbacks, FrameTiming};
use crate::resources::input::{InputEvent, InputQueue, InputState};
use crate::resources::registry::{EntityRegistry, register_entity, remove_entity};
use crate::resources::worldtime::WorldTime;
use crate::surface::Surface;
use crate::systems::animation::{
    animation_system, finish_animation, pause_animation, start_animation,
};
use crate::systems::input::{drain_input_system, end_frame_input_system};
use crate::systems::render::{clear_surface, render_pass};
use crate::systems::think::{hovering, think_system};
use crate::systems::time::update_world_time;

pub struct Scene {
    world: World,
    /// Input drain + think pass.
    tick_schedule: Schedule,
    /// Input drain + animation pass, run before drawing.
    update_schedule: Schedule,
    /// Previous-frame input snapshot.
    end_frame_schedule: Schedule,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(FrameworkConfig::new())
    }
}

impl Scene {
    pub fn new(config: FrameworkConfig) -> Self {
        let mut world = World::new();
        world.insert_resource(FrameTiming::new(config.delta_samples));
        world.insert_resource(config);
        world.insert_resource(EntityRegistry::new());
        world.insert_resource(AnimationRegistry::default());
        world.insert_resource(InputQueue::default());
        world.insert_resource(InputState::default());
        world.insert_resource(WorldTime::default());
        world.insert_resource(FrameCallbacks::default());

        let mut tick_schedule = Schedule::default();
        tick_schedule.add_systems((drain_input_system, think_system).chain());

        let mut update_schedule = Schedule::default();
        update_schedule.add_systems((drain_input_system, animation_system).chain());

        let mut end_frame_schedule = Schedule::default();
        end_frame_schedule.add_systems(end_frame_input_system);

        for schedule in [
            &mut tick_schedule,
            &mut update_schedule,
            &mut end_frame_schedule,
        ] {
            if let Err(e) = schedule.initialize(&mut world) {
                warn!("Schedule initialization deferred to first run: {:?}", e);
            }
        }

        Self {
            world,
            tick_schedule,
            update_schedule,
            end_frame_schedule,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn config(&self) -> &FrameworkConfig {
        self.world.resource::<FrameworkConfig>()
    }

    /// Mutable configuration; fps and tick rate changes apply to the next iteration.
    pub fn config_mut(&mut self) -> Mut<'_, FrameworkConfig> {
        self.world.resource_mut::<FrameworkConfig>()
    }

    /// Sender half of the input channel, for the host's event source.
    pub fn input_sender(&self) -> Sender<InputEvent> {
        self.world.resource::<InputQueue>().tx.clone()
    }

    pub fn input(&self) -> &InputState {
        self.world.resource::<InputState>()
    }

    /// Scene clock in milliseconds.
    pub fn now(&self) -> f64 {
        self.world.resource::<WorldTime>().now
    }

    pub fn timing(&self) -> &FrameTiming {
        self.world.resource::<FrameTiming>()
    }

    // ---------------------------------------------------------------- entities

    /// Register a new entity made of `bundle`.
    pub fn spawn(&mut self, bundle: impl Bundle) -> EntityId {
        register_entity(&mut self.world, bundle)
    }

    /// Deregister and despawn `id`. Its id is never handed out again.
    pub fn remove(&mut self, id: EntityId) -> bool {
        remove_entity(&mut self.world, id)
    }

    pub fn entity(&self, id: EntityId) -> Option<Entity> {
        self.world.resource::<EntityRegistry>().get(id)
    }

    /// Registration-ordered ids of every live entity.
    pub fn ids(&self) -> Vec<EntityId> {
        self.world
            .resource::<EntityRegistry>()
            .iter()
            .map(|(id, _)| id)
            .collect()
    }

    pub fn get<C: Component>(&self, id: EntityId) -> Option<&C> {
        self.world.get::<C>(self.entity(id)?)
    }

    pub fn get_mut<C: Component<Mutability = Mutable>>(
        &mut self,
        id: EntityId,
    ) -> Option<Mut<'_, C>> {
        let entity = self.entity(id)?;
        self.world.get_mut::<C>(entity)
    }

    /// Insert (or replace) components on an existing entity.
    pub fn insert(&mut self, id: EntityId, bundle: impl Bundle) -> FrameworkResult<()> {
        let entity = self
            .entity(id)
            .ok_or_else(|| FrameworkError::argument(format!("insert: unknown entity {id}")))?;
        self.world.entity_mut(entity).insert(bundle);
        Ok(())
    }

    /// Make `child` a child of `parent`, detaching it from any previous parent.
    ///
    /// The link is informational: it does not affect drawing or thinking.
    pub fn attach(&mut self, parent: EntityId, child: EntityId) -> FrameworkResult<()> {
        if parent == child {
            return Err(FrameworkError::argument(format!(
                "attach: entity {id} cannot be its own parent",
                id = parent
            )));
        }
        let parent_e = self
            .entity(parent)
            .ok_or_else(|| FrameworkError::argument(format!("attach: unknown parent {parent}")))?;
        let child_e = self
            .entity(child)
            .ok_or_else(|| FrameworkError::argument(format!("attach: unknown child {child}")))?;

        let previous = self.world.get::<Hierarchy>(child_e).and_then(|h| h.parent);
        if let Some(old) = previous.and_then(|p| self.entity(p)) {
            if let Some(mut h) = self.world.get_mut::<Hierarchy>(old) {
                h.remove_child(child);
            }
        }

        let mut c = self.world.entity_mut(child_e);
        if !c.contains::<Hierarchy>() {
            c.insert(Hierarchy::default());
        }
        if let Some(mut h) = c.get_mut::<Hierarchy>() {
            h.parent = Some(parent);
        }
        let mut p = self.world.entity_mut(parent_e);
        if !p.contains::<Hierarchy>() {
            p.insert(Hierarchy::default());
        }
        if let Some(mut h) = p.get_mut::<Hierarchy>() {
            h.add_child(child);
        }
        debug!("Attached {} to {}", child, parent);
        Ok(())
    }

    /// Whether the pointer is over `id`; errors when it has no position or size.
    pub fn hovering(&self, id: EntityId) -> FrameworkResult<bool> {
        hovering(&self.world, id)
    }

    // -------------------------------------------------------------- animations

    /// Register `animation` without starting it.
    pub fn add_animation(&mut self, animation: Animation) -> AnimationId {
        self.world.resource_mut::<AnimationRegistry>().add(animation)
    }

    pub fn animation(&self, id: AnimationId) -> Option<&Animation> {
        self.world.resource::<AnimationRegistry>().get(id)
    }

    pub fn animations(&self) -> &AnimationRegistry {
        self.world.resource::<AnimationRegistry>()
    }

    pub fn start_animation(&mut self, id: AnimationId, restart: bool) -> FrameworkResult<()> {
        start_animation(&mut self.world, id, restart)
    }

    pub fn pause_animation(&mut self, id: AnimationId) -> FrameworkResult<()> {
        pause_animation(&mut self.world, id)
    }

    /// Jump to the end value; `Ok(false)` (with a warning) when not running.
    pub fn finish_animation(&mut self, id: AnimationId) -> FrameworkResult<bool> {
        finish_animation(&mut self.world, id)
    }

    /// Drop finished animations from the registry.
    pub fn prune_animations(&mut self) -> usize {
        self.world.resource_mut::<AnimationRegistry>().prune_finished()
    }

    // ------------------------------------------------------------------- loops

    /// Register a callback run at the end of every frame.
    pub fn on_frame(&mut self, f: impl Fn(&mut World, &FrameTiming) + Send + Sync + 'static) {
        self.world.resource_mut::<FrameCallbacks>().push(f);
    }

    /// Run one think pass at clock time `now` (ms).
    pub fn tick(&mut self, now: f64) {
        update_world_time(&mut self.world, now);
        self.world.resource_mut::<WorldTime>().ticks += 1;
        self.tick_schedule.run(&mut self.world);
        self.world.clear_trackers();
    }

    /// Run one render frame at clock time `now` (ms).
    ///
    /// Order: clear, advance animations, draw, record timing, frame
    /// callbacks, roll the input snapshot.
    pub fn render_frame(&mut self, now: f64, surface: &mut dyn Surface) {
        let started = Instant::now();
        update_world_time(&mut self.world, now);
        let now = self.now();
        self.world.resource_mut::<WorldTime>().frames += 1;
        self.world.resource_mut::<FrameTiming>().frame_start = now;

        clear_surface(&self.world, surface);
        self.update_schedule.run(&mut self.world);
        render_pass(&mut self.world, surface);

        let (fps, samples) = {
            let c = self.config();
            (c.fps, c.delta_samples)
        };
        let mut duration = started.elapsed().as_secs_f64() * 1000.0;
        let frame_end = now + duration;
        if fps > 0 {
            duration += 1000.0 / fps as f64;
        }
        let timing = {
            let mut timing = self.world.resource_mut::<FrameTiming>();
            if timing.capacity() != samples {
                timing.set_capacity(samples);
            }
            timing.frame_end = frame_end;
            timing.record(duration);
            timing.clone()
        };

        let callbacks = self.world.resource::<FrameCallbacks>().callbacks.clone();
        for cb in callbacks {
            cb(&mut self.world, &timing);
        }

        self.end_frame_schedule.run(&mut self.world);
        self.world.clear_trackers();
    }
}
