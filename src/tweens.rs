//! Multi-field animation helpers on [`Scene`].
//!
//! Each helper builds one [`Animation`] per numeric component of the
//! property (x and y of a position, the four channels of a color, ...),
//! gives all of them the same duration and easing, starts them at the same
//! clock time and attaches the caller's `on_finish` only to the last one.
//! The returned id is that last animation.

use bevy_ecs::component::Mutable;
use bevy_ecs::prelude::*;
use std::sync::Arc;

use crate::components::identity::EntityId;
use crate::components::position::{Position, Radius, Size};
use crate::components::rotation::Rotation;
use crate::components::shape::Label;
use crate::components::tint::Tint;
use crate::error::{FrameworkError, FrameworkResult};
use crate::resources::animations::{
    Animation, AnimationId, AnimationRegistry, ComponentField, FinishHook, TweenTarget,
};
use crate::scene::Scene;
use crate::types::{Rgba, Vector2};

/// Shared settings of a helper call.
#[derive(Clone)]
pub struct TweenOptions {
    /// Milliseconds.
    pub duration: f64,
    /// Easing exponent, `1.0` is linear.
    pub ease: f32,
    pub on_finish: Option<FinishHook>,
}

impl TweenOptions {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            ease: 1.0,
            on_finish: None,
        }
    }

    pub fn ease(mut self, exponent: f32) -> Self {
        self.ease = exponent;
        self
    }

    pub fn on_finish(
        mut self,
        f: impl Fn(&mut World, AnimationId) + Send + Sync + 'static,
    ) -> Self {
        self.on_finish = Some(Arc::new(f));
        self
    }
}

type Read<C> = fn(&C) -> f32;
type Write<C> = fn(&mut C, f32);

/// One animated component of a property.
struct Field<C> {
    name: &'static str,
    read: Read<C>,
    write: Write<C>,
    end: f32,
    /// Overrides the shared easing (used by `curve_to` for its linear axis).
    ease: Option<f32>,
}

impl<C> Field<C> {
    fn new(name: &'static str, read: Read<C>, write: Write<C>, end: f32) -> Self {
        Self {
            name,
            read,
            write,
            end,
            ease: None,
        }
    }
}

const TINT_CHANNELS: [(&str, Read<Tint>, Write<Tint>); 4] = [
    ("r", |t| t.color.r as f32, |t, v| {
        t.color.set_channel_f32(0, v);
    }),
    ("g", |t| t.color.g as f32, |t, v| {
        t.color.set_channel_f32(1, v);
    }),
    ("b", |t| t.color.b as f32, |t, v| {
        t.color.set_channel_f32(2, v);
    }),
    ("a", |t| t.color.a as f32, |t, v| {
        t.color.set_channel_f32(3, v);
    }),
];

const LABEL_CHANNELS: [(&str, Read<Label>, Write<Label>); 4] = [
    ("color.r", |l| l.color.r as f32, |l, v| {
        l.color.set_channel_f32(0, v);
    }),
    ("color.g", |l| l.color.g as f32, |l, v| {
        l.color.set_channel_f32(1, v);
    }),
    ("color.b", |l| l.color.b as f32, |l, v| {
        l.color.set_channel_f32(2, v);
    }),
    ("color.a", |l| l.color.a as f32, |l, v| {
        l.color.set_channel_f32(3, v);
    }),
];

fn color_fields<C>(channels: [(&'static str, Read<C>, Write<C>); 4], to: Rgba) -> Vec<Field<C>> {
    let ends = [to.r, to.g, to.b, to.a];
    channels
        .into_iter()
        .zip(ends)
        .map(|((name, read, write), end)| Field::new(name, read, write, end as f32))
        .collect()
}

fn finite(op: &str, v: Vector2) -> FrameworkResult<Vector2> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(FrameworkError::argument(format!(
            "{op}: expected finite numbers, got ({}, {})",
            v.x, v.y
        )))
    }
}

impl Scene {
    /// Animate the entity's position to `to`.
    pub fn move_to(
        &mut self,
        id: EntityId,
        to: Vector2,
        opts: TweenOptions,
    ) -> FrameworkResult<AnimationId> {
        let to = finite("move_to", to)?;
        self.tween_fields::<Position>(
            "move_to",
            id,
            vec![
                Field::<Position>::new("pos.x", |p| p.pos.x, |p, v| p.pos.x = v, to.x),
                Field::<Position>::new("pos.y", |p| p.pos.y, |p, v| p.pos.y = v, to.y),
            ],
            opts,
        )
    }

    /// Like [`move_to`](Self::move_to) but only the y axis is eased, which
    /// bends the path.
    pub fn curve_to(
        &mut self,
        id: EntityId,
        to: Vector2,
        opts: TweenOptions,
    ) -> FrameworkResult<AnimationId> {
        let to = finite("curve_to", to)?;
        let mut x = Field::<Position>::new("pos.x", |p| p.pos.x, |p, v| p.pos.x = v, to.x);
        x.ease = Some(1.0);
        self.tween_fields::<Position>(
            "curve_to",
            id,
            vec![x, Field::<Position>::new("pos.y", |p| p.pos.y, |p, v| p.pos.y = v, to.y)],
            opts,
        )
    }

    /// Animate the fill color; the alpha channel's animation is returned.
    pub fn color_to(
        &mut self,
        id: EntityId,
        to: Rgba,
        opts: TweenOptions,
    ) -> FrameworkResult<AnimationId> {
        self.tween_fields::<Tint>("color_to", id, color_fields(TINT_CHANNELS, to), opts)
    }

    /// Animate the label color of a button, checkbox or text graphic.
    pub fn text_color_to(
        &mut self,
        id: EntityId,
        to: Rgba,
        opts: TweenOptions,
    ) -> FrameworkResult<AnimationId> {
        self.tween_fields::<Label>("text_color_to", id, color_fields(LABEL_CHANNELS, to), opts)
    }

    pub fn size_to(
        &mut self,
        id: EntityId,
        to: Vector2,
        opts: TweenOptions,
    ) -> FrameworkResult<AnimationId> {
        let to = finite("size_to", to)?;
        if to.x < 0.0 || to.y < 0.0 {
            return Err(FrameworkError::argument(format!(
                "size_to: size must not be negative, got ({}, {})",
                to.x, to.y
            )));
        }
        self.tween_fields::<Size>(
            "size_to",
            id,
            vec![
                Field::<Size>::new("size.x", |s| s.size.x, |s, v| s.size.x = v, to.x),
                Field::<Size>::new("size.y", |s| s.size.y, |s, v| s.size.y = v, to.y),
            ],
            opts,
        )
    }

    /// Animate the rotation angle, in the entity's own angle unit.
    pub fn rotate_to(
        &mut self,
        id: EntityId,
        angle: f32,
        opts: TweenOptions,
    ) -> FrameworkResult<AnimationId> {
        if !angle.is_finite() {
            return Err(FrameworkError::argument("rotate_to: angle must be finite"));
        }
        self.tween_fields::<Rotation>(
            "rotate_to",
            id,
            vec![Field::<Rotation>::new("angle", |r| r.angle, |r, v| r.angle = v, angle)],
            opts,
        )
    }

    pub fn radius_to(
        &mut self,
        id: EntityId,
        radius: f32,
        opts: TweenOptions,
    ) -> FrameworkResult<AnimationId> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(FrameworkError::argument(format!(
                "radius_to: radius must be a non-negative number, got {radius}"
            )));
        }
        self.tween_fields::<Radius>(
            "radius_to",
            id,
            vec![Field::<Radius>::new("radius", |r| r.radius, |r, v| r.radius = v, radius)],
            opts,
        )
    }

    /// Animate any [`TweenTarget`] (a [`SharedValue`](crate::resources::animations::SharedValue),
    /// a custom accessor) to `end`.
    pub fn animate(
        &mut self,
        target: impl TweenTarget + 'static,
        end: f32,
        opts: TweenOptions,
    ) -> FrameworkResult<AnimationId> {
        let mut anim = Animation::new(opts.duration)
            .target(target)
            .end_at(end)
            .ease(opts.ease);
        anim.on_finish = opts.on_finish;
        let id = self.add_animation(anim);
        self.start_animation(id, false)?;
        Ok(id)
    }

    fn tween_fields<C: Component<Mutability = Mutable>>(
        &mut self,
        op: &str,
        id: EntityId,
        fields: Vec<Field<C>>,
        opts: TweenOptions,
    ) -> FrameworkResult<AnimationId> {
        let entity = self
            .entity(id)
            .ok_or_else(|| FrameworkError::argument(format!("{op}: unknown entity {id}")))?;
        if self.world().get::<C>(entity).is_none() {
            return Err(FrameworkError::argument(format!(
                "{op}: entity {id} has no {}",
                std::any::type_name::<C>().rsplit("::").next().unwrap_or("component")
            )));
        }

        let count = fields.len();
        let mut added = Vec::with_capacity(count);
        for (i, f) in fields.into_iter().enumerate() {
            let mut anim = Animation::new(opts.duration)
                .target(ComponentField::<C>::new(entity, f.name, f.read, f.write))
                .end_at(f.end)
                .ease(f.ease.unwrap_or(opts.ease));
            if i + 1 == count {
                anim.on_finish = opts.on_finish.clone();
            }
            let anim_id = self.add_animation(anim);
            added.push(anim_id);
            if let Err(e) = self.start_animation(anim_id, false) {
                let mut registry = self.world_mut().resource_mut::<AnimationRegistry>();
                for a in &added {
                    registry.remove(*a);
                }
                return Err(e);
            }
        }
        added
            .last()
            .copied()
            .ok_or_else(|| FrameworkError::argument(format!("{op}: nothing to animate")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::recording::RecordingSurface;

    fn frame(scene: &mut Scene, now: f64) {
        let mut s = RecordingSurface::new(10.0, 10.0);
        scene.render_frame(now, &mut s);
    }

    #[test]
    fn test_move_to_halfway_and_exact_end() {
        let mut scene = Scene::default();
        let id = scene.spawn(Position::new(0.0, 0.0));
        scene
            .move_to(id, Vector2::new(100.0, 0.0), TweenOptions::new(1000.0))
            .unwrap();
        for t in (0..=500).step_by(16) {
            frame(&mut scene, t as f64);
        }
        frame(&mut scene, 500.0);
        assert!((scene.get::<Position>(id).unwrap().pos.x - 50.0).abs() < 0.01);
        frame(&mut scene, 1000.0);
        assert_eq!(scene.get::<Position>(id).unwrap().pos.x, 100.0);
        assert_eq!(scene.animations().running_count(), 0);
    }

    #[test]
    fn test_on_finish_only_on_last_component() {
        #[derive(Resource, Default)]
        struct Finished(Vec<AnimationId>);

        let mut scene = Scene::default();
        scene.world_mut().init_resource::<Finished>();
        let id = scene.spawn(Tint::default());
        let last = scene
            .color_to(
                id,
                Rgba::new(0, 0, 0, 0),
                TweenOptions::new(100.0).on_finish(|w, a| w.resource_mut::<Finished>().0.push(a)),
            )
            .unwrap();
        assert_eq!(scene.animations().len(), 4);
        frame(&mut scene, 200.0);
        assert_eq!(scene.world().resource::<Finished>().0, vec![last]);
        assert_eq!(scene.get::<Tint>(id).unwrap().color, Rgba::new(0, 0, 0, 0));
    }

    #[test]
    fn test_curve_to_eases_only_y() {
        let mut scene = Scene::default();
        let id = scene.spawn(Position::new(0.0, 0.0));
        scene
            .curve_to(id, Vector2::new(100.0, 100.0), TweenOptions::new(1000.0).ease(2.0))
            .unwrap();
        frame(&mut scene, 250.0);
        let pos = scene.get::<Position>(id).unwrap().pos;
        assert!((pos.x - 25.0).abs() < 1e-3);
        assert!((pos.y - 12.5).abs() < 1e-3);
    }

    #[test]
    fn test_helpers_reject_missing_component_and_bad_values() {
        let mut scene = Scene::default();
        let id = scene.spawn(Position::new(0.0, 0.0));
        assert!(matches!(
            scene.size_to(id, Vector2::new(5.0, 5.0), TweenOptions::new(10.0)),
            Err(FrameworkError::ArgumentType(_))
        ));
        assert!(matches!(
            scene.move_to(id, Vector2::new(f32::NAN, 0.0), TweenOptions::new(10.0)),
            Err(FrameworkError::ArgumentType(_))
        ));
        assert!(matches!(
            scene.move_to(id, Vector2::new(1.0, 0.0), TweenOptions::new(10.0).ease(0.0)),
            Err(FrameworkError::Configuration(_))
        ));
        assert!(scene.animations().is_empty());
        assert!(matches!(
            scene.radius_to(EntityId(42), 3.0, TweenOptions::new(10.0)),
            Err(FrameworkError::ArgumentType(_))
        ));
    }

    #[test]
    fn test_animate_shared_value() {
        let mut scene = Scene::default();
        let v = crate::resources::animations::SharedValue::new(10.0);
        scene.animate(v.clone(), 20.0, TweenOptions::new(100.0)).unwrap();
        frame(&mut scene, 50.0);
        assert!((v.get() - 15.0).abs() < 1e-4);
    }
}
