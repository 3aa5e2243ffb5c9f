//! Think pass: hover/press detection.
//!
//! Every enabled entity carrying a [`Hover`] component runs a small state
//! machine each tick:
//!
//! ```text
//! Idle --pointer over--> Hovered --pointer down--> HoveredAndPressed
//!  ^                        |  ^                          |
//!  +-----pointer leaves-----+  +------pointer released----+
//! ```
//!
//! Entities are visited in registry order. Hooks are cloned out of
//! [`PointerHooks`] and called with the whole world after the entity's
//! bookkeeping has been written back, so a hook may freely mutate other
//! entities, start animations or despawn things.
//!
//! When several hoverable entities overlap under the pointer the
//! configured [`HoverPolicy`] decides: `Topmost` keeps only the last
//! registered one (the one drawn on top), `All` hovers every one.

use bevy_ecs::prelude::*;
use smallvec::SmallVec;

use crate::components::identity::{Enabled, EntityId};
use crate::components::pointer::{HeldHook, Hook, Hover, PointerHooks};
use crate::components::position::{Position, Size};
use crate::components::shape::Shape;
use crate::error::{FrameworkError, FrameworkResult};
use crate::resources::config::{FrameworkConfig, HoverPolicy};
use crate::resources::input::InputState;
use crate::resources::registry::EntityRegistry;
use crate::resources::worldtime::WorldTime;
use crate::types::Vector2;

enum Fire {
    Edge(Hook),
    Held(HeldHook, f64),
}

/// Run one tick of the hover/press state machine over all entities.
pub fn think_system(world: &mut World) {
    let now = world.resource::<WorldTime>().now;
    let policy = world
        .get_resource::<FrameworkConfig>()
        .map(|c| c.hover_policy)
        .unwrap_or_default();
    let (pointer, down) = {
        let input = world.resource::<InputState>();
        (input.pointer, input.pointer_down())
    };

    let order = world.resource::<EntityRegistry>().snapshot();
    let mut thinkers: Vec<(EntityId, Entity, bool)> = Vec::with_capacity(order.len());
    let mut stale: Vec<Entity> = Vec::new();
    for (id, entity) in order {
        let Ok(e) = world.get_entity(entity) else {
            continue;
        };
        let Some(hover) = e.get::<Hover>() else {
            continue;
        };
        if !e.get::<Enabled>().is_none_or(|en| en.0) {
            // Disabled entities do not think but must not stay hovered.
            if !hover.is_idle() {
                stale.push(entity);
            }
            continue;
        }
        let over = match (e.get::<Position>(), e.get::<Size>()) {
            (Some(p), Some(s)) => Vector2::in_range(pointer, p.pos, s.size),
            // Not hoverable: always idle.
            _ => false,
        };
        thinkers.push((id, entity, over));
    }
    for entity in stale {
        if let Some(mut hover) = world.get_mut::<Hover>(entity) {
            hover.clear();
        }
    }

    if policy == HoverPolicy::Topmost {
        if let Some(top) = thinkers.iter().rposition(|(_, _, over)| *over) {
            for (i, t) in thinkers.iter_mut().enumerate() {
                t.2 = i == top;
            }
        }
    }

    for (id, entity, over) in thinkers {
        think(world, id, entity, over, down, now);
    }
}

/// Advance one entity's state machine and fire its hooks.
fn think(world: &mut World, id: EntityId, entity: Entity, over: bool, down: bool, now: f64) {
    // A hook fired earlier in this tick may have despawned or disabled it.
    let Some(mut hover) = world.get::<Hover>(entity).copied() else {
        return;
    };
    if !world.get::<Enabled>(entity).is_none_or(|en| en.0) {
        return;
    }
    let hooks = world.get::<PointerHooks>(entity).cloned().unwrap_or_default();
    let mut fire: SmallVec<[Fire; 4]> = SmallVec::new();
    let mut toggle = false;

    if over {
        if !hover.hovered {
            hover.hovered = true;
            hover.hover_start = now;
            fire.extend(hooks.on_hover_start.clone().map(Fire::Edge));
        }
        if let Some(h) = &hooks.while_hovered {
            fire.push(Fire::Held(h.clone(), now - hover.hover_start));
        }

        if down {
            if !hover.down {
                hover.down = true;
                hover.down_start = now;
                fire.extend(hooks.on_mouse_down.clone().map(Fire::Edge));
            }
            if let Some(h) = &hooks.while_mouse_down {
                fire.push(Fire::Held(h.clone(), now - hover.down_start));
            }
        } else if hover.down {
            hover.down = false;
            hover.down_start = 0.0;
            toggle = true;
            fire.extend(hooks.on_mouse_up.clone().map(Fire::Edge));
        }
    } else if !hover.is_idle() {
        if hover.hovered {
            fire.extend(hooks.on_hover_stop.clone().map(Fire::Edge));
        }
        if hover.down {
            fire.extend(hooks.on_mouse_up.clone().map(Fire::Edge));
        }
        hover.clear();
    }

    if let Some(mut h) = world.get_mut::<Hover>(entity) {
        *h = hover;
    }
    if toggle {
        if let Some(mut shape) = world.get_mut::<Shape>(entity) {
            if let Shape::CheckBox { checked, .. } = &mut *shape {
                *checked = !*checked;
            }
        }
    }

    for f in fire {
        match f {
            Fire::Edge(hook) => hook(world, id),
            Fire::Held(hook, held) => hook(world, id, held),
        }
    }
}

/// Whether the pointer is currently over `id`.
///
/// Unlike the think pass this is strict: an entity without a position or a
/// size cannot be asked.
pub fn hovering(world: &World, id: EntityId) -> FrameworkResult<bool> {
    let entity = world
        .resource::<EntityRegistry>()
        .get(id)
        .ok_or_else(|| FrameworkError::argument(format!("hovering: unknown entity {id}")))?;
    let pos = world.get::<Position>(entity).ok_or_else(|| {
        FrameworkError::argument(format!("hovering: entity {id} has no position"))
    })?;
    let size = world
        .get::<Size>(entity)
        .ok_or_else(|| FrameworkError::argument(format!("hovering: entity {id} has no size")))?;
    Ok(world.resource::<InputState>().hovering(pos.pos, size.size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::input::{InputEvent, MouseButton};
    use crate::resources::registry::register_entity;

    #[derive(Resource, Default)]
    struct Calls(Vec<(&'static str, EntityId)>);

    fn world() -> World {
        let mut world = World::new();
        world.init_resource::<EntityRegistry>();
        world.init_resource::<InputState>();
        world.init_resource::<WorldTime>();
        world.init_resource::<FrameworkConfig>();
        world.init_resource::<Calls>();
        world
    }

    fn recording_hooks() -> PointerHooks {
        let rec = |name: &'static str| {
            move |w: &mut World, id: EntityId| w.resource_mut::<Calls>().0.push((name, id))
        };
        PointerHooks::new()
            .on_hover_start(rec("hover_start"))
            .on_hover_stop(rec("hover_stop"))
            .on_mouse_down(rec("mouse_down"))
            .on_mouse_up(rec("mouse_up"))
            .while_hovered(|w, id, _| w.resource_mut::<Calls>().0.push(("while_hovered", id)))
            .while_mouse_down(|w, id, _| {
                w.resource_mut::<Calls>().0.push(("while_mouse_down", id))
            })
    }

    fn spawn_box(world: &mut World, x: f32, y: f32, w: f32, h: f32) -> EntityId {
        register_entity(
            world,
            (
                Position::new(x, y),
                Size::new(w, h),
                Enabled(true),
                Hover::default(),
                recording_hooks(),
            ),
        )
    }

    fn hover_of(world: &World, id: EntityId) -> Hover {
        let e = world.resource::<EntityRegistry>().get(id).unwrap();
        *world.get::<Hover>(e).unwrap()
    }

    fn tick(world: &mut World, now: f64) {
        world.resource_mut::<WorldTime>().now = now;
        think_system(world);
    }

    fn count(world: &World, name: &str) -> usize {
        world.resource::<Calls>().0.iter().filter(|(n, _)| *n == name).count()
    }

    #[test]
    fn test_press_then_leave_fires_stop_then_release() {
        let mut world = world();
        let id = spawn_box(&mut world, 10.0, 10.0, 20.0, 20.0);
        {
            let mut input = world.resource_mut::<InputState>();
            input.apply(InputEvent::PointerMove { x: 15.0, y: 15.0 });
            input.apply(InputEvent::PointerDown(MouseButton::Left));
        }
        tick(&mut world, 100.0);
        let h = hover_of(&world, id);
        assert!(h.hovered && h.down);
        assert_eq!(h.down_start, 100.0);

        world
            .resource_mut::<InputState>()
            .apply(InputEvent::PointerMove { x: 100.0, y: 100.0 });
        tick(&mut world, 115.0);
        assert_eq!(hover_of(&world, id), Hover::default());
        assert_eq!(count(&world, "hover_stop"), 1);
        assert_eq!(count(&world, "mouse_up"), 1);
        let calls = &world.resource::<Calls>().0;
        let tail: Vec<&str> = calls[calls.len() - 2..].iter().map(|(n, _)| *n).collect();
        assert_eq!(tail, vec!["hover_stop", "mouse_up"]);
    }

    #[test]
    fn test_steady_hover_fires_start_once() {
        let mut world = world();
        spawn_box(&mut world, 0.0, 0.0, 10.0, 10.0);
        world
            .resource_mut::<InputState>()
            .apply(InputEvent::PointerMove { x: 5.0, y: 5.0 });
        for t in 0..5 {
            tick(&mut world, t as f64 * 15.0);
        }
        assert_eq!(count(&world, "hover_start"), 1);
        assert_eq!(count(&world, "while_hovered"), 5);
        assert_eq!(count(&world, "mouse_down"), 0);
    }

    #[test]
    fn test_press_needs_hover() {
        let mut world = world();
        let id = spawn_box(&mut world, 0.0, 0.0, 10.0, 10.0);
        {
            let mut input = world.resource_mut::<InputState>();
            input.apply(InputEvent::PointerMove { x: 50.0, y: 50.0 });
            input.apply(InputEvent::PointerDown(MouseButton::Left));
        }
        tick(&mut world, 0.0);
        assert!(hover_of(&world, id).is_idle());
        assert_eq!(count(&world, "mouse_down"), 0);
    }

    #[test]
    fn test_release_while_hovering_keeps_hover() {
        let mut world = world();
        let id = spawn_box(&mut world, 0.0, 0.0, 10.0, 10.0);
        {
            let mut input = world.resource_mut::<InputState>();
            input.apply(InputEvent::PointerMove { x: 10.0, y: 10.0 });
            input.apply(InputEvent::PointerDown(MouseButton::Left));
        }
        tick(&mut world, 0.0);
        world
            .resource_mut::<InputState>()
            .apply(InputEvent::PointerUp(MouseButton::Left));
        tick(&mut world, 15.0);
        let h = hover_of(&world, id);
        assert!(h.hovered && !h.down);
        assert_eq!(h.hover_start, 0.0);
        assert_eq!(count(&world, "mouse_up"), 1);
        assert_eq!(count(&world, "hover_stop"), 0);
    }

    #[test]
    fn test_missing_size_is_always_idle() {
        let mut world = world();
        let id = register_entity(
            &mut world,
            (Position::new(0.0, 0.0), Hover::default(), recording_hooks()),
        );
        world
            .resource_mut::<InputState>()
            .apply(InputEvent::PointerMove { x: 0.0, y: 0.0 });
        tick(&mut world, 0.0);
        assert!(hover_of(&world, id).is_idle());
        assert!(matches!(
            hovering(&world, id),
            Err(FrameworkError::ArgumentType(_))
        ));
    }

    #[test]
    fn test_disabled_entities_do_not_think() {
        let mut world = world();
        let id = spawn_box(&mut world, 0.0, 0.0, 10.0, 10.0);
        let e = world.resource::<EntityRegistry>().get(id).unwrap();
        world.get_mut::<Enabled>(e).unwrap().0 = false;
        world
            .resource_mut::<InputState>()
            .apply(InputEvent::PointerMove { x: 1.0, y: 1.0 });
        tick(&mut world, 0.0);
        assert!(hover_of(&world, id).is_idle());
        assert!(world.resource::<Calls>().0.is_empty());
    }

    #[test]
    fn test_disabling_a_hovered_entity_clears_its_state() {
        let mut world = world();
        let id = spawn_box(&mut world, 0.0, 0.0, 10.0, 10.0);
        {
            let mut input = world.resource_mut::<InputState>();
            input.apply(InputEvent::PointerMove { x: 5.0, y: 5.0 });
            input.apply(InputEvent::PointerDown(MouseButton::Left));
        }
        tick(&mut world, 30.0);
        let h = hover_of(&world, id);
        assert!(h.hovered && h.down);

        let e = world.resource::<EntityRegistry>().get(id).unwrap();
        world.get_mut::<Enabled>(e).unwrap().0 = false;
        world
            .resource_mut::<InputState>()
            .apply(InputEvent::PointerMove { x: 50.0, y: 50.0 });
        tick(&mut world, 45.0);
        assert_eq!(hover_of(&world, id), Hover::default());
        assert_eq!(count(&world, "hover_stop"), 0);
        assert_eq!(count(&world, "mouse_up"), 0);
    }

    #[test]
    fn test_topmost_wins_on_overlap() {
        let mut world = world();
        let below = spawn_box(&mut world, 0.0, 0.0, 20.0, 20.0);
        let above = spawn_box(&mut world, 5.0, 5.0, 20.0, 20.0);
        world
            .resource_mut::<InputState>()
            .apply(InputEvent::PointerMove { x: 10.0, y: 10.0 });
        tick(&mut world, 0.0);
        assert!(!hover_of(&world, below).hovered);
        assert!(hover_of(&world, above).hovered);

        world.resource_mut::<FrameworkConfig>().hover_policy = HoverPolicy::All;
        tick(&mut world, 15.0);
        assert!(hover_of(&world, below).hovered);
        assert!(hover_of(&world, above).hovered);
    }

    #[test]
    fn test_checkbox_toggles_on_click() {
        let mut world = world();
        let id = register_entity(
            &mut world,
            (
                Position::new(0.0, 0.0),
                Size::new(10.0, 10.0),
                Hover::default(),
                Shape::CheckBox {
                    corner_radius: 0.0,
                    checked: false,
                },
            ),
        );
        let e = world.resource::<EntityRegistry>().get(id).unwrap();
        {
            let mut input = world.resource_mut::<InputState>();
            input.apply(InputEvent::PointerMove { x: 5.0, y: 5.0 });
            input.apply(InputEvent::PointerDown(MouseButton::Left));
        }
        tick(&mut world, 0.0);
        assert_eq!(world.get::<Shape>(e).unwrap().checked(), Some(false));
        world
            .resource_mut::<InputState>()
            .apply(InputEvent::PointerUp(MouseButton::Left));
        tick(&mut world, 15.0);
        assert_eq!(world.get::<Shape>(e).unwrap().checked(), Some(true));
    }

    #[test]
    fn test_hook_may_despawn_later_entity() {
        let mut world = world();
        let next = world.resource::<EntityRegistry>().next_id();
        let victim = EntityId(next.0 + 1);
        let killer = register_entity(
            &mut world,
            (
                Position::new(0.0, 0.0),
                Size::new(10.0, 10.0),
                Hover::default(),
                PointerHooks::new().on_hover_start(move |w, _| {
                    crate::resources::registry::remove_entity(w, victim);
                }),
            ),
        );
        assert_eq!(spawn_box(&mut world, 0.0, 0.0, 10.0, 10.0), victim);
        world.resource_mut::<FrameworkConfig>().hover_policy = HoverPolicy::All;
        world
            .resource_mut::<InputState>()
            .apply(InputEvent::PointerMove { x: 1.0, y: 1.0 });
        tick(&mut world, 0.0);
        assert!(hover_of(&world, killer).hovered);
        assert!(!world.resource::<EntityRegistry>().contains(victim));
        assert_eq!(count(&world, "hover_start"), 0);
    }
}
