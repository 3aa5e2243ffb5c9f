//! Append-only entity identity table.
//!
//! The [`EntityRegistry`] hands out [`EntityId`]s from a counter that is never
//! decremented and keeps them in a `BTreeMap`, so iterating the registry
//! visits entities in registration order. Both the think pass and the render
//! pass walk this order.

use bevy_ecs::prelude::*;
use log::debug;
use std::collections::BTreeMap;

use crate::components::identity::{EntityId, Hierarchy};

#[derive(Resource, Debug, Default)]
pub struct EntityRegistry {
    next: u64,
    entries: BTreeMap<EntityId, Entity>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the next id to `entity`.
    pub fn register(&mut self, entity: Entity) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        self.entries.insert(id, entity);
        id
    }

    /// Forget `id`. The id is not handed out again.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entries.remove(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<Entity> {
        self.entries.get(&id).copied()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Registration-ordered traversal.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, Entity)> + '_ {
        self.entries.iter().map(|(id, e)| (*id, *e))
    }

    /// Copy of the traversal order, for passes that mutate the world while walking it.
    pub fn snapshot(&self) -> Vec<(EntityId, Entity)> {
        self.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The id the next registration will receive.
    pub fn next_id(&self) -> EntityId {
        EntityId(self.next)
    }
}

/// Spawn `bundle`, register it and tag it with its [`EntityId`].
pub fn register_entity(world: &mut World, bundle: impl Bundle) -> EntityId {
    let entity = world.spawn(bundle).id();
    let id = world.resource_mut::<EntityRegistry>().register(entity);
    world.entity_mut(entity).insert(id);
    debug!("Registered entity {}", id);
    id
}

/// Deregister and despawn `id`, unlinking it from its parent's children
/// and orphaning its own children.
///
/// Returns `false` when the id is unknown.
pub fn remove_entity(world: &mut World, id: EntityId) -> bool {
    let Some(entity) = world.resource_mut::<EntityRegistry>().remove(id) else {
        return false;
    };
    let (parent, children) = match world.get::<Hierarchy>(entity) {
        Some(h) => (h.parent, h.children.clone()),
        None => (None, Vec::new()),
    };
    let registry = world.resource::<EntityRegistry>();
    let parent = parent.and_then(|p| registry.get(p));
    let children: Vec<Entity> = children.into_iter().filter_map(|c| registry.get(c)).collect();
    if let Some(parent) = parent {
        if let Some(mut h) = world.get_mut::<Hierarchy>(parent) {
            h.remove_child(id);
        }
    }
    for child in children {
        if let Some(mut h) = world.get_mut::<Hierarchy>(child) {
            if h.parent == Some(id) {
                h.parent = None;
            }
        }
    }
    world.despawn(entity);
    debug!("Removed entity {}", id);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic_and_never_reused() {
        let mut world = World::new();
        world.init_resource::<EntityRegistry>();
        let a = register_entity(&mut world, ());
        let b = register_entity(&mut world, ());
        assert_eq!(a, EntityId(0));
        assert_eq!(b, EntityId(1));
        assert!(remove_entity(&mut world, a));
        let c = register_entity(&mut world, ());
        assert_eq!(c, EntityId(2));
        assert!(!world.resource::<EntityRegistry>().contains(a));
        assert_eq!(world.resource::<EntityRegistry>().len(), 2);
    }

    #[test]
    fn test_iteration_follows_registration_order() {
        let mut world = World::new();
        world.init_resource::<EntityRegistry>();
        let ids: Vec<EntityId> = (0..5).map(|_| register_entity(&mut world, ())).collect();
        remove_entity(&mut world, ids[2]);
        let order: Vec<EntityId> = world
            .resource::<EntityRegistry>()
            .iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(order, vec![ids[0], ids[1], ids[3], ids[4]]);
    }

    #[test]
    fn test_registered_entity_carries_its_id() {
        let mut world = World::new();
        world.init_resource::<EntityRegistry>();
        let id = register_entity(&mut world, ());
        let entity = world.resource::<EntityRegistry>().get(id).unwrap();
        assert_eq!(world.get::<EntityId>(entity), Some(&id));
    }

    #[test]
    fn test_removing_a_parent_orphans_its_children() {
        let mut world = World::new();
        world.init_resource::<EntityRegistry>();
        let parent = register_entity(&mut world, ());
        let child = register_entity(
            &mut world,
            Hierarchy {
                parent: Some(parent),
                children: Vec::new(),
            },
        );
        let parent_e = world.resource::<EntityRegistry>().get(parent).unwrap();
        world.entity_mut(parent_e).insert(Hierarchy {
            parent: None,
            children: vec![child],
        });

        assert!(remove_entity(&mut world, parent));
        let child_e = world.resource::<EntityRegistry>().get(child).unwrap();
        assert_eq!(world.get::<Hierarchy>(child_e).unwrap().parent, None);
    }

    #[test]
    fn test_remove_unknown_is_false() {
        let mut world = World::new();
        world.init_resource::<EntityRegistry>();
        assert!(!remove_entity(&mut world, EntityId(42)));
        assert_eq!(world.resource::<EntityRegistry>().next_id(), EntityId(0));
    }
}
