//! Identity and lifecycle components shared by every registered entity.
//!
//! - [`EntityId`] – stable integer id handed out by the
//!   [`EntityRegistry`](crate::resources::registry::EntityRegistry)
//! - [`Enabled`] – gates the think pass
//! - [`Hierarchy`] – informational parent/children links (no transform inheritance)

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotonically increasing id. Never reused, even after removal.
#[derive(
    Component, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether the entity takes part in the think pass.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Enabled(pub bool);

impl Default for Enabled {
    fn default() -> Self {
        Enabled(true)
    }
}

/// Containment links. Kept for bookkeeping only; children are positioned
/// in absolute coordinates like every other entity.
#[derive(Component, Clone, Debug, Default)]
pub struct Hierarchy {
    pub parent: Option<EntityId>,
    pub children: Vec<EntityId>,
}

impl Hierarchy {
    pub fn add_child(&mut self, child: EntityId) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    pub fn remove_child(&mut self, child: EntityId) {
        self.children.retain(|c| *c != child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_default_true() {
        assert_eq!(Enabled::default(), Enabled(true));
    }

    #[test]
    fn test_ids_order_by_value() {
        let mut ids = vec![EntityId(3), EntityId(0), EntityId(2)];
        ids.sort();
        assert_eq!(ids, vec![EntityId(0), EntityId(2), EntityId(3)]);
        assert_eq!(EntityId(7).to_string(), "#7");
    }

    #[test]
    fn test_hierarchy_children_are_unique() {
        let mut h = Hierarchy::default();
        h.add_child(EntityId(1));
        h.add_child(EntityId(1));
        h.add_child(EntityId(2));
        assert_eq!(h.children, vec![EntityId(1), EntityId(2)]);
        h.remove_child(EntityId(1));
        assert_eq!(h.children, vec![EntityId(2)]);
    }
}
