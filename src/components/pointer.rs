//! Pointer interaction components.
//!
//! - [`Hover`] – per-entity hover/press bookkeeping written by the think pass
//! - [`PointerHooks`] – optional callbacks fired on hover/press edges
//!
//! Hooks receive the world so they can start animations, toggle other
//! entities or read input. Missing hooks are simply skipped.

use bevy_ecs::prelude::{Component, World};
use std::fmt;
use std::sync::Arc;

use super::identity::EntityId;

/// Edge hook: fired once on a transition.
pub type Hook = Arc<dyn Fn(&mut World, EntityId) + Send + Sync>;
/// Steady-state hook: fired every tick with the milliseconds spent in the state.
pub type HeldHook = Arc<dyn Fn(&mut World, EntityId, f64) + Send + Sync>;

/// Hover/press state. Both flags are false and both timestamps zero
/// whenever the pointer is not over the entity.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct Hover {
    pub hovered: bool,
    pub down: bool,
    /// Clock time (ms) the hover began.
    pub hover_start: f64,
    /// Clock time (ms) the press began.
    pub down_start: f64,
}

impl Hover {
    pub fn is_idle(&self) -> bool {
        !self.hovered && !self.down
    }

    pub fn clear(&mut self) {
        *self = Hover::default();
    }
}

#[derive(Component, Clone, Default)]
pub struct PointerHooks {
    pub on_hover_start: Option<Hook>,
    pub while_hovered: Option<HeldHook>,
    pub on_hover_stop: Option<Hook>,
    pub on_mouse_down: Option<Hook>,
    pub while_mouse_down: Option<HeldHook>,
    pub on_mouse_up: Option<Hook>,
}

impl PointerHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_hover_start(
        mut self,
        f: impl Fn(&mut World, EntityId) + Send + Sync + 'static,
    ) -> Self {
        self.on_hover_start = Some(Arc::new(f));
        self
    }

    pub fn while_hovered(
        mut self,
        f: impl Fn(&mut World, EntityId, f64) + Send + Sync + 'static,
    ) -> Self {
        self.while_hovered = Some(Arc::new(f));
        self
    }

    pub fn on_hover_stop(
        mut self,
        f: impl Fn(&mut World, EntityId) + Send + Sync + 'static,
    ) -> Self {
        self.on_hover_stop = Some(Arc::new(f));
        self
    }

    pub fn on_mouse_down(
        mut self,
        f: impl Fn(&mut World, EntityId) + Send + Sync + 'static,
    ) -> Self {
        self.on_mouse_down = Some(Arc::new(f));
        self
    }

    pub fn while_mouse_down(
        mut self,
        f: impl Fn(&mut World, EntityId, f64) + Send + Sync + 'static,
    ) -> Self {
        self.while_mouse_down = Some(Arc::new(f));
        self
    }

    pub fn on_mouse_up(mut self, f: impl Fn(&mut World, EntityId) + Send + Sync + 'static) -> Self {
        self.on_mouse_up = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for PointerHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerHooks")
            .field("on_hover_start", &self.on_hover_start.is_some())
            .field("while_hovered", &self.while_hovered.is_some())
            .field("on_hover_stop", &self.on_hover_stop.is_some())
            .field("on_mouse_down", &self.on_mouse_down.is_some())
            .field("while_mouse_down", &self.while_mouse_down.is_some())
            .field("on_mouse_up", &self.on_mouse_up.is_some())
            .finish()
    }
}
