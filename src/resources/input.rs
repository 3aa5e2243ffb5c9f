//! Pointer and keyboard snapshot.
//!
//! The host delivers raw [`InputEvent`]s through the [`InputQueue`] channel;
//! [`drain_input_system`](crate::systems::input::drain_input_system) folds
//! them into the [`InputState`] resource before every tick and frame. The
//! state keeps the previous frame's buttons and keys so edge queries
//! (`*_pressed`, `*_released`) can be answered; the render loop rolls the
//! snapshot forward at the end of each frame.

use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender};
use rustc_hash::FxHashSet;

use crate::types::Vector2;

/// Position the pointer reports while it is outside the surface.
pub const POINTER_SENTINEL: Vector2 = Vector2 { x: -1.0, y: -1.0 };

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    Other(u8),
}

/// Raw events produced by the host's input source.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    /// Pointer moved; coordinates already in surface space (see [`scale_pointer`]).
    PointerMove { x: f32, y: f32 },
    PointerDown(MouseButton),
    PointerUp(MouseButton),
    /// Pointer left the surface: sentinel position, every button released.
    PointerLeave,
    KeyDown(String),
    KeyUp(String),
}

#[derive(Resource)]
pub struct InputQueue {
    pub tx: Sender<InputEvent>,
    pub rx: Receiver<InputEvent>,
}

impl Default for InputQueue {
    fn default() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self { tx, rx }
    }
}

#[derive(Resource, Debug, Clone)]
pub struct InputState {
    pub pointer: Vector2,
    buttons: FxHashSet<MouseButton>,
    prev_buttons: FxHashSet<MouseButton>,
    keys: FxHashSet<String>,
    prev_keys: FxHashSet<String>,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            pointer: POINTER_SENTINEL,
            buttons: FxHashSet::default(),
            prev_buttons: FxHashSet::default(),
            keys: FxHashSet::default(),
            prev_keys: FxHashSet::default(),
        }
    }
}

impl InputState {
    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMove { x, y } => self.pointer.set(x, y),
            InputEvent::PointerDown(b) => {
                self.buttons.insert(b);
            }
            InputEvent::PointerUp(b) => {
                self.buttons.remove(&b);
            }
            InputEvent::PointerLeave => {
                self.pointer = POINTER_SENTINEL;
                self.buttons.clear();
            }
            InputEvent::KeyDown(k) => {
                self.keys.insert(k);
            }
            InputEvent::KeyUp(k) => {
                self.keys.remove(&k);
            }
        }
    }

    /// Primary button held; this is the "down" the hover/press machine uses.
    pub fn pointer_down(&self) -> bool {
        self.buttons.contains(&MouseButton::Left)
    }

    pub fn button_down(&self, b: MouseButton) -> bool {
        self.buttons.contains(&b)
    }

    pub fn button_pressed(&self, b: MouseButton) -> bool {
        self.buttons.contains(&b) && !self.prev_buttons.contains(&b)
    }

    pub fn button_released(&self, b: MouseButton) -> bool {
        !self.buttons.contains(&b) && self.prev_buttons.contains(&b)
    }

    pub fn key_down(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn key_pressed(&self, key: &str) -> bool {
        self.keys.contains(key) && !self.prev_keys.contains(key)
    }

    pub fn key_released(&self, key: &str) -> bool {
        !self.keys.contains(key) && self.prev_keys.contains(key)
    }

    /// Inclusive rectangle test against the current pointer position.
    pub fn hovering(&self, pos: Vector2, size: Vector2) -> bool {
        Vector2::in_range(self.pointer, pos, size)
    }

    /// Roll the current state into the previous-frame snapshot.
    pub fn end_frame(&mut self) {
        self.prev_buttons.clone_from(&self.buttons);
        self.prev_keys.clone_from(&self.keys);
    }
}

/// Map client coordinates onto a surface whose backing store is
/// `backing_size` but is displayed at `display_origin`/`display_size`.
pub fn scale_pointer(
    client: Vector2,
    display_origin: Vector2,
    display_size: Vector2,
    backing_size: Vector2,
) -> Vector2 {
    let scale = |c: f32, o: f32, d: f32, b: f32| {
        if d == 0.0 { c - o } else { (c - o) / d * b }
    };
    Vector2::new(
        scale(client.x, display_origin.x, display_size.x, backing_size.x),
        scale(client.y, display_origin.y, display_size.y, backing_size.y),
    )
}
