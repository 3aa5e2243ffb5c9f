//! Input systems.
//!
//! - [`drain_input_system`] folds every queued [`InputEvent`](crate::resources::input::InputEvent)
//!   into [`InputState`] at the start of each tick and frame.
//! - [`end_frame_input_system`] rolls the current snapshot into the
//!   previous-frame one after a frame, so edge queries compare frame to frame.
use bevy_ecs::prelude::*;

use crate::resources::input::{InputQueue, InputState};

pub fn drain_input_system(queue: Res<InputQueue>, mut input: ResMut<InputState>) {
    for event in queue.rx.try_iter() {
        input.apply(event);
    }
}

pub fn end_frame_input_system(mut input: ResMut<InputState>) {
    input.end_frame();
}
