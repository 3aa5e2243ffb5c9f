//! Framework systems.
//!
//! Passes run by a [`Scene`](crate::scene::Scene) every tick or frame.
//!
//! Submodules overview
//! - [`animation`] – easing, interpolation and the per-frame animation pass
//! - [`input`] – drain host input events into [`crate::resources::input::InputState`]
//! - [`render`] – draw every visible graphic onto a [`Surface`](crate::surface::Surface)
//! - [`think`] – hover/press state machine for every enabled entity
//! - [`time`] – advance the scene clock

pub mod animation;
pub mod input;
pub mod render;
pub mod think;
pub mod time;
