//! ECS resources made available to systems.
//!
//! Long-lived context objects owned by a [`Scene`](crate::scene::Scene)'s
//! world. Nothing here is a process-wide singleton: two scenes never share
//! state.
//!
//! Overview
//! - `animations` – numeric property animations and their registry
//! - `config` – scheduling and rendering options loaded from INI
//! - `frametiming` – rolling frame-duration statistics and frame callbacks
//! - `input` – pointer/keyboard snapshot and the host event channel
//! - `registry` – append-only entity id table walked by both loops
//! - `worldtime` – scene clock in milliseconds
pub mod animations;
pub mod config;
pub mod frametiming;
pub mod input;
pub mod registry;
pub mod worldtime;
