//! Nub's Canvas 2D Game Framework.
//!
//! A retained-mode scene graph of 2D graphics with hover/press tracking,
//! time-based numeric animations and two independently paced loops (think
//! and render) over a pluggable drawing [`surface`].
//!
//! The [`scene::Scene`] owns the ECS world; build entities with
//! [`builders`], animate them with [`tweens`] and drive the loops with
//! [`scheduler::Scheduler`].

pub mod builders;
pub mod components;
pub mod error;
pub mod resources;
pub mod scene;
pub mod scheduler;
pub mod surface;
pub mod systems;
pub mod tweens;
pub mod types;
