//! Plain value types shared by components, resources and the drawing surface.
//!
//! - [`vector`] – 2D vector with the inclusive rectangle test used for hovering
//! - [`color`] – 8-bit RGBA color with hex parsing and CSS-style formatting

pub mod color;
pub mod vector;

pub use color::Rgba;
pub use vector::Vector2;
