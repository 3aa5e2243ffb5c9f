//! ECS components for entities.
//!
//! Submodules overview:
//! - [`graphic`] – drawable marker with visibility, origin and mask switches
//! - [`identity`] – stable id, enabled flag and informational hierarchy
//! - [`pointer`] – hover/press bookkeeping and optional pointer hooks
//! - [`position`] – position, size and radius
//! - [`rotation`] – rotation angle in degrees or radians
//! - [`shape`] – drawable shape variants, labels and fonts
//! - [`tint`] – fill color

pub mod graphic;
pub mod identity;
pub mod pointer;
pub mod position;
pub mod rotation;
pub mod shape;
pub mod tint;
