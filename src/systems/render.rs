//! Render pass.
//!
//! Walks the entity registry in order and draws every visible graphic onto a
//! [`Surface`]. For graphics that are not drawn from origin the surface is
//! moved into the entity's local frame first:
//!
//! 1. save the transform
//! 2. translate to the position (minus the radius for circles, which are centered)
//! 3. rotate by the entity's angle
//! 4. clip to the extent when the graphic masks and the extent is non-zero
//! 5. draw, then restore
//!
//! A graphic that fails to draw is logged and skipped; the transform is
//! restored either way and the rest of the frame still renders.

use bevy_ecs::prelude::*;
use log::warn;
use std::f32::consts::TAU;

use crate::components::graphic::Graphic;
use crate::components::position::{Position, Radius, Size};
use crate::components::rotation::Rotation;
use crate::components::shape::{Label, Shape};
use crate::components::tint::Tint;
use crate::error::{FrameworkError, FrameworkResult};
use crate::resources::config::FrameworkConfig;
use crate::resources::registry::EntityRegistry;
use crate::surface::Surface;
use crate::types::{Rgba, Vector2};

/// Everything needed to draw one graphic, copied out of the world.
struct DrawJob {
    graphic: Graphic,
    shape: Shape,
    pos: Vector2,
    size: Option<Vector2>,
    radius: Option<f32>,
    angle: f32,
    color: Rgba,
    label: Option<Label>,
}

impl DrawJob {
    /// `size`, else `(radius, radius)`, else zero.
    fn extent(&self) -> Vector2 {
        match (self.size, self.radius) {
            (Some(s), _) => s,
            (None, Some(r)) => Vector2::splat(r),
            (None, None) => Vector2::ZERO,
        }
    }

    fn label(&self) -> FrameworkResult<&Label> {
        self.label.as_ref().ok_or_else(|| {
            FrameworkError::argument(format!("{} graphic has no label", self.shape.name()))
        })
    }
}

/// Clear the surface and paint the configured background, fully opaque.
pub fn clear_surface(world: &World, surface: &mut dyn Surface) {
    let Some(config) = world.get_resource::<FrameworkConfig>() else {
        return;
    };
    if !config.clear_frame {
        return;
    }
    let size = surface.size();
    let background = Rgba {
        a: 255,
        ..config.background
    };
    surface.clear_rect(0.0, 0.0, size.x, size.y);
    surface.fill_rect(0.0, 0.0, size.x, size.y, background);
}

/// Draw every visible graphic in registry order.
pub fn render_pass(world: &mut World, surface: &mut dyn Surface) {
    let order = world.resource::<EntityRegistry>().snapshot();
    for (id, entity) in order {
        if let Err(e) = render_entity(world, entity, surface) {
            warn!("Entity {} not drawn this frame: {}", id, e);
        }
    }
}

fn render_entity(
    world: &mut World,
    entity: Entity,
    surface: &mut dyn Surface,
) -> FrameworkResult<()> {
    let Some(job) = collect(world, entity, surface) else {
        return Ok(());
    };

    let extent = job.extent();
    let local = !job.graphic.draw_from_origin;
    if local {
        let offset = if job.shape.is_circular() {
            job.radius.unwrap_or(0.0)
        } else {
            0.0
        };
        surface.save();
        surface.translate(job.pos.x - offset, job.pos.y - offset);
        if job.angle != 0.0 {
            surface.rotate(job.angle);
        }
        if job.graphic.mask && !extent.is_zero() {
            surface.clip_rect(0.0, 0.0, extent.x, extent.y);
        }
    }

    let result = draw(&job, local, extent, surface);

    if local {
        surface.restore();
    }
    result
}

/// Copy the draw state of `entity`, auto-sizing text on the way.
///
/// `None` when the entity is not a visible graphic with a shape.
fn collect(world: &mut World, entity: Entity, surface: &mut dyn Surface) -> Option<DrawJob> {
    let e = world.get_entity(entity).ok()?;
    let graphic = *e.get::<Graphic>()?;
    if !graphic.visible {
        return None;
    }
    let shape = e.get::<Shape>()?.clone();
    let label = e.get::<Label>().cloned();

    if let (Shape::Text, Some(l)) = (&shape, &label) {
        let measured = Vector2::new(surface.measure_text(&l.text, &l.font), l.font.size);
        if let Some(mut size) = world.get_mut::<Size>(entity) {
            if size.size != measured {
                size.size = measured;
            }
        }
    }

    let e = world.get_entity(entity).ok()?;
    Some(DrawJob {
        graphic,
        shape,
        pos: e.get::<Position>().map(|p| p.pos).unwrap_or_default(),
        size: e.get::<Size>().map(|s| s.size),
        radius: e.get::<Radius>().map(|r| r.radius),
        angle: e.get::<Rotation>().map(|r| r.as_radians()).unwrap_or(0.0),
        color: e.get::<Tint>().map(|t| t.color).unwrap_or_default(),
        label,
    })
}

fn draw(
    job: &DrawJob,
    local: bool,
    extent: Vector2,
    surface: &mut dyn Surface,
) -> FrameworkResult<()> {
    // Top-left of the shape in the coordinates the surface is currently in.
    let at = if local { Vector2::ZERO } else { job.pos };
    let (w, h) = (extent.x, extent.y);

    match &job.shape {
        Shape::Rect { corner_radius } => {
            fill_rounded_rect(surface, at, w, h, *corner_radius, job.color);
        }
        Shape::Button { corner_radius } => {
            let label = job.label()?;
            fill_rounded_rect(surface, at, w, h, *corner_radius, job.color);
            draw_centered_label(surface, label, at, w, h);
        }
        Shape::CheckBox {
            corner_radius,
            checked,
        } => {
            let label = job.label()?;
            fill_rounded_rect(surface, at, w, h, *corner_radius, job.color);
            draw_centered_label(surface, label, at, w, h);
            if *checked {
                draw_check_mark(surface, at, w, h, label.color);
            }
        }
        Shape::Image { source } => {
            if surface.image_ready(source) {
                surface.draw_image(source, at.x, at.y, w, h);
            }
        }
        Shape::Text => {
            let label = job.label()?;
            surface.fill_text(&label.text, at.x, at.y, &label.font, label.color);
        }
        Shape::Circle => {
            let r = job
                .radius
                .ok_or_else(|| FrameworkError::argument("circle graphic has no radius"))?;
            if r > 0.0 {
                let center = if local { Vector2::splat(r) } else { job.pos };
                surface.begin_path();
                surface.arc(center.x, center.y, r, 0.0, TAU);
                surface.fill(job.color);
            }
        }
        Shape::Line { end, weight } => {
            let end = if local { *end - job.pos } else { *end };
            surface.begin_path();
            surface.move_to(at.x, at.y);
            surface.line_to(end.x, end.y);
            surface.stroke(job.color, *weight);
        }
        Shape::Poly { points } => {
            let shift = if local { job.pos } else { Vector2::ZERO };
            let mut iter = points.iter().map(|p| *p - shift);
            if let Some(first) = iter.next() {
                surface.begin_path();
                surface.move_to(first.x, first.y);
                for p in iter {
                    surface.line_to(p.x, p.y);
                }
                surface.close_path();
                surface.fill(job.color);
            }
        }
    }
    Ok(())
}

fn fill_rounded_rect(
    surface: &mut dyn Surface,
    at: Vector2,
    w: f32,
    h: f32,
    radius: f32,
    color: Rgba,
) {
    let r = radius.min(w / 2.0).min(h / 2.0).max(0.0);
    if r == 0.0 {
        surface.fill_rect(at.x, at.y, w, h, color);
        return;
    }
    let (x, y) = (at.x, at.y);
    surface.begin_path();
    surface.move_to(x, y + r);
    surface.line_to(x, y + h - r);
    surface.arc_to(x, y + h, x + r, y + h, r);
    surface.line_to(x + w - r, y + h);
    surface.arc_to(x + w, y + h, x + w, y + h - r, r);
    surface.line_to(x + w, y + r);
    surface.arc_to(x + w, y, x + w - r, y, r);
    surface.line_to(x + r, y);
    surface.arc_to(x, y, x, y + r, r);
    surface.close_path();
    surface.fill(color);
}

fn draw_centered_label(surface: &mut dyn Surface, label: &Label, at: Vector2, w: f32, h: f32) {
    if label.text.is_empty() {
        return;
    }
    let text_w = surface.measure_text(&label.text, &label.font);
    let x = at.x + (w - text_w) / 2.0;
    let y = at.y + (h - label.font.size) / 2.0;
    surface.fill_text(&label.text, x, y, &label.font, label.color);
}

fn draw_check_mark(surface: &mut dyn Surface, at: Vector2, w: f32, h: f32, color: Rgba) {
    surface.begin_path();
    surface.move_to(at.x + w * 0.2, at.y + h * 0.5);
    surface.line_to(at.x + w * 0.4, at.y + h * 0.75);
    surface.line_to(at.x + w * 0.8, at.y + h * 0.25);
    surface.stroke(color, (w.min(h) * 0.1).max(1.0));
}
