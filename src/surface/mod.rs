//! The drawing surface the render pass paints into.
//!
//! [`Surface`] is the whole contract between the framework and a bitmap
//! backend: a canvas-style immediate API with a path builder, text
//! metrics, image blits and a save/restore transform stack. Coordinates
//! are in surface pixels after any active translate/rotate.
//!
//! Backends:
//! - [`recording::RecordingSurface`] – keeps a command list; headless hosts and tests
//! - `raylib_backend::RaylibSurface` – windowed backend (feature `raylib`)

pub mod recording;
#[cfg(feature = "raylib")]
pub mod raylib_backend;

use crate::components::shape::Font;
use crate::types::{Rgba, Vector2};

pub trait Surface {
    /// Backing-store size in pixels.
    fn size(&self) -> Vector2;

    fn clear_rect(&mut self, x: f32, y: f32, w: f32, h: f32);
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f32, y: f32);
    fn line_to(&mut self, x: f32, y: f32);
    /// Rounded corner from the current point towards `(x1, y1)` ending on
    /// the line to `(x2, y2)`.
    fn arc_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, radius: f32);
    /// Circular arc around `(cx, cy)`, angles in radians.
    fn arc(&mut self, cx: f32, cy: f32, radius: f32, start_angle: f32, end_angle: f32);
    fn close_path(&mut self);
    fn fill(&mut self, color: Rgba);
    fn stroke(&mut self, color: Rgba, width: f32);

    /// Pixel width of `text` in `font`.
    fn measure_text(&mut self, text: &str, font: &Font) -> f32;
    /// Draw `text` with its top-left corner at `(x, y)`.
    fn fill_text(&mut self, text: &str, x: f32, y: f32, font: &Font, color: Rgba);

    /// Whether `source` is loaded; the first call for a source may start loading it.
    fn image_ready(&mut self, source: &str) -> bool;
    fn draw_image(&mut self, source: &str, x: f32, y: f32, w: f32, h: f32);

    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f32, y: f32);
    fn rotate(&mut self, radians: f32);
    fn clip_rect(&mut self, x: f32, y: f32, w: f32, h: f32);
}
