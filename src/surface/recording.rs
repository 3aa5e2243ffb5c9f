//! Command-recording surface.
//!
//! Stores every call as a [`DrawCommand`] so a frame can be inspected after
//! the fact. Text is measured with a fixed advance of `font.size * 0.5` per
//! character and images become ready one call after they are first requested.

use log::warn;
use rustc_hash::FxHashSet;

use super::Surface;
use crate::components::shape::Font;
use crate::types::{Rgba, Vector2};

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    ClearRect { x: f32, y: f32, w: f32, h: f32 },
    FillRect { x: f32, y: f32, w: f32, h: f32, color: String },
    BeginPath,
    MoveTo { x: f32, y: f32 },
    LineTo { x: f32, y: f32 },
    ArcTo { x1: f32, y1: f32, x2: f32, y2: f32, radius: f32 },
    Arc { cx: f32, cy: f32, radius: f32, start: f32, end: f32 },
    ClosePath,
    Fill { color: String },
    Stroke { color: String, width: f32 },
    FillText { text: String, x: f32, y: f32, font: String, color: String },
    DrawImage { source: String, x: f32, y: f32, w: f32, h: f32 },
    Save,
    Restore,
    Translate { x: f32, y: f32 },
    Rotate { radians: f32 },
    Clip { x: f32, y: f32, w: f32, h: f32 },
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub width: f32,
    pub height: f32,
    pub commands: Vec<DrawCommand>,
    depth: usize,
    max_depth: usize,
    requested: FxHashSet<String>,
    loaded: FxHashSet<String>,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Take the recorded commands, leaving the list empty.
    pub fn drain(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Current save/restore nesting.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Deepest save/restore nesting seen so far.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Mark `source` as loaded without going through a request.
    pub fn preload(&mut self, source: impl Into<String>) {
        self.loaded.insert(source.into());
    }

    pub fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Vector2 {
        Vector2::new(self.width, self.height)
    }

    fn clear_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.commands.push(DrawCommand::ClearRect { x, y, w, h });
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        self.commands.push(DrawCommand::FillRect {
            x,
            y,
            w,
            h,
            color: color.rgba_string(),
        });
    }

    fn begin_path(&mut self) {
        self.commands.push(DrawCommand::BeginPath);
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::MoveTo { x, y });
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::LineTo { x, y });
    }

    fn arc_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, radius: f32) {
        self.commands.push(DrawCommand::ArcTo {
            x1,
            y1,
            x2,
            y2,
            radius,
        });
    }

    fn arc(&mut self, cx: f32, cy: f32, radius: f32, start_angle: f32, end_angle: f32) {
        self.commands.push(DrawCommand::Arc {
            cx,
            cy,
            radius,
            start: start_angle,
            end: end_angle,
        });
    }

    fn close_path(&mut self) {
        self.commands.push(DrawCommand::ClosePath);
    }

    fn fill(&mut self, color: Rgba) {
        self.commands.push(DrawCommand::Fill {
            color: color.rgba_string(),
        });
    }

    fn stroke(&mut self, color: Rgba, width: f32) {
        self.commands.push(DrawCommand::Stroke {
            color: color.rgba_string(),
            width,
        });
    }

    fn measure_text(&mut self, text: &str, font: &Font) -> f32 {
        text.chars().count() as f32 * font.size * 0.5
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, font: &Font, color: Rgba) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_string(),
            x,
            y,
            font: font.css(),
            color: color.rgba_string(),
        });
    }

    fn image_ready(&mut self, source: &str) -> bool {
        if self.loaded.contains(source) {
            return true;
        }
        if self.requested.contains(source) {
            self.loaded.insert(source.to_string());
            return true;
        }
        self.requested.insert(source.to_string());
        false
    }

    fn draw_image(&mut self, source: &str, x: f32, y: f32, w: f32, h: f32) {
        self.commands.push(DrawCommand::DrawImage {
            source: source.to_string(),
            x,
            y,
            w,
            h,
        });
    }

    fn save(&mut self) {
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        if self.depth == 0 {
            warn!("restore() without matching save()");
            return;
        }
        self.depth -= 1;
        self.commands.push(DrawCommand::Restore);
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::Translate { x, y });
    }

    fn rotate(&mut self, radians: f32) {
        self.commands.push(DrawCommand::Rotate { radians });
    }

    fn clip_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.commands.push(DrawCommand::Clip { x, y, w, h });
    }
}
