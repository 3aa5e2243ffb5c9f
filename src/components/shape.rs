//! Drawable shape variants and the text they may carry.
//!
//! A graphic's visual is a single [`Shape`] value; variants that extend
//! another (a button is a box with a label, a checkbox is a button with a
//! check mark) reuse the base drawing explicitly in the render pass.

use bevy_ecs::prelude::Component;
use smallvec::SmallVec;

use crate::types::{Rgba, Vector2};

/// Font description handed to the surface for measuring and drawing text.
#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    pub family: String,
    /// Pixel size.
    pub size: f32,
}

impl Font {
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }

    /// CSS shorthand, e.g. `16px Arial`.
    pub fn css(&self) -> String {
        format!("{}px {}", self.size, self.family)
    }

    /// Parse the `<size>px <family>` shorthand used in configuration files.
    pub fn parse(s: &str) -> Option<Font> {
        let (size, family) = s.trim().split_once(' ')?;
        let size: f32 = size.strip_suffix("px")?.parse().ok()?;
        let family = family.trim();
        if family.is_empty() || !size.is_finite() || size <= 0.0 {
            return None;
        }
        Some(Font::new(family, size))
    }
}

impl Default for Font {
    fn default() -> Self {
        Font::new("Arial", 16.0)
    }
}

/// Text carried by buttons, checkboxes and text graphics.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct Label {
    pub text: String,
    pub font: Font,
    pub color: Rgba,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font: Font::default(),
            color: Rgba::WHITE,
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

pub type Points = SmallVec<[Vector2; 8]>;

#[derive(Component, Clone, Debug, PartialEq)]
pub enum Shape {
    /// Filled rectangle, rounded when `corner_radius > 0`.
    Rect { corner_radius: f32 },
    /// Rect plus a centered [`Label`].
    Button { corner_radius: f32 },
    /// Button that toggles `checked` on click and draws a check mark.
    CheckBox { corner_radius: f32, checked: bool },
    /// Bitmap blitted into the extent once the surface has loaded `source`.
    Image { source: String },
    /// [`Label`] drawn at the origin; its size follows the measured text.
    Text,
    /// Filled circle of the entity's [`Radius`](super::position::Radius).
    Circle,
    /// Stroked segment from the entity position to `end`.
    Line { end: Vector2, weight: f32 },
    /// Filled polygon through `points`.
    Poly { points: Points },
}

impl Shape {
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Rect { .. } => "box",
            Shape::Button { .. } => "button",
            Shape::CheckBox { .. } => "checkbox",
            Shape::Image { .. } => "img",
            Shape::Text => "text",
            Shape::Circle => "circle",
            Shape::Line { .. } => "line",
            Shape::Poly { .. } => "poly",
        }
    }

    pub fn is_circular(&self) -> bool {
        matches!(self, Shape::Circle)
    }

    /// Whether the checkbox is ticked; `None` for other shapes.
    pub fn checked(&self) -> Option<bool> {
        match self {
            Shape::CheckBox { checked, .. } => Some(*checked),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_css_and_parse() {
        let f = Font::default();
        assert_eq!(f.css(), "16px Arial");
        assert_eq!(Font::parse("16px Arial"), Some(f));
        assert_eq!(
            Font::parse(" 12.5px Comic Sans "),
            Some(Font::new("Comic Sans", 12.5))
        );
        assert_eq!(Font::parse("Arial"), None);
        assert_eq!(Font::parse("12 Arial"), None);
        assert_eq!(Font::parse("-3px Arial"), None);
    }

    #[test]
    fn test_label_defaults() {
        let l = Label::new("OK");
        assert_eq!(l.text, "OK");
        assert_eq!(l.color, Rgba::WHITE);
        assert_eq!(l.font.size, 16.0);
    }

    #[test]
    fn test_checked_only_for_checkbox() {
        let cb = Shape::CheckBox {
            corner_radius: 0.0,
            checked: true,
        };
        assert_eq!(cb.checked(), Some(true));
        assert_eq!(Shape::Text.checked(), None);
        assert!(Shape::Circle.is_circular());
        assert_eq!(cb.name(), "checkbox");
    }
}
