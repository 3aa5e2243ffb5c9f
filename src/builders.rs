//! Entity constructors.
//!
//! One builder per graphic variant. Every builder starts from the same
//! defaults (position `(0,0)`, white, visible, enabled, not rotated) plus
//! the variant's own (a 16x16 box, the configured font, ...), validates its
//! values when [`spawn`](BoxBuilder::spawn) is called and registers the
//! entity with the scene.
//!
//! ```ignore
//! let ok = ButtonBuilder::new("OK")
//!     .pos(10.0, 10.0)
//!     .size(80.0, 24.0)
//!     .hooks(PointerHooks::new().on_mouse_up(|world, id| { /* ... */ }))
//!     .spawn(&mut scene)?;
//! ```

use bevy_ecs::prelude::*;

use crate::components::graphic::Graphic;
use crate::components::identity::{Enabled, EntityId};
use crate::components::pointer::{Hover, PointerHooks};
use crate::components::position::{Position, Radius, Size};
use crate::components::rotation::Rotation;
use crate::components::shape::{Font, Label, Points, Shape};
use crate::components::tint::Tint;
use crate::error::{FrameworkError, FrameworkResult};
use crate::scene::Scene;
use crate::types::{Rgba, Vector2};

const DEFAULT_BOX_SIZE: f32 = 16.0;
const DEFAULT_RADIUS: f32 = 8.0;
const DEFAULT_LINE_WEIGHT: f32 = 1.0;

/// Settings shared by every graphic.
#[derive(Clone, Debug)]
struct Common {
    pos: Vector2,
    color: Rgba,
    visible: bool,
    enabled: bool,
    angle: f32,
    use_radians: Option<bool>,
    draw_from_origin: bool,
    mask: bool,
    hooks: PointerHooks,
}

impl Common {
    fn new(draw_from_origin: bool) -> Self {
        Self {
            pos: Vector2::ZERO,
            color: Rgba::WHITE,
            visible: true,
            enabled: true,
            angle: 0.0,
            use_radians: None,
            draw_from_origin,
            mask: false,
            hooks: PointerHooks::default(),
        }
    }

    fn validate(&self, what: &str) -> FrameworkResult<()> {
        if !self.pos.is_finite() {
            return Err(FrameworkError::argument(format!(
                "{what}: position must be finite, got ({}, {})",
                self.pos.x, self.pos.y
            )));
        }
        if !self.angle.is_finite() {
            return Err(FrameworkError::argument(format!("{what}: angle must be finite")));
        }
        Ok(())
    }

    fn bundle(self, default_radians: bool) -> impl Bundle {
        let use_radians = self.use_radians.unwrap_or(default_radians);
        (
            Graphic {
                visible: self.visible,
                draw_from_origin: self.draw_from_origin,
                mask: self.mask,
            },
            Position { pos: self.pos },
            Tint::from(self.color),
            Rotation {
                angle: self.angle,
                use_radians,
            },
            Enabled(self.enabled),
            Hover::default(),
            self.hooks,
        )
    }
}

macro_rules! common_setters {
    ($builder:ident) => {
        impl $builder {
            pub fn pos(mut self, x: f32, y: f32) -> Self {
                self.common.pos = Vector2::new(x, y);
                self
            }

            /// Fill color (stroke color for lines).
            pub fn color(mut self, color: Rgba) -> Self {
                self.common.color = color;
                self
            }

            pub fn visible(mut self, visible: bool) -> Self {
                self.common.visible = visible;
                self
            }

            pub fn enabled(mut self, enabled: bool) -> Self {
                self.common.enabled = enabled;
                self
            }

            /// Angle in degrees, or radians when the scene is configured for them.
            pub fn angle(mut self, angle: f32) -> Self {
                self.common.angle = angle;
                self
            }

            /// Override the scene's angle unit for this graphic.
            pub fn use_radians(mut self, radians: bool) -> Self {
                self.common.use_radians = Some(radians);
                self
            }

            pub fn draw_from_origin(mut self, from_origin: bool) -> Self {
                self.common.draw_from_origin = from_origin;
                self
            }

            /// Clip drawing to the graphic's extent.
            pub fn mask(mut self, mask: bool) -> Self {
                self.common.mask = mask;
                self
            }

            pub fn hooks(mut self, hooks: PointerHooks) -> Self {
                self.common.hooks = hooks;
                self
            }
        }
    };
}

fn check_size(what: &str, size: Vector2) -> FrameworkResult<Size> {
    if !size.is_finite() || size.x < 0.0 || size.y < 0.0 {
        return Err(FrameworkError::argument(format!(
            "{what}: size must be non-negative, got ({}, {})",
            size.x, size.y
        )));
    }
    Ok(Size { size })
}

fn check_non_negative(what: &str, field: &str, v: f32) -> FrameworkResult<f32> {
    if !v.is_finite() || v < 0.0 {
        return Err(FrameworkError::argument(format!(
            "{what}: {field} must be a non-negative number, got {v}"
        )));
    }
    Ok(v)
}

fn check_font(what: &str, font: &Font) -> FrameworkResult<()> {
    if font.family.trim().is_empty() {
        return Err(FrameworkError::argument(format!("{what}: font family is empty")));
    }
    if !font.size.is_finite() || font.size <= 0.0 {
        return Err(FrameworkError::argument(format!(
            "{what}: font size must be positive, got {}",
            font.size
        )));
    }
    Ok(())
}

/// Label settings shared by buttons, checkboxes and text.
#[derive(Clone, Debug)]
struct Text {
    text: String,
    font: Option<Font>,
    color: Rgba,
}

impl Text {
    fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font: None,
            color: Rgba::WHITE,
        }
    }

    fn label(self, what: &str, scene: &Scene) -> FrameworkResult<Label> {
        let font = self.font.unwrap_or_else(|| scene.config().font.clone());
        check_font(what, &font)?;
        Ok(Label {
            text: self.text,
            font,
            color: self.color,
        })
    }
}

macro_rules! text_setters {
    ($builder:ident) => {
        impl $builder {
            pub fn text(mut self, text: impl Into<String>) -> Self {
                self.label.text = text.into();
                self
            }

            pub fn font(mut self, font: Font) -> Self {
                self.label.font = Some(font);
                self
            }

            pub fn text_color(mut self, color: Rgba) -> Self {
                self.label.color = color;
                self
            }
        }
    };
}

// ---------------------------------------------------------------------- Box

#[derive(Clone, Debug)]
pub struct BoxBuilder {
    common: Common,
    size: Vector2,
    corner_radius: f32,
}

impl Default for BoxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BoxBuilder {
    pub fn new() -> Self {
        Self {
            common: Common::new(false),
            size: Vector2::splat(DEFAULT_BOX_SIZE),
            corner_radius: 0.0,
        }
    }

    pub fn size(mut self, w: f32, h: f32) -> Self {
        self.size = Vector2::new(w, h);
        self
    }

    pub fn corner_radius(mut self, r: f32) -> Self {
        self.corner_radius = r;
        self
    }

    pub fn spawn(self, scene: &mut Scene) -> FrameworkResult<EntityId> {
        self.common.validate("box")?;
        let size = check_size("box", self.size)?;
        let corner_radius = check_non_negative("box", "corner radius", self.corner_radius)?;
        let bundle = (
            self.common.bundle(scene.config().use_radians),
            Shape::Rect { corner_radius },
            size,
        );
        Ok(scene.spawn(bundle))
    }
}

common_setters!(BoxBuilder);

// ------------------------------------------------------------------- Button

/// A box with a centered label.
#[derive(Clone, Debug)]
pub struct ButtonBuilder {
    common: Common,
    label: Text,
    size: Vector2,
    corner_radius: f32,
}

impl ButtonBuilder {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            common: Common::new(false),
            label: Text::new(text),
            size: Vector2::splat(DEFAULT_BOX_SIZE),
            corner_radius: 0.0,
        }
    }

    pub fn size(mut self, w: f32, h: f32) -> Self {
        self.size = Vector2::new(w, h);
        self
    }

    pub fn corner_radius(mut self, r: f32) -> Self {
        self.corner_radius = r;
        self
    }

    pub fn spawn(self, scene: &mut Scene) -> FrameworkResult<EntityId> {
        self.common.validate("button")?;
        let size = check_size("button", self.size)?;
        let corner_radius = check_non_negative("button", "corner radius", self.corner_radius)?;
        let label = self.label.label("button", scene)?;
        let bundle = (
            self.common.bundle(scene.config().use_radians),
            Shape::Button { corner_radius },
            size,
            label,
        );
        Ok(scene.spawn(bundle))
    }
}

common_setters!(ButtonBuilder);
text_setters!(ButtonBuilder);

// ----------------------------------------------------------------- CheckBox

/// A button that toggles on click and draws a check mark while checked.
#[derive(Clone, Debug)]
pub struct CheckBoxBuilder {
    common: Common,
    label: Text,
    size: Vector2,
    corner_radius: f32,
    checked: bool,
}

impl Default for CheckBoxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckBoxBuilder {
    pub fn new() -> Self {
        Self {
            common: Common::new(false),
            label: Text::new(""),
            size: Vector2::splat(DEFAULT_BOX_SIZE),
            corner_radius: 0.0,
            checked: false,
        }
    }

    pub fn size(mut self, w: f32, h: f32) -> Self {
        self.size = Vector2::new(w, h);
        self
    }

    pub fn corner_radius(mut self, r: f32) -> Self {
        self.corner_radius = r;
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn spawn(self, scene: &mut Scene) -> FrameworkResult<EntityId> {
        self.common.validate("checkbox")?;
        let size = check_size("checkbox", self.size)?;
        let corner_radius = check_non_negative("checkbox", "corner radius", self.corner_radius)?;
        let mut label = self.label.label("checkbox", scene)?;
        if label.color == Rgba::WHITE && self.common.color == Rgba::WHITE {
            // A white mark on a white box would be invisible.
            label.color = Rgba::BLACK;
        }
        let bundle = (
            self.common.bundle(scene.config().use_radians),
            Shape::CheckBox {
                corner_radius,
                checked: self.checked,
            },
            size,
            label,
        );
        Ok(scene.spawn(bundle))
    }
}

common_setters!(CheckBoxBuilder);
text_setters!(CheckBoxBuilder);

// ---------------------------------------------------------------------- Img

/// A box that blits a bitmap once the surface has loaded it.
#[derive(Clone, Debug)]
pub struct ImgBuilder {
    common: Common,
    source: String,
    size: Vector2,
}

impl ImgBuilder {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            common: Common::new(false),
            source: source.into(),
            size: Vector2::splat(DEFAULT_BOX_SIZE),
        }
    }

    pub fn size(mut self, w: f32, h: f32) -> Self {
        self.size = Vector2::new(w, h);
        self
    }

    pub fn spawn(self, scene: &mut Scene) -> FrameworkResult<EntityId> {
        self.common.validate("img")?;
        let size = check_size("img", self.size)?;
        if self.source.trim().is_empty() {
            return Err(FrameworkError::argument("img: source is empty"));
        }
        let bundle = (
            self.common.bundle(scene.config().use_radians),
            Shape::Image {
                source: self.source,
            },
            size,
        );
        Ok(scene.spawn(bundle))
    }
}

common_setters!(ImgBuilder);

// --------------------------------------------------------------------- Text

/// A label drawn at its position; its size follows the measured text.
#[derive(Clone, Debug)]
pub struct TextBuilder {
    common: Common,
    label: Text,
}

impl TextBuilder {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            common: Common::new(false),
            label: Text::new(text),
        }
    }

    pub fn spawn(self, scene: &mut Scene) -> FrameworkResult<EntityId> {
        self.common.validate("text")?;
        let label = self.label.label("text", scene)?;
        // Width is measured on the first frame.
        let size = Size::new(0.0, label.font.size);
        let bundle = (self.common.bundle(scene.config().use_radians), Shape::Text, size, label);
        Ok(scene.spawn(bundle))
    }
}

common_setters!(TextBuilder);
text_setters!(TextBuilder);

// ------------------------------------------------------------------- Circle

/// A filled circle centered on its position.
#[derive(Clone, Debug)]
pub struct CircleBuilder {
    common: Common,
    radius: f32,
}

impl Default for CircleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CircleBuilder {
    pub fn new() -> Self {
        Self {
            common: Common::new(true),
            radius: DEFAULT_RADIUS,
        }
    }

    pub fn radius(mut self, r: f32) -> Self {
        self.radius = r;
        self
    }

    pub fn spawn(self, scene: &mut Scene) -> FrameworkResult<EntityId> {
        self.common.validate("circle")?;
        let radius = check_non_negative("circle", "radius", self.radius)?;
        let bundle = (
            self.common.bundle(scene.config().use_radians),
            Shape::Circle,
            Radius { radius },
        );
        Ok(scene.spawn(bundle))
    }
}

common_setters!(CircleBuilder);

// --------------------------------------------------------------------- Line

/// A stroked segment from the position to `end`.
#[derive(Clone, Debug)]
pub struct LineBuilder {
    common: Common,
    end: Vector2,
    weight: f32,
}

impl LineBuilder {
    pub fn new(start: Vector2, end: Vector2) -> Self {
        let mut common = Common::new(true);
        common.pos = start;
        Self {
            common,
            end,
            weight: DEFAULT_LINE_WEIGHT,
        }
    }

    pub fn weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    pub fn spawn(self, scene: &mut Scene) -> FrameworkResult<EntityId> {
        self.common.validate("line")?;
        if !self.end.is_finite() {
            return Err(FrameworkError::argument("line: end point must be finite"));
        }
        let weight = check_non_negative("line", "weight", self.weight)?;
        let bundle = (
            self.common.bundle(scene.config().use_radians),
            Shape::Line {
                end: self.end,
                weight,
            },
        );
        Ok(scene.spawn(bundle))
    }
}

common_setters!(LineBuilder);

// --------------------------------------------------------------------- Poly

/// A filled polygon through its points, closed implicitly.
#[derive(Clone, Debug)]
pub struct PolyBuilder {
    common: Common,
    points: Points,
}

impl PolyBuilder {
    pub fn new(points: impl IntoIterator<Item = Vector2>) -> Self {
        Self {
            common: Common::new(true),
            points: points.into_iter().collect(),
        }
    }

    pub fn point(mut self, x: f32, y: f32) -> Self {
        self.points.push(Vector2::new(x, y));
        self
    }

    pub fn spawn(self, scene: &mut Scene) -> FrameworkResult<EntityId> {
        self.common.validate("poly")?;
        if let Some(bad) = self.points.iter().position(|p| !p.is_finite()) {
            return Err(FrameworkError::argument(format!(
                "poly: point {bad} is not finite"
            )));
        }
        let bundle = (
            self.common.bundle(scene.config().use_radians),
            Shape::Poly {
                points: self.points,
            },
        );
        Ok(scene.spawn(bundle))
    }
}

common_setters!(PolyBuilder);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_defaults() {
        let mut scene = Scene::default();
        let id = BoxBuilder::new().spawn(&mut scene).unwrap();
        assert_eq!(scene.get::<Position>(id).unwrap().pos, Vector2::ZERO);
        assert_eq!(scene.get::<Size>(id).unwrap().size, Vector2::splat(16.0));
        assert_eq!(scene.get::<Tint>(id).unwrap().color, Rgba::WHITE);
        assert_eq!(
            scene.get::<Shape>(id),
            Some(&Shape::Rect { corner_radius: 0.0 })
        );
        let g = scene.get::<Graphic>(id).unwrap();
        assert!(g.visible && !g.draw_from_origin && !g.mask);
        assert_eq!(scene.get::<Enabled>(id), Some(&Enabled(true)));
        assert!(scene.get::<Hover>(id).unwrap().is_idle());
    }

    #[test]
    fn test_button_takes_configured_font() {
        let mut config = crate::resources::config::FrameworkConfig::new();
        config.font = Font::new("Courier", 12.0);
        let mut scene = Scene::new(config);
        let id = ButtonBuilder::new("Go")
            .text_color(Rgba::BLACK)
            .spawn(&mut scene)
            .unwrap();
        let label = scene.get::<Label>(id).unwrap();
        assert_eq!(label.font.css(), "12px Courier");
        assert_eq!(label.color, Rgba::BLACK);
        assert_eq!(label.text, "Go");
    }

    #[test]
    fn test_absolute_shapes_default_to_origin_drawing() {
        let mut scene = Scene::default();
        let c = CircleBuilder::new().radius(5.0).spawn(&mut scene).unwrap();
        let l = LineBuilder::new(Vector2::ZERO, Vector2::new(10.0, 0.0))
            .spawn(&mut scene)
            .unwrap();
        let p = PolyBuilder::new([Vector2::ZERO])
            .point(5.0, 5.0)
            .spawn(&mut scene)
            .unwrap();
        for id in [c, l, p] {
            assert!(scene.get::<Graphic>(id).unwrap().draw_from_origin);
        }
        assert_eq!(scene.get::<Radius>(c).unwrap().radius, 5.0);
        assert!(matches!(scene.get::<Shape>(p), Some(Shape::Poly { points }) if points.len() == 2));
    }

    #[test]
    fn test_validation_errors() {
        let mut scene = Scene::default();
        let bad = [
            BoxBuilder::new().size(-1.0, 5.0).spawn(&mut scene),
            BoxBuilder::new().pos(f32::NAN, 0.0).spawn(&mut scene),
            ButtonBuilder::new("x")
                .font(Font::new("", 12.0))
                .spawn(&mut scene),
            LineBuilder::new(Vector2::ZERO, Vector2::ZERO)
                .weight(-2.0)
                .spawn(&mut scene),
            CircleBuilder::new().radius(f32::INFINITY).spawn(&mut scene),
            ImgBuilder::new("  ").spawn(&mut scene),
            PolyBuilder::new([Vector2::new(f32::NAN, 0.0)]).spawn(&mut scene),
        ];
        for r in bad {
            assert!(matches!(r, Err(FrameworkError::ArgumentType(_))));
        }
        assert!(scene.ids().is_empty());
    }

    #[test]
    fn test_radians_follow_config_unless_overridden() {
        let mut config = crate::resources::config::FrameworkConfig::new();
        config.use_radians = true;
        let mut scene = Scene::new(config);
        let a = BoxBuilder::new().angle(1.0).spawn(&mut scene).unwrap();
        let b = BoxBuilder::new()
            .angle(90.0)
            .use_radians(false)
            .spawn(&mut scene)
            .unwrap();
        assert!(scene.get::<Rotation>(a).unwrap().use_radians);
        assert!(!scene.get::<Rotation>(b).unwrap().use_radians);
    }
}
