//! Windowed backend on top of raylib.
//!
//! raylib draws in screen space only, so [`RaylibSurface`] keeps its own
//! translate/rotate stack, flattens paths into polylines and fills them as
//! triangle fans. Clipping maps onto the scissor rectangle (axis-aligned
//! bounding box of the transformed clip). Text always uses raylib's default
//! font; the family of a [`Font`] is ignored, its size is honoured.
//!
//! Bitmaps are loaded by [`TextureCache`] between frames: a source asked
//! for during a frame is ready from the next one on.

use log::{debug, info, warn};
use raylib::consts::{KeyboardKey, MouseButton as RlMouseButton};
use raylib::ffi;
use raylib::math::Vector2 as RlVector2;
use raylib::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use std::ffi::CString;
use std::time::{Duration, Instant};

use crate::components::shape::{Font, Shape};
use crate::resources::input::{InputEvent, MouseButton};
use crate::scene::Scene;
use crate::scheduler::Scheduler;
use crate::surface::Surface;
use crate::types::{Rgba, Vector2};

fn color(c: Rgba) -> Color {
    Color::new(c.r, c.g, c.b, c.a)
}

/// Row-major 2x3 affine transform: `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Affine {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Affine {
    const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn apply(&self, x: f32, y: f32) -> RlVector2 {
        RlVector2::new(
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.e += self.a * x + self.c * y;
        self.f += self.b * x + self.d * y;
    }

    fn rotate(&mut self, radians: f32) {
        let (sin, cos) = radians.sin_cos();
        let (a, b, c, d) = (self.a, self.b, self.c, self.d);
        self.a = a * cos + c * sin;
        self.b = b * cos + d * sin;
        self.c = c * cos - a * sin;
        self.d = d * cos - b * sin;
    }

    fn degrees(&self) -> f32 {
        self.b.atan2(self.a).to_degrees()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Scissor {
    x: i32,
    y: i32,
    w: i32,
    h: i32,
}

impl Scissor {
    fn intersect(self, other: Scissor) -> Scissor {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let r = (self.x + self.w).min(other.x + other.w);
        let b = (self.y + self.h).min(other.y + other.h);
        Scissor {
            x,
            y,
            w: (r - x).max(0),
            h: (b - y).max(0),
        }
    }

    fn begin(self) {
        unsafe { ffi::BeginScissorMode(self.x, self.y, self.w, self.h) };
    }
}

#[derive(Clone, Copy, Debug)]
struct DrawState {
    transform: Affine,
    clip: Option<Scissor>,
}

#[derive(Default)]
struct SubPath {
    points: Vec<RlVector2>,
    closed: bool,
}

/// Loaded bitmaps keyed by source path.
#[derive(Default)]
pub struct TextureCache {
    textures: FxHashMap<String, Texture2D>,
    pending: FxHashSet<String>,
    failed: FxHashSet<String>,
}

impl TextureCache {
    pub fn is_loaded(&self, source: &str) -> bool {
        self.textures.contains_key(source)
    }

    fn request(&mut self, source: &str) {
        if !self.failed.contains(source) && !self.textures.contains_key(source) {
            self.pending.insert(source.to_string());
        }
    }

    /// Load everything requested since the last call. Must run outside a
    /// drawing scope.
    pub fn load_pending(&mut self, rl: &mut RaylibHandle, thread: &RaylibThread) {
        for source in std::mem::take(&mut self.pending) {
            match rl.load_texture(thread, &source) {
                Ok(texture) => {
                    debug!("Loaded texture '{}'", source);
                    self.textures.insert(source, texture);
                }
                Err(e) => {
                    warn!("Failed to load texture '{}': {}", source, e);
                    self.failed.insert(source);
                }
            }
        }
    }
}

/// A [`Surface`] drawing into an open raylib frame.
pub struct RaylibSurface<'a, 'h> {
    d: &'a mut RaylibDrawHandle<'h>,
    textures: &'a mut TextureCache,
    state: DrawState,
    stack: Vec<DrawState>,
    path: Vec<SubPath>,
    // Current point in local coordinates, for arc_to.
    cursor: Option<Vector2>,
}

impl<'a, 'h> RaylibSurface<'a, 'h> {
    pub fn new(d: &'a mut RaylibDrawHandle<'h>, textures: &'a mut TextureCache) -> Self {
        Self {
            d,
            textures,
            state: DrawState {
                transform: Affine::IDENTITY,
                clip: None,
            },
            stack: Vec::new(),
            path: Vec::new(),
            cursor: None,
        }
    }

    fn push_point(&mut self, x: f32, y: f32) {
        let p = self.state.transform.apply(x, y);
        match self.path.last_mut() {
            Some(sub) if !sub.closed => sub.points.push(p),
            _ => self.path.push(SubPath {
                points: vec![p],
                closed: false,
            }),
        }
        self.cursor = Some(Vector2::new(x, y));
    }

    fn fill_triangle(&mut self, a: RlVector2, mut b: RlVector2, mut c: RlVector2, col: Color) {
        // raylib culls clockwise triangles; on a y-down screen that is a
        // positive cross product.
        let cross = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
        if cross == 0.0 {
            return;
        }
        if cross > 0.0 {
            std::mem::swap(&mut b, &mut c);
        }
        self.d.draw_triangle(a, b, c, col);
    }

    fn apply_clip(&self, clip: Option<Scissor>) {
        match clip {
            Some(s) => s.begin(),
            None => unsafe { ffi::EndScissorMode() },
        }
    }
}

impl Drop for RaylibSurface<'_, '_> {
    fn drop(&mut self) {
        if self.state.clip.is_some() {
            unsafe { ffi::EndScissorMode() };
        }
    }
}

fn arc_segments(radius: f32, sweep: f32) -> usize {
    ((sweep.abs() * radius / 4.0).ceil() as usize).clamp(4, 64)
}

impl Surface for RaylibSurface<'_, '_> {
    fn size(&self) -> Vector2 {
        Vector2::new(
            self.d.get_screen_width() as f32,
            self.d.get_screen_height() as f32,
        )
    }

    fn clear_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        // glClear honours the scissor box, which gives a partial clear.
        let p = self.state.transform.apply(x, y);
        let area = Scissor {
            x: p.x as i32,
            y: p.y as i32,
            w: w as i32,
            h: h as i32,
        };
        area.begin();
        self.d.clear_background(Color::BLANK);
        self.apply_clip(self.state.clip);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, col: Rgba) {
        let t = self.state.transform;
        let (tl, tr) = (t.apply(x, y), t.apply(x + w, y));
        let (br, bl) = (t.apply(x + w, y + h), t.apply(x, y + h));
        let col = color(col);
        self.fill_triangle(tl, bl, br, col);
        self.fill_triangle(tl, br, tr, col);
    }

    fn begin_path(&mut self) {
        self.path.clear();
        self.cursor = None;
    }

    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.state.transform.apply(x, y);
        self.path.push(SubPath {
            points: vec![p],
            closed: false,
        });
        self.cursor = Some(Vector2::new(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.push_point(x, y);
    }

    fn arc_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, radius: f32) {
        let Some(p0) = self.cursor else {
            self.move_to(x1, y1);
            return;
        };
        let p1 = Vector2::new(x1, y1);
        let p2 = Vector2::new(x2, y2);
        let v1 = p0 - p1;
        let v2 = p2 - p1;
        let (l1, l2) = (v1.x.hypot(v1.y), v2.x.hypot(v2.y));
        if radius <= 0.0 || l1 == 0.0 || l2 == 0.0 {
            self.line_to(x1, y1);
            return;
        }
        let u1 = Vector2::new(v1.x / l1, v1.y / l1);
        let u2 = Vector2::new(v2.x / l2, v2.y / l2);
        let angle = (u1.x * u2.x + u1.y * u2.y).clamp(-1.0, 1.0).acos();
        if angle.sin().abs() < 1e-6 {
            self.line_to(x1, y1);
            return;
        }
        let tangent = radius / (angle / 2.0).tan();
        let t1 = p1 + Vector2::new(u1.x * tangent, u1.y * tangent);
        let t2 = p1 + Vector2::new(u2.x * tangent, u2.y * tangent);
        let bis = u1 + u2;
        let bis_len = bis.x.hypot(bis.y);
        let dist = radius / (angle / 2.0).sin();
        let center = p1 + Vector2::new(bis.x / bis_len * dist, bis.y / bis_len * dist);

        let a0 = (t1.y - center.y).atan2(t1.x - center.x);
        let a1 = (t2.y - center.y).atan2(t2.x - center.x);
        let mut sweep = a1 - a0;
        while sweep > std::f32::consts::PI {
            sweep -= std::f32::consts::TAU;
        }
        while sweep < -std::f32::consts::PI {
            sweep += std::f32::consts::TAU;
        }
        self.line_to(t1.x, t1.y);
        let n = arc_segments(radius, sweep);
        for i in 1..=n {
            let a = a0 + sweep * i as f32 / n as f32;
            self.push_point(center.x + radius * a.cos(), center.y + radius * a.sin());
        }
    }

    fn arc(&mut self, cx: f32, cy: f32, radius: f32, start_angle: f32, end_angle: f32) {
        let mut sweep = end_angle - start_angle;
        if sweep >= std::f32::consts::TAU {
            sweep = std::f32::consts::TAU;
        } else if sweep < 0.0 {
            sweep = sweep.rem_euclid(std::f32::consts::TAU);
        }
        let n = arc_segments(radius, sweep);
        for i in 0..=n {
            let a = start_angle + sweep * i as f32 / n as f32;
            self.push_point(cx + radius * a.cos(), cy + radius * a.sin());
        }
    }

    fn close_path(&mut self) {
        if let Some(sub) = self.path.last_mut() {
            sub.closed = true;
            if let Some(first) = sub.points.first() {
                let first = *first;
                // Reopen a subpath at the start point, like a canvas does.
                self.path.push(SubPath {
                    points: vec![first],
                    closed: false,
                });
            }
        }
    }

    fn fill(&mut self, col: Rgba) {
        let col = color(col);
        let path = std::mem::take(&mut self.path);
        // Fan triangulation; concave outlines may overdraw.
        for sub in path.iter().filter(|s| s.points.len() >= 3) {
            let a = sub.points[0];
            for w in sub.points[1..].windows(2) {
                self.fill_triangle(a, w[0], w[1], col);
            }
        }
        self.path = path;
    }

    fn stroke(&mut self, col: Rgba, width: f32) {
        let col = color(col);
        for sub in &self.path {
            for w in sub.points.windows(2) {
                self.d.draw_line_ex(w[0], w[1], width, col);
            }
            if sub.closed && sub.points.len() > 2 {
                if let (Some(first), Some(last)) = (sub.points.first(), sub.points.last()) {
                    self.d.draw_line_ex(*last, *first, width, col);
                }
            }
        }
    }

    fn measure_text(&mut self, text: &str, font: &Font) -> f32 {
        let Ok(c_text) = CString::new(text) else {
            warn!("Cannot measure text containing NUL: {:?}", text);
            return 0.0;
        };
        unsafe { ffi::MeasureText(c_text.as_ptr(), font.size as i32) as f32 }
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, font: &Font, col: Rgba) {
        let Ok(c_text) = CString::new(text) else {
            warn!("Cannot draw text containing NUL: {:?}", text);
            return;
        };
        let pos = self.state.transform.apply(x, y);
        let rotation = self.state.transform.degrees();
        // Default font spacing, matching MeasureText.
        let spacing = (font.size / 10.0).max(1.0);
        unsafe {
            ffi::DrawTextPro(
                ffi::GetFontDefault(),
                c_text.as_ptr(),
                pos.into(),
                RlVector2::zero().into(),
                rotation,
                font.size,
                spacing,
                color(col).into(),
            );
        }
    }

    fn image_ready(&mut self, source: &str) -> bool {
        if self.textures.is_loaded(source) {
            return true;
        }
        self.textures.request(source);
        false
    }

    fn draw_image(&mut self, source: &str, x: f32, y: f32, w: f32, h: f32) {
        let Some(texture) = self.textures.textures.get(source) else {
            return;
        };
        let pos = self.state.transform.apply(x, y);
        let src = Rectangle::new(0.0, 0.0, texture.width as f32, texture.height as f32);
        let dest = Rectangle::new(pos.x, pos.y, w, h);
        let rotation = self.state.transform.degrees();
        self.d
            .draw_texture_pro(texture, src, dest, RlVector2::zero(), rotation, Color::WHITE);
    }

    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        let Some(prev) = self.stack.pop() else {
            warn!("restore() without matching save()");
            return;
        };
        if prev.clip != self.state.clip {
            self.apply_clip(prev.clip);
        }
        self.state = prev;
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.state.transform.translate(x, y);
    }

    fn rotate(&mut self, radians: f32) {
        self.state.transform.rotate(radians);
    }

    fn clip_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let t = self.state.transform;
        let corners = [
            t.apply(x, y),
            t.apply(x + w, y),
            t.apply(x + w, y + h),
            t.apply(x, y + h),
        ];
        let min_x = corners.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        let min_y = corners.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let max_x = corners.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
        let max_y = corners.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
        let mut clip = Scissor {
            x: min_x.floor() as i32,
            y: min_y.floor() as i32,
            w: (max_x - min_x).ceil() as i32,
            h: (max_y - min_y).ceil() as i32,
        };
        if let Some(active) = self.state.clip {
            clip = clip.intersect(active);
        }
        clip.begin();
        self.state.clip = Some(clip);
    }
}

const KEY_NAMES: &[(KeyboardKey, &str)] = &[
    (KeyboardKey::KEY_SPACE, "Space"),
    (KeyboardKey::KEY_ENTER, "Enter"),
    (KeyboardKey::KEY_ESCAPE, "Escape"),
    (KeyboardKey::KEY_LEFT, "ArrowLeft"),
    (KeyboardKey::KEY_RIGHT, "ArrowRight"),
    (KeyboardKey::KEY_UP, "ArrowUp"),
    (KeyboardKey::KEY_DOWN, "ArrowDown"),
];

fn key_name(key: KeyboardKey) -> String {
    KEY_NAMES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, n)| n.to_string())
        .unwrap_or_else(|| format!("{:?}", key))
}

/// Forwards raylib's polled input to the scene's input queue as edges.
#[derive(Default)]
struct InputForwarder {
    on_screen: bool,
    last_pointer: Option<Vector2>,
    held_keys: Vec<KeyboardKey>,
}

impl InputForwarder {
    fn poll(&mut self, rl: &mut RaylibHandle, scene: &Scene) {
        let tx = scene.input_sender();
        let mut send = |event: InputEvent| {
            if tx.send(event).is_err() {
                warn!("Input queue closed");
            }
        };

        if !rl.is_cursor_on_screen() {
            if self.on_screen {
                send(InputEvent::PointerLeave);
                self.on_screen = false;
                self.last_pointer = None;
            }
        } else {
            self.on_screen = true;
            let m = rl.get_mouse_position();
            let pointer = Vector2::new(m.x, m.y);
            if self.last_pointer != Some(pointer) {
                send(InputEvent::PointerMove {
                    x: pointer.x,
                    y: pointer.y,
                });
                self.last_pointer = Some(pointer);
            }
            for (rl_button, button) in [
                (RlMouseButton::MOUSE_BUTTON_LEFT, MouseButton::Left),
                (RlMouseButton::MOUSE_BUTTON_MIDDLE, MouseButton::Middle),
                (RlMouseButton::MOUSE_BUTTON_RIGHT, MouseButton::Right),
            ] {
                if rl.is_mouse_button_pressed(rl_button) {
                    send(InputEvent::PointerDown(button));
                }
                if rl.is_mouse_button_released(rl_button) {
                    send(InputEvent::PointerUp(button));
                }
            }
        }

        while let Some(key) = rl.get_key_pressed() {
            send(InputEvent::KeyDown(key_name(key)));
            self.held_keys.push(key);
        }
        self.held_keys.retain(|&key| {
            let up = rl.is_key_up(key);
            if up {
                send(InputEvent::KeyUp(key_name(key)));
            }
            !up
        });
    }
}

/// Open a window and drive `scene` until it is closed, the scheduler is
/// stopped or `limit` elapses.
pub fn run_window(
    scene: &mut Scene,
    scheduler: &mut Scheduler,
    width: i32,
    height: i32,
    title: &str,
    limit: Option<Duration>,
) -> u64 {
    let (mut rl, thread) = raylib::init()
        .size(width, height)
        .resizable()
        .title(title)
        .build();
    info!("Window {}x{} opened", width, height);

    // Preload every bitmap the scene already knows about.
    let mut textures = TextureCache::default();
    for id in scene.ids() {
        if let Some(Shape::Image { source }) = scene.get::<Shape>(id) {
            textures.request(source);
        }
    }
    textures.load_pending(&mut rl, &thread);

    let mut input = InputForwarder::default();
    let started = Instant::now();
    let base = scene.now();
    let frames_before = scene.timing().frames;

    while !rl.window_should_close() && scheduler.is_running() {
        let elapsed = started.elapsed();
        if limit.is_some_and(|l| elapsed >= l) {
            break;
        }
        let clock = || base + started.elapsed().as_secs_f64() * 1000.0;
        input.poll(&mut rl, scene);
        scheduler.poll_tick_clock(scene, &clock);

        let now = clock();
        if scheduler.frame_due(now) {
            textures.load_pending(&mut rl, &thread);
            let mut d = rl.begin_drawing(&thread);
            let mut surface = RaylibSurface::new(&mut d, &mut textures);
            scheduler.poll_frame_clock(scene, &mut surface, &clock);
        } else if let Some(wake) = scheduler.next_wake() {
            let wait = wake - now;
            if wait > 0.0 {
                std::thread::sleep(Duration::from_secs_f64(wait.min(5.0) / 1000.0));
            }
        }
    }
    info!("Window closed");
    scene.timing().frames - frames_before
}
