//! Framework configuration resource.
//!
//! Scheduling and rendering options, loadable from an INI file. Every value
//! has a safe default so a missing or partial file still yields a usable
//! configuration.
//!
//! # Configuration File Format
//!
//! ```ini
//! [render]
//! fps = 0
//! clear_frame = true
//! background = 000000ff
//! delta_samples = 50
//!
//! [tick]
//! tick_rate = 66
//! hover_policy = topmost
//!
//! [text]
//! font = 16px Arial
//!
//! [angle]
//! use_radians = false
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::{info, warn};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::components::shape::Font;
use crate::error::{FrameworkError, FrameworkResult};
use crate::types::Rgba;

const DEFAULT_FPS: u32 = 0;
const DEFAULT_TICK_RATE: u32 = 66;
const DEFAULT_CLEAR_FRAME: bool = true;
const DEFAULT_DELTA_SAMPLES: usize = 50;
const DEFAULT_USE_RADIANS: bool = false;
const DEFAULT_CONFIG_PATH: &str = "./ngf.ini";

/// Which entities count as hovered when several overlap under the pointer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HoverPolicy {
    /// Only the last registered (topmost drawn) entity under the pointer.
    #[default]
    Topmost,
    /// Every entity under the pointer.
    All,
}

impl FromStr for HoverPolicy {
    type Err = FrameworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "topmost" => Ok(HoverPolicy::Topmost),
            "all" => Ok(HoverPolicy::All),
            other => Err(FrameworkError::argument(format!(
                "unknown hover policy '{other}'"
            ))),
        }
    }
}

impl fmt::Display for HoverPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HoverPolicy::Topmost => write!(f, "topmost"),
            HoverPolicy::All => write!(f, "all"),
        }
    }
}

#[derive(Resource, Debug, Clone)]
pub struct FrameworkConfig {
    /// Target frames per second; `0` renders as fast as the host schedules.
    pub fps: u32,
    /// Think passes per second.
    pub tick_rate: u32,
    /// Clear the surface and paint `background` before each frame.
    pub clear_frame: bool,
    pub background: Rgba,
    /// Size of the frame-duration ring buffer.
    pub delta_samples: usize,
    pub hover_policy: HoverPolicy,
    /// Font given to new text-bearing graphics.
    pub font: Font,
    /// Whether new graphics interpret their angle as radians.
    pub use_radians: bool,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameworkConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            fps: DEFAULT_FPS,
            tick_rate: DEFAULT_TICK_RATE,
            clear_frame: DEFAULT_CLEAR_FRAME,
            background: Rgba::BLACK,
            delta_samples: DEFAULT_DELTA_SAMPLES,
            hover_policy: HoverPolicy::default(),
            font: Font::default(),
            use_radians: DEFAULT_USE_RADIANS,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Milliseconds between think passes.
    pub fn tick_interval_ms(&self) -> f64 {
        (1000.0 / self.tick_rate.max(1) as f64).round()
    }

    /// Milliseconds to wait after a frame before the next one; `0` when unpaced.
    pub fn frame_delay_ms(&self) -> f64 {
        if self.fps > 0 {
            (1000.0 / self.fps as f64).round()
        } else {
            0.0
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values keep their current values; invalid ones are logged
    /// and ignored. Fails only when the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> FrameworkResult<()> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| FrameworkError::io(format!("Failed to load config file: {}", e)))?;

        // [render] section
        if let Some(fps) = config.getuint("render", "fps").ok().flatten() {
            self.fps = fps as u32;
        }
        if let Some(clear) = config.getbool("render", "clear_frame").ok().flatten() {
            self.clear_frame = clear;
        }
        if let Some(bg) = config.get("render", "background") {
            match Rgba::from_hex(&bg) {
                Ok(c) => self.background = c,
                Err(e) => warn!("Ignoring render.background: {}", e),
            }
        }
        if let Some(n) = config.getuint("render", "delta_samples").ok().flatten() {
            if n == 0 {
                warn!("Ignoring render.delta_samples = 0");
            } else {
                self.delta_samples = n as usize;
            }
        }

        // [tick] section
        if let Some(rate) = config.getuint("tick", "tick_rate").ok().flatten() {
            if rate == 0 {
                warn!("Ignoring tick.tick_rate = 0");
            } else {
                self.tick_rate = rate as u32;
            }
        }
        if let Some(policy) = config.get("tick", "hover_policy") {
            match policy.parse() {
                Ok(p) => self.hover_policy = p,
                Err(e) => warn!("Ignoring tick.hover_policy: {}", e),
            }
        }

        // [text] section
        if let Some(font) = config.get("text", "font") {
            match Font::parse(&font) {
                Some(f) => self.font = f,
                None => warn!("Ignoring text.font '{}'", font),
            }
        }

        // [angle] section
        if let Some(radians) = config.getbool("angle", "use_radians").ok().flatten() {
            self.use_radians = radians;
        }

        info!(
            "Loaded config: fps={}, tick_rate={}, clear={}, bg={}, samples={}, hover={}, font='{}'",
            self.fps,
            self.tick_rate,
            self.clear_frame,
            self.background.hex(),
            self.delta_samples,
            self.hover_policy,
            self.font.css()
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> FrameworkResult<()> {
        let mut config = Ini::new();

        config.set("render", "fps", Some(self.fps.to_string()));
        config.set("render", "clear_frame", Some(self.clear_frame.to_string()));
        // Without the leading '#', which the INI parser would read as a comment.
        config.set(
            "render",
            "background",
            Some(self.background.hex().trim_start_matches('#').to_string()),
        );
        config.set("render", "delta_samples", Some(self.delta_samples.to_string()));

        config.set("tick", "tick_rate", Some(self.tick_rate.to_string()));
        config.set("tick", "hover_policy", Some(self.hover_policy.to_string()));

        config.set("text", "font", Some(self.font.css()));

        config.set("angle", "use_radians", Some(self.use_radians.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| FrameworkError::io(format!("Failed to save config file: {}", e)))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }
}
