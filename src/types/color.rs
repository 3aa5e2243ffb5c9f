//! 8-bit RGBA color.
//!
//! Colors reach the drawing surface as typed values; [`Rgba::rgba_string`]
//! produces the `"rgba(r,g,b,a)"` form for surfaces that want a CSS-like
//! string (channels, alpha included, are written as 0-255 integers).

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{FrameworkError, FrameworkResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Channel names accepted by [`Rgba::set_channel`], in index order.
pub const CHANNELS: [&str; 4] = ["r", "g", "b", "a"];

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque gray, the single-argument form of the constructor.
    pub const fn gray(v: u8) -> Self {
        Self::new(v, v, v, 255)
    }

    /// Parse `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa` (the `#` is optional).
    ///
    /// Alpha defaults to 255 when the string carries none.
    pub fn from_hex(hex: &str) -> FrameworkResult<Self> {
        let digits: String = hex.chars().filter(|c| *c != '#').collect();
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(FrameworkError::argument(format!(
                "invalid hexadecimal color {hex:?}"
            )));
        }
        let pair = |s: &str| -> FrameworkResult<u8> {
            u8::from_str_radix(s, 16)
                .map_err(|e| FrameworkError::argument(format!("invalid hexadecimal {s:?}: {e}")))
        };
        let doubled = |c: char| -> FrameworkResult<u8> { pair(&format!("{c}{c}")) };

        let chars: Vec<char> = digits.chars().collect();
        match chars.len() {
            3 | 4 => Ok(Self {
                r: doubled(chars[0])?,
                g: doubled(chars[1])?,
                b: doubled(chars[2])?,
                a: match chars.get(3) {
                    Some(c) => doubled(*c)?,
                    None => 255,
                },
            }),
            6 | 8 => Ok(Self {
                r: pair(&digits[0..2])?,
                g: pair(&digits[2..4])?,
                b: pair(&digits[4..6])?,
                a: if digits.len() == 8 {
                    pair(&digits[6..8])?
                } else {
                    255
                },
            }),
            _ => Err(FrameworkError::argument(format!(
                "invalid hexadecimal color {hex:?}"
            ))),
        }
    }

    /// Lowercase `#rrggbbaa`.
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }

    pub fn rgba_string(&self) -> String {
        format!("rgba({},{},{},{})", self.r, self.g, self.b, self.a)
    }

    pub fn rgb_string(&self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }

    /// Channel value by index (`0..4` = r, g, b, a).
    pub fn channel(&self, index: usize) -> Option<u8> {
        match index {
            0 => Some(self.r),
            1 => Some(self.g),
            2 => Some(self.b),
            3 => Some(self.a),
            _ => None,
        }
    }

    /// Write a channel from a float, rounding and clamping into `0..=255`.
    ///
    /// Returns `false` for an out-of-range index.
    pub fn set_channel_f32(&mut self, index: usize, value: f32) -> bool {
        let v = value.round().clamp(0.0, 255.0) as u8;
        match index {
            0 => self.r = v,
            1 => self.g = v,
            2 => self.b = v,
            3 => self.a = v,
            _ => return false,
        }
        true
    }

    /// Set a channel by name. Unknown names are logged and ignored.
    pub fn set_channel(&mut self, name: &str, value: u8) {
        match CHANNELS.iter().position(|c| *c == name) {
            Some(index) => {
                self.set_channel_f32(index, value as f32);
            }
            None => warn!("Unrecognized color channel '{}', ignoring", name),
        }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_six_digits() {
        let c = Rgba::from_hex("#ff0000").unwrap();
        assert_eq!(c, Rgba::new(255, 0, 0, 255));
        assert_eq!(c.hex(), "#ff0000ff");
    }

    #[test]
    fn test_from_hex_short_forms() {
        assert_eq!(Rgba::from_hex("#0f8").unwrap(), Rgba::new(0, 255, 136, 255));
        assert_eq!(Rgba::from_hex("0f88").unwrap(), Rgba::new(0, 255, 136, 136));
        assert_eq!(
            Rgba::from_hex("#10203040").unwrap(),
            Rgba::new(16, 32, 48, 64)
        );
    }

    #[test]
    fn test_from_hex_rejects_bad_input() {
        assert!(matches!(
            Rgba::from_hex("#12345"),
            Err(FrameworkError::ArgumentType(_))
        ));
        assert!(matches!(
            Rgba::from_hex("#gg0000"),
            Err(FrameworkError::ArgumentType(_))
        ));
        assert!(Rgba::from_hex("").is_err());
    }

    #[test]
    fn test_hex_round_trip() {
        let samples = [
            Rgba::new(0, 0, 0, 0),
            Rgba::new(255, 255, 255, 255),
            Rgba::new(1, 2, 3, 4),
            Rgba::new(171, 205, 239, 18),
            Rgba::new(9, 160, 15, 250),
        ];
        for c in samples {
            assert_eq!(Rgba::from_hex(&c.hex()).unwrap(), c);
        }
    }

    #[test]
    fn test_css_strings() {
        let c = Rgba::new(10, 20, 30, 255);
        assert_eq!(c.rgba_string(), "rgba(10,20,30,255)");
        assert_eq!(c.rgb_string(), "rgb(10,20,30)");
    }

    #[test]
    fn test_set_channel_by_name() {
        let mut c = Rgba::BLACK;
        c.set_channel("g", 128);
        assert_eq!(c, Rgba::new(0, 128, 0, 255));
        c.set_channel("z", 7);
        assert_eq!(c, Rgba::new(0, 128, 0, 255));
    }

    #[test]
    fn test_set_channel_f32_rounds_and_clamps() {
        let mut c = Rgba::BLACK;
        assert!(c.set_channel_f32(0, 127.6));
        assert!(c.set_channel_f32(1, 300.0));
        assert!(c.set_channel_f32(2, -5.0));
        assert!(!c.set_channel_f32(4, 1.0));
        assert_eq!(c, Rgba::new(128, 255, 0, 255));
    }

    #[test]
    fn test_default_is_white() {
        assert_eq!(Rgba::default(), Rgba::gray(255));
    }
}
