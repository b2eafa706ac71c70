//! Color values and name parsing.
//!
//! Accepts the color spellings used throughout plot configuration:
//! - Single letters (`k`, `r`, `b`, ...)
//! - Tableau names (`tab:blue`) and the default cycle (`C0` to `C9`)
//! - Common CSS names (`darkgray`, `lightgoldenrodyellow`, ...)
//! - Hex strings (`#rgb`, `#rrggbb`, `#rrggbbaa`)
//! - Grayscale fractions (`"0.75"`)

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{RenderError, RenderResult};

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Tableau 10, also the default line cycle.
pub const TAB10: [(&str, u32); 10] = [
    ("tab:blue", 0x1f77b4),
    ("tab:orange", 0xff7f0e),
    ("tab:green", 0x2ca02c),
    ("tab:red", 0xd62728),
    ("tab:purple", 0x9467bd),
    ("tab:brown", 0x8c564b),
    ("tab:pink", 0xe377c2),
    ("tab:gray", 0x7f7f7f),
    ("tab:olive", 0xbcbd22),
    ("tab:cyan", 0x17becf),
];

const NAMED: &[(&str, u32)] = &[
    ("b", 0x0000ff),
    ("g", 0x008000),
    ("r", 0xff0000),
    ("c", 0x00bfbf),
    ("m", 0xbf00bf),
    ("y", 0xbfbf00),
    ("k", 0x000000),
    ("w", 0xffffff),
    ("black", 0x000000),
    ("white", 0xffffff),
    ("red", 0xff0000),
    ("green", 0x008000),
    ("blue", 0x0000ff),
    ("yellow", 0xffff00),
    ("orange", 0xffa500),
    ("purple", 0x800080),
    ("magenta", 0xff00ff),
    ("cyan", 0x00ffff),
    ("brown", 0xa52a2a),
    ("pink", 0xffc0cb),
    ("navy", 0x000080),
    ("teal", 0x008080),
    ("olive", 0x808000),
    ("maroon", 0x800000),
    ("gold", 0xffd700),
    ("gray", 0x808080),
    ("grey", 0x808080),
    ("darkgray", 0xa9a9a9),
    ("darkgrey", 0xa9a9a9),
    ("dimgray", 0x696969),
    ("lightgray", 0xd3d3d3),
    ("lightgrey", 0xd3d3d3),
    ("silver", 0xc0c0c0),
    ("darkblue", 0x00008b),
    ("darkred", 0x8b0000),
    ("darkgreen", 0x006400),
    ("darkorange", 0xff8c00),
    ("lightblue", 0xadd8e6),
    ("skyblue", 0x87ceeb),
    ("steelblue", 0x4682b4),
    ("royalblue", 0x4169e1),
    ("dodgerblue", 0x1e90ff),
    ("firebrick", 0xb22222),
    ("crimson", 0xdc143c),
    ("forestgreen", 0x228b22),
    ("limegreen", 0x32cd32),
    ("seagreen", 0x2e8b57),
    ("tan", 0xd2b48c),
    ("wheat", 0xf5deb3),
    ("beige", 0xf5f5dc),
    ("ivory", 0xfffff0),
    ("khaki", 0xf0e68c),
    ("lavender", 0xe6e6fa),
    ("violet", 0xee82ee),
    ("indigo", 0x4b0082),
    ("salmon", 0xfa8072),
    ("coral", 0xff7f50),
    ("tomato", 0xff6347),
    ("chocolate", 0xd2691e),
    ("sienna", 0xa0522d),
    ("lightgoldenrodyellow", 0xfafad2),
    ("lightyellow", 0xffffe0),
    ("lightgreen", 0x90ee90),
    ("lightcoral", 0xf08080),
    ("aliceblue", 0xf0f8ff),
    ("azure", 0xf0ffff),
    ("whitesmoke", 0xf5f5f5),
    ("gainsboro", 0xdcdcdc),
];

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    const fn from_u32(hex: u32) -> Self {
        Self::rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// Parse any supported color spelling.
    pub fn parse(s: &str) -> RenderResult<Self> {
        let name = s.trim();
        let lower = name.to_lowercase();

        if lower.starts_with('#') {
            return hex_to_rgba(&lower).ok_or_else(|| RenderError::InvalidColor(s.to_string()));
        }
        if let Some(&(_, hex)) = TAB10.iter().find(|(n, _)| *n == lower) {
            return Ok(Self::from_u32(hex));
        }
        if let Some(idx) = lower.strip_prefix('c').and_then(|d| d.parse::<usize>().ok()) {
            return Ok(Self::cycle(idx));
        }
        if let Some(&(_, hex)) = NAMED.iter().find(|(n, _)| *n == lower) {
            return Ok(Self::from_u32(hex));
        }
        if let Ok(gray) = lower.parse::<f32>() {
            if (0.0..=1.0).contains(&gray) {
                let v = (gray * 255.0).round() as u8;
                return Ok(Self::rgb(v, v, v));
            }
        }
        Err(RenderError::InvalidColor(s.to_string()))
    }

    /// Default line color cycle (`C0`, `C1`, ...).
    pub fn cycle(index: usize) -> Self {
        Self::from_u32(TAB10[index % TAB10.len()].1)
    }

    /// Replace alpha with a `0..=1` opacity multiplied into the current alpha.
    pub fn with_alpha(self, alpha: Option<f32>) -> Self {
        match alpha {
            Some(a) => Self {
                a: (self.a as f32 * a.clamp(0.0, 1.0)).round() as u8,
                ..self
            },
            None => self,
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    pub fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }

    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Linear color interpolation
pub fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    Color::new(
        mix(color1.r, color2.r),
        mix(color1.g, color2.g),
        mix(color1.b, color2.b),
        mix(color1.a, color2.a),
    )
}

/// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
pub fn hex_to_rgba(hex: &str) -> Option<Color> {
    let hex = hex.trim_start_matches('#');
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 => {
            let mut out = [0u8; 3];
            for (i, ch) in hex.chars().enumerate() {
                let v = ch.to_digit(16)? as u8;
                out[i] = v * 16 + v;
            }
            Some(Color::rgb(out[0], out[1], out[2]))
        }
        6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

impl FromStr for Color {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!(Color::parse("k").unwrap(), Color::BLACK);
        assert_eq!(Color::parse("tab:blue").unwrap(), Color::rgb(0x1f, 0x77, 0xb4));
        assert_eq!(Color::parse("DarkGray").unwrap(), Color::rgb(169, 169, 169));
        assert_eq!(Color::parse("C1").unwrap(), Color::parse("tab:orange").unwrap());
    }

    #[test]
    fn test_parse_hex_and_gray() {
        assert_eq!(Color::parse("#f00").unwrap(), Color::rgb(255, 0, 0));
        assert_eq!(Color::parse("#00ff0080").unwrap(), Color::new(0, 255, 0, 128));
        assert_eq!(Color::parse("0.5").unwrap(), Color::rgb(128, 128, 128));
        assert!(Color::parse("#12345").is_err());
        assert!(Color::parse("1.5").is_err());
        assert!(Color::parse("notacolor").is_err());
    }

    #[test]
    fn test_alpha_and_interpolation() {
        let half = Color::WHITE.with_alpha(Some(0.5));
        assert_eq!(half.a, 128);
        assert_eq!(Color::WHITE.with_alpha(None), Color::WHITE);
        let mid = interpolate_color(Color::BLACK, Color::WHITE, 0.5);
        assert_eq!(mid, Color::rgb(128, 128, 128));
    }
}
