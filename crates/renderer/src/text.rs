//! Text rendering with TrueType fonts loaded at runtime.
//!
//! Fonts come from an explicit path, the `EMCPY_FONT` environment variable or
//! a list of common system locations. When no font can be loaded, text
//! drawing is skipped with a warning and everything else still renders.

use std::path::{Path, PathBuf};

use image::{imageops, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use rusttype::{Font, Scale};
use tracing::{debug, warn};

use crate::canvas::Canvas;
use crate::color::Color;

/// Environment variable naming a TrueType font file.
pub const FONT_ENV: &str = "EMCPY_FONT";

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "bold" | "heavy" | "semibold" | "demibold" => FontWeight::Bold,
            _ => FontWeight::Normal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VAlign {
    Top,
    #[default]
    Center,
    Bottom,
}

/// How a string is placed relative to its anchor point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub color: Color,
    pub weight: FontWeight,
    pub halign: HAlign,
    pub valign: VAlign,
    pub italic: bool,
    /// Rotate 90 degrees counter-clockwise
    pub vertical: bool,
    /// Opaque box drawn behind the text
    pub background: Option<Color>,
}

impl TextStyle {
    pub fn new(size: f32, color: Color) -> Self {
        Self {
            size,
            color,
            weight: FontWeight::Normal,
            italic: false,
            halign: HAlign::Center,
            valign: VAlign::Center,
            vertical: false,
            background: None,
        }
    }

    pub fn align(mut self, halign: HAlign, valign: VAlign) -> Self {
        self.halign = halign;
        self.valign = valign;
        self
    }

    pub fn weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn vertical(mut self) -> Self {
        self.vertical = true;
        self
    }
}

/// Regular, bold and italic faces used for every label in a figure.
#[derive(Clone, Default)]
pub struct FontBook {
    regular: Option<Font<'static>>,
    bold: Option<Font<'static>>,
    italic: Option<Font<'static>>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("regular", &self.regular.is_some())
            .field("bold", &self.bold.is_some())
            .field("italic", &self.italic.is_some())
            .finish()
    }
}

fn load_font(path: &Path) -> Option<Font<'static>> {
    let bytes = std::fs::read(path).ok()?;
    Font::try_from_vec(bytes)
}

/// Guess a sibling face of a regular font (`DejaVuSans.ttf` -> `DejaVuSans-Bold.ttf`).
fn sibling(path: &Path, suffix: &str) -> Option<PathBuf> {
    let stem = path.file_stem()?.to_str()?;
    let ext = path.extension()?.to_str()?;
    let base = stem.strip_suffix("-Regular").unwrap_or(stem);
    Some(path.with_file_name(format!("{}-{}.{}", base, suffix, ext)))
}

impl FontBook {
    /// A book without fonts; every draw call is a no-op.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the first readable font among `preferred`, `$EMCPY_FONT` and
    /// the system fallbacks.
    pub fn discover(preferred: &[PathBuf]) -> Self {
        let env = std::env::var_os(FONT_ENV).map(PathBuf::from);
        let candidates = preferred
            .iter()
            .cloned()
            .chain(env)
            .chain(SYSTEM_FONTS.iter().map(PathBuf::from));

        for path in candidates {
            if let Some(regular) = load_font(&path) {
                let bold = sibling(&path, "Bold").and_then(|p| load_font(&p));
                let italic = ["Oblique", "Italic"]
                    .iter()
                    .find_map(|s| sibling(&path, s).and_then(|p| load_font(&p)));
                debug!(
                    path = %path.display(),
                    bold = bold.is_some(),
                    italic = italic.is_some(),
                    "Loaded font"
                );
                return Self {
                    regular: Some(regular),
                    bold,
                    italic,
                };
            }
        }
        warn!("No usable TrueType font found; text will not be drawn (set {})", FONT_ENV);
        Self::empty()
    }

    pub fn from_bytes(regular: Vec<u8>, bold: Option<Vec<u8>>) -> Self {
        Self {
            regular: Font::try_from_vec(regular),
            bold: bold.and_then(Font::try_from_vec),
            italic: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.regular.is_some()
    }

    fn face(&self, weight: FontWeight, italic: bool) -> Option<&Font<'static>> {
        match (weight, italic) {
            (FontWeight::Bold, _) => self.bold.as_ref().or(self.regular.as_ref()),
            (FontWeight::Normal, true) => self.italic.as_ref().or(self.regular.as_ref()),
            (FontWeight::Normal, false) => self.regular.as_ref(),
        }
    }

    /// Width and height in pixels of possibly multi-line text, unrotated.
    ///
    /// Without a font the size is estimated from character counts so layout
    /// still reserves room.
    pub fn measure(&self, text: &str, size: f32, weight: FontWeight) -> (f32, f32) {
        let lines: Vec<&str> = text.split('\n').collect();
        let line_height = size * 1.2;
        let height = line_height * lines.len() as f32;
        let width = match self.face(weight, false) {
            Some(font) => lines
                .iter()
                .map(|l| text_size(Scale::uniform(size), font, l).0 as f32)
                .fold(0.0, f32::max),
            None => lines
                .iter()
                .map(|l| l.chars().count() as f32 * size * 0.6)
                .fold(0.0, f32::max),
        };
        (width, height)
    }

    /// Render text to a straight-alpha image sized to fit.
    fn rasterize(&self, text: &str, style: &TextStyle) -> Option<RgbaImage> {
        let font = self.face(style.weight, style.italic)?;
        let (w, h) = self.measure(text, style.size, style.weight);
        let width = w.ceil() as u32 + 2;
        let height = h.ceil() as u32 + 2;
        let scale = Scale::uniform(style.size);
        let line_height = style.size * 1.2;

        // Coverage mask: white glyphs on a zeroed image give alpha = coverage
        let mut mask = RgbaImage::new(width, height);
        for (i, line) in text.split('\n').enumerate() {
            let lw = text_size(scale, font, line).0 as f32;
            let x = match style.halign {
                HAlign::Left => 1.0,
                HAlign::Center => (width as f32 - lw) / 2.0,
                HAlign::Right => width as f32 - lw - 1.0,
            };
            let y = 1.0 + i as f32 * line_height + (line_height - style.size) / 2.0;
            draw_text_mut(&mut mask, Rgba([255, 255, 255, 255]), x as i32, y as i32, scale, font, line);
        }

        let c = style.color;
        for px in mask.pixels_mut() {
            let coverage = px.0[3] as u16;
            let a = (coverage * c.a as u16 / 255) as u8;
            *px = Rgba([c.r, c.g, c.b, a]);
        }
        if let Some(bg) = style.background {
            for px in mask.pixels_mut() {
                let a = px.0[3] as f32 / 255.0;
                let blend = |fg: u8, b: u8| (fg as f32 * a + b as f32 * (1.0 - a)).round() as u8;
                *px = Rgba([blend(c.r, bg.r), blend(c.g, bg.g), blend(c.b, bg.b), bg.a.max(px.0[3])]);
            }
        }

        Some(if style.vertical { imageops::rotate270(&mask) } else { mask })
    }

    /// Draw text anchored at `(x, y)` according to the style's alignment.
    pub fn draw(&self, canvas: &mut Canvas, text: &str, x: f32, y: f32, style: &TextStyle) {
        if text.is_empty() {
            return;
        }
        let Some(img) = self.rasterize(text, style) else {
            return;
        };
        let (w, h) = (img.width() as f32, img.height() as f32);
        // For vertical text alignment still refers to the screen axes
        let left = match style.halign {
            HAlign::Left => x,
            HAlign::Center => x - w / 2.0,
            HAlign::Right => x - w,
        };
        let top = match style.valign {
            VAlign::Top => y,
            VAlign::Center => y - h / 2.0,
            VAlign::Bottom => y - h,
        };
        canvas.blit(&img, left.round() as i32, top.round() as i32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_book_estimates_size() {
        let book = FontBook::empty();
        assert!(!book.is_available());
        let (w, h) = book.measure("abcd\nef", 10.0, FontWeight::Normal);
        assert!((w - 24.0).abs() < 1e-4);
        assert!((h - 24.0).abs() < 1e-4);
    }

    #[test]
    fn test_draw_without_font_is_noop() {
        let mut canvas = Canvas::new(20, 20, Color::WHITE).unwrap();
        FontBook::empty().draw(&mut canvas, "x", 10.0, 10.0, &TextStyle::new(12.0, Color::BLACK));
        assert!(canvas.to_rgba().iter().all(|&b| b == 255));
    }

    #[test]
    fn test_sibling_names() {
        let p = sibling(Path::new("/fonts/DejaVuSans.ttf"), "Bold").unwrap();
        assert_eq!(p, PathBuf::from("/fonts/DejaVuSans-Bold.ttf"));
        let p = sibling(Path::new("/f/LiberationSans-Regular.ttf"), "Italic").unwrap();
        assert_eq!(p, PathBuf::from("/f/LiberationSans-Italic.ttf"));
    }

    #[test]
    fn test_font_weight_parse() {
        assert_eq!(FontWeight::parse("bold"), FontWeight::Bold);
        assert_eq!(FontWeight::parse("normal"), FontWeight::Normal);
    }
}
