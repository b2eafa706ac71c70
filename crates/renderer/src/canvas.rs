//! Raster drawing surface backed by tiny-skia.
//!
//! Coordinates are pixels with the origin at the top-left corner.

use std::path::Path;
use std::str::FromStr;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tiny_skia::{
    FillRule, FilterQuality, LineCap, LineJoin, Mask, Paint, PathBuilder, Pixmap, PixmapPaint,
    Rect, Stroke, StrokeDash, Transform,
};

use crate::color::Color;
use crate::error::{RenderError, RenderResult};
use crate::png;

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PixelRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    /// Shrink every side by the given insets.
    pub fn inset(&self, left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self::new(
            self.x + left,
            self.y + top,
            (self.width - left - right).max(1.0),
            (self.height - top - bottom).max(1.0),
        )
    }

    fn to_skia(self) -> Option<Rect> {
        Rect::from_xywh(self.x, self.y, self.width.max(0.5), self.height.max(0.5))
    }
}

/// Line dash pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    DashDot,
    None,
}

impl LineStyle {
    fn dash(&self, width: f32) -> Option<Vec<f32>> {
        let w = width.max(1.0);
        match self {
            LineStyle::Solid | LineStyle::None => None,
            LineStyle::Dashed => Some(vec![3.7 * w, 1.6 * w]),
            LineStyle::Dotted => Some(vec![w, 1.65 * w]),
            LineStyle::DashDot => Some(vec![6.4 * w, 1.6 * w, w, 1.6 * w]),
        }
    }
}

impl FromStr for LineStyle {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "-" | "solid" => Ok(LineStyle::Solid),
            "--" | "dashed" => Ok(LineStyle::Dashed),
            ":" | "dotted" => Ok(LineStyle::Dotted),
            "-." | "dashdot" => Ok(LineStyle::DashDot),
            "" | " " | "None" | "none" => Ok(LineStyle::None),
            other => Err(RenderError::UnknownStyle {
                kind: "linestyle",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for LineStyle {
    type Error = RenderError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<LineStyle> for String {
    fn from(style: LineStyle) -> Self {
        match style {
            LineStyle::Solid => "-",
            LineStyle::Dashed => "--",
            LineStyle::Dotted => ":",
            LineStyle::DashDot => "-.",
            LineStyle::None => "None",
        }
        .to_string()
    }
}

/// Scatter and line marker shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Marker {
    #[default]
    Circle,
    Point,
    Pixel,
    Square,
    Diamond,
    TriangleUp,
    TriangleDown,
    Plus,
    Cross,
    Star,
}

impl Marker {
    /// Outline vertices of a marker of diameter `size` around the origin.
    fn outline(&self, size: f32) -> Vec<(f32, f32)> {
        let r = size / 2.0;
        match self {
            Marker::Square => vec![(-r, -r), (r, -r), (r, r), (-r, r)],
            Marker::Diamond => vec![(0.0, -r), (r, 0.0), (0.0, r), (-r, 0.0)],
            Marker::TriangleUp => vec![(0.0, -r), (r, r * 0.8), (-r, r * 0.8)],
            Marker::TriangleDown => vec![(0.0, r), (r, -r * 0.8), (-r, -r * 0.8)],
            Marker::Star => (0..10)
                .map(|i| {
                    let radius = if i % 2 == 0 { r } else { r * 0.4 };
                    let angle = std::f32::consts::PI * (i as f32 / 5.0) - std::f32::consts::FRAC_PI_2;
                    (radius * angle.cos(), radius * angle.sin())
                })
                .collect(),
            _ => vec![],
        }
    }
}

impl FromStr for Marker {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "o" => Ok(Marker::Circle),
            "." => Ok(Marker::Point),
            "," => Ok(Marker::Pixel),
            "s" => Ok(Marker::Square),
            "D" | "d" => Ok(Marker::Diamond),
            "^" => Ok(Marker::TriangleUp),
            "v" => Ok(Marker::TriangleDown),
            "+" => Ok(Marker::Plus),
            "x" => Ok(Marker::Cross),
            "*" => Ok(Marker::Star),
            other => Err(RenderError::UnknownStyle {
                kind: "marker",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Marker {
    type Error = RenderError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Marker> for String {
    fn from(marker: Marker) -> Self {
        match marker {
            Marker::Circle => "o",
            Marker::Point => ".",
            Marker::Pixel => ",",
            Marker::Square => "s",
            Marker::Diamond => "D",
            Marker::TriangleUp => "^",
            Marker::TriangleDown => "v",
            Marker::Plus => "+",
            Marker::Cross => "x",
            Marker::Star => "*",
        }
        .to_string()
    }
}

/// Stroke settings for lines and outlines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f32,
    pub style: LineStyle,
}

impl StrokeStyle {
    pub fn solid(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            style: LineStyle::Solid,
        }
    }

    fn paint_and_stroke(&self) -> Option<(Paint<'static>, Stroke)> {
        if self.style == LineStyle::None || self.width <= 0.0 || self.color.is_transparent() {
            return None;
        }
        let mut paint = Paint::default();
        paint.set_color(self.color.to_skia());
        paint.anti_alias = true;

        let mut stroke = Stroke {
            width: self.width,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        if let Some(pattern) = self.style.dash(self.width) {
            stroke.dash = StrokeDash::new(pattern, 0.0);
        } else {
            stroke.line_cap = LineCap::Round;
        }
        Some((paint, stroke))
    }
}

/// Drawing surface for a whole figure.
pub struct Canvas {
    pixmap: Pixmap,
    clip: Option<Mask>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Color) -> RenderResult<Self> {
        let mut pixmap =
            Pixmap::new(width, height).ok_or(RenderError::InvalidDimensions { width, height })?;
        pixmap.fill(background.to_skia());
        Ok(Self { pixmap, clip: None })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Restrict subsequent drawing to `rect`, or lift the restriction.
    pub fn set_clip(&mut self, rect: Option<PixelRect>) {
        self.clip = rect.and_then(|r| {
            let mut mask = Mask::new(self.width(), self.height())?;
            let path = PathBuilder::from_rect(r.to_skia()?);
            mask.fill_path(&path, FillRule::Winding, false, Transform::identity());
            Some(mask)
        });
    }

    /// Stroke a polyline. Non-finite points split it into separate runs.
    pub fn stroke_polyline(&mut self, points: &[(f32, f32)], style: &StrokeStyle) {
        let Some((paint, stroke)) = style.paint_and_stroke() else {
            return;
        };
        let mut pb = PathBuilder::new();
        let mut pen_down = false;
        for &(x, y) in points {
            if !x.is_finite() || !y.is_finite() {
                pen_down = false;
                continue;
            }
            if pen_down {
                pb.line_to(x, y);
            } else {
                pb.move_to(x, y);
                pen_down = true;
            }
        }
        if let Some(path) = pb.finish() {
            self.pixmap
                .stroke_path(&path, &paint, &stroke, Transform::identity(), self.clip.as_ref());
        }
    }

    pub fn line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, style: &StrokeStyle) {
        self.stroke_polyline(&[(x0, y0), (x1, y1)], style);
    }

    /// Fill a closed polygon, optionally outlining it.
    pub fn fill_polygon(&mut self, points: &[(f32, f32)], fill: Color, edge: Option<&StrokeStyle>) {
        if points.len() < 3 {
            return;
        }
        let mut pb = PathBuilder::new();
        pb.move_to(points[0].0, points[0].1);
        for &(x, y) in &points[1..] {
            pb.line_to(x, y);
        }
        pb.close();
        let Some(path) = pb.finish() else {
            return;
        };
        if !fill.is_transparent() {
            let mut paint = Paint::default();
            paint.set_color(fill.to_skia());
            paint.anti_alias = true;
            self.pixmap.fill_path(
                &path,
                &paint,
                FillRule::Winding,
                Transform::identity(),
                self.clip.as_ref(),
            );
        }
        if let Some((paint, stroke)) = edge.and_then(|e| e.paint_and_stroke()) {
            self.pixmap
                .stroke_path(&path, &paint, &stroke, Transform::identity(), self.clip.as_ref());
        }
    }

    /// Fill a mesh cell without antialiasing so neighbouring cells meet
    /// without seams.
    pub fn fill_cell(&mut self, points: &[(f32, f32)], color: Color) {
        if points.len() < 3 || color.is_transparent() {
            return;
        }
        let mut pb = PathBuilder::new();
        pb.move_to(points[0].0, points[0].1);
        for &(x, y) in &points[1..] {
            pb.line_to(x, y);
        }
        pb.close();
        let Some(path) = pb.finish() else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(color.to_skia());
        paint.anti_alias = false;
        self.pixmap.fill_path(
            &path,
            &paint,
            FillRule::Winding,
            Transform::identity(),
            self.clip.as_ref(),
        );
    }

    pub fn fill_rect(&mut self, rect: PixelRect, color: Color) {
        if color.is_transparent() {
            return;
        }
        let Some(r) = rect.to_skia() else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(color.to_skia());
        // Hard edges keep adjacent cells seamless
        paint.anti_alias = false;
        self.pixmap
            .fill_rect(r, &paint, Transform::identity(), self.clip.as_ref());
    }

    pub fn stroke_rect(&mut self, rect: PixelRect, style: &StrokeStyle) {
        let pts = [
            (rect.x, rect.y),
            (rect.right(), rect.y),
            (rect.right(), rect.bottom()),
            (rect.x, rect.bottom()),
        ];
        let Some((paint, stroke)) = style.paint_and_stroke() else {
            return;
        };
        let mut pb = PathBuilder::new();
        pb.move_to(pts[0].0, pts[0].1);
        for &(x, y) in &pts[1..] {
            pb.line_to(x, y);
        }
        pb.close();
        if let Some(path) = pb.finish() {
            self.pixmap
                .stroke_path(&path, &paint, &stroke, Transform::identity(), self.clip.as_ref());
        }
    }

    /// Draw one marker centred on `(x, y)`. `size` is the diameter in pixels.
    pub fn draw_marker(
        &mut self,
        x: f32,
        y: f32,
        marker: Marker,
        size: f32,
        fill: Color,
        edge: Option<&StrokeStyle>,
    ) {
        if !x.is_finite() || !y.is_finite() || size <= 0.0 {
            return;
        }
        match marker {
            Marker::Circle | Marker::Point => {
                let radius = if marker == Marker::Point { size / 4.0 } else { size / 2.0 };
                let Some(path) = PathBuilder::from_circle(x, y, radius.max(0.5)) else {
                    return;
                };
                let mut paint = Paint::default();
                paint.set_color(fill.to_skia());
                paint.anti_alias = true;
                self.pixmap.fill_path(
                    &path,
                    &paint,
                    FillRule::Winding,
                    Transform::identity(),
                    self.clip.as_ref(),
                );
                if let Some((paint, stroke)) = edge.and_then(|e| e.paint_and_stroke()) {
                    self.pixmap.stroke_path(
                        &path,
                        &paint,
                        &stroke,
                        Transform::identity(),
                        self.clip.as_ref(),
                    );
                }
            }
            Marker::Pixel => self.fill_rect(PixelRect::new(x.floor(), y.floor(), 1.0, 1.0), fill),
            Marker::Plus | Marker::Cross => {
                let r = size / 2.0;
                let style = edge
                    .copied()
                    .unwrap_or_else(|| StrokeStyle::solid(fill, (size / 6.0).max(1.0)));
                let style = StrokeStyle { color: fill, ..style };
                if marker == Marker::Plus {
                    self.line(x - r, y, x + r, y, &style);
                    self.line(x, y - r, x, y + r, &style);
                } else {
                    let d = r * std::f32::consts::FRAC_1_SQRT_2;
                    self.line(x - d, y - d, x + d, y + d, &style);
                    self.line(x - d, y + d, x + d, y - d, &style);
                }
            }
            _ => {
                let pts: Vec<(f32, f32)> = marker
                    .outline(size)
                    .into_iter()
                    .map(|(dx, dy)| (x + dx, y + dy))
                    .collect();
                self.fill_polygon(&pts, fill, edge);
            }
        }
    }

    /// Scale an RGBA image into `rect`.
    pub fn draw_image(&mut self, img: &RgbaImage, rect: PixelRect, smooth: bool) {
        let Some(src) = rgba_to_pixmap(img) else {
            return;
        };
        let sx = rect.width / img.width().max(1) as f32;
        let sy = rect.height / img.height().max(1) as f32;
        let paint = PixmapPaint {
            quality: if smooth { FilterQuality::Bilinear } else { FilterQuality::Nearest },
            ..PixmapPaint::default()
        };
        self.pixmap.draw_pixmap(
            0,
            0,
            src.as_ref(),
            &paint,
            Transform::from_row(sx, 0.0, 0.0, sy, rect.x, rect.y),
            self.clip.as_ref(),
        );
    }

    /// Composite an image at integer pixel offset without scaling.
    pub fn blit(&mut self, img: &RgbaImage, x: i32, y: i32) {
        if let Some(src) = rgba_to_pixmap(img) {
            self.pixmap.draw_pixmap(
                x,
                y,
                src.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                self.clip.as_ref(),
            );
        }
    }

    /// Straight-alpha RGBA bytes.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixmap.data().len());
        for px in self.pixmap.pixels() {
            let c = px.demultiply();
            out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }

    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_raw(self.width(), self.height(), self.to_rgba())
            .unwrap_or_else(|| RgbaImage::new(self.width(), self.height()))
    }

    pub fn encode_png(&self, dpi: Option<f32>) -> RenderResult<Vec<u8>> {
        png::create_png_auto(&self.to_rgba(), self.width() as usize, self.height() as usize, dpi)
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P, dpi: Option<f32>) -> RenderResult<()> {
        let bytes = self.encode_png(dpi)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

/// Premultiply a straight-alpha image into a pixmap.
pub(crate) fn rgba_to_pixmap(img: &RgbaImage) -> Option<Pixmap> {
    let mut pm = Pixmap::new(img.width(), img.height())?;
    for (dst, src) in pm.data_mut().chunks_exact_mut(4).zip(img.as_raw().chunks_exact(4)) {
        let a = src[3] as u16;
        dst[0] = ((src[0] as u16 * a + 127) / 255) as u8;
        dst[1] = ((src[1] as u16 * a + 127) / 255) as u8;
        dst[2] = ((src[2] as u16 * a + 127) / 255) as u8;
        dst[3] = src[3];
    }
    Some(pm)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(canvas: &Canvas, x: u32, y: u32) -> [u8; 4] {
        let img = canvas.to_image();
        img.get_pixel(x, y).0
    }

    #[test]
    fn test_background_fill() {
        let canvas = Canvas::new(4, 4, Color::WHITE).unwrap();
        assert_eq!(pixel(&canvas, 2, 2), [255, 255, 255, 255]);
        assert!(Canvas::new(0, 10, Color::WHITE).is_err());
    }

    #[test]
    fn test_fill_rect_and_clip() {
        let mut canvas = Canvas::new(10, 10, Color::WHITE).unwrap();
        canvas.set_clip(Some(PixelRect::new(0.0, 0.0, 5.0, 10.0)));
        canvas.fill_rect(PixelRect::new(0.0, 0.0, 10.0, 10.0), Color::BLACK);
        canvas.set_clip(None);
        assert_eq!(pixel(&canvas, 2, 5), [0, 0, 0, 255]);
        assert_eq!(pixel(&canvas, 8, 5), [255, 255, 255, 255]);
    }

    #[test]
    fn test_marker_is_drawn() {
        let mut canvas = Canvas::new(20, 20, Color::WHITE).unwrap();
        canvas.draw_marker(10.0, 10.0, Marker::Square, 8.0, Color::rgb(255, 0, 0), None);
        assert_eq!(pixel(&canvas, 10, 10), [255, 0, 0, 255]);
        assert_eq!(pixel(&canvas, 1, 1), [255, 255, 255, 255]);
    }

    #[test]
    fn test_parse_styles() {
        assert_eq!("--".parse::<LineStyle>().unwrap(), LineStyle::Dashed);
        assert_eq!("solid".parse::<LineStyle>().unwrap(), LineStyle::Solid);
        assert!("~".parse::<LineStyle>().is_err());
        assert_eq!("^".parse::<Marker>().unwrap(), Marker::TriangleUp);
        assert!("q".parse::<Marker>().is_err());
    }

    #[test]
    fn test_image_blit() {
        let mut canvas = Canvas::new(4, 4, Color::WHITE).unwrap();
        let img = RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 255, 255]));
        canvas.blit(&img, 1, 1);
        assert_eq!(pixel(&canvas, 1, 1), [0, 0, 255, 255]);
        assert_eq!(pixel(&canvas, 3, 3), [255, 255, 255, 255]);
    }
}
