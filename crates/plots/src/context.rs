//! Shared state for rendering one figure.

use std::path::Path;

use renderer::{Color, FontBook, StrokeStyle};

use emc_common::EmcResult;

use crate::decorations::Grid;

/// Resolution, fonts and resources shared by every subplot of a figure.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub dpi: f32,
    pub fonts: &'a FontBook,
    pub features_dir: Option<&'a Path>,
    /// Shrink margins to what the labels need
    pub tight: bool,
}

impl<'a> RenderContext<'a> {
    /// Points (1/72 inch) to pixels.
    pub fn pt(&self, points: f32) -> f32 {
        points * self.dpi / 72.0
    }

    /// Diameter in pixels of a marker given its area in points squared.
    pub fn marker_diameter(&self, area: f32) -> f32 {
        self.pt(area.max(0.0).sqrt())
    }

    /// Stroke for a line width in points.
    pub fn stroke(&self, color: Color, width_pt: f32) -> StrokeStyle {
        StrokeStyle::solid(color, self.pt(width_pt))
    }

    pub fn grid_stroke(&self, grid: &Grid) -> EmcResult<StrokeStyle> {
        Ok(StrokeStyle {
            color: color(&grid.color, grid.alpha)?,
            width: self.pt(grid.linewidth),
            style: grid.linestyle,
        })
    }
}

/// Parse a color name and apply an optional opacity.
pub fn color(name: &str, alpha: Option<f32>) -> EmcResult<Color> {
    Ok(Color::parse(name)?.with_alpha(alpha))
}

/// Break a pixel polyline where consecutive points jump further than
/// `limit` horizontally, as happens across a map seam.
pub fn break_jumps(points: &[(f32, f32)], limit: f32) -> Vec<(f32, f32)> {
    let mut out = Vec::with_capacity(points.len());
    for (i, &p) in points.iter().enumerate() {
        if i > 0 {
            let prev = points[i - 1];
            if (p.0 - prev.0).abs() > limit {
                out.push((f32::NAN, f32::NAN));
            }
        }
        out.push(p);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_conversions() {
        let fonts = FontBook::empty();
        let ctx = RenderContext {
            dpi: 144.0,
            fonts: &fonts,
            features_dir: None,
            tight: false,
        };
        assert_eq!(ctx.pt(1.5), 3.0);
        assert!((ctx.marker_diameter(25.0) - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_break_jumps_inserts_gap() {
        let pts = [(0.0, 0.0), (5.0, 0.0), (95.0, 0.0), (96.0, 0.0)];
        let out = break_jumps(&pts, 50.0);
        assert_eq!(out.len(), 5);
        assert!(out[2].0.is_nan());
    }

    #[test]
    fn test_color_alpha() {
        let c = color("black", Some(0.5)).unwrap();
        assert_eq!(c.a, 128);
        assert!(color("not-a-color", None).is_err());
    }
}
