//! Legend box listing labelled layers.

use renderer::{Canvas, Color, HAlign, Marker, PixelRect, StrokeStyle, TextStyle, VAlign};

use crate::context::RenderContext;
use crate::decorations::{Legend, LegendLoc};

/// Symbol drawn next to a legend label.
#[derive(Debug, Clone)]
pub enum Glyph {
    Line {
        stroke: StrokeStyle,
        marker: Option<(Marker, f32, Color)>,
    },
    Patch {
        fill: Color,
        edge: Option<StrokeStyle>,
    },
    Marker {
        marker: Marker,
        size: f32,
        fill: Color,
        edge: Option<StrokeStyle>,
    },
}

#[derive(Debug, Clone)]
pub struct LegendEntry {
    pub label: String,
    pub glyph: Glyph,
}

impl LegendEntry {
    pub fn new(label: impl Into<String>, glyph: Glyph) -> Self {
        Self {
            label: label.into(),
            glyph,
        }
    }
}

struct BoxLayout {
    width: f32,
    height: f32,
    rows: usize,
    col_widths: Vec<f32>,
    row_heights: Vec<f32>,
}

fn measure(ctx: &RenderContext<'_>, legend: &Legend, entries: &[LegendEntry]) -> BoxLayout {
    let size = ctx.pt(legend.fontsize);
    let ncol = legend.ncol.max(1).min(entries.len().max(1));
    let rows = entries.len().div_ceil(ncol);
    let handle = size * 2.0;
    let gap = size * 0.8;
    let pad = size * 0.4;

    let mut col_widths = vec![0.0f32; ncol];
    let mut row_heights = vec![0.0f32; rows];
    // columns are filled top to bottom
    for (i, entry) in entries.iter().enumerate() {
        let (col, row) = (i / rows, i % rows);
        let (w, h) = ctx.fonts.measure(&entry.label, size, Default::default());
        col_widths[col] = col_widths[col].max(handle + gap + w);
        row_heights[row] = row_heights[row].max(h.max(size * 1.2));
    }
    let width = col_widths.iter().sum::<f32>() + gap * (ncol as f32 - 1.0) + 2.0 * pad;
    let height = row_heights.iter().sum::<f32>() + 2.0 * pad;
    BoxLayout {
        width,
        height,
        rows,
        col_widths,
        row_heights,
    }
}

fn place(loc: LegendLoc, axes: PixelRect, width: f32, height: f32, border: f32) -> PixelRect {
    let (fx, fy) = loc.anchor();
    let x = axes.x + border + fx * (axes.width - width - 2.0 * border);
    let y = axes.bottom() - border - fy * (axes.height - height - 2.0 * border) - height;
    PixelRect::new(x, y, width, height)
}

/// Corner covering the fewest of `points`; ties keep the earlier corner.
pub fn best_location(axes: PixelRect, width: f32, height: f32, border: f32, points: &[(f32, f32)]) -> LegendLoc {
    let candidates = [
        LegendLoc::UpperRight,
        LegendLoc::UpperLeft,
        LegendLoc::LowerLeft,
        LegendLoc::LowerRight,
    ];
    let mut best = (LegendLoc::UpperRight, usize::MAX);
    for loc in candidates {
        let rect = place(loc, axes, width, height, border);
        let covered = points.iter().filter(|p| rect.contains(p.0, p.1)).count();
        if covered < best.1 {
            best = (loc, covered);
        }
    }
    best.0
}

fn draw_glyph(canvas: &mut Canvas, glyph: &Glyph, x: f32, y: f32, length: f32, size: f32) {
    match glyph {
        Glyph::Line { stroke, marker } => {
            canvas.line(x, y, x + length, y, stroke);
            if let Some((m, d, c)) = marker {
                canvas.draw_marker(x + length / 2.0, y, *m, *d, *c, None);
            }
        }
        Glyph::Patch { fill, edge } => {
            let h = size * 0.7;
            let rect = PixelRect::new(x, y - h / 2.0, length, h);
            canvas.fill_rect(rect, *fill);
            if let Some(edge) = edge {
                canvas.stroke_rect(rect, edge);
            }
        }
        Glyph::Marker { marker, size: d, fill, edge } => {
            canvas.draw_marker(x + length / 2.0, y, *marker, d.min(size), *fill, edge.as_ref());
        }
    }
}

/// Draw the legend inside `axes`. `points` are data pixel positions used
/// by the `best` location.
pub fn draw_legend(
    canvas: &mut Canvas,
    ctx: &RenderContext<'_>,
    legend: &Legend,
    entries: &[LegendEntry],
    axes: PixelRect,
    points: &[(f32, f32)],
) {
    if entries.is_empty() {
        return;
    }
    let size = ctx.pt(legend.fontsize);
    let border = size * 0.5;
    let layout = measure(ctx, legend, entries);
    let loc = match legend.loc {
        LegendLoc::Best => best_location(axes, layout.width, layout.height, border, points),
        other => other,
    };
    let rect = place(loc, axes, layout.width, layout.height, border);

    if legend.frameon {
        canvas.fill_rect(rect, Color::WHITE.with_alpha(Some(0.8)));
        canvas.stroke_rect(rect, &ctx.stroke(Color::rgb(204, 204, 204), 0.8));
    }

    let pad = size * 0.4;
    let gap = size * 0.8;
    let handle = size * 2.0;
    let text_style = TextStyle::new(size, Color::BLACK).align(HAlign::Left, VAlign::Center);
    let mut col_x = rect.x + pad;
    for (col, width) in layout.col_widths.iter().enumerate() {
        let mut row_y = rect.y + pad;
        for row in 0..layout.rows {
            let Some(entry) = entries.get(col * layout.rows + row) else {
                break;
            };
            let h = layout.row_heights[row];
            let cy = row_y + h / 2.0;
            draw_glyph(canvas, &entry.glyph, col_x, cy, handle, size);
            ctx.fonts.draw(canvas, &entry.label, col_x + handle + gap, cy, &text_style);
            row_y += h;
        }
        col_x += width + gap;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_location_avoids_points() {
        let axes = PixelRect::new(0.0, 0.0, 100.0, 100.0);
        // crowd the upper right and upper left corners
        let mut points = vec![(90.0, 10.0); 5];
        points.extend(vec![(10.0, 10.0); 3]);
        let loc = best_location(axes, 20.0, 20.0, 2.0, &points);
        assert_eq!(loc, LegendLoc::LowerLeft);
        assert_eq!(best_location(axes, 20.0, 20.0, 2.0, &[]), LegendLoc::UpperRight);
    }

    #[test]
    fn test_place_corners() {
        let axes = PixelRect::new(10.0, 10.0, 100.0, 50.0);
        let r = place(LegendLoc::LowerRight, axes, 20.0, 10.0, 0.0);
        assert_eq!((r.x, r.y), (90.0, 50.0));
        let r = place(LegendLoc::UpperLeft, axes, 20.0, 10.0, 0.0);
        assert_eq!((r.x, r.y), (10.0, 10.0));
    }
}
