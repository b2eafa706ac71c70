//! Color series produced by colored layers and the colorbar that shows them.

use renderer::{band_index, render_grid, Canvas, Color, Colormap, HAlign, Normalize, PixelRect, TextStyle, VAlign};

use crate::axes::{format_ticks, linear_ticks, Scale};
use crate::context::RenderContext;
use crate::decorations::ColorbarSpec;
use crate::layers::Orientation;

/// Mapping from values to colors used by a layer.
#[derive(Debug, Clone)]
pub struct ColorSeries {
    pub cmap: Colormap,
    pub norm: Normalize,
    /// Discrete band boundaries for filled contours
    pub levels: Option<Vec<f64>>,
    pub alpha: Option<f32>,
}

impl ColorSeries {
    pub fn continuous(cmap: Colormap, norm: Normalize, alpha: Option<f32>) -> Self {
        Self {
            cmap,
            norm,
            levels: None,
            alpha,
        }
    }

    pub fn banded(cmap: Colormap, levels: Vec<f64>, alpha: Option<f32>) -> Self {
        let vmin = levels.first().copied().unwrap_or(0.0);
        let vmax = levels.last().copied().unwrap_or(1.0);
        Self {
            cmap,
            norm: Normalize::new(vmin, vmax),
            levels: Some(levels),
            alpha,
        }
    }

    fn band_colors(&self) -> Vec<Color> {
        match &self.levels {
            Some(levels) => self.cmap.discrete(levels.len().saturating_sub(1).max(1)),
            None => vec![],
        }
    }

    /// Color of one value; values outside discrete bands get the bad color.
    pub fn color(&self, value: f64) -> Color {
        let c = match &self.levels {
            Some(levels) => match band_index(value, levels) {
                Some(i) => self.band_colors().get(i).copied().unwrap_or(self.cmap.bad),
                None => self.cmap.bad,
            },
            None => self.cmap.sample(self.norm.apply(value)),
        };
        c.with_alpha(self.alpha)
    }

    /// Colors for many values, reusing the band table.
    pub fn colors(&self, values: &[f64]) -> Vec<Color> {
        match &self.levels {
            Some(levels) => {
                let bands = self.band_colors();
                values
                    .iter()
                    .map(|&v| {
                        band_index(v, levels)
                            .and_then(|i| bands.get(i).copied())
                            .unwrap_or(self.cmap.bad)
                            .with_alpha(self.alpha)
                    })
                    .collect()
            }
            None => values
                .iter()
                .map(|&v| self.cmap.sample(self.norm.apply(v)).with_alpha(self.alpha))
                .collect(),
        }
    }

    /// Tick values along the colorbar.
    pub fn ticks(&self, single_tick: bool) -> Vec<f64> {
        let (lo, hi) = (self.norm.vmin, self.norm.vmax);
        if single_tick {
            return vec![lo, hi];
        }
        match &self.levels {
            Some(levels) if levels.len() <= 12 => levels.clone(),
            Some(levels) => {
                let stride = levels.len().div_ceil(10);
                levels.iter().copied().step_by(stride).collect()
            }
            None => linear_ticks(lo.min(hi), lo.max(hi)),
        }
    }
}

/// Geometry of a colorbar next to its axes.
#[derive(Debug, Clone, Copy)]
pub struct ColorbarLayout {
    pub bar: PixelRect,
    /// Space the bar and its labels take beyond the axes edge
    pub reserved: f32,
}

fn thickness(ctx: &RenderContext<'_>, spec: &ColorbarSpec, axes: PixelRect) -> f32 {
    match spec.orientation {
        Orientation::Vertical => (axes.width * 0.035).max(ctx.pt(8.0)),
        Orientation::Horizontal => (axes.height * 0.05).max(ctx.pt(8.0)),
    }
}

/// Pixels needed outside the axes for a colorbar.
pub fn reserved_space(ctx: &RenderContext<'_>, spec: &ColorbarSpec, series: &ColorSeries, axes: PixelRect) -> f32 {
    let tick_size = ctx.pt(10.0);
    let labels = format_ticks(&series.ticks(spec.single_tick), Scale::Linear);
    let pad = ctx.pt(10.0);
    let label_size = match &spec.label {
        Some(l) if !l.is_empty() => ctx.fonts.measure(l, ctx.pt(spec.fontsize), Default::default()).1 + ctx.pt(4.0),
        _ => 0.0,
    };
    let tick_extent = match spec.orientation {
        Orientation::Vertical => labels
            .iter()
            .map(|l| ctx.fonts.measure(l, tick_size, Default::default()).0)
            .fold(0.0, f32::max),
        Orientation::Horizontal => tick_size * 1.2,
    };
    pad + thickness(ctx, spec, axes) + ctx.pt(3.5) + ctx.pt(2.0) + tick_extent + label_size
}

/// Place the bar beside `axes`. `offset` is space already used on that
/// side, such as tick labels under a horizontal bar.
pub fn layout(
    ctx: &RenderContext<'_>,
    spec: &ColorbarSpec,
    series: &ColorSeries,
    axes: PixelRect,
    offset: f32,
) -> ColorbarLayout {
    let pad = ctx.pt(10.0);
    let t = thickness(ctx, spec, axes);
    let bar = match spec.orientation {
        Orientation::Vertical => {
            let extend = spec.extend.has_min() as u8 + spec.extend.has_max() as u8;
            let h = axes.height * 0.95 - extend as f32 * t;
            PixelRect::new(axes.right() + offset + pad, axes.y + (axes.height - h) / 2.0, t, h)
        }
        Orientation::Horizontal => {
            let w = axes.width * 0.95;
            PixelRect::new(axes.x + (axes.width - w) / 2.0, axes.bottom() + offset + pad, w, t)
        }
    };
    ColorbarLayout {
        bar,
        reserved: reserved_space(ctx, spec, series, axes),
    }
}

/// Draw the bar with ticks, end triangles and label.
pub fn draw_colorbar(
    canvas: &mut Canvas,
    ctx: &RenderContext<'_>,
    spec: &ColorbarSpec,
    series: &ColorSeries,
    bar: PixelRect,
) {
    let vertical = spec.orientation == Orientation::Vertical;
    let (lo, hi) = (series.norm.vmin, series.norm.vmax);
    let span = hi - lo;

    // position along the bar, 0 at vmin
    let along = |v: f64| -> f32 {
        let f = if span.abs() < f64::EPSILON { 0.5 } else { ((v - lo) / span) as f32 };
        if vertical {
            bar.bottom() - f * bar.height
        } else {
            bar.x + f * bar.width
        }
    };

    match &series.levels {
        Some(levels) => {
            for w in levels.windows(2) {
                let c = series.color(0.5 * (w[0] + w[1]));
                let (a, b) = (along(w[0]), along(w[1]));
                let rect = if vertical {
                    PixelRect::new(bar.x, b.min(a), bar.width, (a - b).abs())
                } else {
                    PixelRect::new(a.min(b), bar.y, (b - a).abs(), bar.height)
                };
                canvas.fill_rect(rect, c);
            }
        }
        None => {
            const STEPS: usize = 256;
            let values: Vec<f64> = (0..STEPS)
                .map(|i| {
                    let t = (i as f64 + 0.5) / STEPS as f64;
                    if vertical {
                        series.norm.inverse(1.0 - t)
                    } else {
                        series.norm.inverse(t)
                    }
                })
                .collect();
            let (w, h) = if vertical { (1, STEPS) } else { (STEPS, 1) };
            let mut img = render_grid(&values, w, h, &series.norm, &series.cmap);
            if let Some(a) = series.alpha {
                for px in img.pixels_mut() {
                    px.0[3] = (px.0[3] as f32 * a.clamp(0.0, 1.0)).round() as u8;
                }
            }
            canvas.draw_image(&img, bar, false);
        }
    }

    let outline = ctx.stroke(Color::BLACK, 0.8);
    let t = if vertical { bar.width } else { bar.height };
    let end_color = |low: bool| -> Color {
        let c = if low {
            series.cmap.under.unwrap_or_else(|| series.cmap.sample(0.0))
        } else {
            series.cmap.over.unwrap_or_else(|| series.cmap.sample(1.0))
        };
        c.with_alpha(series.alpha)
    };
    if spec.extend.has_min() {
        let tri = if vertical {
            vec![(bar.x, bar.bottom()), (bar.right(), bar.bottom()), (bar.x + bar.width / 2.0, bar.bottom() + t)]
        } else {
            vec![(bar.x, bar.y), (bar.x, bar.bottom()), (bar.x - t, bar.y + bar.height / 2.0)]
        };
        canvas.fill_polygon(&tri, end_color(true), Some(&outline));
    }
    if spec.extend.has_max() {
        let tri = if vertical {
            vec![(bar.x, bar.y), (bar.right(), bar.y), (bar.x + bar.width / 2.0, bar.y - t)]
        } else {
            vec![(bar.right(), bar.y), (bar.right(), bar.bottom()), (bar.right() + t, bar.y + bar.height / 2.0)]
        };
        canvas.fill_polygon(&tri, end_color(false), Some(&outline));
    }
    canvas.stroke_rect(bar, &outline);

    let ticks = series.ticks(spec.single_tick);
    let labels = format_ticks(&ticks, Scale::Linear);
    let tick_len = ctx.pt(3.5);
    let gap = ctx.pt(2.0);
    let tick_style = TextStyle::new(ctx.pt(10.0), Color::BLACK);
    let tick_stroke = ctx.stroke(Color::BLACK, 0.8);
    let mut extent = 0.0f32;
    for (v, label) in ticks.iter().zip(&labels) {
        let p = along(*v);
        if vertical {
            canvas.line(bar.right(), p, bar.right() + tick_len, p, &tick_stroke);
            let style = tick_style.align(HAlign::Left, VAlign::Center);
            ctx.fonts.draw(canvas, label, bar.right() + tick_len + gap, p, &style);
            extent = extent.max(ctx.fonts.measure(label, tick_style.size, Default::default()).0);
        } else {
            canvas.line(p, bar.bottom(), p, bar.bottom() + tick_len, &tick_stroke);
            let style = tick_style.align(HAlign::Center, VAlign::Top);
            ctx.fonts.draw(canvas, label, p, bar.bottom() + tick_len + gap, &style);
            extent = extent.max(tick_style.size * 1.2);
        }
    }

    if let Some(label) = spec.label.as_deref().filter(|l| !l.is_empty()) {
        let style = TextStyle::new(ctx.pt(spec.fontsize), Color::BLACK);
        let offset = tick_len + gap + extent + ctx.pt(4.0);
        if vertical {
            let style = style.align(HAlign::Left, VAlign::Center).vertical();
            ctx.fonts.draw(canvas, label, bar.right() + offset, bar.y + bar.height / 2.0, &style);
        } else {
            let style = style.align(HAlign::Center, VAlign::Top);
            ctx.fonts.draw(canvas, label, bar.x + bar.width / 2.0, bar.bottom() + offset, &style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banded_colors() {
        let cmap = Colormap::named("viridis").unwrap();
        let series = ColorSeries::banded(cmap.clone(), vec![0.0, 1.0, 2.0], None);
        assert_eq!(series.color(0.5), cmap.sample(0.0));
        assert_eq!(series.color(1.5), cmap.sample(1.0));
        assert_eq!(series.color(5.0), cmap.bad);
        assert_eq!(series.colors(&[0.5, 2.0]), vec![cmap.sample(0.0), cmap.sample(1.0)]);
    }

    #[test]
    fn test_single_tick_labels_ends() {
        let cmap = Colormap::named("viridis").unwrap();
        let series = ColorSeries::continuous(cmap, Normalize::new(-3.0, 7.0), None);
        assert_eq!(series.ticks(true), vec![-3.0, 7.0]);
        let ticks = series.ticks(false);
        assert!(ticks.len() >= 3);
        assert!(ticks.iter().all(|t| (-3.0..=7.0).contains(t)));
    }
}
