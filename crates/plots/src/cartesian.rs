//! Drawing of cartesian layers.
//!
//! Layers are first prepared (histograms binned, densities estimated,
//! regressions fitted) so the axes limits can be taken from what will
//! actually be drawn. Drawing then maps every prepared layer through the
//! subplot's [`Axes`].

use renderer::{Canvas, Color, Colormap, Marker, Normalize, StrokeStyle};
use tracing::debug;

use emc_common::{EmcError, EmcResult};
use stats::{get_linear_regression, LinearRegression};

use crate::axes::{autoscale, Axes, Axis, Scale};
use crate::binning::histogram;
use crate::colorbar::ColorSeries;
use crate::context::{color, RenderContext};
use crate::density::{ascending_order, density_values, gaussian_kde, KdeCurve};
use crate::layers::{
    BarAlign, BarStyle, BinAlign, Density, HistType, Histogram, HorizontalLine, HorizontalSpan, LinePlot,
    Orientation, PlotLayer, Scatter, SkewT, VerticalLine,
};
use crate::legend::{Glyph, LegendEntry};

pub struct ScatterPrep<'a> {
    layer: &'a Scatter,
    order: Vec<usize>,
    density: Option<(Vec<f64>, ColorSeries)>,
    regression: Option<LinearRegression>,
}

pub struct HistPrep<'a> {
    layer: &'a Histogram,
    /// `[pos0, pos1, base, top]` per bin in value space
    bars: Vec<[f64; 4]>,
    /// Stepped outline as `(pos, value)`
    outline: Vec<(f64, f64)>,
}

impl HistPrep<'_> {
    fn horizontal(&self) -> bool {
        self.layer.orientation == Orientation::Horizontal
    }
}

pub struct BarPrep<'a> {
    style: &'a BarStyle,
    horizontal: bool,
    bars: Vec<[f64; 4]>,
    centers: Vec<f64>,
}

/// A layer ready to draw.
pub enum Prepared<'a> {
    Scatter(ScatterPrep<'a>),
    Histogram(HistPrep<'a>),
    Density { layer: &'a Density, curve: KdeCurve },
    Line(&'a LinePlot),
    VLine(&'a VerticalLine),
    HLine(&'a HorizontalLine),
    Span(&'a HorizontalSpan),
    Bar(BarPrep<'a>),
    SkewT(&'a SkewT),
}

fn check_errors(what: &str, err: &Option<Vec<f64>>, n: usize) -> EmcResult<()> {
    match err {
        Some(e) if e.len() != 1 && e.len() != n => Err(EmcError::length_mismatch(what, e.len(), n)),
        _ => Ok(()),
    }
}

fn err_at(err: &Option<Vec<f64>>, i: usize) -> Option<f64> {
    let e = err.as_ref()?;
    if e.len() == 1 {
        e.first().copied()
    } else {
        e.get(i).copied()
    }
}

fn prepare_scatter(layer: &Scatter) -> EmcResult<ScatterPrep<'_>> {
    let mut order: Vec<usize> = (0..layer.x.len()).collect();
    let density = match &layer.density {
        Some(d) => {
            let z = density_values(&layer.x, &layer.y, d.bins, d.interp, d.nsamples)?;
            if d.sort {
                order = ascending_order(&z);
            }
            let cmap = Colormap::named(&d.cmap)?;
            let norm = Normalize::autoscale(&z, layer.vmin, layer.vmax);
            Some((z, ColorSeries::continuous(cmap, norm, layer.alpha)))
        }
        None => None,
    };
    let regression = match layer.linear_regression {
        Some(_) => Some(get_linear_regression(&layer.x, &layer.y)?),
        None => None,
    };
    Ok(ScatterPrep {
        layer,
        order,
        density,
        regression,
    })
}

fn prepare_histogram<'a>(layer: &'a Histogram, previous: Option<&HistPrep<'_>>) -> EmcResult<HistPrep<'a>> {
    let hist = histogram(
        &layer.data,
        &layer.bins,
        layer.range,
        layer.weights.as_deref(),
        layer.density,
        layer.cumulative,
    )?;
    let stacked = layer.stacked || layer.histtype == HistType::BarStacked;
    let base: Vec<f64> = match previous {
        Some(prev) if stacked && prev.bars.len() == hist.counts.len() => prev.bars.iter().map(|b| b[3]).collect(),
        _ => vec![layer.bottom.unwrap_or(0.0); hist.counts.len()],
    };

    let mut bars = Vec::with_capacity(hist.counts.len());
    for (i, w) in hist.edges.windows(2).enumerate() {
        let width = w[1] - w[0];
        let bar_width = width * layer.rwidth.unwrap_or(1.0).clamp(0.0, 1.0);
        let center = match layer.align {
            BinAlign::Left => w[0],
            BinAlign::Mid => 0.5 * (w[0] + w[1]),
            BinAlign::Right => w[1],
        };
        bars.push([center - bar_width / 2.0, center + bar_width / 2.0, base[i], base[i] + hist.counts[i]]);
    }

    let shift = match layer.align {
        BinAlign::Left => -0.5,
        BinAlign::Mid => 0.0,
        BinAlign::Right => 0.5,
    };
    let mut outline = Vec::with_capacity(2 * bars.len() + 2);
    for (i, w) in hist.edges.windows(2).enumerate() {
        let d = shift * (w[1] - w[0]);
        let (lo, hi) = (w[0] + d, w[1] + d);
        if i == 0 {
            outline.push((lo, base[0]));
        }
        outline.push((lo, bars[i][3]));
        outline.push((hi, bars[i][3]));
    }
    if let (Some(last), Some(&b)) = (outline.last().copied(), base.last()) {
        outline.push((last.0, b));
    }
    Ok(HistPrep { layer, bars, outline })
}

fn prepare_bars<'a>(
    style: &'a BarStyle,
    horizontal: bool,
    positions: &[f64],
    lengths: &[f64],
    thickness: f64,
    base: f64,
) -> EmcResult<BarPrep<'a>> {
    let n = positions.len();
    check_errors("bar xerr", &style.xerr, n)?;
    check_errors("bar yerr", &style.yerr, n)?;
    if let Some(labels) = &style.tick_label {
        if labels.len() != n {
            return Err(EmcError::length_mismatch("bar tick labels", labels.len(), n));
        }
    }
    let mut bars = Vec::with_capacity(n);
    let mut centers = Vec::with_capacity(n);
    for (&p, &len) in positions.iter().zip(lengths) {
        let center = match style.align {
            BarAlign::Center => p,
            BarAlign::Edge => p + thickness / 2.0,
        };
        centers.push(center);
        bars.push([center - thickness / 2.0, center + thickness / 2.0, base, base + len]);
    }
    Ok(BarPrep {
        style,
        horizontal,
        bars,
        centers,
    })
}

/// Prepare every cartesian layer in order.
pub fn prepare(layers: &[PlotLayer]) -> EmcResult<Vec<Prepared<'_>>> {
    let mut out: Vec<Prepared<'_>> = Vec::with_capacity(layers.len());
    for layer in layers {
        let prepared = match layer {
            PlotLayer::Scatter(l) => Prepared::Scatter(prepare_scatter(l)?),
            PlotLayer::Histogram(l) => {
                let previous = out.iter().rev().find_map(|p| match p {
                    Prepared::Histogram(h) => Some(h),
                    _ => None,
                });
                Prepared::Histogram(prepare_histogram(l, previous)?)
            }
            PlotLayer::Density(l) => Prepared::Density {
                layer: l,
                curve: gaussian_kde(&l.data, l.bw_method, l.gridsize, l.cut, l.clip)?,
            },
            PlotLayer::LinePlot(l) => Prepared::Line(l),
            PlotLayer::VerticalLine(l) => Prepared::VLine(l),
            PlotLayer::HorizontalLine(l) => Prepared::HLine(l),
            PlotLayer::HorizontalSpan(l) => Prepared::Span(l),
            PlotLayer::BarPlot(l) => Prepared::Bar(prepare_bars(
                &l.style, false, &l.x, &l.height, l.width, l.bottom,
            )?),
            PlotLayer::HorizontalBar(l) => Prepared::Bar(prepare_bars(
                &l.style, true, &l.y, &l.width, l.height, l.left,
            )?),
            PlotLayer::SkewT(l) => Prepared::SkewT(l),
            other => {
                return Err(EmcError::invalid_choice(
                    "plot type",
                    other.plottype(),
                    &PlotLayer::CARTESIAN_TYPES,
                ))
            }
        };
        out.push(prepared);
    }
    debug!(layers = out.len(), "Prepared cartesian layers");
    Ok(out)
}

/// Scales implied by the layers: `(x_log, y_log, skew)`.
pub fn scale_hints(prepared: &[Prepared<'_>]) -> (bool, bool, bool) {
    let mut hints = (false, false, false);
    for p in prepared {
        match p {
            Prepared::Histogram(h) if h.layer.log => {
                if h.horizontal() {
                    hints.0 = true;
                } else {
                    hints.1 = true;
                }
            }
            Prepared::Bar(b) if b.style.log => {
                if b.horizontal {
                    hints.0 = true;
                } else {
                    hints.1 = true;
                }
            }
            Prepared::SkewT(_) => {
                hints.1 = true;
                hints.2 = true;
            }
            _ => {}
        }
    }
    hints
}

/// Data values along one axis (`'x'` or `'y'`) used for autoscaling.
pub fn axis_values(prepared: &[Prepared<'_>], axis: char) -> Vec<f64> {
    collect_values(prepared, axis, true)
}

fn collect_values(prepared: &[Prepared<'_>], axis: char, with_skewt: bool) -> Vec<f64> {
    let want_x = axis == 'x';
    let mut values = Vec::new();
    for p in prepared {
        match p {
            Prepared::Scatter(s) => {
                values.extend(if want_x { &s.layer.x } else { &s.layer.y });
                if let Some(r) = &s.regression {
                    if !want_x {
                        values.extend(r.y_pred.iter().copied());
                    }
                }
            }
            Prepared::Histogram(h) => {
                let pos_axis = want_x != h.horizontal();
                for b in &h.bars {
                    if pos_axis {
                        values.extend([b[0], b[1]]);
                    } else {
                        values.extend([b[2], b[3]]);
                    }
                }
            }
            Prepared::Density { curve, .. } => {
                values.extend(if want_x { &curve.x } else { &curve.density });
            }
            Prepared::Line(l) => values.extend(if want_x { &l.x } else { &l.y }),
            Prepared::SkewT(l) if with_skewt => values.extend(if want_x { &l.x } else { &l.y }),
            Prepared::SkewT(_) => {}
            Prepared::Bar(b) => {
                let pos_axis = want_x != b.horizontal;
                let (val_err, pos_err) = if b.horizontal {
                    (&b.style.xerr, &b.style.yerr)
                } else {
                    (&b.style.yerr, &b.style.xerr)
                };
                for (i, bar) in b.bars.iter().enumerate() {
                    if pos_axis {
                        let e = err_at(pos_err, i).unwrap_or(0.0);
                        values.extend([bar[0], bar[1], b.centers[i] - e, b.centers[i] + e]);
                    } else {
                        let e = err_at(val_err, i).unwrap_or(0.0);
                        values.extend([bar[2], bar[3] - e, bar[3] + e]);
                    }
                }
            }
            Prepared::VLine(_) | Prepared::HLine(_) | Prepared::Span(_) => {}
        }
    }
    values
}

/// X limits when skew-T layers shift points right with height.
///
/// A point at height fraction `fy` lands at `x + g * fy * span`, where
/// `g = height * tan(skew) / width`; the limits are iterated to a fixed
/// point since the span depends on them.
pub fn skewed_x_limits(prepared: &[Prepared<'_>], y: &Axis, g: f64, scale: Scale) -> (f64, f64) {
    let mut pairs: Vec<(f64, f64)> = Vec::new();
    for p in prepared {
        if let Prepared::SkewT(l) = p {
            for (&t, &pr) in l.x.iter().zip(&l.y) {
                if let Some(fy) = y.fraction(pr) {
                    pairs.push((t, fy));
                }
            }
        }
    }
    let plain = collect_values(prepared, 'x', false);
    let (mut lo, mut hi) = autoscale(pairs.iter().map(|p| p.0).chain(plain.iter().copied()), scale);
    for _ in 0..20 {
        let span = hi - lo;
        let values: Vec<f64> = pairs
            .iter()
            .map(|&(t, fy)| t + g * fy * span)
            .chain(plain.iter().copied())
            .collect();
        let (nlo, nhi) = autoscale(values, scale);
        if (nlo - lo).abs() < 1e-9 * span.abs().max(1.0) && (nhi - hi).abs() < 1e-9 * span.abs().max(1.0) {
            break;
        }
        lo = nlo;
        hi = nhi;
    }
    (lo, hi)
}

/// Last color series among the layers, used by the colorbar.
pub fn color_series(prepared: &[Prepared<'_>]) -> Option<ColorSeries> {
    prepared.iter().rev().find_map(|p| match p {
        Prepared::Scatter(s) => match (&s.density, &s.layer.density) {
            (Some((_, series)), Some(d)) if d.colorbar => Some(series.clone()),
            _ => None,
        },
        _ => None,
    })
}

/// Bar category labels replacing numeric ticks: `(x, y)`.
pub fn category_ticks(prepared: &[Prepared<'_>]) -> [Option<(Vec<f64>, Vec<String>)>; 2] {
    let mut out = [None, None];
    for p in prepared {
        if let Prepared::Bar(b) = p {
            if let Some(labels) = &b.style.tick_label {
                out[b.horizontal as usize] = Some((b.centers.clone(), labels.clone()));
            }
        }
    }
    out
}

/// Legend entries, color series and pixel positions of drawn data.
#[derive(Default)]
pub struct DrawOutput {
    pub legend: Vec<LegendEntry>,
    pub points: Vec<(f32, f32)>,
}

const FRACTION_LIMIT: f64 = 0.5;

/// Axis fraction with values the scale cannot show pushed off the near edge.
fn clamped_fraction(axis: &Axis, v: f64) -> f64 {
    let f = axis.fraction(v).unwrap_or(if axis.inverted { 1.0 + FRACTION_LIMIT } else { -FRACTION_LIMIT });
    f.clamp(-FRACTION_LIMIT, 1.0 + FRACTION_LIMIT)
}

/// Corners of a data-space rectangle; a parallelogram on skewed axes.
fn quad(axes: &Axes, x0: f64, x1: f64, y0: f64, y1: f64) -> Vec<(f32, f32)> {
    let (fx0, fx1) = (clamped_fraction(&axes.x, x0), clamped_fraction(&axes.x, x1));
    let (fy0, fy1) = (clamped_fraction(&axes.y, y0), clamped_fraction(&axes.y, y1));
    vec![
        axes.fraction_to_pixel(fx0, fy0),
        axes.fraction_to_pixel(fx1, fy0),
        axes.fraction_to_pixel(fx1, fy1),
        axes.fraction_to_pixel(fx0, fy1),
    ]
}

fn oriented(horizontal: bool, pos: f64, val: f64) -> (f64, f64) {
    if horizontal {
        (val, pos)
    } else {
        (pos, val)
    }
}

fn polyline(axes: &Axes, x: &[f64], y: &[f64]) -> Vec<(f32, f32)> {
    x.iter()
        .zip(y)
        .map(|(&a, &b)| axes.to_pixel(a, b).unwrap_or((f32::NAN, f32::NAN)))
        .collect()
}

fn draw_markers(
    canvas: &mut Canvas,
    points: &[(f32, f32)],
    marker: Option<Marker>,
    diameter: f32,
    fill: Color,
) {
    if let Some(m) = marker {
        for &(px, py) in points {
            canvas.draw_marker(px, py, m, diameter, fill, None);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn line_layer(
    canvas: &mut Canvas,
    ctx: &RenderContext<'_>,
    axes: &Axes,
    out: &mut DrawOutput,
    x: &[f64],
    y: &[f64],
    color_name: &str,
    alpha: Option<f32>,
    style: renderer::LineStyle,
    width: f32,
    marker: Option<Marker>,
    markersize: f32,
    label: Option<&str>,
) -> EmcResult<()> {
    let c = color(color_name, alpha)?;
    let stroke = StrokeStyle {
        color: c,
        width: ctx.pt(width),
        style,
    };
    let pts = polyline(axes, x, y);
    canvas.stroke_polyline(&pts, &stroke);
    let diameter = ctx.pt(markersize);
    draw_markers(canvas, &pts, marker, diameter, c);
    out.points.extend(pts.iter().filter(|p| p.0.is_finite()));
    if let Some(label) = label {
        out.legend.push(LegendEntry::new(
            label,
            Glyph::Line {
                stroke,
                marker: marker.map(|m| (m, diameter, c)),
            },
        ));
    }
    Ok(())
}

fn draw_scatter(
    canvas: &mut Canvas,
    ctx: &RenderContext<'_>,
    axes: &Axes,
    s: &ScatterPrep<'_>,
    out: &mut DrawOutput,
) -> EmcResult<()> {
    let layer = s.layer;
    let diameter = ctx.marker_diameter(layer.markersize);
    let edge = match &layer.edgecolors {
        Some(name) => Some(ctx.stroke(color(name, layer.alpha)?, layer.linewidths)),
        None => None,
    };
    let single = color(&layer.color, layer.alpha)?;
    let colors = s.density.as_ref().map(|(z, series)| series.colors(z));
    for &i in &s.order {
        let Some((px, py)) = axes.to_pixel(layer.x[i], layer.y[i]) else {
            continue;
        };
        let fill = colors.as_ref().map_or(single, |c| c[i]);
        canvas.draw_marker(px, py, layer.marker, diameter, fill, edge.as_ref());
        out.points.push((px, py));
    }
    if let Some(label) = &layer.label {
        let fill = match &s.density {
            Some((_, series)) => series.cmap.sample(0.5),
            None => single,
        };
        out.legend.push(LegendEntry::new(
            label.clone(),
            Glyph::Marker {
                marker: layer.marker,
                size: diameter.max(ctx.pt(4.0)),
                fill,
                edge,
            },
        ));
    }

    if let (Some(fit), Some(style)) = (&s.regression, &layer.linear_regression) {
        let (lo, hi) = layer
            .x
            .iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let stroke = StrokeStyle {
            color: color(&style.color, None)?,
            width: ctx.pt(style.linewidth),
            style: style.linestyle,
        };
        let pts = polyline(axes, &[lo, hi], &[fit.predict(lo), fit.predict(hi)]);
        canvas.stroke_polyline(&pts, &stroke);
        out.legend.push(LegendEntry::new(fit.label(), Glyph::Line { stroke, marker: None }));
    }
    Ok(())
}

fn draw_histogram(
    canvas: &mut Canvas,
    ctx: &RenderContext<'_>,
    axes: &Axes,
    h: &HistPrep<'_>,
    out: &mut DrawOutput,
) -> EmcResult<()> {
    let layer = h.layer;
    let horizontal = h.horizontal();
    let fill = color(&layer.color, layer.alpha)?;
    let stroke = StrokeStyle {
        color: fill,
        width: ctx.pt(layer.linewidth),
        style: renderer::LineStyle::Solid,
    };
    match layer.histtype {
        HistType::Bar | HistType::BarStacked => {
            for b in &h.bars {
                let (x0, y0) = oriented(horizontal, b[0], b[2]);
                let (x1, y1) = oriented(horizontal, b[1], b[3]);
                canvas.fill_polygon(&quad(axes, x0, x1, y0, y1), fill, None);
            }
        }
        HistType::Step | HistType::StepFilled => {
            let pts: Vec<(f32, f32)> = h
                .outline
                .iter()
                .map(|&(p, v)| {
                    let (x, y) = oriented(horizontal, p, v);
                    axes.fraction_to_pixel(clamped_fraction(&axes.x, x), clamped_fraction(&axes.y, y))
                })
                .collect();
            if layer.histtype == HistType::StepFilled {
                canvas.fill_polygon(&pts, fill, Some(&stroke));
            } else {
                canvas.stroke_polyline(&pts, &stroke);
            }
        }
    }
    for b in &h.bars {
        let (x, y) = oriented(horizontal, 0.5 * (b[0] + b[1]), b[3]);
        if let Some(p) = axes.to_pixel(x, y) {
            out.points.push(p);
        }
    }
    if let Some(label) = &layer.label {
        let glyph = if layer.histtype == HistType::Step {
            Glyph::Line { stroke, marker: None }
        } else {
            Glyph::Patch { fill, edge: None }
        };
        out.legend.push(LegendEntry::new(label.clone(), glyph));
    }
    Ok(())
}

fn draw_bars(
    canvas: &mut Canvas,
    ctx: &RenderContext<'_>,
    axes: &Axes,
    b: &BarPrep<'_>,
    out: &mut DrawOutput,
) -> EmcResult<()> {
    let style = b.style;
    let fill = color(&style.color, style.alpha)?;
    let edge = match &style.edgecolor {
        Some(name) if style.linewidth > 0.0 => Some(ctx.stroke(color(name, style.alpha)?, style.linewidth)),
        _ => None,
    };
    for bar in &b.bars {
        let (x0, y0) = oriented(b.horizontal, bar[0], bar[2]);
        let (x1, y1) = oriented(b.horizontal, bar[1], bar[3]);
        canvas.fill_polygon(&quad(axes, x0, x1, y0, y1), fill, edge.as_ref());
        if let Some(p) = axes.to_pixel(0.5 * (x0 + x1), 0.5 * (y0 + y1)) {
            out.points.push(p);
        }
    }

    let (val_err, pos_err) = if b.horizontal {
        (&style.xerr, &style.yerr)
    } else {
        (&style.yerr, &style.xerr)
    };
    let ecolor = ctx.stroke(color(&style.ecolor, None)?, 1.5);
    let cap = ctx.pt(style.capsize) / 2.0;
    for (i, bar) in b.bars.iter().enumerate() {
        let (c, top) = (b.centers[i], bar[3]);
        let mut segments: Vec<((f64, f64), (f64, f64), bool)> = Vec::new();
        if let Some(e) = err_at(val_err, i) {
            segments.push((oriented(b.horizontal, c, top - e), oriented(b.horizontal, c, top + e), !b.horizontal));
        }
        if let Some(e) = err_at(pos_err, i) {
            segments.push((oriented(b.horizontal, c - e, top), oriented(b.horizontal, c + e, top), b.horizontal));
        }
        for (a, z, vertical) in segments {
            let (Some(p0), Some(p1)) = (axes.to_pixel(a.0, a.1), axes.to_pixel(z.0, z.1)) else {
                continue;
            };
            canvas.line(p0.0, p0.1, p1.0, p1.1, &ecolor);
            if cap > 0.0 {
                for p in [p0, p1] {
                    if vertical {
                        canvas.line(p.0 - cap, p.1, p.0 + cap, p.1, &ecolor);
                    } else {
                        canvas.line(p.0, p.1 - cap, p.0, p.1 + cap, &ecolor);
                    }
                }
            }
        }
    }
    if let Some(label) = &style.label {
        out.legend.push(LegendEntry::new(label.clone(), Glyph::Patch { fill, edge }));
    }
    Ok(())
}

fn draw_density(
    canvas: &mut Canvas,
    ctx: &RenderContext<'_>,
    axes: &Axes,
    layer: &Density,
    curve: &KdeCurve,
    out: &mut DrawOutput,
) -> EmcResult<()> {
    if layer.fill {
        let mut pts = polyline(axes, &curve.x, &curve.density);
        if let (Some(&first), Some(&last)) = (curve.x.first(), curve.x.last()) {
            let base = |x: f64| axes.fraction_to_pixel(clamped_fraction(&axes.x, x), clamped_fraction(&axes.y, 0.0));
            pts.push(base(last));
            pts.push(base(first));
        }
        let shade = color(&layer.color, Some(layer.alpha.unwrap_or(0.25)))?;
        canvas.fill_polygon(&pts, shade, None);
    }
    line_layer(
        canvas,
        ctx,
        axes,
        out,
        &curve.x,
        &curve.density,
        &layer.color,
        layer.alpha,
        layer.linestyle,
        layer.linewidth,
        None,
        0.0,
        layer.label.as_deref(),
    )
}

/// Draw every prepared layer, clipped to the axes.
pub fn draw_layers(
    canvas: &mut Canvas,
    ctx: &RenderContext<'_>,
    axes: &Axes,
    prepared: &[Prepared<'_>],
) -> EmcResult<DrawOutput> {
    let mut out = DrawOutput::default();
    canvas.set_clip(Some(axes.rect));
    let result = prepared.iter().try_for_each(|p| draw_one(canvas, ctx, axes, p, &mut out));
    canvas.set_clip(None);
    result.map(|_| out)
}

fn draw_one(
    canvas: &mut Canvas,
    ctx: &RenderContext<'_>,
    axes: &Axes,
    p: &Prepared<'_>,
    out: &mut DrawOutput,
) -> EmcResult<()> {
    match p {
        Prepared::Scatter(s) => draw_scatter(canvas, ctx, axes, s, out),
        Prepared::Histogram(h) => draw_histogram(canvas, ctx, axes, h, out),
        Prepared::Density { layer, curve } => draw_density(canvas, ctx, axes, layer, curve, out),
        Prepared::Bar(b) => draw_bars(canvas, ctx, axes, b, out),
        Prepared::Line(l) => line_layer(
            canvas,
            ctx,
            axes,
            out,
            &l.x,
            &l.y,
            &l.color,
            l.alpha,
            l.linestyle,
            l.linewidth,
            l.marker,
            l.markersize,
            l.label.as_deref(),
        ),
        Prepared::SkewT(l) => line_layer(
            canvas,
            ctx,
            axes,
            out,
            &l.x,
            &l.y,
            &l.color,
            l.alpha,
            l.linestyle,
            l.linewidth,
            l.marker,
            l.markersize,
            l.label.as_deref(),
        ),
        Prepared::VLine(l) => {
            let stroke = StrokeStyle {
                color: color(&l.color, None)?,
                width: ctx.pt(l.linewidth),
                style: l.linestyle,
            };
            if let Some(fx) = axes.x.fraction(l.x) {
                let (x0, y0) = axes.fraction_to_pixel(fx, 0.0);
                let (x1, y1) = axes.fraction_to_pixel(fx, 1.0);
                canvas.line(x0, y0, x1, y1, &stroke);
            }
            if let Some(label) = &l.label {
                out.legend.push(LegendEntry::new(label.clone(), Glyph::Line { stroke, marker: None }));
            }
            Ok(())
        }
        Prepared::HLine(l) => {
            let stroke = StrokeStyle {
                color: color(&l.color, None)?,
                width: ctx.pt(l.linewidth),
                style: l.linestyle,
            };
            if let Some(fy) = axes.y.fraction(l.y) {
                let (x0, y0) = axes.fraction_to_pixel(0.0, fy);
                let (x1, y1) = axes.fraction_to_pixel(1.0, fy);
                canvas.line(x0, y0, x1, y1, &stroke);
            }
            if let Some(label) = &l.label {
                out.legend.push(LegendEntry::new(label.clone(), Glyph::Line { stroke, marker: None }));
            }
            Ok(())
        }
        Prepared::Span(l) => {
            let fill = color(&l.color, l.alpha)?;
            let (fy0, fy1) = (clamped_fraction(&axes.y, l.ymin), clamped_fraction(&axes.y, l.ymax));
            let pts = vec![
                axes.fraction_to_pixel(0.0, fy0),
                axes.fraction_to_pixel(1.0, fy0),
                axes.fraction_to_pixel(1.0, fy1),
                axes.fraction_to_pixel(0.0, fy1),
            ];
            canvas.fill_polygon(&pts, fill, None);
            if let Some(label) = &l.label {
                out.legend.push(LegendEntry::new(label.clone(), Glyph::Patch { fill, edge: None }));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binning::Bins;

    #[test]
    fn test_stacked_histograms_accumulate() {
        let mut a = Histogram::new(vec![0.5, 1.5, 1.5]);
        a.bins = Bins::Edges(vec![0.0, 1.0, 2.0]);
        let mut b = a.clone();
        b.stacked = true;
        let layers: Vec<PlotLayer> = vec![a.into(), b.into()];
        let prepared = prepare(&layers).unwrap();
        let Prepared::Histogram(top) = &prepared[1] else {
            panic!("expected a histogram");
        };
        assert_eq!(top.bars[0][2..], [1.0, 2.0]);
        assert_eq!(top.bars[1][2..], [2.0, 4.0]);
        let ys = axis_values(&prepared, 'y');
        assert!(ys.contains(&4.0));
    }

    #[test]
    fn test_lines_do_not_extend_limits() {
        let layers: Vec<PlotLayer> = vec![
            LinePlot::new(vec![0.0, 1.0], vec![0.0, 1.0]).unwrap().into(),
            VerticalLine::new(50.0).into(),
            HorizontalSpan::new(-10.0, 10.0).into(),
        ];
        let prepared = prepare(&layers).unwrap();
        assert_eq!(axis_values(&prepared, 'x'), vec![0.0, 1.0]);
        assert_eq!(axis_values(&prepared, 'y'), vec![0.0, 1.0]);
    }

    #[test]
    fn test_bar_errors_validated() {
        let mut bar = crate::layers::BarPlot::new(vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0]).unwrap();
        bar.style.yerr = Some(vec![0.1, 0.2]);
        let layers: Vec<PlotLayer> = vec![bar.into()];
        assert!(matches!(prepare(&layers), Err(EmcError::LengthMismatch { .. })));
    }

    #[test]
    fn test_bar_categories_and_hints() {
        let mut bar = crate::layers::HorizontalBar::new(vec![1.0, 2.0], vec![3.0, 4.0]).unwrap();
        bar.style.tick_label = Some(vec!["a".into(), "b".into()]);
        bar.style.log = true;
        let layers: Vec<PlotLayer> = vec![bar.into()];
        let prepared = prepare(&layers).unwrap();
        let [x, y] = category_ticks(&prepared);
        assert!(x.is_none());
        assert_eq!(y.unwrap().1, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(scale_hints(&prepared), (true, false, false));
    }

    #[test]
    fn test_map_layer_rejected() {
        let m = crate::map_layers::MapScatter::new(vec![0.0], vec![0.0], None).unwrap();
        let layers: Vec<PlotLayer> = vec![m.into()];
        let err = prepare(&layers).err().unwrap().to_string();
        assert!(err.starts_with("map_scatter is not a valid plot type"));
    }

    #[test]
    fn test_skewed_limits_cover_shifted_points() {
        let skew = SkewT::new(vec![20.0, -40.0], vec![1000.0, 200.0]).unwrap();
        let layers: Vec<PlotLayer> = vec![skew.into()];
        let prepared = prepare(&layers).unwrap();
        let mut y = Axis::new(Scale::Log, 1050.0, 100.0);
        y.inverted = false;
        let g = 0.7;
        let (lo, hi) = skewed_x_limits(&prepared, &y, g, Scale::Linear);
        let x = Axis::new(Scale::Linear, lo, hi);
        for (&t, &p) in [20.0, -40.0].iter().zip(&[1000.0, 200.0]) {
            let f = x.fraction(t).unwrap() + g * y.fraction(p).unwrap();
            assert!((-1e-6..=1.0 + 1e-6).contains(&f), "fraction {}", f);
        }
    }
}
