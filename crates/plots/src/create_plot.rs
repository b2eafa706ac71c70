//! One subplot: its data layers plus the decorations drawn around them.
//!
//! Settings are stored as they are added and turned into pixels by
//! [`CreatePlot::render`] once the figure knows the subplot's cell. Whether
//! the subplot is drawn on cartesian or map axes follows from its layers and
//! from whether a domain or projection was set.

use std::path::Path;

use image::imageops::{self, FilterType};
use renderer::{Canvas, Color, HAlign, PixelRect, TextStyle, VAlign};
use tracing::{debug, warn};

use emc_common::{EmcError, EmcResult};
use projection::{Domain, MapProjection, ProjectionKind};

use crate::axes::{autoscale, check_tick_labels, format_ticks, Axes, Axis, Scale};
use crate::cartesian::{
    axis_values, category_ticks, color_series, draw_layers, prepare, scale_hints, skewed_x_limits, DrawOutput,
};
use crate::colorbar::{draw_colorbar, layout, reserved_space, ColorSeries};
use crate::context::{color, RenderContext};
use crate::decorations::{
    parse_features, rotation_is_vertical, AxisLabel, ColorbarSpec, Corner, Grid, Legend, Logo, MapFeature, StatsText,
    TextAnnotation, TextLoc, TickLabels, Title, Transform,
};
use crate::features::{draw_filled_features, draw_line_features};
use crate::layers::{Orientation, PlotLayer, SkewT};
use crate::legend::draw_legend;
use crate::maps::{data_range, draw_map_layers, map_color_series, tick_label_text, wants_colorbar, MapAxes};

const TICK_LENGTH_PT: f32 = 3.5;
const TICK_PAD_PT: f32 = 3.5;
const TICK_FONTSIZE: f32 = 10.0;
const LABEL_PAD_PT: f32 = 4.0;
const TITLE_PAD_PT: f32 = 6.0;

/// Default figure fractions kept around the axes when not tight.
const SUBPLOT_LEFT: f32 = 0.125;
const SUBPLOT_RIGHT: f32 = 0.1;
const SUBPLOT_BOTTOM: f32 = 0.11;
const SUBPLOT_TOP: f32 = 0.12;

/// Map window given by name or spelled out.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainSpec {
    Named(String),
    Custom(Domain),
}

impl DomainSpec {
    pub fn resolve(&self) -> EmcResult<Domain> {
        match self {
            DomainSpec::Named(name) => Domain::new(name),
            DomainSpec::Custom(domain) => Ok(domain.clone()),
        }
    }
}

impl From<&str> for DomainSpec {
    fn from(name: &str) -> Self {
        DomainSpec::Named(name.to_string())
    }
}

impl From<Domain> for DomainSpec {
    fn from(domain: Domain) -> Self {
        DomainSpec::Custom(domain)
    }
}

/// Layers and settings of one subplot.
#[derive(Debug, Clone, Default)]
pub struct CreatePlot {
    pub plot_layers: Vec<PlotLayer>,
    /// Projection name; maps default to `plcarr`
    pub projection: Option<String>,
    pub domain: Option<DomainSpec>,
    pub title: Option<Title>,
    pub xlabel: Option<AxisLabel>,
    pub ylabel: Option<AxisLabel>,
    pub legend: Option<Legend>,
    pub grid: Option<Grid>,
    pub xlim: (Option<f64>, Option<f64>),
    pub ylim: (Option<f64>, Option<f64>),
    pub xticks: Option<Vec<f64>>,
    pub yticks: Option<Vec<f64>>,
    pub xticklabels: Option<TickLabels>,
    pub yticklabels: Option<TickLabels>,
    pub xscale: Option<Scale>,
    pub yscale: Option<Scale>,
    pub invert_x: bool,
    pub invert_y: bool,
    pub colorbar: Option<ColorbarSpec>,
    pub stats: Option<StatsText>,
    pub texts: Vec<TextAnnotation>,
    pub map_features: Vec<MapFeature>,
    pub logo: Option<Logo>,
}

fn has_color_series(layer: &PlotLayer) -> bool {
    match layer {
        PlotLayer::Scatter(s) => s.density.as_ref().is_some_and(|d| d.colorbar),
        other => wants_colorbar(other),
    }
}

impl CreatePlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map subplot on a named or custom domain.
    pub fn map(domain: impl Into<DomainSpec>, projection: &str) -> EmcResult<Self> {
        let mut plot = Self::new();
        plot.set_domain(domain)?;
        plot.set_projection(projection)?;
        Ok(plot)
    }

    /// Set by a projection or domain, never by the layers.
    pub fn is_map(&self) -> bool {
        self.projection.is_some() || self.domain.is_some()
    }

    pub fn set_projection(&mut self, name: &str) -> EmcResult<()> {
        let kind: ProjectionKind = name.parse()?;
        self.projection = Some(kind.as_str().to_string());
        Ok(())
    }

    pub fn set_domain(&mut self, domain: impl Into<DomainSpec>) -> EmcResult<()> {
        let spec = domain.into();
        spec.resolve()?;
        self.domain = Some(spec);
        Ok(())
    }

    /// Append layers, rejecting any the subplot's axes cannot draw.
    pub fn draw_data<L: Into<PlotLayer>>(&mut self, layers: impl IntoIterator<Item = L>) -> EmcResult<()> {
        let layers: Vec<PlotLayer> = layers.into_iter().map(Into::into).collect();
        let map = self.is_map();
        let supported: &[&str] = if map {
            &PlotLayer::MAP_TYPES
        } else {
            &PlotLayer::CARTESIAN_TYPES
        };
        for layer in &layers {
            if !supported.contains(&layer.plottype()) {
                return Err(EmcError::invalid_choice("plot type", layer.plottype(), supported));
            }
        }
        debug!(count = layers.len(), map, "Added plot layers");
        self.plot_layers.extend(layers);
        Ok(())
    }

    pub fn add_title(&mut self, title: impl Into<Title>) {
        self.title = Some(title.into());
    }

    pub fn add_xlabel(&mut self, label: impl Into<AxisLabel>) {
        self.xlabel = Some(label.into());
    }

    pub fn add_ylabel(&mut self, label: impl Into<AxisLabel>) {
        self.ylabel = Some(label.into());
    }

    pub fn add_legend(&mut self, legend: Legend) {
        self.legend = Some(legend);
    }

    pub fn add_grid(&mut self, grid: Grid) {
        self.grid = Some(grid);
    }

    pub fn set_xlim(&mut self, left: Option<f64>, right: Option<f64>) {
        self.xlim = (left, right);
    }

    pub fn set_ylim(&mut self, bottom: Option<f64>, top: Option<f64>) {
        self.ylim = (bottom, top);
    }

    pub fn set_xticks(&mut self, ticks: Vec<f64>) {
        self.xticks = Some(ticks);
    }

    pub fn set_yticks(&mut self, ticks: Vec<f64>) {
        self.yticks = Some(ticks);
    }

    /// Labels must match explicit ticks now, or the computed ticks at render.
    pub fn set_xticklabels(&mut self, labels: TickLabels) -> EmcResult<()> {
        if let Some(ticks) = &self.xticks {
            check_tick_labels('x', labels.labels.len(), ticks.len())?;
        }
        self.xticklabels = Some(labels);
        Ok(())
    }

    pub fn set_yticklabels(&mut self, labels: TickLabels) -> EmcResult<()> {
        if let Some(ticks) = &self.yticks {
            check_tick_labels('y', labels.labels.len(), ticks.len())?;
        }
        self.yticklabels = Some(labels);
        Ok(())
    }

    pub fn set_xscale(&mut self, scale: &str) -> EmcResult<()> {
        self.xscale = Some(scale.parse()?);
        Ok(())
    }

    pub fn set_yscale(&mut self, scale: &str) -> EmcResult<()> {
        self.yscale = Some(scale.parse()?);
        Ok(())
    }

    pub fn invert_xaxis(&mut self) {
        self.invert_x = true;
    }

    pub fn invert_yaxis(&mut self) {
        self.invert_y = true;
    }

    /// Requires a layer with a color series once any layers are present.
    pub fn add_colorbar(&mut self, spec: ColorbarSpec) -> EmcResult<()> {
        if !self.plot_layers.is_empty() && !self.plot_layers.iter().any(has_color_series) {
            return Err(EmcError::NoColorSeries);
        }
        self.colorbar = Some(spec);
        Ok(())
    }

    pub fn add_stats_dict(&mut self, stats: StatsText) {
        self.stats = Some(stats);
    }

    pub fn add_text(&mut self, text: TextAnnotation) {
        self.texts.push(text);
    }

    pub fn add_map_features<S: AsRef<str>>(&mut self, features: &[S]) -> EmcResult<()> {
        for feature in parse_features(features)? {
            if !self.map_features.contains(&feature) {
                self.map_features.push(feature);
            }
        }
        Ok(())
    }

    pub fn add_logo(&mut self, logo: Logo) {
        self.logo = Some(logo);
    }

    /// Draw the subplot into `cell`.
    pub fn render(&self, canvas: &mut Canvas, cell: PixelRect, ctx: &RenderContext<'_>) -> EmcResult<()> {
        if self.is_map() {
            self.render_map(canvas, cell, ctx)
        } else {
            self.render_cartesian(canvas, cell, ctx)
        }
    }

    fn render_cartesian(&self, canvas: &mut Canvas, cell: PixelRect, ctx: &RenderContext<'_>) -> EmcResult<()> {
        let prepared = prepare(&self.plot_layers)?;
        let (x_log, y_log, skew) = scale_hints(&prepared);
        let hinted = |log: bool| if log { Scale::Log } else { Scale::Linear };
        let xscale = self.xscale.unwrap_or(hinted(x_log));
        let yscale = self.yscale.unwrap_or(hinted(y_log));

        let (ymin, ymax) = autoscale(axis_values(&prepared, 'y'), yscale);
        let y = Axis {
            scale: yscale,
            min: self.ylim.0.unwrap_or(ymin),
            max: self.ylim.1.unwrap_or(ymax),
            inverted: self.invert_y || skew,
        };
        let (xmin, xmax) = autoscale(axis_values(&prepared, 'x'), xscale);
        let mut x = Axis {
            scale: xscale,
            min: self.xlim.0.unwrap_or(xmin),
            max: self.xlim.1.unwrap_or(xmax),
            inverted: self.invert_x,
        };

        let series = color_series(&prepared);
        if self.colorbar.is_some() && series.is_none() {
            return Err(EmcError::NoColorSeries);
        }

        let [xcat, ycat] = category_ticks(&prepared);
        let yticks = resolve_ticks('y', &y, &self.yticks, &self.yticklabels, ycat)?;
        let prelim_x = resolve_ticks('x', &x, &self.xticks, &self.xticklabels, xcat.clone())?;

        let left_ticks = tick_extent(ctx, &yticks, self.yticklabels.as_ref(), 'y');
        let bottom_ticks = tick_extent(ctx, &prelim_x, self.xticklabels.as_ref(), 'x');
        let margins = self.margins(ctx, cell, left_ticks, bottom_ticks, series.as_ref());
        let rect = margins.apply(cell, ctx.tight)?;

        let skew = skew.then(|| SkewT::SKEW_DEGREES.to_radians().tan());
        if let Some(t) = skew {
            let g = rect.height as f64 * t / rect.width as f64;
            let (lo, hi) = skewed_x_limits(&prepared, &y, g, xscale);
            x.min = self.xlim.0.unwrap_or(lo);
            x.max = self.xlim.1.unwrap_or(hi);
        }
        let xticks = resolve_ticks('x', &x, &self.xticks, &self.xticklabels, xcat)?;
        let axes = Axes { rect, x, y, skew };
        debug!(
            layers = self.plot_layers.len(),
            x = ?(axes.x.min, axes.x.max),
            y = ?(axes.y.min, axes.y.max),
            "Rendering cartesian subplot"
        );

        if let Some(grid) = &self.grid {
            let stroke = ctx.grid_stroke(grid)?;
            canvas.set_clip(Some(rect));
            for &v in &xticks.values {
                if let Some(fx) = axes.x.fraction(v) {
                    let (x0, y0) = axes.fraction_to_pixel(fx, 0.0);
                    let (x1, y1) = axes.fraction_to_pixel(fx, 1.0);
                    canvas.line(x0, y0, x1, y1, &stroke);
                }
            }
            for &v in &yticks.values {
                if let Some(fy) = axes.y.fraction(v) {
                    let py = rect.bottom() - fy as f32 * rect.height;
                    canvas.line(rect.x, py, rect.right(), py, &stroke);
                }
            }
            canvas.set_clip(None);
        }

        let out = draw_layers(canvas, ctx, &axes, &prepared)?;

        let frame = ctx.stroke(Color::BLACK, 0.8);
        canvas.stroke_rect(rect, &frame);
        let tick_len = ctx.pt(TICK_LENGTH_PT);
        let gap = tick_len + ctx.pt(TICK_PAD_PT);
        let xstyle = tick_style(ctx, self.xticklabels.as_ref())?;
        for (v, label) in xticks.values.iter().zip(&xticks.labels) {
            let Some(fx) = axes.x.fraction(*v) else { continue };
            let px = rect.x + fx as f32 * rect.width;
            canvas.line(px, rect.bottom(), px, rect.bottom() + tick_len, &frame);
            ctx.fonts.draw(canvas, label, px, rect.bottom() + gap, &xstyle.align(HAlign::Center, VAlign::Top));
        }
        let ystyle = tick_style(ctx, self.yticklabels.as_ref())?;
        for (v, label) in yticks.values.iter().zip(&yticks.labels) {
            let Some(fy) = axes.y.fraction(*v) else { continue };
            let py = rect.bottom() - fy as f32 * rect.height;
            canvas.line(rect.x - tick_len, py, rect.x, py, &frame);
            ctx.fonts.draw(canvas, label, rect.x - gap, py, &ystyle.align(HAlign::Right, VAlign::Center));
        }

        let extents = TickExtents {
            left: left_ticks,
            bottom: tick_extent(ctx, &xticks, self.xticklabels.as_ref(), 'x'),
        };
        self.draw_decorations(canvas, ctx, cell, rect, extents, series.as_ref(), &out, &|dx: f64, dy: f64| {
            axes.to_pixel(dx, dy)
        })
    }

    fn render_map(&self, canvas: &mut Canvas, cell: PixelRect, ctx: &RenderContext<'_>) -> EmcResult<()> {
        let domain = match &self.domain {
            Some(spec) => spec.resolve()?,
            None => Domain::default(),
        };
        let proj = MapProjection::new(self.projection.as_deref().unwrap_or("plcarr"), domain.cenlon, domain.cenlat)?;
        let series = map_color_series(&self.plot_layers)?;
        if self.colorbar.is_some() && series.is_none() {
            return Err(EmcError::NoColorSeries);
        }

        let (lon_labels, lat_labels) = tick_label_text(&proj, &domain);
        let size = ctx.pt(TICK_FONTSIZE);
        let text_gap = ctx.pt(TICK_LENGTH_PT + TICK_PAD_PT);
        let left_ticks = lat_labels
            .iter()
            .map(|l| ctx.fonts.measure(l, size, Default::default()).0 + text_gap)
            .fold(0.0, f32::max);
        let bottom_ticks = if lon_labels.is_empty() { 0.0 } else { size * 1.2 + text_gap };
        let margins = self.margins(ctx, cell, left_ticks, bottom_ticks, series.as_ref());
        let area = margins.apply(cell, ctx.tight)?;
        let map = MapAxes::new(proj, domain, area)?;
        debug!(
            projection = %map.proj,
            domain = %map.domain.name,
            layers = self.plot_layers.len(),
            range = ?data_range(&self.plot_layers),
            "Rendering map subplot"
        );

        draw_filled_features(canvas, ctx, &map, &self.map_features)?;
        let out = draw_map_layers(canvas, ctx, &map, &self.plot_layers)?;
        draw_line_features(canvas, ctx, &map, &self.map_features)?;
        if let Some(grid) = &self.grid {
            let stroke = ctx.grid_stroke(grid)?;
            canvas.set_clip(Some(map.rect));
            map.draw_gridlines(canvas, &stroke);
            canvas.set_clip(None);
        }
        map.draw_frame(canvas, ctx);
        map.draw_tick_labels(canvas, ctx, TICK_FONTSIZE);

        let extents = TickExtents {
            left: left_ticks,
            bottom: bottom_ticks,
        };
        self.draw_decorations(canvas, ctx, cell, map.rect, extents, series.as_ref(), &out, &|lon: f64, lat: f64| {
            map.project(lon, lat)
        })
    }

    fn margins(
        &self,
        ctx: &RenderContext<'_>,
        cell: PixelRect,
        left_ticks: f32,
        bottom_ticks: f32,
        series: Option<&ColorSeries>,
    ) -> Margins {
        let pad = ctx.pt(LABEL_PAD_PT);
        let label_height = |label: &Option<AxisLabel>| match label {
            Some(l) if !l.label.is_empty() => {
                ctx.fonts.measure(&l.label, ctx.pt(l.fontsize), l.fontweight).1 + pad
            }
            _ => 0.0,
        };
        let mut m = Margins {
            left: left_ticks + label_height(&self.ylabel) + pad,
            right: ctx.pt(10.0),
            top: pad,
            bottom: bottom_ticks + label_height(&self.xlabel) + pad,
        };
        if let Some(title) = self.title.as_ref().filter(|t| !t.label.is_empty()) {
            m.top += ctx.fonts.measure(&title.label, ctx.pt(title.fontsize), title.fontweight).1 + ctx.pt(TITLE_PAD_PT);
        }
        if let (Some(spec), Some(series)) = (&self.colorbar, series) {
            let reserve = reserved_space(ctx, spec, series, cell);
            match spec.orientation {
                Orientation::Vertical => m.right += reserve,
                Orientation::Horizontal => m.bottom += reserve,
            }
        }
        m
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_decorations(
        &self,
        canvas: &mut Canvas,
        ctx: &RenderContext<'_>,
        cell: PixelRect,
        rect: PixelRect,
        extents: TickExtents,
        series: Option<&ColorSeries>,
        out: &DrawOutput,
        data_to_pixel: &dyn Fn(f64, f64) -> Option<(f32, f32)>,
    ) -> EmcResult<()> {
        let pad = ctx.pt(LABEL_PAD_PT);

        if let Some(label) = self.xlabel.as_ref().filter(|l| !l.label.is_empty()) {
            let style = TextStyle::new(ctx.pt(label.fontsize), color(&label.color, None)?).weight(label.fontweight);
            let px = match label.loc {
                TextLoc::Left => rect.x,
                TextLoc::Center => rect.x + rect.width / 2.0,
                TextLoc::Right => rect.right(),
            };
            let style = style.align(label.loc.halign(), VAlign::Top);
            ctx.fonts.draw(canvas, &label.label, px, rect.bottom() + extents.bottom + pad, &style);
        }
        if let Some(label) = self.ylabel.as_ref().filter(|l| !l.label.is_empty()) {
            let style = TextStyle::new(ctx.pt(label.fontsize), color(&label.color, None)?)
                .weight(label.fontweight)
                .vertical();
            // left and right run along the axis from the bottom to the top
            let (py, valign) = match label.loc {
                TextLoc::Left => (rect.bottom(), VAlign::Bottom),
                TextLoc::Center => (rect.y + rect.height / 2.0, VAlign::Center),
                TextLoc::Right => (rect.y, VAlign::Top),
            };
            let style = style.align(HAlign::Right, valign);
            ctx.fonts.draw(canvas, &label.label, rect.x - extents.left - pad, py, &style);
        }

        if let Some(title) = self.title.as_ref().filter(|t| !t.label.is_empty()) {
            let mut style = TextStyle::new(ctx.pt(title.fontsize), color(&title.color, None)?)
                .weight(title.fontweight)
                .align(title.loc.halign(), VAlign::Bottom);
            if title.italic {
                style = style.italic();
            }
            let px = match title.loc {
                TextLoc::Left => rect.x,
                TextLoc::Center => rect.x + rect.width / 2.0,
                TextLoc::Right => rect.right(),
            };
            ctx.fonts.draw(canvas, &title.label, px, rect.y - ctx.pt(TITLE_PAD_PT), &style);
        }

        if let Some(legend) = &self.legend {
            draw_legend(canvas, ctx, legend, &out.legend, rect, &out.points);
        }

        if let (Some(spec), Some(series)) = (&self.colorbar, series) {
            let offset = match spec.orientation {
                Orientation::Vertical => 0.0,
                Orientation::Horizontal => {
                    let xlabel = match &self.xlabel {
                        Some(l) if !l.label.is_empty() => {
                            ctx.fonts.measure(&l.label, ctx.pt(l.fontsize), l.fontweight).1 + pad
                        }
                        _ => 0.0,
                    };
                    extents.bottom + xlabel
                }
            };
            let placed = layout(ctx, spec, series, rect, offset);
            draw_colorbar(canvas, ctx, spec, series, placed.bar);
        }

        if let Some(stats) = &self.stats {
            let style = TextStyle::new(ctx.pt(stats.fontsize), Color::BLACK);
            let px = rect.x + stats.xloc * rect.width;
            let py = rect.bottom() - stats.yloc * rect.height;
            ctx.fonts.draw(canvas, &stats.text(), px, py, &style);
        }

        for text in &self.texts {
            let position = match text.transform {
                Transform::Axes => Some((
                    rect.x + text.xloc as f32 * rect.width,
                    rect.bottom() - text.yloc as f32 * rect.height,
                )),
                Transform::Data => data_to_pixel(text.xloc, text.yloc),
            };
            let Some((px, py)) = position else {
                debug!(text = %text.text, "Text anchor not visible, skipping");
                continue;
            };
            let style = TextStyle::new(ctx.pt(text.fontsize), color(&text.color, text.alpha)?)
                .weight(text.fontweight)
                .align(text.halign, VAlign::Center);
            ctx.fonts.draw(canvas, &text.text, px, py, &style);
        }

        if let Some(logo) = &self.logo {
            draw_logo(canvas, ctx, logo, cell, rect)?;
        }
        Ok(())
    }
}

/// Tick positions with their text.
#[derive(Debug, Clone, PartialEq)]
struct Ticks {
    values: Vec<f64>,
    labels: Vec<String>,
}

/// Explicit ticks, else bar categories, else automatic ones; labels from
/// the user, the categories or the scale's formatter. Ticks outside the
/// limits are dropped after labels are matched to them.
fn resolve_ticks(
    axis_name: char,
    axis: &Axis,
    explicit: &Option<Vec<f64>>,
    labels: &Option<TickLabels>,
    category: Option<(Vec<f64>, Vec<String>)>,
) -> EmcResult<Ticks> {
    let (values, category_labels) = match (explicit, category) {
        (Some(v), _) => (v.clone(), None),
        (None, Some((v, l))) => (v, Some(l)),
        (None, None) => (axis.auto_ticks(), None),
    };
    let labels = match (labels, category_labels) {
        (Some(tl), _) => {
            check_tick_labels(axis_name, tl.labels.len(), values.len())?;
            tl.labels.clone()
        }
        (None, Some(l)) => l,
        (None, None) => format_ticks(&values, axis.scale),
    };
    let (lo, hi) = (axis.min.min(axis.max), axis.min.max(axis.max));
    let slack = (hi - lo).abs() * 1e-9;
    let (values, labels) = values
        .into_iter()
        .zip(labels)
        .filter(|(v, _)| *v >= lo - slack && *v <= hi + slack)
        .unzip();
    Ok(Ticks { values, labels })
}

fn tick_style(ctx: &RenderContext<'_>, labels: Option<&TickLabels>) -> EmcResult<TextStyle> {
    Ok(match labels {
        Some(tl) => {
            let style = TextStyle::new(ctx.pt(tl.fontsize), color(&tl.color, None)?).weight(tl.fontweight);
            if tl.is_vertical() {
                style.vertical()
            } else {
                style
            }
        }
        None => TextStyle::new(ctx.pt(TICK_FONTSIZE), Color::BLACK),
    })
}

/// Room the tick marks and their labels take outside the axes.
fn tick_extent(ctx: &RenderContext<'_>, ticks: &Ticks, style: Option<&TickLabels>, axis: char) -> f32 {
    if ticks.labels.is_empty() {
        return ctx.pt(TICK_LENGTH_PT);
    }
    let (size, weight, vertical) = match style {
        Some(tl) => (ctx.pt(tl.fontsize), tl.fontweight, rotation_is_vertical(tl.rotation)),
        None => (ctx.pt(TICK_FONTSIZE), Default::default(), false),
    };
    let (w, h) = ticks
        .labels
        .iter()
        .map(|l| ctx.fonts.measure(l, size, weight))
        .fold((0.0f32, 0.0f32), |acc, m| (acc.0.max(m.0), acc.1.max(m.1)));
    let across = match (axis, vertical) {
        ('x', false) | ('y', true) => h,
        _ => w,
    };
    ctx.pt(TICK_LENGTH_PT + TICK_PAD_PT) + across
}

#[derive(Debug, Clone, Copy)]
struct TickExtents {
    left: f32,
    bottom: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Margins {
    left: f32,
    right: f32,
    top: f32,
    bottom: f32,
}

impl Margins {
    /// Axes rectangle inside `cell`; without `tight` each side keeps at
    /// least the default subplot fraction.
    fn apply(self, cell: PixelRect, tight: bool) -> EmcResult<PixelRect> {
        let m = if tight {
            self
        } else {
            Margins {
                left: self.left.max(SUBPLOT_LEFT * cell.width),
                right: self.right.max(SUBPLOT_RIGHT * cell.width),
                top: self.top.max(SUBPLOT_TOP * cell.height),
                bottom: self.bottom.max(SUBPLOT_BOTTOM * cell.height),
            }
        };
        if cell.width - m.left - m.right < 1.0 || cell.height - m.top - m.bottom < 1.0 {
            return Err(EmcError::Render(format!(
                "subplot of {:.0}x{:.0} px leaves no room for the axes",
                cell.width, cell.height
            )));
        }
        Ok(cell.inset(m.left, m.top, m.right, m.bottom))
    }
}

fn draw_logo(canvas: &mut Canvas, ctx: &RenderContext<'_>, logo: &Logo, cell: PixelRect, rect: PixelRect) -> EmcResult<()> {
    let img = load_logo(&logo.path)?;
    let height = (rect.height * logo.scale).round().max(1.0) as u32;
    let width = ((img.width() as f32 / img.height().max(1) as f32) * height as f32).round().max(1.0) as u32;
    let mut img = imageops::resize(&img, width, height, FilterType::Triangle);
    if let Some(a) = logo.alpha {
        for px in img.pixels_mut() {
            px.0[3] = (px.0[3] as f32 * a.clamp(0.0, 1.0)).round() as u8;
        }
    }
    let pad = ctx.pt(4.0);
    let (w, h) = (width as f32, height as f32);
    let (x, y) = match logo.loc {
        Corner::UpperLeft => (cell.x + pad, cell.y + pad),
        Corner::UpperRight => (cell.right() - w - pad, cell.y + pad),
        Corner::LowerLeft => (cell.x + pad, cell.bottom() - h - pad),
        Corner::LowerRight => (cell.right() - w - pad, cell.bottom() - h - pad),
    };
    canvas.blit(&img, x.round() as i32, y.round() as i32);
    Ok(())
}

fn load_logo(path: &Path) -> EmcResult<image::RgbaImage> {
    match image::open(path) {
        Ok(img) => Ok(img.to_rgba8()),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to load logo");
            Err(EmcError::Render(format!("cannot load logo {}: {}", path.display(), e)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::{BarPlot, LinePlot, Scatter};
    use crate::map_layers::MapScatter;
    use renderer::FontBook;

    fn ctx(fonts: &FontBook) -> RenderContext<'_> {
        RenderContext {
            dpi: 72.0,
            fonts,
            features_dir: None,
            tight: false,
        }
    }

    #[test]
    fn test_draw_data_rejects_map_layer_on_cartesian() {
        let mut plot = CreatePlot::new();
        plot.draw_data([Scatter::new(vec![1.0], vec![2.0]).unwrap()]).unwrap();
        let map = MapScatter::new(vec![10.0], vec![20.0], None).unwrap();
        let err = plot.draw_data([map]).unwrap_err().to_string();
        assert!(err.starts_with("map_scatter is not a valid plot type"));
        assert!(!plot.is_map());
        assert_eq!(plot.plot_layers.len(), 1);
    }

    #[test]
    fn test_tick_labels_checked_against_explicit_ticks() {
        let mut plot = CreatePlot::new();
        plot.set_xticks(vec![0.0, 1.0, 2.0]);
        assert!(matches!(
            plot.set_xticklabels(TickLabels::new(["a", "b"])),
            Err(EmcError::TickLabelMismatch { axis: 'x', labels: 2, ticks: 3 })
        ));
        assert!(plot.set_xticklabels(TickLabels::new(["a", "b", "c"])).is_ok());
    }

    #[test]
    fn test_colorbar_requires_series() {
        let mut plot = CreatePlot::new();
        plot.draw_data([LinePlot::new(vec![0.0, 1.0], vec![0.0, 1.0]).unwrap()]).unwrap();
        assert!(matches!(plot.add_colorbar(ColorbarSpec::default()), Err(EmcError::NoColorSeries)));

        let mut scatter = Scatter::new(vec![0.0, 1.0, 2.0], vec![1.0, 0.0, 2.0]).unwrap();
        scatter.density_scatter();
        let mut plot = CreatePlot::new();
        plot.draw_data([scatter]).unwrap();
        assert!(plot.add_colorbar(ColorbarSpec::default()).is_ok());
    }

    #[test]
    fn test_resolve_ticks_filters_and_labels() {
        let axis = Axis::new(Scale::Linear, 0.0, 10.0);
        let ticks = resolve_ticks('x', &axis, &Some(vec![-5.0, 0.0, 5.0, 10.0]), &None, None).unwrap();
        assert_eq!(ticks.values, vec![0.0, 5.0, 10.0]);
        assert_eq!(ticks.labels, vec!["0", "5", "10"]);

        let cats = Some((vec![1.0, 2.0], vec!["a".to_string(), "b".to_string()]));
        let ticks = resolve_ticks('x', &axis, &None, &None, cats).unwrap();
        assert_eq!(ticks.labels, vec!["a", "b"]);

        let bad = Some(TickLabels::new(["only"]));
        assert!(resolve_ticks('y', &axis, &None, &bad, None).is_err());
    }

    #[test]
    fn test_margins_keep_default_fractions() {
        let cell = PixelRect::new(0.0, 0.0, 800.0, 600.0);
        let m = Margins {
            left: 10.0,
            right: 10.0,
            top: 10.0,
            bottom: 10.0,
        };
        let loose = m.apply(cell, false).unwrap();
        assert_eq!((loose.x, loose.y), (100.0, 72.0));
        let tight = m.apply(cell, true).unwrap();
        assert_eq!((tight.x, tight.width), (10.0, 780.0));
        assert!(m.apply(PixelRect::new(0.0, 0.0, 15.0, 15.0), true).is_err());
    }

    #[test]
    fn test_render_bar_plot_with_categories() {
        let fonts = FontBook::empty();
        let mut bars = BarPlot::new(vec![0.0, 1.0, 2.0], vec![3.0, 1.0, 2.0]).unwrap();
        bars.style.tick_label = Some(vec!["a".into(), "b".into(), "c".into()]);
        let mut plot = CreatePlot::new();
        plot.draw_data([bars]).unwrap();
        plot.add_grid(Grid::default());
        let mut canvas = Canvas::new(200, 150, Color::WHITE).unwrap();
        plot.render(&mut canvas, PixelRect::new(0.0, 0.0, 200.0, 150.0), &ctx(&fonts))
            .unwrap();
        assert!(canvas.to_rgba().chunks(4).any(|px| px != [255, 255, 255, 255]));
    }

    #[test]
    fn test_map_settings_validate_eagerly() {
        assert!(CreatePlot::map("conus", "lambert").unwrap().is_map());
        assert!(matches!(CreatePlot::map("mars", "plcarr"), Err(EmcError::InvalidChoice { .. })));
        assert!(CreatePlot::map("global", "mercator").is_err());
        let mut plot = CreatePlot::new();
        assert!(plot.add_map_features(&["coastline", "coastline", "ocean"]).is_ok());
        assert_eq!(plot.map_features.len(), 2);
    }
}
