//! Map axes and the layers drawn on them.

use rayon::prelude::*;
use renderer::contour::{auto_levels, connect_segments, march_squares, render_contours, Contour, ContourStyle, Point};
use renderer::{Canvas, Color, Colormap, HAlign, Normalize, PixelRect, StrokeStyle, TextStyle, VAlign};
use tracing::debug;

use emc_common::{EmcError, EmcResult};
use projection::{Domain, MapProjection, Projection, EARTH_RADIUS};

use crate::axes::{format_lat, format_lon};
use crate::cartesian::DrawOutput;
use crate::colorbar::ColorSeries;
use crate::context::{break_jumps, color, RenderContext};
use crate::layers::PlotLayer;
use crate::legend::{Glyph, LegendEntry};
use crate::map_layers::{Field2D, MapContour, MapFilledContour, MapGridded, MapScatter};

const DISK_SEGMENTS: usize = 180;
const FILL_REFINE: usize = 4;
const CONTOUR_TARGET: usize = 8;

/// A projection and domain fitted into a pixel rectangle.
#[derive(Debug, Clone)]
pub struct MapAxes {
    pub proj: MapProjection,
    pub domain: Domain,
    /// Projected `(xmin, xmax, ymin, ymax)` in meters
    pub bounds: (f64, f64, f64, f64),
    pub rect: PixelRect,
    /// Whole hemisphere drawn as a disk
    pub disk: bool,
}

impl MapAxes {
    /// Fit the domain into `area` keeping equal aspect.
    pub fn new(proj: MapProjection, domain: Domain, area: PixelRect) -> EmcResult<Self> {
        let disk = proj.is_polar() && domain.is_global();
        let bounds = if disk {
            (-EARTH_RADIUS, EARTH_RADIUS, -EARTH_RADIUS, EARTH_RADIUS)
        } else {
            proj.projected_bounds(&domain.extent)?
        };
        let (w, h) = (bounds.1 - bounds.0, bounds.3 - bounds.2);
        if w <= 0.0 || h <= 0.0 {
            return Err(EmcError::Projection(format!(
                "domain {} has an empty projected extent in {}",
                domain.name, proj
            )));
        }
        let aspect = (h / w) as f32;
        let rect = if area.height / area.width.max(1.0) > aspect {
            let height = area.width * aspect;
            PixelRect::new(area.x, area.y + (area.height - height) / 2.0, area.width, height)
        } else {
            let width = area.height / aspect;
            PixelRect::new(area.x + (area.width - width) / 2.0, area.y, width, area.height)
        };
        debug!(projection = %proj, domain = %domain.name, ?rect, "Fitted map axes");
        Ok(Self {
            proj,
            domain,
            bounds,
            rect,
            disk,
        })
    }

    /// Projected meters to pixels.
    pub fn xy_to_pixel(&self, x: f64, y: f64) -> (f32, f32) {
        let (xmin, xmax, ymin, ymax) = self.bounds;
        let fx = (x - xmin) / (xmax - xmin);
        let fy = (y - ymin) / (ymax - ymin);
        (
            self.rect.x + (fx as f32) * self.rect.width,
            self.rect.bottom() - (fy as f32) * self.rect.height,
        )
    }

    pub fn project(&self, lon: f64, lat: f64) -> Option<(f32, f32)> {
        let (x, y) = self.proj.forward(lon, lat)?;
        Some(self.xy_to_pixel(x, y))
    }

    /// Boundary of the visible map.
    pub fn outline(&self) -> Vec<(f32, f32)> {
        if self.disk {
            let (cx, cy) = (self.rect.x + self.rect.width / 2.0, self.rect.y + self.rect.height / 2.0);
            let r = self.rect.width.min(self.rect.height) / 2.0;
            (0..DISK_SEGMENTS)
                .map(|i| {
                    let a = i as f32 / DISK_SEGMENTS as f32 * std::f32::consts::TAU;
                    (cx + r * a.cos(), cy + r * a.sin())
                })
                .collect()
        } else {
            let r = self.rect;
            vec![(r.x, r.y), (r.right(), r.y), (r.right(), r.bottom()), (r.x, r.bottom())]
        }
    }

    pub fn draw_frame(&self, canvas: &mut Canvas, ctx: &RenderContext<'_>) {
        let stroke = ctx.stroke(Color::BLACK, 0.8);
        if self.disk {
            let mut ring = self.outline();
            if let Some(&first) = ring.first() {
                ring.push(first);
            }
            canvas.stroke_polyline(&ring, &stroke);
        } else {
            canvas.stroke_rect(self.rect, &stroke);
        }
    }

    fn line_through(&self, pts: impl Iterator<Item = (f64, f64)>) -> Vec<(f32, f32)> {
        let pixels: Vec<(f32, f32)> = pts
            .map(|(lon, lat)| self.project(lon, lat).unwrap_or((f32::NAN, f32::NAN)))
            .collect();
        if self.proj.is_cylindrical() {
            break_jumps(&pixels, self.rect.width / 2.0)
        } else {
            pixels
        }
    }

    /// Meridians and parallels at the domain's tick locations.
    pub fn draw_gridlines(&self, canvas: &mut Canvas, stroke: &StrokeStyle) {
        const SAMPLES: usize = 90;
        let e = &self.domain.extent;
        let (lon0, lon1, lat0, lat1) = if self.disk {
            (-180.0, 180.0, -90.0, 90.0)
        } else {
            (e.lon_min, e.lon_max, e.lat_min, e.lat_max)
        };
        let step = |a: f64, b: f64, i: usize| a + (b - a) * i as f64 / SAMPLES as f64;
        for &lon in &self.domain.xticks {
            let line = self.line_through((0..=SAMPLES).map(|i| (lon, step(lat0, lat1, i))));
            canvas.stroke_polyline(&line, stroke);
        }
        for &lat in &self.domain.yticks {
            let line = self.line_through((0..=SAMPLES).map(|i| (step(lon0, lon1, i), lat)));
            canvas.stroke_polyline(&line, stroke);
        }
    }

    /// Longitude and latitude tick labels, only on cylindrical projections.
    pub fn tick_labels(&self) -> (Vec<(f32, String)>, Vec<(f32, String)>) {
        if !self.proj.is_cylindrical() {
            return (vec![], vec![]);
        }
        let e = &self.domain.extent;
        let lons = self
            .domain
            .xticks
            .iter()
            .filter(|&&lon| lon >= e.lon_min - 1e-9 && lon <= e.lon_max + 1e-9)
            .map(|&lon| {
                let x = EARTH_RADIUS * (lon - self.proj.cenlon).to_radians();
                (self.xy_to_pixel(x, self.bounds.2).0, format_lon(lon))
            })
            .collect();
        let lats = self
            .domain
            .yticks
            .iter()
            .filter(|&&lat| lat >= e.lat_min - 1e-9 && lat <= e.lat_max + 1e-9)
            .filter_map(|&lat| {
                let (_, y) = self.proj.forward(self.proj.cenlon, lat)?;
                Some((self.xy_to_pixel(self.bounds.0, y).1, format_lat(lat)))
            })
            .collect();
        (lons, lats)
    }

    pub fn draw_tick_labels(&self, canvas: &mut Canvas, ctx: &RenderContext<'_>, size_pt: f32) {
        let (lons, lats) = self.tick_labels();
        let size = ctx.pt(size_pt);
        let tick = ctx.pt(3.5);
        let stroke = ctx.stroke(Color::BLACK, 0.8);
        let style = TextStyle::new(size, Color::BLACK);
        for (x, label) in lons {
            canvas.line(x, self.rect.bottom(), x, self.rect.bottom() + tick, &stroke);
            let s = style.align(HAlign::Center, VAlign::Top);
            ctx.fonts.draw(canvas, &label, x, self.rect.bottom() + tick + ctx.pt(3.5), &s);
        }
        for (y, label) in lats {
            canvas.line(self.rect.x - tick, y, self.rect.x, y, &stroke);
            let s = style.align(HAlign::Right, VAlign::Center);
            ctx.fonts.draw(canvas, &label, self.rect.x - tick - ctx.pt(3.5), y, &s);
        }
    }
}

/// Labels the map would draw for a domain, used to size margins.
pub fn tick_label_text(proj: &MapProjection, domain: &Domain) -> (Vec<String>, Vec<String>) {
    if !proj.is_cylindrical() {
        return (vec![], vec![]);
    }
    (
        domain.xticks.iter().map(|&l| format_lon(l)).collect(),
        domain.yticks.iter().map(|&l| format_lat(l)).collect(),
    )
}

fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    lo.is_finite().then_some((lo, hi))
}

fn contour_levels(levels: &Option<Vec<f64>>, data: &Field2D) -> Vec<f64> {
    match levels {
        Some(l) => l.clone(),
        None => data
            .finite_range()
            .map(|(lo, hi)| auto_levels(lo, hi, CONTOUR_TARGET))
            .unwrap_or_default(),
    }
}

/// Value-to-color mapping of a map layer, whether or not it has a colorbar.
fn layer_series(layer: &PlotLayer) -> EmcResult<Option<ColorSeries>> {
    Ok(match layer {
        PlotLayer::MapScatter(l) => match &l.data {
            Some(d) => Some(ColorSeries::continuous(
                Colormap::named(&l.cmap)?,
                Normalize::autoscale(d, l.vmin, l.vmax),
                l.alpha,
            )),
            None => None,
        },
        PlotLayer::MapGridded(l) => Some(ColorSeries::continuous(
            Colormap::named(&l.cmap)?,
            Normalize::autoscale(&l.data.values, l.vmin, l.vmax),
            l.alpha,
        )),
        PlotLayer::MapFilledContour(l) => Some(ColorSeries::banded(
            Colormap::named(&l.cmap)?,
            contour_levels(&l.levels, &l.data),
            l.alpha,
        )),
        PlotLayer::MapContour(l) => {
            let c = color(&l.colors, None)?;
            Some(ColorSeries::banded(
                Colormap::from_colors(&l.colors, vec![c, c])?,
                contour_levels(&l.levels, &l.data),
                l.alpha,
            ))
        }
        _ => None,
    })
}

pub fn wants_colorbar(layer: &PlotLayer) -> bool {
    match layer {
        PlotLayer::MapScatter(l) => l.colorbar && l.data.is_some(),
        PlotLayer::MapGridded(l) => l.colorbar,
        PlotLayer::MapContour(l) => l.colorbar,
        PlotLayer::MapFilledContour(l) => l.colorbar,
        _ => false,
    }
}

/// Series shown by the colorbar: the last layer asking for one.
pub fn map_color_series(layers: &[PlotLayer]) -> EmcResult<Option<ColorSeries>> {
    match layers.iter().rev().find(|l| wants_colorbar(l)) {
        Some(layer) => layer_series(layer),
        None => Ok(None),
    }
}

/// Edges around cell centres: midpoints inside, extrapolated at the ends.
fn edges_1d(centres: &[f64]) -> Vec<f64> {
    match centres {
        [] => vec![],
        [c] => vec![c - 0.5, c + 0.5],
        _ => {
            let n = centres.len();
            let mut out = Vec::with_capacity(n + 1);
            out.push(1.5 * centres[0] - 0.5 * centres[1]);
            out.extend(centres.windows(2).map(|w| 0.5 * (w[0] + w[1])));
            out.push(1.5 * centres[n - 1] - 0.5 * centres[n - 2]);
            out
        }
    }
}

/// Corner mesh of shape `(nrows + 1, ncols + 1)` from a centre mesh.
pub fn cell_corners(field: &Field2D) -> Field2D {
    let (nr, nc) = (field.nrows, field.ncols);
    let row_edges: Vec<Vec<f64>> = (0..nr)
        .map(|r| edges_1d(&field.values[r * nc..(r + 1) * nc]))
        .collect();
    let mut values = vec![0.0; (nr + 1) * (nc + 1)];
    for c in 0..=nc {
        let column: Vec<f64> = row_edges.iter().map(|row| row[c]).collect();
        for (r, v) in edges_1d(&column).into_iter().enumerate() {
            values[r * (nc + 1) + c] = v;
        }
    }
    Field2D {
        nrows: nr + 1,
        ncols: nc + 1,
        values,
    }
}

/// Bilinear sample at fractional `(col, row)`, clamped to the mesh.
fn sample(field: &Field2D, x: f64, y: f64) -> f64 {
    let x = x.clamp(0.0, (field.ncols - 1) as f64);
    let y = y.clamp(0.0, (field.nrows - 1) as f64);
    let (c0, r0) = (x.floor() as usize, y.floor() as usize);
    let (c1, r1) = ((c0 + 1).min(field.ncols - 1), (r0 + 1).min(field.nrows - 1));
    let (tx, ty) = (x - c0 as f64, y - r0 as f64);
    let top = field.get(r0, c0) * (1.0 - tx) + field.get(r0, c1) * tx;
    let bottom = field.get(r1, c0) * (1.0 - tx) + field.get(r1, c1) * tx;
    top * (1.0 - ty) + bottom * ty
}

fn too_wide(pts: &[(f32, f32)], limit: f32) -> bool {
    let (lo, hi) = pts
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| (lo.min(p.0), hi.max(p.0)));
    hi - lo > limit
}

type Cell = (Vec<(f32, f32)>, Color);

fn draw_gridded(canvas: &mut Canvas, map: &MapAxes, layer: &MapGridded, series: &ColorSeries) {
    let lat = cell_corners(&layer.latitude);
    let lon = cell_corners(&layer.longitude);
    let limit = map.rect.width / 2.0;
    let rows: Vec<Vec<Cell>> = (0..layer.data.nrows)
        .into_par_iter()
        .map(|r| {
            (0..layer.data.ncols)
                .filter_map(|c| {
                    let v = layer.data.get(r, c);
                    if !v.is_finite() {
                        return None;
                    }
                    let pts = [(r, c), (r, c + 1), (r + 1, c + 1), (r + 1, c)]
                        .iter()
                        .map(|&(i, j)| map.project(lon.get(i, j), lat.get(i, j)))
                        .collect::<Option<Vec<_>>>()?;
                    (!too_wide(&pts, limit)).then(|| (pts, series.color(v)))
                })
                .collect()
        })
        .collect();
    for (pts, c) in rows.iter().flatten() {
        canvas.fill_cell(pts, *c);
    }
}

fn draw_filled_contour(canvas: &mut Canvas, map: &MapAxes, layer: &MapFilledContour, series: &ColorSeries) {
    let (nr, nc) = (layer.data.nrows, layer.data.ncols);
    if nr < 2 || nc < 2 {
        return;
    }
    let limit = map.rect.width / 2.0;
    let step = 1.0 / FILL_REFINE as f64;
    let rows: Vec<Vec<Cell>> = (0..(nr - 1) * FILL_REFINE)
        .into_par_iter()
        .map(|sr| {
            let y0 = sr as f64 * step;
            (0..(nc - 1) * FILL_REFINE)
                .filter_map(|sc| {
                    let x0 = sc as f64 * step;
                    let v = sample(&layer.data, x0 + step / 2.0, y0 + step / 2.0);
                    if !v.is_finite() {
                        return None;
                    }
                    let c = series.color(v);
                    if c.is_transparent() {
                        return None;
                    }
                    let pts = [(x0, y0), (x0 + step, y0), (x0 + step, y0 + step), (x0, y0 + step)]
                        .iter()
                        .map(|&(x, y)| map.project(sample(&layer.longitude, x, y), sample(&layer.latitude, x, y)))
                        .collect::<Option<Vec<_>>>()?;
                    (!too_wide(&pts, limit)).then_some((pts, c))
                })
                .collect()
        })
        .collect();
    for (pts, c) in rows.iter().flatten() {
        canvas.fill_cell(pts, *c);
    }
}

/// Contours in pixel space, split where they cross a seam or leave the view.
fn project_contours(map: &MapAxes, layer: &MapContour, contours: Vec<Contour>) -> Vec<Contour> {
    let limit = map.rect.width / 2.0;
    contours
        .into_iter()
        .map(|contour| {
            let pixels: Vec<(f32, f32)> = contour
                .points
                .iter()
                .map(|p| {
                    let lon = sample(&layer.longitude, p.x, p.y);
                    let lat = sample(&layer.latitude, p.x, p.y);
                    map.project(lon, lat).unwrap_or((f32::NAN, f32::NAN))
                })
                .collect();
            let pixels = if map.proj.is_cylindrical() {
                break_jumps(&pixels, limit)
            } else {
                pixels
            };
            Contour {
                level: contour.level,
                points: pixels.iter().map(|&(x, y)| Point::new(x as f64, y as f64)).collect(),
                closed: contour.closed,
            }
        })
        .collect()
}

fn draw_contour(canvas: &mut Canvas, ctx: &RenderContext<'_>, map: &MapAxes, layer: &MapContour) -> EmcResult<()> {
    let levels = contour_levels(&layer.levels, &layer.data);
    let mut contours = Vec::new();
    for &level in &levels {
        let segments = march_squares(&layer.data.values, layer.data.ncols, layer.data.nrows, level);
        contours.extend(connect_segments(&segments, level));
    }
    debug!(levels = levels.len(), lines = contours.len(), "Contoured map field");
    let line_color = color(&layer.colors, layer.alpha)?;
    let style = ContourStyle {
        colors: vec![line_color],
        line: StrokeStyle {
            color: line_color,
            width: ctx.pt(layer.linewidths),
            style: layer.linestyles,
        },
        labels: layer.clabel,
        label_size: ctx.pt(10.0),
        label_spacing: ctx.pt(150.0),
    };
    let pixel_contours = project_contours(map, layer, contours);
    render_contours(canvas, &pixel_contours, &levels, &style, ctx.fonts, |p| {
        Some((p.x as f32, p.y as f32))
    });
    Ok(())
}

fn draw_scatter(
    canvas: &mut Canvas,
    ctx: &RenderContext<'_>,
    map: &MapAxes,
    layer: &MapScatter,
    series: Option<&ColorSeries>,
    out: &mut DrawOutput,
) -> EmcResult<()> {
    let diameter = ctx.marker_diameter(layer.markersize);
    let single = color(&layer.color, layer.alpha)?;
    let edge = match &layer.edgecolors {
        Some(name) => Some(ctx.stroke(color(name, layer.alpha)?, layer.linewidths)),
        None => None,
    };
    let colors = match (series, &layer.data) {
        (Some(s), Some(d)) => Some(s.colors(d)),
        _ => None,
    };
    for (i, (&lat, &lon)) in layer.latitude.iter().zip(&layer.longitude).enumerate() {
        let Some((px, py)) = map.project(lon, lat) else {
            continue;
        };
        let fill = colors.as_ref().map_or(single, |c| c[i]);
        if fill.is_transparent() {
            continue;
        }
        canvas.draw_marker(px, py, layer.marker, diameter, fill, edge.as_ref());
        out.points.push((px, py));
    }
    if let Some(label) = &layer.label {
        out.legend.push(LegendEntry::new(
            label.clone(),
            Glyph::Marker {
                marker: layer.marker,
                size: diameter.max(ctx.pt(4.0)),
                fill: single,
                edge,
            },
        ));
    }
    Ok(())
}

/// Draw map layers in order, clipped to the map.
pub fn draw_map_layers(
    canvas: &mut Canvas,
    ctx: &RenderContext<'_>,
    map: &MapAxes,
    layers: &[PlotLayer],
) -> EmcResult<DrawOutput> {
    let mut out = DrawOutput::default();
    canvas.set_clip(Some(map.rect));
    let result = layers.iter().try_for_each(|layer| {
        let series = layer_series(layer)?;
        match layer {
            PlotLayer::MapScatter(l) => draw_scatter(canvas, ctx, map, l, series.as_ref(), &mut out),
            PlotLayer::MapGridded(l) => {
                if let Some(s) = &series {
                    draw_gridded(canvas, map, l, s);
                }
                Ok(())
            }
            PlotLayer::MapFilledContour(l) => {
                if let Some(s) = &series {
                    draw_filled_contour(canvas, map, l, s);
                }
                Ok(())
            }
            PlotLayer::MapContour(l) => draw_contour(canvas, ctx, map, l),
            other => Err(EmcError::invalid_choice("plot type", other.plottype(), &PlotLayer::MAP_TYPES)),
        }
    });
    canvas.set_clip(None);
    result.map(|_| out)
}

/// Finite data range across map layers, for logging.
pub fn data_range(layers: &[PlotLayer]) -> Option<(f64, f64)> {
    let values: Vec<f64> = layers
        .iter()
        .flat_map(|l| match l {
            PlotLayer::MapScatter(m) => m.data.clone().unwrap_or_default(),
            PlotLayer::MapGridded(m) => m.data.values.clone(),
            PlotLayer::MapContour(m) => m.data.values.clone(),
            PlotLayer::MapFilledContour(m) => m.data.values.clone(),
            _ => vec![],
        })
        .collect();
    finite_range(&values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global_axes(name: &str) -> MapAxes {
        let proj = MapProjection::new(name, 0.0, 0.0).unwrap();
        MapAxes::new(proj, Domain::default(), PixelRect::new(0.0, 0.0, 400.0, 400.0)).unwrap()
    }

    #[test]
    fn test_global_plcarr_keeps_two_to_one() {
        let map = global_axes("plcarr");
        assert!((map.rect.width - 400.0).abs() < 1e-3);
        assert!((map.rect.height - 200.0).abs() < 1e-3);
        let (x, y) = map.project(0.0, 0.0).unwrap();
        assert!((x - 200.0).abs() < 1e-3 && (y - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_polar_global_is_disk_without_ticks() {
        let map = global_axes("npstere");
        assert!(map.disk);
        assert_eq!(map.outline().len(), DISK_SEGMENTS);
        let (lons, lats) = map.tick_labels();
        assert!(lons.is_empty() && lats.is_empty());
        assert!(map.project(0.0, -45.0).is_none());
    }

    #[test]
    fn test_cylindrical_tick_labels_at_edges() {
        let map = global_axes("plcarr");
        let (lons, lats) = map.tick_labels();
        assert_eq!(lons.first().map(|l| l.1.as_str()), Some("180°"));
        assert!((lons[0].0 - map.rect.x).abs() < 1e-3);
        assert!((lons.last().unwrap().0 - map.rect.right()).abs() < 1e-3);
        assert_eq!(lats.iter().find(|l| l.1 == "0°").map(|l| l.0.round()), Some(200.0));
    }

    #[test]
    fn test_cell_corners_extrapolate() {
        let f = Field2D::new(2, 3, vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0]).unwrap();
        let c = cell_corners(&f);
        assert_eq!(c.shape(), [3, 4]);
        assert_eq!(c.get(1, 0), 4.5);
        assert_eq!(c.get(0, 0), -5.5);
        assert_eq!(c.get(2, 3), 17.5);
        let single = cell_corners(&Field2D::new(1, 1, vec![3.0]).unwrap());
        assert_eq!(single.values, vec![2.0, 3.0, 3.0, 4.0]);
    }

    #[test]
    fn test_sample_bilinear() {
        let f = Field2D::new(2, 2, vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        assert_eq!(sample(&f, 0.5, 0.5), 1.5);
        assert_eq!(sample(&f, 5.0, -1.0), 1.0);
    }

    #[test]
    fn test_colorbar_series_selection() {
        let (lat, lon) = Field2D::meshgrid(&[0.0, 10.0], &[0.0, 10.0]);
        let data = Field2D::new(2, 2, vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        let contour = MapContour::new(lat.clone(), lon.clone(), data.clone()).unwrap();
        let layers: Vec<PlotLayer> = vec![contour.clone().into()];
        assert!(map_color_series(&layers).unwrap().is_none());

        let mut filled = MapFilledContour::new(lat, lon, data).unwrap();
        filled.levels = Some(vec![0.0, 1.5, 3.0]);
        let layers: Vec<PlotLayer> = vec![filled.into(), contour.into()];
        let series = map_color_series(&layers).unwrap().unwrap();
        assert_eq!(series.levels, Some(vec![0.0, 1.5, 3.0]));
        assert_eq!(data_range(&layers), Some((0.0, 3.0)));
    }
}
