//! Contour lines (isolines) using the marching squares algorithm.
//!
//! Contours are generated in fractional grid index space (`x` = column,
//! `y` = row). Callers map them to pixels with their own transform, which
//! lets the same lines be drawn on any map projection.

use std::collections::HashMap;

use tracing::debug;

use crate::canvas::{Canvas, StrokeStyle};
use crate::color::Color;
use crate::text::{FontBook, TextStyle};

/// A point in grid index space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A line segment between two points
#[derive(Debug, Clone, Copy)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

/// A complete contour line (polyline)
#[derive(Debug, Clone)]
pub struct Contour {
    pub level: f64,
    pub points: Vec<Point>,
    pub closed: bool,
}

/// Levels between `min_value` and `max_value` at multiples of `interval`.
pub fn generate_contour_levels(min_value: f64, max_value: f64, interval: f64) -> Vec<f64> {
    if interval <= 0.0 || max_value < min_value || !interval.is_finite() {
        return vec![];
    }
    let start = (min_value / interval).ceil() as i64;
    let stop = (max_value / interval).floor() as i64;
    (start..=stop).map(|k| k as f64 * interval).collect()
}

/// About `target` evenly spaced levels on a 1/2/2.5/5 x 10^k step.
pub fn auto_levels(min_value: f64, max_value: f64, target: usize) -> Vec<f64> {
    if !min_value.is_finite() || !max_value.is_finite() {
        return vec![];
    }
    if max_value <= min_value {
        return vec![min_value];
    }
    let step = nice_step((max_value - min_value) / target.max(1) as f64);
    let start = (min_value / step).floor() as i64;
    let stop = (max_value / step).ceil() as i64;
    (start..=stop).map(|k| k as f64 * step).collect()
}

/// Round a raw step up to 1, 2, 2.5, 5 or 10 times a power of ten.
pub fn nice_step(raw: f64) -> f64 {
    if raw <= 0.0 || !raw.is_finite() {
        return 1.0;
    }
    let mag = 10f64.powf(raw.log10().floor());
    let norm = raw / mag;
    let nice = [1.0, 2.0, 2.5, 5.0, 10.0]
        .into_iter()
        .find(|&n| norm <= n + 1e-9)
        .unwrap_or(10.0);
    nice * mag
}

/// Marching squares over a row-major grid for one level.
pub fn march_squares(data: &[f64], width: usize, height: usize, level: f64) -> Vec<Segment> {
    let mut segments = Vec::new();
    if width < 2 || height < 2 || data.len() != width * height {
        return segments;
    }

    for y in 0..(height - 1) {
        for x in 0..(width - 1) {
            let tl = data[y * width + x];
            let tr = data[y * width + x + 1];
            let bl = data[(y + 1) * width + x];
            let br = data[(y + 1) * width + x + 1];

            if tl.is_nan() || tr.is_nan() || bl.is_nan() || br.is_nan() {
                continue;
            }

            let mut cell_index = 0u8;
            if tl >= level {
                cell_index |= 1;
            }
            if tr >= level {
                cell_index |= 2;
            }
            if br >= level {
                cell_index |= 4;
            }
            if bl >= level {
                cell_index |= 8;
            }
            if cell_index == 0 || cell_index == 15 {
                continue;
            }

            let (fx, fy) = (x as f64, y as f64);
            let top = interpolate_edge((fx, fy), (fx + 1.0, fy), tl, tr, level);
            let right = interpolate_edge((fx + 1.0, fy), (fx + 1.0, fy + 1.0), tr, br, level);
            let bottom = interpolate_edge((fx, fy + 1.0), (fx + 1.0, fy + 1.0), bl, br, level);
            let left = interpolate_edge((fx, fy), (fx, fy + 1.0), tl, bl, level);
            let mut push = |start, end| segments.push(Segment { start, end });

            match cell_index {
                1 | 14 => push(left, top),
                2 | 13 => push(top, right),
                3 | 12 => push(left, right),
                4 | 11 => push(right, bottom),
                6 | 9 => push(top, bottom),
                7 | 8 => push(left, bottom),
                5 | 10 => {
                    // Saddle: resolve with the cell-centre average
                    let centre = (tl + tr + bl + br) / 4.0;
                    if (centre >= level) == (cell_index == 5) {
                        push(left, bottom);
                        push(top, right);
                    } else {
                        push(left, top);
                        push(right, bottom);
                    }
                }
                _ => {}
            }
        }
    }
    segments
}

/// Where `level` crosses the edge between two grid nodes.
fn interpolate_edge(p1: (f64, f64), p2: (f64, f64), val1: f64, val2: f64, level: f64) -> Point {
    if (val2 - val1).abs() < 1e-12 {
        return Point::new((p1.0 + p2.0) / 2.0, (p1.1 + p2.1) / 2.0);
    }
    let t = ((level - val1) / (val2 - val1)).clamp(0.0, 1.0);
    Point::new(p1.0 + t * (p2.0 - p1.0), p1.1 + t * (p2.1 - p1.1))
}

fn key(p: Point) -> (i64, i64) {
    ((p.x * 1e6).round() as i64, (p.y * 1e6).round() as i64)
}

/// Join unordered segments into polylines by matching shared endpoints.
pub fn connect_segments(segments: &[Segment], level: f64) -> Vec<Contour> {
    let mut by_end: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (i, s) in segments.iter().enumerate() {
        by_end.entry(key(s.start)).or_default().push(i);
        by_end.entry(key(s.end)).or_default().push(i);
    }

    let mut used = vec![false; segments.len()];
    let mut contours = Vec::new();

    let next_from = |p: Point, used: &mut Vec<bool>| -> Option<Point> {
        let candidates = by_end.get(&key(p))?;
        let &i = candidates.iter().find(|&&i| !used[i])?;
        used[i] = true;
        let s = segments[i];
        Some(if key(s.start) == key(p) { s.end } else { s.start })
    };

    for start_idx in 0..segments.len() {
        if used[start_idx] {
            continue;
        }
        used[start_idx] = true;
        let seg = segments[start_idx];

        let mut forward = vec![seg.start, seg.end];
        while let Some(p) = forward.last().copied().and_then(|p| next_from(p, &mut used)) {
            forward.push(p);
        }
        let mut backward = Vec::new();
        let mut head = seg.start;
        while let Some(p) = next_from(head, &mut used) {
            backward.push(p);
            head = p;
        }
        backward.reverse();
        backward.extend(forward);
        let points = backward;

        let closed = points.len() > 2 && key(points[0]) == key(points[points.len() - 1]);
        contours.push(Contour {
            level,
            points,
            closed,
        });
    }
    contours
}

/// Apply Chaikin's corner cutting algorithm for smoothing
pub fn smooth_contour(contour: &Contour, iterations: u32) -> Contour {
    if iterations == 0 || contour.points.len() < 3 {
        return contour.clone();
    }
    let mut points = contour.points.clone();
    for _ in 0..iterations {
        let n = points.len();
        let pairs = if contour.closed { n } else { n - 1 };
        let mut next = Vec::with_capacity(pairs * 2 + 2);
        if !contour.closed {
            next.push(points[0]);
        }
        for i in 0..pairs {
            let p1 = points[i];
            let p2 = points[(i + 1) % n];
            next.push(Point::new(0.75 * p1.x + 0.25 * p2.x, 0.75 * p1.y + 0.25 * p2.y));
            next.push(Point::new(0.25 * p1.x + 0.75 * p2.x, 0.25 * p1.y + 0.75 * p2.y));
        }
        if !contour.closed {
            next.push(points[n - 1]);
        }
        points = next;
    }
    Contour {
        level: contour.level,
        points,
        closed: contour.closed,
    }
}

/// Contours for every level.
pub fn generate_all_contours(
    data: &[f64],
    width: usize,
    height: usize,
    levels: &[f64],
    smoothing_passes: u32,
) -> Vec<Contour> {
    let mut all = Vec::new();
    for &level in levels {
        let segments = march_squares(data, width, height, level);
        all.extend(
            connect_segments(&segments, level)
                .iter()
                .map(|c| smooth_contour(c, smoothing_passes)),
        );
    }
    debug!(
        levels = levels.len(),
        contours = all.len(),
        points = all.iter().map(|c| c.points.len()).sum::<usize>(),
        "Generated contours"
    );
    all
}

/// Styling for stroked contour lines.
#[derive(Debug, Clone)]
pub struct ContourStyle {
    /// One color per level, cycled when shorter than the level list
    pub colors: Vec<Color>,
    pub line: StrokeStyle,
    pub labels: bool,
    pub label_size: f32,
    /// Minimum spacing between labels along a line, in pixels
    pub label_spacing: f32,
}

impl Default for ContourStyle {
    fn default() -> Self {
        Self {
            colors: vec![Color::BLACK],
            line: StrokeStyle::solid(Color::BLACK, 1.5),
            labels: false,
            label_size: 10.0,
            label_spacing: 150.0,
        }
    }
}

/// Label text for a level: integers without decimals.
pub fn format_level(level: f64) -> String {
    if (level - level.round()).abs() < 1e-9 {
        format!("{:.0}", level)
    } else if level.abs() >= 0.1 {
        format!("{:.1}", level)
    } else {
        format!("{:.3}", level)
    }
}

/// Stroke contours onto a canvas. `to_pixel` maps grid index space to pixels
/// and returns `None` for points that cannot be shown.
pub fn render_contours<F>(
    canvas: &mut Canvas,
    contours: &[Contour],
    levels: &[f64],
    style: &ContourStyle,
    fonts: &FontBook,
    to_pixel: F,
) where
    F: Fn(Point) -> Option<(f32, f32)>,
{
    let mut placed: Vec<(f32, f32)> = Vec::new();
    for contour in contours {
        let level_idx = levels
            .iter()
            .position(|l| (l - contour.level).abs() < 1e-12)
            .unwrap_or(0);
        let color = if style.colors.is_empty() {
            style.line.color
        } else {
            style.colors[level_idx % style.colors.len()]
        };
        let stroke = StrokeStyle { color, ..style.line };

        let pixels: Vec<(f32, f32)> = contour
            .points
            .iter()
            .map(|&p| to_pixel(p).unwrap_or((f32::NAN, f32::NAN)))
            .collect();
        canvas.stroke_polyline(&pixels, &stroke);

        if style.labels {
            let text = format_level(contour.level);
            let text_style = TextStyle {
                background: Some(Color::WHITE),
                ..TextStyle::new(style.label_size, color)
            };
            for (x, y) in label_positions(&pixels, style, &mut placed) {
                fonts.draw(canvas, &text, x, y, &text_style);
            }
        }
    }
}

/// Evenly spaced label anchors along a pixel polyline, skipping anchors
/// too close to labels already placed.
fn label_positions(
    pixels: &[(f32, f32)],
    style: &ContourStyle,
    placed: &mut Vec<(f32, f32)>,
) -> Vec<(f32, f32)> {
    let mut lengths = Vec::with_capacity(pixels.len());
    let mut total = 0.0f32;
    lengths.push(0.0);
    for w in pixels.windows(2) {
        let d = ((w[1].0 - w[0].0).powi(2) + (w[1].1 - w[0].1).powi(2)).sqrt();
        total += if d.is_finite() { d } else { 0.0 };
        lengths.push(total);
    }
    if total < style.label_spacing * 0.5 {
        return vec![];
    }

    let count = ((total / style.label_spacing).floor() as usize).max(1);
    let spacing = total / (count as f32 + 1.0);
    let min_distance = style.label_size * 4.0;
    let mut out = Vec::new();

    for k in 1..=count {
        let target = spacing * k as f32;
        let Some(i) = lengths.windows(2).position(|w| w[0] <= target && target <= w[1]) else {
            continue;
        };
        let (p1, p2) = (pixels[i], pixels[i + 1]);
        let seg = lengths[i + 1] - lengths[i];
        if seg <= 0.0 {
            continue;
        }
        let t = (target - lengths[i]) / seg;
        let pos = (p1.0 + t * (p2.0 - p1.0), p1.1 + t * (p2.1 - p1.1));
        if !pos.0.is_finite() || !pos.1.is_finite() {
            continue;
        }
        let crowded = placed
            .iter()
            .any(|q| (q.0 - pos.0).powi(2) + (q.1 - pos.1).powi(2) < min_distance * min_distance);
        if !crowded {
            placed.push(pos);
            out.push(pos);
        }
    }
    out
}
