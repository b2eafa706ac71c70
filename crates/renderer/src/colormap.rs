//! Named colormaps, normalization and gridded rasterisation.

use image::RgbaImage;
use rayon::prelude::*;

use crate::color::{hex_to_rgba, interpolate_color, Color};
use crate::error::{RenderError, RenderResult};

/// Anchor colors, evenly spaced over `[0, 1]`.
const COLORMAPS: &[(&str, &[&str])] = &[
    ("viridis", &["#440154", "#482475", "#414487", "#355f8d", "#2a788e", "#21918c", "#22a884", "#44bf70", "#7ad151", "#bddf26", "#fde725"]),
    ("plasma", &["#0d0887", "#41049d", "#6a00a8", "#8f0da4", "#b12a90", "#cc4778", "#e16462", "#f2844b", "#fca636", "#fcce25", "#f0f921"]),
    ("magma", &["#000004", "#140e36", "#3b0f70", "#641a80", "#8c2981", "#b73779", "#de4968", "#f7705c", "#fe9f6d", "#fecf92", "#fcfdbf"]),
    ("coolwarm", &["#3b4cc0", "#6282ea", "#8db0fe", "#b8d0f9", "#dddcdc", "#f5c4ad", "#f49a7b", "#de604d", "#b40426"]),
    ("bwr", &["#0000ff", "#ffffff", "#ff0000"]),
    ("RdBu", &["#67001f", "#b2182b", "#d6604d", "#f4a582", "#fddbc7", "#f7f7f7", "#d1e5f0", "#92c5de", "#4393c3", "#2166ac", "#053061"]),
    ("rainbow", &["#8000ff", "#4062fa", "#00b5eb", "#40ecd4", "#80ffb4", "#c0eb8d", "#ffb360", "#ff6231", "#ff0000"]),
    ("jet", &["#00007f", "#0000ff", "#007fff", "#00ffff", "#7fff7f", "#ffff00", "#ff7f00", "#ff0000", "#7f0000"]),
    ("YlGnBu", &["#ffffd9", "#edf8b1", "#c7e9b4", "#7fcdbb", "#41b6c4", "#1d91c0", "#225ea8", "#253494", "#081d58"]),
    ("PuOr", &["#7f3b08", "#b35806", "#e08214", "#fdb863", "#fee0b6", "#f7f7f7", "#d8daeb", "#b2abd2", "#8073ac", "#542788", "#2d004b"]),
    ("Blues", &["#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6", "#4292c6", "#2171b5", "#08519c", "#08306b"]),
    ("Reds", &["#fff5f0", "#fee0d2", "#fcbba1", "#fc9272", "#fb6a4a", "#ef3b2c", "#cb181d", "#a50f15", "#67000d"]),
    ("Greens", &["#f7fcf5", "#e5f5e0", "#c7e9c0", "#a1d99b", "#74c476", "#41ab5d", "#238b45", "#006d2c", "#00441b"]),
    ("gist_earth", &["#000000", "#173a7a", "#2d6f88", "#3a8a6e", "#4e9a4b", "#8aaa55", "#b8b060", "#c9a77a", "#d9b8a6", "#fdfbfb"]),
    ("nipy_spectral", &["#000000", "#770088", "#0000dd", "#0099dd", "#00aa88", "#00bb00", "#00ff00", "#ccee00", "#ffbb00", "#ee0000", "#cccccc"]),
    ("gray", &["#000000", "#ffffff"]),
    ("binary", &["#ffffff", "#000000"]),
];

/// Names accepted by [`Colormap::named`], without `_r` variants.
pub fn colormap_names() -> Vec<&'static str> {
    COLORMAPS.iter().map(|(n, _)| *n).collect()
}

/// A continuous colormap built from evenly spaced anchors.
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    pub name: String,
    stops: Vec<Color>,
    /// Color for values below vmin when extended; defaults to the first stop
    pub under: Option<Color>,
    pub over: Option<Color>,
    /// Color for NaN, transparent by default
    pub bad: Color,
}

impl Colormap {
    /// Look up a colormap by name. A `_r` suffix reverses it.
    pub fn named(name: &str) -> RenderResult<Self> {
        let (base, reversed) = match name.strip_suffix("_r") {
            Some(b) => (b, true),
            None => (name, false),
        };
        let anchors = COLORMAPS
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(base))
            .map(|(_, a)| *a)
            .ok_or_else(|| RenderError::UnknownColormap {
                name: name.to_string(),
                choices: colormap_names().into_iter().map(String::from).collect(),
            })?;

        let mut stops: Vec<Color> = anchors.iter().filter_map(|h| hex_to_rgba(h)).collect();
        if reversed {
            stops.reverse();
        }
        Ok(Self {
            name: name.to_string(),
            stops,
            under: None,
            over: None,
            bad: Color::TRANSPARENT,
        })
    }

    /// Colormap from explicit colors, evenly spaced.
    pub fn from_colors(name: &str, stops: Vec<Color>) -> RenderResult<Self> {
        if stops.is_empty() {
            return Err(RenderError::InvalidColor(format!("colormap {} has no colors", name)));
        }
        Ok(Self {
            name: name.to_string(),
            stops,
            under: None,
            over: None,
            bad: Color::TRANSPARENT,
        })
    }

    pub fn reversed(&self) -> Self {
        let mut out = self.clone();
        out.stops.reverse();
        out.name = match self.name.strip_suffix("_r") {
            Some(b) => b.to_string(),
            None => format!("{}_r", self.name),
        };
        out
    }

    /// Color at a normalized position in `[0, 1]`.
    pub fn sample(&self, t: f32) -> Color {
        if t.is_nan() {
            return self.bad;
        }
        if t < 0.0 {
            if let Some(c) = self.under {
                return c;
            }
        }
        if t > 1.0 {
            if let Some(c) = self.over {
                return c;
            }
        }
        let t = t.clamp(0.0, 1.0);
        if self.stops.len() == 1 {
            return self.stops[0];
        }
        let scaled = t * (self.stops.len() - 1) as f32;
        let i = (scaled.floor() as usize).min(self.stops.len() - 2);
        interpolate_color(self.stops[i], self.stops[i + 1], scaled - i as f32)
    }

    /// `n` colors evenly sampled at band centres, for discrete levels.
    pub fn discrete(&self, n: usize) -> Vec<Color> {
        if n == 1 {
            return vec![self.sample(0.5)];
        }
        (0..n)
            .map(|i| self.sample(i as f32 / (n - 1) as f32))
            .collect()
    }
}

/// Maps data values onto `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalize {
    pub vmin: f64,
    pub vmax: f64,
    pub log: bool,
}

impl Normalize {
    pub fn new(vmin: f64, vmax: f64) -> Self {
        Self {
            vmin,
            vmax,
            log: false,
        }
    }

    /// Range of the finite values, with optional overrides.
    pub fn autoscale(values: &[f64], vmin: Option<f64>, vmax: Option<f64>) -> Self {
        let (lo, hi) = values
            .iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let (lo, hi) = if lo.is_finite() { (lo, hi) } else { (0.0, 1.0) };
        Self::new(vmin.unwrap_or(lo), vmax.unwrap_or(hi))
    }

    pub fn apply(&self, value: f64) -> f32 {
        if !value.is_finite() {
            return f32::NAN;
        }
        let (v, lo, hi) = if self.log {
            if value <= 0.0 || self.vmin <= 0.0 {
                return f32::NAN;
            }
            (value.log10(), self.vmin.log10(), self.vmax.log10())
        } else {
            (value, self.vmin, self.vmax)
        };
        let range = hi - lo;
        if range.abs() < f64::EPSILON {
            return 0.5;
        }
        ((v - lo) / range) as f32
    }

    pub fn inverse(&self, t: f64) -> f64 {
        if self.log {
            10f64.powf(self.vmin.log10() + t * (self.vmax.log10() - self.vmin.log10()))
        } else {
            self.vmin + t * (self.vmax - self.vmin)
        }
    }
}

/// Index of the band `levels[i] <= value < levels[i + 1]`.
///
/// The top level is inclusive. Values outside the levels give `None`.
pub fn band_index(value: f64, levels: &[f64]) -> Option<usize> {
    if levels.len() < 2 || !value.is_finite() {
        return None;
    }
    let last = levels.len() - 1;
    if value < levels[0] || value > levels[last] {
        return None;
    }
    if value == levels[last] {
        return Some(last - 1);
    }
    levels.windows(2).position(|w| value >= w[0] && value < w[1])
}

/// Render grid data as an RGBA image, one pixel per cell.
///
/// Rows are processed in parallel; NaN cells take the colormap's bad color.
pub fn render_grid(data: &[f64], width: usize, height: usize, norm: &Normalize, cmap: &Colormap) -> RgbaImage {
    let mut pixels = vec![0u8; width * height * 4];
    pixels
        .par_chunks_mut(width.max(1) * 4)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..width {
                let value = data.get(y * width + x).copied().unwrap_or(f64::NAN);
                let c = cmap.sample(norm.apply(value));
                row[x * 4..x * 4 + 4].copy_from_slice(&[c.r, c.g, c.b, c.a]);
            }
        });
    RgbaImage::from_raw(width as u32, height as u32, pixels)
        .unwrap_or_else(|| RgbaImage::new(width as u32, height as u32))
}

/// Resample grid data to a different resolution using bilinear interpolation.
///
/// NaN corners propagate to the interpolated value.
pub fn resample_grid(
    data: &[f64],
    src_width: usize,
    src_height: usize,
    dst_width: usize,
    dst_height: usize,
) -> Vec<f64> {
    if src_width == dst_width && src_height == dst_height {
        return data.to_vec();
    }
    if src_width < 2 || src_height < 2 || dst_width < 2 || dst_height < 2 {
        return vec![f64::NAN; dst_width * dst_height];
    }

    let x_ratio = (src_width - 1) as f64 / (dst_width - 1) as f64;
    let y_ratio = (src_height - 1) as f64 / (dst_height - 1) as f64;
    let at = |x: usize, y: usize| data.get(y * src_width + x).copied().unwrap_or(f64::NAN);

    let mut output = Vec::with_capacity(dst_width * dst_height);
    for y in 0..dst_height {
        let src_y = y as f64 * y_ratio;
        let y1 = (src_y.floor() as usize).min(src_height - 1);
        let y2 = (y1 + 1).min(src_height - 1);
        let dy = src_y - y1 as f64;
        for x in 0..dst_width {
            let src_x = x as f64 * x_ratio;
            let x1 = (src_x.floor() as usize).min(src_width - 1);
            let x2 = (x1 + 1).min(src_width - 1);
            let dx = src_x - x1 as f64;

            let v1 = at(x1, y1) * (1.0 - dx) + at(x2, y1) * dx;
            let v2 = at(x1, y2) * (1.0 - dx) + at(x2, y2) * dx;
            output.push(v1 * (1.0 - dy) + v2 * dy);
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_and_reversed() {
        let v = Colormap::named("viridis").unwrap();
        let r = Colormap::named("viridis_r").unwrap();
        assert_eq!(v.sample(0.0), r.sample(1.0));
        assert_eq!(v.sample(0.0), Color::rgb(0x44, 0x01, 0x54));
        assert_eq!(v.reversed().name, "viridis_r");
        assert_eq!(r.reversed().name, "viridis");
    }

    #[test]
    fn test_unknown_colormap() {
        let err = Colormap::named("notamap").unwrap_err().to_string();
        assert!(err.contains("notamap is not a valid colormap"));
        assert!(err.contains("viridis | plasma"));
    }

    #[test]
    fn test_nan_uses_bad_color() {
        let v = Colormap::named("gray").unwrap();
        assert_eq!(v.sample(f32::NAN), Color::TRANSPARENT);
        assert_eq!(v.sample(0.5), Color::rgb(128, 128, 128));
    }

    #[test]
    fn test_normalize() {
        let n = Normalize::new(0.0, 10.0);
        assert_eq!(n.apply(5.0), 0.5);
        assert!(n.apply(f64::NAN).is_nan());
        let log = Normalize { vmin: 1.0, vmax: 100.0, log: true };
        assert!((log.apply(10.0) - 0.5).abs() < 1e-6);
        assert!((log.inverse(0.5) - 10.0).abs() < 1e-9);
        let auto = Normalize::autoscale(&[3.0, f64::NAN, -1.0], None, Some(9.0));
        assert_eq!((auto.vmin, auto.vmax), (-1.0, 9.0));
    }

    #[test]
    fn test_band_index() {
        let levels = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(band_index(0.5, &levels), Some(0));
        assert_eq!(band_index(2.0, &levels), Some(2));
        assert_eq!(band_index(3.0, &levels), Some(2));
        assert_eq!(band_index(-0.1, &levels), None);
        assert_eq!(band_index(f64::NAN, &levels), None);
    }

    #[test]
    fn test_resample_grid_corners() {
        let data = [0.0, 1.0, 2.0, 3.0];
        let out = resample_grid(&data, 2, 2, 3, 3);
        assert_eq!(out.len(), 9);
        assert_eq!(out[0], 0.0);
        assert_eq!(out[8], 3.0);
        assert!((out[4] - 1.5).abs() < 1e-12);
    }
}
