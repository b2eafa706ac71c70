//! Axis scales, limits and tick placement for cartesian plots.

use std::str::FromStr;

use emc_common::{EmcError, EmcResult};
use renderer::contour::nice_step;
use renderer::PixelRect;

/// Linear threshold of the symmetric log scale.
pub const SYMLOG_LINTHRESH: f64 = 2.0;

/// Fraction of the data span added on each side when autoscaling.
pub const AUTO_MARGIN: f64 = 0.05;

const MAX_TICKS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scale {
    #[default]
    Linear,
    Log,
    Symlog,
    Logit,
}

impl Scale {
    pub const NAMES: [&'static str; 4] = ["log", "linear", "symlog", "logit"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scale::Linear => "linear",
            Scale::Log => "log",
            Scale::Symlog => "symlog",
            Scale::Logit => "logit",
        }
    }

    /// Map a data value into the scale's linear space. `None` outside the
    /// scale's domain.
    pub fn transform(&self, v: f64) -> Option<f64> {
        if !v.is_finite() {
            return None;
        }
        match self {
            Scale::Linear => Some(v),
            Scale::Log => (v > 0.0).then(|| v.log10()),
            Scale::Symlog => {
                let a = v.abs();
                Some(if a <= SYMLOG_LINTHRESH {
                    v / SYMLOG_LINTHRESH
                } else {
                    v.signum() * (1.0 + (a / SYMLOG_LINTHRESH).log10())
                })
            }
            Scale::Logit => (v > 0.0 && v < 1.0).then(|| (v / (1.0 - v)).log10()),
        }
    }

    pub fn inverse(&self, t: f64) -> f64 {
        match self {
            Scale::Linear => t,
            Scale::Log => 10f64.powf(t),
            Scale::Symlog => {
                if t.abs() <= 1.0 {
                    t * SYMLOG_LINTHRESH
                } else {
                    t.signum() * SYMLOG_LINTHRESH * 10f64.powf(t.abs() - 1.0)
                }
            }
            Scale::Logit => 1.0 / (1.0 + 10f64.powf(-t)),
        }
    }
}

impl FromStr for Scale {
    type Err = EmcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(Scale::Linear),
            "log" => Ok(Scale::Log),
            "symlog" => Ok(Scale::Symlog),
            "logit" => Ok(Scale::Logit),
            _ => Err(EmcError::invalid_choice("scale", s, &Self::NAMES)),
        }
    }
}

/// One axis: scale, limits in data units and direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis {
    pub scale: Scale,
    pub min: f64,
    pub max: f64,
    /// Larger values toward the origin
    pub inverted: bool,
}

impl Axis {
    pub fn new(scale: Scale, min: f64, max: f64) -> Self {
        Self {
            scale,
            min,
            max,
            inverted: false,
        }
    }

    /// Position of `v` along the axis, 0 at the origin and 1 at the far end.
    pub fn fraction(&self, v: f64) -> Option<f64> {
        let t = self.scale.transform(v)?;
        let lo = self.scale.transform(self.min)?;
        let hi = self.scale.transform(self.max)?;
        let f = if (hi - lo).abs() < f64::EPSILON {
            0.5
        } else {
            (t - lo) / (hi - lo)
        };
        Some(if self.inverted { 1.0 - f } else { f })
    }

    /// Data value at an axis fraction.
    pub fn value_at(&self, f: f64) -> f64 {
        let f = if self.inverted { 1.0 - f } else { f };
        let lo = self.scale.transform(self.min).unwrap_or(0.0);
        let hi = self.scale.transform(self.max).unwrap_or(1.0);
        self.scale.inverse(lo + f * (hi - lo))
    }

    /// Tick locations inside the limits.
    pub fn auto_ticks(&self) -> Vec<f64> {
        let (lo, hi) = ordered(self.min, self.max);
        match self.scale {
            Scale::Linear => linear_ticks(lo, hi),
            Scale::Log => log_ticks(lo, hi),
            Scale::Symlog => symlog_ticks(lo, hi),
            Scale::Logit => logit_ticks(lo, hi),
        }
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Limits covering `values` with a margin, computed in the scale's space.
///
/// Values outside the scale's domain are ignored. With nothing to show the
/// limits fall back to a unit range.
pub fn autoscale<I>(values: I, scale: Scale) -> (f64, f64)
where
    I: IntoIterator<Item = f64>,
{
    let (lo, hi) = values
        .into_iter()
        .filter_map(|v| scale.transform(v))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), t| (lo.min(t), hi.max(t)));
    if !lo.is_finite() {
        return match scale {
            Scale::Log => (1.0, 10.0),
            Scale::Logit => (0.1, 0.9),
            _ => (0.0, 1.0),
        };
    }
    let (lo, hi) = if (hi - lo).abs() < 1e-12 {
        let pad = (lo.abs() * 0.1).max(if scale == Scale::Linear { 1.0 } else { 0.1 });
        (lo - pad, hi + pad)
    } else {
        let pad = (hi - lo) * AUTO_MARGIN;
        (lo - pad, hi + pad)
    };
    (scale.inverse(lo), scale.inverse(hi))
}

/// Round-number ticks with a 1/2/2.5/5 × 10^k step, at most eight of them.
pub fn linear_ticks(lo: f64, hi: f64) -> Vec<f64> {
    let span = hi - lo;
    if !span.is_finite() || span <= 0.0 {
        return vec![lo];
    }
    let mut step = nice_step(span / MAX_TICKS as f64);
    for _ in 0..32 {
        let ticks = ticks_with_step(lo, hi, step);
        if ticks.len() <= MAX_TICKS {
            return ticks;
        }
        step = nice_step(step * 1.5);
    }
    vec![lo, hi]
}

fn ticks_with_step(lo: f64, hi: f64, step: f64) -> Vec<f64> {
    let eps = step * 1e-9;
    let first = (lo / step - 1e-9).ceil() as i64;
    let last = (hi / step + 1e-9).floor() as i64;
    (first..=last)
        .map(|k| k as f64 * step)
        .filter(|t| *t >= lo - eps && *t <= hi + eps)
        .map(|t| if t.abs() < eps { 0.0 } else { t })
        .collect()
}

fn log_ticks(lo: f64, hi: f64) -> Vec<f64> {
    if lo <= 0.0 || hi <= lo {
        return vec![];
    }
    let k0 = lo.log10().floor() as i32;
    let k1 = hi.log10().ceil() as i32;
    let decades = (k1 - k0).max(1);
    let mults: &[f64] = if decades <= 2 { &[1.0, 2.0, 5.0] } else { &[1.0] };
    let stride = ((decades as usize).div_ceil(MAX_TICKS)).max(1);
    let mut ticks = Vec::new();
    for k in (k0..=k1).step_by(stride) {
        for m in mults {
            let t = m * 10f64.powi(k);
            if t >= lo * (1.0 - 1e-9) && t <= hi * (1.0 + 1e-9) {
                ticks.push(t);
            }
        }
    }
    ticks
}

fn symlog_ticks(lo: f64, hi: f64) -> Vec<f64> {
    let top = lo.abs().max(hi.abs());
    let kmax = if top > 0.0 { top.log10().ceil() as i32 } else { 0 };
    let mut ticks = vec![0.0];
    for k in 0..=kmax.max(0) {
        let t = 10f64.powi(k);
        ticks.push(t);
        ticks.push(-t);
    }
    ticks.retain(|t| *t >= lo && *t <= hi);
    ticks.sort_by(|a, b| a.total_cmp(b));
    ticks
}

fn logit_ticks(lo: f64, hi: f64) -> Vec<f64> {
    [0.001, 0.01, 0.1, 0.5, 0.9, 0.99, 0.999]
        .into_iter()
        .filter(|t| *t >= lo && *t <= hi)
        .collect()
}

/// Tick label text. Decimals follow the spacing of the tick set.
pub fn format_ticks(ticks: &[f64], scale: Scale) -> Vec<String> {
    if scale != Scale::Linear || ticks.len() < 2 {
        return ticks.iter().map(|&t| format_number(t)).collect();
    }
    let step = ticks
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(f64::INFINITY, f64::min);
    let decimals = decimals_for(step);
    let largest = ticks.iter().fold(0.0f64, |m, t| m.max(t.abs()));
    if largest >= 1e6 || (largest < 1e-3 && largest > 0.0) {
        return ticks.iter().map(|&t| format_number(t)).collect();
    }
    ticks
        .iter()
        .map(|&t| {
            let s = format!("{:.*}", decimals, t);
            // avoid "-0"
            if s.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
                s.trim_start_matches('-').to_string()
            } else {
                s
            }
        })
        .collect()
}

fn decimals_for(step: f64) -> usize {
    if !step.is_finite() || step <= 0.0 {
        return 0;
    }
    (0..=6)
        .find(|&d| {
            let scaled = step * 10f64.powi(d as i32);
            (scaled - scaled.round()).abs() < 1e-6 * scaled.max(1.0)
        })
        .unwrap_or(6)
}

/// Compact general-purpose number formatting.
pub fn format_number(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    let a = v.abs();
    if !(1e-4..1e6).contains(&a) {
        let exp = a.log10().floor() as i32;
        let mant = v / 10f64.powi(exp);
        if (mant - mant.round()).abs() < 1e-9 {
            return format!("{:.0}e{}", mant, exp);
        }
        return format!("{:.2}e{}", mant, exp);
    }
    let s = format!("{:.6}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    s.to_string()
}

/// Longitude label such as `120°W`, `0°` or `60°E`.
pub fn format_lon(lon: f64) -> String {
    let mut l = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if (l + 180.0).abs() < 1e-9 && lon > 0.0 {
        l = 180.0;
    }
    let body = trim_degrees(l.abs());
    if l.abs() < 1e-9 || (l.abs() - 180.0).abs() < 1e-9 {
        format!("{}°", body)
    } else if l < 0.0 {
        format!("{}°W", body)
    } else {
        format!("{}°E", body)
    }
}

/// Latitude label such as `30°N`, `0°` or `45°S`.
pub fn format_lat(lat: f64) -> String {
    let body = trim_degrees(lat.abs());
    if lat.abs() < 1e-9 {
        "0°".to_string()
    } else if lat < 0.0 {
        format!("{}°S", body)
    } else {
        format!("{}°N", body)
    }
}

fn trim_degrees(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        format!("{:.0}", v)
    } else {
        format!("{:.1}", v)
    }
}

/// Data-to-pixel mapping of one cartesian subplot.
#[derive(Debug, Clone, Copy)]
pub struct Axes {
    pub rect: PixelRect,
    pub x: Axis,
    pub y: Axis,
    /// Horizontal shift per pixel of height (tan of the skew angle)
    pub skew: Option<f64>,
}

impl Axes {
    /// Pixel position of an axes fraction, skew included.
    pub fn fraction_to_pixel(&self, fx: f64, fy: f64) -> (f32, f32) {
        let h = self.rect.height as f64;
        let mut px = self.rect.x as f64 + fx * self.rect.width as f64;
        let py = self.rect.bottom() as f64 - fy * h;
        if let Some(t) = self.skew {
            px += fy * h * t;
        }
        (px as f32, py as f32)
    }

    pub fn to_pixel(&self, x: f64, y: f64) -> Option<(f32, f32)> {
        let fx = self.x.fraction(x)?;
        let fy = self.y.fraction(y)?;
        Some(self.fraction_to_pixel(fx, fy))
    }

    /// Horizontal skew offset at `fy`, as a fraction of the axes width.
    pub fn skew_fraction(&self, fy: f64) -> f64 {
        match self.skew {
            Some(t) => fy * self.rect.height as f64 * t / self.rect.width.max(1.0) as f64,
            None => 0.0,
        }
    }
}

/// Validate labels against the number of ticks they annotate.
pub fn check_tick_labels(axis: char, labels: usize, ticks: usize) -> EmcResult<()> {
    if labels != ticks {
        return Err(EmcError::TickLabelMismatch {
            axis,
            labels,
            ticks,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_parse() {
        assert_eq!("log".parse::<Scale>().unwrap(), Scale::Log);
        let err = "cubic".parse::<Scale>().unwrap_err().to_string();
        assert!(err.contains("log | linear | symlog | logit"));
    }

    #[test]
    fn test_symlog_round_trip() {
        for v in [-500.0, -2.0, -0.5, 0.0, 1.0, 3.0, 1000.0] {
            let t = Scale::Symlog.transform(v).unwrap();
            assert!((Scale::Symlog.inverse(t) - v).abs() < 1e-9 * v.abs().max(1.0));
        }
    }

    #[test]
    fn test_linear_ticks_nice() {
        assert_eq!(linear_ticks(0.0, 10.0), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        let t = linear_ticks(-3.3, 47.1);
        assert!(t.len() >= 4 && t.len() <= 8);
        assert_eq!(t[0], 0.0);
    }

    #[test]
    fn test_log_ticks() {
        assert_eq!(log_ticks(100.0, 1000.0), vec![100.0, 200.0, 500.0, 1000.0]);
        assert_eq!(log_ticks(1.0, 1e6).len(), 7);
    }

    #[test]
    fn test_autoscale_margin() {
        let (lo, hi) = autoscale([0.0, 10.0], Scale::Linear);
        assert!((lo + 0.5).abs() < 1e-12 && (hi - 10.5).abs() < 1e-12);
        let (lo, hi) = autoscale([5.0, f64::NAN], Scale::Linear);
        assert!(lo < 5.0 && hi > 5.0);
        let (lo, _) = autoscale([-1.0, 10.0, 100.0], Scale::Log);
        assert!(lo > 0.0 && lo < 10.0);
    }

    #[test]
    fn test_inverted_fraction() {
        let mut axis = Axis::new(Scale::Linear, 0.0, 10.0);
        assert_eq!(axis.fraction(2.5), Some(0.25));
        axis.inverted = true;
        assert_eq!(axis.fraction(2.5), Some(0.75));
        assert!((axis.value_at(0.75) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_format_ticks() {
        assert_eq!(format_ticks(&[0.0, 2.5, 5.0], Scale::Linear), vec!["0.0", "2.5", "5.0"]);
        assert_eq!(format_ticks(&[-10.0, 0.0, 10.0], Scale::Linear), vec!["-10", "0", "10"]);
        assert_eq!(format_number(0.25), "0.25");
        assert_eq!(format_number(1e7), "1e7");
    }

    #[test]
    fn test_degree_labels() {
        assert_eq!(format_lon(-120.0), "120°W");
        assert_eq!(format_lon(0.0), "0°");
        assert_eq!(format_lon(60.0), "60°E");
        assert_eq!(format_lon(180.0), "180°");
        assert_eq!(format_lon(245.0), "115°W");
        assert_eq!(format_lat(-45.0), "45°S");
        assert_eq!(format_lat(7.5), "7.5°N");
    }

    #[test]
    fn test_tick_label_check() {
        assert!(check_tick_labels('x', 3, 3).is_ok());
        assert!(matches!(
            check_tick_labels('y', 2, 3),
            Err(EmcError::TickLabelMismatch { axis: 'y', .. })
        ));
    }
}
