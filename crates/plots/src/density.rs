//! Point densities for density-colored scatter plots and kernel density
//! estimates for density lines.

use statrs::distribution::{Continuous, Normal};
use statrs::statistics::Statistics;

use emc_common::{EmcError, EmcResult};

use crate::binning::{histogram2d, Histogram2D};

/// How bin-centre densities are interpolated at each point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interp {
    #[default]
    Linear,
    Nearest,
}

impl std::str::FromStr for Interp {
    type Err = EmcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(Interp::Linear),
            "nearest" => Ok(Interp::Nearest),
            _ => Err(EmcError::invalid_choice("interpolation", s, &["linear", "nearest"])),
        }
    }
}

/// Density of every `(x, y)` pair from a normalised 2-D histogram.
///
/// Points outside the span of the bin centres, and non-finite pairs, get 0.
/// With `nsamples` only an evenly strided subset of the points builds the
/// histogram; every point is still assigned a value.
pub fn density_values(
    x: &[f64],
    y: &[f64],
    bins: [usize; 2],
    interp: Interp,
    nsamples: Option<usize>,
) -> EmcResult<Vec<f64>> {
    if x.len() != y.len() {
        return Err(EmcError::length_mismatch("density scatter x and y", x.len(), y.len()));
    }
    let hist = match nsamples {
        Some(n) if n > 0 && n < x.len() => {
            let stride = x.len() as f64 / n as f64;
            let idx: Vec<usize> = (0..n).map(|k| (k as f64 * stride) as usize).collect();
            let xs: Vec<f64> = idx.iter().map(|&i| x[i]).collect();
            let ys: Vec<f64> = idx.iter().map(|&i| y[i]).collect();
            histogram2d(&xs, &ys, bins, true)?
        }
        _ => histogram2d(x, y, bins, true)?,
    };
    Ok(x.iter()
        .zip(y)
        .map(|(&a, &b)| interpolate(&hist, a, b, interp).unwrap_or(0.0))
        .collect())
}

/// Sort order drawing the densest points last.
pub fn ascending_order(z: &[f64]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..z.len()).collect();
    idx.sort_by(|&a, &b| z[a].total_cmp(&z[b]));
    idx
}

fn bracket(centers: &[f64], v: f64) -> Option<(usize, f64)> {
    let n = centers.len();
    if n == 1 {
        return ((v - centers[0]).abs() < 1e-12).then_some((0, 0.0));
    }
    if v < centers[0] || v > centers[n - 1] {
        return None;
    }
    let upper = centers.partition_point(|&c| c <= v).clamp(1, n - 1);
    let lower = upper - 1;
    let t = (v - centers[lower]) / (centers[upper] - centers[lower]);
    Some((lower, t))
}

fn interpolate(hist: &Histogram2D, x: f64, y: f64, interp: Interp) -> Option<f64> {
    if !x.is_finite() || !y.is_finite() {
        return None;
    }
    let xc = hist.xcenters();
    let yc = hist.ycenters();
    let (i, tx) = bracket(&xc, x)?;
    let (j, ty) = bracket(&yc, y)?;
    let i1 = (i + 1).min(hist.nx() - 1);
    let j1 = (j + 1).min(hist.ny() - 1);
    let v = match interp {
        Interp::Nearest => {
            let ii = if tx >= 0.5 { i1 } else { i };
            let jj = if ty >= 0.5 { j1 } else { j };
            hist.get(ii, jj)
        }
        Interp::Linear => {
            let v0 = hist.get(i, j) * (1.0 - ty) + hist.get(i, j1) * ty;
            let v1 = hist.get(i1, j) * (1.0 - ty) + hist.get(i1, j1) * ty;
            v0 * (1.0 - tx) + v1 * tx
        }
    };
    v.is_finite().then_some(v)
}

/// Bandwidth selection for [`gaussian_kde`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BwMethod {
    #[default]
    Scott,
    Silverman,
    /// Explicit factor multiplied into the sample standard deviation
    Factor(f64),
}

impl std::str::FromStr for BwMethod {
    type Err = EmcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scott" => Ok(BwMethod::Scott),
            "silverman" => Ok(BwMethod::Silverman),
            other => other
                .parse::<f64>()
                .map(BwMethod::Factor)
                .map_err(|_| EmcError::invalid_choice("bw_method", s, &["scott", "silverman", "<number>"])),
        }
    }
}

/// Evaluated kernel density curve.
#[derive(Debug, Clone, PartialEq)]
pub struct KdeCurve {
    pub x: Vec<f64>,
    pub density: Vec<f64>,
    pub bandwidth: f64,
}

/// Gaussian kernel density estimate on `gridsize` points.
///
/// The support extends `cut` bandwidths beyond the data and is then limited
/// to `clip` when given.
pub fn gaussian_kde(
    data: &[f64],
    bw_method: BwMethod,
    gridsize: usize,
    cut: f64,
    clip: Option<(f64, f64)>,
) -> EmcResult<KdeCurve> {
    let finite: Vec<f64> = data.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.len() < 2 {
        return Err(EmcError::EmptyData(
            "kernel density needs at least two finite values".to_string(),
        ));
    }
    let n = finite.len() as f64;
    let factor = match bw_method {
        BwMethod::Scott => n.powf(-0.2),
        BwMethod::Silverman => (n * 3.0 / 4.0).powf(-0.2),
        BwMethod::Factor(f) => f,
    };
    let std = finite.iter().std_dev();
    let bandwidth = factor * std;
    if bandwidth.is_nan() || bandwidth <= 0.0 {
        return Err(EmcError::InvalidArgument(
            "kernel density bandwidth is zero; data has no spread".to_string(),
        ));
    }

    let lo = finite.iter().copied().fold(f64::INFINITY, f64::min) - cut * bandwidth;
    let hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max) + cut * bandwidth;
    let (lo, hi) = match clip {
        Some((a, b)) => (lo.max(a), hi.min(b)),
        None => (lo, hi),
    };
    let gridsize = gridsize.max(2);
    let kernel = Normal::new(0.0, 1.0).map_err(|e| EmcError::InvalidArgument(e.to_string()))?;

    let x: Vec<f64> = (0..gridsize)
        .map(|i| lo + (hi - lo) * i as f64 / (gridsize - 1) as f64)
        .collect();
    let density = x
        .iter()
        .map(|&g| {
            finite.iter().map(|&xi| kernel.pdf((g - xi) / bandwidth)).sum::<f64>() / (n * bandwidth)
        })
        .collect();
    Ok(KdeCurve {
        x,
        density,
        bandwidth,
    })
}
