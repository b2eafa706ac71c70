//! One- and two-dimensional histograms.

use emc_common::{EmcError, EmcResult};

/// Histogram binning: a bin count over the data range, or explicit edges.
#[derive(Debug, Clone, PartialEq)]
pub enum Bins {
    Count(usize),
    Edges(Vec<f64>),
}

impl Default for Bins {
    fn default() -> Self {
        Bins::Count(10)
    }
}

impl From<usize> for Bins {
    fn from(n: usize) -> Self {
        Bins::Count(n)
    }
}

impl From<Vec<f64>> for Bins {
    fn from(edges: Vec<f64>) -> Self {
        Bins::Edges(edges)
    }
}

/// Bin edges and per-bin totals.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram1D {
    pub edges: Vec<f64>,
    pub counts: Vec<f64>,
}

fn finite_range(data: &[f64]) -> Option<(f64, f64)> {
    let (lo, hi) = data
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    lo.is_finite().then_some((lo, hi))
}

/// `n + 1` evenly spaced edges; a degenerate range widens to ±0.5.
pub fn linear_edges(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 0.5, hi + 0.5) };
    let n = n.max(1);
    (0..=n).map(|i| lo + (hi - lo) * i as f64 / n as f64).collect()
}

/// Bin index for `v`; the last edge is inclusive.
pub fn locate(edges: &[f64], v: f64) -> Option<usize> {
    let n = edges.len().checked_sub(1)?;
    if n == 0 || !v.is_finite() || v < edges[0] || v > edges[n] {
        return None;
    }
    if v == edges[n] {
        return Some(n - 1);
    }
    // edges are sorted: first edge strictly greater than v
    let upper = edges.partition_point(|&e| e <= v);
    Some(upper.saturating_sub(1).min(n - 1))
}

/// Weighted histogram of the finite values in `data`.
///
/// With `density` the result integrates to one; with `cumulative` each bin
/// holds the running total.
pub fn histogram(
    data: &[f64],
    bins: &Bins,
    range: Option<(f64, f64)>,
    weights: Option<&[f64]>,
    density: bool,
    cumulative: bool,
) -> EmcResult<Histogram1D> {
    if let Some(w) = weights {
        if w.len() != data.len() {
            return Err(EmcError::length_mismatch("histogram weights", w.len(), data.len()));
        }
    }
    let edges = match bins {
        Bins::Edges(e) => {
            if e.len() < 2 || e.windows(2).any(|w| w[1] < w[0]) {
                return Err(EmcError::InvalidArgument(
                    "bin edges must be monotonically increasing".to_string(),
                ));
            }
            e.clone()
        }
        Bins::Count(n) => {
            let (lo, hi) = range.or_else(|| finite_range(data)).unwrap_or((0.0, 1.0));
            linear_edges(lo, hi, *n)
        }
    };

    let mut counts = vec![0.0; edges.len() - 1];
    for (i, &v) in data.iter().enumerate() {
        if let Some(b) = locate(&edges, v) {
            counts[b] += weights.map_or(1.0, |w| w[i]);
        }
    }

    if density {
        let total: f64 = counts.iter().sum();
        if total > 0.0 {
            for (c, w) in counts.iter_mut().zip(edges.windows(2)) {
                *c /= total * (w[1] - w[0]);
            }
        }
    }
    if cumulative {
        let mut acc = 0.0;
        for (c, w) in counts.iter_mut().zip(edges.windows(2)) {
            acc += if density { *c * (w[1] - w[0]) } else { *c };
            *c = acc;
        }
    }
    Ok(Histogram1D { edges, counts })
}

/// Row-major 2-D histogram: `values[i * ny + j]` counts x bin `i`, y bin `j`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram2D {
    pub xedges: Vec<f64>,
    pub yedges: Vec<f64>,
    pub values: Vec<f64>,
}

impl Histogram2D {
    pub fn nx(&self) -> usize {
        self.xedges.len() - 1
    }

    pub fn ny(&self) -> usize {
        self.yedges.len() - 1
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.ny() + j]
    }

    pub fn xcenters(&self) -> Vec<f64> {
        self.xedges.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
    }

    pub fn ycenters(&self) -> Vec<f64> {
        self.yedges.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
    }
}

/// Histogram of `(x, y)` pairs over `bins = [nx, ny]` bins spanning the data.
pub fn histogram2d(x: &[f64], y: &[f64], bins: [usize; 2], density: bool) -> EmcResult<Histogram2D> {
    if x.len() != y.len() {
        return Err(EmcError::length_mismatch("histogram2d x and y", x.len(), y.len()));
    }
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(&a, &b)| (a, b))
        .collect();
    if pairs.is_empty() {
        return Err(EmcError::EmptyData("histogram2d needs finite pairs".to_string()));
    }
    let xs: Vec<f64> = pairs.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = pairs.iter().map(|p| p.1).collect();
    let (x0, x1) = finite_range(&xs).unwrap_or((0.0, 1.0));
    let (y0, y1) = finite_range(&ys).unwrap_or((0.0, 1.0));
    let xedges = linear_edges(x0, x1, bins[0]);
    let yedges = linear_edges(y0, y1, bins[1]);
    let (nx, ny) = (xedges.len() - 1, yedges.len() - 1);

    let mut values = vec![0.0; nx * ny];
    for &(a, b) in &pairs {
        if let (Some(i), Some(j)) = (locate(&xedges, a), locate(&yedges, b)) {
            values[i * ny + j] += 1.0;
        }
    }
    if density {
        let area = (xedges[1] - xedges[0]) * (yedges[1] - yedges[0]);
        let total = pairs.len() as f64;
        for v in &mut values {
            *v /= total * area;
        }
    }
    Ok(Histogram2D {
        xedges,
        yedges,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_inclusive_last_edge() {
        let h = histogram(&[0.0, 1.0, 2.0, 3.0, 4.0], &Bins::Count(4), None, None, false, false).unwrap();
        assert_eq!(h.edges, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(h.counts, vec![1.0, 1.0, 1.0, 2.0]);
    }

    #[test]
    fn test_density_integrates_to_one() {
        let data = [0.1, 0.2, 0.25, 0.7, 0.9, f64::NAN];
        let h = histogram(&data, &Bins::Count(5), Some((0.0, 1.0)), None, true, false).unwrap();
        let integral: f64 = h.counts.iter().zip(h.edges.windows(2)).map(|(c, w)| c * (w[1] - w[0])).sum();
        assert!((integral - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_weights_and_cumulative() {
        let h = histogram(
            &[0.5, 1.5, 1.5],
            &Bins::Edges(vec![0.0, 1.0, 2.0]),
            None,
            Some(&[2.0, 1.0, 1.0]),
            false,
            true,
        )
        .unwrap();
        assert_eq!(h.counts, vec![2.0, 4.0]);
        assert!(histogram(&[1.0], &Bins::Count(2), None, Some(&[1.0, 2.0]), false, false).is_err());
    }

    #[test]
    fn test_histogram2d_density() {
        let x = [0.0, 1.0, 0.0, 1.0];
        let y = [0.0, 0.0, 1.0, 1.0];
        let h = histogram2d(&x, &y, [2, 2], true).unwrap();
        // each quarter cell holds one point over area 0.25
        for v in &h.values {
            assert!((v - 1.0).abs() < 1e-12);
        }
        assert_eq!(h.xcenters(), vec![0.25, 0.75]);
    }
}
