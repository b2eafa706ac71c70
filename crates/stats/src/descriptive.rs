//! Descriptive statistics summary.

use std::fmt;

use serde::Serialize;
use statrs::statistics::{Data, OrderStatistics, Statistics};

use emc_common::{EmcError, EmcResult};

/// Summary statistics of an array, ignoring NaNs.
#[derive(Debug, Clone, Serialize)]
pub struct MStats {
    pub shape: Vec<usize>,
    pub n_elements: usize,
    pub n_nans: usize,
    pub n_analyzed: usize,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    pub median: f64,
    /// Sample standard deviation (n - 1 denominator)
    pub stdev: f64,
    pub mean_abs: f64,
    /// Smallest non-zero absolute value, NaN when every value is zero
    pub min_abs: f64,
    pub frac_zero: f64,
    pub frac_nan: f64,
}

/// Compute [`MStats`] for `data` laid out with `shape`.
///
/// The product of `shape` must equal `data.len()`. Pass `&[data.len()]` for
/// a plain series.
pub fn mstats(data: &[f64], shape: &[usize]) -> EmcResult<MStats> {
    let n_elements: usize = shape.iter().product();
    if n_elements != data.len() {
        return Err(EmcError::ShapeMismatch {
            what: "mstats data vs shape".to_string(),
            left: vec![data.len()],
            right: shape.to_vec(),
        });
    }

    let valid: Vec<f64> = data.iter().copied().filter(|v| !v.is_nan()).collect();
    if valid.is_empty() {
        return Err(EmcError::EmptyData("mstats: every element is NaN".to_string()));
    }
    let n_nans = n_elements - valid.len();
    let abs: Vec<f64> = valid.iter().map(|v| v.abs()).collect();

    let min_abs = abs
        .iter()
        .copied()
        .filter(|v| *v > 0.0)
        .fold(f64::NAN, f64::min);
    let n_zero = valid.iter().filter(|v| **v == 0.0).count();

    Ok(MStats {
        shape: shape.to_vec(),
        n_elements,
        n_nans,
        n_analyzed: valid.len(),
        mean: valid.iter().mean(),
        max: valid.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        min: valid.iter().copied().fold(f64::INFINITY, f64::min),
        median: Data::new(valid.clone()).quantile(0.5),
        stdev: valid.iter().std_dev(),
        mean_abs: abs.iter().mean(),
        min_abs,
        frac_zero: n_zero as f64 / valid.len() as f64,
        frac_nan: n_nans as f64 / n_elements as f64,
    })
}

impl fmt::Display for MStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "================= m s t a t s ==================")?;
        writeln!(f, "        MatrixSize: {:?}", self.shape)?;
        writeln!(f, "         NElements: {}", self.n_elements)?;
        writeln!(f, " NAnalyzedElements: {}", self.n_analyzed)?;
        writeln!(f, "              Mean: {:.6}", self.mean)?;
        writeln!(f, "               Max: {:.6}", self.max)?;
        writeln!(f, "               Min: {:.6}", self.min)?;
        writeln!(f, "            Median: {:.6}", self.median)?;
        writeln!(f, "             StDev: {:.6}", self.stdev)?;
        writeln!(f, "           MeanAbs: {:.6}", self.mean_abs)?;
        writeln!(f, "            MinAbs: {:.6}", self.min_abs)?;
        writeln!(f, "          FracZero: {:.6}", self.frac_zero)?;
        writeln!(f, "           FracNaN: {:.6}", self.frac_nan)?;
        write!(f, "================================================")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mstats_sample() {
        let data = [30.0, 37.0, 36.0, 43.0, 42.0, 43.0, 43.0, 46.0, 41.0, 42.0];
        let s = mstats(&data, &[10]).unwrap();
        assert_eq!(s.n_analyzed, 10);
        assert!((s.mean - 40.3).abs() < 1e-9);
        assert!((s.median - 42.0).abs() < 1e-9);
        assert!((s.stdev - 4.667856991049414).abs() < 1e-9);
        assert_eq!(s.max, 46.0);
        assert_eq!(s.min, 30.0);
        assert_eq!(s.min_abs, 30.0);
        assert_eq!(s.frac_zero, 0.0);
    }

    #[test]
    fn test_mstats_counts_nans_and_zeros() {
        let data = [0.0, f64::NAN, -2.0, 4.0];
        let s = mstats(&data, &[2, 2]).unwrap();
        assert_eq!(s.n_nans, 1);
        assert_eq!(s.n_analyzed, 3);
        assert!((s.frac_nan - 0.25).abs() < 1e-12);
        assert!((s.frac_zero - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(s.min_abs, 2.0);
        assert!((s.mean_abs - 2.0).abs() < 1e-12);
        assert!(s.to_string().contains("FracNaN: 0.250000"));
    }

    #[test]
    fn test_mstats_rejects_bad_shape_and_all_nan() {
        assert!(mstats(&[1.0, 2.0], &[3]).is_err());
        assert!(mstats(&[f64::NAN], &[1]).is_err());
    }
}
