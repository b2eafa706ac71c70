//! Ordinary least squares fit of `y = slope * x + intercept`.

use serde::Serialize;

use emc_common::{EmcError, EmcResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearRegression {
    /// Fitted values for every input `x`, NaN where `x` is not finite
    pub y_pred: Vec<f64>,
    pub r_sq: f64,
    pub intercept: f64,
    pub slope: f64,
}

impl LinearRegression {
    /// Legend text used by regression line layers.
    pub fn label(&self) -> String {
        format!(
            "y = {:.4}x + {:.4}\nR\u{00b2} : {:.4}",
            self.slope, self.intercept, self.r_sq
        )
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit `y` against `x`.
///
/// Pairs where either value is not finite are left out of the fit.
pub fn get_linear_regression(x: &[f64], y: &[f64]) -> EmcResult<LinearRegression> {
    if x.len() != y.len() {
        return Err(EmcError::length_mismatch("x vs y", x.len(), y.len()));
    }
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(&a, &b)| (a, b))
        .collect();
    if pairs.len() < 2 {
        return Err(EmcError::EmptyData(
            "linear regression needs at least two finite pairs".to_string(),
        ));
    }

    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for &(a, b) in &pairs {
        sxx += (a - mx) * (a - mx);
        sxy += (a - mx) * (b - my);
        syy += (b - my) * (b - my);
    }
    if sxx == 0.0 {
        return Err(EmcError::InvalidArgument(
            "x has zero variance; regression is undefined".to_string(),
        ));
    }

    let slope = sxy / sxx;
    let intercept = my - slope * mx;
    let ss_res: f64 = pairs
        .iter()
        .map(|&(a, b)| (b - (slope * a + intercept)).powi(2))
        .sum();
    // constant y is a perfect fit
    let r_sq = if syy == 0.0 { 1.0 } else { 1.0 - ss_res / syy };

    let y_pred = x
        .iter()
        .map(|&a| if a.is_finite() { slope * a + intercept } else { f64::NAN })
        .collect();

    Ok(LinearRegression {
        y_pred,
        r_sq,
        intercept,
        slope,
    })
}
