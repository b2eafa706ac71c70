//! Significance testing: regression coefficient and Student's t-test.

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

use emc_common::{EmcError, EmcResult};

/// Regression coefficient of `y` on `x` with its uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Regression {
    pub coefficient: f64,
    pub std_error: f64,
    /// `tcrit * std_error` at the requested confidence interval
    pub error_bar: f64,
    pub significant: bool,
}

/// Difference of sample means and its error bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TTest {
    pub diffmean: f64,
    pub errorbar: f64,
}

impl TTest {
    /// The difference exceeds its error bar.
    pub fn is_significant(&self) -> bool {
        self.diffmean.abs() > self.errorbar
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TTestOptions {
    /// Confidence interval in percent
    pub ci: f64,
    pub paired: bool,
    /// Express both results as a percentage of mean(x)
    pub scale: bool,
}

impl Default for TTestOptions {
    fn default() -> Self {
        Self {
            ci: 95.0,
            paired: true,
            scale: false,
        }
    }
}

/// Two-sided critical t value for a confidence interval in percent.
fn t_critical(ci: f64, dof: f64) -> EmcResult<f64> {
    if !(0.0..100.0).contains(&ci) || ci <= 0.0 {
        return Err(EmcError::InvalidArgument(format!(
            "confidence interval must be within (0, 100), got {}",
            ci
        )));
    }
    if dof <= 0.0 {
        return Err(EmcError::InvalidArgument(format!(
            "need positive degrees of freedom, got {}",
            dof
        )));
    }
    let pval = 1.0 - (1.0 - ci / 100.0) / 2.0;
    let dist = StudentsT::new(0.0, 1.0, dof)
        .map_err(|e| EmcError::InvalidArgument(format!("student t: {}", e)))?;
    Ok(dist.inverse_cdf(pval))
}

fn mean(v: &[f64]) -> f64 {
    v.iter().sum::<f64>() / v.len() as f64
}

/// NaN-aware mean and sample variance (ddof = 1).
fn nan_mean_var(v: &[f64]) -> (f64, f64) {
    let valid: Vec<f64> = v.iter().copied().filter(|x| !x.is_nan()).collect();
    if valid.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let m = mean(&valid);
    if valid.len() < 2 {
        return (m, f64::NAN);
    }
    let var = valid.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (valid.len() - 1) as f64;
    (m, var)
}

/// Linear regression coefficient of `y` on `x` and its significance.
///
/// Degrees of freedom for the critical value are `2n - 2`.
pub fn lregress(x: &[f64], y: &[f64], ci: f64) -> EmcResult<Regression> {
    if x.len() != y.len() {
        return Err(EmcError::length_mismatch("samples x and y", x.len(), y.len()));
    }
    let n = x.len();
    if n < 3 {
        return Err(EmcError::EmptyData(format!(
            "lregress needs at least 3 samples, got {}",
            n
        )));
    }
    let nf = n as f64;
    let tcrit = t_critical(ci, 2.0 * nf - 2.0)?;

    let (mx, my) = (mean(x), mean(y));
    let mut cov_xx = 0.0;
    let mut cov_yy = 0.0;
    let mut cov_xy = 0.0;
    for (&a, &b) in x.iter().zip(y) {
        cov_xx += (a - mx) * (a - mx);
        cov_yy += (b - my) * (b - my);
        cov_xy += (a - mx) * (b - my);
    }
    cov_xx /= nf - 1.0;
    cov_yy /= nf - 1.0;
    cov_xy /= nf - 1.0;

    if cov_xx == 0.0 {
        return Err(EmcError::InvalidArgument(
            "x has zero variance; regression is undefined".to_string(),
        ));
    }

    let rc = cov_xy / cov_xx;
    let se = (cov_yy - rc * rc * cov_xx) * (nf - 1.0) / (nf - 2.0);
    let sb = (se / (cov_xx * (nf - 1.0))).sqrt();
    let eb = tcrit * sb;

    Ok(Regression {
        coefficient: rc,
        std_error: sb,
        error_bar: eb,
        significant: rc.abs() - eb.abs() > 0.0,
    })
}

/// Student's t-test of experiment `y` against control `x`.
///
/// `y = None` compares `x` with itself. Means and variances skip NaNs; the
/// sample count used for the error and the degrees of freedom (`2(n-1)`) is
/// the full length of `x`.
pub fn ttest(x: &[f64], y: Option<&[f64]>, opts: TTestOptions) -> EmcResult<TTest> {
    let y = y.unwrap_or(x);
    if x.len() != y.len() {
        return Err(EmcError::length_mismatch("control vs experiment", x.len(), y.len()));
    }
    let n = x.len() as f64;
    if x.len() < 2 {
        return Err(EmcError::EmptyData(format!(
            "ttest needs at least 2 samples, got {}",
            x.len()
        )));
    }
    let tcrit = t_critical(opts.ci, 2.0 * (n - 1.0))?;

    let (xmean, xvar) = nan_mean_var(x);
    let (ymean, yvar) = nan_mean_var(y);
    let mut diffmean = ymean - xmean;

    let std_err = if opts.paired {
        let diff: Vec<f64> = y.iter().zip(x).map(|(b, a)| b - a).collect();
        let (_, dvar) = nan_mean_var(&diff);
        (dvar / n).sqrt()
    } else {
        ((xvar + yvar) / (n - 1.0)).sqrt()
    };
    let mut errorbar = tcrit * std_err;

    if opts.scale {
        let fac = 100.0 / xmean;
        diffmean *= fac;
        errorbar *= fac;
    }

    Ok(TTest { diffmean, errorbar })
}

/// Column-wise [`ttest`] over row-major `(nsamp, ncols)` samples.
pub fn ttest_columns(
    x: &[f64],
    y: Option<&[f64]>,
    ncols: usize,
    opts: TTestOptions,
) -> EmcResult<Vec<TTest>> {
    if ncols == 0 || x.len() % ncols != 0 {
        return Err(EmcError::InvalidArgument(format!(
            "{} values cannot be split into {} columns",
            x.len(),
            ncols
        )));
    }
    if let Some(y) = y {
        if y.len() != x.len() {
            return Err(EmcError::length_mismatch("control vs experiment", x.len(), y.len()));
        }
    }
    let column = |data: &[f64], j: usize| -> Vec<f64> {
        data.iter().skip(j).step_by(ncols).copied().collect()
    };
    (0..ncols)
        .map(|j| {
            let xc = column(x, j);
            let yc = y.map(|y| column(y, j));
            ttest(&xc, yc.as_deref(), opts)
        })
        .collect()
}
