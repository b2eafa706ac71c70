//! Bootstrap confidence interval of the mean.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statrs::statistics::{Data, OrderStatistics};
use tracing::debug;

use emc_common::{EmcError, EmcResult};

/// Confidence interval bounds on the sample mean, as offsets from the mean.
///
/// Draws `nrepl` resamples with replacement and returns the
/// `(1 - ci/100) / 2` and `1 - (1 - ci/100) / 2` quantiles of
/// `resample_mean - sample_mean`. `seed` makes the draw reproducible.
pub fn bootstrap(sample: &[f64], nrepl: usize, ci: f64, seed: Option<u64>) -> EmcResult<(f64, f64)> {
    let valid: Vec<f64> = sample.iter().copied().filter(|v| v.is_finite()).collect();
    if valid.is_empty() {
        return Err(EmcError::EmptyData("bootstrap sample is empty".to_string()));
    }
    if nrepl == 0 {
        return Err(EmcError::InvalidArgument("nrepl must be positive".to_string()));
    }
    if ci <= 0.0 || ci >= 100.0 {
        return Err(EmcError::InvalidArgument(format!(
            "confidence interval must be within (0, 100), got {}",
            ci
        )));
    }

    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let n = valid.len();
    let xbar = valid.iter().sum::<f64>() / n as f64;

    let deltas: Vec<f64> = (0..nrepl)
        .map(|_| {
            let total: f64 = (0..n).map(|_| valid[rng.gen_range(0..n)]).sum();
            total / n as f64 - xbar
        })
        .collect();

    let alpha = (1.0 - ci / 100.0) / 2.0;
    let mut data = Data::new(deltas);
    let lower = data.quantile(alpha);
    let upper = data.quantile(1.0 - alpha);
    debug!(nrepl, n, lower, upper, "Bootstrap interval");
    Ok((lower, upper))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_brackets_zero() {
        let sample = [30.0, 37.0, 36.0, 43.0, 42.0, 43.0, 43.0, 46.0, 41.0, 42.0];
        let (lo, hi) = bootstrap(&sample, 2000, 95.0, Some(7)).unwrap();
        assert!(lo < 0.0 && hi > 0.0);
        // the mean's standard error is about 1.5, so the band is a few units wide
        assert!(hi - lo > 2.0 && hi - lo < 10.0);
    }

    #[test]
    fn test_seed_is_reproducible() {
        let sample = [1.0, 5.0, 2.0, 8.0];
        let a = bootstrap(&sample, 500, 90.0, Some(42)).unwrap();
        let b = bootstrap(&sample, 500, 90.0, Some(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_constant_sample_has_zero_width() {
        let (lo, hi) = bootstrap(&[3.0; 5], 100, 95.0, Some(1)).unwrap();
        assert_eq!((lo, hi), (0.0, 0.0));
    }
}
