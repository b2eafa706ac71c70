//! Latitude weighting.

use emc_common::{EmcError, EmcResult};

/// Area weights for latitudes in degrees: `cos(lat)`.
pub fn get_weights(lats: &[f64]) -> Vec<f64> {
    lats.iter().map(|lat| lat.to_radians().cos()).collect()
}

/// Weighted average over every element.
pub fn get_weighted_mean(data: &[f64], weights: &[f64]) -> EmcResult<f64> {
    if data.len() != weights.len() {
        return Err(EmcError::ShapeMismatch {
            what: "data and weights".to_string(),
            left: vec![data.len()],
            right: vec![weights.len()],
        });
    }
    weighted(data.iter().copied().zip(weights.iter().copied()))
}

fn weighted(pairs: impl Iterator<Item = (f64, f64)>) -> EmcResult<f64> {
    let (num, den) = pairs.fold((0.0, 0.0), |(num, den), (v, w)| (num + v * w, den + w));
    if den == 0.0 {
        return Err(EmcError::InvalidArgument(
            "weights sum to zero, cannot normalise".to_string(),
        ));
    }
    Ok(num / den)
}

/// Weighted average of a row-major `shape = [rows, cols]` array along `axis`.
///
/// `axis = 0` reduces rows (one value per column), `axis = 1` reduces columns.
pub fn weighted_mean_axis(
    data: &[f64],
    weights: &[f64],
    shape: [usize; 2],
    axis: usize,
) -> EmcResult<Vec<f64>> {
    let [rows, cols] = shape;
    if data.len() != rows * cols || weights.len() != data.len() {
        return Err(EmcError::ShapeMismatch {
            what: "data and weights".to_string(),
            left: vec![data.len()],
            right: vec![weights.len(), rows, cols],
        });
    }
    let at = |r: usize, c: usize| (data[r * cols + c], weights[r * cols + c]);
    match axis {
        0 => (0..cols)
            .map(|c| weighted((0..rows).map(|r| at(r, c))))
            .collect(),
        1 => (0..rows)
            .map(|r| weighted((0..cols).map(|c| at(r, c))))
            .collect(),
        _ => Err(EmcError::InvalidArgument(format!(
            "axis {} out of range for a 2-D array",
            axis
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_at_known_latitudes() {
        let w = get_weights(&[0.0, 60.0, 90.0, -60.0]);
        assert!((w[0] - 1.0).abs() < 1e-12);
        assert!((w[1] - 0.5).abs() < 1e-12);
        assert!(w[2].abs() < 1e-12);
        assert!((w[3] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_mean() {
        let m = get_weighted_mean(&[1.0, 3.0], &[3.0, 1.0]).unwrap();
        assert!((m - 1.5).abs() < 1e-12);
        assert!(get_weighted_mean(&[1.0], &[1.0, 2.0]).is_err());
        assert!(get_weighted_mean(&[1.0], &[0.0]).is_err());
    }

    #[test]
    fn test_weighted_mean_axis() {
        // [[1, 2], [3, 4]]
        let data = [1.0, 2.0, 3.0, 4.0];
        let weights = [1.0, 1.0, 3.0, 1.0];
        let cols = weighted_mean_axis(&data, &weights, [2, 2], 0).unwrap();
        assert!((cols[0] - 2.5).abs() < 1e-12);
        assert!((cols[1] - 3.0).abs() < 1e-12);
        let rows = weighted_mean_axis(&data, &weights, [2, 2], 1).unwrap();
        assert!((rows[0] - 1.5).abs() < 1e-12);
        assert!((rows[1] - 3.25).abs() < 1e-12);
        assert!(weighted_mean_axis(&data, &weights, [2, 2], 2).is_err());
    }
}
