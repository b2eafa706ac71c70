//! Wind speed/direction and u/v component transforms.
//!
//! Direction is meteorological: the direction the wind blows *from*, in
//! degrees clockwise from north. A westerly (u > 0, v = 0) is 270°.

use emc_common::{EmcError, EmcResult};

/// Convert u/v components to (speed, direction).
///
/// Direction is normalised to `[0, 360)`.
pub fn uv_to_spddir(u: f64, v: f64) -> (f64, f64) {
    let speed = (u * u + v * v).sqrt();
    let dir = (270.0 - v.atan2(u).to_degrees()).rem_euclid(360.0);
    (speed, dir)
}

/// Convert (speed, direction) to u/v components.
///
/// Calm wind (`speed == 0`) returns `(0, 0)` regardless of direction.
pub fn spddir_to_uv(speed: f64, direction: f64) -> (f64, f64) {
    if speed == 0.0 {
        return (0.0, 0.0);
    }
    let rad = direction.to_radians();
    (-speed * rad.sin(), -speed * rad.cos())
}

/// Element-wise [`uv_to_spddir`] over paired slices.
pub fn uv_to_spddir_slice(u: &[f64], v: &[f64]) -> EmcResult<(Vec<f64>, Vec<f64>)> {
    if u.len() != v.len() {
        return Err(EmcError::length_mismatch("u vs v", u.len(), v.len()));
    }
    Ok(u.iter().zip(v).map(|(&u, &v)| uv_to_spddir(u, v)).unzip())
}

/// Element-wise [`spddir_to_uv`] over paired slices.
pub fn spddir_to_uv_slice(speed: &[f64], direction: &[f64]) -> EmcResult<(Vec<f64>, Vec<f64>)> {
    if speed.len() != direction.len() {
        return Err(EmcError::length_mismatch(
            "speed vs direction",
            speed.len(),
            direction.len(),
        ));
    }
    Ok(speed
        .iter()
        .zip(direction)
        .map(|(&s, &d)| spddir_to_uv(s, d))
        .unzip())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinal_directions() {
        // westerly
        let (s, d) = uv_to_spddir(10.0, 0.0);
        assert!((s - 10.0).abs() < 1e-12);
        assert!((d - 270.0).abs() < 1e-9);
        // southerly
        let (_, d) = uv_to_spddir(0.0, 5.0);
        assert!((d - 180.0).abs() < 1e-9);
        // northerly
        let (_, d) = uv_to_spddir(0.0, -5.0);
        assert!(d.abs() < 1e-9 || (d - 360.0).abs() < 1e-9);
    }

    #[test]
    fn test_calm_wind() {
        assert_eq!(spddir_to_uv(0.0, 123.0), (0.0, 0.0));
    }
}
