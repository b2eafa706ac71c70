//! Miller cylindrical projection.
//!
//! `y = 1.25 * ln(tan(pi/4 + 0.4 * lat))`, which keeps the poles finite.

use std::f64::consts::FRAC_PI_4;

use crate::{wrap_dlon, EARTH_RADIUS};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Miller {
    pub central_longitude: f64,
}

impl Miller {
    pub fn new(central_longitude: f64) -> Self {
        Self { central_longitude }
    }

    pub fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        let phi = lat.clamp(-90.0, 90.0).to_radians();
        let x = EARTH_RADIUS * wrap_dlon(lon - self.central_longitude).to_radians();
        let y = EARTH_RADIUS * 1.25 * (FRAC_PI_4 + 0.4 * phi).tan().ln();
        (x, y)
    }

    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let lon = (x / EARTH_RADIUS).to_degrees() + self.central_longitude;
        let phi = 2.5 * ((0.8 * y / EARTH_RADIUS).exp().atan() - FRAC_PI_4);
        (lon, phi.to_degrees())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let p = Miller::new(0.0);
        for &(lon, lat) in &[(10.0, 20.0), (-120.0, -60.0), (45.0, 85.0)] {
            let (x, y) = p.forward(lon, lat);
            let (lon2, lat2) = p.inverse(x, y);
            assert!((lon - lon2).abs() < 1e-9);
            assert!((lat - lat2).abs() < 1e-9);
        }
    }

    #[test]
    fn test_pole_is_finite() {
        let (_, y) = Miller::new(0.0).forward(0.0, 90.0);
        assert!(y.is_finite());
        // stretches more than equirectangular at high latitude
        assert!(y > EARTH_RADIUS * 80f64.to_radians());
    }
}
