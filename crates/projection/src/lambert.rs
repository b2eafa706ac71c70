//! Lambert Conformal Conic projection.
//!
//! Maps a cone secant to the sphere along two standard parallels onto a flat
//! plane. Parameters:
//! - Central meridian (lon0) and latitude of origin (lat0)
//! - Standard parallels latin1 and latin2 (equal for a tangent cone)

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::{wrap_dlon, EARTH_RADIUS};

/// Lambert Conformal Conic projection on a spherical earth.
#[derive(Debug, Clone)]
pub struct LambertConformal {
    /// Central meridian in degrees
    pub lon0: f64,
    /// Latitude of origin in degrees
    pub lat0: f64,
    /// First standard parallel in degrees
    pub latin1: f64,
    /// Second standard parallel in degrees
    pub latin2: f64,
    /// Cone constant (n)
    n: f64,
    /// F constant
    f: f64,
    /// Rho at the latitude of origin
    rho0: f64,
}

impl LambertConformal {
    /// Standard parallels used for mid-latitude map domains.
    pub const DEFAULT_PARALLELS: (f64, f64) = (33.0, 45.0);

    pub fn new(lon0: f64, lat0: f64, latin1: f64, latin2: f64) -> Self {
        let phi1 = latin1.to_radians();
        let phi2 = latin2.to_radians();

        let n = if (phi1 - phi2).abs() < 1e-10 {
            // Tangent cone
            phi1.sin()
        } else {
            let ln_ratio = (phi1.cos() / phi2.cos()).ln();
            let tan_ratio = ((FRAC_PI_4 + phi2 / 2.0).tan() / (FRAC_PI_4 + phi1 / 2.0).tan()).ln();
            ln_ratio / tan_ratio
        };

        let f = (phi1.cos() * (FRAC_PI_4 + phi1 / 2.0).tan().powf(n)) / n;
        let rho0 = Self::rho_for(n, f, lat0);

        Self {
            lon0,
            lat0,
            latin1,
            latin2,
            n,
            f,
            rho0,
        }
    }

    /// Cone centred on a map domain with the default standard parallels.
    pub fn centered(cenlon: f64, cenlat: f64) -> Self {
        let (a, b) = Self::DEFAULT_PARALLELS;
        if cenlat < 0.0 {
            Self::new(cenlon, cenlat, -a, -b)
        } else {
            Self::new(cenlon, cenlat, a, b)
        }
    }

    fn rho_for(n: f64, f: f64, lat: f64) -> f64 {
        // Keep the pole opposite the cone apex finite
        let lat = lat.clamp(-89.999, 89.999).to_radians();
        EARTH_RADIUS * f / (FRAC_PI_4 + lat / 2.0).tan().powf(n)
    }

    /// Cone constant.
    pub fn cone_constant(&self) -> f64 {
        self.n
    }

    /// Geographic (degrees) to projected meters.
    pub fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        let rho = Self::rho_for(self.n, self.f, lat);
        let theta = self.n * wrap_dlon(lon - self.lon0).to_radians();
        let x = rho * theta.sin();
        let y = self.rho0 - rho * theta.cos();
        (x, y)
    }

    /// Projected meters to geographic degrees.
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let dy = self.rho0 - y;
        let mut rho = (x * x + dy * dy).sqrt();
        let (mut xs, mut dys) = (x, dy);
        if self.n < 0.0 {
            rho = -rho;
            xs = -xs;
            dys = -dys;
        }
        let theta = xs.atan2(dys);

        let lat = if rho == 0.0 {
            90f64.copysign(self.n)
        } else {
            (2.0 * (EARTH_RADIUS * self.f / rho).powf(1.0 / self.n).atan() - FRAC_PI_2).to_degrees()
        };
        let lon = self.lon0 + (theta / self.n).to_degrees();
        (lon, lat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_maps_to_zero() {
        let proj = LambertConformal::centered(-97.5, 37.5);
        let (x, y) = proj.forward(-97.5, 37.5);
        assert!(x.abs() < 1e-6, "x should be ~0, got {}", x);
        assert!(y.abs() < 1e-6, "y should be ~0, got {}", y);
    }

    #[test]
    fn test_roundtrip() {
        let proj = LambertConformal::centered(-97.5, 37.5);
        for &(lon, lat) in &[(-122.7, 21.1), (-70.0, 50.0), (-94.5, 39.0)] {
            let (x, y) = proj.forward(lon, lat);
            let (lon2, lat2) = proj.inverse(x, y);
            assert!((lon - lon2).abs() < 1e-8, "lon roundtrip failed: {} vs {}", lon, lon2);
            assert!((lat - lat2).abs() < 1e-8, "lat roundtrip failed: {} vs {}", lat, lat2);
        }
    }

    #[test]
    fn test_tangent_cone_constant() {
        let proj = LambertConformal::new(0.0, 38.5, 38.5, 38.5);
        assert!((proj.cone_constant() - 38.5f64.to_radians().sin()).abs() < 1e-12);
    }

    #[test]
    fn test_southern_cone_roundtrip() {
        let proj = LambertConformal::centered(135.0, -30.0);
        assert!(proj.cone_constant() < 0.0);
        let (x, y) = proj.forward(150.0, -35.0);
        let (lon, lat) = proj.inverse(x, y);
        assert!((lon - 150.0).abs() < 1e-8);
        assert!((lat + 35.0).abs() < 1e-8);
    }

    #[test]
    fn test_north_is_up() {
        let proj = LambertConformal::centered(-97.5, 37.5);
        let (_, y_south) = proj.forward(-97.5, 25.0);
        let (_, y_north) = proj.forward(-97.5, 50.0);
        assert!(y_north > y_south);
    }
}
