//! Orthographic projection, used for the polar map views.

use crate::EARTH_RADIUS;

/// View of the globe from infinitely far above `(central_longitude, central_latitude)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orthographic {
    pub central_longitude: f64,
    pub central_latitude: f64,
}

impl Orthographic {
    pub fn new(central_longitude: f64, central_latitude: f64) -> Self {
        Self {
            central_longitude,
            central_latitude,
        }
    }

    /// Project a point, `None` when it lies on the far hemisphere.
    pub fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let phi = lat.to_radians();
        let phi0 = self.central_latitude.to_radians();
        let dlam = (lon - self.central_longitude).to_radians();

        let cos_c = phi0.sin() * phi.sin() + phi0.cos() * phi.cos() * dlam.cos();
        if cos_c < -1e-12 {
            return None;
        }
        let x = EARTH_RADIUS * phi.cos() * dlam.sin();
        let y = EARTH_RADIUS * (phi0.cos() * phi.sin() - phi0.sin() * phi.cos() * dlam.cos());
        Some((x, y))
    }

    /// Inverse transform, `None` outside the visible disk.
    pub fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let rho = (x * x + y * y).sqrt();
        if rho > EARTH_RADIUS * (1.0 + 1e-12) {
            return None;
        }
        let phi0 = self.central_latitude.to_radians();
        if rho < 1e-9 {
            return Some((self.central_longitude, self.central_latitude));
        }
        let c = (rho / EARTH_RADIUS).min(1.0).asin();
        let (sin_c, cos_c) = c.sin_cos();
        let phi = (cos_c * phi0.sin() + y * sin_c * phi0.cos() / rho).clamp(-1.0, 1.0).asin();
        let lam = (x * sin_c).atan2(rho * phi0.cos() * cos_c - y * phi0.sin() * sin_c);
        let lon = crate::wrap_dlon(self.central_longitude + lam.to_degrees());
        Some((lon, phi.to_degrees()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_north_pole_view() {
        let p = Orthographic::new(0.0, 90.0);
        let (x, y) = p.forward(0.0, 90.0).unwrap();
        assert!(x.abs() < 1e-6 && y.abs() < 1e-6);
        // equator is on the limb
        let (x, y) = p.forward(90.0, 0.0).unwrap();
        assert!(((x * x + y * y).sqrt() - EARTH_RADIUS).abs() < 1e-3);
        // southern hemisphere is hidden
        assert!(p.forward(0.0, -30.0).is_none());
    }

    #[test]
    fn test_inverse_round_trip() {
        let p = Orthographic::new(-100.0, 90.0);
        let (x, y) = p.forward(-80.0, 60.0).unwrap();
        let (lon, lat) = p.inverse(x, y).unwrap();
        assert!((lon + 80.0).abs() < 1e-9, "lon {}", lon);
        assert!((lat - 60.0).abs() < 1e-9, "lat {}", lat);
        assert!(p.inverse(EARTH_RADIUS * 2.0, 0.0).is_none());
    }
}
