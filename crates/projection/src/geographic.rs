//! Plate Carrée (equirectangular) projection.

use crate::{wrap_dlon, EARTH_RADIUS};

/// Equirectangular projection around a central longitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlateCarree {
    pub central_longitude: f64,
}

impl PlateCarree {
    pub fn new(central_longitude: f64) -> Self {
        Self { central_longitude }
    }

    pub fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        let x = EARTH_RADIUS * wrap_dlon(lon - self.central_longitude).to_radians();
        let y = EARTH_RADIUS * lat.to_radians();
        (x, y)
    }

    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let lon = (x / EARTH_RADIUS).to_degrees() + self.central_longitude;
        let lat = (y / EARTH_RADIUS).to_degrees();
        (lon, lat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_at_central_longitude() {
        let p = PlateCarree::new(-97.5);
        let (x, y) = p.forward(-97.5, 0.0);
        assert!(x.abs() < 1e-6 && y.abs() < 1e-6);
    }

    #[test]
    fn test_wraps_across_dateline() {
        let p = PlateCarree::new(180.0);
        let (x_east, _) = p.forward(-170.0, 0.0);
        let (x_west, _) = p.forward(170.0, 0.0);
        assert!(x_east > 0.0 && x_west < 0.0);
    }
}
