//! Geographic extent used for map domains and data bounds.

use serde::{Deserialize, Serialize};

/// A lon/lat rectangle in degrees.
///
/// Field order follows the `(lon_min, lon_max, lat_min, lat_max)` convention
/// used by map extents, not the `(minx, miny, maxx, maxy)` order of a bbox.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl Extent {
    pub fn new(lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> Self {
        Self {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
        }
    }

    /// The whole globe.
    pub fn global() -> Self {
        Self::new(-180.0, 180.0, -90.0, 90.0)
    }

    /// Build from a 4-element slice `[lon_min, lon_max, lat_min, lat_max]`.
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [a, b, c, d] => Some(Self::new(*a, *b, *c, *d)),
            _ => None,
        }
    }

    /// Longitudinal span in degrees.
    pub fn width(&self) -> f64 {
        self.lon_max - self.lon_min
    }

    /// Latitudinal span in degrees.
    pub fn height(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    /// Centre of the extent as (lon, lat).
    pub fn center(&self) -> (f64, f64) {
        (
            (self.lon_min + self.lon_max) / 2.0,
            (self.lat_min + self.lat_max) / 2.0,
        )
    }

    /// Check whether a point lies inside (inclusive).
    ///
    /// Longitudes are compared after wrapping into the extent's range, so a
    /// 0..360 observation longitude matches a -180..180 extent.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        if lat < self.lat_min || lat > self.lat_max {
            return false;
        }
        let lon = wrap_longitude(lon, self.lon_min);
        lon >= self.lon_min && lon <= self.lon_max
    }

    /// Check if this extent intersects another.
    pub fn intersects(&self, other: &Extent) -> bool {
        self.lon_min < other.lon_max
            && self.lon_max > other.lon_min
            && self.lat_min < other.lat_max
            && self.lat_max > other.lat_min
    }

    /// Grow the extent by a fraction of its size on every side.
    pub fn padded(&self, fraction: f64) -> Self {
        let dx = self.width() * fraction;
        let dy = self.height() * fraction;
        Self::new(
            self.lon_min - dx,
            self.lon_max + dx,
            (self.lat_min - dy).max(-90.0),
            (self.lat_max + dy).min(90.0),
        )
    }
}

/// Shift `lon` by multiples of 360 so it is not below `start`.
pub fn wrap_longitude(lon: f64, start: f64) -> f64 {
    let mut lon = lon;
    while lon < start {
        lon += 360.0;
    }
    while lon >= start + 360.0 {
        lon -= 360.0;
    }
    lon
}
