//! Fixed values shared by tests across the workspace.

/// Map extents as `(lon_min, lon_max, lat_min, lat_max)`.
pub mod extents {
    pub const GLOBAL: (f64, f64, f64, f64) = (-180.0, 180.0, -90.0, 90.0);
    pub const CONUS: (f64, f64, f64, f64) = (-130.0, -65.0, 20.0, 55.0);
    pub const NORTH_AMERICA: (f64, f64, f64, f64) = (-170.0, -50.0, 7.5, 75.0);
    pub const EUROPE: (f64, f64, f64, f64) = (-12.5, 40.0, 30.0, 70.0);
    /// Crosses the dateline
    pub const PACIFIC: (f64, f64, f64, f64) = (160.0, 220.0, -50.0, 50.0);
}

/// Analysis cycles and dates.
pub mod cycles {
    /// `YYYYMMDDHH` of a reference cycle
    pub const REFERENCE_CYCLE: &str = "2024011512";
    pub const CYCLE_HOURS: [&str; 4] = ["00", "06", "12", "18"];
}

/// AMSU-A on NOAA-19: channels and brightness temperatures typical of a
/// clear-sky tropical scene, channel 1 first.
pub mod radiance {
    pub const SENSOR: &str = "amsua_n19";
    pub const CHANNELS: [u32; 15] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15];
    pub const BRIGHTNESS_TEMPERATURE: [f64; 15] = [
        190.2, 175.8, 240.1, 255.3, 250.6, 237.9, 227.4, 219.8, 213.5, 218.2, 225.0, 233.1, 241.6, 250.3, 270.4,
    ];
}

/// A small GeoJSON coastline: the outline of a square island.
pub const ISLAND_GEOJSON: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": {"name": "test island"},
      "geometry": {
        "type": "Polygon",
        "coordinates": [[[-100.0, 30.0], [-90.0, 30.0], [-90.0, 40.0], [-100.0, 40.0], [-100.0, 30.0]]]
      }
    }
  ]
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radiance_fixture_lengths() {
        assert_eq!(radiance::CHANNELS.len(), radiance::BRIGHTNESS_TEMPERATURE.len());
    }

    #[test]
    fn test_extents_ordered() {
        for e in [extents::GLOBAL, extents::CONUS, extents::NORTH_AMERICA, extents::EUROPE] {
            assert!(e.0 < e.1 && e.2 < e.3);
        }
    }

    #[test]
    fn test_island_is_closed_ring() {
        assert!(ISLAND_GEOJSON.contains("[-100.0, 30.0], [-90.0, 30.0]"));
        assert!(ISLAND_GEOJSON.trim_end().ends_with('}'));
    }
}
