//! Named map domains: extent, tick locations and projection centre.

use serde::{Deserialize, Serialize};

use emc_common::{EmcError, EmcResult, Extent};

/// Geographic window of a map plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub name: String,
    pub extent: Extent,
    /// Longitude tick locations in degrees
    pub xticks: Vec<f64>,
    /// Latitude tick locations in degrees
    pub yticks: Vec<f64>,
    pub cenlon: f64,
    pub cenlat: f64,
}

fn ticks(start: f64, stop: f64, step: f64) -> Vec<f64> {
    let count = ((stop - start) / step).round() as usize;
    (0..=count).map(|i| start + i as f64 * step).collect()
}

impl Domain {
    /// Names accepted by [`Domain::new`].
    pub const NAMES: [&'static str; 4] = ["global", "north america", "conus", "europe"];

    /// Look up a predefined domain, case-insensitively.
    pub fn new(name: &str) -> EmcResult<Self> {
        let key = name.trim().to_lowercase();
        let (extent, xticks, yticks) = match key.as_str() {
            "global" => (
                Extent::new(-180.0, 180.0, -90.0, 90.0),
                ticks(-180.0, 180.0, 60.0),
                ticks(-90.0, 90.0, 30.0),
            ),
            "north america" => (
                Extent::new(-170.0, -50.0, 7.5, 75.0),
                ticks(-170.0, -50.0, 20.0),
                ticks(10.0, 70.0, 20.0),
            ),
            "conus" => (
                Extent::new(-130.0, -65.0, 20.0, 55.0),
                ticks(-130.0, -60.0, 10.0),
                ticks(25.0, 55.0, 10.0),
            ),
            "europe" => (
                Extent::new(-12.5, 40.0, 30.0, 70.0),
                ticks(-10.0, 40.0, 10.0),
                ticks(30.0, 70.0, 10.0),
            ),
            _ => return Err(EmcError::invalid_choice("domain", name, &Self::NAMES)),
        };
        let (cenlon, cenlat) = if key == "global" { (0.0, 0.0) } else { extent.center() };

        Ok(Self {
            name: key,
            extent,
            xticks,
            yticks,
            cenlon,
            cenlat,
        })
    }

    /// User-defined domain.
    pub fn custom(
        extent: Extent,
        xticks: Vec<f64>,
        yticks: Vec<f64>,
        cenlon: f64,
        cenlat: f64,
    ) -> EmcResult<Self> {
        if extent.lon_min >= extent.lon_max || extent.lat_min >= extent.lat_max {
            return Err(EmcError::InvalidArgument(format!(
                "custom domain extent is empty: {:?}",
                extent
            )));
        }
        Ok(Self {
            name: "custom".to_string(),
            extent,
            xticks,
            yticks,
            cenlon,
            cenlat,
        })
    }

    pub fn is_global(&self) -> bool {
        self.extent.width() >= 360.0 && self.extent.height() >= 180.0
    }
}

impl Default for Domain {
    fn default() -> Self {
        Self {
            name: "global".to_string(),
            extent: Extent::global(),
            xticks: ticks(-180.0, 180.0, 60.0),
            yticks: ticks(-90.0, 90.0, 30.0),
            cenlon: 0.0,
            cenlat: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conus_table() {
        let d = Domain::new("CONUS").unwrap();
        assert_eq!(d.name, "conus");
        assert_eq!(d.xticks.len(), 8);
        assert_eq!(d.xticks[0], -130.0);
        assert_eq!(d.xticks[7], -60.0);
        assert_eq!(d.yticks, vec![25.0, 35.0, 45.0, 55.0]);
        assert_eq!((d.cenlon, d.cenlat), (-97.5, 37.5));
    }

    #[test]
    fn test_global_is_default() {
        assert_eq!(Domain::new("global").unwrap(), Domain::default());
        assert!(Domain::default().is_global());
    }

    #[test]
    fn test_unknown_domain_lists_choices() {
        let err = Domain::new("antarctica").unwrap_err().to_string();
        assert!(err.contains("antarctica is not a valid domain"));
        assert!(err.contains("global | north america | conus | europe"));
    }
}
