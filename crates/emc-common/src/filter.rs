//! Quality-control filtering of conventional observations.
//!
//! Produces a boolean mask over diagnostic-file columns: an observation is
//! kept when its bufr code is requested, its use flag is 1, its inverse
//! error lies within `[1/error_max, 1/error_min]`, and its latitude,
//! longitude (0..360) and pressure fall inside inclusive bounds.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EmcError, EmcResult};

/// Column views of the observation variables used for filtering.
#[derive(Debug, Clone, Copy)]
pub struct ObsColumns<'a> {
    /// Observation_Type (bufr report type)
    pub code: &'a [i32],
    /// Errinv_Final
    pub errinv: &'a [f64],
    pub lat: &'a [f64],
    pub lon: &'a [f64],
    pub pressure: &'a [f64],
    /// Analysis_Use_Flag
    pub use_flag: &'a [f64],
}

impl ObsColumns<'_> {
    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    fn check_lengths(&self) -> EmcResult<()> {
        let n = self.code.len();
        for (name, len) in [
            ("Errinv_Final", self.errinv.len()),
            ("Latitude", self.lat.len()),
            ("Longitude", self.lon.len()),
            ("Pressure", self.pressure.len()),
            ("Analysis_Use_Flag", self.use_flag.len()),
        ] {
            if len != n {
                return Err(EmcError::length_mismatch(
                    &format!("Observation_Type vs {}", name),
                    n,
                    len,
                ));
            }
        }
        Ok(())
    }
}

/// Filtering bounds. Defaults match the diagnostics script.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterBounds {
    pub p_max: f64,
    pub p_min: f64,
    pub lat_max: f64,
    pub lat_min: f64,
    pub lon_max: f64,
    pub lon_min: f64,
    pub error_max: f64,
    pub error_min: f64,
}

impl Default for FilterBounds {
    fn default() -> Self {
        Self {
            p_max: 1050.0,
            p_min: 100.0,
            lat_max: 90.0,
            lat_min: 0.0,
            lon_max: 360.0,
            lon_min: 0.0,
            error_max: 40.0,
            error_min: 0.000001,
        }
    }
}

impl FilterBounds {
    /// Replace the lat/lon bounds with a hemisphere preset.
    pub fn with_hemisphere(mut self, hem: Hemisphere) -> Self {
        let (lat_min, lat_max, lon_min, lon_max) = hem.bounds();
        self.lat_min = lat_min;
        self.lat_max = lat_max;
        self.lon_min = lon_min;
        self.lon_max = lon_max;
        self
    }
}

/// Named lat/lon presets that override [`FilterBounds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Hemisphere {
    #[serde(alias = "GLOBAL")]
    Gl,
    Nh,
    Tr,
    Sh,
    Conus,
}

impl Hemisphere {
    pub const NAMES: [&'static str; 5] = ["GL", "NH", "TR", "SH", "CONUS"];

    /// (lat_min, lat_max, lon_min, lon_max)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        match self {
            Hemisphere::Gl => (-90.0, 90.0, 0.0, 360.0),
            Hemisphere::Nh => (30.0, 90.0, 0.0, 360.0),
            Hemisphere::Tr => (-30.0, 30.0, 0.0, 360.0),
            Hemisphere::Sh => (-90.0, -30.0, 0.0, 360.0),
            Hemisphere::Conus => (27.0, 50.0, 235.0, 295.0),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Hemisphere::Gl => "GL",
            Hemisphere::Nh => "NH",
            Hemisphere::Tr => "TR",
            Hemisphere::Sh => "SH",
            Hemisphere::Conus => "CONUS",
        }
    }
}

impl FromStr for Hemisphere {
    type Err = EmcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GL" | "GLOBAL" => Ok(Hemisphere::Gl),
            "NH" => Ok(Hemisphere::Nh),
            "TR" => Ok(Hemisphere::Tr),
            "SH" => Ok(Hemisphere::Sh),
            "CONUS" => Ok(Hemisphere::Conus),
            _ => Err(EmcError::invalid_choice("hemisphere", s, &Hemisphere::NAMES)),
        }
    }
}

/// Build the mask of observations to keep.
///
/// `hem` overrides the lat/lon bounds in `bounds` when given.
pub fn filter_obs(
    obs: &ObsColumns<'_>,
    codes: &[i32],
    bounds: &FilterBounds,
    hem: Option<Hemisphere>,
) -> EmcResult<Vec<bool>> {
    obs.check_lengths()?;
    if codes.is_empty() {
        return Err(EmcError::InvalidArgument(
            "at least one bufr code is required".to_string(),
        ));
    }

    let b = match hem {
        Some(h) => bounds.with_hemisphere(h),
        None => *bounds,
    };
    let errinv_max = 1.0 / b.error_min;
    let errinv_min = 1.0 / b.error_max;

    let mask = (0..obs.len())
        .map(|i| {
            codes.contains(&obs.code[i])
                && obs.use_flag[i] == 1.0
                && obs.errinv[i] >= errinv_min
                && obs.errinv[i] <= errinv_max
                && obs.lat[i] >= b.lat_min
                && obs.lat[i] <= b.lat_max
                && obs.lon[i] >= b.lon_min
                && obs.lon[i] <= b.lon_max
                && obs.pressure[i] >= b.p_min
                && obs.pressure[i] <= b.p_max
        })
        .collect();
    Ok(mask)
}

/// Describe the active filter, e.g. for a plot title.
pub fn describe_filter(bounds: &FilterBounds, hem: Option<Hemisphere>) -> String {
    let b = match hem {
        Some(h) => bounds.with_hemisphere(h),
        None => *bounds,
    };
    let region = match hem {
        Some(h) => h.name().to_string(),
        None => format!(
            "lat {}..{} lon {}..{}",
            b.lat_min, b.lat_max, b.lon_min, b.lon_max
        ),
    };
    format!(
        "{}; p {}..{} hPa; error {}..{}",
        region, b.p_min, b.p_max, b.error_min, b.error_max
    )
}
