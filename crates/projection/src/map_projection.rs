//! Projection selection by name.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use emc_common::{EmcError, EmcResult, Extent};

use crate::{LambertConformal, Miller, Orthographic, PlateCarree};

/// Forward and inverse transforms between degrees and projected meters.
pub trait Projection {
    /// `None` when the point is not visible in this projection.
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)>;
    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionKind {
    Plcarr,
    Mill,
    Npstere,
    Spstere,
    Lambert,
}

impl ProjectionKind {
    pub const NAMES: [&'static str; 5] = ["plcarr", "mill", "npstere", "spstere", "lambert"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectionKind::Plcarr => "plcarr",
            ProjectionKind::Mill => "mill",
            ProjectionKind::Npstere => "npstere",
            ProjectionKind::Spstere => "spstere",
            ProjectionKind::Lambert => "lambert",
        }
    }
}

impl FromStr for ProjectionKind {
    type Err = EmcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plcarr" => Ok(ProjectionKind::Plcarr),
            "mill" => Ok(ProjectionKind::Mill),
            "npstere" => Ok(ProjectionKind::Npstere),
            "spstere" => Ok(ProjectionKind::Spstere),
            "lambert" => Ok(ProjectionKind::Lambert),
            _ => Err(EmcError::invalid_choice("projection", s, &Self::NAMES)),
        }
    }
}

#[derive(Debug, Clone)]
enum Inner {
    Plcarr(PlateCarree),
    Mill(Miller),
    Ortho(Orthographic),
    Lambert(LambertConformal),
}

/// A named projection with its centre.
#[derive(Debug, Clone)]
pub struct MapProjection {
    pub kind: ProjectionKind,
    pub cenlon: f64,
    pub cenlat: f64,
    inner: Inner,
}

impl MapProjection {
    /// Build a projection by name.
    ///
    /// The polar projections replace a zero `cenlat` with the pole.
    pub fn new(name: &str, cenlon: f64, cenlat: f64) -> EmcResult<Self> {
        let kind: ProjectionKind = name.parse()?;
        Ok(Self::from_kind(kind, cenlon, cenlat))
    }

    pub fn from_kind(kind: ProjectionKind, cenlon: f64, cenlat: f64) -> Self {
        let cenlat = match kind {
            ProjectionKind::Npstere if cenlat == 0.0 => 90.0,
            ProjectionKind::Spstere if cenlat == 0.0 => -90.0,
            _ => cenlat,
        };
        let inner = match kind {
            ProjectionKind::Plcarr => Inner::Plcarr(PlateCarree::new(cenlon)),
            ProjectionKind::Mill => Inner::Mill(Miller::new(cenlon)),
            ProjectionKind::Npstere | ProjectionKind::Spstere => {
                Inner::Ortho(Orthographic::new(cenlon, cenlat))
            }
            ProjectionKind::Lambert => Inner::Lambert(LambertConformal::centered(cenlon, cenlat)),
        };
        debug!(projection = kind.as_str(), cenlon, cenlat, "Created map projection");
        Self {
            kind,
            cenlon,
            cenlat,
            inner,
        }
    }

    /// Polar views skip longitude/latitude tick labels.
    pub fn is_polar(&self) -> bool {
        matches!(self.kind, ProjectionKind::Npstere | ProjectionKind::Spstere)
    }

    /// Rectangular meridians and parallels.
    pub fn is_cylindrical(&self) -> bool {
        matches!(self.kind, ProjectionKind::Plcarr | ProjectionKind::Mill)
    }

    /// Projected bounding box `(xmin, xmax, ymin, ymax)` of a geographic extent.
    ///
    /// The extent boundary and interior are sampled; hidden points are
    /// skipped. Returns an error when nothing in the extent is visible.
    pub fn projected_bounds(&self, extent: &Extent) -> EmcResult<(f64, f64, f64, f64)> {
        const STEPS: usize = 48;
        if self.is_cylindrical() {
            // Sampling would wrap the eastern edge of a global extent onto the west
            let lon_offset = |lon: f64| crate::EARTH_RADIUS * (lon - self.cenlon).to_radians();
            let ymin = self.forward(self.cenlon, extent.lat_min).map(|p| p.1);
            let ymax = self.forward(self.cenlon, extent.lat_max).map(|p| p.1);
            if let (Some(ymin), Some(ymax)) = (ymin, ymax) {
                return Ok((lon_offset(extent.lon_min), lon_offset(extent.lon_max), ymin, ymax));
            }
        }
        let mut bounds = (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY);
        let mut seen = false;
        for i in 0..=STEPS {
            let lon = extent.lon_min + extent.width() * i as f64 / STEPS as f64;
            for j in 0..=STEPS {
                let lat = extent.lat_min + extent.height() * j as f64 / STEPS as f64;
                if let Some((x, y)) = self.forward(lon, lat) {
                    seen = true;
                    bounds.0 = bounds.0.min(x);
                    bounds.1 = bounds.1.max(x);
                    bounds.2 = bounds.2.min(y);
                    bounds.3 = bounds.3.max(y);
                }
            }
        }
        if !seen {
            return Err(EmcError::Projection(format!(
                "extent {:?} is not visible in {}",
                extent, self
            )));
        }
        debug!(projection = %self, ?bounds, "Sampled projected bounds");
        Ok(bounds)
    }
}

impl Projection for MapProjection {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        if !lon.is_finite() || !lat.is_finite() {
            return None;
        }
        match &self.inner {
            Inner::Plcarr(p) => Some(p.forward(lon, lat)),
            Inner::Mill(p) => Some(p.forward(lon, lat)),
            Inner::Ortho(p) => p.forward(lon, lat),
            Inner::Lambert(p) => Some(p.forward(lon, lat)),
        }
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        match &self.inner {
            Inner::Plcarr(p) => Some(p.inverse(x, y)),
            Inner::Mill(p) => Some(p.inverse(x, y)),
            Inner::Ortho(p) => p.inverse(x, y),
            Inner::Lambert(p) => Some(p.inverse(x, y)),
        }
    }
}

impl Default for MapProjection {
    fn default() -> Self {
        Self::from_kind(ProjectionKind::Plcarr, 0.0, 0.0)
    }
}

impl fmt::Display for MapProjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.as_str())
    }
}
