//! Map domains and projections.
//!
//! Implements the projections used by map plots from scratch on a spherical
//! earth: Plate Carrée, Miller cylindrical, polar orthographic and Lambert
//! conformal conic.

pub mod domain;
pub mod geographic;
pub mod lambert;
pub mod map_projection;
pub mod miller;
pub mod orthographic;

pub use domain::Domain;
pub use geographic::PlateCarree;
pub use lambert::LambertConformal;
pub use map_projection::{MapProjection, Projection, ProjectionKind};
pub use miller::Miller;
pub use orthographic::Orthographic;

/// Spherical earth radius in meters.
pub const EARTH_RADIUS: f64 = 6_371_229.0;

/// Normalize a longitude difference in degrees to `[-180, 180)`.
pub(crate) fn wrap_dlon(dlon: f64) -> f64 {
    (dlon + 180.0).rem_euclid(360.0) - 180.0
}
