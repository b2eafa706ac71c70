//! Tests for map projections and domain bounds.

use emc_common::Extent;
use projection::{Domain, MapProjection, Projection, ProjectionKind, EARTH_RADIUS};

// ============================================================================
// Round trip tests
// ============================================================================

#[test]
fn test_every_projection_inverts_visible_points() {
    let points = [(-97.5, 37.5), (-80.0, 45.0), (-110.0, 30.0)];
    for name in ProjectionKind::NAMES {
        let proj = MapProjection::new(name, -97.5, 0.0).unwrap();
        for &(lon, lat) in &points {
            let Some((x, y)) = proj.forward(lon, lat) else {
                continue;
            };
            let (lon2, lat2) = proj.inverse(x, y).unwrap();
            assert!((lon - lon2).abs() < 1e-6, "{}: lon {} vs {}", name, lon, lon2);
            assert!((lat - lat2).abs() < 1e-6, "{}: lat {} vs {}", name, lat, lat2);
        }
    }
}

#[test]
fn test_polar_hides_opposite_hemisphere() {
    let proj = MapProjection::new("spstere", 0.0, 0.0).unwrap();
    assert!(proj.forward(0.0, 45.0).is_none());
    assert!(proj.forward(0.0, -45.0).is_some());
}

// ============================================================================
// Bounds tests
// ============================================================================

#[test]
fn test_plate_carree_global_bounds() {
    let proj = MapProjection::default();
    let (xmin, xmax, ymin, ymax) = proj.projected_bounds(&Extent::global()).unwrap();
    let half = std::f64::consts::PI * EARTH_RADIUS;
    assert!((xmin + half).abs() < 1.0);
    assert!((xmax - half).abs() < 1.0);
    assert!((ymin + half / 2.0).abs() < 1.0);
    assert!((ymax - half / 2.0).abs() < 1.0);
}

#[test]
fn test_north_polar_disk_bounds() {
    let proj = MapProjection::new("npstere", 0.0, 0.0).unwrap();
    let (xmin, xmax, ymin, ymax) = proj.projected_bounds(&Extent::global()).unwrap();
    for v in [xmin, xmax, ymin, ymax] {
        assert!(v.abs() <= EARTH_RADIUS * 1.0001);
    }
    assert!(xmax - xmin > EARTH_RADIUS);
}

#[test]
fn test_lambert_conus_bounds_are_finite() {
    let domain = Domain::new("conus").unwrap();
    let proj = MapProjection::new("lambert", domain.cenlon, domain.cenlat).unwrap();
    let (xmin, xmax, ymin, ymax) = proj.projected_bounds(&domain.extent).unwrap();
    assert!(xmin < 0.0 && xmax > 0.0);
    assert!(ymin < 0.0 && ymax > 0.0);
}

#[test]
fn test_custom_domain() {
    let d = Domain::custom(
        Extent::new(0.0, 20.0, 40.0, 60.0),
        vec![0.0, 10.0, 20.0],
        vec![40.0, 50.0, 60.0],
        10.0,
        50.0,
    )
    .unwrap();
    assert_eq!(d.name, "custom");
    assert!(Domain::custom(Extent::new(10.0, 0.0, 0.0, 1.0), vec![], vec![], 0.0, 0.0).is_err());
}
