//! Tests for number rounding, extents and JSON persistence.

use emc_common::utils::{load_json, save_json};
use emc_common::{round_number, Extent};

// ============================================================================
// round_number tests
// ============================================================================

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

#[test]
fn test_round_number_small_values() {
    assert_close(round_number(0.01231), 0.01);
    assert_close(round_number(0.0164), 0.02);
}

#[test]
fn test_round_number_single_digit() {
    assert_close(round_number(2.3), 2.0);
    assert_close(round_number(2.8), 3.0);
    assert_close(round_number(6.2), 6.0);
}

#[test]
fn test_round_number_tens_and_hundreds() {
    assert_close(round_number(12.8), 10.0);
    assert_close(round_number(16.8), 20.0);
    assert_close(round_number(59.0), 60.0);
    assert_close(round_number(141.0), 100.0);
    assert_close(round_number(161.0), 200.0);
}

#[test]
fn test_round_number_keeps_sign() {
    assert_close(round_number(-59.0), -60.0);
    assert_close(round_number(0.0), 0.0);
}

// ============================================================================
// Extent tests
// ============================================================================

#[test]
fn test_extent_from_slice() {
    let e = Extent::from_slice(&[-130.0, -65.0, 20.0, 55.0]).unwrap();
    assert_eq!(e.width(), 65.0);
    assert_eq!(e.height(), 35.0);
    assert_eq!(e.center(), (-97.5, 37.5));
    assert!(Extent::from_slice(&[1.0, 2.0]).is_none());
}

#[test]
fn test_extent_intersects() {
    let conus = Extent::new(-130.0, -65.0, 20.0, 55.0);
    let europe = Extent::new(-12.5, 40.0, 30.0, 70.0);
    assert!(!conus.intersects(&europe));
    assert!(Extent::global().intersects(&europe));
}

// ============================================================================
// JSON persistence tests
// ============================================================================

#[test]
fn test_json_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("extent.json");
    let extent = Extent::new(-170.0, -50.0, 7.5, 75.0);

    save_json(&path, &extent).unwrap();
    let loaded: Extent = load_json(&path).unwrap();
    assert_eq!(loaded, extent);
}

#[test]
fn test_load_json_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result: emc_common::EmcResult<Extent> = load_json(dir.path().join("missing.json"));
    assert!(result.is_err());
}
