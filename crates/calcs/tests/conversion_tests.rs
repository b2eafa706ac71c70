//! Tests for unit conversions and wind transforms.

use calcs::units::*;
use calcs::wind::{spddir_to_uv_slice, uv_to_spddir_slice};
use calcs::{spddir_to_uv, uv_to_spddir};

fn close(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() < tol
}

// ============================================================================
// Temperature tests
// ============================================================================

#[test]
fn test_kelvin_conversions() {
    assert!(close(k_to_c(273.15), 0.0, 1e-12));
    assert!(close(k_to_f(273.15), 32.0, 1e-9));
    assert!(close(c_to_k(0.0), 273.15, 1e-12));
}

#[test]
fn test_celsius_fahrenheit() {
    assert!(close(c_to_f(0.0), 32.0, 1e-12));
    assert!(close(c_to_f(-40.0), -40.0, 1e-12));
    assert!(close(f_to_c(212.0), 100.0, 1e-12));
    assert!(close(f_to_k(32.0), 273.15, 1e-9));
}

// ============================================================================
// Speed and length tests
// ============================================================================

#[test]
fn test_speed_conversions() {
    assert!(close(mps_to_mph(10.0), 22.369, 1e-9));
    assert!(close(mph_to_mps(22.369), 10.0, 1e-9));
    assert!(close(knots_to_mps(mps_to_knots(7.5)), 7.5, 1e-12));
}

#[test]
fn test_length_conversions() {
    assert!(close(mm_to_inches(25.4), 1.0, 1e-12));
    assert!(close(inches_to_mm(2.0), 50.8, 1e-12));
}

#[test]
fn test_convert_slice_in_place() {
    let mut values = vec![0.0_f64, 100.0, -40.0];
    convert_slice(&mut values, c_to_f);
    assert!(close(values[0], 32.0, 1e-12));
    assert!(close(values[1], 212.0, 1e-12));
    assert!(close(values[2], -40.0, 1e-12));
}

// ============================================================================
// Wind tests
// ============================================================================

#[test]
fn test_wind_round_trip() {
    let cases = [(3.0, 4.0), (-7.5, 2.0), (0.5, -12.0), (-1.0, -1.0)];
    for (u, v) in cases {
        let (spd, dir) = uv_to_spddir(u, v);
        assert!((0.0..360.0).contains(&dir));
        let (u2, v2) = spddir_to_uv(spd, dir);
        assert!(close(u, u2, 1e-9), "u {} -> {}", u, u2);
        assert!(close(v, v2, 1e-9), "v {} -> {}", v, v2);
    }
}

#[test]
fn test_speed_is_magnitude() {
    let (spd, _) = uv_to_spddir(3.0, 4.0);
    assert!(close(spd, 5.0, 1e-12));
}

#[test]
fn test_slice_versions() {
    let (spd, dir) = uv_to_spddir_slice(&[10.0, 0.0], &[0.0, 10.0]).unwrap();
    assert!(close(spd[0], 10.0, 1e-12));
    assert!(close(dir[0], 270.0, 1e-9));
    assert!(close(dir[1], 180.0, 1e-9));

    let (u, v) = spddir_to_uv_slice(&spd, &dir).unwrap();
    assert!(close(u[0], 10.0, 1e-9));
    assert!(close(v[1], 10.0, 1e-9));
}

#[test]
fn test_slice_length_mismatch() {
    assert!(uv_to_spddir_slice(&[1.0, 2.0], &[1.0]).is_err());
    assert!(spddir_to_uv_slice(&[1.0], &[]).is_err());
}
