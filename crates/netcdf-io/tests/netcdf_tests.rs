//! Reading files written with the netcdf library itself.

use std::path::{Path, PathBuf};

use netcdf_io::{list_variables, read_netcdf_var, variable_exists, DiagFile, NetCdfError, VarSelect};
use test_utils::{require_test_file, temp_test_dir_with_prefix};

const NOBS: usize = 5;

/// Small wind diagnostic file with one observation outside every filter.
fn write_uv_diag(path: &Path) {
    let mut file = netcdf::create(path).unwrap();
    file.add_dimension("nobs", NOBS).unwrap();

    let columns: [(&str, [f64; NOBS]); 8] = [
        ("Latitude", [35.0, 40.0, 45.0, -10.0, 50.0]),
        ("Longitude", [250.0, 260.0, 270.0, 280.0, 290.0]),
        ("Pressure", [850.0, 500.0, 250.0, 700.0, 50.0]),
        ("Analysis_Use_Flag", [1.0, 1.0, 1.0, -1.0, 1.0]),
        ("Errinv_Final", [0.5, 0.4, 0.25, 0.5, 0.5]),
        ("u_Observation", [5.0, 12.0, 30.0, -3.0, 8.0]),
        ("u_Obs_Minus_Forecast_adjusted", [0.5, -1.0, 2.0, 0.1, -0.2]),
        ("v_Observation", [-2.0, 4.0, 1.0, 0.0, 3.0]),
    ];
    for (name, values) in columns {
        let mut var = file.add_variable::<f64>(name, &["nobs"]).unwrap();
        var.put_values(&values, ..).unwrap();
    }

    let mut codes = file.add_variable::<i32>("Observation_Type", &["nobs"]).unwrap();
    codes.put_values(&[187i32, 287, 187, 187, 220], ..).unwrap();
}

/// `temp[time=2, lev=3, lat=2, lon=2]` with one fill value.
fn write_forecast(path: &Path) {
    let mut file = netcdf::create(path).unwrap();
    for (name, len) in [("time", 2), ("lev", 3), ("lat", 2), ("lon", 2)] {
        file.add_dimension(name, len).unwrap();
    }
    let mut temp = file
        .add_variable::<f32>("temp", &["time", "lev", "lat", "lon"])
        .unwrap();
    temp.set_fill_value(-999.0f32).unwrap();
    let mut values: Vec<f32> = (0..24).map(|i| 250.0 + i as f32).collect();
    values[5] = -999.0;
    temp.put_values(&values, ..).unwrap();

    let mut lat = file.add_variable::<f64>("lat", &["lat"]).unwrap();
    lat.put_values(&[10.0, 20.0], ..).unwrap();
}

fn fixture(writer: fn(&Path), name: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = temp_test_dir_with_prefix("netcdf_io_");
    let path = dir.path().join(name);
    writer(&path);
    (dir, path)
}

// ============================================================================
// Generic variable access
// ============================================================================

#[test]
fn test_list_and_exists() {
    let (_dir, path) = fixture(write_forecast, "forecast.nc");
    let mut names = list_variables(&path).unwrap();
    names.sort();
    assert_eq!(names, vec!["lat".to_string(), "temp".to_string()]);
    assert!(variable_exists(&path, "temp").unwrap());
    assert!(!variable_exists(&path, "salt").unwrap());
}

#[test]
fn test_read_whole_variable() {
    let (_dir, path) = fixture(write_forecast, "forecast.nc");
    let lat = read_netcdf_var(&path, "lat", VarSelect::all()).unwrap();
    assert_eq!(lat.shape, vec![2]);
    assert_eq!(lat.data, vec![10.0, 20.0]);

    let temp = read_netcdf_var(&path, "temp", VarSelect::default()).unwrap();
    assert_eq!(temp.shape, vec![2, 3, 2, 2]);
    assert!(temp.data[5].is_nan());
    assert_eq!(temp.data[6], 256.0);
}

#[test]
fn test_read_time_and_level() {
    let (_dir, path) = fixture(write_forecast, "forecast.nc");
    let slab = read_netcdf_var(&path, "temp", VarSelect::time_level(1, 2)).unwrap();
    assert_eq!(slab.shape, vec![2, 2]);
    assert_eq!(slab.data, vec![270.0, 271.0, 272.0, 273.0]);

    let first = read_netcdf_var(&path, "temp", VarSelect::from_indices(false, 0, -1)).unwrap();
    assert_eq!(first.shape, vec![3, 2, 2]);
}

#[test]
fn test_missing_variable() {
    let (_dir, path) = fixture(write_forecast, "forecast.nc");
    let err = read_netcdf_var(&path, "salt", VarSelect::all()).unwrap_err();
    assert!(matches!(err, NetCdfError::MissingData(_)));
    assert!(err.to_string().contains("salt"));
}

#[test]
fn test_missing_file() {
    let err = read_netcdf_var("/no/such/file.nc4", "temp", VarSelect::all()).unwrap_err();
    assert_eq!(err.to_string(), "Unable to open /no/such/file.nc4");
}

// ============================================================================
// Diagnostic files
// ============================================================================

#[test]
fn test_diag_getters() {
    let (_dir, path) = fixture(write_uv_diag, "diag_conv_uv_ges.2024011518.nc4");
    let diag = DiagFile::open(&path).unwrap();
    assert_eq!(diag.observation_type().unwrap(), vec![187, 287, 187, 187, 220]);
    assert_eq!(diag.latitude().unwrap()[3], -10.0);
    assert_eq!(diag.pressure().unwrap().len(), NOBS);
    assert_eq!(diag.analysis_use_flag().unwrap()[3], -1.0);
    assert_eq!(diag.errinv_final().unwrap()[2], 0.25);
    assert_eq!(diag.observation("u").unwrap()[1], 12.0);
    assert_eq!(diag.observation("v").unwrap()[4], 3.0);
    assert_eq!(diag.obs_minus_forecast_adjusted("u").unwrap()[2], 2.0);
    assert!(diag.has_variable("Longitude"));
}

#[test]
fn test_diag_missing_innovation() {
    let (_dir, path) = fixture(write_uv_diag, "diag_conv_uv_ges.2024011518.nc4");
    let diag = DiagFile::open(&path).unwrap();
    // the fixture has no v innovations
    assert!(matches!(
        diag.obs_minus_forecast_adjusted("v"),
        Err(NetCdfError::MissingData(_))
    ));
}

#[test]
fn test_real_diag_file() {
    let path = require_test_file!("diag_conv_t_ges.2024011518.nc4");
    let diag = DiagFile::open(&path).unwrap();
    let n = diag.observation_type().unwrap().len();
    assert_eq!(diag.observation("t").unwrap().len(), n);
    assert_eq!(diag.obs_minus_forecast_adjusted("t").unwrap().len(), n);
}
