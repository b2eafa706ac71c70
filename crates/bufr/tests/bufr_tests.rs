//! Radiance extraction over in-memory and dumped subsets.

use std::io::Write;

use bufr::{BufrCodes, BufrError, DumpSource, MemorySource, ReadBufr, Subset};
use test_utils::radiance::{BRIGHTNESS_TEMPERATURE, CHANNELS};
use test_utils::{require_test_file, temp_test_dir};

const N19: f64 = 223.0;
const METOP_B: f64 = 3.0;
const AMSUA: f64 = 570.0;
const MHS: f64 = 203.0;

fn channels() -> Vec<f64> {
    CHANNELS.iter().map(|&c| f64::from(c)).collect()
}

fn spot(said: f64, siid: f64, lat: f64, lon: f64) -> Subset {
    Subset::new()
        .with("SAID", said)
        .with("SIID", siid)
        .with("FOVN", 15.0)
        .with("YEAR", 2024.0)
        .with("MNTH", 1.0)
        .with("DAYS", 15.0)
        .with("HOUR", 12.0)
        .with("MINU", 3.0)
        .with("SECO", 7.0)
        .with("CLAT", lat)
        .with("CLON", lon)
        .with("SAZA", 12.5)
        .with("SOZA", 48.0)
        .with("BEARAZ", 101.0)
        .with("SOLAZI", 200.0)
        .with_replicated("CHNM", &channels())
        .with_replicated("TMBR", &BRIGHTNESS_TEMPERATURE)
}

// ============================================================================
// In-memory sources
// ============================================================================

#[test]
fn test_reads_matching_subsets_only() {
    let source = MemorySource::new(vec![
        vec![spot(N19, AMSUA, 10.0, 100.0), spot(METOP_B, AMSUA, 11.0, 101.0)],
        vec![spot(N19, MHS, 12.0, 102.0), spot(N19, AMSUA, 13.0, 103.0)],
    ]);
    let table = ReadBufr::new(source).read_radiance("amsua", "n19").unwrap();

    assert_eq!(table.len(), 2 * CHANNELS.len());
    assert_eq!(table.channels(), CHANNELS.to_vec());
    let (lat, lon, tb) = table.map_columns(1);
    assert_eq!(lat, vec![10.0, 13.0]);
    assert_eq!(lon, vec![100.0, 103.0]);
    assert_eq!(tb, vec![BRIGHTNESS_TEMPERATURE[0]; 2]);

    let row = &table.rows[0];
    assert_eq!(row.datetime, "20240115120307");
    assert_eq!(row.satellite_zenith_angle, 12.5);
    assert_eq!(row.solar_zenith_angle, 48.0);
    assert_eq!(row.bearing_or_azimuth, 101.0);
    assert_eq!(row.solar_azimuth, 200.0);
}

#[test]
fn test_high_resolution_location_fallback() {
    let subset = Subset::new()
        .with("SAID", N19)
        .with("SIID", AMSUA)
        .with("CLATH", -33.25)
        .with("CLONH", 151.5)
        .with_replicated("CHNM", &[4.0])
        .with_replicated("TMBR", &[255.0]);
    let table = ReadBufr::new(MemorySource::new(vec![vec![subset]]))
        .read_radiance("amsua", "n19")
        .unwrap();
    assert_eq!((table.rows[0].latitude, table.rows[0].longitude), (-33.25, 151.5));
}

#[test]
fn test_unknown_names() {
    let mut reader = ReadBufr::new(MemorySource::default());
    let err = reader.read_radiance("amsua", "n99").unwrap_err();
    assert!(matches!(err, BufrError::UnknownCode { ref kind, .. } if kind == "satellite"));
    let err = reader.read_radiance("microwave", "n19").unwrap_err();
    assert!(err.to_string().contains("abi | amsua | amsub | atms"));
}

#[test]
fn test_short_brightness_temperatures() {
    let subset = spot(N19, AMSUA, 0.0, 0.0).with_replicated("TMBR", &[200.0]);
    let err = ReadBufr::new(MemorySource::new(vec![vec![subset]]))
        .read_radiance("amsua", "n19")
        .unwrap_err();
    assert!(matches!(err, BufrError::Subset(_)));
}

#[test]
fn test_custom_code_table() {
    let codes = BufrCodes::from_yaml("sensor: {mw: 570}\nsatellite: {bird: 3}\n").unwrap();
    let source = MemorySource::new(vec![vec![spot(METOP_B, AMSUA, 1.0, 2.0)]]);
    let table = ReadBufr::with_codes(source, codes).read_radiance("mw", "bird").unwrap();
    assert_eq!(table.len(), CHANNELS.len());
}

// ============================================================================
// Dump files
// ============================================================================

#[test]
fn test_dump_file() {
    let dir = temp_test_dir();
    let path = dir.path().join("1bamua.jsonl");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        r#"[{{"SAID": 223, "SIID": 570, "YEAR": 2024, "MNTH": 1, "DAYS": 15, "HOUR": 18, "MINU": 0, "SECO": 0, "CLAT": 40.0, "CLON": 255.0, "SAZA": 1.0, "SOZA": 2.0, "BEARAZ": 3.0, "SOLAZI": 4.0, "CHNM": [1, 2, 3], "TMBR": [190.0, 176.0, null]}}]"#
    )
    .unwrap();
    writeln!(file, r#"[{{"SAID": 3, "SIID": 570, "CHNM": [1], "TMBR": [200.0]}}]"#).unwrap();
    drop(file);

    let table = ReadBufr::new(DumpSource::open(&path).unwrap())
        .read_radiance("amsua", "n19")
        .unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(table.rows[0].datetime, "20240115180000");
    assert!(table.brightness_temperature(3)[0].is_nan());
}

#[test]
fn test_missing_dump_file() {
    assert!(matches!(DumpSource::open("/no/such/dump.jsonl"), Err(BufrError::Io(_))));
}

#[test]
fn test_real_dump() {
    let path = require_test_file!("gdas.1bamua.tm00.jsonl");
    let table = ReadBufr::new(DumpSource::open(&path).unwrap())
        .read_radiance("amsua", "n19")
        .unwrap();
    assert!(table.channels().iter().all(|c| (1..=15).contains(c)));
}
