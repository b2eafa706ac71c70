//! Satellite radiance extraction.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::codes::BufrCodes;
use crate::error::{BufrError, BufrResult};
use crate::source::SubsetSource;

/// Satellite, sensor, field of view, time and location of a scan spot.
pub const HEADER_1: &str = "SAID SIID FOVN YEAR MNTH DAYS HOUR MINU SECO CLAT CLON CLATH CLONH HOLS";
/// Viewing geometry of a scan spot.
pub const HEADER_2: &str = "SAZA SOZA BEARAZ SOLAZI";
pub const CHANNEL: &str = "CHNM";
pub const BRIGHTNESS_TEMPERATURE: &str = "TMBR";

/// One channel of one scan spot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadianceRow {
    /// `yyyymmddhhmmss`
    pub datetime: String,
    pub channel: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub satellite_zenith_angle: f64,
    pub solar_zenith_angle: f64,
    pub bearing_or_azimuth: f64,
    pub solar_azimuth: f64,
    /// K
    pub brightness_temperature: f64,
}

/// Rows for one sensor on one satellite, indexed by channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RadianceTable {
    pub rows: Vec<RadianceRow>,
}

impl RadianceTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Channels present, ascending.
    pub fn channels(&self) -> Vec<u32> {
        self.rows
            .iter()
            .map(|r| r.channel)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Rows of a single channel in read order.
    pub fn channel(&self, channel: u32) -> impl Iterator<Item = &RadianceRow> + '_ {
        self.rows.iter().filter(move |r| r.channel == channel)
    }

    pub fn brightness_temperature(&self, channel: u32) -> Vec<f64> {
        self.channel(channel).map(|r| r.brightness_temperature).collect()
    }

    /// Latitudes, longitudes and brightness temperatures of one channel,
    /// ready for a map scatter.
    pub fn map_columns(&self, channel: u32) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let mut lat = Vec::new();
        let mut lon = Vec::new();
        let mut tb = Vec::new();
        for row in self.channel(channel) {
            lat.push(row.latitude);
            lon.push(row.longitude);
            tb.push(row.brightness_temperature);
        }
        (lat, lon, tb)
    }
}

/// Reader over any [`SubsetSource`].
pub struct ReadBufr<S> {
    source: S,
    codes: BufrCodes,
}

impl<S: SubsetSource> ReadBufr<S> {
    /// Reader using the built-in code table.
    pub fn new(source: S) -> Self {
        Self::with_codes(source, BufrCodes::builtin())
    }

    pub fn with_codes(source: S, codes: BufrCodes) -> Self {
        Self { source, codes }
    }

    /// Collect every channel of every subset observed by `sensor` on
    /// `satellite`. Other subsets are skipped.
    pub fn read_radiance(&mut self, sensor: &str, satellite: &str) -> BufrResult<RadianceTable> {
        let sensor_id = self.codes.sensor_id(sensor)?;
        let sat_id = self.codes.satellite_id(satellite)?;

        let mut table = RadianceTable::default();
        let (mut messages, mut subsets, mut matched) = (0usize, 0usize, 0usize);
        while self.source.advance()? {
            messages += 1;
            while self.source.load_subset()? {
                subsets += 1;
                let hdr1 = self.source.read_subset(HEADER_1)?;
                if code(hdr1[0]) != Some(sat_id) || code(hdr1[1]) != Some(sensor_id) {
                    continue;
                }
                matched += 1;
                let hdr2 = self.source.read_subset(HEADER_2)?;
                let channels = self.source.read_replicated(CHANNEL)?;
                let tb = self.source.read_replicated(BRIGHTNESS_TEMPERATURE)?;
                if tb.len() < channels.len() {
                    return Err(BufrError::Subset(format!(
                        "{} channels but {} brightness temperatures",
                        channels.len(),
                        tb.len()
                    )));
                }

                let datetime = format_datetime(&hdr1[3..9]);
                // fall back to the high-resolution location
                let latitude = if hdr1[9].is_finite() { hdr1[9] } else { hdr1[11] };
                let longitude = if hdr1[10].is_finite() { hdr1[10] } else { hdr1[12] };
                for (k, chan) in channels.iter().enumerate() {
                    let Some(channel) = code(*chan).and_then(|c| u32::try_from(c).ok()) else {
                        continue;
                    };
                    table.rows.push(RadianceRow {
                        datetime: datetime.clone(),
                        channel,
                        latitude,
                        longitude,
                        satellite_zenith_angle: hdr2[0],
                        solar_zenith_angle: hdr2[1],
                        bearing_or_azimuth: hdr2[2],
                        solar_azimuth: hdr2[3],
                        brightness_temperature: tb[k],
                    });
                }
            }
            debug!(message = messages, subsets, "Scanned BUFR message");
        }

        info!(
            sensor,
            satellite,
            messages,
            subsets,
            matched,
            rows = table.len(),
            "Read radiances"
        );
        Ok(table)
    }

    pub fn into_inner(self) -> S {
        self.source
    }
}

fn code(value: f64) -> Option<i64> {
    value.is_finite().then(|| value as i64)
}

/// `yyyymmddhhmmss` from YEAR MNTH DAYS HOUR MINU SECO.
fn format_datetime(parts: &[f64]) -> String {
    let p: Vec<i64> = parts.iter().map(|v| if v.is_finite() { *v as i64 } else { 0 }).collect();
    format!("{:04}{:02}{:02}{:02}{:02}{:02}", p[0], p[1], p[2], p[3], p[4], p[5])
}
