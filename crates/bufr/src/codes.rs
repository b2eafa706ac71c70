//! Sensor and satellite code tables.
//!
//! Loaded from `bufr_codes.yaml`; the copy under `config/` is compiled in
//! as the default.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BufrError, BufrResult};

const BUILTIN_CODES: &str = include_str!("../../../config/bufr_codes.yaml");

/// Name to BUFR id maps for `SIID` (sensor) and `SAID` (satellite).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BufrCodes {
    #[serde(default)]
    pub sensor: BTreeMap<String, i64>,
    #[serde(default)]
    pub satellite: BTreeMap<String, i64>,
}

impl BufrCodes {
    pub fn from_yaml(text: &str) -> BufrResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> BufrResult<Self> {
        let path = path.as_ref();
        let codes = Self::from_yaml(&std::fs::read_to_string(path)?)?;
        debug!(
            path = %path.display(),
            sensors = codes.sensor.len(),
            satellites = codes.satellite.len(),
            "Loaded BUFR code table"
        );
        Ok(codes)
    }

    /// Table shipped with the workspace.
    pub fn builtin() -> Self {
        // parsed in test_builtin_table
        Self::from_yaml(BUILTIN_CODES).unwrap_or_default()
    }

    pub fn sensor_id(&self, name: &str) -> BufrResult<i64> {
        lookup(&self.sensor, "sensor", name)
    }

    pub fn satellite_id(&self, name: &str) -> BufrResult<i64> {
        lookup(&self.satellite, "satellite", name)
    }
}

fn lookup(table: &BTreeMap<String, i64>, kind: &str, name: &str) -> BufrResult<i64> {
    table.get(name).copied().ok_or_else(|| BufrError::UnknownCode {
        kind: kind.to_string(),
        name: name.to_string(),
        choices: table.keys().cloned().collect(),
    })
}
