//! Where diagnostic columns come from.
//!
//! [`NetCdfDiagSource`] reads GSI `diag_conv_*_ges` files. [`MemoryDiagSource`]
//! serves the same columns from memory, keyed by the path the aggregation
//! would have opened.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use emc_common::{EmcError, ObsColumns};
use netcdf_io::{diag_file_kind, DiagFile};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DiagError, DiagResult};

/// Conventional observation types with diagnostic files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObType {
    U,
    V,
    T,
    Q,
}

impl ObType {
    pub const NAMES: [&'static str; 4] = ["u", "v", "t", "q"];

    pub fn name(&self) -> &'static str {
        match self {
            ObType::U => "u",
            ObType::V => "v",
            ObType::T => "t",
            ObType::Q => "q",
        }
    }

    pub fn is_wind(&self) -> bool {
        matches!(self, ObType::U | ObType::V)
    }

    /// Factor applied to observations and innovations; humidity goes from
    /// kg/kg to g/kg.
    pub fn scale(&self) -> f64 {
        match self {
            ObType::Q => 1000.0,
            _ => 1.0,
        }
    }

    /// `uv`, `t` or `q`, as used in file names.
    pub fn file_kind(&self) -> &'static str {
        diag_file_kind(self.name())
    }
}

impl fmt::Display for ObType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ObType {
    type Err = EmcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "u" => Ok(ObType::U),
            "v" => Ok(ObType::V),
            "t" => Ok(ObType::T),
            "q" => Ok(ObType::Q),
            other => Err(EmcError::invalid_choice("observation type", other, &ObType::NAMES)),
        }
    }
}

/// Member-1 columns used to filter and to form innovations. Values are as
/// stored in the file, before any unit scaling.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagColumns {
    pub code: Vec<i32>,
    pub errinv: Vec<f64>,
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
    pub pressure: Vec<f64>,
    pub use_flag: Vec<f64>,
    pub observation: Vec<f64>,
}

impl DiagColumns {
    pub fn len(&self) -> usize {
        self.observation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observation.is_empty()
    }

    pub fn as_obs_columns(&self) -> ObsColumns<'_> {
        ObsColumns {
            code: &self.code,
            errinv: &self.errinv,
            lat: &self.lat,
            lon: &self.lon,
            pressure: &self.pressure,
            use_flag: &self.use_flag,
        }
    }
}

/// Reads the two things the aggregation needs from a member's file.
pub trait DiagSource {
    /// Filtering columns and observations. Only read for member 1.
    fn columns(&self, path: &Path, ob_type: ObType) -> DiagResult<DiagColumns>;

    /// Adjusted observation-minus-forecast for every observation in the file.
    fn obs_minus_forecast(&self, path: &Path, ob_type: ObType) -> DiagResult<Vec<f64>>;
}

/// GSI netCDF diagnostic files on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetCdfDiagSource;

impl DiagSource for NetCdfDiagSource {
    fn columns(&self, path: &Path, ob_type: ObType) -> DiagResult<DiagColumns> {
        let file = DiagFile::open(path)?;
        let columns = DiagColumns {
            code: file.observation_type()?,
            errinv: file.errinv_final()?,
            lat: file.latitude()?,
            lon: file.longitude()?,
            pressure: file.pressure()?,
            use_flag: file.analysis_use_flag()?,
            observation: file.observation(ob_type.name())?,
        };
        debug!(path = %path.display(), ob_type = %ob_type, nobs = columns.len(), "Read diag columns");
        Ok(columns)
    }

    fn obs_minus_forecast(&self, path: &Path, ob_type: ObType) -> DiagResult<Vec<f64>> {
        Ok(DiagFile::open(path)?.obs_minus_forecast_adjusted(ob_type.name())?)
    }
}

/// In-memory diagnostics keyed by file path and observation type.
#[derive(Debug, Clone, Default)]
pub struct MemoryDiagSource {
    columns: HashMap<(PathBuf, ObType), DiagColumns>,
    omf: HashMap<(PathBuf, ObType), Vec<f64>>,
}

impl MemoryDiagSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_columns(&mut self, path: impl Into<PathBuf>, ob_type: ObType, columns: DiagColumns) {
        self.columns.insert((path.into(), ob_type), columns);
    }

    pub fn insert_omf(&mut self, path: impl Into<PathBuf>, ob_type: ObType, omf: Vec<f64>) {
        self.omf.insert((path.into(), ob_type), omf);
    }

    fn missing(path: &Path, ob_type: ObType) -> DiagError {
        DiagError::MissingDiag {
            path: path.to_path_buf(),
            ob_type: ob_type.to_string(),
        }
    }
}

impl DiagSource for MemoryDiagSource {
    fn columns(&self, path: &Path, ob_type: ObType) -> DiagResult<DiagColumns> {
        self.columns
            .get(&(path.to_path_buf(), ob_type))
            .cloned()
            .ok_or_else(|| Self::missing(path, ob_type))
    }

    fn obs_minus_forecast(&self, path: &Path, ob_type: ObType) -> DiagResult<Vec<f64>> {
        self.omf
            .get(&(path.to_path_buf(), ob_type))
            .cloned()
            .ok_or_else(|| Self::missing(path, ob_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ob_type_names() {
        assert_eq!("q".parse::<ObType>().unwrap(), ObType::Q);
        assert_eq!(ObType::U.file_kind(), "uv");
        assert_eq!(ObType::T.file_kind(), "t");
        assert_eq!(ObType::Q.scale(), 1000.0);
        assert!(ObType::V.is_wind());

        let err = "ps".parse::<ObType>().unwrap_err();
        assert!(err.to_string().contains("u | v | t | q"));
    }

    #[test]
    fn test_ob_type_yaml() {
        let types: Vec<ObType> = serde_yaml::from_str("[u, q]").unwrap();
        assert_eq!(types, vec![ObType::U, ObType::Q]);
    }

    #[test]
    fn test_memory_source_lookup() {
        let mut source = MemoryDiagSource::new();
        source.insert_omf("/d/mem0001/f.nc4", ObType::U, vec![1.0, 2.0]);
        assert_eq!(
            source.obs_minus_forecast(Path::new("/d/mem0001/f.nc4"), ObType::U).unwrap(),
            vec![1.0, 2.0]
        );
        let err = source
            .obs_minus_forecast(Path::new("/d/mem0001/f.nc4"), ObType::V)
            .unwrap_err();
        assert!(matches!(err, DiagError::MissingDiag { .. }));
        assert!(source.columns(Path::new("/d/mem0001/f.nc4"), ObType::U).is_err());
    }

    #[test]
    fn test_netcdf_missing_file() {
        let err = NetCdfDiagSource
            .columns(Path::new("/no/such/diag_conv_t_ges.2024011518.nc4"), ObType::T)
            .unwrap_err();
        assert!(matches!(err, DiagError::NetCdf(_)));
    }
}
