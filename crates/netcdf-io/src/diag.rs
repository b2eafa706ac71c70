//! GSI conventional observation diagnostic files (`diag_conv_*_ges.*.nc4`).
//!
//! Wind files carry `u_` and `v_` prefixed observation and innovation
//! variables; temperature, moisture and pressure files use the bare names.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::NetCdfResult;
use crate::native::{open, read_variable};

/// One open diagnostic file.
pub struct DiagFile {
    path: PathBuf,
    file: netcdf::File,
}

impl std::fmt::Debug for DiagFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagFile").field("path", &self.path).finish()
    }
}

/// Variable name for `base` in a file holding `ob_type` observations.
///
/// ```
/// use netcdf_io::diag_variable;
///
/// assert_eq!(diag_variable("u", "Observation"), "u_Observation");
/// assert_eq!(diag_variable("t", "Observation"), "Observation");
/// ```
pub fn diag_variable(ob_type: &str, base: &str) -> String {
    match ob_type {
        "u" | "v" => format!("{}_{}", ob_type, base),
        _ => base.to_string(),
    }
}

/// File name stem component: winds share one `uv` file.
pub fn diag_file_kind(ob_type: &str) -> &str {
    match ob_type {
        "u" | "v" => "uv",
        other => other,
    }
}

impl DiagFile {
    pub fn open(path: impl AsRef<Path>) -> NetCdfResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = open(&path)?;
        debug!(path = %path.display(), "Opened diagnostic file");
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Any variable as a flat vector.
    pub fn values(&self, name: &str) -> NetCdfResult<Vec<f64>> {
        Ok(read_variable(&self.file, &self.path, name)?.into_vec())
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.file.variable(name).is_some()
    }

    /// Bufr report types.
    pub fn observation_type(&self) -> NetCdfResult<Vec<i32>> {
        Ok(read_variable(&self.file, &self.path, "Observation_Type")?.to_i32())
    }

    pub fn latitude(&self) -> NetCdfResult<Vec<f64>> {
        self.values("Latitude")
    }

    /// Degrees east, 0..360.
    pub fn longitude(&self) -> NetCdfResult<Vec<f64>> {
        self.values("Longitude")
    }

    /// hPa
    pub fn pressure(&self) -> NetCdfResult<Vec<f64>> {
        self.values("Pressure")
    }

    /// 1 when the observation was assimilated.
    pub fn analysis_use_flag(&self) -> NetCdfResult<Vec<f64>> {
        self.values("Analysis_Use_Flag")
    }

    pub fn errinv_final(&self) -> NetCdfResult<Vec<f64>> {
        self.values("Errinv_Final")
    }

    pub fn observation(&self, ob_type: &str) -> NetCdfResult<Vec<f64>> {
        self.values(&diag_variable(ob_type, "Observation"))
    }

    pub fn obs_minus_forecast_adjusted(&self, ob_type: &str) -> NetCdfResult<Vec<f64>> {
        self.values(&diag_variable(ob_type, "Obs_Minus_Forecast_adjusted"))
    }
}
