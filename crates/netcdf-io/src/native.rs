//! Variable access through the native netcdf library.
//!
//! Every numeric type is widened to `f64`. `_FillValue` and
//! `missing_value` become NaN, then `scale_factor` / `add_offset` unpack
//! the remaining values.

use std::path::Path;
use std::sync::Once;

use tracing::debug;

use crate::array::{NcArray, VarSelect};
use crate::error::{NetCdfError, NetCdfResult};

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library reports errors it hands back to us anyway, for
/// example when probing optional attributes:
///
/// ```text
/// HDF5-DIAG: Error detected in HDF5 (1.10.8) thread 3:
///   #003: ../../../src/H5Adense.c line 397 in H5A__dense_open(): can't locate attribute in name index
/// ```
///
/// Safe to call any number of times. Call it before the first file is
/// opened, otherwise early operations may still print.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and null handlers are a
        // documented way to turn automatic printing off.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(hdf5_metno_sys::h5e::H5E_DEFAULT, None, std::ptr::null_mut());
        }
    });
}

/// Open a netCDF file for reading.
pub fn open(path: &Path) -> NetCdfResult<netcdf::File> {
    silence_hdf5_errors();
    if !path.is_file() {
        return Err(NetCdfError::open(path));
    }
    netcdf::open(path).map_err(|e| {
        debug!(path = %path.display(), error = %e, "netcdf open failed");
        NetCdfError::open(path)
    })
}

/// Names of every variable in the file.
pub fn list_variables(path: impl AsRef<Path>) -> NetCdfResult<Vec<String>> {
    let file = open(path.as_ref())?;
    Ok(file.variables().map(|v| v.name()).collect())
}

pub fn variable_exists(path: impl AsRef<Path>, name: &str) -> NetCdfResult<bool> {
    let file = open(path.as_ref())?;
    Ok(file.variable(name).is_some())
}

/// Read `name` from the file at `path`, restricted by `select`.
pub fn read_netcdf_var(path: impl AsRef<Path>, name: &str, select: VarSelect) -> NetCdfResult<NcArray> {
    let path = path.as_ref();
    let file = open(path)?;
    let array = read_variable(&file, path, name)?;
    let array = select.apply(array)?;
    debug!(path = %path.display(), variable = name, shape = ?array.shape, "Read netCDF variable");
    Ok(array)
}

/// Read a whole variable from an open file; `path` labels errors.
pub(crate) fn read_variable(file: &netcdf::File, path: &Path, name: &str) -> NetCdfResult<NcArray> {
    let var = file.variable(name).ok_or_else(|| {
        NetCdfError::MissingData(format!("netCDF: variable {} does not exist in {}", name, path.display()))
    })?;
    let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
    let mut data = raw_values(&var, name)?;

    let fills: Vec<f64> = ["_FillValue", "missing_value"]
        .iter()
        .filter_map(|attr| get_f64_attr(&var, attr))
        .collect();
    let scale = get_f64_attr(&var, "scale_factor").unwrap_or(1.0);
    let offset = get_f64_attr(&var, "add_offset").unwrap_or(0.0);
    for v in data.iter_mut() {
        if fills.contains(v) {
            *v = f64::NAN;
        } else {
            *v = *v * scale + offset;
        }
    }

    NcArray::new(shape, data)
}

/// Values of a numeric variable, whatever its storage type.
fn raw_values(var: &netcdf::Variable, name: &str) -> NetCdfResult<Vec<f64>> {
    if let Ok(v) = var.get_values::<f64, _>(..) {
        return Ok(v);
    }
    if let Ok(v) = var.get_values::<f32, _>(..) {
        return Ok(v.into_iter().map(f64::from).collect());
    }
    if let Ok(v) = var.get_values::<i32, _>(..) {
        return Ok(v.into_iter().map(f64::from).collect());
    }
    if let Ok(v) = var.get_values::<i16, _>(..) {
        return Ok(v.into_iter().map(f64::from).collect());
    }
    if let Ok(v) = var.get_values::<i8, _>(..) {
        return Ok(v.into_iter().map(f64::from).collect());
    }
    if let Ok(v) = var.get_values::<i64, _>(..) {
        return Ok(v.into_iter().map(|x| x as f64).collect());
    }
    Err(NetCdfError::InvalidFormat(format!("variable {} is not numeric", name)))
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_message() {
        let err = list_variables("/definitely/not/here.nc4").unwrap_err();
        assert_eq!(err.to_string(), "Unable to open /definitely/not/here.nc4");
    }

    #[test]
    fn test_non_netcdf_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.nc4");
        std::fs::write(&path, "plain text").unwrap();
        assert!(matches!(variable_exists(&path, "x"), Err(NetCdfError::Open(_))));
    }
}
