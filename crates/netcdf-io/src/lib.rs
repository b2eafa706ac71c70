//! netCDF reading for emcpy.
//!
//! Thin layer over the native netcdf library (libnetcdf / HDF5):
//! - [`list_variables`], [`variable_exists`] and [`read_netcdf_var`] for
//!   any netCDF file, with optional time/level selection via [`VarSelect`]
//! - [`DiagFile`] for GSI conventional diagnostic files
//!
//! Values are returned as [`NcArray`]: a shape and row-major `f64` data with
//! fill values as NaN.

pub mod array;
pub mod diag;
pub mod error;
pub mod native;

pub use array::{NcArray, VarSelect};
pub use diag::{diag_file_kind, diag_variable, DiagFile};
pub use error::{NetCdfError, NetCdfResult};
pub use native::{list_variables, read_netcdf_var, silence_hdf5_errors, variable_exists};
