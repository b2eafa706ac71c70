//! Error types for the diagnostics service.

use std::path::PathBuf;

use emc_common::EmcError;
use netcdf_io::NetCdfError;
use thiserror::Error;

pub type DiagResult<T> = Result<T, DiagError>;

#[derive(Debug, Error)]
pub enum DiagError {
    #[error(transparent)]
    NetCdf(#[from] NetCdfError),

    #[error(transparent)]
    Emc(#[from] EmcError),

    #[error("No {ob_type} diagnostics in {}", path.display())]
    MissingDiag { path: PathBuf, ob_type: String },

    #[error("{}: {got} innovations but member 1 has {expected} observations", path.display())]
    MemberMismatch {
        path: PathBuf,
        expected: usize,
        got: usize,
    },
}
