//! Error types for netCDF reading.

use thiserror::Error;

/// Result type for netCDF operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

#[derive(Error, Debug)]
pub enum NetCdfError {
    /// The file is missing or not a netCDF file
    #[error("{0}")]
    Open(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Missing required variable or attribute
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Values could not be read or converted
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// A time or level index past the end of its dimension
    #[error("Index {index} out of range for {what} of length {len}")]
    Selection { what: String, index: usize, len: usize },
}

impl NetCdfError {
    pub(crate) fn open(path: &std::path::Path) -> Self {
        NetCdfError::Open(format!("Unable to open {}", path.display()))
    }
}
