//! Error types for BUFR reading.

use thiserror::Error;

pub type BufrResult<T> = Result<T, BufrError>;

#[derive(Error, Debug)]
pub enum BufrError {
    /// Sensor or satellite name missing from the code table
    #[error("Unknown {kind} '{name}'. Valid choices: {}", choices.join(" | "))]
    UnknownCode {
        kind: String,
        name: String,
        choices: Vec<String>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid code table: {0}")]
    Codes(#[from] serde_yaml::Error),

    /// A dump line that is not a JSON array of subsets
    #[error("Invalid dump at line {line}: {message}")]
    Dump { line: usize, message: String },

    /// A read before any subset was loaded
    #[error("No subset loaded")]
    NoSubset,

    /// Inconsistent subset contents
    #[error("Invalid subset: {0}")]
    Subset(String),
}
