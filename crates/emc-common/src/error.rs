//! Error types for the emcpy crates.

use thiserror::Error;

/// Result type alias using EmcError.
pub type EmcResult<T> = Result<T, EmcError>;

/// Primary error type for plotting, statistics and utility operations.
#[derive(Debug, Error)]
pub enum EmcError {
    // === Argument Errors ===
    #[error("{value} is not a valid {kind}. Current options supported are:\n{}", choices.join(" | "))]
    InvalidChoice {
        kind: String,
        value: String,
        choices: Vec<String>,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Length mismatch: {what} ({left} != {right})")]
    LengthMismatch {
        what: String,
        left: usize,
        right: usize,
    },

    #[error("Shape mismatch: {what} ({left:?} != {right:?})")]
    ShapeMismatch {
        what: String,
        left: Vec<usize>,
        right: Vec<usize>,
    },

    #[error(
        "Len of {axis}tick labels ({labels}) does not equal len of {axis}ticks ({ticks}). \
         Set {axis}ticks appropriately or change labels to be len of {axis}ticks."
    )]
    TickLabelMismatch {
        axis: char,
        labels: usize,
        ticks: usize,
    },

    #[error("Data being plotted has no color series to plot. Make sure data requires a colorbar.")]
    NoColorSeries,

    #[error("Not enough data: {0}")]
    EmptyData(String),

    // === Date Errors ===
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    // === I/O and Config Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    // === Rendering Errors ===
    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Projection error: {0}")]
    Projection(String),
}

impl EmcError {
    /// Build an `InvalidChoice` error from a list of valid names.
    pub fn invalid_choice<S: AsRef<str>>(kind: &str, value: &str, choices: &[S]) -> Self {
        EmcError::InvalidChoice {
            kind: kind.to_string(),
            value: value.to_string(),
            choices: choices.iter().map(|c| c.as_ref().to_string()).collect(),
        }
    }

    /// Build a `LengthMismatch` error.
    pub fn length_mismatch(what: &str, left: usize, right: usize) -> Self {
        EmcError::LengthMismatch {
            what: what.to_string(),
            left,
            right,
        }
    }
}

impl From<serde_json::Error> for EmcError {
    fn from(err: serde_json::Error) -> Self {
        EmcError::Config(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for EmcError {
    fn from(err: serde_yaml::Error) -> Self {
        EmcError::Config(format!("YAML error: {}", err))
    }
}
