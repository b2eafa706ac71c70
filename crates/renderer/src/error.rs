//! Error types for rendering.

use thiserror::Error;

use emc_common::EmcError;

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid canvas dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Unknown color: {0}")]
    InvalidColor(String),

    #[error("{name} is not a valid colormap. Current options supported are:\n{}", choices.join(" | "))]
    UnknownColormap { name: String, choices: Vec<String> },

    #[error("Unknown {kind}: {value}")]
    UnknownStyle { kind: &'static str, value: String },

    #[error("Font error: {0}")]
    Font(String),

    #[error("PNG encoding failed: {0}")]
    Encode(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<RenderError> for EmcError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::UnknownColormap { name, choices } => EmcError::InvalidChoice {
                kind: "colormap".to_string(),
                value: name,
                choices,
            },
            RenderError::Io(e) => EmcError::Io(e),
            other => EmcError::Render(other.to_string()),
        }
    }
}
