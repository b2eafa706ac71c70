//! Raster backend for figures.
//!
//! Provides the drawing primitives the plotting layer builds on:
//! - Named colors, color cycles and colormaps
//! - An antialiased canvas (lines, polygons, markers, images)
//! - TrueType text with runtime font discovery
//! - Contour extraction (marching squares) and labelling
//! - PNG encoding with DPI metadata

pub mod canvas;
pub mod color;
pub mod colormap;
pub mod contour;
pub mod error;
pub mod png;
pub mod text;

pub use canvas::{Canvas, LineStyle, Marker, PixelRect, StrokeStyle};
pub use color::Color;
pub use colormap::{band_index, colormap_names, render_grid, Colormap, Normalize};
pub use error::{RenderError, RenderResult};
pub use text::{FontBook, FontWeight, HAlign, TextStyle, VAlign};
