//! Observation-space ensemble diagnostics.
//!
//! [`obspace_stats`] reads GSI conventional diagnostic files for every
//! member of one or more ensemble experiments and reduces them to bias,
//! RMS, spread and related statistics per observation type, experiment and
//! hour of day. [`plot::save_figures`] draws one figure per observation
//! type from the result.

pub mod config;
pub mod error;
pub mod obspace;
pub mod plot;
pub mod source;

pub use config::{load_config, ObsDiagConfig};
pub use error::{DiagError, DiagResult};
pub use obspace::{obspace_stats, DiagRequest, ObsSpaceStats, StatCube, Statistic, HOURS};
pub use plot::{build_figure, save_figures, PlotSettings};
pub use source::{DiagColumns, DiagSource, MemoryDiagSource, NetCdfDiagSource, ObType};
