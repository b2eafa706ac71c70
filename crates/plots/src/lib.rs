//! Declarative plotting of meteorological data.
//!
//! A figure is built from plain data objects:
//! - Layers ([`layers`], [`map_layers`]) hold the data and styling of one
//!   scatter, histogram, line, bar, skew-T or map overlay
//! - [`CreatePlot`] collects layers and decorations for one subplot
//! - [`CreateFigure`] lays subplots out on a grid and writes the PNG
//!
//! ```no_run
//! use plots::{CreateFigure, CreatePlot, Scatter};
//!
//! let mut plot = CreatePlot::new();
//! plot.draw_data([Scatter::new(vec![1.0, 2.0, 3.0], vec![2.0, 4.0, 5.0])?])?;
//! plot.add_title("Observed vs background");
//!
//! let mut figure = CreateFigure::new(1, 1, (8.0, 6.0));
//! figure.plot_list.push(plot);
//! figure.save_figure("scatter.png")?;
//! # Ok::<(), emc_common::EmcError>(())
//! ```

pub mod axes;
pub mod binning;
pub mod cartesian;
pub mod colorbar;
pub mod config;
pub mod context;
pub mod create_figure;
pub mod create_map;
pub mod create_plot;
pub mod decorations;
pub mod density;
pub mod features;
pub mod layers;
pub mod legend;
pub mod map_layers;
pub mod maps;
pub mod variable_specs;

pub use axes::Scale;
pub use config::PlotsConfig;
pub use create_figure::{CreateFigure, Suptitle};
pub use create_map::CreateMap;
pub use create_plot::{CreatePlot, DomainSpec};
pub use decorations::{
    AxisLabel, ColorbarSpec, Corner, Extend, Grid, Legend, LegendLoc, Logo, MapFeature, StatsText, TextAnnotation,
    TextLoc, TickLabels, Title, Transform,
};
pub use layers::{
    BarAlign, BarPlot, BarStyle, BinAlign, Density, DensityColoring, HistType, Histogram, HorizontalBar,
    HorizontalLine, HorizontalSpan, LinePlot, Orientation, PlotLayer, RegressionLine, Scatter, SkewT, VerticalLine,
};
pub use map_layers::{Field2D, MapContour, MapFilledContour, MapGridded, MapScatter};
pub use variable_specs::{ColorbarPreset, EvalType, VariableSpecs, VariableTable};

pub use projection::{Domain, MapProjection};
pub use renderer::{FontBook, FontWeight, LineStyle, Marker};
