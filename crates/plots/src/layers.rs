//! Plot-data layers for cartesian subplots.
//!
//! Each layer is a bag of public attributes with defaults set by its
//! constructor. Change any field after construction, then hand the layer to
//! a [`CreatePlot`](crate::CreatePlot) through [`PlotLayer`].

use std::str::FromStr;

use renderer::{LineStyle, Marker};

use emc_common::{EmcError, EmcResult};

use crate::binning::Bins;
use crate::density::{BwMethod, Interp};
use crate::map_layers::{MapContour, MapFilledContour, MapGridded, MapScatter};

fn check_pair(what: &str, x: &[f64], y: &[f64]) -> EmcResult<()> {
    if x.len() != y.len() {
        return Err(EmcError::length_mismatch(what, x.len(), y.len()));
    }
    Ok(())
}

/// `n=<count>` over pairs where both values are finite.
fn pair_count_label(x: &[f64], y: &[f64]) -> String {
    let n = x
        .iter()
        .zip(y)
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .count();
    format!("n={}", n)
}

fn finite_count_label(data: &[f64]) -> String {
    format!("n={}", data.iter().filter(|v| v.is_finite()).count())
}

/// Regression overlay drawn on top of a scatter.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionLine {
    pub color: String,
    pub linewidth: f32,
    pub linestyle: LineStyle,
}

impl Default for RegressionLine {
    fn default() -> Self {
        Self {
            color: "black".to_string(),
            linewidth: 1.0,
            linestyle: LineStyle::Solid,
        }
    }
}

/// Coloring of scatter points by local point density.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityColoring {
    /// Draw the densest points last
    pub sort: bool,
    pub cmap: String,
    pub colorbar: bool,
    pub bins: [usize; 2],
    pub interp: Interp,
    pub nsamples: Option<usize>,
}

impl Default for DensityColoring {
    fn default() -> Self {
        Self {
            sort: true,
            cmap: "nipy_spectral_r".to_string(),
            colorbar: true,
            bins: [100, 100],
            interp: Interp::Linear,
            nsamples: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scatter {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Marker area in points squared
    pub markersize: f32,
    pub color: String,
    pub marker: Marker,
    pub linewidths: f32,
    pub edgecolors: Option<String>,
    pub alpha: Option<f32>,
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
    pub label: Option<String>,
    pub linear_regression: Option<RegressionLine>,
    pub density: Option<DensityColoring>,
}

impl Scatter {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> EmcResult<Self> {
        check_pair("scatter x and y", &x, &y)?;
        let label = pair_count_label(&x, &y);
        Ok(Self {
            x,
            y,
            markersize: 5.0,
            color: "darkgray".to_string(),
            marker: Marker::Circle,
            linewidths: 1.5,
            edgecolors: None,
            alpha: None,
            vmin: None,
            vmax: None,
            label: Some(label),
            linear_regression: None,
            density: None,
        })
    }

    /// Overlay an ordinary least squares fit.
    pub fn add_linear_regression(&mut self) {
        self.linear_regression = Some(RegressionLine::default());
    }

    /// Color points by the density of their neighbourhood.
    pub fn density_scatter(&mut self) {
        self.density = Some(DensityColoring::default());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistType {
    #[default]
    Bar,
    BarStacked,
    Step,
    StepFilled,
}

impl FromStr for HistType {
    type Err = EmcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bar" => Ok(HistType::Bar),
            "barstacked" => Ok(HistType::BarStacked),
            "step" => Ok(HistType::Step),
            "stepfilled" => Ok(HistType::StepFilled),
            _ => Err(EmcError::invalid_choice(
                "histtype",
                s,
                &["bar", "barstacked", "step", "stepfilled"],
            )),
        }
    }
}

/// Where histogram bars sit relative to their bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BinAlign {
    Left,
    #[default]
    Mid,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

impl FromStr for Orientation {
    type Err = EmcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vertical" => Ok(Orientation::Vertical),
            "horizontal" => Ok(Orientation::Horizontal),
            _ => Err(EmcError::invalid_choice("orientation", s, &["vertical", "horizontal"])),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub data: Vec<f64>,
    pub bins: Bins,
    pub range: Option<(f64, f64)>,
    pub density: bool,
    pub weights: Option<Vec<f64>>,
    pub cumulative: bool,
    pub bottom: Option<f64>,
    pub histtype: HistType,
    pub align: BinAlign,
    pub orientation: Orientation,
    /// Bar width relative to the bin width
    pub rwidth: Option<f64>,
    pub log: bool,
    pub color: String,
    pub label: Option<String>,
    /// Stack on top of the previous histogram layer
    pub stacked: bool,
    pub alpha: Option<f32>,
    pub linewidth: f32,
}

impl Histogram {
    pub fn new(data: Vec<f64>) -> Self {
        let label = finite_count_label(&data);
        Self {
            data,
            bins: Bins::Count(10),
            range: None,
            density: false,
            weights: None,
            cumulative: false,
            bottom: None,
            histtype: HistType::Bar,
            align: BinAlign::Mid,
            orientation: Orientation::Vertical,
            rwidth: None,
            log: false,
            color: "tab:blue".to_string(),
            label: Some(label),
            stacked: false,
            alpha: None,
            linewidth: 1.5,
        }
    }
}

/// Kernel density estimate line.
#[derive(Debug, Clone, PartialEq)]
pub struct Density {
    pub data: Vec<f64>,
    pub bw_method: BwMethod,
    pub gridsize: usize,
    pub cut: f64,
    pub clip: Option<(f64, f64)>,
    pub color: String,
    pub linestyle: LineStyle,
    pub linewidth: f32,
    pub label: Option<String>,
    /// Shade the area under the curve
    pub fill: bool,
    pub alpha: Option<f32>,
}

impl Density {
    pub fn new(data: Vec<f64>) -> Self {
        let label = finite_count_label(&data);
        Self {
            data,
            bw_method: BwMethod::Scott,
            gridsize: 200,
            cut: 3.0,
            clip: None,
            color: "tab:blue".to_string(),
            linestyle: LineStyle::Solid,
            linewidth: 1.5,
            label: Some(label),
            fill: false,
            alpha: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinePlot {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub color: String,
    pub linestyle: LineStyle,
    pub linewidth: f32,
    pub marker: Option<Marker>,
    /// Marker diameter in points
    pub markersize: f32,
    pub alpha: Option<f32>,
    pub label: Option<String>,
}

impl LinePlot {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> EmcResult<Self> {
        check_pair("line plot x and y", &x, &y)?;
        Ok(Self {
            x,
            y,
            color: "tab:blue".to_string(),
            linestyle: LineStyle::Solid,
            linewidth: 1.5,
            marker: None,
            markersize: 5.0,
            alpha: None,
            label: None,
        })
    }
}

/// Line spanning the full height of the axes at `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct VerticalLine {
    pub x: f64,
    pub color: String,
    pub linestyle: LineStyle,
    pub linewidth: f32,
    pub label: Option<String>,
}

impl VerticalLine {
    pub fn new(x: f64) -> Self {
        Self {
            x,
            color: "black".to_string(),
            linestyle: LineStyle::Solid,
            linewidth: 1.5,
            label: None,
        }
    }
}

/// Line spanning the full width of the axes at `y`.
#[derive(Debug, Clone, PartialEq)]
pub struct HorizontalLine {
    pub y: f64,
    pub color: String,
    pub linestyle: LineStyle,
    pub linewidth: f32,
    pub label: Option<String>,
}

impl HorizontalLine {
    pub fn new(y: f64) -> Self {
        Self {
            y,
            color: "black".to_string(),
            linestyle: LineStyle::Solid,
            linewidth: 1.5,
            label: None,
        }
    }
}

/// Shaded band between `ymin` and `ymax` across the axes.
#[derive(Debug, Clone, PartialEq)]
pub struct HorizontalSpan {
    pub ymin: f64,
    pub ymax: f64,
    pub color: String,
    pub alpha: Option<f32>,
    pub label: Option<String>,
}

impl HorizontalSpan {
    pub fn new(ymin: f64, ymax: f64) -> Self {
        Self {
            ymin,
            ymax,
            color: "lightgoldenrodyellow".to_string(),
            alpha: Some(0.5),
            label: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BarAlign {
    #[default]
    Center,
    Edge,
}

impl FromStr for BarAlign {
    type Err = EmcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "center" => Ok(BarAlign::Center),
            "edge" => Ok(BarAlign::Edge),
            _ => Err(EmcError::invalid_choice("bar alignment", s, &["center", "edge"])),
        }
    }
}

/// Style shared by vertical and horizontal bars.
#[derive(Debug, Clone, PartialEq)]
pub struct BarStyle {
    pub align: BarAlign,
    pub color: String,
    pub linewidth: f32,
    pub edgecolor: Option<String>,
    /// Category labels replacing the numeric positions
    pub tick_label: Option<Vec<String>>,
    pub xerr: Option<Vec<f64>>,
    pub yerr: Option<Vec<f64>>,
    pub ecolor: String,
    /// Error bar cap length in points
    pub capsize: f32,
    pub log: bool,
    pub label: Option<String>,
    pub alpha: Option<f32>,
}

impl Default for BarStyle {
    fn default() -> Self {
        Self {
            align: BarAlign::Center,
            color: "tab:blue".to_string(),
            linewidth: 0.0,
            edgecolor: None,
            tick_label: None,
            xerr: None,
            yerr: None,
            ecolor: "black".to_string(),
            capsize: 0.0,
            log: false,
            label: None,
            alpha: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarPlot {
    pub x: Vec<f64>,
    pub height: Vec<f64>,
    pub width: f64,
    pub bottom: f64,
    pub style: BarStyle,
}

impl BarPlot {
    pub fn new(x: Vec<f64>, height: Vec<f64>) -> EmcResult<Self> {
        check_pair("bar x and height", &x, &height)?;
        Ok(Self {
            x,
            height,
            width: 0.8,
            bottom: 0.0,
            style: BarStyle::default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HorizontalBar {
    pub y: Vec<f64>,
    pub width: Vec<f64>,
    pub height: f64,
    pub left: f64,
    pub style: BarStyle,
}

impl HorizontalBar {
    pub fn new(y: Vec<f64>, width: Vec<f64>) -> EmcResult<Self> {
        check_pair("bar y and width", &y, &width)?;
        Ok(Self {
            y,
            width,
            height: 0.8,
            left: 0.0,
            style: BarStyle::default(),
        })
    }
}

/// Temperature profile against pressure on skew-T log-p axes.
#[derive(Debug, Clone, PartialEq)]
pub struct SkewT {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub color: String,
    pub linestyle: LineStyle,
    pub linewidth: f32,
    pub marker: Option<Marker>,
    pub markersize: f32,
    pub alpha: Option<f32>,
    pub label: Option<String>,
}

impl SkewT {
    /// Skew angle of the temperature axis in degrees.
    pub const SKEW_DEGREES: f64 = 35.0;

    pub fn new(x: Vec<f64>, y: Vec<f64>) -> EmcResult<Self> {
        check_pair("skew-T temperature and pressure", &x, &y)?;
        Ok(Self {
            x,
            y,
            color: "tab:blue".to_string(),
            linestyle: LineStyle::Solid,
            linewidth: 1.5,
            marker: None,
            markersize: 5.0,
            alpha: None,
            label: None,
        })
    }
}

/// Any layer a subplot can draw.
#[derive(Debug, Clone, PartialEq)]
pub enum PlotLayer {
    Scatter(Scatter),
    Histogram(Histogram),
    Density(Density),
    LinePlot(LinePlot),
    VerticalLine(VerticalLine),
    HorizontalLine(HorizontalLine),
    HorizontalSpan(HorizontalSpan),
    BarPlot(BarPlot),
    HorizontalBar(HorizontalBar),
    SkewT(SkewT),
    MapScatter(MapScatter),
    MapGridded(MapGridded),
    MapContour(MapContour),
    MapFilledContour(MapFilledContour),
}

impl PlotLayer {
    /// Tags accepted on cartesian axes, in dispatch order.
    pub const CARTESIAN_TYPES: [&'static str; 10] = [
        "scatter",
        "histogram",
        "line_plot",
        "density",
        "vertical_line",
        "horizontal_line",
        "horizontal_span",
        "bar_plot",
        "horizontal_bar",
        "skewt",
    ];

    /// Tags accepted on map axes.
    pub const MAP_TYPES: [&'static str; 4] =
        ["map_scatter", "map_gridded", "map_contour", "map_filled_contour"];

    pub fn plottype(&self) -> &'static str {
        match self {
            PlotLayer::Scatter(_) => "scatter",
            PlotLayer::Histogram(_) => "histogram",
            PlotLayer::Density(_) => "density",
            PlotLayer::LinePlot(_) => "line_plot",
            PlotLayer::VerticalLine(_) => "vertical_line",
            PlotLayer::HorizontalLine(_) => "horizontal_line",
            PlotLayer::HorizontalSpan(_) => "horizontal_span",
            PlotLayer::BarPlot(_) => "bar_plot",
            PlotLayer::HorizontalBar(_) => "horizontal_bar",
            PlotLayer::SkewT(_) => "skewt",
            PlotLayer::MapScatter(_) => "map_scatter",
            PlotLayer::MapGridded(_) => "map_gridded",
            PlotLayer::MapContour(_) => "map_contour",
            PlotLayer::MapFilledContour(_) => "map_filled_contour",
        }
    }

    pub fn is_map_layer(&self) -> bool {
        Self::MAP_TYPES.contains(&self.plottype())
    }

    /// Legend text, if the layer has one.
    pub fn label(&self) -> Option<&str> {
        match self {
            PlotLayer::Scatter(l) => l.label.as_deref(),
            PlotLayer::Histogram(l) => l.label.as_deref(),
            PlotLayer::Density(l) => l.label.as_deref(),
            PlotLayer::LinePlot(l) => l.label.as_deref(),
            PlotLayer::VerticalLine(l) => l.label.as_deref(),
            PlotLayer::HorizontalLine(l) => l.label.as_deref(),
            PlotLayer::HorizontalSpan(l) => l.label.as_deref(),
            PlotLayer::BarPlot(l) => l.style.label.as_deref(),
            PlotLayer::HorizontalBar(l) => l.style.label.as_deref(),
            PlotLayer::SkewT(l) => l.label.as_deref(),
            PlotLayer::MapScatter(l) => l.label.as_deref(),
            PlotLayer::MapGridded(_) | PlotLayer::MapContour(_) | PlotLayer::MapFilledContour(_) => None,
        }
    }
}

macro_rules! impl_from_layer {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for PlotLayer {
                fn from(layer: $variant) -> Self {
                    PlotLayer::$variant(layer)
                }
            }
        )*
    };
}

impl_from_layer!(
    Scatter,
    Histogram,
    Density,
    LinePlot,
    VerticalLine,
    HorizontalLine,
    HorizontalSpan,
    BarPlot,
    HorizontalBar,
    SkewT,
    MapScatter,
    MapGridded,
    MapContour,
    MapFilledContour,
);
