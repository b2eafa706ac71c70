//! Cosmetic settings stored on a subplot: titles, labels, legend, grid,
//! tick labels, colorbar, annotations and map features.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use renderer::{FontWeight, HAlign, LineStyle};

use emc_common::{EmcError, EmcResult};

use crate::layers::Orientation;

/// Horizontal placement of a title or axis label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextLoc {
    Left,
    #[default]
    Center,
    Right,
}

impl TextLoc {
    pub fn halign(&self) -> HAlign {
        match self {
            TextLoc::Left => HAlign::Left,
            TextLoc::Center => HAlign::Center,
            TextLoc::Right => HAlign::Right,
        }
    }
}

impl FromStr for TextLoc {
    type Err = EmcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(TextLoc::Left),
            "center" => Ok(TextLoc::Center),
            "right" => Ok(TextLoc::Right),
            _ => Err(EmcError::invalid_choice("text location", s, &["left", "center", "right"])),
        }
    }
}

/// Title above the axes.
#[derive(Debug, Clone, PartialEq)]
pub struct Title {
    pub label: String,
    pub loc: TextLoc,
    pub fontsize: f32,
    pub fontweight: FontWeight,
    pub color: String,
    pub italic: bool,
}

impl Title {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            loc: TextLoc::Center,
            fontsize: 12.0,
            fontweight: FontWeight::Normal,
            color: "black".to_string(),
            italic: false,
        }
    }
}

impl From<&str> for Title {
    fn from(label: &str) -> Self {
        Title::new(label)
    }
}

impl From<String> for Title {
    fn from(label: String) -> Self {
        Title::new(label)
    }
}

/// Text along an axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisLabel {
    pub label: String,
    pub loc: TextLoc,
    pub fontsize: f32,
    pub fontweight: FontWeight,
    pub color: String,
}

impl AxisLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            loc: TextLoc::Center,
            fontsize: 12.0,
            fontweight: FontWeight::Normal,
            color: "black".to_string(),
        }
    }
}

impl From<&str> for AxisLabel {
    fn from(label: &str) -> Self {
        AxisLabel::new(label)
    }
}

impl From<String> for AxisLabel {
    fn from(label: String) -> Self {
        AxisLabel::new(label)
    }
}

/// Legend anchor inside the axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegendLoc {
    /// Corner covering the fewest data points
    #[default]
    Best,
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
    Center,
    UpperCenter,
    LowerCenter,
    CenterLeft,
    CenterRight,
}

impl LegendLoc {
    pub const NAMES: [&'static str; 10] = [
        "best",
        "upper left",
        "upper right",
        "lower left",
        "lower right",
        "center",
        "upper center",
        "lower center",
        "center left",
        "center right",
    ];

    /// Anchor as axes fractions `(fx, fy)` with y measured upward.
    pub fn anchor(&self) -> (f32, f32) {
        match self {
            LegendLoc::Best | LegendLoc::UpperRight => (1.0, 1.0),
            LegendLoc::UpperLeft => (0.0, 1.0),
            LegendLoc::LowerLeft => (0.0, 0.0),
            LegendLoc::LowerRight => (1.0, 0.0),
            LegendLoc::Center => (0.5, 0.5),
            LegendLoc::UpperCenter => (0.5, 1.0),
            LegendLoc::LowerCenter => (0.5, 0.0),
            LegendLoc::CenterLeft => (0.0, 0.5),
            LegendLoc::CenterRight => (1.0, 0.5),
        }
    }
}

impl FromStr for LegendLoc {
    type Err = EmcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let loc = match s.trim().to_lowercase().as_str() {
            "best" => LegendLoc::Best,
            "upper left" => LegendLoc::UpperLeft,
            "upper right" => LegendLoc::UpperRight,
            "lower left" => LegendLoc::LowerLeft,
            "lower right" => LegendLoc::LowerRight,
            "center" => LegendLoc::Center,
            "upper center" => LegendLoc::UpperCenter,
            "lower center" => LegendLoc::LowerCenter,
            "center left" => LegendLoc::CenterLeft,
            "center right" | "right" => LegendLoc::CenterRight,
            _ => return Err(EmcError::invalid_choice("legend location", s, &Self::NAMES)),
        };
        Ok(loc)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub loc: LegendLoc,
    pub fontsize: f32,
    pub ncol: usize,
    pub frameon: bool,
}

impl Default for Legend {
    fn default() -> Self {
        Self {
            loc: LegendLoc::Best,
            fontsize: 10.0,
            ncol: 1,
            frameon: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub linewidth: f32,
    pub color: String,
    pub alpha: Option<f32>,
    pub linestyle: LineStyle,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            linewidth: 1.0,
            color: "gray".to_string(),
            alpha: None,
            linestyle: LineStyle::Solid,
        }
    }
}

/// Replacement text for axis ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct TickLabels {
    pub labels: Vec<String>,
    pub fontsize: f32,
    pub fontweight: FontWeight,
    pub color: String,
    /// Degrees; 45 or more draws the labels vertically
    pub rotation: f32,
}

impl TickLabels {
    pub fn new<S: Into<String>>(labels: impl IntoIterator<Item = S>) -> Self {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
            fontsize: 12.0,
            fontweight: FontWeight::Normal,
            color: "black".to_string(),
            rotation: 0.0,
        }
    }

    pub fn rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn is_vertical(&self) -> bool {
        rotation_is_vertical(self.rotation)
    }
}

/// Text is drawn horizontally or rotated a quarter turn.
pub fn rotation_is_vertical(degrees: f32) -> bool {
    let r = degrees.rem_euclid(180.0);
    (45.0..135.0).contains(&r)
}

/// Triangles past the ends of a colorbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Extend {
    #[default]
    Neither,
    Both,
    Min,
    Max,
}

impl Extend {
    pub fn has_min(&self) -> bool {
        matches!(self, Extend::Both | Extend::Min)
    }

    pub fn has_max(&self) -> bool {
        matches!(self, Extend::Both | Extend::Max)
    }
}

impl FromStr for Extend {
    type Err = EmcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "neither" => Ok(Extend::Neither),
            "both" => Ok(Extend::Both),
            "min" => Ok(Extend::Min),
            "max" => Ok(Extend::Max),
            _ => Err(EmcError::invalid_choice("extend", s, &["neither", "both", "min", "max"])),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColorbarSpec {
    pub label: Option<String>,
    pub fontsize: f32,
    /// Label only the two ends of the bar
    pub single_tick: bool,
    pub orientation: Orientation,
    pub extend: Extend,
}

impl Default for ColorbarSpec {
    fn default() -> Self {
        Self {
            label: None,
            fontsize: 12.0,
            single_tick: false,
            orientation: Orientation::Vertical,
            extend: Extend::Neither,
        }
    }
}

impl ColorbarSpec {
    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }
}

/// Key/value statistics written as one line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsText {
    pub stats: Vec<(String, String)>,
    pub xloc: f32,
    pub yloc: f32,
    pub fontsize: f32,
}

impl StatsText {
    pub fn new<K, V>(stats: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Display,
    {
        Self {
            stats: stats
                .into_iter()
                .map(|(k, v)| (k.into(), v.to_string()))
                .collect(),
            xloc: 0.5,
            yloc: -0.1,
            fontsize: 12.0,
        }
    }

    /// Entries in insertion order, each prefixed by four spaces.
    pub fn text(&self) -> String {
        self.stats
            .iter()
            .map(|(k, v)| format!("    {}: {}", k, v))
            .collect()
    }
}

/// Coordinate system of free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transform {
    /// Fractions of the axes, `(0, 0)` at the lower left
    #[default]
    Axes,
    /// Data coordinates; longitude/latitude on maps
    Data,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextAnnotation {
    pub xloc: f64,
    pub yloc: f64,
    pub text: String,
    pub fontsize: f32,
    pub fontweight: FontWeight,
    pub color: String,
    pub alpha: Option<f32>,
    pub halign: HAlign,
    pub transform: Transform,
}

impl TextAnnotation {
    pub fn new(xloc: f64, yloc: f64, text: impl Into<String>) -> Self {
        Self {
            xloc,
            yloc,
            text: text.into(),
            fontsize: 12.0,
            fontweight: FontWeight::Normal,
            color: "black".to_string(),
            alpha: None,
            halign: HAlign::Center,
            transform: Transform::Axes,
        }
    }
}

/// Geographic overlays loaded from the feature directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapFeature {
    Coastline,
    Borders,
    States,
    Lakes,
    Rivers,
    Land,
    Ocean,
}

impl MapFeature {
    pub const NAMES: [&'static str; 7] =
        ["coastline", "borders", "states", "lakes", "rivers", "land", "ocean"];

    /// File stem under the feature directory.
    pub fn file_stem(&self) -> &'static str {
        match self {
            MapFeature::Coastline => "coastline",
            MapFeature::Borders => "borders",
            MapFeature::States => "states",
            MapFeature::Lakes => "lakes",
            MapFeature::Rivers => "rivers",
            MapFeature::Land => "land",
            MapFeature::Ocean => "ocean",
        }
    }

    /// Area features are filled under the data.
    pub fn is_filled(&self) -> bool {
        matches!(self, MapFeature::Land | MapFeature::Ocean | MapFeature::Lakes)
    }
}

impl FromStr for MapFeature {
    type Err = EmcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "coastline" | "coastlines" => Ok(MapFeature::Coastline),
            "borders" => Ok(MapFeature::Borders),
            "states" => Ok(MapFeature::States),
            "lakes" => Ok(MapFeature::Lakes),
            "rivers" => Ok(MapFeature::Rivers),
            "land" => Ok(MapFeature::Land),
            "ocean" => Ok(MapFeature::Ocean),
            _ => Err(EmcError::invalid_choice("map feature", s, &Self::NAMES)),
        }
    }
}

/// Corner of the subplot used for a logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Corner {
    UpperLeft,
    #[default]
    UpperRight,
    LowerLeft,
    LowerRight,
}

impl FromStr for Corner {
    type Err = EmcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "upper left" => Ok(Corner::UpperLeft),
            "upper right" => Ok(Corner::UpperRight),
            "lower left" => Ok(Corner::LowerLeft),
            "lower right" => Ok(Corner::LowerRight),
            _ => Err(EmcError::invalid_choice(
                "logo location",
                s,
                &["upper left", "upper right", "lower left", "lower right"],
            )),
        }
    }
}

/// PNG image composited into a corner of the subplot.
#[derive(Debug, Clone, PartialEq)]
pub struct Logo {
    pub path: PathBuf,
    pub loc: Corner,
    /// Logo height as a fraction of the axes height
    pub scale: f32,
    pub alpha: Option<f32>,
}

impl Logo {
    pub fn new(path: impl Into<PathBuf>, loc: Corner) -> Self {
        Self {
            path: path.into(),
            loc,
            scale: 0.15,
            alpha: None,
        }
    }
}

/// Parse every feature name, failing on the first unknown one.
pub fn parse_features<S: AsRef<str>>(names: &[S]) -> EmcResult<Vec<MapFeature>> {
    names.iter().map(|n| n.as_ref().parse()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_text_keeps_order() {
        let stats = StatsText::new([("n", "10".to_string()), ("mean", format!("{:.2}", 1.5))]);
        assert_eq!(stats.text(), "    n: 10    mean: 1.50");
        assert_eq!((stats.xloc, stats.yloc, stats.fontsize), (0.5, -0.1, 12.0));
    }

    #[test]
    fn test_legend_loc_parse() {
        assert_eq!("upper left".parse::<LegendLoc>().unwrap(), LegendLoc::UpperLeft);
        let err = "top".parse::<LegendLoc>().unwrap_err().to_string();
        assert!(err.contains("best | upper left"));
    }

    #[test]
    fn test_map_feature_names() {
        let features = parse_features(&["coastlines", "states", "ocean"]).unwrap();
        assert_eq!(features, vec![MapFeature::Coastline, MapFeature::States, MapFeature::Ocean]);
        assert!(MapFeature::Lakes.is_filled());
        assert!(matches!(
            parse_features(&["volcanoes"]),
            Err(EmcError::InvalidChoice { .. })
        ));
    }

    #[test]
    fn test_rotation() {
        assert!(!rotation_is_vertical(0.0));
        assert!(rotation_is_vertical(90.0));
        assert!(rotation_is_vertical(-90.0));
        assert!(!rotation_is_vertical(30.0));
        assert!(TickLabels::new(["a"]).rotation(90.0).is_vertical());
    }

    #[test]
    fn test_extend() {
        let e: Extend = "both".parse().unwrap();
        assert!(e.has_min() && e.has_max());
        assert!(!Extend::Max.has_min());
    }
}
