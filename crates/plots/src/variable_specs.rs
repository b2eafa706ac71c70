//! Plotting defaults per meteorological variable.
//!
//! The built-in table can be replaced by the `variables` section of
//! `config/emcpy.yaml`.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use emc_common::{EmcError, EmcResult};

/// Magnitude plots use the variable's range; diff plots a symmetric one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvalType {
    Magnitude,
    Diff,
}

impl EvalType {
    pub const NAMES: [&'static str; 2] = ["magnitude", "diff"];
}

impl FromStr for EvalType {
    type Err = EmcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "magnitude" => Ok(EvalType::Magnitude),
            "diff" => Ok(EvalType::Diff),
            _ => Err(EmcError::invalid_choice("evaluation type", s, &Self::NAMES)),
        }
    }
}

/// One row of the variable table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableEntry {
    pub name: String,
    pub short_name: String,
    #[serde(default = "default_variable_type")]
    pub variable_type: String,
    pub units: String,
    pub range: [f64; 2],
    pub contour_interval: f64,
    pub diff_range: [f64; 2],
    pub diff_contour_interval: f64,
    pub cmap: String,
}

fn default_variable_type() -> String {
    "conventional".to_string()
}

/// Variables keyed by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableTable(pub BTreeMap<String, VariableEntry>);

#[allow(clippy::too_many_arguments)]
fn entry(
    name: &str,
    short_name: &str,
    variable_type: &str,
    units: &str,
    range: [f64; 2],
    contour_interval: f64,
    diff: ([f64; 2], f64),
    cmap: &str,
) -> VariableEntry {
    VariableEntry {
        name: name.to_string(),
        short_name: short_name.to_string(),
        variable_type: variable_type.to_string(),
        units: units.to_string(),
        range,
        contour_interval,
        diff_range: diff.0,
        diff_contour_interval: diff.1,
        cmap: cmap.to_string(),
    }
}

impl Default for VariableTable {
    fn default() -> Self {
        let small = ([-5.0, 5.0], 0.5);
        let rows = [
            ("temperature", entry("temperature", "t", "conventional", "K", [220.0, 320.0], 5.0, small, "rainbow")),
            (
                "specific humidity",
                entry(
                    "specific humidity",
                    "q",
                    "conventional",
                    "kg/kg",
                    [0.0, 0.030],
                    0.0025,
                    ([-0.005, 0.005], 0.001),
                    "YlGnBu",
                ),
            ),
            ("u", entry("zonal wind", "u", "conventional", "m/s", [-50.0, 50.0], 5.0, small, "PuOr")),
            ("v", entry("meridional wind", "v", "conventional", "m/s", [-50.0, 50.0], 5.0, small, "PuOr")),
            ("wind speed", entry("wind speed", "wndspd", "conventional", "m/s", [0.0, 75.0], 5.0, small, "viridis")),
            (
                "brightness temperature",
                entry("brightness temperature", "bt", "radiance", "K", [220.0, 320.0], 5.0, small, "rainbow"),
            ),
        ];
        Self(rows.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }
}

impl VariableTable {
    pub fn get(&self, variable: &str) -> EmcResult<&VariableEntry> {
        self.0.get(variable).ok_or_else(|| {
            let names: Vec<&str> = self.0.keys().map(String::as_str).collect();
            EmcError::invalid_choice("variable", variable, &names)
        })
    }
}

/// Evenly spaced values from `start` through `stop` inclusive.
pub fn contour_range(start: f64, stop: f64, step: f64) -> Vec<f64> {
    if step <= 0.0 || !step.is_finite() || stop < start {
        return vec![];
    }
    let n = ((stop - start) / step + 1e-9).floor() as usize + 1;
    (0..n).map(|i| start + i as f64 * step).collect()
}

/// Plotting parameters for one variable and evaluation type.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableSpecs {
    pub eval_type: EvalType,
    pub name: String,
    pub short_name: String,
    pub variable_type: String,
    pub units: String,
    pub range: [f64; 2],
    pub contour_interval: f64,
    pub contours: Vec<f64>,
    pub cmap: String,
    pub vmin: f64,
    pub vmax: f64,
}

impl VariableSpecs {
    /// Look up a variable in the built-in table.
    pub fn new(variable: &str, eval_type: &str) -> EmcResult<Self> {
        Self::from_table(&VariableTable::default(), variable, eval_type)
    }

    pub fn from_table(table: &VariableTable, variable: &str, eval_type: &str) -> EmcResult<Self> {
        let entry = table.get(variable)?;
        let eval_type: EvalType = eval_type.parse()?;
        let (range, interval, cmap) = match eval_type {
            EvalType::Magnitude => (entry.range, entry.contour_interval, entry.cmap.clone()),
            EvalType::Diff => (entry.diff_range, entry.diff_contour_interval, "coolwarm".to_string()),
        };
        Ok(Self {
            eval_type,
            name: entry.name.clone(),
            short_name: entry.short_name.clone(),
            variable_type: entry.variable_type.clone(),
            units: entry.units.clone(),
            range,
            contour_interval: interval,
            contours: contour_range(range[0], range[1], interval),
            cmap,
            vmin: range[0],
            vmax: range[1],
        })
    }
}

/// Colorbar limits and colormap for common variables.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorbarPreset {
    pub vmin: f64,
    pub vmax: f64,
    pub cmap: String,
}

impl ColorbarPreset {
    pub const VARIABLES: [&'static str; 5] =
        ["brightness temperature", "specific humidity", "temperature", "wind speed", "wind"];

    /// Presets by variable; `uwind`, `vwind`, `ugrd` and `vgrd` share `wind`.
    pub fn new(variable: &str, eval_type: &str) -> EmcResult<Self> {
        let key = match variable {
            "uwind" | "vwind" | "ugrd" | "vgrd" => "wind",
            other => other,
        };
        let magnitude = match key {
            "brightness temperature" | "temperature" => (220.0, 320.0, "rainbow"),
            "specific humidity" => (0.0, 0.025, "YlGnBu"),
            "wind speed" => (0.0, 75.0, "viridis"),
            "wind" => (-50.0, 50.0, "viridis"),
            _ => return Err(EmcError::invalid_choice("variable", variable, &Self::VARIABLES)),
        };
        let (vmin, vmax, cmap) = match eval_type.parse::<EvalType>()? {
            EvalType::Magnitude => magnitude,
            EvalType::Diff if key == "specific humidity" => (-0.005, 0.005, "coolwarm"),
            EvalType::Diff => (-5.0, 5.0, "coolwarm"),
        };
        Ok(Self {
            vmin,
            vmax,
            cmap: cmap.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_magnitude() {
        let specs = VariableSpecs::new("temperature", "magnitude").unwrap();
        assert_eq!((specs.vmin, specs.vmax), (220.0, 320.0));
        assert_eq!(specs.cmap, "rainbow");
        assert_eq!(specs.contours.len(), 21);
        assert_eq!(specs.contours.last(), Some(&320.0));
    }

    #[test]
    fn test_diff_uses_coolwarm() {
        let specs = VariableSpecs::new("specific humidity", "diff").unwrap();
        assert_eq!(specs.cmap, "coolwarm");
        assert_eq!(specs.range, [-0.005, 0.005]);
        assert_eq!(specs.contours.len(), 11);
        assert!((specs.contours[10] - 0.005).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_variable_lists_choices() {
        let err = VariableSpecs::new("pressure", "magnitude").unwrap_err().to_string();
        assert!(err.starts_with("pressure is not a valid variable"));
        assert!(err.contains("brightness temperature | specific humidity"));
        assert!(VariableSpecs::new("u", "ratio").is_err());
    }

    #[test]
    fn test_wind_aliases() {
        let u = ColorbarPreset::new("ugrd", "magnitude").unwrap();
        assert_eq!((u.vmin, u.vmax, u.cmap.as_str()), (-50.0, 50.0, "viridis"));
        let q = ColorbarPreset::new("specific humidity", "diff").unwrap();
        assert_eq!((q.vmin, q.vmax), (-0.005, 0.005));
        assert!(ColorbarPreset::new("u", "magnitude").is_err());
    }

    #[test]
    fn test_table_round_trips_yaml() {
        let table = VariableTable::default();
        let yaml = serde_yaml::to_string(&table).unwrap();
        let back: VariableTable = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, table);
    }
}
