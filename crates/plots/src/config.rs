//! Library settings loaded from `emcpy.yaml`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use emc_common::{EmcError, EmcResult};

use crate::variable_specs::VariableTable;

/// Fonts, map features, output resolution and the variable table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotsConfig {
    /// Font files tried before `$EMCPY_FONT` and the system fonts
    #[serde(default)]
    pub fonts: Vec<PathBuf>,
    /// Directory holding `coastline.json`, `land.json`, ...
    #[serde(default)]
    pub features_dir: Option<PathBuf>,
    #[serde(default = "default_dpi")]
    pub dpi: f32,
    #[serde(default)]
    pub variables: VariableTable,
}

fn default_dpi() -> f32 {
    100.0
}

impl Default for PlotsConfig {
    fn default() -> Self {
        Self {
            fonts: Vec::new(),
            features_dir: None,
            dpi: default_dpi(),
            variables: VariableTable::default(),
        }
    }
}

impl PlotsConfig {
    pub fn from_yaml(text: &str) -> EmcResult<Self> {
        let config: PlotsConfig = serde_yaml::from_str(text)?;
        if config.dpi <= 0.0 {
            return Err(EmcError::Config(format!("dpi must be positive, got {}", config.dpi)));
        }
        Ok(config)
    }

    /// Load a config file. Relative feature and font paths resolve against
    /// the file's directory.
    pub fn load(path: impl AsRef<Path>) -> EmcResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| EmcError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let mut config = Self::from_yaml(&text)?;
        if let Some(base) = path.parent() {
            let resolve = |p: &PathBuf| if p.is_relative() { base.join(p) } else { p.clone() };
            config.fonts = config.fonts.iter().map(resolve).collect();
            config.features_dir = config.features_dir.as_ref().map(resolve);
        }
        debug!(path = %path.display(), variables = config.variables.0.len(), "Loaded plots config");
        Ok(config)
    }
}
