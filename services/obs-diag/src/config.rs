//! Configuration loader for obs-diag
//!
//! Reads a YAML run description (where the diagnostic files live, which
//! dates, experiments and observations to use, and how to plot them).
//!
//! Supports environment variable substitution using ${VAR} and
//! ${VAR:-default} syntax.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use emc_common::time::parse_date;
use emc_common::{FilterBounds, Hemisphere};
use serde::{Deserialize, Serialize};

use crate::obspace::{default_skip_hours, DiagRequest, DEFAULT_CODES_TQ, DEFAULT_CODES_UV, HOURS};
use crate::plot::PlotSettings;
use crate::source::ObType;

// ============================================================================
// Run Configuration (obs_diag.yaml)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObsDiagConfig {
    /// Root holding `{expt}/{date}/mem{NNNN}/` directories
    pub datapath: PathBuf,
    pub date1: String,
    pub date2: String,
    pub experiments: Vec<String>,
    /// Ensemble size
    pub members: usize,
    #[serde(default = "default_skip_hours")]
    pub skip_hours: Vec<u32>,
    #[serde(default = "default_ob_types")]
    pub ob_types: Vec<ObType>,
    #[serde(default = "default_codes_uv")]
    pub codes_uv: Vec<i32>,
    #[serde(default = "default_codes_tq")]
    pub codes_tq: Vec<i32>,
    /// GL, NH, TR, SH or CONUS; replaces the lat/lon filter bounds
    #[serde(default)]
    pub hemisphere: Option<Hemisphere>,
    #[serde(default)]
    pub filter: FilterBounds,
    #[serde(default)]
    pub plot: PlotSettings,
    /// emcpy.yaml with fonts and dpi
    #[serde(default)]
    pub plots_config: Option<PathBuf>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_ob_types() -> Vec<ObType> {
    vec![ObType::U, ObType::V, ObType::T, ObType::Q]
}

fn default_codes_uv() -> Vec<i32> {
    DEFAULT_CODES_UV.to_vec()
}

fn default_codes_tq() -> Vec<i32> {
    DEFAULT_CODES_TQ.to_vec()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl ObsDiagConfig {
    /// Parse YAML text after environment substitution.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content)?;
        let config: ObsDiagConfig =
            serde_yaml::from_str(&expanded).context("Failed to parse obs-diag configuration")?;
        validate_config(&config)?;
        Ok(config)
    }

    pub fn to_request(&self) -> DiagRequest {
        DiagRequest {
            datapath: self.datapath.clone(),
            date1: self.date1.clone(),
            date2: self.date2.clone(),
            experiments: self.experiments.clone(),
            n_mem: self.members,
            ob_types: self.ob_types.clone(),
            codes_uv: self.codes_uv.clone(),
            codes_tq: self.codes_tq.clone(),
            bounds: self.filter,
            hemisphere: self.hemisphere,
            skip_hours: self.skip_hours.clone(),
        }
    }
}

/// Load and parse obs_diag.yaml with environment variable substitution
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ObsDiagConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    ObsDiagConfig::from_yaml(&content).with_context(|| format!("Invalid config file: {}", path.display()))
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand environment variables in YAML content
/// Supports ${VAR} and ${VAR:-default} syntax
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut var_expr = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(c) => var_expr.push(c),
                    None => anyhow::bail!("Unclosed variable substitution: ${{{}", var_expr),
                }
            }
            result.push_str(&resolve_var_expr(&var_expr)?);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

/// Resolve variable expression (supports VAR and VAR:-default syntax)
fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim()).with_context(|| format!("Environment variable {} not set", expr))
    }
}

// ============================================================================
// Validation
// ============================================================================

fn validate_config(config: &ObsDiagConfig) -> Result<()> {
    anyhow::ensure!(!config.experiments.is_empty(), "At least one experiment is required");
    anyhow::ensure!(config.members > 0, "members must be greater than 0");
    anyhow::ensure!(!config.ob_types.is_empty(), "At least one observation type is required");

    let start = parse_date(&config.date1).with_context(|| format!("Invalid date1: {}", config.date1))?;
    let end = parse_date(&config.date2).with_context(|| format!("Invalid date2: {}", config.date2))?;
    anyhow::ensure!(
        start <= end,
        "date1 ({}) must not be after date2 ({})",
        config.date1,
        config.date2
    );

    if let Some(h) = config.skip_hours.iter().find(|h| **h as usize >= HOURS) {
        anyhow::bail!("Invalid skip hour: {}. Must be 0-23", h);
    }

    let f = &config.filter;
    anyhow::ensure!(f.p_min < f.p_max, "filter.p_min must be less than filter.p_max");
    anyhow::ensure!(f.lat_min <= f.lat_max, "filter.lat_min must not exceed filter.lat_max");
    anyhow::ensure!(f.lon_min <= f.lon_max, "filter.lon_min must not exceed filter.lon_max");
    anyhow::ensure!(
        f.error_min > 0.0 && f.error_min < f.error_max,
        "filter.error_min must be positive and less than filter.error_max"
    );

    anyhow::ensure!(
        config.plot.scale_fig_size > 0.0,
        "plot.scale_fig_size must be greater than 0"
    );

    Ok(())
}
