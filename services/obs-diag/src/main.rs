//! obs-diag
//!
//! Computes observation-space ensemble statistics by hour of day and
//! writes one figure per observation type.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use emc_common::utils::save_json;
use emc_common::Timer;
use netcdf_io::silence_hdf5_errors;
use plots::PlotsConfig;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use obs_diag::{load_config, obspace_stats, save_figures, NetCdfDiagSource};

/// Observation space diagnostics
#[derive(Parser, Debug)]
#[command(name = "obs-diag")]
#[command(about = "Hour-of-day ensemble statistics from GSI diagnostic files")]
struct Args {
    /// Run configuration
    #[arg(short, long, default_value = "config/obs_diag.yaml", env = "OBS_DIAG_CONFIG")]
    config: PathBuf,

    /// Directory for figures; overrides output_dir in the config
    #[arg(short, long, env = "OBS_DIAG_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Also write the computed statistics to this JSON file
    #[arg(long)]
    stats_json: Option<PathBuf>,

    /// Compute statistics without drawing figures
    #[arg(long)]
    no_plots: bool,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    if args.json_logs {
        fmt().with_env_filter(filter).with_target(true).json().init();
    } else {
        fmt().with_env_filter(filter).with_target(true).init();
    }

    let timer = Timer::tic();
    let config = load_config(&args.config)?;
    info!(
        config = %args.config.display(),
        datapath = %config.datapath.display(),
        date1 = %config.date1,
        date2 = %config.date2,
        experiments = ?config.experiments,
        members = config.members,
        "Starting obs-diag"
    );

    silence_hdf5_errors();
    let request = config.to_request();
    let stats = obspace_stats(&request, &NetCdfDiagSource).context("Failed to compute statistics")?;

    if let Some(path) = &args.stats_json {
        save_json(path, &stats).with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "Wrote statistics");
    }

    if !args.no_plots {
        let plots_config = match &config.plots_config {
            Some(path) => PlotsConfig::load(path)
                .with_context(|| format!("Failed to load plots config: {}", path.display()))?,
            None => PlotsConfig::default(),
        };
        let out_dir = args.output_dir.unwrap_or_else(|| config.output_dir.clone());
        save_figures(&stats, &request, &config.plot, &plots_config, &out_dir).context("Failed to draw figures")?;
    }

    info!(elapsed_ms = timer.elapsed().as_millis() as u64, "Done");
    Ok(())
}
